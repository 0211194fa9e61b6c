//! Cask Core - content-addressed blob storage on S3-compatible object stores
//!
//! Values are stored under the Keccak-256 hash of their bytes:
//! - `{path}/{hex(key)}` object layout
//! - chunk-signature artifacts scrubbed from every read
//! - static or ambient (IAM) request signing credentials
//! - optional put/read usage counters

pub mod context;
pub mod credentials;
pub mod error;
pub mod key;
pub mod scrub;
pub mod stats;
pub mod store;

pub use context::OpContext;
pub use credentials::{CredentialSource, CredentialType, resolve_credentials};
pub use error::{CaskError, Result};
pub use key::{KEY_SIZE, Key, compute_key, verify_key};
pub use scrub::remove_chunk_signature;
pub use stats::{Stats, StatsSnapshot};
pub use store::{BackendType, PrecomputedKeyStore, S3Config, S3Store};
