//! Storage backends keyed by precomputed content keys.
//!
//! Provides the backend interface consumed by routing layers and the
//! S3-compatible object storage implementation.

pub mod s3;

pub use s3::{S3Config, S3Store};

use crate::{Key, OpContext, Result, StatsSnapshot};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of backend behind a [`PrecomputedKeyStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    Memory,
    S3,
    Redis,
}

impl fmt::Display for BackendType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendType::Memory => "memory",
            BackendType::S3 => "s3",
            BackendType::Redis => "redis",
        };
        f.write_str(name)
    }
}

/// A store where the caller supplies the key, normally the hash of the value.
///
/// `get` and `put` do not check the key against the value; callers that need
/// that guarantee call `verify`.
#[async_trait]
pub trait PrecomputedKeyStore: Send + Sync {
    async fn get(&self, ctx: &OpContext, key: &Key) -> Result<Bytes>;

    async fn put(&self, ctx: &OpContext, key: &Key, value: Bytes) -> Result<()>;

    fn verify(&self, key: &Key, value: &[u8]) -> Result<()>;

    fn stats(&self) -> StatsSnapshot;

    fn backend_type(&self) -> BackendType;
}
