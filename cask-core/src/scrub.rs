//! Removal of signed chunked-upload framing leaked into object bodies.
//!
//! Some S3-compatible endpoints return the `aws-chunked` framing of objects
//! that were uploaded with per-chunk signatures: lines such as
//! `400;chunk-signature=<hex>` plus `\r\n` padding around the payload.
//! Every body read from the object store goes through
//! [`remove_chunk_signature`] before it is handed to callers.

use bytes::Bytes;
use regex::bytes::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

const CRLF: &[u8] = b"\r\n";

// Byte-oriented (`-u`) so bodies that are not UTF-8 are matched as-is.
static CHUNK_SIGNATURE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m-u)^[^\n]*;chunk-signature=[0-9a-fA-F]+[^\n]*(?:\n|\z)")
        .expect("chunk signature pattern is valid")
});

/// Strip chunk-signature lines, then any `\r\n` runs wrapping the payload.
///
/// Signature lines are removed together with their terminators. Only the
/// terminator runs at the very start and end are trimmed afterwards;
/// interior terminators are left alone.
pub fn remove_chunk_signature(data: Bytes) -> Bytes {
    let stripped = match CHUNK_SIGNATURE_LINE.replace_all(&data, &b""[..]) {
        Cow::Borrowed(_) => None,
        Cow::Owned(stripped) => Some(stripped),
    };

    let Some(stripped) = stripped else {
        let trimmed = trim_crlf_runs(&data);
        if trimmed.len() == data.len() {
            return data;
        }
        return data.slice_ref(trimmed);
    };

    tracing::debug!(
        "removed chunk signature lines from object body ({} -> {} bytes)",
        data.len(),
        stripped.len()
    );
    Bytes::copy_from_slice(trim_crlf_runs(&stripped))
}

fn trim_crlf_runs(mut data: &[u8]) -> &[u8] {
    while let Some(rest) = data.strip_prefix(CRLF) {
        data = rest;
    }
    while let Some(rest) = data.strip_suffix(CRLF) {
        data = rest;
    }
    data
}
