//! Content keys: Keccak-256 digests of stored values.

use crate::error::{CaskError, Result};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

/// Key size in bytes (Keccak-256 produces 256-bit digests).
pub const KEY_SIZE: usize = 32;

/// A 32-byte content key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key([u8; KEY_SIZE]);

impl Key {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Key(bytes)
    }

    /// Parse a key from 64 hex characters, with or without a `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self> {
        let hex_str = hex_str.trim();
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        if hex_str.len() != KEY_SIZE * 2 {
            return Err(CaskError::InvalidKey(format!(
                "expected {} hex characters, got {}",
                KEY_SIZE * 2,
                hex_str.len()
            )));
        }

        let bytes = hex::decode(hex_str)
            .map_err(|e| CaskError::InvalidKey(format!("invalid hex: {}", e)))?;
        Self::try_from(bytes.as_slice())
    }

    /// Lowercase hex, as used in object paths.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// Hash a value into the key it is stored under.
    pub fn digest(value: &[u8]) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(value);
        let digest = hasher.finalize();

        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&digest);
        Key(key)
    }
}

impl TryFrom<&[u8]> for Key {
    type Error = CaskError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            CaskError::InvalidKey(format!(
                "expected {} bytes, got {}",
                KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Key(key))
    }
}

impl FromStr for Key {
    type Err = CaskError;

    fn from_str(s: &str) -> Result<Self> {
        Key::from_hex(s)
    }
}

impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.to_hex())
    }
}

/// Compute the content key of a value
pub fn compute_key(value: &[u8]) -> Key {
    Key::digest(value)
}

/// Verify that a value hashes to the expected key
pub fn verify_key(key: &Key, value: &[u8]) -> Result<()> {
    let actual = compute_key(value);
    if actual != *key {
        return Err(CaskError::IntegrityMismatch {
            expected: key.to_hex(),
            actual: actual.to_hex(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY_KECCAK: &str = "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470";

    #[test]
    fn test_empty_value_digest() {
        assert_eq!(compute_key(b"").to_hex(), EMPTY_KECCAK);
    }

    #[test]
    fn test_from_hex_accepts_prefix_and_rejects_bad_input() {
        let key = Key::from_hex(EMPTY_KECCAK).unwrap();
        assert_eq!(Key::from_hex(&format!("0x{}", EMPTY_KECCAK)).unwrap(), key);
        assert_eq!(EMPTY_KECCAK.parse::<Key>().unwrap(), key);

        assert!(matches!(
            Key::from_hex("abcd"),
            Err(CaskError::InvalidKey(_))
        ));
        assert!(matches!(
            Key::from_hex(&"zz".repeat(KEY_SIZE)),
            Err(CaskError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_try_from_slice_length() {
        assert!(Key::try_from([7u8; KEY_SIZE].as_slice()).is_ok());
        assert!(Key::try_from([7u8; 31].as_slice()).is_err());
        assert!(Key::try_from([7u8; 33].as_slice()).is_err());
    }

    #[test]
    fn test_verify_mismatch_reports_both_keys() {
        let key = Key::from_bytes([0u8; KEY_SIZE]);
        match verify_key(&key, b"hello") {
            Err(CaskError::IntegrityMismatch { expected, actual }) => {
                assert_eq!(expected, key.to_hex());
                assert_eq!(actual, compute_key(b"hello").to_hex());
            }
            other => panic!("expected integrity mismatch, got {:?}", other),
        }
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_verify_accepts_own_digest(value: Vec<u8>) {
            let key = compute_key(&value);
            prop_assert!(verify_key(&key, &value).is_ok());
        }

        #[test]
        fn prop_verify_rejects_other_keys(
            value: Vec<u8>,
            other in prop::array::uniform32(any::<u8>()),
        ) {
            let other = Key::from_bytes(other);
            prop_assume!(other != compute_key(&value));
            let is_mismatch = matches!(
                verify_key(&other, &value),
                Err(CaskError::IntegrityMismatch { .. })
            );
            prop_assert!(is_mismatch);
        }

        #[test]
        fn prop_hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
            let key = Key::from_bytes(bytes);
            prop_assert_eq!(Key::from_hex(&key.to_hex())?, key);
        }
    }
}
