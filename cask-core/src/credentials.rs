//! Request signing credentials for the S3 client.

use crate::store::S3Config;
use object_store::StaticCredentialProvider;
use object_store::aws::{AwsCredential, AwsCredentialProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How the store authenticates to the object store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialType {
    Static,
    Iam,
    #[default]
    Unknown,
}

impl CredentialType {
    /// Anything other than `static` or `iam` parses as `Unknown`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "static" => CredentialType::Static,
            "iam" => CredentialType::Iam,
            _ => CredentialType::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialType::Static => "static",
            CredentialType::Iam => "iam",
            CredentialType::Unknown => "unknown",
        }
    }
}

impl From<&str> for CredentialType {
    fn from(value: &str) -> Self {
        CredentialType::parse(value)
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credentials chosen for a store, resolved once at construction.
pub enum CredentialSource {
    /// Explicit access key pair from configuration.
    Static(AwsCredentialProvider),
    /// Environment variables, web identity, container or instance metadata.
    Ambient,
}

impl CredentialSource {
    pub fn is_static(&self) -> bool {
        matches!(self, CredentialSource::Static(_))
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Static(_) => f.write_str("Static(..)"),
            CredentialSource::Ambient => f.write_str("Ambient"),
        }
    }
}

pub fn resolve_credentials(config: &S3Config) -> CredentialSource {
    match config.credential_type {
        CredentialType::Static => {
            let provider = StaticCredentialProvider::new(AwsCredential {
                key_id: config.access_key_id.clone(),
                secret_key: config.access_key_secret.clone(),
                token: None,
            });
            CredentialSource::Static(Arc::new(provider))
        }
        CredentialType::Iam => CredentialSource::Ambient,
        CredentialType::Unknown => {
            // Unrecognised types sign with ambient credentials instead of
            // failing construction.
            tracing::warn!(
                "unrecognised s3 credential type for bucket {}, falling back to ambient credentials",
                config.bucket
            );
            CredentialSource::Ambient
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::CredentialProvider;

    fn config(credential_type: CredentialType) -> S3Config {
        S3Config {
            credential_type,
            access_key_id: "minio".to_string(),
            access_key_secret: "minio123".to_string(),
            bucket: "cask".to_string(),
            ..S3Config::default()
        }
    }

    #[test]
    fn test_parse_credential_type() {
        assert_eq!(CredentialType::parse("static"), CredentialType::Static);
        assert_eq!(CredentialType::parse(" IAM "), CredentialType::Iam);
        assert_eq!(CredentialType::parse(""), CredentialType::Unknown);
        assert_eq!(CredentialType::parse("token"), CredentialType::Unknown);
        assert_eq!(CredentialType::from("iam").to_string(), "iam");
    }

    #[test]
    fn test_credential_type_serde() {
        let parsed: CredentialType = serde_json::from_str("\"static\"").unwrap();
        assert_eq!(parsed, CredentialType::Static);
        assert_eq!(
            serde_json::to_string(&CredentialType::Iam).unwrap(),
            "\"iam\""
        );
    }

    #[tokio::test]
    async fn test_static_credentials_use_configured_pair() {
        let CredentialSource::Static(provider) =
            resolve_credentials(&config(CredentialType::Static))
        else {
            panic!("expected static credentials");
        };

        let credential = provider.get_credential().await.unwrap();
        assert_eq!(credential.key_id, "minio");
        assert_eq!(credential.secret_key, "minio123");
        assert!(credential.token.is_none());
    }

    #[test]
    fn test_iam_and_unknown_resolve_to_ambient() {
        assert!(matches!(
            resolve_credentials(&config(CredentialType::Iam)),
            CredentialSource::Ambient
        ));
        assert!(!resolve_credentials(&config(CredentialType::Unknown)).is_static());
    }
}
