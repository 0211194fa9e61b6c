use cask_core::{CaskError, CredentialType, Result, S3Config};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub s3: S3Section,
    #[serde(default)]
    pub profiling: bool,
}

/// S3 backend settings as they appear in the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Section {
    /// `static` or `iam`
    #[serde(default)]
    pub credential_type: String,
    pub bucket: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub disable_tls: bool,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub access_key_secret: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub backup: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::with_name(path))
            .add_source(::config::Environment::with_prefix("CASK").separator("__"))
            .build()
            .map_err(|e| CaskError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| CaskError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let s3 = &self.s3;
        let credential_type = CredentialType::parse(&s3.credential_type);
        let endpoint_set = !s3.endpoint.trim().is_empty();

        if credential_type == CredentialType::Unknown && endpoint_set {
            return Err(CaskError::Config(
                "s3 credential type must be set".to_string(),
            ));
        }

        if credential_type == CredentialType::Static
            && endpoint_set
            && (s3.access_key_id.is_empty() || s3.access_key_secret.is_empty())
        {
            return Err(CaskError::Config(
                "s3 endpoint is set, but access key id or access key secret is not set"
                    .to_string(),
            ));
        }

        if s3.bucket.trim().is_empty() {
            return Err(CaskError::Config("s3 bucket cannot be empty".to_string()));
        }

        Ok(())
    }

    pub fn store_config(&self) -> S3Config {
        let s3 = &self.s3;
        S3Config {
            credential_type: CredentialType::parse(&s3.credential_type),
            endpoint: s3.endpoint.clone(),
            enable_tls: !s3.disable_tls,
            access_key_id: s3.access_key_id.clone(),
            access_key_secret: s3.access_key_secret.clone(),
            bucket: s3.bucket.clone(),
            path: s3.path.clone(),
            region: s3.region.clone().filter(|region| !region.trim().is_empty()),
            backup: s3.backup,
            timeout: Duration::from_secs(s3.timeout_secs),
            profiling: self.profiling,
        }
    }
}
