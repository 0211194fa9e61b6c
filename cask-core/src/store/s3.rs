use crate::credentials::{CredentialSource, CredentialType, resolve_credentials};
use crate::{
    BackendType, CaskError, Key, OpContext, PrecomputedKeyStore, Result, Stats, StatsSnapshot,
    remove_chunk_signature, verify_key,
};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::{DELIMITER, Path, PathPart};
use object_store::{ClientOptions, ObjectStore, PutPayload, RetryConfig};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

const _: fn() = || {
    fn assert_store<T: PrecomputedKeyStore>() {}
    assert_store::<S3Store>();
};

/// Connection and behaviour settings for [`S3Store`].
#[derive(Clone)]
pub struct S3Config {
    pub credential_type: CredentialType,
    /// `host[:port]` or a full URL; empty means the AWS default endpoint.
    pub endpoint: String,
    pub enable_tls: bool,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub bucket: String,
    /// Prefix for object paths, joined with the hex key. Segments must not
    /// be `.`/`..` or need percent-encoding.
    pub path: String,
    pub region: Option<String>,
    /// Informational: whether the routing layer treats this store as a backup.
    pub backup: bool,
    /// Per-operation timeout; zero disables it.
    pub timeout: Duration,
    pub profiling: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            credential_type: CredentialType::Unknown,
            endpoint: String::new(),
            enable_tls: true,
            access_key_id: String::new(),
            access_key_secret: String::new(),
            bucket: String::new(),
            path: String::new(),
            region: None,
            backup: false,
            timeout: Duration::from_secs(5),
            profiling: false,
        }
    }
}

impl fmt::Debug for S3Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Config")
            .field("credential_type", &self.credential_type)
            .field("endpoint", &self.endpoint)
            .field("enable_tls", &self.enable_tls)
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("path", &self.path)
            .field("region", &self.region)
            .field("backup", &self.backup)
            .field("timeout", &self.timeout)
            .field("profiling", &self.profiling)
            .finish()
    }
}

impl S3Config {
    /// Endpoint as a URL, adding the scheme implied by `enable_tls` when
    /// the configured value has none.
    pub fn endpoint_url(&self) -> Option<String> {
        let endpoint = self.endpoint.trim();
        if endpoint.is_empty() {
            return None;
        }

        if endpoint.contains("://") {
            return Some(endpoint.to_string());
        }

        let scheme = if self.enable_tls { "https" } else { "http" };
        Some(format!("{}://{}", scheme, endpoint))
    }

    /// Reject settings the client would accept but store objects wrongly
    /// under.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(CaskError::Config("s3 bucket cannot be empty".to_string()));
        }

        for segment in self.path.split(DELIMITER).filter(|s| !s.is_empty()) {
            let part = PathPart::from(segment);
            if part.as_ref() != segment {
                return Err(CaskError::Config(format!(
                    "s3 path segment '{}' would be stored as '{}'",
                    segment,
                    part.as_ref()
                )));
            }
        }

        Ok(())
    }

    fn operation_timeout(&self) -> Option<Duration> {
        Some(self.timeout).filter(|timeout| !timeout.is_zero())
    }
}

/// Content-addressed store over an S3-compatible bucket.
///
/// Objects live at `{path}/{hex(key)}`. Reads are scrubbed of chunked-upload
/// signature artifacts before they are returned.
pub struct S3Store {
    config: S3Config,
    client: Arc<dyn ObjectStore>,
    stats: Stats,
}

impl S3Store {
    pub fn new(config: S3Config) -> Result<Self> {
        config.validate()?;

        let builder = match resolve_credentials(&config) {
            CredentialSource::Static(provider) => {
                AmazonS3Builder::new().with_credentials(provider)
            }
            CredentialSource::Ambient => AmazonS3Builder::from_env(),
        };

        let mut client_options = ClientOptions::new();
        if let Some(timeout) = config.operation_timeout() {
            client_options = client_options.with_timeout(timeout);
        }

        let mut builder = builder
            .with_bucket_name(&config.bucket)
            .with_allow_http(!config.enable_tls)
            .with_client_options(client_options)
            .with_retry(RetryConfig {
                max_retries: 0,
                ..RetryConfig::default()
            });
        if let Some(endpoint) = config.endpoint_url() {
            builder = builder.with_endpoint(endpoint);
        }
        if let Some(region) = config.region.as_deref() {
            builder = builder.with_region(region);
        }

        let client = builder
            .build()
            .map_err(|e| CaskError::Config(format!("failed to build s3 client: {}", e)))?;

        tracing::info!(
            "S3 store ready: bucket={} endpoint={} path={} credentials={} backup={}",
            config.bucket,
            config.endpoint_url().as_deref().unwrap_or("<aws default>"),
            config.path,
            config.credential_type,
            config.backup
        );

        Ok(Self::with_object_store(config, Arc::new(client)))
    }

    /// Wrap an already constructed object store client.
    pub fn with_object_store(config: S3Config, client: Arc<dyn ObjectStore>) -> Self {
        Self {
            config,
            client,
            stats: Stats::new(),
        }
    }

    pub fn config(&self) -> &S3Config {
        &self.config
    }

    pub fn is_backup(&self) -> bool {
        self.config.backup
    }

    pub fn object_path(&self, key: &Key) -> Path {
        Path::from(format!("{}/{}", self.config.path, key.to_hex()))
    }
}

#[async_trait]
impl PrecomputedKeyStore for S3Store {
    async fn get(&self, ctx: &OpContext, key: &Key) -> Result<Bytes> {
        let path = self.object_path(key);
        tracing::debug!("S3 get object path: {}", path);

        let data = ctx
            .run(self.config.operation_timeout(), async {
                let result = self.client.get(&path).await.map_err(map_object_error)?;
                result.bytes().await.map_err(map_object_error)
            })
            .await?;

        if self.config.profiling {
            self.stats.record_read();
        }

        Ok(remove_chunk_signature(data))
    }

    async fn put(&self, ctx: &OpContext, key: &Key, value: Bytes) -> Result<()> {
        let path = self.object_path(key);
        tracing::debug!("S3 put object path: {} ({} bytes)", path, value.len());

        ctx.run(self.config.operation_timeout(), async {
            self.client.put(&path, PutPayload::from(value)).await?;
            Ok(())
        })
        .await?;

        if self.config.profiling {
            self.stats.record_entry();
        }

        Ok(())
    }

    fn verify(&self, key: &Key, value: &[u8]) -> Result<()> {
        verify_key(key, value)
    }

    fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn backend_type(&self) -> BackendType {
        BackendType::S3
    }
}

fn map_object_error(error: object_store::Error) -> CaskError {
    match error {
        object_store::Error::NotFound { path, .. } => CaskError::NotFound(path),
        other => CaskError::Transport(other),
    }
}
