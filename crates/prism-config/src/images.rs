use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Image acquisition configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImagesConfig {
    /// Resolve plain filesystem paths
    #[serde(default = "default_true")]
    pub local: bool,
    /// HTTP(S) fetch settings
    #[serde(default)]
    pub http: HttpSourceConfig,
    /// S3 object storage settings (source disabled when absent)
    #[serde(default)]
    pub s3: Option<S3SourceConfig>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            local: true,
            http: HttpSourceConfig::default(),
            s3: None,
        }
    }
}

/// HTTP(S) image source configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSourceConfig {
    /// Enable the HTTP source
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User agent sent with image requests
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

/// S3 image source configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct S3SourceConfig {
    /// AWS region
    pub region: String,
    /// Custom endpoint (e.g. `MinIO` or `LocalStack`)
    #[serde(default)]
    pub endpoint: Option<Url>,
    /// Use path-style addressing instead of virtual-hosted buckets
    #[serde(default)]
    pub force_path_style: bool,
    /// Access key ID (optional, uses default credential chain if absent)
    #[serde(default)]
    pub access_key_id: Option<SecretString>,
    /// Secret access key
    #[serde(default)]
    pub secret_access_key: Option<SecretString>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_true() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_timeout_secs() -> u64 {
    30
}
