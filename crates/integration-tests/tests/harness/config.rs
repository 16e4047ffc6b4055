//! Programmatic configuration builder for integration tests

use prism_config::{Config, HttpSourceConfig, ImagesConfig, ProviderConfig, S3SourceConfig};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Local and HTTP sources enabled, no providers
    pub fn new() -> Self {
        Self {
            config: Config {
                providers: Default::default(),
                images: ImagesConfig {
                    local: true,
                    http: HttpSourceConfig {
                        enabled: true,
                        timeout_secs: 5,
                        user_agent: Some("prism-tests".to_owned()),
                    },
                    s3: None,
                },
                telemetry: None,
            },
        }
    }

    /// Add a provider table for `name`
    pub fn with_provider(mut self, name: &str, model: &str) -> Self {
        self.config.providers.insert(
            name.to_owned(),
            ProviderConfig {
                provider: None,
                model: model.to_owned(),
                temperature: 0.0,
                max_tokens: None,
                top_p: None,
                json_response: false,
                json_schema: None,
                is_batch: false,
                method: prism_config::DEFAULT_METHOD.to_owned(),
                url: String::new(),
                custom_id: None,
            },
        );
        self
    }

    /// Turn off the HTTP image source
    pub fn without_http(mut self) -> Self {
        self.config.images.http.enabled = false;
        self
    }

    /// Turn off the local image source
    pub fn without_local(mut self) -> Self {
        self.config.images.local = false;
        self
    }

    /// Enable the S3 source against a custom endpoint with path-style buckets
    pub fn with_s3(mut self, endpoint: &str) -> Self {
        self.config.images.s3 = Some(S3SourceConfig {
            region: "us-east-1".to_owned(),
            endpoint: Some(endpoint.parse().unwrap()),
            force_path_style: true,
            access_key_id: None,
            secret_access_key: None,
        });
        self
    }

    pub fn build(self) -> Config {
        self.config.validate().unwrap();
        self.config
    }
}
