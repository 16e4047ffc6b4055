//! S3 object storage image source

use std::sync::OnceLock;

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use prism_config::S3SourceConfig;
use secrecy::ExposeSecret;

use super::{ImageSource, S3_SCHEME, ensure_blocking_context, is_s3_reference};
use crate::error::ImageError;

/// Fetches images from `s3://bucket/key` URIs
///
/// The storage client is supplied by the caller so credentials, region, and
/// endpoint stay under their control. Blocking fetches run on a private
/// single-threaded runtime that is created on first use.
pub struct S3ImageSource {
    client: S3Client,
    runtime: OnceLock<tokio::runtime::Runtime>,
}

impl S3ImageSource {
    /// Create a source around an existing client
    pub const fn new(client: S3Client) -> Self {
        Self {
            client,
            runtime: OnceLock::new(),
        }
    }

    async fn fetch(&self, reference: &str) -> Result<Bytes, ImageError> {
        let (bucket, key) = parse_s3_uri(reference)?;

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(reference, bucket, key, error = %e, "S3 get_object failed");
                ImageError::fetch_failed(reference, e)
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| ImageError::fetch_failed(reference, e))?
            .into_bytes();

        tracing::debug!(reference, bytes = data.len(), "downloaded image from S3");
        Ok(data)
    }

    fn runtime(&self, reference: &str) -> Result<&tokio::runtime::Runtime, ImageError> {
        if let Some(runtime) = self.runtime.get() {
            return Ok(runtime);
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ImageError::fetch_failed(reference, e))?;

        Ok(self.runtime.get_or_init(|| runtime))
    }
}

impl Drop for S3ImageSource {
    fn drop(&mut self) {
        // Dropping a runtime from async code panics; let it wind down in the background
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[async_trait]
impl ImageSource for S3ImageSource {
    fn name(&self) -> &str {
        "s3"
    }

    fn can_handle(&self, reference: &str) -> bool {
        is_s3_reference(reference)
    }

    fn get_image(&self, reference: &str) -> Result<Bytes, ImageError> {
        // Malformed URIs fail the same way in both modes
        parse_s3_uri(reference)?;
        ensure_blocking_context(reference)?;

        self.runtime(reference)?.block_on(self.fetch(reference))
    }

    async fn get_image_async(&self, reference: &str) -> Result<Bytes, ImageError> {
        self.fetch(reference).await
    }
}

/// Split `s3://bucket/key` into bucket and key
///
/// Both parts must be non-empty. The key keeps any further slashes.
pub fn parse_s3_uri(reference: &str) -> Result<(&str, &str), ImageError> {
    let Some(rest) = reference.strip_prefix(S3_SCHEME) else {
        return Err(ImageError::invalid(reference, "expected an s3://bucket/key URI"));
    };

    match rest.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok((bucket, key)),
        Some((bucket, _)) if !bucket.is_empty() => Err(ImageError::invalid(reference, "missing object key")),
        Some(_) => Err(ImageError::invalid(reference, "missing bucket name")),
        None if rest.is_empty() => Err(ImageError::invalid(reference, "missing bucket name")),
        None => Err(ImageError::invalid(reference, "missing object key")),
    }
}

/// Build an S3 client from configuration
///
/// Uses explicit credentials when both keys are set, otherwise the default
/// AWS credential chain.
pub async fn s3_client_from_config(config: &S3SourceConfig) -> S3Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let (Some(access_key), Some(secret_key)) = (&config.access_key_id, &config.secret_access_key) {
        let credentials = aws_credential_types::Credentials::new(
            access_key.expose_secret(),
            secret_key.expose_secret(),
            None,
            None,
            "prism-config",
        );
        loader = loader.credentials_provider(credentials);
    }

    let sdk_config = loader.load().await;

    let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(config.force_path_style);
    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint_url(endpoint.as_str());
    }

    S3Client::from_conf(builder.build())
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::config::{BehaviorVersion, Region};
    use secrecy::SecretString;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const NO_SUCH_KEY: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
        <Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message></Error>";

    fn mock_config(server: &MockServer) -> S3SourceConfig {
        S3SourceConfig {
            region: "us-east-1".to_owned(),
            endpoint: Some(server.uri().parse().unwrap()),
            force_path_style: true,
            access_key_id: Some(SecretString::from("AKIDPRISMTEST")),
            secret_access_key: Some(SecretString::from("prism-test-secret")),
        }
    }

    async fn serve_object(server: &MockServer, object_path: &str, body: &[u8]) {
        Mock::given(method("GET"))
            .and(path(object_path))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
            .expect(1)
            .mount(server)
            .await;
    }

    fn offline_client() -> S3Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();
        S3Client::from_conf(config)
    }

    #[test]
    fn parses_bucket_and_nested_key() {
        assert_eq!(
            parse_s3_uri("s3://media/users/42/avatar.png").unwrap(),
            ("media", "users/42/avatar.png")
        );
    }

    #[test]
    fn rejects_malformed_uris() {
        for uri in ["s3://bucket-only", "s3://bucket/", "s3:///key.png", "s3://", "https://x/y"] {
            let err = parse_s3_uri(uri).unwrap_err();
            assert!(matches!(err, ImageError::InvalidReference { .. }), "{uri}: {err}");
        }
    }

    #[test]
    fn handles_s3_scheme_only() {
        let source = S3ImageSource::new(offline_client());
        assert!(source.can_handle("s3://bucket/key.png"));
        assert!(!source.can_handle("https://example.com/key.png"));
        assert!(!source.can_handle("bucket/key.png"));
    }

    #[test]
    fn blocking_fetch_rejects_bucket_only_uri() {
        let source = S3ImageSource::new(offline_client());
        let err = source.get_image("s3://bucket-only").unwrap_err();
        assert!(matches!(err, ImageError::InvalidReference { .. }));
    }

    #[tokio::test]
    async fn async_fetch_rejects_bucket_only_uri() {
        let source = S3ImageSource::new(offline_client());
        let err = source.get_image_async("s3://bucket-only").await.unwrap_err();
        assert!(matches!(err, ImageError::InvalidReference { .. }));
    }

    #[tokio::test]
    async fn async_fetch_downloads_object() {
        let server = MockServer::start().await;
        serve_object(&server, "/bucket/dir/cat.png", b"meowpng").await;

        let source = S3ImageSource::new(s3_client_from_config(&mock_config(&server)).await);
        let data = source.get_image_async("s3://bucket/dir/cat.png").await.unwrap();

        assert_eq!(data.as_ref(), b"meowpng");
        server.verify().await;
    }

    #[tokio::test]
    async fn missing_object_is_a_source_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bucket/missing.png"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("content-type", "application/xml")
                    .set_body_string(NO_SUCH_KEY),
            )
            .mount(&server)
            .await;

        let source = S3ImageSource::new(s3_client_from_config(&mock_config(&server)).await);
        let err = source.get_image_async("s3://bucket/missing.png").await.unwrap_err();

        assert!(matches!(err, ImageError::Source { .. }), "{err}");
        assert!(err.to_string().contains("s3://bucket/missing.png"));
    }

    #[test]
    fn blocking_fetch_uses_owned_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();
        let server = runtime.block_on(MockServer::start());
        runtime.block_on(serve_object(&server, "/bucket/a.png", b"png"));
        let client = runtime.block_on(s3_client_from_config(&mock_config(&server)));

        let source = S3ImageSource::new(client);
        assert_eq!(source.get_image("s3://bucket/a.png").unwrap().as_ref(), b"png");

        runtime.block_on(server.verify());
    }
}
