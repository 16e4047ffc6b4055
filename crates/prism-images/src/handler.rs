use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use prism_config::{ImageContract, ImagesConfig};
use prism_core::{ImageFormat, ResolvedImage, TransportForm};

use crate::error::ImageError;
use crate::source::ImageSource;
use crate::source::http::HttpImageSource;
use crate::source::local::LocalImageSource;
use crate::source::s3::{S3ImageSource, s3_client_from_config};

/// Ordered set of image sources
///
/// The first source whose `can_handle` accepts a reference serves it, so
/// registration order doubles as priority.
#[derive(Clone)]
pub struct ImageHandler {
    sources: Vec<Arc<dyn ImageSource>>,
}

impl ImageHandler {
    /// Handler with the local and HTTP sources
    pub fn new() -> Self {
        Self {
            sources: vec![Arc::new(LocalImageSource::new()), Arc::new(HttpImageSource::new())],
        }
    }

    /// Handler with no sources
    pub const fn empty() -> Self {
        Self { sources: Vec::new() }
    }

    /// Append an S3 source backed by the given client
    #[must_use]
    pub fn with_s3(mut self, client: aws_sdk_s3::Client) -> Self {
        self.register_source(Arc::new(S3ImageSource::new(client)));
        self
    }

    /// Build the handler described by configuration
    ///
    /// Sources are added in the order local, HTTP, S3, skipping disabled ones.
    pub async fn from_config(config: &ImagesConfig) -> Self {
        let mut handler = Self::empty();

        if config.local {
            handler.register_source(Arc::new(LocalImageSource::new()));
        }
        if config.http.enabled {
            handler.register_source(Arc::new(HttpImageSource::from_config(&config.http)));
        }
        if let Some(s3) = &config.s3 {
            let client = s3_client_from_config(s3).await;
            handler.register_source(Arc::new(S3ImageSource::new(client)));
        }

        tracing::debug!(sources = ?handler.source_names(), "image handler configured");
        handler
    }

    /// Append a source; it is consulted only after every earlier one declines
    pub fn register_source(&mut self, source: Arc<dyn ImageSource>) {
        self.sources.push(source);
    }

    /// Names of registered sources in dispatch order
    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    /// First source accepting the reference
    pub fn source_for(&self, reference: &str) -> Result<&dyn ImageSource, ImageError> {
        self.sources
            .iter()
            .find(|source| source.can_handle(reference))
            .map(|source| source.as_ref())
            .ok_or_else(|| ImageError::Unresolvable {
                reference: reference.to_owned(),
            })
    }

    /// Fetch raw bytes, blocking the calling thread
    pub fn fetch(&self, reference: &str) -> Result<Bytes, ImageError> {
        self.source_for(reference)?.get_image(reference)
    }

    /// Fetch raw bytes asynchronously
    pub async fn fetch_async(&self, reference: &str) -> Result<Bytes, ImageError> {
        self.source_for(reference)?.get_image_async(reference).await
    }

    /// Fetch an image and apply a provider contract, blocking
    pub fn process_image(&self, reference: &str, contract: &ImageContract) -> Result<ResolvedImage, ImageError> {
        let data = self.fetch(reference)?;
        Self::apply_contract(reference, data, contract)
    }

    /// Fetch an image and apply a provider contract
    pub async fn process_image_async(
        &self,
        reference: &str,
        contract: &ImageContract,
    ) -> Result<ResolvedImage, ImageError> {
        let data = self.fetch_async(reference).await?;
        Self::apply_contract(reference, data, contract)
    }

    /// Check already-fetched bytes against a contract and encode them
    pub fn apply_contract(reference: &str, data: Bytes, contract: &ImageContract) -> Result<ResolvedImage, ImageError> {
        let format = Self::check_contract(reference, &data, contract)?;
        Ok(ResolvedImage {
            format,
            data: TransportForm::encode(data, contract.requires_base64()),
        })
    }

    /// Check bytes against a contract, returning the detected format
    ///
    /// Size is checked before format, so an oversize payload is rejected
    /// whatever its contents.
    pub fn check_contract(reference: &str, data: &[u8], contract: &ImageContract) -> Result<ImageFormat, ImageError> {
        if !contract.fits(data.len()) {
            return Err(ImageError::TooLarge {
                reference: reference.to_owned(),
                size: data.len(),
                max: contract.max_size_bytes(),
            });
        }

        match ImageFormat::detect(data, reference) {
            Some(format) if contract.permits(format) => Ok(format),
            detected => Err(ImageError::UnsupportedFormat {
                reference: reference.to_owned(),
                format: detected.map_or_else(|| "unknown".to_owned(), |f| f.to_string()),
            }),
        }
    }
}

impl Default for ImageHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ImageHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageHandler")
            .field("sources", &self.source_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use prism_core::Classify;

    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R'];

    /// In-memory source claiming a URI prefix
    struct MemorySource {
        name: &'static str,
        prefix: &'static str,
        data: &'static [u8],
    }

    #[async_trait]
    impl ImageSource for MemorySource {
        fn name(&self) -> &str {
            self.name
        }

        fn can_handle(&self, reference: &str) -> bool {
            reference.starts_with(self.prefix)
        }

        fn get_image(&self, _reference: &str) -> Result<Bytes, ImageError> {
            Ok(Bytes::from_static(self.data))
        }

        async fn get_image_async(&self, reference: &str) -> Result<Bytes, ImageError> {
            self.get_image(reference)
        }
    }

    fn memory(name: &'static str, prefix: &'static str, data: &'static [u8]) -> Arc<dyn ImageSource> {
        Arc::new(MemorySource { name, prefix, data })
    }

    #[test]
    fn built_in_order() {
        assert_eq!(ImageHandler::new().source_names(), vec!["local", "http"]);
    }

    #[test]
    fn first_registered_match_wins() {
        let mut handler = ImageHandler::empty();
        handler.register_source(memory("first", "mem://", PNG));
        handler.register_source(memory("second", "mem://", b"other"));

        assert_eq!(handler.source_for("mem://x").unwrap().name(), "first");
        assert_eq!(&handler.fetch("mem://x").unwrap()[..], PNG);
    }

    #[test]
    fn appended_source_only_sees_declined_references() {
        let mut handler = ImageHandler::new();
        handler.register_source(memory("memory", "mem://", PNG));

        // The local source accepts anything that is not a remote URI
        assert_eq!(handler.source_for("mem://x").unwrap().name(), "local");
        assert_eq!(handler.source_for("https://x/y.png").unwrap().name(), "http");
    }

    #[test]
    fn no_match_is_unresolvable() {
        let err = ImageHandler::empty().fetch("/tmp/a.png").unwrap_err();
        assert!(matches!(err, ImageError::Unresolvable { .. }));
        assert_eq!(err.kind(), prism_core::ErrorKind::UnresolvableReference);
    }

    #[test]
    fn process_encodes_per_contract() {
        let mut handler = ImageHandler::empty();
        handler.register_source(memory("memory", "mem://", PNG));

        let base64 = ImageContract::new(true, 1_000, [ImageFormat::Png]);
        let image = handler.process_image("mem://a", &base64).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert!(image.data.is_base64());

        let raw = ImageContract::new(false, 1_000, [ImageFormat::Png]);
        let image = handler.process_image("mem://a", &raw).unwrap();
        assert_eq!(image.data, TransportForm::Raw(Bytes::from_static(PNG)));
    }

    #[test]
    fn oversize_is_contract_violation_regardless_of_format() {
        let contract = ImageContract::new(true, 4, [ImageFormat::Png]);

        for data in [PNG, b"definitely not an image".as_slice()] {
            let err = ImageHandler::apply_contract("mem://a", Bytes::from_static(data), &contract).unwrap_err();
            assert!(matches!(err, ImageError::TooLarge { .. }), "{err}");
            assert!(err.is_contract_violation());
        }
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let contract = ImageContract::new(true, 1_000, [ImageFormat::Jpeg]);
        let err = ImageHandler::apply_contract("mem://a", Bytes::from_static(PNG), &contract).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat { ref format, .. } if format == "png"));

        let err = ImageHandler::apply_contract("noext", Bytes::from_static(b"????"), &contract).unwrap_err();
        assert!(matches!(err, ImageError::UnsupportedFormat { ref format, .. } if format == "unknown"));
    }

    #[test]
    fn extension_fallback_when_bytes_are_unrecognised() {
        let contract = ImageContract::new(false, 1_000, [ImageFormat::Heic]);
        let image = ImageHandler::apply_contract("s3://b/photo.heic", Bytes::from_static(b"????"), &contract).unwrap();
        assert_eq!(image.format, ImageFormat::Heic);
        assert!(contract.validate_reference(b"????", "s3://b/photo.heic"));
    }

    #[tokio::test]
    async fn async_process_uses_async_fetch() {
        let mut handler = ImageHandler::empty();
        handler.register_source(memory("memory", "mem://", PNG));

        let contract = ImageContract::new(true, 1_000, [ImageFormat::Png]);
        let image = handler.process_image_async("mem://a", &contract).await.unwrap();
        assert_eq!(image.media_type(), "image/png");
    }
}
