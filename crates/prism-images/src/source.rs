//! Image source trait and built-in implementations

pub mod http;
pub mod local;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ImageError;

/// URI scheme prefix for S3 references
pub const S3_SCHEME: &str = "s3://";

/// Trait implemented by each image backend
///
/// `can_handle` must be a pure test over the reference's text; fetch
/// methods wrap every transport failure in [`ImageError`].
#[async_trait]
pub trait ImageSource: Send + Sync {
    /// Short name used in logs (e.g. `local`, `http`, `s3`)
    fn name(&self) -> &str;

    /// Whether this source services the reference
    fn can_handle(&self, reference: &str) -> bool;

    /// Fetch the image, blocking the calling thread
    ///
    /// Must not be called from inside an async runtime.
    fn get_image(&self, reference: &str) -> Result<Bytes, ImageError>;

    /// Fetch the image without blocking the scheduler
    async fn get_image_async(&self, reference: &str) -> Result<Bytes, ImageError>;
}

/// Whether the reference is an HTTP(S) URL
pub fn is_http_reference(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// Whether the reference is an S3 URI
pub fn is_s3_reference(reference: &str) -> bool {
    reference.starts_with(S3_SCHEME)
}

/// Reject blocking fetches issued from inside an async runtime
///
/// Blocking HTTP clients and nested runtimes panic in that situation, so
/// the caller gets a source error instead.
pub(crate) fn ensure_blocking_context(reference: &str) -> Result<(), ImageError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ImageError::fetch_failed(
            reference,
            "blocking fetch issued from inside an async runtime; use the async API",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_detection() {
        assert!(is_http_reference("http://example.com/a.png"));
        assert!(is_http_reference("https://example.com/a.png"));
        assert!(!is_http_reference("httpx://example.com"));
        assert!(is_s3_reference("s3://bucket/key.png"));
        assert!(!is_s3_reference("/tmp/s3://odd"));
    }
}
