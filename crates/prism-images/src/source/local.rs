//! Local filesystem image source

use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;

use super::{ImageSource, is_http_reference, is_s3_reference};
use crate::error::ImageError;

/// Optional scheme accepted in front of local paths
const FILE_SCHEME: &str = "file://";

/// Reads images from the local filesystem
///
/// Accepts every reference that is neither an HTTP(S) URL nor an S3 URI.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalImageSource;

impl LocalImageSource {
    /// Create a local source
    pub const fn new() -> Self {
        Self
    }

    fn path(reference: &str) -> Result<PathBuf, ImageError> {
        let path = reference.strip_prefix(FILE_SCHEME).unwrap_or(reference);
        if path.is_empty() {
            return Err(ImageError::invalid(reference, "empty path"));
        }
        Ok(PathBuf::from(path))
    }
}

#[async_trait]
impl ImageSource for LocalImageSource {
    fn name(&self) -> &str {
        "local"
    }

    fn can_handle(&self, reference: &str) -> bool {
        !is_http_reference(reference) && !is_s3_reference(reference)
    }

    fn get_image(&self, reference: &str) -> Result<Bytes, ImageError> {
        let path = Self::path(reference)?;
        let data = std::fs::read(&path).map_err(|e| ImageError::fetch_failed(reference, e))?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "read local image");
        Ok(Bytes::from(data))
    }

    async fn get_image_async(&self, reference: &str) -> Result<Bytes, ImageError> {
        let path = Self::path(reference)?;

        // Filesystem reads block; run them on the blocking pool
        let read = tokio::task::spawn_blocking(move || std::fs::read(path))
            .await
            .map_err(|e| ImageError::fetch_failed(reference, e))?;

        let data = read.map_err(|e| ImageError::fetch_failed(reference, e))?;
        tracing::debug!(reference, bytes = data.len(), "read local image");
        Ok(Bytes::from(data))
    }
}
