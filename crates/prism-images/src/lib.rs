//! Image acquisition for Prism
//!
//! Resolves image references (local paths, HTTP(S) URLs, `s3://` URIs) to
//! bytes and applies a provider's [`ImageContract`](prism_config::ImageContract)
//! to produce the transport form embedded in request payloads.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod handler;
pub mod source;

pub use error::{BoxError, ImageError};
pub use handler::ImageHandler;
pub use source::http::HttpImageSource;
pub use source::local::LocalImageSource;
pub use source::s3::{S3ImageSource, parse_s3_uri, s3_client_from_config};
pub use source::{ImageSource, is_http_reference, is_s3_reference};
