use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Image encodings a provider may accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImageFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG / JFIF
    Jpeg,
    /// Graphics Interchange Format
    Gif,
    /// WebP
    Webp,
    /// HEIC / HEIF
    Heic,
}

impl ImageFormat {
    /// MIME type used in data URIs and inline payloads
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
            Self::Heic => "image/heic",
        }
    }

    /// Map a MIME type to a format, accepting common aliases
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or(mime).trim();
        match essence.to_ascii_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            "image/heic" | "image/heif" | "image/heic-sequence" | "image/heif-sequence" => Some(Self::Heic),
            _ => None,
        }
    }

    /// Detect the format from the leading bytes (magic numbers)
    pub fn sniff(data: &[u8]) -> Option<Self> {
        infer::get(data).and_then(|kind| Self::from_mime(kind.mime_type()))
    }

    /// Guess the format from a path or URL extension
    pub fn from_path(path_or_url: &str) -> Option<Self> {
        let path = path_or_url.split(['?', '#']).next().unwrap_or(path_or_url);
        mime_guess::from_path(path)
            .iter_raw()
            .find_map(Self::from_mime)
    }

    /// Detect from bytes, falling back to the reference's extension
    pub fn detect(data: &[u8], reference: &str) -> Option<Self> {
        Self::sniff(data).or_else(|| Self::from_path(reference))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn parses_tags_case_insensitively() {
        assert_eq!(ImageFormat::from_str("PNG").unwrap(), ImageFormat::Png);
        assert_eq!(ImageFormat::from_str("heic").unwrap(), ImageFormat::Heic);
        assert!(ImageFormat::from_str("bmp").is_err());
    }

    #[test]
    fn mime_aliases() {
        assert_eq!(ImageFormat::from_mime("image/jpg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_mime("image/heif"), Some(ImageFormat::Heic));
        assert_eq!(ImageFormat::from_mime("image/png; charset=binary"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_mime("text/plain"), None);
    }

    #[test]
    fn sniffs_magic_numbers() {
        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
        assert_eq!(ImageFormat::sniff(&png), Some(ImageFormat::Png));

        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];
        assert_eq!(ImageFormat::sniff(&jpeg), Some(ImageFormat::Jpeg));

        assert_eq!(ImageFormat::sniff(b"GIF89a\x01\x00"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"plain text"), None);
    }

    #[test]
    fn extension_fallback_ignores_query() {
        assert_eq!(ImageFormat::from_path("photos/cat.JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(
            ImageFormat::from_path("https://cdn.example.com/a.webp?sig=abc"),
            Some(ImageFormat::Webp)
        );
        assert_eq!(ImageFormat::detect(b"????", "s3://bucket/key.gif"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect(b"????", "noext"), None);
    }
}
