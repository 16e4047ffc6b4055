//! Shared fixtures for integration tests

#![allow(dead_code)]

pub mod config;
pub mod image_server;

use std::io::Write;

/// Smallest byte strings the format sniffer recognises
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R'];
pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0];
pub const WEBP: &[u8] = &[b'R', b'I', b'F', b'F', 0x24, 0, 0, 0, b'W', b'E', b'B', b'P', b'V', b'P', b'8', b' '];

/// Write `bytes` to a temporary file with the given extension
pub fn image_file(bytes: &[u8], suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(bytes).unwrap();
    file
}

/// Parse a formatter payload
pub fn parse(body: &str) -> serde_json::Value {
    serde_json::from_str(body).unwrap()
}
