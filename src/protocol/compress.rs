//! # Payload Compression
//!
//! Turns packed raster bytes into the text that follows `:Z64:`:
//!
//! ```text
//! raster bytes ──zlib──► compressed ──base64──► text ──crc16──► checksum
//! ```
//!
//! The compressed stream carries the two-byte zlib header and the Adler-32
//! trailer (RFC 1950), not a raw DEFLATE stream. Base64 uses the standard
//! alphabet with padding and no line breaks, because the whole payload must
//! sit on one line of the command.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use tracing::debug;

use super::checksum::checksum;
use crate::error::{Result, ZplError};

/// Output of [`compress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    /// zlib stream.
    pub compressed: Vec<u8>,
    /// Base64 of `compressed`.
    pub text: String,
    /// CRC-16 of `text`, four uppercase hex digits.
    pub checksum: String,
}

/// zlib-compress `data` at the default level.
pub fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 4 + 16), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ZplError::Compression(format!("write failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| ZplError::Compression(format!("finish failed: {}", e)))
}

/// Compress, base64-encode and checksum raster bytes.
///
/// ```
/// use zpl_image::protocol::compress::compress;
///
/// let payload = compress(&[0xFF; 64]).unwrap();
/// assert!(payload.compressed.len() < 64);
/// assert!(!payload.text.contains('\n'));
/// assert_eq!(payload.checksum.len(), 4);
/// ```
pub fn compress(data: &[u8]) -> Result<EncodedPayload> {
    let compressed = deflate(data)?;
    let text = STANDARD.encode(&compressed);
    let checksum = checksum(&text);

    debug!(
        raw = data.len(),
        compressed = compressed.len(),
        text = text.len(),
        checksum = %checksum,
        "Compressed raster payload"
    );

    Ok(EncodedPayload {
        compressed,
        text,
        checksum,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::ZlibDecoder;

    use super::*;

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        ZlibDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_deflate_roundtrip() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 31 % 251) as u8).collect();
        assert_eq!(inflate(&deflate(&data).unwrap()), data);
    }

    #[test]
    fn test_zlib_header() {
        let compressed = deflate(&[0u8; 100]).unwrap();
        // CM = 8 (deflate), and the header is a multiple of 31
        assert_eq!(compressed[0] & 0x0F, 8);
        assert_eq!(((compressed[0] as u16) << 8 | compressed[1] as u16) % 31, 0);
    }

    #[test]
    fn test_empty_input_is_valid_stream() {
        let payload = compress(&[]).unwrap();
        assert!(!payload.compressed.is_empty());
        assert!(inflate(&payload.compressed).is_empty());
        assert!(!payload.text.is_empty());
    }

    #[test]
    fn test_text_is_base64_of_compressed() {
        let payload = compress(b"raster raster raster").unwrap();
        assert_eq!(STANDARD.decode(&payload.text).unwrap(), payload.compressed);
        assert!(
            payload
                .text
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=')
        );
    }

    #[test]
    fn test_checksum_covers_text() {
        let payload = compress(&[0xAA; 300]).unwrap();
        assert_eq!(payload.checksum, checksum(&payload.text));
    }

    #[test]
    fn test_no_line_breaks_on_large_input() {
        let data: Vec<u8> = (0..20_000u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
        let payload = compress(&data).unwrap();
        assert!(payload.text.len() > 76);
        assert!(!payload.text.contains('\n'));
        assert!(!payload.text.contains('\r'));
    }
}
