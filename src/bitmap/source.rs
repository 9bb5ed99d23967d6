//! # Image Sources
//!
//! Resolves a `source` string into decoded pixels. Supported forms:
//!
//! | Form | Example |
//! |------|---------|
//! | `data:` URI | `data:image/png;base64,iVBORw0...` |
//! | HTTP(S) URL | `https://example.com/logo.png` |
//! | `file://` URI | `file:///tmp/logo.png` |
//! | Plain path | `./logo.png` |
//!
//! Decoding is delegated to the `image` crate.

use std::fmt;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use super::grid::PixelGrid;
use crate::error::{Result, ZplError};

/// Where image bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Local file.
    Path(PathBuf),
    /// HTTP or HTTPS URL.
    Url(String),
    /// Base64 text (the part after the comma of a `data:` URI).
    Embedded(String),
}

impl ImageSource {
    /// Classify a source string.
    ///
    /// ```
    /// use zpl_image::bitmap::ImageSource;
    ///
    /// assert_eq!(
    ///     ImageSource::parse("data:image/png;base64,AAAA").unwrap(),
    ///     ImageSource::Embedded("AAAA".to_string())
    /// );
    /// assert!(matches!(ImageSource::parse("https://x/y.png").unwrap(), ImageSource::Url(_)));
    /// assert!(matches!(ImageSource::parse("logo.png").unwrap(), ImageSource::Path(_)));
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let source = source.trim();
        if source.is_empty() {
            return Err(ZplError::SourceNotFound("image source not specified".to_string()));
        }

        if let Some(rest) = source.strip_prefix("data:") {
            let (_, payload) = rest.split_once(',').ok_or_else(|| {
                ZplError::Decode("data URI is missing the ',' before its payload".to_string())
            })?;
            return Ok(Self::Embedded(payload.to_string()));
        }

        if source.starts_with("http://") || source.starts_with("https://") {
            return Ok(Self::Url(source.to_string()));
        }

        if let Some(path) = source.strip_prefix("file://") {
            return Ok(Self::Path(PathBuf::from(path)));
        }

        Ok(Self::Path(PathBuf::from(source)))
    }

    /// Fetch the raw encoded bytes.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Path(path) => {
                debug!(path = %path.display(), "Reading image file");
                std::fs::read(path).map_err(|e| match e.kind() {
                    std::io::ErrorKind::NotFound => {
                        ZplError::SourceNotFound(format!("file '{}' not found", path.display()))
                    }
                    _ => ZplError::Io(e),
                })
            }
            Self::Url(url) => {
                debug!(url, "Fetching image");
                let response = reqwest::blocking::get(url)
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| ZplError::SourceNotFound(format!("'{}': {}", url, e)))?;
                let bytes = response
                    .bytes()
                    .map_err(|e| ZplError::SourceNotFound(format!("'{}': {}", url, e)))?;
                Ok(bytes.to_vec())
            }
            Self::Embedded(text) => {
                debug!(len = text.len(), "Decoding embedded image");
                // Line breaks are common in pasted base64
                let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                STANDARD
                    .decode(compact)
                    .map_err(|e| ZplError::Decode(format!("invalid base64 image data: {}", e)))
            }
        }
    }

    /// Fetch and decode into a [`PixelGrid`].
    pub fn load(&self) -> Result<PixelGrid> {
        let bytes = self.read_bytes()?;
        decode_image(&bytes)
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
            Self::Embedded(text) => write!(f, "<embedded, {} chars>", text.len()),
        }
    }
}

/// Decode encoded image bytes (PNG, JPEG, GIF, BMP, ...) into a grid.
pub fn decode_image(bytes: &[u8]) -> Result<PixelGrid> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ZplError::Decode(format!("failed to decode image: {}", e)))?;
    debug!(width = img.width(), height = img.height(), "Decoded image");
    PixelGrid::from_rgba_image(&img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Pixel;

    fn png_bytes() -> Vec<u8> {
        let mut grid = PixelGrid::new(3, 2).unwrap();
        grid.set(0, 0, Pixel::BLACK).unwrap();
        let mut bytes = Vec::new();
        grid.to_rgba_image()
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("Failed to encode PNG");
        bytes
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            ImageSource::parse("file:///tmp/a.png").unwrap(),
            ImageSource::Path(PathBuf::from("/tmp/a.png"))
        );
        assert_eq!(
            ImageSource::parse("http://host/a.png").unwrap(),
            ImageSource::Url("http://host/a.png".to_string())
        );
        assert_eq!(
            ImageSource::parse("  ./a.png ").unwrap(),
            ImageSource::Path(PathBuf::from("./a.png"))
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(ImageSource::parse(""), Err(ZplError::SourceNotFound(_))));
    }

    #[test]
    fn test_parse_data_uri_without_comma() {
        assert!(matches!(
            ImageSource::parse("data:image/png;base64"),
            Err(ZplError::Decode(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let source = ImageSource::Path(PathBuf::from("/definitely/not/here.png"));
        assert!(matches!(source.load(), Err(ZplError::SourceNotFound(_))));
    }

    #[test]
    fn test_embedded_roundtrip() {
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes()));
        let grid = ImageSource::parse(&uri).unwrap().load().unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.get(0, 0).unwrap(), Pixel::BLACK);
        assert_eq!(grid.get(1, 0).unwrap(), Pixel::WHITE);
    }

    #[test]
    fn test_embedded_invalid_base64() {
        let source = ImageSource::Embedded("!!not base64!!".to_string());
        assert!(matches!(source.load(), Err(ZplError::Decode(_))));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(decode_image(b"not an image"), Err(ZplError::Decode(_))));
    }
}
