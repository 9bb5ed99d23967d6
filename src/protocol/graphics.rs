//! # ZPL Graphic Field
//!
//! Assembles the `^FO` / `^GFA` command that places a compressed raster on a
//! label.
//!
//! ## Command Layout
//!
//! ```text
//! [^XA]^FO{x},{y}^GFA,{total},{total},{bytes_per_row},:Z64:{payload}:{crc}[^XZ]\n
//!  │    │         │    │       │       │               │     │         │
//!  │    │         │    │       │       │               │     │         └ CRC-16 of payload
//!  │    │         │    │       │       │               │     └ base64(zlib(raster))
//!  │    │         │    │       │       │               └ compressed + base64 marker
//!  │    │         │    │       │       └ raster row length in bytes
//!  │    │         │    │       └ total raster bytes (field count)
//!  │    │         │    └ total raster bytes (binary byte count)
//!  │    │         └ A = ASCII data format
//!  │    └ field origin in dots
//!  └ optional label start, paired with ^XZ
//! ```
//!
//! ## Coordinate System
//!
//! ```text
//! (0,0) ──────────────────────► X (dots)
//!   │
//!   │   ^FO x,y puts the top-left corner of the graphic here
//!   │
//!   ▼
//!   Y (label feed direction)
//! ```

use std::fmt;

use super::compress::EncodedPayload;
use crate::render::raster::RasterImage;

/// Label start.
pub const LABEL_START: &str = "^XA";
/// Label end.
pub const LABEL_END: &str = "^XZ";

/// A fully resolved `^GFA` graphic field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphicField {
    pub x: u32,
    pub y: u32,
    /// Raster length in bytes: `bytes_per_row * height`.
    pub total_bytes: usize,
    pub bytes_per_row: usize,
    /// Base64 text following `:Z64:`.
    pub payload: String,
    /// Checksum text following the payload.
    pub checksum: String,
}

impl GraphicField {
    /// Field for `raster` at origin `(x, y)` carrying its encoded `payload`.
    pub fn new(x: u32, y: u32, raster: &RasterImage, payload: EncodedPayload) -> Self {
        Self {
            x,
            y,
            total_bytes: raster.total_bytes(),
            bytes_per_row: raster.bytes_per_row(),
            payload: payload.text,
            checksum: payload.checksum,
        }
    }

    /// # Encode Graphic Field
    ///
    /// ## Protocol Details
    ///
    /// | Part | Text |
    /// |------|------|
    /// | Origin | `^FO{x},{y}` |
    /// | Graphic | `^GFA,{total},{total},{bytes_per_row},` |
    /// | Data | `:Z64:{payload}:{crc}` |
    ///
    /// With `wrap_label` the field is bracketed by `^XA` and `^XZ` so it
    /// prints as a label on its own. The result always ends with a single
    /// `\n`.
    ///
    /// ## Example
    ///
    /// ```
    /// use zpl_image::protocol::graphics::GraphicField;
    ///
    /// let field = GraphicField {
    ///     x: 10,
    ///     y: 20,
    ///     total_bytes: 4,
    ///     bytes_per_row: 1,
    ///     payload: "eJz7wP+BHwAF4AH/".to_string(),
    ///     checksum: "E39E".to_string(),
    /// };
    ///
    /// assert_eq!(
    ///     field.encode(false),
    ///     "^FO10,20^GFA,4,4,1,:Z64:eJz7wP+BHwAF4AH/:E39E\n"
    /// );
    /// assert!(field.encode(true).starts_with("^XA^FO10,20"));
    /// assert!(field.encode(true).ends_with(":E39E^XZ\n"));
    /// ```
    pub fn encode(&self, wrap_label: bool) -> String {
        let mut out = String::with_capacity(self.payload.len() + 64);
        if wrap_label {
            out.push_str(LABEL_START);
        }
        out.push_str(&self.to_string());
        if wrap_label {
            out.push_str(LABEL_END);
        }
        out.push('\n');
        out
    }
}

/// The bare field without label wrapping or trailing newline.
impl fmt::Display for GraphicField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "^FO{},{}^GFA,{},{},{},:Z64:{}:{}",
            self.x,
            self.y,
            self.total_bytes,
            self.total_bytes,
            self.bytes_per_row,
            self.payload,
            self.checksum
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::protocol::compress::compress;

    fn empty_field() -> GraphicField {
        GraphicField {
            x: 0,
            y: 0,
            total_bytes: 0,
            bytes_per_row: 0,
            payload: String::new(),
            checksum: "0000".to_string(),
        }
    }

    #[test]
    fn test_zero_size_field_is_well_formed() {
        assert_eq!(empty_field().encode(false), "^FO0,0^GFA,0,0,0,:Z64::0000\n");
        assert_eq!(empty_field().encode(true), "^XA^FO0,0^GFA,0,0,0,:Z64::0000^XZ\n");
    }

    #[test]
    fn test_single_trailing_newline() {
        for wrap in [false, true] {
            let text = empty_field().encode(wrap);
            assert!(text.ends_with('\n'));
            assert_eq!(text.matches('\n').count(), 1);
        }
    }

    #[test]
    fn test_from_raster() {
        let raster = RasterImage::from_packed(10, 3, 127, vec![0xFF, 0xC0, 0, 0, 0xFF, 0xC0]).unwrap();
        let payload = compress(raster.data()).unwrap();
        let text = payload.text.clone();
        let crc = payload.checksum.clone();
        let field = GraphicField::new(5, 7, &raster, payload);

        assert_eq!(field.total_bytes, 6);
        assert_eq!(field.bytes_per_row, 2);
        assert_eq!(
            field.encode(false),
            format!("^FO5,7^GFA,6,6,2,:Z64:{}:{}\n", text, crc)
        );
    }

    #[test]
    fn test_display_matches_unwrapped_body() {
        let field = empty_field();
        assert_eq!(format!("{}\n", field), field.encode(false));
    }
}
