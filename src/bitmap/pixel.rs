//! # Pixels
//!
//! A [`Pixel`] holds four 8-bit channels. The packed form is a `u32` in ARGB
//! order, which is what filters and ditherers exchange when a single value is
//! more convenient than a struct.
//!
//! ```text
//!   31      24 23      16 15       8 7        0
//!  ┌──────────┬──────────┬──────────┬──────────┐
//!  │  alpha   │   red    │  green   │   blue   │
//!  └──────────┴──────────┴──────────┴──────────┘
//! ```

/// Alpha values below this are treated as white when computing gray levels.
pub const TRANSPARENT_CUTOFF: u8 = 128;

/// One RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// Opaque white (`0xFFFFFFFF`).
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Opaque black (`0xFF000000`).
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully opaque pixel.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same value on all three color channels, opaque.
    #[inline]
    pub const fn gray_level(v: u8) -> Self {
        Self::rgb(v, v, v)
    }

    /// Build a pixel from channel values that may fall outside [0, 255].
    ///
    /// Each channel is clamped, so the result always satisfies the channel
    /// range invariant.
    #[inline]
    pub fn clamped(r: i32, g: i32, b: i32, a: i32) -> Self {
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
            a: clamp_channel(a),
        }
    }

    /// Unpack an ARGB `u32`.
    ///
    /// ```
    /// use zpl_image::bitmap::Pixel;
    ///
    /// let p = Pixel::from_argb(0xFF102030);
    /// assert_eq!(p, Pixel::new(0x10, 0x20, 0x30, 0xFF));
    /// ```
    #[inline]
    pub const fn from_argb(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Pack into an ARGB `u32`.
    #[inline]
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// `true` when alpha is exactly zero.
    #[inline]
    pub const fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Replace fully transparent pixels with opaque white.
    ///
    /// Every filter and ditherer runs this before its own math.
    #[inline]
    pub const fn flatten(self) -> Self {
        if self.is_transparent() { Self::WHITE } else { self }
    }

    /// Luminance in [0, 255] with the transparency rule applied.
    ///
    /// Pixels with alpha below [`TRANSPARENT_CUTOFF`] count as white (255);
    /// otherwise `round(0.299 r + 0.587 g + 0.114 b)`.
    ///
    /// ```
    /// use zpl_image::bitmap::Pixel;
    ///
    /// assert_eq!(Pixel::BLACK.gray(), 0);
    /// assert_eq!(Pixel::WHITE.gray(), 255);
    /// assert_eq!(Pixel::new(0, 0, 0, 10).gray(), 255);
    /// ```
    #[inline]
    pub fn gray(self) -> u8 {
        if self.a < TRANSPARENT_CUTOFF {
            return 255;
        }
        let lum = 0.299 * self.r as f32 + 0.587 * self.g as f32 + 0.114 * self.b as f32;
        clamp_channel(lum.round() as i32)
    }

    /// Channels as `[r, g, b, a]`.
    #[inline]
    pub const fn channels(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    pub const fn from_channels(c: [u8; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<u32> for Pixel {
    fn from(argb: u32) -> Self {
        Self::from_argb(argb)
    }
}

impl From<Pixel> for u32 {
    fn from(p: Pixel) -> Self {
        p.to_argb()
    }
}

/// Clamp an intermediate channel value into [0, 255].
#[inline]
pub fn clamp_channel(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_roundtrip_constants() {
        assert_eq!(Pixel::BLACK.to_argb(), 0xFF000000);
        assert_eq!(Pixel::WHITE.to_argb(), 0xFFFFFFFF);
        assert_eq!(Pixel::from_argb(0x80FF0000), Pixel::new(255, 0, 0, 128));
    }

    #[test]
    fn test_clamped() {
        assert_eq!(Pixel::clamped(-20, 300, 128, 999), Pixel::new(0, 255, 128, 255));
    }

    #[test]
    fn test_gray_weights() {
        // 0.299 * 255 = 76.245
        assert_eq!(Pixel::rgb(255, 0, 0).gray(), 76);
        // 0.587 * 255 = 149.685
        assert_eq!(Pixel::rgb(0, 255, 0).gray(), 150);
        // 0.114 * 255 = 29.07
        assert_eq!(Pixel::rgb(0, 0, 255).gray(), 29);
    }

    #[test]
    fn test_gray_transparency_rule() {
        assert_eq!(Pixel::new(0, 0, 0, 127).gray(), 255);
        assert_eq!(Pixel::new(0, 0, 0, 128).gray(), 0);
    }

    #[test]
    fn test_flatten() {
        assert_eq!(Pixel::new(12, 34, 56, 0).flatten(), Pixel::WHITE);
        let p = Pixel::new(12, 34, 56, 1);
        assert_eq!(p.flatten(), p);
    }
}
