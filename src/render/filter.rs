//! # Color Filters
//!
//! Pixel-wise color transforms applied before quantization.
//!
//! Every filter maps a fully transparent pixel (alpha 0) to opaque white
//! before doing any math of its own, so transparent areas of a logo never
//! print.
//!
//! ## Grayscale
//!
//! ```text
//! gray = round((r·wr + g·wg + b·wb) / 100), clamped to [0, 255]
//! ```
//!
//! | Preset | Weights | Effect |
//! |--------|---------|--------|
//! | `LUMINANCE` | 30 59 11 | Perceptual luminance |
//! | `DARK_GRAY` | 50 50 50 | Darkens mid tones |
//! | `MEDIUM_GRAY` | 120 120 120 | Lightens |
//! | `LIGHT_GRAY` | 200 200 200 | Lightens strongly |
//! | `NOT_GRAY` | 250 200 200 | Reddish emphasis |
//! | `BLACK` | 0 0 0 | Everything black |
//! | `WHITE` | 255 255 255 | Nearly everything white |
//!
//! ## Sepia
//!
//! ```text
//! r' = 0.393 r + 0.769 g + 0.189 b
//! g' = 0.349 r + 0.686 g + 0.168 b
//! b' = 0.272 r + 0.534 g + 0.131 b
//! ```

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use tracing::debug;

use crate::bitmap::{Pixel, PixelGrid};
use crate::error::ZplError;

/// Per-channel weights for [`ColorFilter::Grayscale`], in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayWeights {
    pub r: u32,
    pub g: u32,
    pub b: u32,
}

impl GrayWeights {
    pub const LUMINANCE: Self = Self::new(30, 59, 11);
    pub const DARK_GRAY: Self = Self::uniform(50);
    pub const MEDIUM_GRAY: Self = Self::uniform(120);
    pub const LIGHT_GRAY: Self = Self::uniform(200);
    pub const NOT_GRAY: Self = Self::new(250, 200, 200);
    pub const BLACK: Self = Self::uniform(0);
    pub const WHITE: Self = Self::uniform(255);

    pub const fn new(r: u32, g: u32, b: u32) -> Self {
        Self { r, g, b }
    }

    pub const fn uniform(w: u32) -> Self {
        Self::new(w, w, w)
    }
}

/// A pixel-wise color transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFilter {
    /// Weighted sum replicated to r, g and b. Alpha is preserved.
    Grayscale(GrayWeights),
    /// Classic sepia tone. Alpha is preserved.
    Sepia,
}

impl ColorFilter {
    /// Names accepted by [`FromStr`].
    pub const NAMES: &'static [&'static str] = &[
        "luminance",
        "dark-gray",
        "medium-gray",
        "light-gray",
        "not-gray",
        "black",
        "white",
        "sepia",
    ];

    /// Transform one pixel.
    ///
    /// ```
    /// use zpl_image::bitmap::Pixel;
    /// use zpl_image::render::filter::{ColorFilter, GrayWeights};
    ///
    /// let gray = ColorFilter::Grayscale(GrayWeights::LUMINANCE);
    /// assert_eq!(gray.apply(Pixel::rgb(100, 100, 100)), Pixel::rgb(100, 100, 100));
    ///
    /// // Transparent input becomes opaque white whatever its color
    /// assert_eq!(gray.apply(Pixel::new(0, 0, 0, 0)), Pixel::WHITE);
    /// ```
    pub fn apply(&self, pixel: Pixel) -> Pixel {
        if pixel.is_transparent() {
            return Pixel::WHITE;
        }

        match *self {
            Self::Grayscale(w) => {
                let sum = pixel.r as u32 * w.r + pixel.g as u32 * w.g + pixel.b as u32 * w.b;
                // Integer round-half-up of sum / 100
                let gray = ((sum + 50) / 100).min(255) as u8;
                Pixel::new(gray, gray, gray, pixel.a)
            }
            Self::Sepia => {
                let (r, g, b) = (pixel.r as f32, pixel.g as f32, pixel.b as f32);
                let nr = 0.393 * r + 0.769 * g + 0.189 * b;
                let ng = 0.349 * r + 0.686 * g + 0.168 * b;
                let nb = 0.272 * r + 0.534 * g + 0.131 * b;
                Pixel::clamped(nr as i32, ng as i32, nb as i32, pixel.a as i32)
            }
        }
    }

    /// Apply to every pixel of a grid in place. Rows are processed in
    /// parallel.
    pub fn apply_to(&self, grid: &mut PixelGrid) {
        debug!(filter = %self, width = grid.width(), height = grid.height(), "Applying color filter");
        let width = grid.width();
        grid.pixels_mut().par_chunks_mut(width).for_each(|row| {
            for p in row.iter_mut() {
                *p = self.apply(*p);
            }
        });
    }
}

impl fmt::Display for ColorFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grayscale(w) => write!(f, "grayscale({}, {}, {})", w.r, w.g, w.b),
            Self::Sepia => write!(f, "sepia"),
        }
    }
}

impl FromStr for ColorFilter {
    type Err = ZplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let weights = match s.to_lowercase().replace('_', "-").as_str() {
            "luminance" | "grayscale" | "default" => GrayWeights::LUMINANCE,
            "dark-gray" => GrayWeights::DARK_GRAY,
            "medium-gray" => GrayWeights::MEDIUM_GRAY,
            "light-gray" => GrayWeights::LIGHT_GRAY,
            "not-gray" => GrayWeights::NOT_GRAY,
            "black" => GrayWeights::BLACK,
            "white" => GrayWeights::WHITE,
            "sepia" => return Ok(Self::Sepia),
            _ => {
                return Err(ZplError::Config(format!(
                    "unknown filter '{}' (expected one of: {})",
                    s,
                    Self::NAMES.join(", ")
                )));
            }
        };
        Ok(Self::Grayscale(weights))
    }
}
