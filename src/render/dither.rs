//! # Dithering
//!
//! Area-based monochrome quantizers. Each algorithm rewrites a
//! [`PixelGrid`] in place so that every channel ends up fully saturated
//! (0 or 255); the raster packer then only has to split black from white.
//!
//! ## Algorithms
//!
//! | Algorithm | Kind | Channels | Parallel |
//! |-----------|------|----------|----------|
//! | Floyd-Steinberg | Error diffusion | r, g, b, a independently | No |
//! | Floyd-Steinberg palette | Error diffusion | Nearest of 8 colors | No |
//! | Sierra | Error diffusion | Red as gray proxy | No |
//! | Ordered | Threshold matrix | r, g, b, a independently | Rows |
//! | Halftone | Single threshold | Mean of r, g, b | Rows |
//!
//! Fully transparent pixels are turned into opaque white before any
//! algorithm runs.
//!
//! ## Error Diffusion Kernels
//!
//! ```text
//! Floyd-Steinberg (/16)        Sierra (/32)
//!
//!        X   7                          X   5   3
//!    3   5   1                  2   4   5   4   2
//!                                   2   3   2
//! ```
//!
//! Error diffusion reads values written earlier in the same raster scan, so
//! these passes run strictly top-to-bottom, left-to-right. Floyd-Steinberg
//! writes diffused values back into the grid, clamped to 0..=255; the
//! palette variant and Sierra keep separate error buffers. Taps that fall
//! outside the grid are dropped.
//!
//! ## Ordered Dithering
//!
//! For each pixel and channel, `value / 255` is compared with
//! `matrix[x mod N][y mod N]`:
//!
//! ```text
//! 2x2 (/5)       4x4 (/17)
//! 1  3           1  9  3 11
//! 4  2          13  5 15  7
//!                4 12  2 10
//!               16  8 14  6
//! ```

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use tracing::debug;

use crate::bitmap::pixel::{TRANSPARENT_CUTOFF, clamp_channel};
use crate::bitmap::{Pixel, PixelGrid};
use crate::error::ZplError;

/// Binarization cut for Floyd-Steinberg channels.
const MIDPOINT: u8 = 128;

/// Sierra compares the accumulated gray value against this.
const SIERRA_MIDPOINT: i32 = 127;

// ============================================================================
// DITHER MATRICES
// ============================================================================

/// Square threshold matrix for ordered dithering.
///
/// Stored as integer numerators over a common divisor so the tables stay
/// exact; every threshold lies strictly inside (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DitherMatrix {
    size: usize,
    divisor: u16,
    cells: &'static [u8],
}

const ORDERED_2X2: [u8; 4] = [
    1, 3, //
    4, 2,
];

const ORDERED_4X4: [u8; 16] = [
    1, 9, 3, 11, //
    13, 5, 15, 7, //
    4, 12, 2, 10, //
    16, 8, 14, 6,
];

const ORDERED_8X8: [u8; 64] = [
    1, 49, 13, 61, 4, 52, 16, 64, //
    33, 17, 45, 29, 36, 20, 48, 32, //
    9, 57, 5, 53, 12, 60, 8, 56, //
    41, 25, 37, 21, 44, 28, 40, 24, //
    3, 51, 15, 63, 2, 50, 14, 62, //
    35, 19, 47, 31, 34, 18, 46, 30, //
    11, 59, 7, 55, 10, 58, 6, 54, //
    43, 27, 39, 23, 42, 26, 38, 22,
];

impl DitherMatrix {
    /// 2x2 matrix, thresholds k/5.
    pub const ORDERED_2: Self = Self {
        size: 2,
        divisor: 5,
        cells: &ORDERED_2X2,
    };

    /// 4x4 matrix, thresholds k/17.
    pub const ORDERED_4: Self = Self {
        size: 4,
        divisor: 17,
        cells: &ORDERED_4X4,
    };

    /// 8x8 Bayer-style matrix, thresholds k/65.
    pub const ORDERED_8: Self = Self {
        size: 8,
        divisor: 65,
        cells: &ORDERED_8X8,
    };

    /// Side length N.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Threshold in (0, 1) for pixel `(x, y)`: `matrix[x mod N][y mod N]`.
    ///
    /// ```
    /// use zpl_image::render::dither::DitherMatrix;
    ///
    /// let m = DitherMatrix::ORDERED_2;
    /// assert_eq!(m.threshold(0, 0), 0.2);
    /// assert_eq!(m.threshold(0, 1), 0.6);
    /// assert_eq!(m.threshold(3, 2), m.threshold(1, 0));
    /// ```
    #[inline]
    pub fn threshold(&self, x: usize, y: usize) -> f32 {
        let n = self.size;
        self.cells[(x % n) * n + (y % n)] as f32 / self.divisor as f32
    }
}

// ============================================================================
// ERROR DIFFUSION KERNELS
// ============================================================================

/// Error diffusion kernel: `(dx, dy, weight)` taps over a common divisor.
struct Kernel {
    divisor: i32,
    taps: &'static [(isize, isize, i32)],
}

const FLOYD_STEINBERG: Kernel = Kernel {
    divisor: 16,
    taps: &[(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)],
};

const SIERRA: Kernel = Kernel {
    divisor: 32,
    taps: &[
        (1, 0, 5),
        (2, 0, 3),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 5),
        (1, 1, 4),
        (2, 1, 2),
        (-1, 2, 2),
        (0, 2, 3),
        (1, 2, 2),
    ],
};

/// Index of `(x + dx, y + dy)` if it lies inside a `width` x `height` grid.
#[inline]
fn neighbor(x: usize, y: usize, dx: isize, dy: isize, width: usize, height: usize) -> Option<usize> {
    let nx = x.checked_add_signed(dx)?;
    let ny = y.checked_add_signed(dy)?;
    (nx < width && ny < height).then_some(ny * width + nx)
}

/// Fixed palette for the palette variant of Floyd-Steinberg.
pub const PALETTE: [Pixel; 8] = [
    Pixel::rgb(0, 0, 0),
    Pixel::rgb(255, 0, 0),
    Pixel::rgb(0, 255, 0),
    Pixel::rgb(0, 0, 255),
    Pixel::rgb(0, 255, 255),
    Pixel::rgb(255, 0, 255),
    Pixel::rgb(255, 255, 0),
    Pixel::rgb(255, 255, 255),
];

// ============================================================================
// ALGORITHM SELECTION
// ============================================================================

/// Monochrome quantization strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DitheringAlgorithm {
    /// Per-channel Floyd-Steinberg against 128. Canonical for 1-bit output.
    #[default]
    FloydSteinberg,
    /// Floyd-Steinberg snapping to the nearest of [`PALETTE`]. Produces a
    /// posterized color image rather than pure black and white.
    FloydSteinbergPalette,
    /// Sierra error diffusion on the red channel (expects a gray image).
    Sierra,
    /// Ordered dithering against a threshold matrix.
    Ordered(DitherMatrix),
    /// Plain two-level cut on the mean of r, g and b.
    Halftone { threshold: u8 },
}

impl DitheringAlgorithm {
    /// Names accepted by [`FromStr`].
    pub const NAMES: &'static [&'static str] = &[
        "floyd-steinberg",
        "palette",
        "sierra",
        "ordered2",
        "ordered4",
        "ordered8",
        "halftone",
    ];

    /// Cut point for a bare `"halftone"`; `"halftone:N"` cuts at `N`.
    pub const DEFAULT_HALFTONE_THRESHOLD: u8 = 128;

    /// Whether the output is strictly black and white.
    ///
    /// Only the palette variant keeps color; its raster is still packable
    /// but the ink pattern depends on the packing threshold.
    pub fn is_monochrome(&self) -> bool {
        !matches!(self, Self::FloydSteinbergPalette)
    }

    /// Quantize the grid in place.
    ///
    /// ```
    /// use zpl_image::bitmap::{Pixel, PixelGrid};
    /// use zpl_image::render::dither::DitheringAlgorithm;
    ///
    /// let mut grid = PixelGrid::filled(4, 4, Pixel::gray_level(100)).unwrap();
    /// DitheringAlgorithm::FloydSteinberg.apply(&mut grid);
    /// assert!(grid.pixels().iter().all(|p| p.channels().iter().all(|&c| c == 0 || c == 255)));
    /// ```
    pub fn apply(&self, grid: &mut PixelGrid) {
        debug!(
            algorithm = %self,
            width = grid.width(),
            height = grid.height(),
            "Applying dithering"
        );

        for p in grid.pixels_mut() {
            *p = p.flatten();
        }

        match *self {
            Self::FloydSteinberg => floyd_steinberg(grid),
            Self::FloydSteinbergPalette => floyd_steinberg_palette(grid),
            Self::Sierra => sierra(grid),
            Self::Ordered(matrix) => ordered(grid, &matrix),
            Self::Halftone { threshold } => halftone(grid, threshold),
        }

        debug!(algorithm = %self, "Dithering complete");
    }
}

impl fmt::Display for DitheringAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FloydSteinberg => write!(f, "floyd-steinberg"),
            Self::FloydSteinbergPalette => write!(f, "palette"),
            Self::Sierra => write!(f, "sierra"),
            Self::Ordered(m) => write!(f, "ordered{}", m.size()),
            Self::Halftone { threshold } => write!(f, "halftone:{}", threshold),
        }
    }
}

impl FromStr for DitheringAlgorithm {
    type Err = ZplError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase().replace('_', "-");
        if let Some(level) = name.strip_prefix("halftone:") {
            return level
                .trim()
                .parse()
                .map(|threshold| Self::Halftone { threshold })
                .map_err(|_| {
                    ZplError::Config(format!("invalid halftone level '{}' (expected 0-255)", level))
                });
        }

        match name.as_str() {
            "floyd-steinberg" | "fs" => Ok(Self::FloydSteinberg),
            "palette" | "floyd-steinberg-palette" | "fs-palette" => Ok(Self::FloydSteinbergPalette),
            "sierra" => Ok(Self::Sierra),
            "ordered2" | "ordered-2" => Ok(Self::Ordered(DitherMatrix::ORDERED_2)),
            "ordered4" | "ordered-4" => Ok(Self::Ordered(DitherMatrix::ORDERED_4)),
            "ordered8" | "ordered-8" | "ordered" | "bayer" => {
                Ok(Self::Ordered(DitherMatrix::ORDERED_8))
            }
            "halftone" => Ok(Self::Halftone {
                threshold: Self::DEFAULT_HALFTONE_THRESHOLD,
            }),
            _ => Err(ZplError::Config(format!(
                "unknown dithering algorithm '{}' (expected one of: {})",
                s,
                Self::NAMES.join(", ")
            ))),
        }
    }
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

/// Per-channel Floyd-Steinberg, diffusing straight into the grid.
///
/// Every neighbour write is truncated toward zero and clamped to 0..=255, so
/// the error taken at a pixel never exceeds what its channel can hold.
fn floyd_steinberg(grid: &mut PixelGrid) {
    let (width, height) = (grid.width(), grid.height());
    let pixels = grid.pixels_mut();

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = pixels[idx].channels();
            let new = old.map(|c| if c < MIDPOINT { 0 } else { 255 });
            pixels[idx] = Pixel::from_channels(new);

            let error: [i32; 4] = std::array::from_fn(|c| old[c] as i32 - new[c] as i32);
            for &(dx, dy, weight) in FLOYD_STEINBERG.taps {
                if let Some(n) = neighbor(x, y, dx, dy, width, height) {
                    let factor = weight as f32 / FLOYD_STEINBERG.divisor as f32;
                    let current = pixels[n].channels();
                    pixels[n] = Pixel::from_channels(std::array::from_fn(|c| {
                        clamp_channel((current[c] as f32 + error[c] as f32 * factor) as i32)
                    }));
                }
            }
        }
    }
}

/// Floyd-Steinberg against [`PALETTE`], diffusing the full 4-channel error
/// into an unclamped `f32` accumulator.
fn floyd_steinberg_palette(grid: &mut PixelGrid) {
    let (width, height) = (grid.width(), grid.height());
    let mut acc: Vec<[f32; 4]> = grid
        .pixels()
        .iter()
        .map(|p| p.channels().map(f32::from))
        .collect();
    let out = grid.pixels_mut();

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let old = acc[idx];
            let nearest = nearest_palette_color(old);
            out[idx] = nearest;

            let c = nearest.channels().map(f32::from);
            let error = [old[0] - c[0], old[1] - c[1], old[2] - c[2], old[3] - c[3]];
            diffuse_f32(&mut acc, x, y, width, height, error);
        }
    }
}

fn nearest_palette_color(color: [f32; 4]) -> Pixel {
    let distance = |p: &Pixel| -> f32 {
        p.channels()
            .iter()
            .zip(color)
            .map(|(&c, v)| {
                let d = v - c as f32;
                d * d
            })
            .sum()
    };

    // PALETTE is non-empty
    PALETTE
        .iter()
        .copied()
        .min_by(|a, b| distance(a).total_cmp(&distance(b)))
        .unwrap_or(Pixel::WHITE)
}

fn diffuse_f32(acc: &mut [[f32; 4]], x: usize, y: usize, width: usize, height: usize, error: [f32; 4]) {
    let divisor = FLOYD_STEINBERG.divisor as f32;
    for &(dx, dy, weight) in FLOYD_STEINBERG.taps {
        if let Some(n) = neighbor(x, y, dx, dy, width, height) {
            let factor = weight as f32 / divisor;
            for (cell, e) in acc[n].iter_mut().zip(error) {
                *cell += e * factor;
            }
        }
    }
}

/// Sierra error diffusion on the red channel with an `i32` error grid.
fn sierra(grid: &mut PixelGrid) {
    let (width, height) = (grid.width(), grid.height());
    let mut errors = vec![0i32; width * height];
    let pixels = grid.pixels_mut();

    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let p = pixels[idx];
            let value = p.r as i32 + errors[idx];

            let (level, error) = if value < SIERRA_MIDPOINT {
                (0u8, value)
            } else {
                (255u8, value - 255)
            };

            for &(dx, dy, weight) in SIERRA.taps {
                if let Some(n) = neighbor(x, y, dx, dy, width, height) {
                    errors[n] += weight * error / SIERRA.divisor;
                }
            }

            let alpha = if p.a < TRANSPARENT_CUTOFF { 0 } else { 255 };
            pixels[idx] = Pixel::new(level, level, level, alpha);
        }
    }
}

/// Ordered dithering; each row is independent.
fn ordered(grid: &mut PixelGrid, matrix: &DitherMatrix) {
    let width = grid.width();
    grid.pixels_mut()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, p) in row.iter_mut().enumerate() {
                let t = matrix.threshold(x, y);
                *p = Pixel::from_channels(
                    p.channels()
                        .map(|c| if (c as f32 / 255.0) < t { 0 } else { 255 }),
                );
            }
        });
}

/// Two-level cut on the integer mean of r, g and b.
fn halftone(grid: &mut PixelGrid, threshold: u8) {
    let width = grid.width();
    grid.pixels_mut().par_chunks_mut(width).for_each(|row| {
        for p in row.iter_mut() {
            let gray = (p.r as u32 + p.g as u32 + p.b as u32) / 3;
            *p = if gray < threshold as u32 {
                Pixel::BLACK
            } else {
                Pixel::WHITE
            };
        }
    });
}

// ============================================================================
// TESTS
// ============================================================================
