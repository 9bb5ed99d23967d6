//! # Rendering Module
//!
//! Turns a color [`PixelGrid`](crate::bitmap::PixelGrid) into a packed
//! monochrome raster.
//!
//! ## Modules
//!
//! - [`filter`]: grayscale and sepia color transforms
//! - [`threshold`]: Otsu global threshold
//! - [`dither`]: error diffusion, ordered and halftone dithering
//! - [`raster`]: 1-bit-per-pixel row packing
//!
//! ## Usage Example
//!
//! ```
//! use zpl_image::bitmap::{Pixel, PixelGrid};
//! use zpl_image::render::{dither::DitheringAlgorithm, raster};
//!
//! let mut grid = PixelGrid::filled(32, 8, Pixel::gray_level(100)).unwrap();
//! DitheringAlgorithm::FloydSteinberg.apply(&mut grid);
//!
//! let packed = raster::pack(&grid, 127);
//! assert_eq!(packed.data().len(), 4 * 8);
//! ```

pub mod dither;
pub mod filter;
pub mod raster;
pub mod threshold;
