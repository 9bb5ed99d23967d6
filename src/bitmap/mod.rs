//! # Bitmap Module
//!
//! Pixel storage and the adapter to the platform image subsystem.
//!
//! - [`pixel`]: RGBA pixel and its packed ARGB form
//! - [`grid`]: bounds-checked row-major raster, resize via `image`
//! - [`source`]: resolve paths, URLs and `data:` URIs into grids

pub mod grid;
pub mod pixel;
pub mod source;

pub use grid::PixelGrid;
pub use pixel::Pixel;
pub use source::{ImageSource, decode_image};
