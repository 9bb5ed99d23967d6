//! # zpl-image - Images to ZPL Graphic Fields
//!
//! zpl-image converts a raster image into a compressed, checksummed `^GFA`
//! graphic field that Zebra-compatible label printers understand. It
//! provides:
//!
//! - **Color filters**: weighted grayscale presets and sepia
//! - **Quantization**: Otsu thresholding, Floyd-Steinberg, Sierra, ordered
//!   and halftone dithering
//! - **Raster packing**: 1 bit per dot, rows padded to whole bytes
//! - **Protocol**: zlib + base64 payload with CRC-16, `^FO` / `^GFA` framing
//!
//! ## Quick Start
//!
//! ```no_run
//! use zpl_image::{ConversionOptions, image_to_zpl};
//!
//! let opts = ConversionOptions::new("logo.png")
//!     .with_size(400, 200)
//!     .with_center(true)
//!     .with_dither("floyd-steinberg")
//!     .with_wrap_label(true);
//!
//! let zpl = image_to_zpl(&opts)?;
//! print!("{}", zpl);
//!
//! # Ok::<(), zpl_image::error::ZplError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`bitmap`] | Pixels, grids and image sources |
//! | [`render`] | Filters, thresholding, dithering, packing |
//! | [`protocol`] | Compression, checksum, command assembly |
//! | [`options`] | Conversion configuration |
//! | [`convert`] | End-to-end pipeline |
//! | [`error`] | Error types |

pub mod bitmap;
pub mod convert;
pub mod error;
pub mod options;
pub mod protocol;
pub mod render;

// Re-exports for convenience
pub use bitmap::{Pixel, PixelGrid};
pub use convert::{grid_to_zpl, image_to_zpl};
pub use error::ZplError;
pub use options::ConversionOptions;
