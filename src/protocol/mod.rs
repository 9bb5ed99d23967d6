//! # ZPL Graphic Field Protocol
//!
//! Builders for the compressed `^GFA` graphic field used by Zebra-compatible
//! label printers.
//!
//! ## Module Structure
//!
//! - [`compress`]: zlib + base64 payload encoding
//! - [`checksum`]: CRC-16 over the payload text
//! - [`graphics`]: `^FO` / `^GFA` command assembly
//!
//! ## Usage Example
//!
//! ```
//! use zpl_image::bitmap::{Pixel, PixelGrid};
//! use zpl_image::protocol::{compress, graphics::GraphicField};
//! use zpl_image::render::raster;
//!
//! let grid = PixelGrid::filled(16, 4, Pixel::BLACK).unwrap();
//! let raster = raster::pack(&grid, 127);
//!
//! let payload = compress::compress(raster.data()).unwrap();
//! let zpl = GraphicField::new(0, 0, &raster, payload).encode(true);
//!
//! assert!(zpl.starts_with("^XA^FO0,0^GFA,8,8,2,:Z64:"));
//! assert!(zpl.ends_with("^XZ\n"));
//! ```

pub mod checksum;
pub mod compress;
pub mod graphics;
