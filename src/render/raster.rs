//! # Raster Packing
//!
//! Converts a quantized [`PixelGrid`] into the 1-bit-per-pixel byte layout
//! used by the `^GF` graphic field.
//!
//! ## Bit Packing
//!
//! - Bit 7 (MSB) = leftmost pixel
//! - Bit 0 (LSB) = rightmost pixel
//! - 1 = black (ink), 0 = white (no ink)
//!
//! ```text
//! Byte value 0xF0 = 11110000 = ████░░░░
//! Byte value 0xAA = 10101010 = █░█░█░█░
//! ```
//!
//! ## Row Padding
//!
//! Every row occupies `ceil(width / 8)` bytes. When the width is not a
//! multiple of 8 the unused low bits of the last byte are zero, and the next
//! row starts on a fresh byte:
//!
//! ```text
//! width = 10:  [████░░██ ██000000] [...next row...]
//!                          ^^^^^^ padding
//! ```
//!
//! A pixel is black when its gray level (see
//! [`Pixel::gray`](crate::bitmap::Pixel::gray)) is `<= threshold`.

use image::{GrayImage, Luma};
use rayon::prelude::*;
use tracing::debug;

use crate::bitmap::PixelGrid;

/// Packed monochrome raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    threshold: u8,
    data: Vec<u8>,
}

impl RasterImage {
    /// Wrap already packed data.
    ///
    /// Returns `None` if `data.len()` does not equal `ceil(width/8) * height`.
    pub fn from_packed(width: usize, height: usize, threshold: u8, data: Vec<u8>) -> Option<Self> {
        (data.len() == width.div_ceil(8) * height).then_some(Self {
            width,
            height,
            threshold,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Gray level cut used when packing.
    #[inline]
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Bytes per row: `ceil(width / 8)`.
    #[inline]
    pub fn bytes_per_row(&self) -> usize {
        self.width.div_ceil(8)
    }

    /// Total packed length: `bytes_per_row * height`.
    #[inline]
    pub fn total_bytes(&self) -> usize {
        self.data.len()
    }

    /// Packed bytes, row after row.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Whether pixel `(x, y)` prints. Out-of-range coordinates read as white.
    pub fn is_black(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let byte = self.data[y * self.bytes_per_row() + x / 8];
        (byte >> (7 - (x % 8))) & 1 == 1
    }

    /// Expand back into one boolean per pixel (row-major, `true` = black).
    pub fn unpack(&self) -> Vec<bool> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .map(|(x, y)| self.is_black(x, y))
            .collect()
    }

    /// Render as a grayscale image (black = 0, white = 255) for previews.
    pub fn to_preview(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            if self.is_black(x as usize, y as usize) {
                Luma([0u8])
            } else {
                Luma([255u8])
            }
        })
    }
}

/// Pack a row of boolean pixel values into bytes.
///
/// ```
/// use zpl_image::render::raster::pack_row;
///
/// // 8 pixels pack into 1 byte
/// let row = vec![true, true, true, true, false, false, false, false];
/// assert_eq!(pack_row(&row), vec![0xF0]);
///
/// // 12 pixels pack into 2 bytes (4 bits padding)
/// let row = vec![true; 12];
/// assert_eq!(pack_row(&row), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; pixels.len().div_ceil(8)];
    pack_into(pixels.iter().copied(), &mut bytes);
    bytes
}

fn pack_into(bits: impl Iterator<Item = bool>, out: &mut [u8]) {
    for (i, black) in bits.enumerate() {
        if black {
            out[i / 8] |= 1 << (7 - (i % 8));
        }
    }
}

/// Pack a grid into a [`RasterImage`] using `threshold` as the gray cut.
///
/// Rows are independent and packed in parallel.
///
/// ```
/// use zpl_image::bitmap::{Pixel, PixelGrid};
/// use zpl_image::render::raster::pack;
///
/// let grid = PixelGrid::filled(10, 3, Pixel::BLACK).unwrap();
/// let raster = pack(&grid, 128);
/// assert_eq!(raster.bytes_per_row(), 2);
/// assert_eq!(raster.data(), &[0xFF, 0xC0, 0xFF, 0xC0, 0xFF, 0xC0]);
/// ```
pub fn pack(grid: &PixelGrid, threshold: u8) -> RasterImage {
    let width = grid.width();
    let height = grid.height();
    let bytes_per_row = width.div_ceil(8);
    let mut data = vec![0u8; bytes_per_row * height];

    data.par_chunks_mut(bytes_per_row)
        .zip(grid.pixels().par_chunks(width))
        .for_each(|(out, row)| {
            pack_into(row.iter().map(|p| p.gray() <= threshold), out);
        });

    debug!(width, height, threshold, bytes = data.len(), "Packed raster");

    RasterImage {
        width,
        height,
        threshold,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Pixel;

    #[test]
    fn test_pack_row_8_pixels() {
        assert_eq!(pack_row(&[true; 8]), vec![0xFF]);
        assert_eq!(pack_row(&[false; 8]), vec![0x00]);
        assert_eq!(
            pack_row(&[true, false, true, false, true, false, true, false]),
            vec![0xAA]
        );
    }

    #[test]
    fn test_pack_row_padding() {
        assert_eq!(pack_row(&[true, true, true, true]), vec![0xF0]);
        assert_eq!(pack_row(&[true; 9]), vec![0xFF, 0x80]);
    }

    #[test]
    fn test_pack_row_empty() {
        assert_eq!(pack_row(&[]), Vec::<u8>::new());
    }

    #[test]
    fn test_length_is_ceil_width_times_height() {
        for width in 1..=20 {
            for height in [1, 2, 7] {
                let grid = PixelGrid::new(width, height).unwrap();
                let raster = pack(&grid, 127);
                assert_eq!(raster.total_bytes(), width.div_ceil(8) * height, "{}x{}", width, height);
                assert_eq!(raster.bytes_per_row(), width.div_ceil(8));
            }
        }
    }

    #[test]
    fn test_single_black_pixel() {
        let grid = PixelGrid::filled(1, 1, Pixel::BLACK).unwrap();
        let raster = pack(&grid, 128);
        assert_eq!(raster.data(), &[0b1000_0000]);
        assert_eq!(raster.bytes_per_row(), 1);
    }

    #[test]
    fn test_rows_do_not_share_bytes() {
        // 3x2: first row black, second white
        let mut grid = PixelGrid::new(3, 2).unwrap();
        for x in 0..3 {
            grid.set(x, 0, Pixel::BLACK).unwrap();
        }
        assert_eq!(pack(&grid, 127).data(), &[0b1110_0000, 0x00]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let grid = PixelGrid::from_argb(2, 1, &[0xFF7F7F7F, 0xFF808080]).unwrap();
        // gray 127 prints, gray 128 does not
        assert_eq!(pack(&grid, 127).data(), &[0b1000_0000]);
    }

    #[test]
    fn test_transparent_never_prints() {
        let grid = PixelGrid::filled(8, 1, Pixel::new(0, 0, 0, 100)).unwrap();
        assert_eq!(pack(&grid, 254).data(), &[0x00]);
    }

    #[test]
    fn test_unpack_roundtrip() {
        let mut grid = PixelGrid::new(11, 3).unwrap();
        let mut expected = Vec::new();
        for y in 0..3 {
            for x in 0..11 {
                let black = (x * 7 + y * 3) % 5 < 2;
                if black {
                    grid.set(x, y, Pixel::BLACK).unwrap();
                }
                expected.push(black);
            }
        }
        let raster = pack(&grid, 127);
        assert_eq!(raster.unpack(), expected);
        assert!(!raster.is_black(11, 0));
    }

    #[test]
    fn test_preview_image() {
        let grid = PixelGrid::from_argb(2, 1, &[0xFF000000, 0xFFFFFFFF]).unwrap();
        let preview = pack(&grid, 127).to_preview();
        assert_eq!(preview.dimensions(), (2, 1));
        assert_eq!(preview.get_pixel(0, 0).0[0], 0);
        assert_eq!(preview.get_pixel(1, 0).0[0], 255);
    }

    #[test]
    fn test_from_packed_validates_length() {
        assert!(RasterImage::from_packed(10, 2, 127, vec![0; 4]).is_some());
        assert!(RasterImage::from_packed(10, 2, 127, vec![0; 3]).is_none());
    }
}
