//! # Pixel Grid
//!
//! [`PixelGrid`] is the in-memory RGBA raster every pipeline stage works on.
//! Storage is row-major; `(x, y)` addresses column `x` of row `y`.
//!
//! Coordinate access through [`PixelGrid::get`] and [`PixelGrid::set`] is
//! bounds-checked and fails with [`ZplError::OutOfBounds`] instead of
//! clamping. The row-parallel stages split [`PixelGrid::pixels_mut`] into
//! `width`-sized chunks instead.
//!
//! The grid also adapts to and from the `image` crate, which acts as the
//! platform image subsystem (decoding and resampling).

use image::{RgbaImage, imageops::FilterType};
use tracing::debug;

use super::pixel::Pixel;
use crate::error::{Result, ZplError};

/// Resampling filter used by [`PixelGrid::resize`] (bilinear).
pub const RESIZE_FILTER: FilterType = FilterType::Triangle;

/// Largest side a grid may have; the `image` buffers address pixels with `u32`.
pub const MAX_SIDE: usize = u32::MAX as usize;

/// Row-major RGBA raster with checked coordinate access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Create a grid filled with `fill`.
    ///
    /// Fails with [`ZplError::InvalidDimension`] when either side is zero or
    /// larger than [`MAX_SIDE`].
    pub fn filled(width: usize, height: usize, fill: Pixel) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![fill; width * height],
        })
    }

    /// Create an opaque white grid.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, Pixel::WHITE)
    }

    /// Wrap existing row-major pixels.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Pixel>) -> Result<Self> {
        check_dimensions(width, height)?;
        if pixels.len() != width * height {
            return Err(ZplError::InvalidDimension(format!(
                "{}x{} grid needs {} pixels, got {}",
                width,
                height,
                width * height,
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a grid from packed ARGB values.
    pub fn from_argb(width: usize, height: usize, argb: &[u32]) -> Result<Self> {
        Self::from_pixels(width, height, argb.iter().map(|&v| Pixel::from_argb(v)).collect())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Read the pixel at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Result<Pixel> {
        let idx = self.index(x, y)?;
        Ok(self.pixels[idx])
    }

    /// Write the pixel at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, pixel: Pixel) -> Result<()> {
        let idx = self.index(x, y)?;
        self.pixels[idx] = pixel;
        Ok(())
    }

    /// All pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> std::slice::Chunks<'_, Pixel> {
        self.pixels.chunks(self.width)
    }

    /// Packed ARGB values in row-major order.
    pub fn to_argb(&self) -> Vec<u32> {
        self.pixels.iter().map(|p| p.to_argb()).collect()
    }

    /// Copy an `image` RGBA buffer into a grid.
    pub fn from_rgba_image(img: &RgbaImage) -> Result<Self> {
        let (w, h) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| Pixel::new(p[0], p[1], p[2], p[3]))
            .collect();
        Self::from_pixels(w as usize, h as usize, pixels)
    }

    /// Copy the grid into an `image` RGBA buffer.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut img = RgbaImage::new(self.width as u32, self.height as u32);
        for (dst, src) in img.pixels_mut().zip(&self.pixels) {
            *dst = image::Rgba(src.channels());
        }
        img
    }

    /// Resample to `width` x `height`, returning a new grid.
    pub fn resize(&self, width: usize, height: usize) -> Result<Self> {
        check_dimensions(width, height)?;
        if width == self.width && height == self.height {
            debug!(width, height, "Grid already at target size, skipping resize");
            return Ok(self.clone());
        }

        debug!(
            orig_w = self.width,
            orig_h = self.height,
            new_width = width,
            new_height = height,
            "Resizing grid"
        );
        let resized = image::imageops::resize(
            &self.to_rgba_image(),
            width as u32,
            height as u32,
            RESIZE_FILTER,
        );
        Self::from_rgba_image(&resized)
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(ZplError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ZplError::InvalidDimension(format!(
            "grid must be at least 1x1, got {}x{}",
            width, height
        )));
    }
    if width > MAX_SIDE || height > MAX_SIDE {
        return Err(ZplError::InvalidDimension(format!(
            "grid sides must not exceed {}, got {}x{}",
            MAX_SIDE, width, height
        )));
    }
    Ok(())
}
