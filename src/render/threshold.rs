//! # Otsu Thresholding
//!
//! Picks a single global black/white cut point from the gray-level
//! histogram by maximizing the between-class variance:
//!
//! ```text
//! σ²(i) = n_bg · n_fg · (μ_bg − μ_fg)² / N²
//! ```
//!
//! where the background class holds gray levels `0..=i`. The returned level
//! is the last level of the background class, which matches the raster
//! packer's rule that `gray <= threshold` prints black.
//!
//! ## Ties
//!
//! Only a strictly greater variance moves the cut, so ties go to the lowest
//! maximizing level. With clusters spread over several levels the cut lands
//! strictly between the class means. With pure point masses every level from
//! the lower mass up to just below the upper one scores the same, and the cut
//! equals the lower mass itself:
//!
//! ```text
//! levels {50, 200}  ->  threshold 50   (50 prints, 200 does not)
//! ```

use tracing::debug;

use crate::bitmap::PixelGrid;

/// 256-bin histogram of [`Pixel::gray`](crate::bitmap::Pixel::gray) values.
pub fn histogram(grid: &PixelGrid) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for p in grid.pixels() {
        hist[p.gray() as usize] += 1;
    }
    hist
}

/// Otsu threshold from a precomputed histogram.
///
/// Returns 0 when the histogram holds a single gray level (or is empty),
/// since no split separates two non-empty classes.
pub fn otsu_from_histogram(hist: &[u64; 256]) -> u8 {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0;
    }
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum();
    let total_sq = total as f64 * total as f64;

    let mut best_variance = 0.0f64;
    let mut threshold = 0u8;
    let mut count_bg = 0u64;
    let mut sum_bg = 0.0f64;

    for (i, &count) in hist.iter().enumerate() {
        count_bg += count;
        if count_bg == 0 {
            continue;
        }
        let count_fg = total - count_bg;
        if count_fg == 0 {
            break;
        }

        sum_bg += i as f64 * count as f64;
        let mean_bg = sum_bg / count_bg as f64;
        let mean_fg = (sum_all - sum_bg) / count_fg as f64;
        let diff = mean_bg - mean_fg;
        let variance = count_bg as f64 * count_fg as f64 * diff * diff / total_sq;

        if variance > best_variance {
            best_variance = variance;
            threshold = i as u8;
        }
    }

    threshold
}

/// Otsu threshold of a grid, in [0, 255].
///
/// ```
/// use zpl_image::bitmap::{Pixel, PixelGrid};
/// use zpl_image::render::threshold::otsu_threshold;
///
/// let mut grid = PixelGrid::filled(4, 1, Pixel::gray_level(30)).unwrap();
/// grid.set(2, 0, Pixel::gray_level(220)).unwrap();
/// grid.set(3, 0, Pixel::gray_level(220)).unwrap();
/// let t = otsu_threshold(&grid);
/// assert!(t >= 30 && t < 220);
/// ```
pub fn otsu_threshold(grid: &PixelGrid) -> u8 {
    let threshold = otsu_from_histogram(&histogram(grid));
    debug!(threshold, "Otsu threshold computed");
    threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::Pixel;

    /// Two clusters with some spread around `low` and `high`.
    fn bimodal_grid(low: u8, high: u8) -> PixelGrid {
        let mut pixels = Vec::new();
        for d in 0..=10u8 {
            pixels.push(Pixel::gray_level(low - 5 + d));
            pixels.push(Pixel::gray_level(high - 5 + d));
        }
        PixelGrid::from_pixels(pixels.len(), 1, pixels).unwrap()
    }

    #[test]
    fn test_uniform_image() {
        let grid = PixelGrid::filled(8, 8, Pixel::gray_level(90)).unwrap();
        assert_eq!(otsu_threshold(&grid), 0);
    }

    #[test]
    fn test_bimodal_between_means() {
        for (low, high) in [(40, 200), (10, 60), (120, 240)] {
            let t = otsu_threshold(&bimodal_grid(low, high));
            assert!(
                t > low && t < high,
                "threshold {} not strictly between {} and {}",
                t,
                low,
                high
            );
        }
    }

    #[test]
    fn test_two_levels_split_at_lower() {
        let mut grid = PixelGrid::filled(10, 1, Pixel::gray_level(50)).unwrap();
        for x in 5..10 {
            grid.set(x, 0, Pixel::gray_level(200)).unwrap();
        }
        // Every split in 50..200 has the same variance; the first one wins
        assert_eq!(otsu_threshold(&grid), 50);
    }

    #[test]
    fn test_point_masses_still_separate() {
        use crate::render::raster::pack;

        for (low, high, low_count) in [(50u8, 200u8, 5usize), (50, 200, 3), (0, 1, 6), (254, 255, 2)] {
            let mut grid = PixelGrid::filled(8, 1, Pixel::gray_level(high)).unwrap();
            for x in 0..low_count {
                grid.set(x, 0, Pixel::gray_level(low)).unwrap();
            }
            let t = otsu_threshold(&grid);
            assert_eq!(t, low, "{}/{} with {} low pixels", low, high, low_count);

            let expected = !(0xFFu8 >> low_count);
            assert_eq!(pack(&grid, t).data(), &[expected], "{}/{}", low, high);
        }
    }

    #[test]
    fn test_transparent_pixels_count_as_white() {
        let mut grid = PixelGrid::filled(4, 1, Pixel::new(0, 0, 0, 0)).unwrap();
        grid.set(0, 0, Pixel::BLACK).unwrap();
        let hist = histogram(&grid);
        assert_eq!(hist[0], 1);
        assert_eq!(hist[255], 3);
        assert_eq!(otsu_threshold(&grid), 0);
    }

    #[test]
    fn test_empty_histogram() {
        assert_eq!(otsu_from_histogram(&[0; 256]), 0);
    }
}
