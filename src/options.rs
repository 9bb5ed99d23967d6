//! # Conversion Options
//!
//! [`ConversionOptions`] is the validated configuration for one image
//! conversion. It deserializes from JSON (every field optional) and is also
//! filled in by the CLI, whose flags override values read from a file.
//!
//! ## Example
//!
//! ```
//! use zpl_image::options::{ConversionOptions, ThresholdMode};
//!
//! let json = r#"{
//!     "source": "logo.png",
//!     "width": 200,
//!     "dither": true,
//!     "algorithm": "sierra",
//!     "threshold": "auto"
//! }"#;
//!
//! let opts: ConversionOptions = serde_json::from_str(json).unwrap();
//! assert_eq!(opts.width, 200);
//! assert_eq!(opts.height, 0);
//! assert_eq!(opts.threshold, ThresholdMode::Auto);
//! ```
//!
//! ## Sizing
//!
//! `width` and `height` describe a target box. Zero means "not given". The
//! image is scaled to fit the box with its aspect ratio preserved (see
//! [`resized_dimension`]). When only one side is given, the other follows
//! from the aspect ratio.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::bitmap::ImageSource;
use crate::bitmap::grid::MAX_SIDE;
use crate::error::{Result, ZplError};
use crate::render::dither::DitheringAlgorithm;
use crate::render::filter::{ColorFilter, GrayWeights};

/// Packing threshold applied after dithering. Dithered channels are 0 or
/// 255, so any cut below 255 gives the same raster.
pub const DITHERED_THRESHOLD: u8 = 127;

/// How the raster packing threshold is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdMode {
    /// Otsu for thresholded images, [`DITHERED_THRESHOLD`] after dithering.
    #[default]
    Auto,
    /// Fixed gray level; pixels `<=` it print black.
    Fixed(u8),
}

impl ThresholdMode {
    /// Resolve to a concrete level, running `otsu` only when needed.
    pub fn resolve(self, dithered: bool, otsu: impl FnOnce() -> u8) -> u8 {
        match self {
            Self::Fixed(level) => level,
            Self::Auto if dithered => DITHERED_THRESHOLD,
            Self::Auto => otsu(),
        }
    }
}

impl fmt::Display for ThresholdMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Fixed(level) => write!(f, "{}", level),
        }
    }
}

impl FromStr for ThresholdMode {
    type Err = ZplError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") || s.eq_ignore_ascii_case("otsu") {
            return Ok(Self::Auto);
        }
        s.parse::<u8>().map(Self::Fixed).map_err(|_| {
            ZplError::Config(format!(
                "invalid threshold '{}' (expected \"auto\" or 0-255)",
                s
            ))
        })
    }
}

/// Accepts `"auto"` or an integer 0-255.
impl<'de> Deserialize<'de> for ThresholdMode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ThresholdValue {
            Level(i64),
            Name(String),
        }

        match ThresholdValue::deserialize(deserializer)? {
            ThresholdValue::Level(n) => u8::try_from(n).map(Self::Fixed).map_err(|_| {
                serde::de::Error::custom(format!("threshold {} out of range 0-255", n))
            }),
            ThresholdValue::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Options for one image conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionOptions {
    /// Path, `file://`, `http(s)://` or `data:` URI.
    pub source: Option<String>,
    /// Bare base64 image data, used when `source` is absent.
    pub base64: Option<String>,
    /// Field origin. Absent means 0, or centered when `center` is set.
    pub x: Option<u32>,
    pub y: Option<u32>,
    /// Target box in dots. 0 derives the side from the image.
    pub width: i64,
    pub height: i64,
    /// Center the image in the target box when `x`/`y` are absent.
    pub center: bool,
    /// Dither instead of thresholding.
    pub dither: bool,
    /// Ditherer name, see [`DitheringAlgorithm::NAMES`].
    pub algorithm: Option<String>,
    /// Color filter name, see [`ColorFilter::NAMES`].
    pub filter: Option<String>,
    pub threshold: ThresholdMode,
    /// Bracket the field with `^XA` / `^XZ`.
    pub wrap_label: bool,
}

/// Resolved position and size of the graphic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: usize,
    pub height: usize,
}

impl ConversionOptions {
    /// Options for `source` with every other field defaulted.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }

    /// Read options from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ZplError::Config(format!("failed to read '{}': {}", path.display(), e))
        })?;
        Self::from_json(&content)
            .map_err(|e| ZplError::Config(format!("'{}': {}", path.display(), e)))
    }

    /// Parse options from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ZplError::Config(format!("invalid options: {}", e)))
    }

    pub fn with_size(mut self, width: i64, height: i64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_position(mut self, x: u32, y: u32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_center(mut self, center: bool) -> Self {
        self.center = center;
        self
    }

    /// Enable dithering with the given algorithm name.
    pub fn with_dither(mut self, algorithm: impl Into<String>) -> Self {
        self.dither = true;
        self.algorithm = Some(algorithm.into());
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_threshold(mut self, threshold: ThresholdMode) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_wrap_label(mut self, wrap: bool) -> Self {
        self.wrap_label = wrap;
        self
    }

    /// Where to load the image from.
    pub fn image_source(&self) -> Result<ImageSource> {
        match (&self.source, &self.base64) {
            (Some(source), _) => ImageSource::parse(source),
            (None, Some(data)) => Ok(ImageSource::Embedded(data.clone())),
            (None, None) => Err(ZplError::SourceNotFound(
                "image source not specified".to_string(),
            )),
        }
    }

    /// Ditherer to run, or `None` when thresholding.
    ///
    /// A bare `"halftone"` with a fixed `threshold` cuts at that level;
    /// `"halftone:N"` always cuts at `N`.
    pub fn dithering(&self) -> Result<Option<DitheringAlgorithm>> {
        if !self.dither {
            return Ok(None);
        }
        if let Some(threshold) = self.halftone_cut() {
            return Ok(Some(DitheringAlgorithm::Halftone { threshold }));
        }
        match &self.algorithm {
            Some(name) => name.parse().map(Some),
            None => Ok(Some(DitheringAlgorithm::default())),
        }
    }

    /// Gray level the raster is packed at.
    ///
    /// When `threshold` was taken as the halftone cut the grid is already
    /// black and white, so packing uses [`DITHERED_THRESHOLD`].
    pub fn packing_threshold(&self, otsu: impl FnOnce() -> u8) -> u8 {
        if self.halftone_cut().is_some() {
            return DITHERED_THRESHOLD;
        }
        self.threshold.resolve(self.dither, otsu)
    }

    fn halftone_cut(&self) -> Option<u8> {
        let name = self.algorithm.as_deref()?;
        let bare_halftone = !name.contains(':')
            && matches!(
                name.parse::<DitheringAlgorithm>(),
                Ok(DitheringAlgorithm::Halftone { .. })
            );
        match self.threshold {
            ThresholdMode::Fixed(level) if self.dither && bare_halftone => Some(level),
            _ => None,
        }
    }

    /// Color filter to apply before quantization.
    ///
    /// Dithering defaults to luminance grayscale; thresholding applies no
    /// filter unless one is named.
    pub fn color_filter(&self) -> Result<Option<ColorFilter>> {
        match &self.filter {
            Some(name) if name.eq_ignore_ascii_case("none") => Ok(None),
            Some(name) => name.parse().map(Some),
            None if self.dither => Ok(Some(ColorFilter::Grayscale(GrayWeights::LUMINANCE))),
            None => Ok(None),
        }
    }

    /// Check every option that can be checked without the image.
    pub fn validate(&self) -> Result<()> {
        target_dimension("width", self.width)?;
        target_dimension("height", self.height)?;
        self.dithering()?;
        self.color_filter()?;
        Ok(())
    }

    /// Fit an `actual_width` x `actual_height` image into the target box and
    /// compute its origin.
    ///
    /// ```
    /// use zpl_image::options::ConversionOptions;
    ///
    /// let opts = ConversionOptions::new("logo.png")
    ///     .with_size(200, 200)
    ///     .with_center(true);
    ///
    /// // 400x200 scales to 200x100, centered vertically in the 200x200 box
    /// let placement = opts.placement(400, 200).unwrap();
    /// assert_eq!((placement.width, placement.height), (200, 100));
    /// assert_eq!((placement.x, placement.y), (0, 50));
    /// ```
    pub fn placement(&self, actual_width: usize, actual_height: usize) -> Result<Placement> {
        let max_width = target_dimension("width", self.width)?;
        let max_height = target_dimension("height", self.height)?;

        let width = resized_dimension(max_width, max_height, actual_width, actual_height);
        let height = resized_dimension(max_height, max_width, actual_height, actual_width);
        if width == 0 || height == 0 || width > MAX_SIDE || height > MAX_SIDE {
            return Err(ZplError::InvalidDimension(format!(
                "{}x{} image scales to {}x{}",
                actual_width, actual_height, width, height
            )));
        }

        let box_width = if max_width > 0 { max_width } else { width };
        let box_height = if max_height > 0 { max_height } else { height };

        let offset = |explicit: Option<u32>, outer: usize, inner: usize| -> u32 {
            match explicit {
                Some(v) => v,
                None if self.center => (outer.saturating_sub(inner) / 2) as u32,
                None => 0,
            }
        };

        Ok(Placement {
            x: offset(self.x, box_width, width),
            y: offset(self.y, box_height, height),
            width,
            height,
        })
    }
}

fn target_dimension(name: &str, value: i64) -> Result<usize> {
    let side = usize::try_from(value)
        .map_err(|_| ZplError::InvalidDimension(format!("{} must not be negative, got {}", name, value)))?;
    if side > MAX_SIDE {
        return Err(ZplError::InvalidDimension(format!(
            "{} must not exceed {}, got {}",
            name, MAX_SIDE, value
        )));
    }
    Ok(side)
}

/// Scale one side of an image to fit a bounding box, keeping aspect ratio.
///
/// `max_*` of 0 means the bound is absent.
///
/// | `max_primary` | `max_secondary` | Result |
/// |---|---|---|
/// | 0 | 0 | `actual_primary` |
/// | 0 | s | `actual_primary * s / actual_secondary` |
/// | p | 0 | `p` |
/// | p | s | `p`, reduced so the secondary side fits in `s` |
///
/// ```
/// use zpl_image::options::resized_dimension;
///
/// // 400x200 into width 100: width stays 100
/// assert_eq!(resized_dimension(100, 0, 400, 200), 100);
/// // ... and height follows the ratio
/// assert_eq!(resized_dimension(0, 100, 200, 400), 50);
/// ```
pub fn resized_dimension(
    max_primary: usize,
    max_secondary: usize,
    actual_primary: usize,
    actual_secondary: usize,
) -> usize {
    if max_primary == 0 && max_secondary == 0 {
        return actual_primary;
    }

    if max_primary == 0 {
        let ratio = max_secondary as f64 / actual_secondary as f64;
        return (actual_primary as f64 * ratio) as usize;
    }

    if max_secondary == 0 {
        return max_primary;
    }

    let ratio = actual_secondary as f64 / actual_primary as f64;
    if max_primary as f64 * ratio > max_secondary as f64 {
        (max_secondary as f64 / ratio) as usize
    } else {
        max_primary
    }
}
