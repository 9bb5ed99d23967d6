//! # Image to ZPL Conversion
//!
//! Runs the whole pipeline for one image:
//!
//! ```text
//! source ─► decode ─► resize ─► filter ─► dither │ Otsu ─► pack ─► zlib+base64 ─► CRC ─► ^GFA
//! ```
//!
//! Each step either succeeds or aborts the conversion with a [`ZplError`];
//! no partial command is returned.
//!
//! ## Example
//!
//! ```
//! use zpl_image::bitmap::{Pixel, PixelGrid};
//! use zpl_image::convert::grid_to_zpl;
//! use zpl_image::options::ConversionOptions;
//!
//! let grid = PixelGrid::filled(16, 16, Pixel::BLACK).unwrap();
//! let opts = ConversionOptions::default().with_wrap_label(true);
//!
//! let zpl = grid_to_zpl(grid, &opts).unwrap();
//! assert!(zpl.starts_with("^XA^FO0,0^GFA,32,32,2,:Z64:"));
//! ```
//!
//! [`ZplError`]: crate::error::ZplError

use tracing::{debug, info, warn};

use crate::bitmap::PixelGrid;
use crate::error::Result;
use crate::options::ConversionOptions;
use crate::protocol::compress::compress;
use crate::protocol::graphics::GraphicField;
use crate::render::raster::{self, RasterImage};
use crate::render::threshold::otsu_threshold;

/// Everything a conversion produced.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The command text, ready to send.
    pub zpl: String,
    pub field: GraphicField,
    /// Packed raster as sent, for previews.
    pub raster: RasterImage,
}

/// Load the image named by `opts` and convert it to a graphic field command.
pub fn image_to_zpl(opts: &ConversionOptions) -> Result<String> {
    convert(opts).map(|c| c.zpl)
}

/// Convert an already decoded grid, ignoring `opts.source`.
pub fn grid_to_zpl(grid: PixelGrid, opts: &ConversionOptions) -> Result<String> {
    convert_grid(grid, opts).map(|c| c.zpl)
}

/// Load the image named by `opts` and run the pipeline.
pub fn convert(opts: &ConversionOptions) -> Result<Conversion> {
    opts.validate()?;
    let source = opts.image_source()?;
    info!(source = %source, "Converting image");
    let grid = source.load()?;
    convert_grid(grid, opts)
}

/// Run the pipeline on a decoded grid.
pub fn convert_grid(grid: PixelGrid, opts: &ConversionOptions) -> Result<Conversion> {
    opts.validate()?;
    let placement = opts.placement(grid.width(), grid.height())?;
    debug!(?placement, "Resolved placement");

    let mut grid = grid.resize(placement.width, placement.height)?;

    if let Some(filter) = opts.color_filter()? {
        filter.apply_to(&mut grid);
    }

    let dithering = opts.dithering()?;
    if let Some(algorithm) = dithering {
        if !algorithm.is_monochrome() {
            warn!(
                algorithm = %algorithm,
                "Palette dithering keeps color; ink depends on the packing threshold"
            );
        }
        algorithm.apply(&mut grid);
    }

    let threshold = opts.packing_threshold(|| otsu_threshold(&grid));
    let raster = raster::pack(&grid, threshold);
    let payload = compress(raster.data())?;
    let field = GraphicField::new(placement.x, placement.y, &raster, payload);
    let zpl = field.encode(opts.wrap_label);

    info!(
        width = raster.width(),
        height = raster.height(),
        threshold,
        total_bytes = field.total_bytes,
        zpl_len = zpl.len(),
        "Conversion complete"
    );

    Ok(Conversion { zpl, field, raster })
}
