//! # zpl-image CLI
//!
//! Command-line interface for converting images to ZPL graphic fields.
//!
//! ## Usage
//!
//! ```bash
//! # Print the ^GFA field for an image to stdout
//! zpl-image convert logo.png
//!
//! # Fit into a 400x200 box, centered, dithered, as a complete label
//! zpl-image convert logo.png --width 400 --height 200 --center --dither --wrap
//!
//! # Options from a JSON file, with flags taking precedence
//! zpl-image convert --config label.json --threshold 100 --output label.zpl
//!
//! # Save the monochrome raster that would be sent as a PNG
//! zpl-image preview logo.png preview.png --dither --algorithm sierra
//! ```
//!
//! Set `RUST_LOG=zpl_image=debug` to trace each pipeline stage.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zpl_image::{
    ZplError,
    convert::{self, Conversion},
    options::{ConversionOptions, ThresholdMode},
    render::{dither::DitheringAlgorithm, filter::ColorFilter},
};

/// zpl-image - Convert images into ZPL graphic fields
#[derive(Parser, Debug)]
#[command(name = "zpl-image")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert an image to a ^GFA command
    Convert {
        /// Image path, file:// or http(s):// URL, or data: URI
        source: Option<String>,

        #[command(flatten)]
        opts: OptionArgs,

        /// Write the command to FILE instead of stdout
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Also save the packed raster as a PNG
        #[arg(long, value_name = "PNG")]
        preview: Option<PathBuf>,
    },
    /// Save the packed raster of an image as a PNG
    Preview {
        /// Image path, file:// or http(s):// URL, or data: URI
        source: String,

        /// PNG file to write
        #[arg(value_name = "PNG")]
        png: PathBuf,

        #[command(flatten)]
        opts: OptionArgs,
    },
}

/// Conversion flags shared by every subcommand.
#[derive(Args, Debug)]
struct OptionArgs {
    /// JSON options file; flags given on the command line override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Target width in dots (0 = derive from the image)
    #[arg(long)]
    width: Option<i64>,

    /// Target height in dots (0 = derive from the image)
    #[arg(long)]
    height: Option<i64>,

    /// Field origin X in dots
    #[arg(long)]
    x: Option<u32>,

    /// Field origin Y in dots
    #[arg(long)]
    y: Option<u32>,

    /// Center the image in the width x height box
    #[arg(long)]
    center: bool,

    /// Dither instead of thresholding
    #[arg(long)]
    dither: bool,

    /// Dithering algorithm (implies --dither); "halftone:N" cuts at N
    #[arg(long, value_parser = parse_algorithm)]
    algorithm: Option<String>,

    /// Color filter applied before quantization ("none" to disable)
    #[arg(long, value_parser = parse_filter)]
    filter: Option<String>,

    /// Packing threshold: "auto" or 0-255 (the cut for a bare "halftone")
    #[arg(long)]
    threshold: Option<ThresholdMode>,

    /// Wrap the field in ^XA ... ^XZ
    #[arg(long)]
    wrap: bool,
}

impl OptionArgs {
    /// Load the config file (if any) and apply command-line overrides.
    fn resolve(self, source: Option<String>) -> Result<ConversionOptions, ZplError> {
        let mut opts = match &self.config {
            Some(path) => ConversionOptions::from_json_file(path)?,
            None => ConversionOptions::default(),
        };

        if let Some(source) = source {
            opts.source = Some(source);
        }
        if let Some(width) = self.width {
            opts.width = width;
        }
        if let Some(height) = self.height {
            opts.height = height;
        }
        if self.x.is_some() {
            opts.x = self.x;
        }
        if self.y.is_some() {
            opts.y = self.y;
        }
        if let Some(threshold) = self.threshold {
            opts.threshold = threshold;
        }
        if let Some(filter) = self.filter {
            opts.filter = Some(filter);
        }
        if let Some(algorithm) = self.algorithm {
            opts.dither = true;
            opts.algorithm = Some(algorithm);
        }
        opts.center |= self.center;
        opts.dither |= self.dither;
        opts.wrap_label |= self.wrap;

        opts.validate()?;
        Ok(opts)
    }
}

fn parse_algorithm(s: &str) -> Result<String, String> {
    s.parse::<DitheringAlgorithm>()
        .map(|_| s.to_string())
        .map_err(|e| e.to_string())
}

fn parse_filter(s: &str) -> Result<String, String> {
    if s.eq_ignore_ascii_case("none") {
        return Ok(s.to_string());
    }
    s.parse::<ColorFilter>()
        .map(|_| s.to_string())
        .map_err(|e| e.to_string())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zpl_image=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time(),
        )
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ZplError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            source,
            opts,
            output,
            preview,
        } => {
            let conversion = convert::convert(&opts.resolve(source)?)?;

            if let Some(png) = preview {
                save_preview(&png, &conversion)?;
            }

            match output {
                Some(path) => {
                    std::fs::write(&path, &conversion.zpl)?;
                    info!(path = %path.display(), bytes = conversion.zpl.len(), "Wrote ZPL");
                }
                None => print!("{}", conversion.zpl),
            }
        }
        Commands::Preview { source, png, opts } => {
            let conversion = convert::convert(&opts.resolve(Some(source))?)?;
            save_preview(&png, &conversion)?;
            println!(
                "Saved {}x{} preview to {}",
                conversion.raster.width(),
                conversion.raster.height(),
                png.display()
            );
        }
    }

    Ok(())
}

/// Save the packed raster as a black and white PNG
fn save_preview(path: &Path, conversion: &Conversion) -> Result<(), ZplError> {
    conversion
        .raster
        .to_preview()
        .save(path)
        .map_err(|e| ZplError::Io(std::io::Error::other(format!("failed to save PNG: {}", e))))?;
    info!(path = %path.display(), "Saved preview");
    Ok(())
}
