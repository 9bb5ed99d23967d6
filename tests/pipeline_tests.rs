//! # Pipeline Tests
//!
//! End-to-end checks on the emitted command text. Every test parses the
//! `^GFA` field back apart, verifies the CRC against the payload text and
//! inflates the payload, so assertions are made on the raster the printer
//! would actually receive rather than on compressor-specific bytes.

use std::io::{Cursor, Read};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::read::ZlibDecoder;
use pretty_assertions::assert_eq;

use zpl_image::bitmap::{Pixel, PixelGrid};
use zpl_image::options::{ConversionOptions, ThresholdMode};
use zpl_image::protocol::checksum::crc16;
use zpl_image::render::dither::DitheringAlgorithm;
use zpl_image::{ZplError, grid_to_zpl, image_to_zpl};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// A `^GFA` command split into its fields.
#[derive(Debug)]
struct ParsedField {
    wrapped: bool,
    x: u32,
    y: u32,
    total_bytes: usize,
    bytes_per_row: usize,
    payload: String,
    checksum: String,
}

impl ParsedField {
    /// Raster bytes after base64 decoding and zlib inflation.
    fn raster(&self) -> Vec<u8> {
        let compressed = STANDARD.decode(&self.payload).expect("payload is base64");
        let mut raster = Vec::new();
        ZlibDecoder::new(&compressed[..])
            .read_to_end(&mut raster)
            .expect("payload is a zlib stream");
        raster
    }
}

fn parse_field(zpl: &str) -> ParsedField {
    let body = zpl.strip_suffix('\n').expect("command ends with newline");
    assert!(!body.contains('\n'), "command is a single line: {:?}", zpl);

    let (body, wrapped) = match body.strip_prefix("^XA") {
        Some(inner) => (inner.strip_suffix("^XZ").expect("^XA paired with ^XZ"), true),
        None => (body, false),
    };

    let body = body.strip_prefix("^FO").expect("starts with ^FO");
    let (origin, rest) = body.split_once("^GFA,").expect("has ^GFA");
    let (x, y) = origin.split_once(',').expect("origin is x,y");

    let mut parts = rest.splitn(4, ',');
    let total_bytes: usize = parts.next().unwrap().parse().unwrap();
    let field_count: usize = parts.next().unwrap().parse().unwrap();
    let bytes_per_row: usize = parts.next().unwrap().parse().unwrap();
    assert_eq!(total_bytes, field_count, "binary byte count equals field count");

    let data = parts.next().unwrap().strip_prefix(":Z64:").expect(":Z64: marker");
    let (payload, checksum) = data.rsplit_once(':').expect("payload:crc");

    ParsedField {
        wrapped,
        x: x.parse().unwrap(),
        y: y.parse().unwrap(),
        total_bytes,
        bytes_per_row,
        payload: payload.to_string(),
        checksum: checksum.to_string(),
    }
}

/// Parse, verify framing invariants, and return the field plus its raster.
fn decode(zpl: &str) -> (ParsedField, Vec<u8>) {
    let field = parse_field(zpl);
    assert_eq!(
        field.checksum,
        format!("{:04X}", crc16(field.payload.as_bytes())),
        "checksum covers the base64 text"
    );
    let raster = field.raster();
    assert_eq!(raster.len(), field.total_bytes);
    (field, raster)
}

fn png_bytes(grid: &PixelGrid) -> Vec<u8> {
    let mut bytes = Vec::new();
    grid.to_rgba_image()
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

/// Horizontal gray ramp, black on the left.
fn gradient(width: usize, height: usize) -> PixelGrid {
    let mut grid = PixelGrid::new(width, height).unwrap();
    for y in 0..height {
        for x in 0..width {
            let level = (x * 255 / (width - 1)) as u8;
            grid.set(x, y, Pixel::gray_level(level)).unwrap();
        }
    }
    grid
}

// ============================================================================
// END-TO-END SCENARIOS
// ============================================================================

#[test]
fn test_single_black_pixel() {
    let grid = PixelGrid::filled(1, 1, Pixel::BLACK).unwrap();
    let opts = ConversionOptions::default()
        .with_dither("floyd-steinberg")
        .with_threshold(ThresholdMode::Fixed(128));

    let (field, raster) = decode(&grid_to_zpl(grid, &opts).unwrap());

    assert_eq!(field.bytes_per_row, 1);
    assert_eq!(field.total_bytes, 1);
    assert_eq!(raster, vec![0b1000_0000]);
}

#[test]
fn test_checkerboard_row() {
    let argb: Vec<u32> = (0..8)
        .map(|x| if x % 2 == 0 { 0xFF000000 } else { 0xFFFFFFFF })
        .collect();
    let grid = PixelGrid::from_argb(8, 1, &argb).unwrap();

    let (_, raster) = decode(&grid_to_zpl(grid, &ConversionOptions::default()).unwrap());

    assert_eq!(raster, vec![0b1010_1010]);
}

#[test]
fn test_transparent_pixel_is_white_everywhere() {
    let grid = PixelGrid::filled(1, 1, Pixel::from_argb(0x00FF00FF)).unwrap();
    let mut variants = vec![ConversionOptions::default()];
    for name in DitheringAlgorithm::NAMES {
        variants.push(ConversionOptions::default().with_dither(*name));
    }
    for name in ["luminance", "black", "sepia"] {
        variants.push(ConversionOptions::default().with_filter(name));
    }

    for opts in variants {
        let (_, raster) = decode(&grid_to_zpl(grid.clone(), &opts).unwrap());
        assert_eq!(raster, vec![0x00], "{:?}", opts);
    }
}

#[test]
fn test_width_not_multiple_of_eight() {
    let grid = PixelGrid::filled(10, 3, Pixel::BLACK).unwrap();
    let opts = ConversionOptions::default().with_threshold(ThresholdMode::Fixed(127));

    let (field, raster) = decode(&grid_to_zpl(grid, &opts).unwrap());

    assert_eq!(field.bytes_per_row, 2);
    assert_eq!(field.total_bytes, 6);
    assert_eq!(raster, vec![0xFF, 0xC0, 0xFF, 0xC0, 0xFF, 0xC0]);
}

#[test]
fn test_every_algorithm_produces_valid_field() {
    for name in DitheringAlgorithm::NAMES {
        let opts = ConversionOptions::default().with_dither(*name);
        let (field, raster) = decode(&grid_to_zpl(gradient(33, 9), &opts).unwrap());
        assert_eq!(field.bytes_per_row, 5, "{}", name);
        assert_eq!(raster.len(), 5 * 9, "{}", name);
        // Each row: left edge inked, right edge clear
        for row in raster.chunks(5) {
            assert_eq!(row[0] & 0x80, 0x80, "{}: left pixel should print", name);
            assert_eq!(row[4] & 0x80, 0x00, "{}: right pixel should not print", name);
        }
    }
}

#[test]
fn test_otsu_on_gradient_splits_in_the_middle() {
    let (_, raster) = decode(&grid_to_zpl(gradient(16, 1), &ConversionOptions::default()).unwrap());
    // Dark half prints, light half does not
    assert_eq!(raster, vec![0xFF, 0x00]);
}

// ============================================================================
// FRAMING
// ============================================================================

#[test]
fn test_wrapped_and_positioned() {
    let grid = PixelGrid::filled(8, 2, Pixel::BLACK).unwrap();
    let opts = ConversionOptions::default()
        .with_position(25, 40)
        .with_wrap_label(true);

    let zpl = grid_to_zpl(grid, &opts).unwrap();
    let (field, _) = decode(&zpl);

    assert!(field.wrapped);
    assert_eq!((field.x, field.y), (25, 40));
    assert!(zpl.starts_with("^XA^FO25,40^GFA,2,2,1,:Z64:"));
}

#[test]
fn test_unwrapped_by_default() {
    let zpl = grid_to_zpl(PixelGrid::new(8, 8).unwrap(), &ConversionOptions::default()).unwrap();
    assert!(!parse_field(&zpl).wrapped);
    assert!(zpl.starts_with("^FO0,0^GFA,8,8,1,:Z64:"));
}

#[test]
fn test_centered_in_box() {
    let grid = PixelGrid::filled(20, 40, Pixel::BLACK).unwrap();
    let opts = ConversionOptions::default().with_size(100, 40).with_center(true);

    let (field, raster) = decode(&grid_to_zpl(grid, &opts).unwrap());

    // 20x40 fits 100x40 as 20x40, centered horizontally
    assert_eq!((field.x, field.y), (40, 0));
    assert_eq!(field.bytes_per_row, 3);
    assert_eq!(raster.len(), 3 * 40);
}

// ============================================================================
// SOURCES AND CONFIGURATION
// ============================================================================

#[test]
fn test_data_uri_source() {
    let grid = PixelGrid::filled(16, 2, Pixel::BLACK).unwrap();
    let uri = format!("data:image/png;base64,{}", STANDARD.encode(png_bytes(&grid)));

    let zpl = image_to_zpl(&ConversionOptions::new(uri)).unwrap();
    let (field, raster) = decode(&zpl);

    assert_eq!(field.bytes_per_row, 2);
    assert_eq!(raster, vec![0xFF; 4]);
}

#[test]
fn test_base64_option() {
    let grid = PixelGrid::filled(8, 1, Pixel::BLACK).unwrap();
    let json = format!(r#"{{"base64": "{}"}}"#, STANDARD.encode(png_bytes(&grid)));
    let opts = ConversionOptions::from_json(&json).unwrap();

    let (_, raster) = decode(&image_to_zpl(&opts).unwrap());
    assert_eq!(raster, vec![0xFF]);
}

#[test]
fn test_file_source_and_json_config() {
    let dir = std::env::temp_dir().join(format!("zpl-image-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let image_path = dir.join("logo.png");
    std::fs::write(&image_path, png_bytes(&gradient(64, 4))).unwrap();

    let config_path = dir.join("options.json");
    let config = serde_json::json!({
        "source": format!("file://{}", image_path.display()),
        "width": 32,
        "dither": true,
        "algorithm": "ordered8",
        "wrap_label": true
    });
    std::fs::write(&config_path, config.to_string()).unwrap();

    let opts = ConversionOptions::from_json_file(&config_path).unwrap();
    let (field, raster) = decode(&image_to_zpl(&opts).unwrap());

    assert!(field.wrapped);
    assert_eq!(field.bytes_per_row, 4);
    // 64x4 scaled to width 32 keeps aspect: 32x2
    assert_eq!(raster.len(), 4 * 2);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_errors() {
    assert!(matches!(
        image_to_zpl(&ConversionOptions::new("data:image/png;base64,@@@")),
        Err(ZplError::Decode(_))
    ));
    assert!(matches!(
        image_to_zpl(&ConversionOptions::new(format!(
            "data:image/png;base64,{}",
            STANDARD.encode(b"not an image")
        ))),
        Err(ZplError::Decode(_))
    ));
    assert!(matches!(
        image_to_zpl(&ConversionOptions::new("no/such/file.png")),
        Err(ZplError::SourceNotFound(_))
    ));
    assert!(matches!(
        grid_to_zpl(
            PixelGrid::new(4, 4).unwrap(),
            &ConversionOptions::default().with_size(0, -1)
        ),
        Err(ZplError::InvalidDimension(_))
    ));
}
