//! # Error Types
//!
//! This module defines error types used throughout the zpl-image library.
//! Every error is terminal for a single conversion: no partial command is
//! ever returned.

use thiserror::Error;

/// Main error type for zpl-image operations
#[derive(Debug, Error)]
pub enum ZplError {
    /// Path, URI or embedded text could not be resolved
    #[error("Source not found: {0}")]
    SourceNotFound(String),

    /// Bytes are not a valid image (or not valid base64)
    #[error("Decode error: {0}")]
    Decode(String),

    /// Zero or negative width/height
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    /// Compressor failure
    #[error("Compression error: {0}")]
    Compression(String),

    /// Pixel access outside the grid
    #[error("Pixel ({x}, {y}) out of bounds for {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// Unknown option value or malformed configuration file
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ZplError>;
