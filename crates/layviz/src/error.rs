//! Error types for overlay rendering

use std::io;
use thiserror::Error;

/// Errors raised while rendering layout overlays
#[derive(Error, Debug)]
pub enum VizError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PDF parse or compose error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Image encode/decode error
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Page geometry could not be determined
    #[error("invalid page geometry: {0}")]
    Geometry(String),

    /// Page rasterization failure
    #[error("render error: {0}")]
    Render(String),
}

/// Result type for overlay rendering operations
pub type Result<T> = std::result::Result<T, VizError>;
