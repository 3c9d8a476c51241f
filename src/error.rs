//! Error types for palette extraction.

use thiserror::Error;

/// Result type alias for palette extraction.
pub type Result<T> = std::result::Result<T, PaletteError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PaletteError {
    /// The image could not be read or decoded.
    #[error("unable to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The decoded image produced no pixel samples.
    #[error("image has no pixels to sample")]
    EmptyImage,

    /// The requested palette size cannot be satisfied by the samples.
    #[error("invalid number of colors {requested}: must be between 1 and {max}")]
    InvalidClusterCount { requested: usize, max: usize },

    /// Numeric failure while fitting clusters.
    #[error("palette extraction failed: {0}")]
    Extraction(String),

    #[error("unknown color space `{0}` (expected `rgb` or `hsv`)")]
    UnknownColorSpace(String),

    #[error("unknown clustering model `{0}` (expected `centroid` or `mixture`)")]
    UnknownModel(String),
}
