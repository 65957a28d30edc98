//! Height field error types.

/// Errors that can occur when building, loading or saving a height field.
#[derive(Debug, thiserror::Error)]
pub enum HeightfieldError {
    /// Width or height was zero.
    #[error("invalid heightmap dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The sample buffer does not match `width * height`.
    #[error("expected {expected} samples, got {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    /// The elevation range is empty, inverted or not finite.
    #[error("invalid elevation range {min}..{max}")]
    InvalidElevationRange { min: f32, max: f32 },

    /// Failed to read or write a heightmap file.
    #[error("heightmap i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The PNG decoder rejected the file.
    #[error("failed to decode heightmap png: {0}")]
    PngDecode(#[from] png::DecodingError),

    /// The PNG encoder failed.
    #[error("failed to encode heightmap png: {0}")]
    PngEncode(#[from] png::EncodingError),

    /// The PNG uses a color type / bit depth combination we cannot map to heights.
    #[error("unsupported heightmap png format: {color_type} at {bit_depth} bits")]
    UnsupportedPng { color_type: String, bit_depth: u8 },
}
