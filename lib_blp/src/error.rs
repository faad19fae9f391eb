use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid magic tag: expected \"BLP2\", found {0:?}")]
    BadMagic(Vec<u8>),
    #[error("Unsupported container version {0}, only version 1 is supported")]
    UnsupportedVersion(u32),
    #[error("Mipmap slot {0} points past the end of the buffer")]
    ChainOutOfBounds(usize),
    #[error("Mipmap chain has no populated slot")]
    EmptyChain,
    #[error("Unsupported compression kind {0}")]
    UnsupportedCompressionKind(u8),
    #[error("Unsupported alpha depth {0} in header")]
    UnsupportedAlphaDepth(u8),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Image dimensions {width}x{height} are not powers of two")]
    NonPowerOfTwo { width: u32, height: u32 },
    #[error("Requested palette of {requested} colors exceeds the maximum of {max}")]
    PaletteTooLarge { requested: usize, max: usize },
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Unsupported alpha depth {0}, expected one of 0, 1, 4 or 8")]
    UnsupportedAlphaDepth(u8),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("Unexpected end of data while reading {what}: need {expected} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid pixel data length: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("Invalid palette index: {index} exceeds palette size of {palette_len}")]
    PaletteIndexOutOfRange { index: usize, palette_len: usize },
    #[error("Image dimensions {width}x{height} are too large to address")]
    DimensionsTooLarge { width: u32, height: u32 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlpError {
    #[error("Malformed container")]
    Format(#[from] FormatError),
    #[error("Invalid input")]
    Validation(#[from] ValidationError),
    #[error("Corrupt or truncated data")]
    Data(#[from] DataError),
}
