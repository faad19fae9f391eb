pub mod decoder;
pub mod encoder;
pub mod format;
pub mod header;
pub mod mipmap;
pub mod options;
pub mod resize;

pub use decoder::{decode, describe, HeaderReport};
pub use encoder::build;
pub use options::{BuildOptions, ResizeMode};
