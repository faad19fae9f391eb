use serde::{Deserialize, Serialize};

use super::format::CompressionKind;
use crate::compression::block::BlockVariant;

/// How a non power-of-two image is brought to power-of-two dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResizeMode {
    /// Scale the image to the target size (bilinear).
    #[default]
    Stretch,
    /// Place the image at the top-left corner and fill the rest.
    PadOrigin,
    /// Center the image and fill the border.
    PadCenter,
}

/// Options for [`build`](super::encoder::build).
///
/// `None` fields are derived from the image content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    pub compression: CompressionKind,
    /// Alpha depth for palette output, or 0/1 for the punch-through block variant.
    pub alpha_depth: Option<u8>,
    /// A hint of 1 picks the explicit-alpha variant over the interpolated one
    /// when translucent alpha is found.
    pub format_hint: Option<u8>,
    /// Forces a block variant and disables auto-selection.
    pub block_variant: Option<BlockVariant>,
    pub generate_mipmaps: bool,
    pub auto_resize: bool,
    pub resize_mode: ResizeMode,
    pub fill_color: [u8; 4],
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            compression: CompressionKind::Block,
            alpha_depth: None,
            format_hint: None,
            block_variant: None,
            generate_mipmaps: true,
            auto_resize: true,
            resize_mode: ResizeMode::Stretch,
            fill_color: [0, 0, 0, 0],
        }
    }
}
