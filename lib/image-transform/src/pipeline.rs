use crate::{
    ChannelLayout, PixelBuffer, Transform, TransformError, TransformResult,
    background_transform::RemoveBackgroundConfig,
    blur_transform::{BlurConfig, check_kernel_size},
    channel_transform::{ChannelConfig, ColorChannel, GrayConfig},
    edge_transform::CannyConfig,
    template_match::TemplateMatchConfig,
};
use derivative::Derivative;
use derive_setters::Setters;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TransformKind {
    Original = 0,
    Blur,
    RedChannel,
    GreenChannel,
    BlueChannel,
    GrayChannel,
    Canny,
    RemoveBackground,
    TemplateMatch,
}

impl TransformKind {
    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::Original => "Original",
            TransformKind::Blur => "Blur",
            TransformKind::RedChannel => "Red",
            TransformKind::GreenChannel => "Green",
            TransformKind::BlueChannel => "Blue",
            TransformKind::GrayChannel => "Gray",
            TransformKind::Canny => "Canny",
            TransformKind::RemoveBackground => "Remove Background",
            TransformKind::TemplateMatch => "I Spy",
        }
    }

    /// Identifier accepted by [`FromStr`].
    pub fn key(&self) -> &'static str {
        match self {
            TransformKind::Original => "original",
            TransformKind::Blur => "blur",
            TransformKind::RedChannel => "red",
            TransformKind::GreenChannel => "green",
            TransformKind::BlueChannel => "blue",
            TransformKind::GrayChannel => "gray",
            TransformKind::Canny => "canny",
            TransformKind::RemoveBackground => "remove-background",
            TransformKind::TemplateMatch => "ispy",
        }
    }

    pub fn requires_template(&self) -> bool {
        matches!(self, TransformKind::TemplateMatch)
    }

    pub fn all() -> &'static [TransformKind] {
        &[
            TransformKind::Original,
            TransformKind::Blur,
            TransformKind::RedChannel,
            TransformKind::GreenChannel,
            TransformKind::BlueChannel,
            TransformKind::GrayChannel,
            TransformKind::Canny,
            TransformKind::RemoveBackground,
            TransformKind::TemplateMatch,
        ]
    }
}

impl FromStr for TransformKind {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase().replace('_', "-");
        TransformKind::all()
            .iter()
            .find(|kind| kind.key() == s)
            .copied()
            .ok_or_else(|| TransformError::InvalidParameter(format!("unknown transform `{s}`")))
    }
}

/// Numeric inputs of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
pub struct TransformParameters {
    #[derivative(Default(value = "1"))]
    pub kernel_size: u32,

    #[derivative(Default(value = "1"))]
    pub threshold: u32,

    pub channel_layout: ChannelLayout,
}

impl TransformParameters {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Runs one transform on `source`. The source is never modified.
pub fn apply(
    source: &PixelBuffer,
    kind: TransformKind,
    params: &TransformParameters,
    template: Option<&PixelBuffer>,
) -> TransformResult<PixelBuffer> {
    check_kernel_size(params.kernel_size)?;

    log::debug!(
        "apply {} to {}x{} image (kernel={}, threshold={})",
        kind.name(),
        source.width(),
        source.height(),
        params.kernel_size,
        params.threshold
    );

    match kind {
        TransformKind::Original => Ok(source.clone()),
        TransformKind::Blur => BlurConfig::new()
            .with_kernel_size(params.kernel_size)
            .apply(source),
        TransformKind::RedChannel => channel(source, ColorChannel::Red, params),
        TransformKind::GreenChannel => channel(source, ColorChannel::Green, params),
        TransformKind::BlueChannel => channel(source, ColorChannel::Blue, params),
        TransformKind::GrayChannel => GrayConfig::new()
            .with_kernel_size(params.kernel_size)
            .apply(source),
        TransformKind::Canny => CannyConfig::new()
            .with_kernel_size(params.kernel_size)
            .with_threshold(params.threshold)
            .apply(source),
        TransformKind::RemoveBackground => RemoveBackgroundConfig::new()
            .with_kernel_size(params.kernel_size)
            .apply(source),
        TransformKind::TemplateMatch => {
            let template = template.ok_or(TransformError::MissingTemplate(kind.name()))?;
            TemplateMatchConfig::new().apply(source, template)
        }
    }
}

fn channel(
    source: &PixelBuffer,
    channel: ColorChannel,
    params: &TransformParameters,
) -> TransformResult<PixelBuffer> {
    ChannelConfig::new()
        .with_channel(channel)
        .with_kernel_size(params.kernel_size)
        .with_layout(params.channel_layout)
        .apply(source)
}
