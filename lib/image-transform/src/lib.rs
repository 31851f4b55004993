pub mod background_transform;
pub mod blur_transform;
pub mod channel_transform;
pub mod display;
pub mod edge_transform;
pub mod pipeline;
pub mod pixel_buffer;
pub mod source;
pub mod template_catalog;
pub mod template_match;

pub use display::DisplayConfig;
pub use pipeline::{TransformKind, TransformParameters, apply};
pub use pixel_buffer::{ChannelLayout, PixelBuffer};
pub use template_catalog::TemplateCatalog;

pub type TransformResult<T> = Result<T, TransformError>;

#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid operation: {0} requires a template image")]
    MissingTemplate(&'static str),

    #[error("Image file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Image processing error: {0}")]
    ImageProc(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Image buffer error: {0}")]
    ImageBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Image resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),
}

/// A single image transform. Implementations never mutate the input and
/// always allocate a fresh buffer for the output.
pub trait Transform {
    fn apply(&self, image: &PixelBuffer) -> TransformResult<PixelBuffer>;
}
