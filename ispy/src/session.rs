//! State behind the menus and sliders.
//!
//! Every event re-runs the pipeline on the calling thread. An event either
//! commits its new state together with the new result, or fails and leaves
//! the session exactly as it was.

use image::RgbaImage;
use image_transform::{
    ChannelLayout, DisplayConfig, PixelBuffer, TemplateCatalog, TransformError, TransformKind,
    TransformParameters, display, source,
};
use std::path::Path;

/// Slider range shared by the kernel size and the threshold.
pub const PARAM_MIN: u32 = 1;
pub const PARAM_MAX: u32 = 100;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("No image loaded")]
    NoImage,

    #[error(transparent)]
    Transform(#[from] TransformError),
}

#[derive(Debug, Default)]
pub struct Session {
    catalog: TemplateCatalog,
    original: Option<PixelBuffer>,
    template: Option<PixelBuffer>,
    kind: Option<TransformKind>,
    params: TransformParameters,
    result: Option<PixelBuffer>,
}

impl Session {
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    pub fn with_parameters(mut self, params: TransformParameters) -> Self {
        self.params = TransformParameters {
            kernel_size: clamp_param(params.kernel_size),
            threshold: clamp_param(params.threshold),
            ..params
        };
        self
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn kind(&self) -> TransformKind {
        self.kind.unwrap_or(TransformKind::Original)
    }

    pub fn parameters(&self) -> &TransformParameters {
        &self.params
    }

    pub fn original(&self) -> Option<&PixelBuffer> {
        self.original.as_ref()
    }

    pub fn template(&self) -> Option<&PixelBuffer> {
        self.template.as_ref()
    }

    pub fn result(&self) -> Option<&PixelBuffer> {
        self.result.as_ref()
    }

    pub fn open(&mut self, path: impl AsRef<Path>) -> SessionResult<()> {
        let image = source::load(path)?;
        let result = self.run(Some(&image), self.kind(), &self.params, self.template.as_ref())?;

        self.original = Some(image);
        self.result = result;
        Ok(())
    }

    pub fn select_transform(&mut self, kind: TransformKind) -> SessionResult<()> {
        if kind.requires_template() && self.template.is_none() {
            log::warn!("{} selected without a template", kind.name());
            return Err(TransformError::MissingTemplate(kind.name()).into());
        }

        let result = self.run(self.original.as_ref(), kind, &self.params, self.template.as_ref())?;
        self.kind = Some(kind);
        self.result = result;
        Ok(())
    }

    pub fn set_kernel_size(&mut self, kernel_size: u32) -> SessionResult<()> {
        self.update_parameters(self.params.with_kernel_size(clamp_param(kernel_size)))
    }

    pub fn set_threshold(&mut self, threshold: u32) -> SessionResult<()> {
        self.update_parameters(self.params.with_threshold(clamp_param(threshold)))
    }

    pub fn set_channel_layout(&mut self, layout: ChannelLayout) -> SessionResult<()> {
        self.update_parameters(self.params.with_channel_layout(layout))
    }

    /// Loads a template from the catalog and switches to template matching.
    pub fn select_template(&mut self, name: &str) -> SessionResult<()> {
        let template = self.catalog.load(name)?;
        self.use_template(template)
    }

    pub fn load_template_file(&mut self, path: impl AsRef<Path>) -> SessionResult<()> {
        let template = source::load(path)?;
        self.use_template(template)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> SessionResult<()> {
        let result = self.result.as_ref().ok_or(SessionError::NoImage)?;
        source::save(path, result)?;
        Ok(())
    }

    pub fn display(&self, config: &DisplayConfig) -> SessionResult<RgbaImage> {
        let result = self.result.as_ref().ok_or(SessionError::NoImage)?;
        Ok(display::render(result, config)?)
    }

    fn use_template(&mut self, template: PixelBuffer) -> SessionResult<()> {
        let kind = TransformKind::TemplateMatch;
        let result = self.run(self.original.as_ref(), kind, &self.params, Some(&template))?;

        self.template = Some(template);
        self.kind = Some(kind);
        self.result = result;
        Ok(())
    }

    fn update_parameters(&mut self, params: TransformParameters) -> SessionResult<()> {
        let result = self.run(self.original.as_ref(), self.kind(), &params, self.template.as_ref())?;
        self.params = params;
        self.result = result;
        Ok(())
    }

    // Nothing to do until an image is loaded.
    fn run(
        &self,
        original: Option<&PixelBuffer>,
        kind: TransformKind,
        params: &TransformParameters,
        template: Option<&PixelBuffer>,
    ) -> SessionResult<Option<PixelBuffer>> {
        let Some(original) = original else {
            return Ok(None);
        };

        Ok(Some(image_transform::apply(original, kind, params, template)?))
    }
}

fn clamp_param(value: u32) -> u32 {
    value.clamp(PARAM_MIN, PARAM_MAX)
}
