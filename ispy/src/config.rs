use anyhow::{Context, Result};
use image_transform::{ChannelLayout, DisplayConfig, TransformParameters};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
pub struct Config {
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    #[serde(default)]
    pub transform: Transform,

    #[serde(default)]
    pub display: Display,

    #[serde(default = "templates_dir_default")]
    #[derivative(Default(value = "templates_dir_default()"))]
    pub templates_dir: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Transform {
    #[derivative(Default(value = "1"))]
    pub kernel_size: u32,

    #[derivative(Default(value = "1"))]
    pub threshold: u32,

    // Red/green/blue output as one plane instead of a zero-filled colour image.
    pub single_plane: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Display {
    #[derivative(Default(value = "700"))]
    pub max_height: u32,

    #[derivative(Default(value = "10"))]
    pub margin: u32,
}

fn templates_dir_default() -> PathBuf {
    PathBuf::from("assets").join("templates")
}

impl Config {
    /// Reads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            log::debug!("no config file given, using defaults");
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path)
            .with_context(|| format!("read config file {} failed", path.display()))?;
        let mut config = Self::from_toml(&text)
            .with_context(|| format!("parse config file {} failed", path.display()))?;
        config.config_path = Some(path.to_path_buf());

        log::debug!("{config:?}");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn parameters(&self) -> TransformParameters {
        TransformParameters::new()
            .with_kernel_size(self.transform.kernel_size)
            .with_threshold(self.transform.threshold)
            .with_channel_layout(if self.transform.single_plane {
                ChannelLayout::SinglePlane
            } else {
                ChannelLayout::ZeroFilled
            })
    }

    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig::new()
            .with_max_height(self.display.max_height)
            .with_margin(self.display.margin)
    }
}
