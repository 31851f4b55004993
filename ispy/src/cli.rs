use crate::{Config, Session};
use anyhow::{Context, Result, bail};
use clap::Parser;
use image_transform::{ChannelLayout, TemplateCatalog, TransformKind};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Apply a demo image transform and save the result")]
pub struct Cli {
    /// TOML file with default parameters
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Image to open (PNG or JPEG)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Where to write the transformed image
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// original, blur, red, green, blue, gray, canny, remove-background or ispy
    #[arg(short, long, value_parser = parse_kind)]
    pub transform: Option<TransformKind>,

    /// Side length of the smoothing window (1-100)
    #[arg(short, long)]
    pub kernel_size: Option<u32>,

    /// Edge detection threshold (1-100)
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Emit red/green/blue channels as a single plane
    #[arg(long)]
    pub single_plane: bool,

    /// Directory holding the named "I Spy" templates
    #[arg(long)]
    pub templates_dir: Option<PathBuf>,

    /// Name of a template from the templates directory
    #[arg(long, conflicts_with = "template_file")]
    pub template: Option<String>,

    /// Template image outside the templates directory
    #[arg(long)]
    pub template_file: Option<PathBuf>,

    /// Print the available template names
    #[arg(long)]
    pub list_templates: bool,

    /// Also write the display-sized preview here
    #[arg(long)]
    pub display: Option<PathBuf>,
}

fn parse_kind(s: &str) -> Result<TransformKind, String> {
    s.parse::<TransformKind>().map_err(|e| e.to_string())
}

pub fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    let templates_dir = cli
        .templates_dir
        .clone()
        .unwrap_or_else(|| config.templates_dir.clone());
    let catalog = TemplateCatalog::scan(&templates_dir);

    if cli.list_templates {
        for name in catalog.names() {
            println!("{name}");
        }

        if cli.input.is_none() {
            return Ok(());
        }
    }

    let Some(input) = cli.input.as_ref() else {
        bail!("no input image given, use --input");
    };

    let mut params = config.parameters();
    if let Some(kernel_size) = cli.kernel_size {
        params = params.with_kernel_size(kernel_size);
    }
    if let Some(threshold) = cli.threshold {
        params = params.with_threshold(threshold);
    }
    if cli.single_plane {
        params = params.with_channel_layout(ChannelLayout::SinglePlane);
    }

    let mut session = Session::new(catalog).with_parameters(params);

    if let Some(name) = cli.template.as_deref() {
        session
            .select_template(name)
            .with_context(|| format!("load template `{name}` failed"))?;
    } else if let Some(path) = cli.template_file.as_ref() {
        session
            .load_template_file(path)
            .with_context(|| format!("load template {} failed", path.display()))?;
    }

    session
        .open(input)
        .with_context(|| format!("open {} failed", input.display()))?;

    if let Some(kind) = cli.transform {
        session
            .select_transform(kind)
            .with_context(|| format!("apply {} failed", kind.name()))?;
    }

    log::info!(
        "{} applied (kernel={}, threshold={})",
        session.kind().name(),
        session.parameters().kernel_size,
        session.parameters().threshold
    );

    if let Some(output) = cli.output.as_ref() {
        session
            .save(output)
            .with_context(|| format!("save {} failed", output.display()))?;
    }

    if let Some(preview) = cli.display.as_ref() {
        session
            .display(&config.display_config())?
            .save(preview)
            .with_context(|| format!("save preview {} failed", preview.display()))?;
    }

    Ok(())
}
