//! Named template images shipped next to the application.

use crate::{PixelBuffer, TransformError, TransformResult, source};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const TEMPLATE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    entries: Vec<(String, PathBuf)>,
}

impl TemplateCatalog {
    /// Lists the image files directly inside `dir`, named by their file stem.
    /// A missing directory gives an empty catalog.
    pub fn scan(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            log::warn!("templates directory {} does not exist", dir.display());
            return Self::default();
        }

        let mut entries: Vec<(String, PathBuf)> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let path = entry.into_path();
                let ext = path.extension()?.to_str()?.to_ascii_lowercase();
                if !TEMPLATE_EXTENSIONS.contains(&ext.as_str()) {
                    return None;
                }

                let name = path.file_stem()?.to_string_lossy().to_string();
                Some((name, path))
            })
            .collect();

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        log::debug!("found {} templates in {}", entries.len(), dir.display());

        Self { entries }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, path)| path.as_path())
    }

    pub fn load(&self, name: &str) -> TransformResult<PixelBuffer> {
        let path = self
            .path(name)
            .ok_or_else(|| TransformError::UnknownTemplate(name.to_string()))?;
        source::load(path)
    }
}
