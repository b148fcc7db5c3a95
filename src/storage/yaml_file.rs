use std::fs;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::domain::NewsEntry;
use crate::errors::TrendResult;
use crate::storage::traits::ArticleWriter;

/// Writes entries as a YAML sequence, the layout Jekyll expects under
/// `_data/`.
#[derive(Debug, Clone)]
pub struct YamlFileWriter {
    path: PathBuf,
}

impl YamlFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Sibling file the content is staged in before the rename.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ArticleWriter for YamlFileWriter {
    fn write(&self, entries: &[NewsEntry]) -> TrendResult<()> {
        let yaml = serde_yaml::to_string(entries)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            debug!(dir = %parent.display(), "Ensuring output directory exists");
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        fs::write(&staging, yaml)?;
        if let Err(e) = fs::rename(&staging, &self.path) {
            fs::remove_file(&staging).ok();
            return Err(e.into());
        }

        info!(path = %self.path.display(), count = entries.len(), "Wrote news data file");
        Ok(())
    }
}
