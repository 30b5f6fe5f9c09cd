use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::GameError;

/// Read-only access to text resources such as the title art.
pub trait AssetSource {
    fn lines(&self, path: &Path) -> Result<Vec<String>, GameError>;
}

/// Assets on disk, resolved against a root directory.
pub struct FileAssets {
    root: PathBuf,
}

impl FileAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileAssets { root: root.into() }
    }
}

impl AssetSource for FileAssets {
    fn lines(&self, path: &Path) -> Result<Vec<String>, GameError> {
        let full = self.root.join(path);
        debug!("loading asset {}", full.display());

        let text = fs::read_to_string(&full)
            .map_err(|source| GameError::AssetNotFound { path: full, source })?;
        Ok(text.lines().map(str::to_owned).collect())
    }
}
