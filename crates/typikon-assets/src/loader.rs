//! Async directory loader for asset layers
//!
//! Walks a directory tree at startup and turns every `.json`, `.yaml` and
//! `.yml` file into records of one [`AssetLayer`]. Files are read in sorted
//! path order so a key defined twice inside one directory always resolves
//! the same way. Other files are ignored.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AssetError, AssetResult};
use crate::store::AssetLayer;

/// Extensions read by the loader
pub const ASSET_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

/// Loads asset layers from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetLoader;

impl AssetLoader {
    /// Create loader
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Load every asset file under `root` into one layer
    ///
    /// # Errors
    ///
    /// [`AssetError::Io`] when `root` or a file cannot be read, parse and
    /// shape errors from the individual documents.
    pub async fn load_dir(
        &self,
        name: impl Into<String>,
        root: impl AsRef<Path>,
    ) -> AssetResult<AssetLayer> {
        let name = name.into();
        let root = root.as_ref();
        let files = collect_files(root).await?;

        let mut layer = AssetLayer::new(name);
        for path in &files {
            let value = read_document(path).await?;
            let count = layer.merge_value(value, &path.display().to_string())?;
            debug!(path = %path.display(), records = count, "asset file read");
        }

        info!(
            layer = layer.name(),
            root = %root.display(),
            files = files.len(),
            records = layer.len(),
            "asset directory loaded"
        );
        Ok(layer)
    }

    /// Load a single asset file as its own layer
    ///
    /// # Errors
    ///
    /// As [`AssetLoader::load_dir`].
    pub async fn load_file(
        &self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> AssetResult<AssetLayer> {
        let path = path.as_ref();
        let value = read_document(path).await?;
        let mut layer = AssetLayer::new(name);
        layer.merge_value(value, &path.display().to_string())?;
        Ok(layer)
    }
}

fn is_asset_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ASSET_EXTENSIONS.contains(&ext))
}

async fn collect_files(root: &Path) -> AssetResult<Vec<PathBuf>> {
    let mut pending = vec![root.to_path_buf()];
    let mut files = Vec::new();

    while let Some(dir) = pending.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| AssetError::io_error(&dir, e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| AssetError::io_error(&dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| AssetError::io_error(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if is_asset_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

async fn read_document(path: &Path) -> AssetResult<Value> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AssetError::io_error(path, e))?;
    let origin = path.display().to_string();

    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => {
            serde_yaml::from_str(&content).map_err(|e| AssetError::parse_error(origin, e))
        }
        _ => serde_json::from_str(&content).map_err(|e| AssetError::parse_error(origin, e)),
    }
}
