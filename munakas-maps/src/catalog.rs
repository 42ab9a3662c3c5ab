//! Catalog of playable maps built from the radar asset directory

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MapsError, Result};
use crate::metadata::MapMetadata;
use crate::parser::load_map_config;

/// Extension of radar configuration files
const CONFIG_EXTENSION: &str = "txt";

/// Suffix of layer variants that belong to another map
const LAYER_SUFFIX: &str = "_lower";

/// Scans an asset directory for `<id>.txt` + `<id>.<image>` pairs
#[derive(Debug, Clone)]
pub struct MapCatalog {
    assets_dir: PathBuf,
    image_extension: String,
}

impl MapCatalog {
    /// Catalog over `assets_dir` expecting PNG radar images
    pub fn new(assets_dir: impl AsRef<Path>) -> Self {
        Self::with_image_extension(assets_dir, "png")
    }

    pub fn with_image_extension(assets_dir: impl AsRef<Path>, image_extension: &str) -> Self {
        Self {
            assets_dir: assets_dir.as_ref().to_path_buf(),
            image_extension: image_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    /// Build the catalog from the current directory contents.
    ///
    /// Entries are visited in file-name order and deduplicated on the
    /// lower-cased stem, first occurrence wins. A config without an image
    /// is skipped; an unreadable config still yields a default record.
    pub fn scan(&self) -> Result<Vec<MapMetadata>> {
        if !self.assets_dir.is_dir() {
            return Err(MapsError::AssetDirMissing(self.assets_dir.clone()));
        }

        let mut configs: Vec<PathBuf> = std::fs::read_dir(&self.assets_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(CONFIG_EXTENSION))
            })
            .collect();
        configs.sort();

        let mut seen = HashSet::new();
        let mut maps = Vec::with_capacity(configs.len());

        for config_path in configs {
            let Some(stem) = config_path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let id = stem.to_ascii_lowercase();
            if id.ends_with(LAYER_SUFFIX) || seen.contains(&id) {
                continue;
            }

            let image_path = self
                .assets_dir
                .join(format!("{}.{}", stem, self.image_extension));
            if !image_path.exists() {
                warn!(
                    map = %id,
                    "Config {} has no matching .{} image, skipping",
                    config_path.display(),
                    self.image_extension
                );
                continue;
            }

            let metadata = match load_map_config(&config_path, &id) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(map = %id, "Could not parse map config: {}", e);
                    MapMetadata::with_defaults(id.as_str())
                }
            };

            debug!(map = %id, scale = metadata.scale, "Catalogued map");
            seen.insert(id);
            maps.push(metadata);
        }

        Ok(maps)
    }
}
