//! Map catalog snapshots for newly connected viewers

use std::sync::Arc;

use munakas_maps::{MapCatalog, MapMetadata};
use tracing::{debug, warn};

use crate::config::CatalogMode;

/// Serves the catalog sent in each `maps_list`.
///
/// In `per_connection` mode the asset directory is rescanned for every
/// snapshot; in `cached` mode it is scanned once when the provider is built.
pub struct CatalogProvider {
    catalog: MapCatalog,
    cached: Option<Arc<Vec<MapMetadata>>>,
}

impl CatalogProvider {
    pub fn new(catalog: MapCatalog, mode: CatalogMode) -> Self {
        let cached = match mode {
            CatalogMode::Cached => Some(Arc::new(scan_or_empty(&catalog))),
            CatalogMode::PerConnection => None,
        };
        Self { catalog, cached }
    }

    /// Current catalog. Scan failures yield an empty list.
    pub async fn snapshot(&self) -> Vec<MapMetadata> {
        if let Some(cached) = &self.cached {
            return cached.as_ref().clone();
        }

        let catalog = self.catalog.clone();
        match tokio::task::spawn_blocking(move || scan_or_empty(&catalog)).await {
            Ok(maps) => maps,
            Err(e) => {
                warn!("Catalog scan task failed: {}", e);
                Vec::new()
            }
        }
    }
}

fn scan_or_empty(catalog: &MapCatalog) -> Vec<MapMetadata> {
    match catalog.scan() {
        Ok(maps) => {
            debug!("Catalog has {} maps", maps.len());
            maps
        }
        Err(e) => {
            warn!("Failed to scan {}: {}", catalog.assets_dir().display(), e);
            Vec::new()
        }
    }
}
