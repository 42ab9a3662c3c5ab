use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read map config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Asset directory not found: {0}")]
    AssetDirMissing(PathBuf),
}

pub type Result<T> = std::result::Result<T, MapsError>;
