//! Radar map metadata for Munakas.
//!
//! Turns the per-map radar configuration files shipped with the game
//! (a brace-delimited KeyValues text format) into [`MapMetadata`] records,
//! and assembles the catalog of playable maps that viewers receive when
//! they connect.
//!
//! # Asset layout
//!
//! | File                 | Meaning                                  |
//! |----------------------|------------------------------------------|
//! | `de_dust2.txt`       | Radar configuration (origin, scale, ...) |
//! | `de_dust2.png`       | Radar image; required for catalog entry  |
//! | `de_nuke_lower.txt`  | Layer variant, skipped by the catalog    |
//!
//! # Example
//!
//! ```no_run
//! use munakas_maps::MapCatalog;
//!
//! let catalog = MapCatalog::new("static/cs2-radar-images");
//! for map in catalog.scan().unwrap_or_default() {
//!     println!("{} -> {} (scale {})", map.id, map.name, map.scale);
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod metadata;
pub mod name;
pub mod parser;

// Re-exports
pub use catalog::MapCatalog;
pub use error::{MapsError, Result};
pub use metadata::{MapMetadata, VerticalSection};
pub use name::display_name;
pub use parser::{load_map_config, parse_map_config, parse_vertical_sections, quoted_tokens};
