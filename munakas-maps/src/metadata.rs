use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::name::display_name;

/// Altitude band of one map layer (e.g. upper/lower floors on Nuke)
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct VerticalSection {
    #[serde(rename = "altitudeMin")]
    pub altitude_min: f64,

    #[serde(rename = "altitudeMax")]
    pub altitude_max: f64,
}

/// One playable map as sent to viewers in the `maps_list` message
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MapMetadata {
    /// Catalog key, the config file stem (e.g. `de_dust2`)
    pub id: String,

    /// Human readable label (e.g. `Dust2`)
    pub name: String,

    #[serde(rename = "pos_x")]
    pub origin_x: f64,

    #[serde(rename = "pos_y")]
    pub origin_y: f64,

    /// World units per radar pixel. Never zero.
    pub scale: f64,

    #[serde(rename = "rotate")]
    pub rotation: f64,

    /// Named altitude bands, omitted when the config declares none
    #[serde(
        rename = "verticalSections",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub vertical_sections: BTreeMap<String, VerticalSection>,
}

impl MapMetadata {
    /// Record with every numeric field at its default (scale 1.0, rest 0.0)
    pub fn with_defaults(id: impl Into<String>) -> Self {
        let id = id.into();
        let name = display_name(&id);

        Self {
            id,
            name,
            origin_x: 0.0,
            origin_y: 0.0,
            scale: 1.0,
            rotation: 0.0,
            vertical_sections: BTreeMap::new(),
        }
    }
}
