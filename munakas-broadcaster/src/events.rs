use munakas_maps::MapMetadata;
use serde::Serialize;
use serde_json::value::RawValue;

use crate::error::Result;

/// Messages sent to viewers.
///
/// Bridge payloads are embedded as raw JSON fields, so an envelope is
/// well-formed whenever its payload is.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum BroadcastEnvelope {
    /// Map catalog, sent once when a viewer connects
    #[serde(rename = "maps_list")]
    MapsList {
        maps: Vec<MapMetadata>,
        #[serde(skip_serializing_if = "Option::is_none")]
        map_name: Option<String>,
    },

    /// Current player list from the telemetry bridge
    #[serde(rename = "player_data")]
    PlayerData { data: Box<RawValue> },

    /// Map loaded by the game changed
    #[serde(rename = "map_name")]
    MapName { map_name: String },

    /// Bomb status from the telemetry bridge
    #[serde(rename = "bomb_state")]
    BombState { data: Box<RawValue> },
}

impl BroadcastEnvelope {
    /// Wrap an already validated JSON array of players
    pub fn player_data(json: String) -> Result<Self> {
        Ok(Self::PlayerData {
            data: RawValue::from_string(json)?,
        })
    }

    /// Wrap an already validated JSON bomb-state object
    pub fn bomb_state(json: String) -> Result<Self> {
        Ok(Self::BombState {
            data: RawValue::from_string(json)?,
        })
    }

    /// Wire `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MapsList { .. } => "maps_list",
            Self::PlayerData { .. } => "player_data",
            Self::MapName { .. } => "map_name",
            Self::BombState { .. } => "bomb_state",
        }
    }

    /// Serialize to a single text frame
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
