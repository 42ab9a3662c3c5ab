//! Telemetry bridge: the boundary to the external game-state producer
//!
//! The producer is opaque; all this crate relies on is its output contract.
//! Each poll yields a JSON array of players (`[]` when there is nothing to
//! report), optionally a bomb-state object, and the current map name.

use thiserror::Error;

use crate::config::{TelemetryConfig, TelemetrySourceKind};

#[cfg(feature = "native-bridge")]
mod native;
mod reader;

#[cfg(feature = "native-bridge")]
pub use native::NativeBridge;
pub use reader::ReaderProcess;

/// Literal the producer returns when it has no player data this tick
pub const NO_DATA: &[u8] = b"[]";

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Telemetry bridge initialization failed: {0}")]
    Init(String),

    #[error("Telemetry bridge IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Telemetry source '{0}' is not available in this build")]
    Unsupported(&'static str),

    #[error("Telemetry source misconfigured: {0}")]
    Config(String),
}

/// Narrow contract of a telemetry producer.
///
/// Calls may block (memory reads, pipe reads); the poller runs them on a
/// blocking thread.
pub trait TelemetryBridge: Send {
    /// Connect to the producer. Failure is fatal at startup.
    fn init(&mut self) -> Result<(), BridgeError>;

    /// Raw player-list JSON, [`NO_DATA`] when nothing is available
    fn poll_players(&mut self) -> Vec<u8>;

    /// Raw bomb-state JSON, if the producer reports one
    fn poll_bomb(&mut self) -> Option<Vec<u8>> {
        None
    }

    /// Identifier of the map currently loaded, if known
    fn current_map(&mut self) -> Option<String> {
        None
    }

    /// Release producer resources
    fn cleanup(&mut self) {}
}

/// Bridge that never has data
#[derive(Debug, Default)]
pub struct NullBridge;

impl TelemetryBridge for NullBridge {
    fn init(&mut self) -> Result<(), BridgeError> {
        tracing::warn!("Telemetry disabled; viewers will only receive the map catalog");
        Ok(())
    }

    fn poll_players(&mut self) -> Vec<u8> {
        NO_DATA.to_vec()
    }
}

/// Build the bridge selected by configuration (not yet initialized)
pub fn open_bridge(config: &TelemetryConfig) -> Result<Box<dyn TelemetryBridge>, BridgeError> {
    match config.source {
        TelemetrySourceKind::Disabled => Ok(Box::new(NullBridge)),
        TelemetrySourceKind::Reader => {
            let path = config.reader_path.clone().ok_or_else(|| {
                BridgeError::Config("telemetry.reader_path is required for source = \"reader\"".into())
            })?;
            Ok(Box::new(ReaderProcess::with_args(path, config.reader_args.clone())))
        }
        #[cfg(feature = "native-bridge")]
        TelemetrySourceKind::Native => Ok(Box::new(NativeBridge::default())),
        #[cfg(not(feature = "native-bridge"))]
        TelemetrySourceKind::Native => Err(BridgeError::Unsupported("native")),
    }
}
