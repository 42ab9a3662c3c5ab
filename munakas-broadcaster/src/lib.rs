//! Real-time telemetry broadcaster for Munakas viewers
//!
//! This crate owns the registry of connected viewers and the single inbound
//! queue that every telemetry producer publishes to. A fan-out task delivers
//! each queued envelope to all registered viewers, evicting any viewer whose
//! write fails.
//!
//! # Features
//!
//! - Transport-agnostic clients (any `Sink<String>`, e.g. a WebSocket writer)
//! - One lock around the registry, fan-out included
//! - Ordered delivery: every viewer gets envelope N before any gets N+1
//! - Optional per-write deadline so a stalled viewer is evicted
//! - JSON sanitizing of bridge payloads before they are enveloped
//!
//! # Envelope Types
//!
//! - `maps_list` - Map catalog, sent on connect
//! - `player_data` - Player positions from the telemetry bridge
//! - `map_name` - Current map changed
//! - `bomb_state` - Bomb status from the telemetry bridge
//!
//! # Example Usage
//!
//! ```no_run
//! use munakas_broadcaster::{sanitize_json, BroadcastEnvelope, BroadcastHub, Client, PayloadShape};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let hub = BroadcastHub::default();
//!     hub.start().await?;
//!
//!     // Any Sink<String> can be a viewer
//!     let (tx, _rx) = futures::channel::mpsc::unbounded::<String>();
//!     let id = hub.register(Client::new(tx)).await;
//!
//!     let players = sanitize_json(br#"[{"name":"player"}]"#, PayloadShape::Array);
//!     hub.publish(BroadcastEnvelope::player_data(players)?).await?;
//!
//!     hub.deregister(id).await;
//!     hub.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod broadcaster;
pub mod client;
pub mod error;
pub mod events;
pub mod sanitize;

// Re-exports
pub use broadcaster::BroadcastHub;
pub use client::{Client, ClientId, ClientManager};
pub use error::{BroadcasterError, Result};
pub use events::BroadcastEnvelope;
pub use sanitize::{sanitize_json, PayloadShape};
