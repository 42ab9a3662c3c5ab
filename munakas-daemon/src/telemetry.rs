//! Telemetry polling task
//!
//! Polls the bridge at a fixed interval, validates what it returns and
//! publishes envelopes onto the broadcast hub's inbound queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use munakas_broadcaster::{sanitize_json, BroadcastEnvelope, PayloadShape};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::bridge::{TelemetryBridge, NO_DATA};

pub struct TelemetryPoller {
    bridge: Box<dyn TelemetryBridge>,
    publisher: mpsc::Sender<BroadcastEnvelope>,
    current_map: watch::Sender<Option<String>>,
    interval: Duration,
}

impl TelemetryPoller {
    pub fn new(
        bridge: Box<dyn TelemetryBridge>,
        publisher: mpsc::Sender<BroadcastEnvelope>,
        current_map: watch::Sender<Option<String>>,
        interval: Duration,
    ) -> Self {
        Self {
            bridge,
            publisher,
            current_map,
            interval,
        }
    }

    /// Poll the bridge once and build the envelopes worth broadcasting.
    ///
    /// A map change comes first so viewers switch radar before positions
    /// for the new map arrive.
    pub fn poll_once(&mut self) -> Vec<BroadcastEnvelope> {
        let mut events = Vec::new();

        if let Some(map) = self.bridge.current_map() {
            let changed = self.current_map.send_if_modified(|current| {
                if current.as_deref() == Some(map.as_str()) {
                    return false;
                }
                *current = Some(map.clone());
                true
            });
            if changed {
                info!(map = %map, "Map changed");
                events.push(BroadcastEnvelope::MapName { map_name: map });
            }
        }

        let players = self.bridge.poll_players();
        if players != NO_DATA {
            let json = sanitize_json(&players, PayloadShape::Array);
            if json != PayloadShape::Array.fallback() {
                match BroadcastEnvelope::player_data(json) {
                    Ok(event) => events.push(event),
                    Err(e) => warn!("Dropping player data: {}", e),
                }
            }
        }

        if let Some(bomb) = self.bridge.poll_bomb() {
            let json = sanitize_json(&bomb, PayloadShape::Object);
            if json != PayloadShape::Object.fallback() {
                match BroadcastEnvelope::bomb_state(json) {
                    Ok(event) => events.push(event),
                    Err(e) => warn!("Dropping bomb state: {}", e),
                }
            }
        }

        events
    }

    /// Poll until `stop` is set or the hub's queue closes, then release
    /// the bridge. Blocks; run it on a blocking thread.
    pub fn run(mut self, stop: &AtomicBool) {
        info!("Telemetry polling every {} ms", self.interval.as_millis());

        'poll: while !stop.load(Ordering::Relaxed) {
            for event in self.poll_once() {
                if self.publisher.blocking_send(event).is_err() {
                    warn!("Broadcast queue closed, stopping telemetry");
                    break 'poll;
                }
            }
            std::thread::sleep(self.interval);
        }

        self.bridge.cleanup();
        debug!("Telemetry poller exited");
    }
}
