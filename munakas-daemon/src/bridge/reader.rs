//! Telemetry from an external reader executable
//!
//! The reader prints one `PLAYERLIST:<json>` line per tick on stdout and
//! diagnostics on stderr. Only the most recent player list is kept; the
//! poller picks it up on its own schedule.

use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::{BridgeError, TelemetryBridge, NO_DATA};

const PLAYERLIST_PREFIX: &[u8] = b"PLAYERLIST:";

pub struct ReaderProcess {
    path: PathBuf,
    args: Vec<String>,
    child: Option<Child>,
    latest: Arc<Mutex<Option<Vec<u8>>>>,
}

impl ReaderProcess {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_args(path, Vec::<String>::new())
    }

    pub fn with_args<I, S>(path: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            args: args.into_iter().map(Into::into).collect(),
            child: None,
            latest: Arc::new(Mutex::new(None)),
        }
    }
}

impl TelemetryBridge for ReaderProcess {
    fn init(&mut self) -> Result<(), BridgeError> {
        let mut child = Command::new(&self.path)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BridgeError::Init(format!("failed to spawn {}: {}", self.path.display(), e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::Init("reader stdout unavailable".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| BridgeError::Init("reader stderr unavailable".into()))?;

        let latest = Arc::clone(&self.latest);
        std::thread::Builder::new()
            .name("reader-stdout".into())
            .spawn(move || {
                for line in BufReader::new(stdout).split(b'\n') {
                    let Ok(line) = line else { break };
                    match player_list(&line) {
                        Some(payload) => *latest.lock() = Some(payload.to_vec()),
                        None => debug!("Ignoring reader output: {}", String::from_utf8_lossy(&line)),
                    }
                }
                warn!("Telemetry reader closed its output");
            })?;

        std::thread::Builder::new()
            .name("reader-stderr".into())
            .spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                    info!(target: "reader", "{}", line);
                }
            })?;

        info!("Spawned telemetry reader {} (pid {})", self.path.display(), child.id());
        self.child = Some(child);
        Ok(())
    }

    fn poll_players(&mut self) -> Vec<u8> {
        self.latest.lock().take().unwrap_or_else(|| NO_DATA.to_vec())
    }

    fn cleanup(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!("Reader already exited: {}", e);
            }
            let _ = child.wait();
            info!("Telemetry reader stopped");
        }
    }
}

impl Drop for ReaderProcess {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Payload of a `PLAYERLIST:` line
fn player_list(line: &[u8]) -> Option<&[u8]> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    line.strip_prefix(PLAYERLIST_PREFIX)
}
