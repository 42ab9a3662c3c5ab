use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::client::{Client, ClientId, ClientManager};
use crate::error::{BroadcasterError, Result};
use crate::events::BroadcastEnvelope;

/// Default inbound queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default per-client write deadline. Without one, a viewer that stops
/// reading stalls the fan-out while the registry is locked.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

struct FanoutTask {
    handle: JoinHandle<mpsc::Receiver<BroadcastEnvelope>>,
    shutdown: oneshot::Sender<()>,
}

/// Fans every published envelope out to all registered viewers.
///
/// Producers push onto one bounded inbound queue. A single fan-out task
/// takes envelopes off the queue in order and writes each one to every
/// registered client before taking the next. Clients whose write fails are
/// evicted and closed without affecting the others.
pub struct BroadcastHub {
    client_manager: Arc<ClientManager>,
    inbound_tx: mpsc::Sender<BroadcastEnvelope>,
    inbound_rx: Mutex<Option<mpsc::Receiver<BroadcastEnvelope>>>,
    fanout_task: Mutex<Option<FanoutTask>>,
    running: RwLock<bool>,
}

impl BroadcastHub {
    /// Create new hub. `write_timeout` bounds each per-client write.
    pub fn new(queue_capacity: usize, write_timeout: Option<Duration>) -> Self {
        let (inbound_tx, inbound_rx) = mpsc::channel(queue_capacity.max(1));

        Self {
            client_manager: Arc::new(ClientManager::with_write_timeout(write_timeout)),
            inbound_tx,
            inbound_rx: Mutex::new(Some(inbound_rx)),
            fanout_task: Mutex::new(None),
            running: RwLock::new(false),
        }
    }

    /// Start the fan-out loop
    pub async fn start(&self) -> Result<()> {
        let mut running = self.running.write().await;
        if *running {
            return Err(BroadcasterError::AlreadyRunning);
        }

        let mut inbound = self
            .inbound_rx
            .lock()
            .await
            .take()
            .ok_or(BroadcasterError::QueueClosed)?;

        let (shutdown, mut shutdown_rx) = oneshot::channel();
        let client_manager = Arc::clone(&self.client_manager);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    next = inbound.recv() => {
                        let Some(event) = next else { break };
                        match client_manager.broadcast(&event).await {
                            Ok(delivered) => {
                                tracing::trace!("Broadcast {} to {} clients", event.kind(), delivered)
                            }
                            Err(e) => tracing::error!("Failed to broadcast {}: {}", event.kind(), e),
                        }
                    }
                }
            }
            tracing::info!("Fan-out task stopped");
            inbound
        });

        *self.fanout_task.lock().await = Some(FanoutTask { handle, shutdown });
        *running = true;

        tracing::info!("Broadcast hub started");
        Ok(())
    }

    /// Stop the fan-out loop and close every client.
    ///
    /// Envelopes still queued stay queued for a later `start`.
    pub async fn stop(&self) -> Result<()> {
        let mut running = self.running.write().await;
        if !*running {
            return Err(BroadcasterError::NotStarted);
        }

        if let Some(task) = self.fanout_task.lock().await.take() {
            let _ = task.shutdown.send(());
            match task.handle.await {
                Ok(inbound) => *self.inbound_rx.lock().await = Some(inbound),
                Err(e) => tracing::error!("Fan-out task ended abnormally: {}", e),
            }
        }

        self.client_manager.close_all().await;
        *running = false;

        tracing::info!("Broadcast hub stopped");
        Ok(())
    }

    /// Enqueue an envelope, waiting while the queue is full
    pub async fn publish(&self, event: BroadcastEnvelope) -> Result<()> {
        self.inbound_tx
            .send(event)
            .await
            .map_err(|_| BroadcasterError::QueueClosed)
    }

    /// Handle for producers running outside this hub's owner
    pub fn publisher(&self) -> mpsc::Sender<BroadcastEnvelope> {
        self.inbound_tx.clone()
    }

    /// Make a client an eligible fan-out target
    pub async fn register(&self, client: Client) -> ClientId {
        self.client_manager.add_client(client).await
    }

    /// Remove a client; removing an absent client is a no-op
    pub async fn deregister(&self, id: ClientId) -> bool {
        self.client_manager.remove_client(id).await
    }

    /// Get current client count
    pub async fn client_count(&self) -> usize {
        self.client_manager.client_count().await
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY, Some(DEFAULT_WRITE_TIMEOUT))
    }
}
