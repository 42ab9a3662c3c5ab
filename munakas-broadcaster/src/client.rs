use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, SinkExt};
use tokio::sync::Mutex;

use crate::error::{BroadcasterError, Result};
use crate::events::BroadcastEnvelope;

/// Registry key of a connected viewer
pub type ClientId = u64;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

type TextSink = Pin<Box<dyn Sink<String, Error = BroadcasterError> + Send>>;

/// Client connection wrapper.
///
/// Holds the write half of one viewer connection as a sink of text frames.
pub struct Client {
    id: ClientId,
    sink: TextSink,
}

impl Client {
    pub fn new<S>(sink: S) -> Self
    where
        S: Sink<String> + Send + 'static,
        S::Error: std::fmt::Display,
    {
        Self {
            id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            sink: Box::pin(sink.sink_map_err(|e| BroadcasterError::Send(e.to_string()))),
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Send event to client
    pub async fn send_event(&mut self, event: &BroadcastEnvelope) -> Result<()> {
        let json = event.to_json()?;
        self.send_text(json).await
    }

    /// Send a pre-serialized frame
    pub async fn send_text(&mut self, text: String) -> Result<()> {
        self.sink.send(text).await
    }

    /// Flush and close the underlying connection
    pub async fn close(mut self) {
        if let Err(e) = self.sink.close().await {
            tracing::debug!(client_id = self.id, "Error closing client: {}", e);
        }
    }
}

/// Thread-safe client list manager.
///
/// Every access, including the fan-out iteration, goes through one lock.
pub struct ClientManager {
    clients: Arc<Mutex<Vec<Client>>>,
    write_timeout: Option<Duration>,
}

impl ClientManager {
    pub fn new() -> Self {
        Self::with_write_timeout(None)
    }

    /// Manager that evicts clients whose write does not finish in time
    pub fn with_write_timeout(write_timeout: Option<Duration>) -> Self {
        Self {
            clients: Arc::new(Mutex::new(Vec::new())),
            write_timeout,
        }
    }

    /// Add new client
    pub async fn add_client(&self, client: Client) -> ClientId {
        let id = client.id();
        let mut clients = self.clients.lock().await;
        clients.push(client);
        tracing::info!(client_id = id, "Client registered. Total clients: {}", clients.len());
        id
    }

    /// Remove and close a client. Unknown ids are ignored.
    pub async fn remove_client(&self, id: ClientId) -> bool {
        let removed = {
            let mut clients = self.clients.lock().await;
            clients
                .iter()
                .position(|c| c.id() == id)
                .map(|idx| clients.remove(idx))
        };

        match removed {
            Some(client) => {
                self.close_client(client).await;
                tracing::info!(client_id = id, "Client deregistered");
                true
            }
            None => false,
        }
    }

    /// Broadcast event to all clients, removing dead ones.
    ///
    /// Returns the number of clients the event was delivered to.
    pub async fn broadcast(&self, event: &BroadcastEnvelope) -> Result<usize> {
        let json = event.to_json()?;
        let mut clients = self.clients.lock().await;
        let mut dead_indices = Vec::new();

        for (idx, client) in clients.iter_mut().enumerate() {
            if let Err(e) = self.write(client, json.clone()).await {
                tracing::warn!(client_id = client.id(), "Failed to send {}: {}", event.kind(), e);
                dead_indices.push(idx);
            }
        }

        let delivered = clients.len() - dead_indices.len();

        // Remove dead clients in reverse order
        let mut dead = Vec::with_capacity(dead_indices.len());
        for idx in dead_indices.into_iter().rev() {
            dead.push(clients.remove(idx));
        }
        let remaining = clients.len();
        drop(clients);

        for client in dead {
            let id = client.id();
            self.close_client(client).await;
            tracing::info!(client_id = id, "Evicted dead client. Remaining: {}", remaining);
        }

        Ok(delivered)
    }

    /// Remove and close every client
    pub async fn close_all(&self) {
        let clients: Vec<Client> = self.clients.lock().await.drain(..).collect();
        for client in clients {
            self.close_client(client).await;
        }
    }

    /// Get current client count
    pub async fn client_count(&self) -> usize {
        self.clients.lock().await.len()
    }

    async fn close_client(&self, client: Client) {
        let id = client.id();
        if let Some(limit) = self.write_timeout {
            if tokio::time::timeout(limit, client.close()).await.is_err() {
                tracing::debug!(client_id = id, "Timed out closing client");
            }
        } else {
            client.close().await;
        }
    }

    async fn write(&self, client: &mut Client, text: String) -> Result<()> {
        match self.write_timeout {
            Some(limit) => tokio::time::timeout(limit, client.send_text(text))
                .await
                .map_err(|_| BroadcasterError::WriteTimeout(limit.as_millis()))?,
            None => client.send_text(text).await,
        }
    }
}

impl Default for ClientManager {
    fn default() -> Self {
        Self::new()
    }
}
