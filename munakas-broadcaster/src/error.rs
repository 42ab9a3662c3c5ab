use thiserror::Error;

#[derive(Error, Debug)]
pub enum BroadcasterError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Client send failed: {0}")]
    Send(String),

    #[error("Client write timed out after {0} ms")]
    WriteTimeout(u128),

    #[error("Inbound queue closed")]
    QueueClosed,

    #[error("Broadcast hub not started")]
    NotStarted,

    #[error("Broadcast hub already running")]
    AlreadyRunning,
}

pub type Result<T> = std::result::Result<T, BroadcasterError>;
