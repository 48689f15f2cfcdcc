use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// Bad request shape. Surfaced as a 4xx before any provider call or
    /// queue publish happens.
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Queue-level infrastructure failures. `Missing` and `Unavailable` are
/// kept as separate variants even though both currently terminate the
/// worker: a transient connectivity failure is not proof the queue is gone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("queue '{name}' does not exist")]
    Missing { name: String },
    #[error("queue availability check failed: {reason}")]
    Unavailable { reason: String },
}
