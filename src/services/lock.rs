use tokio::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("Lock '{0}' is held by another owner")]
    Held(String),

    #[error("Lock '{0}' is no longer owned by us")]
    NotOwner(String),

    #[error("Lock service unreachable: {0}")]
    Unavailable(String),

    #[error("Lock call failed: {0}")]
    Other(String),
}

/// Factory for named cluster-wide locks.
#[async_trait::async_trait]
pub trait LockProvider: Send + Sync {
    async fn create_lock(&self, name: &str, ttl: Duration) -> Result<Box<dyn DistributedLock>, LockError>;
}

/// A lease-style mutual exclusion primitive. The lease lapses after its TTL unless `refresh` is
/// called in time.
#[async_trait::async_trait]
pub trait DistributedLock: Send + Sync {
    fn name(&self) -> &str;

    async fn lock(&self) -> Result<(), LockError>;

    async fn unlock(&self) -> Result<(), LockError>;

    /// Extend the lease by another TTL. Fails with `NotOwner` if the lease already lapsed.
    async fn refresh(&self) -> Result<(), LockError>;
}
