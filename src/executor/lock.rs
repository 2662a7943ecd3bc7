use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::errors::MigrationError;

/// Advisory lock that serializes migration runs against one metadata store.
#[async_trait]
pub trait MigrationLock: Send + Sync {
    /// Takes the lock or fails with `LockUnavailable` without waiting.
    async fn acquire(&self) -> Result<(), MigrationError>;

    async fn release(&self) -> Result<(), MigrationError>;
}

/// Process-local lock.
#[derive(Debug, Default)]
pub struct InMemoryLock {
    held: AtomicBool,
}

impl InMemoryLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A lock that somebody else already holds.
    pub fn held() -> Self {
        Self {
            held: AtomicBool::new(true),
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MigrationLock for InMemoryLock {
    async fn acquire(&self) -> Result<(), MigrationError> {
        self.held
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| MigrationError::LockUnavailable("another migration is running".into()))
    }

    async fn release(&self) -> Result<(), MigrationError> {
        self.held.store(false, Ordering::SeqCst);
        Ok(())
    }
}
