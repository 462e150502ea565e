use super::{GuestbookStore, StoreError};
use crate::entry::Entry;
use futures_util::future::BoxFuture;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// In-process store for tests and `--store memory`
#[derive(Debug)]
pub struct MemoryStore {
    entries: Mutex<Vec<Entry>>,
    healthy: AtomicBool,
}

impl MemoryStore {
    /// An empty, healthy store
    pub fn new() -> Self {
        MemoryStore {
            entries: Mutex::new(Vec::new()),
            healthy: AtomicBool::new(true),
        }
    }

    /// Flips the result of [`GuestbookStore::health_check`]
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GuestbookStore for MemoryStore {
    fn put_entry<'a>(&'a self, entry: &'a Entry) -> BoxFuture<'a, Result<(), StoreError>> {
        Box::pin(async move {
            self.entries.lock().await.push(entry.clone());
            Ok(())
        })
    }

    fn scan_entries(&self) -> BoxFuture<'_, Result<Vec<Entry>, StoreError>> {
        Box::pin(async move { Ok(self.entries.lock().await.clone()) })
    }

    fn health_check(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            if self.healthy.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(StoreError::Unhealthy("memory store marked unhealthy".into()))
            }
        })
    }
}
