//! Entry storage
//!
//! [`GuestbookStore`] is the seam between request handling and the backing
//! key-value store. Requests reach the store through a [`StoreHandle`], which
//! owns the current store and knows how to build a fresh one when a health
//! check fails.

use crate::entry::Entry;
use futures_util::future::BoxFuture;
use std::{fmt, future::Future, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

mod dynamo;
mod memory;

pub use self::{dynamo::DynamoStore, memory::MemoryStore};

/// Errors raised by a [`GuestbookStore`]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Writing an entry failed
    #[error("failed to put entry {id}: {message}")]
    Put {
        /// entry being written
        id: Uuid,
        /// backend error description
        message: String,
    },
    /// Reading entries failed
    #[error("failed to scan {table}: {message}")]
    Scan {
        /// table being scanned
        table: String,
        /// backend error description
        message: String,
    },
    /// The store answered its health check with an error
    #[error("store is unhealthy: {0}")]
    Unhealthy(String),
    /// A replacement store could not be built
    #[error("failed to initialize store: {0}")]
    Init(String),
}

/// Persistence for guestbook entries
pub trait GuestbookStore: Send + Sync {
    /// Stores a single entry
    fn put_entry<'a>(&'a self, entry: &'a Entry) -> BoxFuture<'a, Result<(), StoreError>>;

    /// Returns every stored entry, in no particular order
    fn scan_entries(&self) -> BoxFuture<'_, Result<Vec<Entry>, StoreError>>;

    /// Cheap round trip proving the store is reachable
    fn health_check(&self) -> BoxFuture<'_, Result<(), StoreError>>;
}

/// Builds a new store, used at startup and again after a failed health check
pub type StoreFactory =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Arc<dyn GuestbookStore>, StoreError>> + Send + Sync>;

/// Wraps an async constructor into a [`StoreFactory`]
pub fn store_factory<F, Fut>(build: F) -> StoreFactory
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Arc<dyn GuestbookStore>, StoreError>> + Send + 'static,
{
    Arc::new(move || -> BoxFuture<'static, Result<Arc<dyn GuestbookStore>, StoreError>> {
        Box::pin(build())
    })
}

/// Outcome of [`StoreHandle::ensure_healthy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// The current store passed its health check
    Healthy,
    /// The current store failed and was replaced
    Reinitialized,
}

/// Owned, reinitializable access to the application's store
pub struct StoreHandle {
    current: RwLock<Arc<dyn GuestbookStore>>,
    factory: StoreFactory,
}

impl StoreHandle {
    /// Builds the first store through `factory`
    pub async fn connect(factory: StoreFactory) -> Result<Self, StoreError> {
        let store = factory().await?;
        Ok(StoreHandle {
            current: RwLock::new(store),
            factory,
        })
    }

    /// A handle whose reinitialization hands back the same store
    pub fn fixed(store: Arc<dyn GuestbookStore>) -> Self {
        let current = Arc::clone(&store);
        let factory = store_factory(move || {
            let store = Arc::clone(&store);
            async move { Ok(store) }
        });
        StoreHandle {
            current: RwLock::new(current),
            factory,
        }
    }

    /// The store requests should use right now
    pub async fn current(&self) -> Arc<dyn GuestbookStore> {
        Arc::clone(&*self.current.read().await)
    }

    /// Health checks the current store and swaps in a freshly built one when
    /// the check fails. Stores are never replaced any other way.
    ///
    /// Concurrent callers that see the same store fail rebuild it only once.
    pub async fn ensure_healthy(&self) -> Result<Health, StoreError> {
        let store = self.current().await;
        let err = match store.health_check().await {
            Ok(()) => return Ok(Health::Healthy),
            Err(err) => err,
        };
        let mut current = self.current.write().await;
        if !Arc::ptr_eq(&*current, &store) {
            debug!(error = %err, "store already replaced by another health check");
            return Ok(Health::Reinitialized);
        }
        warn!(error = %err, "store health check failed, reinitializing");
        *current = (self.factory)().await?;
        info!("store reinitialized");
        Ok(Health::Reinitialized)
    }
}

impl fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreHandle").finish_non_exhaustive()
    }
}
