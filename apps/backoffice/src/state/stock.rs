//! # Stock Locks
//!
//! One async lock per product id. A checkout holds a product's lock for
//! the duration of its decrement, so two checkouts selling the same
//! product never interleave their read-modify-write on the backend.
//!
//! ```text
//! checkout A ──► lock(p-1) ──► decrement p-1 ──► unlock
//! checkout B ──────────────── wait ────────────► lock(p-1) ──► decrement
//! checkout C ──► lock(p-2) ──► decrement p-2     (independent)
//! ```
//!
//! An entry lives only while someone holds or waits on it; the last
//! [`StockLockGuard`] to go removes it, so the map never outgrows the
//! number of decrements in flight.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type ProductLock = Arc<AsyncMutex<()>>;

#[derive(Debug, Default)]
pub struct StockLocks {
    locks: Mutex<HashMap<String, ProductLock>>,
}

impl StockLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, product_id: &str) -> ProductLock {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks
            .entry(product_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Waits until no one else is decrementing `product_id`.
    pub async fn acquire(&self, product_id: &str) -> StockLockGuard<'_> {
        let held = self.lock_for(product_id).lock_owned().await;
        StockLockGuard {
            locks: self,
            product_id: product_id.to_string(),
            held: Some(held),
        }
    }

    /// Drops the entry for `product_id` unless another task still has it.
    fn prune(&self, product_id: &str) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(product_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(product_id);
        }
    }

    /// Number of products currently held or waited on.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Holds one product's lock; releasing it prunes the idle entry.
#[derive(Debug)]
pub struct StockLockGuard<'a> {
    locks: &'a StockLocks,
    product_id: String,
    held: Option<OwnedMutexGuard<()>>,
}

impl Drop for StockLockGuard<'_> {
    fn drop(&mut self) {
        // the owned guard keeps a clone of the Arc; release it first
        self.held.take();
        self.locks.prune(&self.product_id);
    }
}
