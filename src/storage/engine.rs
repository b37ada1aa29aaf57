//! Thread-Safe Key-Value Store
//!
//! The store is a single `HashMap<String, String>` behind one `Mutex`.
//! Every read and every write takes the same lock, and holds it only for the
//! map operation itself, never across socket I/O.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │                  Store                   │
//! │   ┌──────────────────────────────────┐   │
//! │   │  Mutex<HashMap<String, String>>  │   │
//! │   └──────────────────────────────────┘   │
//! │   gets / puts / hits (AtomicU64)         │
//! └──────────────────────────────────────────┘
//!        ▲            ▲            ▲
//!   connection 1  connection 2  connection N
//! ```
//!
//! Serializing all access process-wide is fine here: each lookup or insert is
//! O(1) on average and the critical section is tiny.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The shared key-value store.
///
/// Wrap it in an `Arc` and hand a clone to every connection.
/// The store only grows: there is no delete, eviction, or expiry.
///
/// # Example
///
/// ```
/// use simple_kv::storage::Store;
///
/// let store = Store::new();
///
/// store.put("name", "alice");
/// assert_eq!(store.get("name"), Some("alice".to_string()));
/// assert_eq!(store.get("missing"), None);
/// ```
pub struct Store {
    /// The mapping itself
    entries: Mutex<HashMap<String, String>>,

    /// Statistics: total get operations
    get_count: AtomicU64,

    /// Statistics: get operations that found a value
    hit_count: AtomicU64,

    /// Statistics: total put operations
    put_count: AtomicU64,
}

/// A point-in-time snapshot of the store counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StoreStats {
    pub keys: u64,
    pub gets: u64,
    pub hits: u64,
    pub puts: u64,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("keys", &self.len())
            .field("get_count", &self.get_count.load(Ordering::Relaxed))
            .field("put_count", &self.put_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            get_count: AtomicU64::new(0),
            hit_count: AtomicU64::new(0),
            put_count: AtomicU64::new(0),
        }
    }

    /// Acquires the store lock.
    ///
    /// A panic while holding the guard cannot leave the map half-written (every
    /// critical section is a single `HashMap` call), so a poisoned lock is
    /// recovered rather than propagated.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current value for `key`, or `None` if it was never written.
    ///
    /// Absence is a normal result, not an error.
    pub fn get(&self, key: &str) -> Option<String> {
        self.get_count.fetch_add(1, Ordering::Relaxed);

        let value = self.lock().get(key).cloned();

        if value.is_some() {
            self.hit_count.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Inserts or overwrites the value for `key`.
    ///
    /// Any content is accepted, including empty strings.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.put_count.fetch_add(1, Ordering::Relaxed);

        // Build the owned strings before taking the lock.
        let (key, value) = (key.into(), value.into());
        self.lock().insert(key, value);
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the store counters.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            keys: self.len() as u64,
            gets: self.get_count.load(Ordering::Relaxed),
            hits: self.hit_count.load(Ordering::Relaxed),
            puts: self.put_count.load(Ordering::Relaxed),
        }
    }
}
