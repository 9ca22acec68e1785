//! Keyed memoization of entities
//!
//! The cache owns every value it creates for the lifetime of the extraction
//! run; callers get shared `Arc` handles.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};

/// Create-or-fetch table keyed by `K`.
///
/// Construction runs under the write lock, so concurrent requests for the same
/// key observe exactly one value. Constructors must therefore be cheap and
/// must not re-enter the same cache.
#[derive(Debug)]
pub struct EntityCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K, V> Default for EntityCache<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash, V> EntityCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the value for `key`, creating it with `create` on first request.
    ///
    /// The flag is true only for the caller whose constructor ran.
    pub fn get_or_create<F>(&self, key: K, create: F) -> (Arc<V>, bool)
    where
        F: FnOnce() -> V,
    {
        if let Some(existing) = self.get(&key) {
            return (existing, false);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have won between the read and write lock
        if let Some(existing) = entries.get(&key) {
            return (Arc::clone(existing), false);
        }
        let value = Arc::new(create());
        entries.insert(key, Arc::clone(&value));
        (value, true)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
