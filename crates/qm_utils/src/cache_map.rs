use core::fmt::Debug;
use core::hash::{BuildHasher, Hash};
use std::sync::{PoisonError, RwLock};

use hashbrown::Equivalent;

use crate::hash::FixedHashState;

// -----------------------------------------------------------------------------
// CacheMap

/// An insert-only map that can be shared between threads.
///
/// Entries are never removed or replaced: once a value is published for a key,
/// every later lookup observes that value. This makes the map suitable for
/// caches whose values are pure functions of their keys.
///
/// Values are returned by clone, so `V` is usually an `Arc` or another cheap
/// handle.
///
/// # Races
///
/// [`get_or_insert_with`](Self::get_or_insert_with) runs the builder without
/// holding the lock. Two threads missing the same key may both build a value;
/// the first to publish wins and the other value is dropped.
///
/// # Examples
///
/// ```
/// use qm_utils::CacheMap;
///
/// let cache = CacheMap::<String, usize>::new();
///
/// let len = cache.get_or_insert_with("node", || ("node".to_owned(), 4));
/// assert_eq!(len, 4);
///
/// // The builder is not called again for a published key.
/// let len = cache.get_or_insert_with("node", || unreachable!());
/// assert_eq!(len, 4);
/// ```
pub struct CacheMap<K, V, S = FixedHashState> {
    map: RwLock<hashbrown::HashMap<K, V, S>>,
}

impl<K, V> CacheMap<K, V, FixedHashState> {
    /// Creates an empty `CacheMap`.
    #[inline]
    pub const fn new() -> Self {
        Self::with_hasher(FixedHashState)
    }
}

impl<K, V, S> CacheMap<K, V, S> {
    /// Creates an empty `CacheMap` using the given hash state.
    #[inline]
    pub const fn with_hasher(hash_state: S) -> Self {
        Self {
            map: RwLock::new(hashbrown::HashMap::with_hasher(hash_state)),
        }
    }

    /// Returns the number of published entries.
    pub fn len(&self) -> usize {
        self.map.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if nothing has been published yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Eq + Hash, V: Clone, S: BuildHasher> CacheMap<K, V, S> {
    /// Returns a clone of the value published for `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.get(key).cloned()
    }

    /// Returns `true` if a value was published for `key`.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        map.contains_key(key)
    }

    /// Publishes `value` for `key` unless a value already exists.
    ///
    /// Returns `true` if the value was inserted.
    pub fn insert_if_absent(&self, key: K, value: V) -> bool {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        if map.contains_key(&key) {
            return false;
        }
        map.insert(key, value);
        true
    }

    /// Returns the value for `key`, building and publishing it on a miss.
    ///
    /// The builder returns the owned key together with the value, so a hit
    /// never needs to allocate the key.
    pub fn get_or_insert_with<Q>(&self, key: &Q, f: impl FnOnce() -> (K, V)) -> V
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        if let Some(value) = self.get(key) {
            return value;
        }
        let (owned, value) = f();
        self.publish(owned, value)
    }

    /// Fallible version of [`get_or_insert_with`](Self::get_or_insert_with).
    ///
    /// Nothing is published when the builder fails.
    pub fn get_or_try_insert_with<Q, E>(
        &self,
        key: &Q,
        f: impl FnOnce() -> Result<(K, V), E>,
    ) -> Result<V, E>
    where
        Q: Hash + Equivalent<K> + ?Sized,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let (owned, value) = f()?;
        Ok(self.publish(owned, value))
    }

    // Keeps the first published value when another thread won the race.
    fn publish(&self, key: K, value: V) -> V {
        let mut map = self.map.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = map.get(&key) {
            return existing.clone();
        }
        map.insert(key, value.clone());
        value
    }
}

// -----------------------------------------------------------------------------
// Traits

impl<K, V> Default for CacheMap<K, V, FixedHashState> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Debug, V: Debug, S> Debug for CacheMap<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let map = self.map.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_map().entries(map.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::CacheMap;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use std::thread;

    #[test]
    fn first_publish_wins() {
        let cache = CacheMap::<u32, &'static str>::new();
        assert!(cache.insert_if_absent(1, "first"));
        assert!(!cache.insert_if_absent(1, "second"));
        assert_eq!(cache.get(&1), Some("first"));
        assert_eq!(cache.get_or_insert_with(&1, || (1, "third")), "first");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_builder_publishes_nothing() {
        let cache = CacheMap::<u32, u32>::new();
        let res: Result<u32, &str> = cache.get_or_try_insert_with(&7, || Err("nope"));
        assert_eq!(res, Err("nope"));
        assert!(cache.is_empty());

        let res: Result<u32, &str> = cache.get_or_try_insert_with(&7, || Ok((7, 49)));
        assert_eq!(res, Ok(49));
        assert!(cache.contains_key(&7));
    }

    #[test]
    fn concurrent_builders_agree() {
        let cache = Arc::new(CacheMap::<u32, Arc<u32>>::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || cache.get_or_insert_with(&0, || (0, Arc::new(i))))
            })
            .collect();

        let values: Vec<Arc<u32>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winner = cache.get(&0).unwrap();
        assert!(values.iter().all(|v| Arc::ptr_eq(v, &winner)));
    }
}
