//! # Memo Maps
//!
//! Small fixed-capacity caches for pure equation results, keyed by the exact
//! bit patterns of the `f64` arguments. A sweep re-evaluates a few steps with
//! identical arguments thousands of times (the force per unit length and the
//! contraction-time solve do not depend on the swept tension).
//!
//! Values are immutable once stored, so concurrent readers never observe a
//! partial entry. Two threads missing the same key both compute it and the
//! second insert overwrites the first with an identical value.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// Cache key for `N` scalar arguments.
pub type ArgKey<const N: usize> = [u64; N];

/// Build a cache key from the exact bit patterns of the arguments.
///
/// `0.0` and `-0.0` map to different keys, which only costs a recomputation.
pub fn arg_key<const N: usize>(args: [f64; N]) -> ArgKey<N> {
    args.map(f64::to_bits)
}

/// A bounded map from argument tuples to computed values.
///
/// When full, the map is cleared before the next insert. Sweeps touch very few
/// distinct keys, so a smarter eviction policy buys nothing.
#[derive(Debug)]
pub struct MemoMap<K, V> {
    capacity: usize,
    entries: Mutex<HashMap<K, V>>,
}

impl<K: Eq + Hash, V: Clone> MemoMap<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(HashMap::with_capacity(capacity)),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// The lock is not held while `compute` runs.
    pub fn get_or_insert_with(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(hit) = self.get(&key) {
            return hit;
        }
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Like [`MemoMap::get_or_insert_with`], caching only successful results.
    pub fn get_or_try_insert_with<E>(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(hit) = self.get(&key) {
            return Ok(hit);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.lock().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: &K) -> Option<V> {
        // A poisoned lock only disables caching
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn insert(&self, key: K, value: V) {
        if let Ok(mut map) = self.entries.lock() {
            if map.len() >= self.capacity && !map.contains_key(&key) {
                map.clear();
            }
            map.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_hit_skips_recomputation() {
        let memo: MemoMap<ArgKey<2>, f64> = MemoMap::new(4);
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            42.0
        };

        assert_eq!(memo.get_or_insert_with(arg_key([1.0, 2.0]), compute), 42.0);
        assert_eq!(memo.get_or_insert_with(arg_key([1.0, 2.0]), compute), 42.0);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_capacity_bound() {
        let memo: MemoMap<ArgKey<1>, f64> = MemoMap::new(3);
        for i in 0..10 {
            memo.get_or_insert_with(arg_key([i as f64]), || i as f64);
            assert!(memo.len() <= 3);
        }
    }

    #[test]
    fn test_errors_are_not_cached() {
        let memo: MemoMap<ArgKey<1>, f64> = MemoMap::new(4);
        let failed: Result<f64, &str> =
            memo.get_or_try_insert_with(arg_key([1.0]), || Err("no root"));
        assert!(failed.is_err());
        assert!(memo.is_empty());

        let ok: Result<f64, &str> = memo.get_or_try_insert_with(arg_key([1.0]), || Ok(2.0));
        assert_eq!(ok, Ok(2.0));
        assert_eq!(memo.len(), 1);
    }
}
