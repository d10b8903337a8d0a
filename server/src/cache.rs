//! Least-recently-used cache.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

#[derive(Debug)]
struct Slot<V> {
    value: V,
    stamp: u64,
}

/// A bounded key-value cache that evicts the least recently used entry.
///
/// Both [`get`](Self::get) and [`insert`](Self::insert) count as a use.
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    entries: HashMap<K, Slot<V>>,
    /// Use stamp to key, oldest first.
    order: BTreeMap<u64, K>,
    clock: u64,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Creates an empty cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            order: BTreeMap::new(),
            clock: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Looks up `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.touch(key)?;
        self.entries.get(key).map(|slot| &slot.value)
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.touch(key)?;
        self.entries.get_mut(key).map(|slot| &mut slot.value)
    }

    /// Inserts or replaces `key` as the most recently used entry.
    ///
    /// Returns the entry evicted to stay within capacity. With a capacity of
    /// zero that is the entry just inserted.
    pub fn insert(&mut self, key: K, value: V) -> Option<(K, V)> {
        let stamp = self.tick();
        if let Some(slot) = self.entries.get_mut(&key) {
            self.order.remove(&slot.stamp);
            slot.value = value;
            slot.stamp = stamp;
            self.order.insert(stamp, key);
            return None;
        }

        self.order.insert(stamp, key.clone());
        self.entries.insert(key, Slot { value, stamp });
        if self.entries.len() > self.capacity {
            return self.evict_oldest();
        }
        None
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.entries.remove(key)?;
        self.order.remove(&slot.stamp);
        Some(slot.value)
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> + '_ {
        self.order.values().rev().filter_map(|key| {
            self.entries.get(key).map(|slot| (key, &slot.value))
        })
    }

    fn touch(&mut self, key: &K) -> Option<()> {
        let stamp = self.tick();
        let slot = self.entries.get_mut(key)?;
        let owned = self.order.remove(&slot.stamp)?;
        slot.stamp = stamp;
        self.order.insert(stamp, owned);
        Some(())
    }

    fn evict_oldest(&mut self) -> Option<(K, V)> {
        let (_, key) = self.order.pop_first()?;
        let slot = self.entries.remove(&key)?;
        Some((key, slot.value))
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache = LruCache::new(2);
        assert!(cache.is_empty());
        assert_eq!(cache.insert("a", 1), None);
        assert_eq!(cache.insert("b", 2), None);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a"), Some(&1));
        assert_eq!(cache.get(&"missing"), None);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        // "a" becomes most recent, so "b" goes.
        cache.get(&"a");
        assert_eq!(cache.insert("c", 3), Some(("b", 2)));
        assert!(cache.contains_key(&"a"));
        assert!(cache.contains_key(&"c"));
        assert_eq!(cache.len(), cache.capacity());
    }

    #[test]
    fn test_replace_promotes_without_eviction() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.insert("a", 10), None);
        assert_eq!(cache.insert("c", 3), Some(("b", 2)));
        assert_eq!(cache.get(&"a"), Some(&10));
    }

    #[test]
    fn test_get_mut_and_remove() {
        let mut cache = LruCache::new(4);
        cache.insert(1u32, vec![1]);
        cache.get_mut(&1).unwrap().push(2);
        assert_eq!(cache.remove(&1), Some(vec![1, 2]));
        assert_eq!(cache.remove(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity() {
        let mut cache = LruCache::new(0);
        assert_eq!(cache.insert("a", 1), Some(("a", 1)));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_iter_order() {
        let mut cache = LruCache::new(3);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        cache.get(&"a");
        let keys: Vec<_> = cache.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["a", "c", "b"]);
    }
}
