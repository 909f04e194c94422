//! Bounded key/value cache with least-recently-used eviction

use std::collections::VecDeque;
use std::hash::Hash;

use ahash::AHashMap;

/// Map with an optional capacity. When full, inserting a new key evicts the
/// least recently used entry. `None` capacity means unbounded retention.
pub struct BoundedCache<K, V> {
    entries: AHashMap<K, V>,
    /// LRU tracking, oldest first
    access_order: VecDeque<K>,
    capacity: Option<usize>,
}

impl<K: Eq + Hash + Clone, V: Clone> BoundedCache<K, V> {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: AHashMap::new(),
            access_order: VecDeque::new(),
            capacity: capacity.map(|c| c.max(1)),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Get a value and mark it as most recently used
    pub fn get(&mut self, key: &K) -> Option<V> {
        let value = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(value)
    }

    /// Get a value without affecting eviction order
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or overwrite a value. Returns the key evicted to make room, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<K> {
        let mut evicted = None;
        if !self.entries.contains_key(&key) {
            if let Some(capacity) = self.capacity {
                if self.entries.len() >= capacity {
                    if let Some(oldest) = self.access_order.pop_front() {
                        self.entries.remove(&oldest);
                        evicted = Some(oldest);
                    }
                }
            }
        }
        self.entries.insert(key.clone(), value);
        self.touch(&key);
        evicted
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.access_order.retain(|k| k != key);
        self.entries.remove(key)
    }

    /// Keys from least to most recently used
    pub fn keys(&self) -> Vec<K> {
        self.access_order.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
    }

    fn touch(&mut self, key: &K) {
        self.access_order.retain(|k| k != key);
        self.access_order.push_back(key.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = BoundedCache::new(Some(2));
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get(&"a"), Some(1));

        let evicted = cache.insert("c", 3);
        assert_eq!(evicted, Some("b"));
        assert!(cache.contains(&"a"));
        assert!(cache.contains(&"c"));
        assert_eq!(cache.keys(), vec!["a", "c"]);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let mut cache = BoundedCache::new(Some(1));
        cache.insert("a", 1);
        assert_eq!(cache.insert("a", 2), None);
        assert_eq!(cache.peek(&"a"), Some(&2));
    }

    #[test]
    fn test_unbounded() {
        let mut cache = BoundedCache::unbounded();
        for i in 0..100 {
            cache.insert(i, i * 2);
        }
        assert_eq!(cache.len(), 100);
        cache.clear();
        assert!(cache.is_empty());
    }
}
