/// Bounded memo for repeated store lookups
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::Arc;

pub struct LookupCache<K, V>
where
    K: Eq + Hash,
{
    cache: Arc<DashMap<K, V>>,
    max_size: usize,
}

impl<K, V> LookupCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: Arc::new(DashMap::new()),
            max_size,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.cache.get(key).map(|entry| entry.clone())
    }

    /// Entries past `max_size` are not retained
    pub fn insert(&self, key: K, value: V) {
        if self.cache.len() < self.max_size || self.cache.contains_key(&key) {
            self.cache.insert(key, value);
        }
    }

    /// Cached value for `key`, computing and storing it on a miss.
    /// Errors from `compute` are returned and nothing is cached.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl<K, V> Clone for LookupCache<K, V>
where
    K: Eq + Hash,
{
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            max_size: self.max_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_cache_insert_and_retrieve() {
        let cache: LookupCache<String, Vec<u32>> = LookupCache::new(100);
        cache.insert("homo".to_string(), vec![1, 2]);

        assert_eq!(cache.get(&"homo".to_string()), Some(vec![1, 2]));
        assert!(cache.get(&"pan".to_string()).is_none());
    }

    #[test]
    fn test_cache_size_limit() {
        let cache: LookupCache<u32, u32> = LookupCache::new(2);
        cache.insert(1, 1);
        cache.insert(2, 2);
        cache.insert(3, 3);
        assert_eq!(cache.len(), 2);

        // Existing keys can still be refreshed at capacity
        cache.insert(2, 20);
        assert_eq!(cache.get(&2), Some(20));
    }

    #[test]
    fn test_compute_runs_once() {
        let cache: LookupCache<&str, usize> = LookupCache::new(10);
        let calls = Cell::new(0);
        let compute = || -> Result<usize, ()> {
            calls.set(calls.get() + 1);
            Ok(7)
        };

        assert_eq!(cache.get_or_try_insert_with("aotus", compute), Ok(7));
        assert_eq!(cache.get_or_try_insert_with("aotus", compute), Ok(7));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_failed_compute_is_not_cached() {
        let cache: LookupCache<&str, usize> = LookupCache::new(10);
        let result: Result<usize, &str> = cache.get_or_try_insert_with("x", || Err("boom"));
        assert_eq!(result, Err("boom"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_concurrent_access() {
        use std::thread;

        let cache: Arc<LookupCache<u32, u32>> = Arc::new(LookupCache::new(1000));
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || cache.insert(i, i * 2))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for i in 0..10 {
            assert_eq!(cache.get(&i), Some(i * 2));
        }
    }

    #[test]
    fn test_clear() {
        let cache: LookupCache<u32, u32> = LookupCache::new(10);
        cache.insert(1, 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
