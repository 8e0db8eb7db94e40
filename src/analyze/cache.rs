//! Bounded least-recently-used map for scorer responses.
//!
//! Entries carry a monotonically increasing access tick; `order` indexes keys by
//! tick so the oldest entry is always the first one in the map.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    tick: u64,
    entries: HashMap<K, (V, u64)>,
    order: BTreeMap<u64, K>,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            tick: 0,
            entries: HashMap::with_capacity(capacity.min(1024)),
            order: BTreeMap::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up `key` and mark it as most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let next = self.next_tick();
        let (_, tick) = self.entries.get_mut(key)?;
        let old = std::mem::replace(tick, next);
        if let Some(k) = self.order.remove(&old) {
            self.order.insert(next, k);
        }
        self.entries.get(key).map(|(v, _)| v)
    }

    /// Look up `key` without touching its recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key).map(|(v, _)| v)
    }

    /// Insert or replace `key`, evicting the least recently used entry when full.
    /// Returns the evicted key, if any.
    pub fn insert(&mut self, key: K, value: V) -> Option<K> {
        if self.capacity == 0 {
            return None;
        }

        let next = self.next_tick();
        if let Some((_, old)) = self.entries.insert(key.clone(), (value, next)) {
            self.order.remove(&old);
            self.order.insert(next, key);
            return None;
        }
        self.order.insert(next, key);

        if self.entries.len() > self.capacity {
            if let Some((_, oldest)) = self.order.pop_first() {
                self.entries.remove(&oldest);
                return Some(oldest);
            }
        }
        None
    }

    fn next_tick(&mut self) -> u64 {
        self.tick = self.tick.wrapping_add(1);
        self.tick
    }
}
