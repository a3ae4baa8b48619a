use crate::engines::generation::GenotypeKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: usize,
}

struct CacheEntry {
    fitness: f64,
    last_used: u64,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<GenotypeKey, CacheEntry>,
    // tick -> key, oldest first
    recency: BTreeMap<u64, GenotypeKey>,
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheInner {
    fn touch(&mut self, key: &GenotypeKey) {
        self.tick += 1;
        let tick = self.tick;
        if let Some(entry) = self.entries.get_mut(key) {
            self.recency.remove(&entry.last_used);
            entry.last_used = tick;
            self.recency.insert(tick, key.clone());
        }
    }

    fn evict_oldest(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            self.entries.remove(&key);
            self.evictions += 1;
            log::debug!("Evicted fitness of {}", key);
        }
    }
}

/// Fitness per structure, keyed by the order-independent genotype key.
/// With a capacity the least recently used entry is evicted first.
pub struct FitnessCache {
    inner: Mutex<CacheInner>,
    capacity: Option<usize>,
}

impl FitnessCache {
    pub fn new() -> Self {
        Self::with_capacity(None)
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            capacity,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Look up a fitness, counting the hit or miss
    pub fn get(&self, key: &GenotypeKey) -> Option<f64> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let found = inner.entries.get(key).map(|e| e.fitness);
        match found {
            Some(_) => {
                inner.hits += 1;
                inner.touch(key);
            }
            None => inner.misses += 1,
        }
        found
    }

    pub fn contains(&self, key: &GenotypeKey) -> bool {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.contains_key(key)
    }

    pub fn insert(&self, key: GenotypeKey, fitness: f64) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(entry) = inner.entries.get_mut(&key) {
            entry.fitness = fitness;
            inner.touch(&key);
            return;
        }

        if let Some(capacity) = self.capacity {
            while inner.entries.len() >= capacity && !inner.entries.is_empty() {
                inner.evict_oldest();
            }
        }

        inner.tick += 1;
        let tick = inner.tick;
        inner.recency.insert(tick, key.clone());
        inner.entries.insert(
            key,
            CacheEntry {
                fitness,
                last_used: tick,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.entries.clear();
        inner.recency.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            evictions: inner.evictions,
            entries: inner.entries.len(),
        }
    }
}

impl Default for FitnessCache {
    fn default() -> Self {
        Self::new()
    }
}
