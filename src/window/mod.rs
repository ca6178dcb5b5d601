//! Sliding-window frequency counter.
//!
//! Maps a key (`rule_name:source`) to a count of occurrences since the last
//! window boundary. `increment` returns the post-increment value; a
//! background ticker owned by the analyzer clears the whole map atomically
//! on each window boundary (`spec.md` §4.3). Counts are a local
//! approximation — they reset on restart and are not reconciled across
//! nodes.

use parking_lot::Mutex;
use std::collections::HashMap;

pub struct WindowCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl WindowCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Increment `key`'s count and return the new value.
    pub fn increment(&self, key: &str) -> u64 {
        let mut counts = self.counts.lock();
        let entry = counts.entry(key.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// Atomically reset every count to zero.
    pub fn reset(&self) {
        self.counts.lock().clear();
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> u64 {
        *self.counts.lock().get(key).unwrap_or(&0)
    }
}

impl Default for WindowCounter {
    fn default() -> Self {
        Self::new()
    }
}
