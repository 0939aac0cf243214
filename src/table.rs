//! Time-expiring key/value table
//!
//! Backs the ARP cache and the ARP pending store. Entries carry the instant
//! they were last written and age out lazily: an entry older than the table's
//! TTL is evicted the next time it is looked up, removed or iterated. There is
//! no background timer; [`ExpiringMap::sweep`] exists for hosts that want to
//! reclaim memory without waiting for an access.

use std::cell::Cell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of the current time
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Monotonic wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same underlying instant, so a test can keep one handle and
/// advance the clock a stack is using.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Instant) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    updated: Instant,
}

/// Map whose entries expire `ttl` after their last write.
///
/// A zero `ttl` disables expiry.
#[derive(Debug)]
pub struct ExpiringMap<K, V> {
    entries: HashMap<K, Entry<V>>,
    ttl: Duration,
}

impl<K: Eq + Hash + Copy, V> ExpiringMap<K, V> {
    pub fn new(ttl: Duration) -> Self {
        ExpiringMap {
            entries: HashMap::new(),
            ttl,
        }
    }

    fn is_expired(&self, updated: Instant, now: Instant) -> bool {
        !self.ttl.is_zero() && now.saturating_duration_since(updated) > self.ttl
    }

    /// Drop `key` if its entry has aged out
    fn evict_if_expired(&mut self, key: &K, now: Instant) {
        let expired = match self.entries.get(key) {
            Some(entry) => self.is_expired(entry.updated, now),
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
    }

    /// Insert or overwrite, restarting the entry's lifetime
    pub fn insert(&mut self, key: K, value: V, now: Instant) {
        self.entries.insert(key, Entry { value, updated: now });
    }

    pub fn get(&mut self, key: &K, now: Instant) -> Option<&V> {
        self.evict_if_expired(key, now);
        self.entries.get(key).map(|entry| &entry.value)
    }

    pub fn contains(&mut self, key: &K, now: Instant) -> bool {
        self.get(key, now).is_some()
    }

    /// Remove and return a live entry; an expired one is discarded
    pub fn remove(&mut self, key: &K, now: Instant) -> Option<V> {
        self.evict_if_expired(key, now);
        self.entries.remove(key).map(|entry| entry.value)
    }

    /// Evict every expired entry, returning how many were dropped
    pub fn sweep(&mut self, now: Instant) -> usize {
        if self.ttl.is_zero() {
            return 0;
        }
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.updated) <= ttl);
        before - self.entries.len()
    }

    /// Live entries as `(key, value, last update)`
    pub fn iter(&mut self, now: Instant) -> impl Iterator<Item = (&K, &V, Instant)> {
        self.sweep(now);
        self.entries
            .iter()
            .map(|(key, entry)| (key, &entry.value, entry.updated))
    }

    /// Entry count, including expired entries not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
