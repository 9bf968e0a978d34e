use std::collections::HashSet;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Keys of actions currently running. A second trigger for a key that is
/// already held is refused until the first guard drops.
#[derive(Debug)]
pub struct InFlight<K: Eq + Hash> {
    active: Mutex<HashSet<K>>,
}

impl<K: Eq + Hash> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            active: Mutex::new(HashSet::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_begin(&self, key: K) -> Option<InFlightGuard<'_, K>> {
        let mut active = self.active.lock().expect("in-flight mutex poisoned");
        if !active.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard { owner: self, key })
    }

    pub fn is_active(&self, key: &K) -> bool {
        self.active
            .lock()
            .expect("in-flight mutex poisoned")
            .contains(key)
    }

    pub fn any(&self) -> bool {
        !self.active.lock().expect("in-flight mutex poisoned").is_empty()
    }
}

pub struct InFlightGuard<'a, K: Eq + Hash + Clone> {
    owner: &'a InFlight<K>,
    key: K,
}

impl<K: Eq + Hash + Clone> Drop for InFlightGuard<'_, K> {
    fn drop(&mut self) {
        if let Ok(mut active) = self.owner.active.lock() {
            active.remove(&self.key);
        }
    }
}

/// Monotonic ticket counter: only the most recently started run may commit.
#[derive(Debug, Default)]
pub struct Generation {
    latest: AtomicU64,
}

impl Generation {
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }

    /// Invalidates every outstanding ticket.
    pub fn bump(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_trigger_is_refused_until_guard_drops() {
        let flight: InFlight<i64> = InFlight::new();
        let guard = flight.try_begin(1).expect("first trigger");
        assert!(flight.try_begin(1).is_none());
        assert!(flight.try_begin(2).is_some());
        assert!(flight.is_active(&1));
        drop(guard);
        assert!(!flight.is_active(&1));
        assert!(!flight.any());
        assert!(flight.try_begin(1).is_some());
    }

    #[test]
    fn only_latest_ticket_is_current() {
        let gen = Generation::default();
        let first = gen.begin();
        let second = gen.begin();
        assert!(!gen.is_current(first));
        assert!(gen.is_current(second));
        gen.bump();
        assert!(!gen.is_current(second));
    }
}
