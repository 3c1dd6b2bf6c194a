//! Per-pair gates so one process generates a given pair at most once at a time.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

type PairKey = (String, String);
type Gate = tokio::sync::Mutex<()>;

#[derive(Default)]
pub struct FlightTable {
    gates: Mutex<HashMap<PairKey, Weak<Gate>>>,
}

impl FlightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate shared by every caller currently holding a handle for `key`.
    pub fn gate(&self, key: PairKey) -> Arc<Gate> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(gate) = gates.get(&key).and_then(Weak::upgrade) {
            return gate;
        }
        gates.retain(|_, g| g.strong_count() > 0);
        let gate = Arc::new(Gate::new(()));
        gates.insert(key, Arc::downgrade(&gate));
        gate
    }

    /// Pairs with a live gate
    pub fn active(&self) -> usize {
        let gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        gates.values().filter(|g| g.strong_count() > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(a: &str, b: &str) -> PairKey {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn test_same_key_shares_gate() {
        let table = FlightTable::new();
        let a = table.gate(key("Fire", "Water"));
        let b = table.gate(key("Fire", "Water"));
        let c = table.gate(key("Earth", "Fire"));
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(table.active(), 2);
    }

    #[test]
    fn test_dropped_gates_expire() {
        let table = FlightTable::new();
        drop(table.gate(key("Fire", "Water")));
        assert_eq!(table.active(), 0);
    }
}
