//! Host state-store boundary.
//!
//! The host environment owns a keyed registry of entity states: the bridge
//! reads identifier inputs from it and writes load destinations into it.
//! Persistence semantics of the host store are out of scope here.

use std::collections::HashMap;
use std::sync::RwLock;

/// Keyed string state exposed by the host environment.
///
/// `get` returns `None` when the key does not exist at all, which is distinct
/// from an existing key holding an empty value.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
}

/// In-memory state store for embedding and tests.
pub struct InMemoryStateStore {
    states: RwLock<HashMap<String, String>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore for InMemoryStateStore {
    fn get(&self, key: &str) -> Option<String> {
        self.states.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.states.write().unwrap().insert(key.to_string(), value);
    }
}
