//! Per-entity guard against double submission of mutations.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of entity keys with a mutation currently outstanding.
#[derive(Debug, Default)]
pub struct InFlightRegistry {
    keys: Mutex<HashSet<String>>,
}

impl InFlightRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key` as in flight.
    ///
    /// Returns `None` when a mutation for `key` is already outstanding. The
    /// key is released when the returned ticket is dropped.
    pub fn try_acquire(&self, key: impl Into<String>) -> Option<InFlightTicket<'_>> {
        let owned = key.into();
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(owned.clone()) {
            return None;
        }
        Some(InFlightTicket {
            registry: self,
            key: owned,
        })
    }

    /// Returns `true` when `key` is currently in flight.
    #[must_use]
    pub fn is_in_flight(&self, key: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct InFlightTicket<'a> {
    registry: &'a InFlightRegistry,
    key: String,
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        self.registry
            .keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
