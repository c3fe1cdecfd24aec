// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::cursor::Generation;

// ---------------------------------------------------------------------------
// BindingId
// ---------------------------------------------------------------------------

/// Identity of a live binding inside one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BindingId(u64);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// BindingRegistry
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct RegistryState {
    next_id: u64,
    live: BTreeMap<BindingId, String>,
    generation: Generation,
}

/// Set of live bindings owned by a row cursor.
///
/// Cloning yields another handle to the same set. Bindings hold a weak
/// [`Registration`], so dropping every handle is how a cursor "goes away".
#[derive(Debug, Clone, Default)]
pub struct BindingRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding reading `path`.
    pub fn register(&self, path: &str) -> Registration {
        let mut state = self.state.lock();
        let id = BindingId(state.next_id);
        state.next_id += 1;
        state.live.insert(id, path.to_string());
        Registration {
            id,
            registry: Arc::downgrade(&self.state),
        }
    }

    /// Remove a binding. Returns false if it was not registered.
    pub fn deregister(&self, id: BindingId) -> bool {
        self.state.lock().live.remove(&id).is_some()
    }

    pub fn is_registered(&self, id: BindingId) -> bool {
        self.state.lock().live.contains_key(&id)
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().live.is_empty()
    }

    /// Column paths of the live bindings, in registration order.
    pub fn paths(&self) -> Vec<String> {
        self.state.lock().live.values().cloned().collect()
    }

    /// Current dataset generation.
    pub fn generation(&self) -> Generation {
        self.state.lock().generation
    }

    /// Announce a dataset switch. Every live binding observes `generation`
    /// before its next read; returns how many bindings were notified.
    pub fn notify_switch(&self, generation: Generation) -> usize {
        let mut state = self.state.lock();
        state.generation = generation;
        let notified = state.live.len();
        tracing::debug!(
            "dataset switch to generation {}: {} live bindings invalidated",
            generation.0,
            notified
        );
        notified
    }

    /// True if `registration` was issued by this registry.
    pub fn owns(&self, registration: &Registration) -> bool {
        std::ptr::eq(Arc::as_ptr(&self.state), registration.registry.as_ptr())
    }
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// A binding's membership in a [`BindingRegistry`].
///
/// Deregisters on drop. Deregistration is idempotent and safe after the
/// registry itself is gone.
#[derive(Debug)]
pub struct Registration {
    id: BindingId,
    registry: Weak<Mutex<RegistryState>>,
}

impl Registration {
    pub fn id(&self) -> BindingId {
        self.id
    }

    /// Upgrade to the owning registry, if it still exists.
    pub fn registry(&self) -> Option<BindingRegistry> {
        self.registry
            .upgrade()
            .map(|state| BindingRegistry { state })
    }

    /// True while both the registry and this entry are alive.
    pub fn is_attached(&self) -> bool {
        self.registry()
            .map(|registry| registry.is_registered(self.id))
            .unwrap_or(false)
    }

    /// Leave the registry. Returns true only on the call that removed the
    /// entry.
    pub fn deregister(&mut self) -> bool {
        let registry = std::mem::take(&mut self.registry);
        match registry.upgrade() {
            Some(state) => state.lock().live.remove(&self.id).is_some(),
            None => false,
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.deregister();
    }
}
