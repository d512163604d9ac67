//! Name-keyed storage of services owned by one scope

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::service::AnyService;

/// Type-erased service map.
///
/// Keeps registration order so listings and shutdown are deterministic.
/// Policy (duplicate rejection, override teardown) lives in the façade; the
/// registry itself never refuses a [`Registry::set`].
#[derive(Default)]
pub(crate) struct Registry {
    inner: RwLock<Entries>,
}

#[derive(Default)]
struct Entries {
    services: HashMap<String, Arc<dyn AnyService>>,
    order: Vec<String>,
}

impl Entries {
    fn insert(&mut self, name: String, service: Arc<dyn AnyService>) -> Option<Arc<dyn AnyService>> {
        let previous = self.services.insert(name.clone(), service);
        if previous.is_none() {
            self.order.push(name);
        }
        previous
    }
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn exists(&self, name: &str) -> bool {
        self.inner.read().services.contains_key(name)
    }

    /// Insert or replace, returning the replaced service.
    pub(crate) fn set(&self, name: &str, service: Arc<dyn AnyService>) -> Option<Arc<dyn AnyService>> {
        self.inner.write().insert(name.to_string(), service)
    }

    /// Insert only when `name` is free. The check and the insert happen under
    /// one write lock, so two racing first registrations cannot both succeed.
    pub(crate) fn set_if_absent(&self, name: &str, service: Arc<dyn AnyService>) -> bool {
        let mut entries = self.inner.write();
        if entries.services.contains_key(name) {
            return false;
        }
        entries.insert(name.to_string(), service);
        true
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<Arc<dyn AnyService>> {
        self.inner.read().services.get(name).cloned()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.inner.read().order.clone()
    }

    /// Snapshot of all services in registration order.
    pub(crate) fn services(&self) -> Vec<Arc<dyn AnyService>> {
        let entries = self.inner.read();
        entries
            .order
            .iter()
            .filter_map(|name| entries.services.get(name).cloned())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.read().services.len()
    }
}
