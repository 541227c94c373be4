// Filter registry
// Name -> filter lookup shared by reference, cleared on shutdown

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::RequestFilter;
use crate::logger;

/// Registry of named request filters
#[derive(Default)]
pub struct FilterRegistry {
    filters: RwLock<HashMap<String, Arc<dyn RequestFilter>>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter under `name`, replacing any previous one
    ///
    /// Returns false (and registers nothing) for an empty name.
    pub fn register(&self, name: &str, filter: Arc<dyn RequestFilter>) -> bool {
        if name.is_empty() {
            logger::log_warning("Ignoring filter registration with an empty name");
            return false;
        }
        self.filters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), filter);
        true
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn RequestFilter>> {
        self.filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.filters.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .filters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Resolve configured names in order; unknown names are logged and skipped
    pub fn chain<S: AsRef<str>>(&self, names: &[S]) -> Vec<Arc<dyn RequestFilter>> {
        let filters = self.filters.read().unwrap_or_else(PoisonError::into_inner);
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                let found = filters.get(name).cloned();
                if found.is_none() {
                    logger::log_warning(&format!("Unknown filter '{name}' in chain, skipping"));
                }
                found
            })
            .collect()
    }

    /// Drop every registered filter
    pub fn clear(&self) {
        self.filters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
