//! Name-keyed table of catalog and execution backends
//!
//! Built once by the application and passed to whoever needs a backend.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::executor::Executor;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

#[derive(Default)]
pub struct Registry {
    catalogs: HashMap<String, Arc<dyn Catalog>>,
    executors: HashMap<String, Arc<dyn Executor>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a catalog under its id, returning any catalog it replaced
    pub fn register_catalog(&mut self, catalog: Arc<dyn Catalog>) -> Option<Arc<dyn Catalog>> {
        self.catalogs.insert(catalog.id().to_string(), catalog)
    }

    /// Register an executor under its id, returning any executor it replaced
    pub fn register_executor(&mut self, executor: Arc<dyn Executor>) -> Option<Arc<dyn Executor>> {
        self.executors.insert(executor.id().to_string(), executor)
    }

    pub fn catalog(&self, id: &str) -> Result<Arc<dyn Catalog>> {
        self.catalogs
            .get(id)
            .cloned()
            .ok_or_else(|| Error::validation(format!("unknown catalog: {}", id)))
    }

    pub fn executor(&self, id: &str) -> Result<Arc<dyn Executor>> {
        self.executors
            .get(id)
            .cloned()
            .ok_or_else(|| Error::validation(format!("unknown executor: {}", id)))
    }

    pub fn catalog_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.catalogs.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn executor_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.executors.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("catalogs", &self.catalog_ids())
            .field("executors", &self.executor_ids())
            .finish()
    }
}
