//! Session-scoped holder for the currently active normalized table.
//!
//! An explicit context object rather than ambient global state, so multiple
//! datasets can coexist and tests run in isolation. The table is set once
//! per load, shared immutably, and replaced wholesale by the next load.

use std::sync::Arc;

use tracing::info;

use crate::model::Trip;

#[derive(Debug, Default, Clone)]
pub struct Session {
    dataset: Option<Arc<Vec<Trip>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a freshly normalized table as the active dataset, replacing
    /// any previous one, and hands back a shared reference to it.
    pub fn load(&mut self, trips: Vec<Trip>) -> Arc<Vec<Trip>> {
        info!(rows = trips.len(), "dataset loaded into session");
        let dataset = Arc::new(trips);
        self.dataset = Some(Arc::clone(&dataset));
        dataset
    }

    /// The active dataset, if one has been loaded.
    pub fn trips(&self) -> Option<Arc<Vec<Trip>>> {
        self.dataset.clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Discards the active dataset.
    pub fn clear(&mut self) {
        self.dataset = None;
    }
}
