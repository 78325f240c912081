//! Keyed registry of resource cells.
//!
//! Holds at most one cell, and therefore at most one pending initialization,
//! per connection target. Cells created by the registry share one connector.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;

use crate::{
    cell::ResourceCell,
    config::ConnectTarget,
    core::{AcquireResult, Connect},
};

pub struct ResourceRegistry<C: Connect> {
    connector: Arc<C>,
    connect_timeout: Option<Duration>,
    cells: DashMap<String, Arc<ResourceCell<C>>>,
}

impl<C: Connect> ResourceRegistry<C> {
    pub fn new(connector: Arc<C>) -> Self {
        Self {
            connector,
            connect_timeout: None,
            cells: DashMap::new(),
        }
    }

    /// Apply `timeout` to every cell this registry creates.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Fetch or create the cell for `target`, then acquire through it.
    pub async fn acquire(&self, target: &ConnectTarget) -> AcquireResult<Arc<C::Resource>> {
        let cell = self.cell_for(target);
        cell.acquire().await
    }

    /// The cell for `target`, creating it if absent.
    pub fn cell_for(&self, target: &ConnectTarget) -> Arc<ResourceCell<C>> {
        // Clone out of the map guard; it must not be held across an await.
        self.cells
            .entry(target.as_str().to_string())
            .or_insert_with(|| {
                let mut cell = ResourceCell::new(Arc::clone(&self.connector), target.clone());
                if let Some(timeout) = self.connect_timeout {
                    cell = cell.with_connect_timeout(timeout);
                }
                Arc::new(cell)
            })
            .clone()
    }

    /// The cell for `target`, if one exists.
    pub fn cell(&self, target: &ConnectTarget) -> Option<Arc<ResourceCell<C>>> {
        self.cells
            .get(target.as_str())
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Reset the cell for `target`. Returns false when no cell exists.
    pub fn reset(&self, target: &ConnectTarget) -> bool {
        match self.cells.get(target.as_str()) {
            Some(entry) => {
                entry.value().reset();
                true
            }
            None => false,
        }
    }

    pub fn reset_all(&self) {
        for entry in self.cells.iter() {
            entry.value().reset();
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
