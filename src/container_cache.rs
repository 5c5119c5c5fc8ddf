//! Original heights of text containers.
//!
//! When bound text grows a container, the height the container had before
//! any text-driven growth is remembered here so that shrinking or unbinding
//! the text can restore it exactly. Entries are keyed by container id.

#[cfg(test)]
#[path = "container_cache_test.rs"]
mod container_cache_test;

use std::collections::HashMap;

use tracing::debug;

use crate::element::ElementId;

#[derive(Debug, Clone, Default)]
pub struct ContainerCache {
    heights: HashMap<ElementId, f64>,
}

impl ContainerCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `height` as the original height of `id`. Returns it.
    pub fn update(&mut self, id: ElementId, height: f64) -> f64 {
        self.heights.insert(id, height);
        height
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<f64> {
        self.heights.get(id).copied()
    }

    /// Forget the entry for `id`.
    pub fn reset(&mut self, id: &ElementId) {
        if self.heights.remove(id).is_some() {
            debug!(%id, "reset container height cache entry");
        }
    }

    pub fn clear(&mut self) {
        self.heights.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }
}
