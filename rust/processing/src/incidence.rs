// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vertex incidence counting by exact coordinate identity.

use crate::element::BuildingElement;
use crowdplan_geometry::{Point2D, VertexKey};
use rustc_hash::FxHashMap;

/// How many element endpoints sit on each distinct vertex
#[derive(Debug, Clone, Default)]
pub struct Incidence {
    counts: FxHashMap<VertexKey, usize>,
}

impl Incidence {
    pub fn from_elements<'a>(elements: impl IntoIterator<Item = &'a BuildingElement>) -> Self {
        let mut incidence = Self::default();
        for element in elements {
            incidence.add(&element.start());
            incidence.add(&element.end());
        }
        incidence
    }

    pub fn count(&self, vertex: &Point2D) -> usize {
        self.counts.get(&vertex.key()).copied().unwrap_or(0)
    }

    pub fn add(&mut self, vertex: &Point2D) {
        *self.counts.entry(vertex.key()).or_insert(0) += 1;
    }

    pub fn remove(&mut self, vertex: &Point2D) {
        let key = vertex.key();
        if let Some(count) = self.counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&key);
            }
        }
    }

    /// Record that one endpoint moved from `from` to `to`.
    pub fn relocate(&mut self, from: &Point2D, to: &Point2D) {
        self.remove(from);
        self.add(to);
    }
}
