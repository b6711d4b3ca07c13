// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Walls bounding stair voids on the storeys a stair passes through
//!
//! On its starting storey a stair owns its lower perimeter and lower gate; on
//! its arrival storey it owns its upper gate. Every storey above the start
//! gets walls around the stair's void: the whole perimeter on intermediate
//! storeys, the perimeter minus the upper gate on the arrival storey. Edges
//! owned by another stair at the same position, or already emitted, are
//! skipped so that interlocking stairs do not produce duplicate walls.

use crate::element::Wall;
use crate::stairs::Stair;
use crowdplan_geometry::{Segment, VertexKey};
use rustc_hash::FxHashSet;

pub const INTERMEDIATE_PREFIX: &str = "stairs-intermediate";
pub const UPPER_PREFIX: &str = "stairs-upper";

/// Direction-independent identity of an edge
type EdgeKey = (VertexKey, VertexKey);

fn edge_key(edge: &Segment) -> EdgeKey {
    let (a, b) = (edge.start.key(), edge.end.key());
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Border walls for storey `level` given every stair in the building.
pub fn border_walls_for_storey(level: usize, stairs: &[Stair]) -> Vec<Wall> {
    let mut taken: FxHashSet<EdgeKey> = FxHashSet::default();

    for stair in stairs.iter().filter(|s| s.start_level_index() == level) {
        taken.extend(stair.lower_perimeter_walls().iter().map(edge_key));
        taken.insert(edge_key(&stair.lower_gate()));
    }
    for stair in stairs.iter().filter(|s| s.end_level_index() == level) {
        taken.insert(edge_key(&stair.upper_gate()));
    }

    let mut walls = Vec::new();
    for stair in stairs.iter().filter(|s| s.voids_level(level)) {
        let (prefix, edges) = if level < stair.end_level_index() {
            (INTERMEDIATE_PREFIX, stair.intermediate_perimeter_walls())
        } else {
            (UPPER_PREFIX, stair.upper_perimeter_walls())
        };
        for edge in edges {
            if taken.insert(edge_key(&edge)) {
                walls.push(
                    Wall::new(edge.start, edge.end).named(format!("{prefix}:{}", stair.name())),
                );
            }
        }
    }

    tracing::debug!(level, walls = walls.len(), "Stair border walls");
    walls
}
