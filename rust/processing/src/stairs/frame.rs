// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Canonical stair placement
//!
//! A stair is stored as an origin vertex, an integer compass rotation and two
//! lengths. Every edge handed to callers is recomputed from these four values,
//! so two stairs sharing a corner produce bit-identical vertices.

use crowdplan_geometry::{offset_along_bearing, Point2D, Segment, DECIMALS};
use serde::{Deserialize, Serialize};

/// Origin, rotation and extent of a rectangular stair footprint
///
/// In the local frame `+y` runs along `rotation` and `+x` to its right. The
/// corners are `(0, 0)`, `(width, 0)`, `(width, length)` and `(0, length)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StairFrame {
    pub vertex: Point2D,
    /// Compass bearing in whole degrees, `[0, 360)`
    pub rotation: i32,
    pub staircase_width: f64,
    pub run_length: f64,
}

impl StairFrame {
    /// The four corners in local order, rounded for stable identity.
    pub fn corners(&self) -> [Point2D; 4] {
        [
            self.vertex.rounded(DECIMALS),
            self.corner(self.staircase_width, 0.0),
            self.corner(self.staircase_width, self.run_length),
            self.corner(0.0, self.run_length),
        ]
    }

    /// Midpoint of the far edge, between corners 3 and 2.
    pub fn far_midpoint(&self) -> Point2D {
        self.corner(self.staircase_width / 2.0, self.run_length)
    }

    fn corner(&self, local_x: f64, local_y: f64) -> Point2D {
        offset_along_bearing(&self.vertex, f64::from(self.rotation), local_x, local_y)
            .rounded(DECIMALS)
    }
}

/// Whether two edges join the same pair of vertices, in either direction.
pub(crate) fn same_edge(a: &Segment, b: &Segment) -> bool {
    a.canonical() == b.canonical()
}

/// `edges` without any edge equal to `excluded`.
pub(crate) fn without(edges: Vec<Segment>, excluded: &Segment) -> Vec<Segment> {
    edges
        .into_iter()
        .filter(|edge| !same_edge(edge, excluded))
        .collect()
}
