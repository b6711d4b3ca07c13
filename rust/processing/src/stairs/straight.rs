// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Straight single-run stairs

use super::frame::{without, StairFrame};
use super::{footprint_edges, whole_degrees, StairCommon, StairError};
use crowdplan_geometry::{compass_angle, intersect_unbounded, rotate_around, Point2D, Segment};
use serde::{Deserialize, Serialize};

/// A stair climbing straight from its lower gate to its upper gate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StraightSingleRunStair {
    #[serde(flatten)]
    pub common: StairCommon,
}

impl StraightSingleRunStair {
    fn frame(&self) -> &StairFrame {
        &self.common.frame
    }

    /// Foot of the run, from the left corner to the right corner.
    pub fn lower_gate(&self) -> Segment {
        let [a, b, _, _] = self.frame().corners();
        Segment::new(a, b)
    }

    /// Head of the run, from the left corner to the right corner.
    pub fn upper_gate(&self) -> Segment {
        let [_, _, c, d] = self.frame().corners();
        Segment::new(d, c)
    }

    /// Left and right side walls, bottom to top.
    pub fn side_walls(&self) -> [Segment; 2] {
        let [a, b, c, d] = self.frame().corners();
        [Segment::new(a, d), Segment::new(b, c)]
    }

    pub fn perimeter(&self) -> Vec<Segment> {
        let [left, right] = self.side_walls();
        vec![self.lower_gate(), right, self.upper_gate(), left]
    }

    pub fn lower_perimeter_walls(&self) -> Vec<Segment> {
        without(self.perimeter(), &self.lower_gate())
    }

    pub fn upper_perimeter_walls(&self) -> Vec<Segment> {
        without(self.perimeter(), &self.upper_gate())
    }
}

/// Derive the canonical frame of a straight stair from its footprint and run line.
///
/// The footprint edge crossed nearest the start of the run is the bottom gate;
/// its width is the stair width, and its left-hand corner, seen facing up-run,
/// is the origin.
pub(crate) fn straight_frame(
    footprint: &[Point2D; 4],
    run: &Segment,
) -> Result<StairFrame, StairError> {
    let bottom = footprint_edges(footprint)
        .into_iter()
        .filter_map(|edge| intersect_unbounded(run, &edge).map(|point| (edge, point)))
        .min_by(|(_, a), (_, b)| {
            a.distance_to(&run.start)
                .total_cmp(&b.distance_to(&run.start))
        });
    let (bottom_edge, crossing) = bottom.ok_or(StairError::NoGateIntersection)?;

    let rotation = whole_degrees(compass_angle(&run.start, &run.end));
    let vertex = left_corner(&bottom_edge, &crossing, rotation);

    Ok(StairFrame {
        vertex,
        rotation,
        staircase_width: bottom_edge.length(),
        run_length: run.length(),
    })
}

/// The corner of `edge` on the left of a walker facing `rotation`.
fn left_corner(edge: &Segment, pivot: &Point2D, rotation: i32) -> Point2D {
    let back = -f64::from(rotation);
    let start_x = rotate_around(pivot, &edge.start, back).x;
    let end_x = rotate_around(pivot, &edge.end, back).x;
    if start_x < end_x {
        edge.start
    } else {
        edge.end
    }
}
