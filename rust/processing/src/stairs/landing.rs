// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Double-run stairs turning at a landing
//!
//! The frame's origin is the pivot corner at the landing end, and its rotation
//! faces back down the first flight. Corners 0 and 1 bound the landing; the
//! far edge, between corners 3 and 2, holds both the foot of the first flight
//! and the head of the second, one on each side of its midpoint.

use super::frame::{without, StairFrame};
use super::{footprint_edges, whole_degrees, StairCommon, StairError};
use crowdplan_geometry::{compass_angle, intersect_unbounded, Point2D, Segment};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction of the turn at the landing, seen from above
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Turn {
    Clockwise,
    CounterClockwise,
}

impl Turn {
    /// Turn given the signed angle from the first flight to the resultant run.
    pub fn from_angle_difference(difference: f64) -> Self {
        if difference >= 0.0 {
            Turn::Clockwise
        } else {
            Turn::CounterClockwise
        }
    }
}

/// A stair with two antiparallel flights joined by a landing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoubleRunStairWithLanding {
    #[serde(flatten)]
    pub common: StairCommon,
    pub turn: Turn,
}

impl DoubleRunStairWithLanding {
    fn far_halves(&self) -> (Segment, Segment) {
        let [_, _, p2, p3] = self.common.frame.corners();
        let middle = self.common.frame.far_midpoint();
        (Segment::new(p3, middle), Segment::new(middle, p2))
    }

    /// Foot of the first flight.
    pub fn lower_gate(&self) -> Segment {
        let (near_p3, near_p2) = self.far_halves();
        match self.turn {
            Turn::Clockwise => near_p2,
            Turn::CounterClockwise => near_p3,
        }
    }

    /// Head of the second flight.
    pub fn upper_gate(&self) -> Segment {
        let (near_p3, near_p2) = self.far_halves();
        match self.turn {
            Turn::Clockwise => near_p3,
            Turn::CounterClockwise => near_p2,
        }
    }

    /// The edge behind the landing.
    pub fn landing_edge(&self) -> Segment {
        let [p0, p1, _, _] = self.common.frame.corners();
        Segment::new(p0, p1)
    }

    pub fn side_walls(&self) -> [Segment; 2] {
        let [p0, p1, p2, p3] = self.common.frame.corners();
        [Segment::new(p1, p2), Segment::new(p3, p0)]
    }

    pub fn perimeter(&self) -> Vec<Segment> {
        let [first_side, second_side] = self.side_walls();
        let (near_p3, near_p2) = self.far_halves();
        vec![
            self.landing_edge(),
            first_side,
            near_p2,
            near_p3,
            second_side,
        ]
    }

    pub fn lower_perimeter_walls(&self) -> Vec<Segment> {
        without(self.perimeter(), &self.lower_gate())
    }

    pub fn upper_perimeter_walls(&self) -> Vec<Segment> {
        without(self.perimeter(), &self.upper_gate())
    }
}

/// Derive the frame of a landing stair from its footprint and first flight.
///
/// The footprint edge whose crossing with the first flight's line lies nearest
/// the flight's end is the landing edge. The pivot is its corner farther from
/// the crossing when the stair turns clockwise and the nearer one otherwise.
/// The stair width is the landing edge length; the run length is the length
/// of the edge whose crossing lies farthest away, which is a side wall.
pub(crate) fn landing_frame(
    footprint: &[Point2D; 4],
    first_flight: &Segment,
    turn: Turn,
) -> Result<StairFrame, StairError> {
    let crossings: Vec<(Segment, Option<Point2D>, f64)> = footprint_edges(footprint)
        .into_iter()
        .map(|edge| {
            let crossing = intersect_unbounded(&edge, first_flight);
            let distance = crossing.map_or(f64::INFINITY, |point| {
                point.distance_to(&first_flight.end)
            });
            (edge, crossing, distance)
        })
        .collect();

    let (landing_edge, crossing, _) = crossings
        .iter()
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .ok_or(StairError::NoGateIntersection)?;
    let crossing = crossing.ok_or(StairError::NoGateIntersection)?;

    // First of the farthest edges
    let (side_wall, _, _) = crossings
        .iter()
        .min_by(|a, b| b.2.total_cmp(&a.2))
        .ok_or(StairError::NoGateIntersection)?;

    // Ties keep the edge start
    let order = landing_edge
        .end
        .distance_to(&crossing)
        .total_cmp(&landing_edge.start.distance_to(&crossing));
    let vertex = match (turn, order) {
        (Turn::Clockwise, Ordering::Greater) | (Turn::CounterClockwise, Ordering::Less) => {
            landing_edge.end
        }
        _ => landing_edge.start,
    };

    let first_angle = whole_degrees(compass_angle(&first_flight.start, &first_flight.end));

    Ok(StairFrame {
        vertex,
        rotation: (first_angle + 180).rem_euclid(360),
        staircase_width: landing_edge.length(),
        run_length: side_wall.length(),
    })
}
