// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Crowdplan Geometry
//!
//! Deterministic planar primitives for reducing building floor plans:
//! bounded and unbounded segment intersection with a fixed truncation
//! contract, distances, compass bearings and rotations.

pub mod angle;
pub mod intersect;
pub mod point;
pub mod segment;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use angle::{
    compass_angle, normalize_degrees, offset_along_bearing, rotate_around,
    smallest_angle_difference,
};
pub use intersect::{intersect_bounded, intersect_unbounded, SNAP_EPSILON};
pub use point::{
    euclidean_distance, round_to, truncate, truncate_to, Point2D, VertexKey, DECIMALS,
};
pub use segment::{Segment, BOUNDS_EPSILON};
