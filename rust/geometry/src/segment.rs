// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Finite line segments

use crate::point::Point2D;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Tolerance used for bounding-range checks on truncated coordinates
pub const BOUNDS_EPSILON: f64 = 1e-5;

/// A finite segment between two planar points
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start: Point2D,
    pub end: Point2D,
}

impl Segment {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// A segment whose endpoints coincide has no direction.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    pub fn reversed(&self) -> Self {
        Self::new(self.end, self.start)
    }

    pub fn midpoint(&self) -> Point2D {
        self.start.midpoint(&self.end)
    }

    pub fn endpoints(&self) -> [Point2D; 2] {
        [self.start, self.end]
    }

    /// Same segment with its endpoints in lexicographic order.
    pub fn canonical(&self) -> Self {
        if self.start.lexicographic_cmp(&self.end) == Ordering::Greater {
            self.reversed()
        } else {
            *self
        }
    }

    /// Lexicographic order on (start, end).
    pub fn lexicographic_cmp(&self, other: &Segment) -> Ordering {
        self.start
            .lexicographic_cmp(&other.start)
            .then_with(|| self.end.lexicographic_cmp(&other.end))
    }

    /// Slope and y-intercept, or `None` for a vertical segment.
    pub fn slope_intercept(&self) -> Option<(f64, f64)> {
        let dx = self.end.x - self.start.x;
        if dx == 0.0 {
            return None;
        }
        let slope = (self.end.y - self.start.y) / dx;
        Some((slope, self.start.y - slope * self.start.x))
    }

    /// Axis-aligned bounds as `(min, max)` corners.
    pub fn bounds(&self) -> (Point2D, Point2D) {
        (
            Point2D::new(self.start.x.min(self.end.x), self.start.y.min(self.end.y)),
            Point2D::new(self.start.x.max(self.end.x), self.start.y.max(self.end.y)),
        )
    }

    /// Whether `point` lies within this segment's axis-aligned bounding range.
    pub fn bounds_contain(&self, point: &Point2D, epsilon: f64) -> bool {
        let (min, max) = self.bounds();
        point.x >= min.x - epsilon
            && point.x <= max.x + epsilon
            && point.y >= min.y - epsilon
            && point.y <= max.y + epsilon
    }

    /// Whether `other`'s bounding box fits inside this segment's bounding box.
    pub fn bounds_contain_segment(&self, other: &Segment, epsilon: f64) -> bool {
        self.bounds_contain(&other.start, epsilon) && self.bounds_contain(&other.end, epsilon)
    }

    /// The endpoint closest to `point`; ties go to `start`.
    pub fn nearest_endpoint(&self, point: &Point2D) -> Point2D {
        if self.start.distance_to(point) <= self.end.distance_to(point) {
            self.start
        } else {
            self.end
        }
    }

    /// Projection parameter of `point` along this segment (0 at start, 1 at end).
    pub fn project(&self, point: &Point2D) -> f64 {
        let dir = self.end.to_nalgebra() - self.start.to_nalgebra();
        let length_sq = dir.norm_squared();
        if length_sq < 1e-20 {
            return 0.0;
        }
        (point.to_nalgebra() - self.start.to_nalgebra()).dot(&dir) / length_sq
    }

    /// Perpendicular distance from `point` to this segment (clamped to its ends).
    pub fn distance_to_point(&self, point: &Point2D) -> f64 {
        let t = self.project(point).clamp(0.0, 1.0);
        let foot = self.start.to_nalgebra() + (self.end.to_nalgebra() - self.start.to_nalgebra()) * t;
        nalgebra::distance(&foot, &point.to_nalgebra())
    }
}

impl From<(Point2D, Point2D)> for Segment {
    fn from((start, end): (Point2D, Point2D)) -> Self {
        Self::new(start, end)
    }
}

impl From<((f64, f64), (f64, f64))> for Segment {
    fn from((start, end): ((f64, f64), (f64, f64))) -> Self {
        Self::new(start.into(), end.into())
    }
}
