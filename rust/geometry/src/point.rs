// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planar points and decimal truncation

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of decimal digits kept by [`truncate`].
pub const DECIMALS: i32 = 6;

/// Truncate a value toward zero to [`DECIMALS`] decimal digits.
///
/// Negative zero is folded into positive zero so that truncated coordinates
/// can be compared and hashed by bit pattern.
#[inline]
pub fn truncate(value: f64) -> f64 {
    truncate_to(value, DECIMALS)
}

/// Truncate a value toward zero to `decimals` decimal digits.
#[inline]
pub fn truncate_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).trunc() / factor + 0.0
}

/// Round a value half away from zero to `decimals` decimal digits.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor + 0.0
}

/// A 2D point in the common planar, unit-scaled frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        nalgebra::distance(&self.to_nalgebra(), &other.to_nalgebra())
    }

    /// Both coordinates truncated to [`DECIMALS`] digits.
    pub fn truncated(&self) -> Self {
        Self::new(truncate(self.x), truncate(self.y))
    }

    pub fn rounded(&self, decimals: i32) -> Self {
        Self::new(round_to(self.x, decimals), round_to(self.y, decimals))
    }

    pub fn midpoint(&self, other: &Point2D) -> Self {
        Self::from_nalgebra(&nalgebra::center(&self.to_nalgebra(), &other.to_nalgebra()))
    }

    /// Lexicographic (x, then y) total order used to canonicalize segments.
    pub fn lexicographic_cmp(&self, other: &Point2D) -> Ordering {
        self.x
            .total_cmp(&other.x)
            .then_with(|| self.y.total_cmp(&other.y))
    }

    /// Exact identity key of this point, usable in hash maps and sets.
    pub fn key(&self) -> VertexKey {
        VertexKey((self.x + 0.0).to_bits(), (self.y + 0.0).to_bits())
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Identity of a vertex by exact coordinate bit pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey(u64, u64);

/// Euclidean distance between two points.
#[inline]
pub fn euclidean_distance(a: &Point2D, b: &Point2D) -> f64 {
    a.distance_to(b)
}
