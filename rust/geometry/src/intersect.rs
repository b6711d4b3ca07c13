// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic line and segment intersection
//!
//! Both entry points canonicalize their inputs before computing anything:
//! each segment's endpoints are put in lexicographic order and then the two
//! segments themselves are ordered. Every computed coordinate is truncated to
//! [`DECIMALS`](crate::point::DECIMALS) digits. The result therefore does not
//! depend on argument order, down to the last bit, which is what keeps the
//! splitting worklist from chasing floating-point jitter.

use crate::point::{truncate, Point2D};
use crate::segment::{Segment, BOUNDS_EPSILON};
use std::cmp::Ordering;

/// Computed points this close to an input endpoint are replaced by it.
pub const SNAP_EPSILON: f64 = 1e-5;

/// Intersection of two finite segments.
///
/// Returns `None` when the segments are parallel (equal slope, including two
/// vertical segments), when either is degenerate, or when the intersection of
/// the supporting lines falls outside either segment's bounding range.
pub fn intersect_bounded(a: &Segment, b: &Segment) -> Option<Point2D> {
    let (first, second) = canonical_pair(a, b);
    let point = line_intersection(&first, &second)?;

    if first.bounds_contain(&point, BOUNDS_EPSILON) && second.bounds_contain(&point, BOUNDS_EPSILON)
    {
        Some(point)
    } else {
        None
    }
}

/// Intersection of the infinite lines through two segments.
///
/// Used for connection inference between walls that do not touch yet.
pub fn intersect_unbounded(a: &Segment, b: &Segment) -> Option<Point2D> {
    let (first, second) = canonical_pair(a, b);
    line_intersection(&first, &second)
}

/// Put both segments, and the pair, into a fixed order.
fn canonical_pair(a: &Segment, b: &Segment) -> (Segment, Segment) {
    let a = a.canonical();
    let b = b.canonical();
    if a.lexicographic_cmp(&b) == Ordering::Greater {
        (b, a)
    } else {
        (a, b)
    }
}

fn line_intersection(first: &Segment, second: &Segment) -> Option<Point2D> {
    if first.is_degenerate() || second.is_degenerate() {
        return None;
    }

    let (x, y) = match (first.slope_intercept(), second.slope_intercept()) {
        (Some((m1, b1)), Some((m2, b2))) => {
            if m1 == m2 {
                return None;
            }
            let x = truncate((b2 - b1) / (m1 - m2));
            // The shallower line keeps the truncation error of x out of y
            let (m, b) = if m1.abs() <= m2.abs() { (m1, b1) } else { (m2, b2) };
            (x, truncate(m * x + b))
        }
        // Vertical first segment
        (None, Some((m2, b2))) => {
            let x = truncate(first.start.x);
            (x, truncate(m2 * x + b2))
        }
        // Vertical second segment
        (Some((m1, b1)), None) => {
            let x = truncate(second.start.x);
            (x, truncate(m1 * x + b1))
        }
        (None, None) => return None,
    };

    if !x.is_finite() || !y.is_finite() {
        return None;
    }

    let point = Point2D::new(x, y);
    Some(snap_to_endpoints(point, first, second))
}

/// Replace `point` by the first input endpoint (in canonical order) within
/// [`SNAP_EPSILON`], so that touching segments report their shared vertex
/// exactly.
fn snap_to_endpoints(point: Point2D, first: &Segment, second: &Segment) -> Point2D {
    first
        .endpoints()
        .into_iter()
        .chain(second.endpoints())
        .find(|endpoint| endpoint.distance_to(&point) < SNAP_EPSILON)
        .unwrap_or(point)
}
