// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compass angles and rotations
//!
//! Angles are compass bearings in degrees: 0° points north (+y) and angles
//! grow clockwise, so 90° points east (+x).

use crate::point::Point2D;
use nalgebra::{Rotation2, Vector2};

/// Bearing of the direction `from -> to`, normalized to `[0, 360)`.
pub fn compass_angle(from: &Point2D, to: &Point2D) -> f64 {
    let degrees = (to.x - from.x).atan2(to.y - from.y).to_degrees();
    normalize_degrees(degrees)
}

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Signed smallest rotation taking bearing `from` to bearing `to`, in `[-180, 180)`.
///
/// Positive values are clockwise.
pub fn smallest_angle_difference(from: f64, to: f64) -> f64 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Rotate `point` clockwise by `degrees` around `origin`.
pub fn rotate_around(origin: &Point2D, point: &Point2D, degrees: f64) -> Point2D {
    // nalgebra rotations are counter-clockwise
    let rotation = Rotation2::new(-degrees.to_radians());
    let offset = point.to_nalgebra() - origin.to_nalgebra();
    Point2D::from_nalgebra(&(origin.to_nalgebra() + rotation * offset))
}

/// Place a local offset relative to `origin` in a frame facing `bearing`.
///
/// Local `+y` points along the bearing and local `+x` to its right, so
/// `(0, 1)` with bearing 90° lands one unit east of the origin.
pub fn offset_along_bearing(origin: &Point2D, bearing: f64, local_x: f64, local_y: f64) -> Point2D {
    let local = origin.to_nalgebra() + Vector2::new(local_x, local_y);
    rotate_around(origin, &Point2D::from_nalgebra(&local), bearing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_compass_angle_cardinals() {
        let o = Point2D::new(0.0, 0.0);
        assert_abs_diff_eq!(compass_angle(&o, &Point2D::new(0.0, 1.0)), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(compass_angle(&o, &Point2D::new(1.0, 0.0)), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(compass_angle(&o, &Point2D::new(0.0, -1.0)), 180.0, epsilon = 1e-9);
        assert_abs_diff_eq!(compass_angle(&o, &Point2D::new(-1.0, 0.0)), 270.0, epsilon = 1e-9);
        assert_abs_diff_eq!(compass_angle(&o, &Point2D::new(-1.0, 1.0)), 315.0, epsilon = 1e-9);
    }

    #[test]
    fn test_smallest_angle_difference() {
        assert_abs_diff_eq!(smallest_angle_difference(0.0, 90.0), 90.0);
        assert_abs_diff_eq!(smallest_angle_difference(90.0, 0.0), -90.0);
        assert_abs_diff_eq!(smallest_angle_difference(350.0, 10.0), 20.0);
        assert_abs_diff_eq!(smallest_angle_difference(10.0, 350.0), -20.0);
    }

    #[test]
    fn test_rotate_clockwise() {
        let o = Point2D::new(1.0, 1.0);
        let p = rotate_around(&o, &Point2D::new(1.0, 2.0), 90.0);
        assert_abs_diff_eq!(p.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.y, 1.0, epsilon = 1e-12);

        let back = rotate_around(&o, &p, -90.0);
        assert_abs_diff_eq!(back.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(back.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_offset_along_bearing() {
        let o = Point2D::new(0.0, 0.0);
        let ahead = offset_along_bearing(&o, 90.0, 0.0, 1.0);
        assert_abs_diff_eq!(ahead.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ahead.y, 0.0, epsilon = 1e-12);

        // Facing east, the right-hand side is south
        let right = offset_along_bearing(&o, 90.0, 1.0, 0.0);
        assert_abs_diff_eq!(right.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(right.y, -1.0, epsilon = 1e-12);
    }
}
