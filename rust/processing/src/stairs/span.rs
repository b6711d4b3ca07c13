// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Number of storeys a stair climbs.

use super::StairCommonPset;

/// Fraction of the run height by which the elevation window is widened.
pub const SPAN_TOLERANCE_RATIO: f64 = 0.005;

/// Vertical extent of a stair: risers times riser height, each defaulting to 1.
pub fn run_height(pset: &StairCommonPset) -> f64 {
    f64::from(pset.number_of_risers.unwrap_or(1)) * pset.riser_height.unwrap_or(1.0)
}

/// Count the storeys above `start_elevation` that the stair reaches.
///
/// A storey counts when its elevation lies in
/// `(start_elevation, start_elevation + run_height]`, with both bounds shifted
/// up by a small fraction of the run height so that the starting storey is
/// never counted and a destination a hair above the nominal height still is.
pub fn floor_span(start_elevation: f64, run_height: f64, elevations: &[f64]) -> usize {
    let tolerance = SPAN_TOLERANCE_RATIO * run_height.abs();
    let lower = start_elevation + tolerance;
    let upper = start_elevation + run_height + tolerance;
    elevations
        .iter()
        .filter(|&&elevation| elevation > lower && elevation <= upper)
        .count()
}
