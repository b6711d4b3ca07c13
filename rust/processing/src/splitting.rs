// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Splitting of crossing elements at T and + junctions
//!
//! A worklist pops one element at a time and looks for the first element it
//! crosses, searching the queue and then the finished output. The popped
//! element is cut at the crossing and both pieces go back to the end of the
//! queue; the other element is left for its own turn, when it will meet the
//! new pieces. A crossing at one of the popped element's own endpoints does
//! not cut it: that is an L joint, or a T joint where the popped element is
//! the branch and the through element is cut instead.
//!
//! Every cut produces two pieces at least [`SPLIT_TOLERANCE`] long on the
//! truncation grid of [`intersect_bounded`], which is order independent, so the
//! same pair always yields the same point. An iteration cap backs this up.

use crate::element::BuildingElement;
use crowdplan_geometry::{intersect_bounded, Point2D};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Crossings closer than this to an endpoint snap onto it.
pub const SPLIT_TOLERANCE: f64 = 1e-4;

/// Outcome of a splitting pass
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub elements: Vec<BuildingElement>,
    pub iterations: usize,
    /// The iteration cap was hit and the remaining queue was emitted unsplit.
    pub capped: bool,
}

/// Default iteration cap for `element_count` elements.
pub fn default_iteration_cap(element_count: usize) -> usize {
    4 * (element_count + 1) * (element_count + 1) + 1_000
}

/// Split every pair of crossing elements, with the default iteration cap.
pub fn split_intersections(elements: Vec<BuildingElement>) -> Vec<BuildingElement> {
    let cap = default_iteration_cap(elements.len());
    split_intersections_capped(elements, cap).elements
}

/// Split every pair of crossing elements, popping at most `max_iterations` times.
pub fn split_intersections_capped(
    elements: Vec<BuildingElement>,
    max_iterations: usize,
) -> SplitResult {
    let mut queue: VecDeque<BuildingElement> = elements.into();
    let mut output = Vec::with_capacity(queue.len());
    let mut iterations = 0;

    while let Some(element) = queue.pop_front() {
        if iterations >= max_iterations {
            tracing::warn!(
                iterations,
                remaining = queue.len() + 1,
                "Splitting iteration cap reached, emitting remaining elements unsplit"
            );
            output.push(element);
            output.extend(queue);
            return SplitResult {
                elements: output,
                iterations,
                capped: true,
            };
        }
        iterations += 1;

        let pieces = first_crossing(&element, queue.iter().chain(output.iter()))
            .map(|point| split_at(&element, point))
            .filter(|pieces| pieces.len() == 2);
        match pieces {
            Some(pieces) => queue.extend(pieces),
            None => output.push(element),
        }
    }

    SplitResult {
        elements: output,
        iterations,
        capped: false,
    }
}

/// First point where `others` cross `target` away from its endpoints.
///
/// A crossing within [`SPLIT_TOLERANCE`] of the other element's endpoint is
/// moved onto it, so a T joint meets the branch exactly. One within the
/// tolerance of the target's own endpoints does not count.
fn first_crossing<'a>(
    target: &BuildingElement,
    others: impl Iterator<Item = &'a BuildingElement>,
) -> Option<Point2D> {
    let target_segment = target.segment();
    others
        .filter_map(|other| {
            let other_segment = other.segment();
            let point = intersect_bounded(&target_segment, &other_segment)?;
            let point = other_segment
                .endpoints()
                .into_iter()
                .find(|vertex| vertex.distance_to(&point) <= SPLIT_TOLERANCE)
                .unwrap_or(point);
            target_segment
                .endpoints()
                .iter()
                .all(|vertex| vertex.distance_to(&point) > SPLIT_TOLERANCE)
                .then_some(point)
        })
        .next()
}

/// Cut `element` at `point`, dropping zero-length pieces.
fn split_at(element: &BuildingElement, point: Point2D) -> SmallVec<[BuildingElement; 2]> {
    let segment = element.segment();
    [
        element.piece((segment.start, point).into(), "1"),
        element.piece((point, segment.end).into(), "2"),
    ]
    .into_iter()
    .filter(|piece| piece.length() > 0.0)
    .collect()
}
