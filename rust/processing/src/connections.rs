// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerance-based connection inference, gluing and gap closing
//!
//! Walls extracted from a building model rarely meet exactly: axis lines stop
//! short of each other or overshoot by a few centimetres. These stages close
//! such defects within a tolerance:
//!
//! 1. [`infer_connections`] records which walls meet near the intersection of
//!    their supporting lines.
//! 2. [`glue`] snaps endpoints onto those intersections, keeps T-junctions
//!    intact, and bridges nearly collinear endpoint pairs.
//! 3. [`close_gaps`] runs after splitting and links the remaining dangling
//!    endpoints with short connector walls.
//!
//! The ATSTART/ATPATH tag is a best-effort heuristic. Gluing re-derives which
//! wall is the through wall from the geometry, so a wrong tag degrades to a
//! plain endpoint snap instead of a broken junction.

use crate::element::{BuildingElement, Connection, ConnectionType, Wall};
use crate::incidence::Incidence;
use crowdplan_geometry::{intersect_unbounded, Point2D, Segment};
use rustc_hash::FxHashMap;

/// Name given to synthesized connector walls
pub const CONNECTOR_NAME: &str = "connector";

/// Record connections between walls whose supporting lines meet within
/// `tolerance` of an endpoint.
///
/// For each unordered pair of wall-like elements with object ids, the
/// connection is stored on the wall that has an endpoint near the
/// intersection. When both do, the pair is an endpoint joint (`ATSTART`) and is
/// stored once, on the first wall. Existing connections are never duplicated.
pub fn infer_connections(tolerance: f64, elements: &mut [BuildingElement]) {
    let wall_indices: Vec<usize> = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_wall_like() && e.object_id().is_some())
        .map(|(i, _)| i)
        .collect();

    let mut inferred = 0usize;
    for (n, &i) in wall_indices.iter().enumerate() {
        for &j in &wall_indices[n + 1..] {
            let (first, second) = (elements[i].segment(), elements[j].segment());
            let Some(intersection) = intersect_unbounded(&first, &second) else {
                continue;
            };

            let first_near = endpoint_distance(&first, &intersection) <= tolerance;
            let second_near = endpoint_distance(&second, &intersection) <= tolerance;

            let (owner, other, connection_type) = match (first_near, second_near) {
                (true, true) => (i, j, ConnectionType::AtStart),
                (true, false) => (i, j, ConnectionType::AtPath),
                (false, true) => (j, i, ConnectionType::AtPath),
                (false, false) => continue,
            };

            if already_connected(elements, i, j) {
                continue;
            }

            let other_id = elements[other].object_id().unwrap_or_default().to_string();
            if let Some(wall) = elements[owner].as_wall_mut() {
                wall.connected_to.push(Connection::new(other_id, connection_type));
                inferred += 1;
            }
        }
    }

    tracing::debug!(inferred, walls = wall_indices.len(), "Inferred wall connections");
}

/// Snap recorded connections onto their intersections, then bridge nearly
/// collinear endpoint pairs that are still apart.
///
/// For an `ATSTART` connection both walls move their nearer endpoint onto
/// the intersection. For `ATPATH` only the branching wall moves; the through
/// wall (the one whose endpoints are farther from the intersection) is left
/// alone so the T-junction survives. An endpoint only moves when the
/// displacement is within `tolerance` and the wall keeps its direction.
///
/// Endpoint pairs that are still apart but within `tolerance` are bridged
/// afterwards. When both endpoints are free (no other element ends there)
/// they converge on the intersection of the two lines, or on their midpoint
/// when the walls are near-parallel and the lines meet far away. When only
/// one endpoint is free a connector wall links them, so the joint the other
/// endpoint already takes part in is preserved.
pub fn glue(tolerance: f64, elements: Vec<BuildingElement>) -> Vec<BuildingElement> {
    let mut elements = elements;
    let mut incidence = Incidence::from_elements(&elements);

    let index_by_id: FxHashMap<String, usize> = elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_wall_like())
        .filter_map(|(i, e)| e.object_id().map(|id| (id.to_string(), i)))
        .collect();

    let connections: Vec<(usize, usize, ConnectionType)> = elements
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.as_wall().map(|w| (i, w)))
        .flat_map(|(i, wall)| {
            wall.connected_to
                .iter()
                .filter_map(|c| index_by_id.get(&c.other_id).map(|&j| (i, j, c.connection_type)))
                .filter(move |&(i, j, _)| i != j)
                .collect::<Vec<_>>()
        })
        .collect();

    let mut snapped = 0usize;
    for (i, j, connection_type) in connections {
        let Some(intersection) = intersect_unbounded(&elements[i].segment(), &elements[j].segment())
        else {
            continue;
        };

        match connection_type {
            ConnectionType::AtStart => {
                snapped += usize::from(snap_nearest(
                    &mut elements[i],
                    &intersection,
                    tolerance,
                    &mut incidence,
                ));
                snapped += usize::from(snap_nearest(
                    &mut elements[j],
                    &intersection,
                    tolerance,
                    &mut incidence,
                ));
            }
            ConnectionType::AtPath => {
                let branch = if endpoint_distance(&elements[i].segment(), &intersection)
                    <= endpoint_distance(&elements[j].segment(), &intersection)
                {
                    i
                } else {
                    j
                };
                snapped += usize::from(snap_nearest(
                    &mut elements[branch],
                    &intersection,
                    tolerance,
                    &mut incidence,
                ));
            }
        }
    }

    let connectors = bridge_endpoints(tolerance, &mut elements, &mut incidence);
    tracing::debug!(snapped, connectors = connectors.len(), "Glued wall connections");

    elements.extend(connectors);
    elements
}

/// Link dangling endpoints with connector walls.
///
/// A vertex is dangling when at most one element ends on it. For every pair of
/// elements the closest pair of dangling endpoints within `tolerance` gets one
/// connector; counts are updated as connectors are added so a vertex is
/// closed at most once.
pub fn close_gaps(tolerance: f64, elements: Vec<BuildingElement>) -> Vec<BuildingElement> {
    let mut incidence = Incidence::from_elements(&elements);
    let mut connectors = Vec::new();

    for i in 0..elements.len() {
        for j in (i + 1)..elements.len() {
            let candidate =
                closest_endpoint_pair(&elements[i].segment(), &elements[j].segment(), |a, b| {
                    incidence.count(a) <= 1 && incidence.count(b) <= 1 && a != b
                });
            let Some((a, b, distance)) = candidate else {
                continue;
            };
            if distance > tolerance {
                continue;
            }
            incidence.add(&a);
            incidence.add(&b);
            connectors.push(connector(a, b));
        }
    }

    tracing::debug!(connectors = connectors.len(), "Closed wall gaps");

    let mut elements = elements;
    elements.extend(connectors);
    elements
}

fn bridge_endpoints(
    tolerance: f64,
    elements: &mut [BuildingElement],
    incidence: &mut Incidence,
) -> Vec<BuildingElement> {
    let mut connectors = Vec::new();

    for i in 0..elements.len() {
        if !elements[i].is_wall_like() {
            continue;
        }
        for j in (i + 1)..elements.len() {
            if !elements[j].is_wall_like() {
                continue;
            }
            let (first, second) = (elements[i].segment(), elements[j].segment());
            let Some((a, b, distance)) = closest_endpoint_pair(&first, &second, |a, b| a != b)
            else {
                continue;
            };
            if distance > tolerance {
                continue;
            }

            let (free_a, free_b) = (incidence.count(&a) == 1, incidence.count(&b) == 1);
            if !free_a && !free_b {
                continue;
            }
            if !(free_a && free_b) {
                incidence.add(&a);
                incidence.add(&b);
                connectors.push(connector(a, b));
                continue;
            }

            let target = intersect_unbounded(&first, &second)
                .filter(|p| a.distance_to(p) <= tolerance && b.distance_to(p) <= tolerance)
                .unwrap_or_else(|| a.midpoint(&b).truncated());

            let moved_first = snap_endpoint(&mut elements[i], &a, &target, tolerance, incidence);
            let moved_second = snap_endpoint(&mut elements[j], &b, &target, tolerance, incidence);
            if !(moved_first && moved_second) {
                let a = if moved_first { target } else { a };
                let b = if moved_second { target } else { b };
                if a != b {
                    incidence.add(&a);
                    incidence.add(&b);
                    connectors.push(connector(a, b));
                }
            }
        }
    }

    connectors
}

fn already_connected(elements: &[BuildingElement], i: usize, j: usize) -> bool {
    let linked = |from: usize, to: usize| {
        match (elements[from].as_wall(), elements[to].object_id()) {
            (Some(wall), Some(id)) => wall.is_connected_to(id),
            _ => false,
        }
    };
    linked(i, j) || linked(j, i)
}

/// Distance from `point` to the nearer endpoint of `segment`.
fn endpoint_distance(segment: &Segment, point: &Point2D) -> f64 {
    segment
        .start
        .distance_to(point)
        .min(segment.end.distance_to(point))
}

/// The closest endpoint pair between two segments accepted by `accept`.
fn closest_endpoint_pair(
    first: &Segment,
    second: &Segment,
    accept: impl Fn(&Point2D, &Point2D) -> bool,
) -> Option<(Point2D, Point2D, f64)> {
    let mut best: Option<(Point2D, Point2D, f64)> = None;
    for a in first.endpoints() {
        for b in second.endpoints() {
            if !accept(&a, &b) {
                continue;
            }
            let distance = a.distance_to(&b);
            if best.map_or(true, |(_, _, d)| distance < d) {
                best = Some((a, b, distance));
            }
        }
    }
    best
}

/// Move the endpoint of `element` nearer to `target` onto it.
fn snap_nearest(
    element: &mut BuildingElement,
    target: &Point2D,
    tolerance: f64,
    incidence: &mut Incidence,
) -> bool {
    let endpoint = element.segment().nearest_endpoint(target);
    snap_endpoint(element, &endpoint, target, tolerance, incidence)
}

/// Move `endpoint` of `element` onto `target` if the move is within
/// `tolerance` and leaves a wall of positive length pointing the same way.
fn snap_endpoint(
    element: &mut BuildingElement,
    endpoint: &Point2D,
    target: &Point2D,
    tolerance: f64,
    incidence: &mut Incidence,
) -> bool {
    if endpoint == target || endpoint.distance_to(target) > tolerance {
        return false;
    }

    let segment = element.segment();
    let moves_start = segment.start == *endpoint;
    if !moves_start && segment.end != *endpoint {
        return false;
    }

    let moved = if moves_start {
        Segment::new(*target, segment.end)
    } else {
        Segment::new(segment.start, *target)
    };
    if !keeps_direction(&segment, &moved) {
        return false;
    }

    let edge = element.edge_mut();
    if moves_start {
        edge.start_vertex = *target;
    } else {
        edge.end_vertex = *target;
    }
    incidence.relocate(endpoint, target);
    true
}

fn keeps_direction(before: &Segment, after: &Segment) -> bool {
    if after.is_degenerate() {
        return false;
    }
    let original = before.end.to_nalgebra() - before.start.to_nalgebra();
    let moved = after.end.to_nalgebra() - after.start.to_nalgebra();
    original.dot(&moved) > 0.0
}

fn connector(a: Point2D, b: Point2D) -> BuildingElement {
    BuildingElement::Wall(Wall::new(a, b).named(CONNECTOR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    fn wall(id: &str, a: (f64, f64), b: (f64, f64)) -> BuildingElement {
        BuildingElement::Wall(Wall::new(a.into(), b.into()).with_id(id))
    }

    fn connections(element: &BuildingElement) -> Vec<Connection> {
        element.as_wall().unwrap().connected_to.clone()
    }

    #[test]
    fn test_infer_endpoint_joint() {
        let mut elements = vec![
            wall("a", (0.0, 0.0), (4.95, 0.0)),
            wall("b", (5.0, 0.05), (5.0, 5.0)),
        ];
        infer_connections(0.1, &mut elements);
        assert_eq!(
            connections(&elements[0]),
            vec![Connection::new("b", ConnectionType::AtStart)]
        );
        assert!(connections(&elements[1]).is_empty());
    }

    #[test]
    fn test_infer_t_junction_on_branch_wall() {
        let mut elements = vec![
            wall("through", (0.0, 0.0), (10.0, 0.0)),
            wall("branch", (5.0, 0.08), (5.0, 6.0)),
        ];
        infer_connections(0.1, &mut elements);
        assert!(connections(&elements[0]).is_empty());
        assert_eq!(
            connections(&elements[1]),
            vec![Connection::new("through", ConnectionType::AtPath)]
        );
    }

    #[test]
    fn test_infer_ignores_distant_walls_and_existing_connections() {
        let mut far = vec![
            wall("a", (0.0, 0.0), (4.0, 0.0)),
            wall("b", (5.0, 1.0), (5.0, 5.0)),
        ];
        infer_connections(0.1, &mut far);
        assert!(connections(&far[0]).is_empty());
        assert!(connections(&far[1]).is_empty());

        let mut existing = vec![
            wall("a", (0.0, 0.0), (5.0, 0.0)),
            wall("b", (5.0, 0.0), (5.0, 5.0)),
        ];
        if let Some(w) = existing[1].as_wall_mut() {
            w.connected_to.push(Connection::new("a", ConnectionType::AtStart));
        }
        infer_connections(0.1, &mut existing);
        assert!(connections(&existing[0]).is_empty());
        assert_eq!(connections(&existing[1]).len(), 1);
    }

    #[test]
    fn test_glue_t_junction_keeps_through_wall() {
        let mut elements = vec![
            wall("through", (0.0, 0.0), (10.0, 0.0)),
            wall("branch", (5.0, 0.08), (5.0, 6.0)),
        ];
        infer_connections(0.1, &mut elements);
        let glued = glue(0.1, elements);
        assert_eq!(glued.len(), 2);
        assert_eq!(glued[0].start(), Point2D::new(0.0, 0.0));
        assert_eq!(glued[0].end(), Point2D::new(10.0, 0.0));
        assert_eq!(glued[1].start(), Point2D::new(5.0, 0.0));
        assert_eq!(glued[1].end(), Point2D::new(5.0, 6.0));
    }

    #[test]
    fn test_glue_corner_moves_both_walls() {
        let mut elements = vec![
            wall("a", (0.0, 0.0), (4.95, 0.0)),
            wall("b", (5.0, 0.05), (5.0, 5.0)),
        ];
        infer_connections(0.1, &mut elements);
        let glued = glue(0.1, elements);
        assert_eq!(glued.len(), 2);
        assert_eq!(glued[0].end(), Point2D::new(5.0, 0.0));
        assert_eq!(glued[1].start(), Point2D::new(5.0, 0.0));
    }

    #[test]
    fn test_glue_converges_nearly_collinear_free_ends() {
        let mut elements = vec![
            wall("d", (0.0, 0.0), (5.0, 0.05)),
            wall("e", (5.02, 0.0), (10.0, 0.0)),
        ];
        infer_connections(0.1, &mut elements);
        let glued = glue(0.1, elements);
        assert_eq!(glued.len(), 2);
        assert_eq!(glued[0].end(), glued[1].start());
        assert!((glued[0].end().x - 5.01).abs() < 1e-5);
        assert_eq!(glued[0].start(), Point2D::new(0.0, 0.0));
    }

    #[test]
    fn test_glue_adds_connector_when_endpoint_is_shared() {
        let elements = vec![
            wall("d", (0.0, 0.0), (5.0, 0.05)),
            wall("e", (5.02, 0.0), (10.0, 0.0)),
            wall("f", (5.0, 0.05), (5.0, 4.0)),
        ];
        let glued = glue(0.1, elements);
        let connectors: Vec<_> = glued
            .iter()
            .filter(|e| e.edge().name.as_deref() == Some(CONNECTOR_NAME))
            .collect();
        assert_eq!(connectors.len(), 1);
        assert_eq!(connectors[0].kind(), ElementKind::Wall);
        assert_eq!(glued[0].end(), Point2D::new(5.0, 0.05));
    }

    #[test]
    fn test_close_gaps_single_connector_per_pair() {
        let elements = vec![
            wall("a", (0.0, 0.0), (5.0, 0.0)),
            wall("b", (5.05, 0.0), (5.05, 5.0)),
        ];
        let closed = close_gaps(0.1, elements);
        assert_eq!(closed.len(), 3);
        assert_eq!(closed[2].start(), Point2D::new(5.0, 0.0));
        assert_eq!(closed[2].end(), Point2D::new(5.05, 0.0));
    }

    #[test]
    fn test_close_gaps_ignores_joined_vertices() {
        let elements = vec![
            wall("a", (0.0, 0.0), (5.0, 0.0)),
            wall("b", (5.0, 0.0), (5.0, 5.0)),
            wall("c", (5.05, 0.0), (9.0, 0.0)),
        ];
        let closed = close_gaps(0.1, elements);
        assert_eq!(closed.len(), 3);
    }
}
