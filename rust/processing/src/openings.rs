// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decomposition of walls with openings into alternating walls and gates
//!
//! Two strategies produce the same partition when openings are ordered along
//! the wall axis:
//!
//! - [`OpeningStrategy::Containment`] repeatedly carves the first opening whose
//!   bounding box fits inside a pending wall piece.
//! - [`OpeningStrategy::Chaining`] walks from the wall start to the nearest
//!   unvisited vertex among the wall and opening endpoints, and tags each step
//!   as a gate when it spans an opening. It tolerates openings listed out of
//!   order.

use crate::element::{BuildingElement, Edge, Gate, Wall, WallWithOpening};
use crowdplan_geometry::{Point2D, Segment, VertexKey};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::str::FromStr;

/// Slack when testing whether an opening lies inside a wall's bounding box
const CONTAINMENT_EPSILON: f64 = 1e-6;

/// How openings are carved out of their wall
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OpeningStrategy {
    #[default]
    Containment,
    Chaining,
}

impl FromStr for OpeningStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "containment" => Ok(OpeningStrategy::Containment),
            "chaining" => Ok(OpeningStrategy::Chaining),
            other => Err(format!("unknown opening strategy '{other}'")),
        }
    }
}

/// Walls and gates produced from one wall, plus the openings that did not fit
#[derive(Debug, Clone, Default)]
pub struct Decomposition {
    /// Pieces ordered along the wall from its start vertex
    pub elements: Vec<BuildingElement>,
    pub rejected_openings: Vec<Segment>,
}

/// Decompose every [`WallWithOpening`] in `elements`; other variants pass through.
pub fn decompose_openings(
    elements: Vec<BuildingElement>,
    strategy: OpeningStrategy,
) -> (Vec<BuildingElement>, Vec<(Edge, Segment)>) {
    let mut output = Vec::with_capacity(elements.len());
    let mut rejected = Vec::new();

    for element in elements {
        match element {
            BuildingElement::WallWithOpening(wall) => {
                let decomposition = decompose_wall(&wall, strategy);
                rejected.extend(
                    decomposition
                        .rejected_openings
                        .into_iter()
                        .map(|opening| (wall.wall.edge.clone(), opening)),
                );
                output.extend(decomposition.elements);
            }
            other => output.push(other),
        }
    }

    (output, rejected)
}

/// Split one wall at its openings.
pub fn decompose_wall(wall: &WallWithOpening, strategy: OpeningStrategy) -> Decomposition {
    let mut decomposition = match strategy {
        OpeningStrategy::Containment => decompose_by_containment(wall),
        OpeningStrategy::Chaining => decompose_by_chaining(wall),
    };

    let axis = wall.wall.edge.segment();
    decomposition
        .elements
        .retain(|element| element.length() > 0.0);
    decomposition.elements.sort_by(|a, b| {
        axis.project(&a.segment().midpoint())
            .total_cmp(&axis.project(&b.segment().midpoint()))
    });
    decomposition
}

fn decompose_by_containment(wall: &WallWithOpening) -> Decomposition {
    let edge = &wall.wall.edge;
    let mut pending: Vec<Segment> = wall
        .opening_vertices
        .iter()
        .copied()
        .filter(|opening| !opening.is_degenerate())
        .collect();

    let mut queue = VecDeque::from([edge.segment()]);
    let mut elements = Vec::new();

    while let Some(piece) = queue.pop_front() {
        let contained = pending
            .iter()
            .position(|opening| piece.bounds_contain_segment(opening, CONTAINMENT_EPSILON));

        match contained {
            Some(index) => {
                let opening = orient_along(&pending.remove(index), &piece);
                elements.push(gate(edge, opening));
                queue.push_back(Segment::new(piece.start, opening.start));
                queue.push_back(Segment::new(opening.end, piece.end));
            }
            None => elements.push(wall_piece(edge, piece)),
        }
    }

    Decomposition {
        elements,
        rejected_openings: pending,
    }
}

fn decompose_by_chaining(wall: &WallWithOpening) -> Decomposition {
    let edge = &wall.wall.edge;
    let axis = edge.segment();

    let (accepted, rejected_openings): (Vec<Segment>, Vec<Segment>) = wall
        .opening_vertices
        .iter()
        .copied()
        .filter(|opening| !opening.is_degenerate())
        .partition(|opening| axis.bounds_contain_segment(opening, CONTAINMENT_EPSILON));

    let opening_edges: FxHashSet<(VertexKey, VertexKey)> = accepted
        .iter()
        .map(|opening| edge_key(&opening.start, &opening.end))
        .collect();

    let mut remaining: Vec<Point2D> = accepted.iter().flat_map(|o| o.endpoints()).collect();
    let mut elements = Vec::new();
    let mut current = axis.start;

    while !remaining.is_empty() {
        let nearest = remaining
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                current
                    .distance_to(a)
                    .total_cmp(&current.distance_to(b))
            })
            .map(|(index, _)| index)
            .unwrap_or(0);
        let next = remaining.remove(nearest);
        elements.push(chain_step(edge, &opening_edges, current, next));
        current = next;
    }
    elements.push(chain_step(edge, &opening_edges, current, axis.end));

    Decomposition {
        elements,
        rejected_openings,
    }
}

fn chain_step(
    edge: &Edge,
    opening_edges: &FxHashSet<(VertexKey, VertexKey)>,
    from: Point2D,
    to: Point2D,
) -> BuildingElement {
    let step = Segment::new(from, to);
    if opening_edges.contains(&edge_key(&from, &to)) {
        gate(edge, step)
    } else {
        wall_piece(edge, step)
    }
}

fn edge_key(a: &Point2D, b: &Point2D) -> (VertexKey, VertexKey) {
    let (ka, kb) = (a.key(), b.key());
    if ka <= kb {
        (ka, kb)
    } else {
        (kb, ka)
    }
}

/// Order an opening's endpoints so it runs in the same direction as `host`.
fn orient_along(opening: &Segment, host: &Segment) -> Segment {
    if host.project(&opening.start) <= host.project(&opening.end) {
        *opening
    } else {
        opening.reversed()
    }
}

fn wall_piece(host: &Edge, segment: Segment) -> BuildingElement {
    BuildingElement::Wall(Wall::from_edge(host.reshaped(segment)))
}

fn gate(host: &Edge, segment: Segment) -> BuildingElement {
    BuildingElement::Gate(Gate {
        edge: Edge::new(segment.start, segment.end).with_identity(None, host.name.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    fn wall_with_openings(length: f64, openings: &[(f64, f64)]) -> WallWithOpening {
        WallWithOpening {
            wall: Wall::new(Point2D::new(0.0, 0.0), Point2D::new(length, 0.0)).with_id("w"),
            opening_vertices: openings
                .iter()
                .map(|&(a, b)| Segment::from(((a, 0.0), (b, 0.0))))
                .collect(),
        }
    }

    fn spans(elements: &[BuildingElement]) -> Vec<(ElementKind, f64, f64)> {
        elements
            .iter()
            .map(|e| (e.kind(), e.start().x, e.end().x))
            .collect()
    }

    #[test]
    fn test_two_openings_containment() {
        let wall = wall_with_openings(20.0, &[(5.0, 7.0), (12.0, 14.0)]);
        let result = decompose_wall(&wall, OpeningStrategy::Containment);
        assert!(result.rejected_openings.is_empty());
        assert_eq!(
            spans(&result.elements),
            vec![
                (ElementKind::Wall, 0.0, 5.0),
                (ElementKind::Gate, 5.0, 7.0),
                (ElementKind::Wall, 7.0, 12.0),
                (ElementKind::Gate, 12.0, 14.0),
                (ElementKind::Wall, 14.0, 20.0),
            ]
        );
    }

    #[test]
    fn test_strategies_agree_on_ordered_openings() {
        let wall = wall_with_openings(20.0, &[(5.0, 7.0), (12.0, 14.0)]);
        let containment = decompose_wall(&wall, OpeningStrategy::Containment);
        let chaining = decompose_wall(&wall, OpeningStrategy::Chaining);
        assert_eq!(spans(&containment.elements), spans(&chaining.elements));
    }

    #[test]
    fn test_chaining_handles_reversed_and_unordered_openings() {
        let wall = wall_with_openings(20.0, &[(14.0, 12.0), (7.0, 5.0)]);
        let result = decompose_wall(&wall, OpeningStrategy::Chaining);
        let kinds: Vec<_> = result.elements.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                ElementKind::Wall,
                ElementKind::Gate,
                ElementKind::Wall,
                ElementKind::Gate,
                ElementKind::Wall
            ]
        );
    }

    #[test]
    fn test_reversed_opening_is_oriented_along_wall() {
        let wall = wall_with_openings(10.0, &[(6.0, 4.0)]);
        let result = decompose_wall(&wall, OpeningStrategy::Containment);
        assert_eq!(
            spans(&result.elements),
            vec![
                (ElementKind::Wall, 0.0, 4.0),
                (ElementKind::Gate, 4.0, 6.0),
                (ElementKind::Wall, 6.0, 10.0),
            ]
        );
    }

    #[test]
    fn test_opening_at_wall_end_drops_zero_length_stub() {
        let wall = wall_with_openings(10.0, &[(8.0, 10.0)]);
        let result = decompose_wall(&wall, OpeningStrategy::Containment);
        assert_eq!(result.elements.len(), 2);
        assert!(result.elements.iter().all(|e| e.length() > 0.0));
    }

    #[test]
    fn test_uncontained_opening_is_rejected() {
        let wall = wall_with_openings(10.0, &[(9.0, 11.0)]);
        let result = decompose_wall(&wall, OpeningStrategy::Containment);
        assert_eq!(result.rejected_openings.len(), 1);
        assert_eq!(spans(&result.elements), vec![(ElementKind::Wall, 0.0, 10.0)]);
    }

    #[test]
    fn test_length_is_conserved() {
        let wall = WallWithOpening {
            wall: Wall::new(Point2D::new(1.0, 2.0), Point2D::new(13.0, 7.0)),
            opening_vertices: vec![
                Segment::from(((3.4, 3.0), (4.6, 3.5))),
                Segment::from(((8.2, 5.0), (10.6, 6.0))),
            ],
        };
        let total_length = wall.wall.edge.length();
        for strategy in [OpeningStrategy::Containment, OpeningStrategy::Chaining] {
            let result = decompose_wall(&wall, strategy);
            let sum: f64 = result.elements.iter().map(|e| e.length()).sum();
            assert!((sum - total_length).abs() < 1e-6, "{strategy:?}: {sum} vs {total_length}");
            assert_eq!(
                result.elements.iter().filter(|e| e.kind() == ElementKind::Gate).count(),
                2
            );
        }
    }

    #[test]
    fn test_other_variants_pass_through() {
        let elements = vec![
            BuildingElement::Wall(Wall::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0))),
            BuildingElement::WallWithOpening(wall_with_openings(10.0, &[(2.0, 3.0)])),
        ];
        let (output, rejected) = decompose_openings(elements, OpeningStrategy::Containment);
        assert!(rejected.is_empty());
        assert_eq!(output.len(), 4);
        assert!(output.iter().all(|e| e.kind() != ElementKind::WallWithOpening));
    }

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("Chaining".parse(), Ok(OpeningStrategy::Chaining));
        assert_eq!(" containment ".parse(), Ok(OpeningStrategy::Containment));
        assert!("nearest".parse::<OpeningStrategy>().is_err());
    }
}
