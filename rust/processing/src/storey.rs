// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-storey reduction pipeline
//!
//! Stages run in a fixed order, each consuming the previous stage's list:
//!
//! 1. drop walls whose axis has zero length
//! 2. infer connections and glue them (only with a positive tolerance)
//! 3. decompose walls with openings into walls and gates
//! 4. split crossing elements
//! 5. close remaining gaps (only with a positive tolerance)
//! 6. reclassify dangling walls as barricades
//!
//! Stair border walls are added by the building orchestrator, which knows
//! every stair.

use crate::barricades::reclassify_barricades;
use crate::config::ConversionConfig;
use crate::connections::{close_gaps, glue, infer_connections};
use crate::element::{Barricade, BuildingElement, Edge, Gate, Wall};
use crate::openings::{decompose_openings, OpeningStrategy};
use crate::splitting::{default_iteration_cap, split_intersections_capped};
use crowdplan_geometry::Segment;

/// Knobs of the per-storey pipeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    /// Gluing and gap-closing tolerance; `0` skips both
    pub tolerance: f64,
    pub opening_strategy: OpeningStrategy,
    pub split_iteration_cap: Option<usize>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.0,
            opening_strategy: OpeningStrategy::default(),
            split_iteration_cap: None,
        }
    }
}

impl From<&ConversionConfig> for PipelineOptions {
    fn from(config: &ConversionConfig) -> Self {
        Self {
            tolerance: config.close_wall_gap,
            opening_strategy: config.opening_strategy,
            split_iteration_cap: config.split_iteration_cap,
        }
    }
}

/// Output of the per-storey pipeline
#[derive(Debug, Clone, Default)]
pub struct StoreyElements {
    /// Final walls, gates and barricades in emission order
    pub elements: Vec<BuildingElement>,
    /// Openings that could not be placed inside their host wall
    pub rejected_openings: Vec<(Edge, Segment)>,
    /// Input walls dropped because their axis has zero length
    pub degenerate_walls: Vec<Edge>,
    /// Whether splitting stopped at its iteration cap
    pub split_capped: bool,
}

impl StoreyElements {
    pub fn walls(&self) -> impl Iterator<Item = &Wall> {
        self.elements.iter().filter_map(|e| match e {
            BuildingElement::Wall(wall) => Some(wall),
            _ => None,
        })
    }

    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.elements.iter().filter_map(|e| match e {
            BuildingElement::Gate(gate) => Some(gate),
            _ => None,
        })
    }

    pub fn barricades(&self) -> impl Iterator<Item = &Barricade> {
        self.elements.iter().filter_map(|e| match e {
            BuildingElement::Barricade(barricade) => Some(barricade),
            _ => None,
        })
    }
}

/// Run the pipeline with a gluing tolerance and default options otherwise.
pub fn process_storey(elements: Vec<BuildingElement>, tolerance: f64) -> StoreyElements {
    process_storey_with(
        elements,
        &PipelineOptions {
            tolerance,
            ..PipelineOptions::default()
        },
    )
}

/// Run the whole per-storey pipeline.
pub fn process_storey_with(
    elements: Vec<BuildingElement>,
    options: &PipelineOptions,
) -> StoreyElements {
    let input_count = elements.len();
    let (mut elements, degenerate): (Vec<_>, Vec<_>) =
        elements.into_iter().partition(|e| e.length() > 0.0);
    let degenerate_walls: Vec<Edge> = degenerate.iter().map(|e| e.edge().clone()).collect();
    for edge in &degenerate_walls {
        tracing::warn!(
            name = edge.name.as_deref().unwrap_or_default(),
            "Skipping wall with zero-length axis"
        );
    }

    let glues = options.tolerance > 0.0;
    if glues {
        infer_connections(options.tolerance, &mut elements);
        elements = glue(options.tolerance, elements);
    }

    let (elements, rejected_openings) = decompose_openings(elements, options.opening_strategy);
    tracing::debug!(
        elements = elements.len(),
        rejected = rejected_openings.len(),
        "Decomposed wall openings"
    );

    let cap = options
        .split_iteration_cap
        .unwrap_or_else(|| default_iteration_cap(elements.len()));
    let split = split_intersections_capped(elements, cap);
    tracing::debug!(
        elements = split.elements.len(),
        iterations = split.iterations,
        "Split intersections"
    );
    let mut elements = split.elements;

    if glues {
        elements = close_gaps(options.tolerance, elements);
    }

    let elements = reclassify_barricades(elements);

    let result = StoreyElements {
        elements,
        rejected_openings,
        degenerate_walls,
        split_capped: split.capped,
    };
    tracing::debug!(
        input = input_count,
        walls = result.walls().count(),
        gates = result.gates().count(),
        barricades = result.barricades().count(),
        "Processed storey"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, WallWithOpening};
    use crowdplan_geometry::Point2D;

    fn wall(a: (f64, f64), b: (f64, f64)) -> BuildingElement {
        Wall::new(a.into(), b.into()).into()
    }

    #[test]
    fn test_room_with_door() {
        let door_wall = WallWithOpening {
            wall: Wall::new(Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)),
            opening_vertices: vec![Segment::from(((4.0, 0.0), (5.0, 0.0)))],
        };
        let result = process_storey(
            vec![
                door_wall.into(),
                wall((10.0, 0.0), (10.0, 10.0)),
                wall((10.0, 10.0), (0.0, 10.0)),
                wall((0.0, 10.0), (0.0, 0.0)),
            ],
            0.0,
        );
        assert_eq!(result.walls().count(), 5);
        assert_eq!(result.gates().count(), 1);
        assert_eq!(result.barricades().count(), 0);
        assert!(result.rejected_openings.is_empty());
    }

    #[test]
    fn test_zero_length_wall_is_dropped() {
        let result = process_storey(vec![wall((1.0, 1.0), (1.0, 1.0))], 0.0);
        assert!(result.elements.is_empty());
        assert_eq!(result.degenerate_walls.len(), 1);
    }

    #[test]
    fn test_cross_without_tolerance() {
        let result = process_storey(
            vec![wall((0.0, 5.0), (10.0, 5.0)), wall((5.0, 0.0), (5.0, 10.0))],
            0.0,
        );
        // Four arms, each open at its outer end
        assert_eq!(result.elements.len(), 4);
        assert!(result.elements.iter().all(|e| e.kind() == ElementKind::Barricade));
    }

    #[test]
    fn test_zero_tolerance_leaves_gaps() {
        let walls = vec![wall((0.0, 0.0), (4.95, 0.0)), wall((5.0, 0.0), (5.0, 5.0))];
        let result = process_storey(walls.clone(), 0.0);
        assert_eq!(result.barricades().count(), 2);

        let glued = process_storey(walls, 0.1);
        let corner = Point2D::new(5.0, 0.0);
        assert!(glued.elements.iter().any(|e| e.end() == corner));
    }
}
