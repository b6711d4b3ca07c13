// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building orchestrator
//!
//! Sorts storeys by elevation, builds every stair once, then runs the
//! per-storey pipeline on all storeys in parallel and appends stair border
//! walls. Failures of single elements never abort the conversion; they are
//! collected as [`Unparsable`] entries.

use crate::border::border_walls_for_storey;
use crate::config::ConversionConfig;
use crate::element::{BuildingElement, Connection, Edge, Wall, WallWithOpening};
use crate::error::{Error, Result};
use crate::stairs::{build_stair, LevelContext, Stair, StairInput};
use crate::storey::{process_storey_with, PipelineOptions};
use crowdplan_geometry::{Point2D, Segment};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A wall as delivered by the extraction step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WallInput {
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub start_vertex: Point2D,
    pub end_vertex: Point2D,
    /// Door and opening spans on the wall axis
    #[serde(default)]
    pub openings: Vec<Segment>,
    #[serde(default)]
    pub connected_to: Vec<Connection>,
    /// Lowest and highest z of the wall body, for building-wide walls
    #[serde(default)]
    pub z_range: Option<(f64, f64)>,
}

impl WallInput {
    pub fn to_element(&self) -> BuildingElement {
        let wall = Wall {
            edge: Edge::new(self.start_vertex, self.end_vertex)
                .with_identity(self.object_id.clone(), self.name.clone()),
            connected_to: self.connected_to.clone(),
        };
        if self.openings.is_empty() {
            wall.into()
        } else {
            WallWithOpening {
                wall,
                opening_vertices: self.openings.clone(),
            }
            .into()
        }
    }
}

/// One storey of the extraction document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StoreyInput {
    #[serde(default)]
    pub name: Option<String>,
    pub elevation: f64,
    #[serde(default)]
    pub walls: Vec<WallInput>,
    /// Stairs starting on this storey
    #[serde(default)]
    pub stairs: Vec<StairInput>,
}

/// Kinds of objects the converter knowingly skips
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UnsupportedCategory {
    /// Escalators, elevators and travelators
    TransportElement,
    FloorSlabVoid,
}

impl UnsupportedCategory {
    pub fn reason(&self) -> &'static str {
        match self {
            UnsupportedCategory::TransportElement => "Element is not yet supported",
            UnsupportedCategory::FloorSlabVoid => "Floor slab void is not yet supported",
        }
    }
}

/// An object flagged by the extraction step as unsupported
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnsupportedObject {
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub category: UnsupportedCategory,
}

/// The whole extraction document for one building
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BuildingInput {
    #[serde(default)]
    pub name: Option<String>,
    pub storeys: Vec<StoreyInput>,
    /// Walls not bound to a storey, assigned by their z range
    #[serde(default)]
    pub walls: Vec<WallInput>,
    #[serde(default)]
    pub unsupported: Vec<UnsupportedObject>,
}

/// An input object left out of the conversion, with the reason
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unparsable {
    pub object_id: Option<String>,
    pub name: Option<String>,
    pub reason: String,
}

impl Unparsable {
    pub fn new(object_id: Option<String>, name: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            object_id,
            name,
            reason: reason.into(),
        }
    }

    fn for_edge(edge: &Edge, reason: impl Into<String>) -> Self {
        Self::new(edge.object_id.clone(), edge.name.clone(), reason)
    }
}

/// One converted storey
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Level {
    /// Position in ascending elevation order
    pub index: usize,
    pub name: Option<String>,
    pub elevation: f64,
    pub elements: Vec<BuildingElement>,
}

/// Result of converting a building
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Conversion {
    pub levels: Vec<Level>,
    pub stairs: Vec<Stair>,
    pub unparsable: Vec<Unparsable>,
}

/// Assign building-wide walls to storeys by vertical extent.
///
/// A wall spanning `[z_min, z_max]` belongs to the storey at elevation `e` when
/// it starts no higher than `e + wall_offset_tolerance` and reaches at least
/// `e + min_wall_height - wall_offset_tolerance`. A wall may belong to several
/// storeys. Walls without a z range are not assigned.
pub fn assign_walls_to_storeys<'a>(
    walls: &'a [WallInput],
    elevations: &[f64],
    min_wall_height: f64,
    wall_offset_tolerance: f64,
) -> Vec<Vec<&'a WallInput>> {
    elevations
        .iter()
        .map(|&elevation| {
            walls
                .iter()
                .filter(|wall| {
                    wall.z_range.is_some_and(|(z_min, z_max)| {
                        z_min <= elevation + wall_offset_tolerance
                            && z_max >= elevation + min_wall_height - wall_offset_tolerance
                    })
                })
                .collect()
        })
        .collect()
}

/// Convert a whole building.
pub fn convert_building(input: &BuildingInput, config: &ConversionConfig) -> Result<Conversion> {
    if input.storeys.is_empty() {
        return Err(Error::NoStoreys);
    }
    if let Some(index) = input.storeys.iter().position(|s| !s.elevation.is_finite()) {
        return Err(Error::InvalidElevation { index });
    }

    let mut storeys: Vec<&StoreyInput> = input.storeys.iter().collect();
    storeys.sort_by(|a, b| a.elevation.total_cmp(&b.elevation));
    let elevations: Vec<f64> = storeys.iter().map(|s| s.elevation).collect();

    let mut unparsable = Vec::new();
    let (stairs, stair_failures) = build_stairs(&storeys, &elevations, config);
    unparsable.extend(stair_failures);

    let shared_walls = assign_walls_to_storeys(
        &input.walls,
        &elevations,
        config.min_wall_height,
        config.wall_offset_tolerance,
    );
    for wall in input.walls.iter().filter(|w| w.z_range.is_none()) {
        tracing::warn!(
            name = wall.name.as_deref().unwrap_or_default(),
            "Skipping wall without vertical extent"
        );
        unparsable.push(Unparsable::new(
            wall.object_id.clone(),
            wall.name.clone(),
            "Wall has no vertical extent",
        ));
    }

    let options = PipelineOptions::from(config);
    let converted: Vec<(Level, Vec<Unparsable>)> = storeys
        .par_iter()
        .zip(shared_walls.par_iter())
        .enumerate()
        .map(|(index, (storey, shared))| convert_storey(index, storey, shared, &stairs, &options))
        .collect();

    let mut levels = Vec::with_capacity(converted.len());
    for (level, failures) in converted {
        levels.push(level);
        unparsable.extend(failures);
    }

    unparsable.extend(input.unsupported.iter().map(|object| {
        Unparsable::new(
            object.object_id.clone(),
            object.name.clone(),
            object.category.reason(),
        )
    }));

    tracing::info!(
        building = input.name.as_deref().unwrap_or_default(),
        levels = levels.len(),
        stairs = stairs.len(),
        unparsable = unparsable.len(),
        "Converted building"
    );

    Ok(Conversion {
        levels,
        stairs,
        unparsable,
    })
}

fn build_stairs(
    storeys: &[&StoreyInput],
    elevations: &[f64],
    config: &ConversionConfig,
) -> (Vec<Stair>, Vec<Unparsable>) {
    let thresholds = config.stair_thresholds();
    let mut stairs = Vec::new();
    let mut failures = Vec::new();

    for (start_level_index, storey) in storeys.iter().enumerate() {
        let levels = LevelContext {
            start_level_index,
            elevations,
        };
        for input in &storey.stairs {
            match build_stair(input, levels, &thresholds) {
                Ok(stair) => stairs.push(stair),
                Err(err) => {
                    tracing::warn!(
                        name = input.name.as_deref().unwrap_or_default(),
                        error = %err,
                        "Skipping stair"
                    );
                    failures.push(Unparsable::new(
                        input.object_id.clone(),
                        input.name.clone(),
                        err.to_string(),
                    ));
                }
            }
        }
    }

    (stairs, failures)
}

fn convert_storey(
    index: usize,
    storey: &StoreyInput,
    shared_walls: &[&WallInput],
    stairs: &[Stair],
    options: &PipelineOptions,
) -> (Level, Vec<Unparsable>) {
    let _span = tracing::debug_span!(
        "storey",
        index,
        name = storey.name.as_deref().unwrap_or_default()
    )
    .entered();

    let raw: Vec<BuildingElement> = storey
        .walls
        .iter()
        .chain(shared_walls.iter().copied())
        .map(WallInput::to_element)
        .collect();

    let result = process_storey_with(raw, options);

    let mut failures: Vec<Unparsable> = result
        .degenerate_walls
        .iter()
        .map(|edge| Unparsable::for_edge(edge, "Wall axis has zero length"))
        .collect();
    failures.extend(result.rejected_openings.iter().map(|(edge, opening)| {
        Unparsable::for_edge(
            edge,
            format!(
                "Opening ({}, {})-({}, {}) could not be placed within the wall",
                opening.start.x, opening.start.y, opening.end.x, opening.end.y
            ),
        )
    }));

    let mut elements = result.elements;
    elements.extend(
        border_walls_for_storey(index, stairs)
            .into_iter()
            .map(BuildingElement::Wall),
    );

    let level = Level {
        index,
        name: storey.name.clone(),
        elevation: storey.elevation,
        elements,
    };
    (level, failures)
}
