// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene assembly for the crowd-simulation writer
//!
//! Every level, element, vertex and stair receives a numeric id from one
//! shared counter starting at 1, in emission order: a level, then its walls,
//! gates and barricades, each element followed by any new vertices; stairs
//! come last. Vertices are shared across the whole scene by exact coordinate
//! identity after offsetting and rounding.

use crate::building::Conversion;
use crate::element::BuildingElement;
use crate::error::Result;
use crate::stairs::Stair;
use crowdplan_geometry::{round_to, Point2D, Segment, VertexKey};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Decimal digits kept in scene coordinates and lengths
pub const OUTPUT_DECIMALS: i32 = 3;

/// Level size used when none is configured
pub const DEFAULT_DIMENSION: (f64, f64) = (100.0, 100.0);

/// Placement of the scene in the simulator's frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    /// Subtracted from every coordinate
    pub origin: Point2D,
    /// Width and height of every level
    pub dimension: (f64, f64),
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            origin: Point2D::default(),
            dimension: DEFAULT_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct SceneVertex {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

/// A wall, gate or barricade
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SceneEdge {
    pub id: u32,
    pub length: f64,
    pub vertices: [SceneVertex; 2],
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SceneLevel {
    pub id: u32,
    pub width: f64,
    pub height: f64,
    pub walls: Vec<SceneEdge>,
    pub gates: Vec<SceneEdge>,
    pub barricades: Vec<SceneEdge>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SceneStair {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    pub vertex: SceneVertex,
    pub rotation: i32,
    pub staircase_width: f64,
    pub run_length: f64,
    pub no_of_treads: Option<u32>,
    pub start_level_index: usize,
    pub end_level_index: usize,
    pub lower_gate: [SceneVertex; 2],
    pub upper_gate: [SceneVertex; 2],
}

/// A complete crowd-simulation scene
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Scene {
    pub levels: Vec<SceneLevel>,
    pub stairs: Vec<SceneStair>,
}

/// Shared id counter and vertex registry
struct IdAllocator {
    last: u32,
    vertices: FxHashMap<VertexKey, u32>,
    options: SceneOptions,
}

impl IdAllocator {
    fn new(options: SceneOptions) -> Self {
        Self {
            last: 0,
            vertices: FxHashMap::default(),
            options,
        }
    }

    fn next_id(&mut self) -> u32 {
        self.last += 1;
        self.last
    }

    fn vertex(&mut self, point: &Point2D) -> SceneVertex {
        let local = Point2D::new(
            round_to(point.x - self.options.origin.x, OUTPUT_DECIMALS),
            round_to(point.y - self.options.origin.y, OUTPUT_DECIMALS),
        );
        let id = match self.vertices.get(&local.key()) {
            Some(&id) => id,
            None => {
                let id = self.next_id();
                self.vertices.insert(local.key(), id);
                id
            }
        };
        SceneVertex {
            id,
            x: local.x,
            y: local.y,
        }
    }

    fn edge(&mut self, segment: &Segment) -> SceneEdge {
        let id = self.next_id();
        let vertices = [self.vertex(&segment.start), self.vertex(&segment.end)];
        let length = Point2D::new(vertices[0].x, vertices[0].y)
            .distance_to(&Point2D::new(vertices[1].x, vertices[1].y));
        SceneEdge {
            id,
            length: round_to(length, OUTPUT_DECIMALS),
            vertices,
        }
    }

    fn gate_vertices(&mut self, gate: &Segment) -> [SceneVertex; 2] {
        [self.vertex(&gate.start), self.vertex(&gate.end)]
    }
}

impl Scene {
    /// Lay out a converted building for the writer.
    pub fn assemble(conversion: &Conversion, options: &SceneOptions) -> Self {
        let mut ids = IdAllocator::new(*options);

        let levels = conversion
            .levels
            .iter()
            .map(|level| {
                let id = ids.next_id();
                let (width, height) = options.dimension;
                let mut scene_level = SceneLevel {
                    id,
                    width,
                    height,
                    walls: Vec::new(),
                    gates: Vec::new(),
                    barricades: Vec::new(),
                };

                for element in level.elements.iter().filter(|e| e.is_wall_like()) {
                    scene_level.walls.push(ids.edge(&element.segment()));
                }
                for element in &level.elements {
                    if let BuildingElement::Gate(gate) = element {
                        scene_level.gates.push(ids.edge(&gate.edge.segment()));
                    }
                }
                for element in &level.elements {
                    if let BuildingElement::Barricade(barricade) = element {
                        scene_level.barricades.push(ids.edge(&barricade.edge.segment()));
                    }
                }
                scene_level
            })
            .collect();

        let stairs = conversion
            .stairs
            .iter()
            .map(|stair| scene_stair(&mut ids, stair))
            .collect();

        Self { levels, stairs }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Number of distinct vertices.
    pub fn vertex_count(&self) -> usize {
        let mut ids: Vec<u32> = self
            .levels
            .iter()
            .flat_map(|l| l.walls.iter().chain(&l.gates).chain(&l.barricades))
            .flat_map(|e| e.vertices.iter().map(|v| v.id))
            .chain(self.stairs.iter().flat_map(|s| {
                std::iter::once(s.vertex.id)
                    .chain(s.lower_gate.iter().map(|v| v.id))
                    .chain(s.upper_gate.iter().map(|v| v.id))
            }))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}

fn scene_stair(ids: &mut IdAllocator, stair: &Stair) -> SceneStair {
    let id = ids.next_id();
    let common = stair.common();
    SceneStair {
        id,
        kind: stair.kind().to_string(),
        name: common.name.clone(),
        vertex: ids.vertex(&common.frame.vertex),
        rotation: common.frame.rotation,
        staircase_width: round_to(common.frame.staircase_width, OUTPUT_DECIMALS),
        run_length: round_to(common.frame.run_length, OUTPUT_DECIMALS),
        no_of_treads: common.no_of_treads,
        start_level_index: common.start_level_index,
        end_level_index: common.end_level_index,
        lower_gate: ids.gate_vertices(&stair.lower_gate()),
        upper_gate: ids.gate_vertices(&stair.upper_gate()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::building::Level;
    use crate::element::{Barricade, Edge, Gate, Wall};

    fn conversion() -> Conversion {
        let p = |x: f64, y: f64| Point2D::new(x, y);
        Conversion {
            levels: vec![Level {
                index: 0,
                name: Some("Ground".into()),
                elevation: 0.0,
                elements: vec![
                    Wall::new(p(0.0, 0.0), p(4.0, 0.0)).into(),
                    Gate {
                        edge: Edge::new(p(4.0, 0.0), p(5.0, 0.0)),
                    }
                    .into(),
                    Wall::new(p(5.0, 0.0), p(10.0, 0.0)).into(),
                    Barricade {
                        edge: Edge::new(p(10.0, 0.0), p(10.0, 3.123_456_7)),
                    }
                    .into(),
                ],
            }],
            stairs: Vec::new(),
            unparsable: Vec::new(),
        }
    }

    #[test]
    fn test_ids_are_sequential_and_vertices_shared() {
        let scene = Scene::assemble(&conversion(), &SceneOptions::default());
        let level = &scene.levels[0];
        assert_eq!(level.id, 1);
        // Wall 2 with vertices 3 and 4
        assert_eq!(level.walls[0].id, 2);
        assert_eq!(level.walls[0].vertices[0].id, 3);
        assert_eq!(level.walls[0].vertices[1].id, 4);
        // Second wall reuses none, gate reuses (4,0) and (5,0)
        assert_eq!(level.walls[1].id, 5);
        assert_eq!(level.gates[0].vertices[0].id, 4);
        assert_eq!(level.gates[0].vertices[1].id, level.walls[1].vertices[0].id);
        assert_eq!(scene.vertex_count(), 5);
    }

    #[test]
    fn test_coordinates_are_offset_and_rounded() {
        let options = SceneOptions {
            origin: Point2D::new(1.0, 0.0),
            ..SceneOptions::default()
        };
        let scene = Scene::assemble(&conversion(), &options);
        let barricade = &scene.levels[0].barricades[0];
        assert_eq!(barricade.vertices[0].x, 9.0);
        assert_eq!(barricade.vertices[1].y, 3.123);
        assert_eq!(barricade.length, 3.123);
        assert_eq!(scene.levels[0].width, 100.0);
    }

    #[test]
    fn test_json_shape() {
        let scene = Scene::assemble(&conversion(), &SceneOptions::default());
        let json: serde_json::Value = serde_json::from_str(&scene.to_json().unwrap()).unwrap();
        assert_eq!(json["levels"][0]["gates"][0]["length"], 1.0);
        assert!(json["stairs"].as_array().unwrap().is_empty());
    }
}
