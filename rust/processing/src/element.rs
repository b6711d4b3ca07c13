// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building element model
//!
//! Storey-level elements are a closed sum type, [`BuildingElement`], matched
//! exhaustively by every pipeline stage. Stairs live in their own closed type
//! ([`Stair`](crate::stairs::Stair)) because they never enter the per-storey
//! pipeline; [`ElementKind`] names all six variants for reporting.

use crowdplan_geometry::{Point2D, Segment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of every element variant the converter produces
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Wall,
    WallWithOpening,
    Gate,
    Barricade,
    StraightSingleRunStair,
    DoubleRunStairWithLanding,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Wall => "Wall",
            ElementKind::WallWithOpening => "WallWithOpening",
            ElementKind::Gate => "Gate",
            ElementKind::Barricade => "Barricade",
            ElementKind::StraightSingleRunStair => "StraightSingleRunStair",
            ElementKind::DoubleRunStairWithLanding => "DoubleRunStairWithLanding",
        };
        f.write_str(name)
    }
}

/// How two walls meet
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    /// Endpoint to endpoint joint
    #[serde(rename = "ATSTART", alias = "ATEND", alias = "NOTDEFINED")]
    AtStart,
    /// One wall ends somewhere along the other (T-junction)
    #[serde(rename = "ATPATH")]
    AtPath,
}

/// A connection recorded on a wall, pointing at another wall
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Connection {
    pub other_id: String,
    pub connection_type: ConnectionType,
}

impl Connection {
    pub fn new(other_id: impl Into<String>, connection_type: ConnectionType) -> Self {
        Self {
            other_id: other_id.into(),
            connection_type,
        }
    }
}

/// Identity and geometry shared by every planar element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Edge {
    /// Opaque identifier assigned by the extraction step
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub start_vertex: Point2D,
    pub end_vertex: Point2D,
}

impl Edge {
    pub fn new(start_vertex: Point2D, end_vertex: Point2D) -> Self {
        Self {
            object_id: None,
            name: None,
            start_vertex,
            end_vertex,
        }
    }

    pub fn with_identity(mut self, object_id: Option<String>, name: Option<String>) -> Self {
        self.object_id = object_id;
        self.name = name;
        self
    }

    pub fn segment(&self) -> Segment {
        Segment::new(self.start_vertex, self.end_vertex)
    }

    pub fn length(&self) -> f64 {
        self.start_vertex.distance_to(&self.end_vertex)
    }

    /// Same identity, new geometry.
    pub fn reshaped(&self, segment: Segment) -> Self {
        Self {
            object_id: self.object_id.clone(),
            name: self.name.clone(),
            start_vertex: segment.start,
            end_vertex: segment.end,
        }
    }
}

/// A structural wall
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Wall {
    #[serde(flatten)]
    pub edge: Edge,
    /// Connections owned by this wall alone
    #[serde(default)]
    pub connected_to: Vec<Connection>,
}

impl Wall {
    pub fn new(start_vertex: Point2D, end_vertex: Point2D) -> Self {
        Self::from_edge(Edge::new(start_vertex, end_vertex))
    }

    pub fn from_edge(edge: Edge) -> Self {
        Self {
            edge,
            connected_to: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.edge.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, object_id: impl Into<String>) -> Self {
        self.edge.object_id = Some(object_id.into());
        self
    }

    pub fn is_connected_to(&self, other_id: &str) -> bool {
        self.connected_to.iter().any(|c| c.other_id == other_id)
    }
}

/// A wall that still carries door/opening spans on its axis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WallWithOpening {
    #[serde(flatten)]
    pub wall: Wall,
    /// Opening spans in the wall's frame, ideally ordered along its axis
    #[serde(default)]
    pub opening_vertices: Vec<Segment>,
}

/// A traversable doorway or opening
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Gate {
    #[serde(flatten)]
    pub edge: Edge,
}

/// A wall without a structural peer at one of its ends
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Barricade {
    #[serde(flatten)]
    pub edge: Edge,
}

/// Any element that flows through the per-storey pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum BuildingElement {
    Wall(Wall),
    WallWithOpening(WallWithOpening),
    Gate(Gate),
    Barricade(Barricade),
}

impl BuildingElement {
    pub fn kind(&self) -> ElementKind {
        match self {
            BuildingElement::Wall(_) => ElementKind::Wall,
            BuildingElement::WallWithOpening(_) => ElementKind::WallWithOpening,
            BuildingElement::Gate(_) => ElementKind::Gate,
            BuildingElement::Barricade(_) => ElementKind::Barricade,
        }
    }

    pub fn edge(&self) -> &Edge {
        match self {
            BuildingElement::Wall(w) => &w.edge,
            BuildingElement::WallWithOpening(w) => &w.wall.edge,
            BuildingElement::Gate(g) => &g.edge,
            BuildingElement::Barricade(b) => &b.edge,
        }
    }

    pub fn edge_mut(&mut self) -> &mut Edge {
        match self {
            BuildingElement::Wall(w) => &mut w.edge,
            BuildingElement::WallWithOpening(w) => &mut w.wall.edge,
            BuildingElement::Gate(g) => &mut g.edge,
            BuildingElement::Barricade(b) => &mut b.edge,
        }
    }

    /// The wall part of wall-like variants.
    pub fn as_wall(&self) -> Option<&Wall> {
        match self {
            BuildingElement::Wall(w) => Some(w),
            BuildingElement::WallWithOpening(w) => Some(&w.wall),
            BuildingElement::Gate(_) | BuildingElement::Barricade(_) => None,
        }
    }

    pub fn as_wall_mut(&mut self) -> Option<&mut Wall> {
        match self {
            BuildingElement::Wall(w) => Some(w),
            BuildingElement::WallWithOpening(w) => Some(&mut w.wall),
            BuildingElement::Gate(_) | BuildingElement::Barricade(_) => None,
        }
    }

    pub fn is_wall_like(&self) -> bool {
        self.as_wall().is_some()
    }

    pub fn object_id(&self) -> Option<&str> {
        self.edge().object_id.as_deref()
    }

    pub fn start(&self) -> Point2D {
        self.edge().start_vertex
    }

    pub fn end(&self) -> Point2D {
        self.edge().end_vertex
    }

    pub fn segment(&self) -> Segment {
        self.edge().segment()
    }

    pub fn length(&self) -> f64 {
        self.edge().length()
    }

    /// A piece of this element along `segment`, keeping its variant.
    ///
    /// Pieces never inherit connections or openings: those describe the
    /// element as a whole.
    pub fn piece(&self, segment: Segment, suffix: &str) -> BuildingElement {
        let mut edge = self.edge().reshaped(segment);
        edge.name = edge.name.map(|name| format!("{name}-{suffix}"));
        match self {
            BuildingElement::Wall(_) | BuildingElement::WallWithOpening(_) => {
                BuildingElement::Wall(Wall::from_edge(edge))
            }
            BuildingElement::Gate(_) => BuildingElement::Gate(Gate { edge }),
            BuildingElement::Barricade(_) => BuildingElement::Barricade(Barricade { edge }),
        }
    }
}

impl From<Wall> for BuildingElement {
    fn from(wall: Wall) -> Self {
        BuildingElement::Wall(wall)
    }
}

impl From<WallWithOpening> for BuildingElement {
    fn from(wall: WallWithOpening) -> Self {
        BuildingElement::WallWithOpening(wall)
    }
}

impl From<Gate> for BuildingElement {
    fn from(gate: Gate) -> Self {
        BuildingElement::Gate(gate)
    }
}

impl From<Barricade> for BuildingElement {
    fn from(barricade: Barricade) -> Self {
        BuildingElement::Barricade(barricade)
    }
}

impl fmt::Display for BuildingElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let edge = self.edge();
        write!(
            f,
            "{}({}, ({}, {}), ({}, {}))",
            self.kind(),
            edge.name.as_deref().unwrap_or("-"),
            edge.start_vertex.x,
            edge.start_vertex.y,
            edge.end_vertex.x,
            edge.end_vertex.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walls_own_independent_connection_lists() {
        let mut a = Wall::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0));
        let b = Wall::new(Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0));
        a.connected_to.push(Connection::new("b", ConnectionType::AtStart));
        assert_eq!(a.connected_to.len(), 1);
        assert!(b.connected_to.is_empty());
        assert!(Wall::default().connected_to.is_empty());
    }

    #[test]
    fn test_piece_keeps_variant_and_drops_connections() {
        let mut wall = Wall::new(Point2D::new(0.0, 0.0), Point2D::new(4.0, 0.0))
            .named("W1")
            .with_id("guid-1");
        wall.connected_to.push(Connection::new("guid-2", ConnectionType::AtPath));
        let element = BuildingElement::Wall(wall);

        let piece = element.piece(Segment::from(((0.0, 0.0), (2.0, 0.0))), "1");
        assert_eq!(piece.kind(), ElementKind::Wall);
        assert_eq!(piece.edge().name.as_deref(), Some("W1-1"));
        assert_eq!(piece.object_id(), Some("guid-1"));
        assert!(piece.as_wall().unwrap().connected_to.is_empty());

        let gate = BuildingElement::Gate(Gate {
            edge: Edge::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)),
        });
        assert_eq!(
            gate.piece(Segment::from(((0.0, 0.0), (0.5, 0.0))), "2").kind(),
            ElementKind::Gate
        );
    }

    #[test]
    fn test_serde_type_tag() {
        let element = BuildingElement::Gate(Gate {
            edge: Edge::new(Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)),
        });
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "Gate");
        assert_eq!(json["start_vertex"]["x"], 0.0);

        let parsed: BuildingElement = serde_json::from_value(serde_json::json!({
            "type": "Wall",
            "object_id": "w",
            "start_vertex": {"x": 0.0, "y": 0.0},
            "end_vertex": {"x": 3.0, "y": 4.0},
            "connected_to": [{"other_id": "v", "connection_type": "ATEND"}]
        }))
        .unwrap();
        assert_eq!(parsed.length(), 5.0);
        assert_eq!(
            parsed.as_wall().unwrap().connected_to[0].connection_type,
            ConnectionType::AtStart
        );
    }
}
