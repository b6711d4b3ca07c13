// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Crowdplan Processing
//!
//! Reduces a building's planar wall, opening and stair geometry into clean
//! walls, gates, barricades and multi-storey stairs for crowd simulation.
//!
//! ## Pipeline
//!
//! Each storey runs the same sequential stages: connection inference and
//! gluing, opening decomposition, intersection splitting, gap closing and
//! barricade reclassification. Stairs are built once per building and add
//! border walls to every storey they pass through. Storeys are independent
//! and are processed in parallel with rayon.
//!
//! ```rust,ignore
//! use crowdplan_processing::{convert_building, BuildingInput, ConversionConfig, Scene, SceneOptions};
//!
//! let input: BuildingInput = serde_json::from_str(&document)?;
//! let conversion = convert_building(&input, &ConversionConfig::default())?;
//! let scene = Scene::assemble(&conversion, &SceneOptions::default());
//! println!("{}", scene.to_json()?);
//! ```

pub mod barricades;
pub mod border;
pub mod building;
pub mod config;
pub mod connections;
pub mod element;
pub mod error;
pub mod incidence;
pub mod openings;
pub mod scene;
pub mod splitting;
pub mod stairs;
pub mod storey;

pub use barricades::reclassify_barricades;
pub use border::border_walls_for_storey;
pub use building::{
    assign_walls_to_storeys, convert_building, BuildingInput, Conversion, Level, StoreyInput,
    UnsupportedCategory, UnsupportedObject, Unparsable, WallInput,
};
pub use config::ConversionConfig;
pub use connections::{close_gaps, glue, infer_connections, CONNECTOR_NAME};
pub use element::{
    Barricade, BuildingElement, Connection, ConnectionType, Edge, ElementKind, Gate, Wall,
    WallWithOpening,
};
pub use error::{Error, Result};
pub use openings::{decompose_openings, decompose_wall, Decomposition, OpeningStrategy};
pub use scene::{Scene, SceneOptions};
pub use splitting::{split_intersections, split_intersections_capped, SplitResult};
pub use stairs::{
    build_landing_stair, build_stair, build_straight_stair, classify, DoubleRunStairWithLanding,
    LevelContext, Stair, StairCommonPset, StairError, StairInput, StairShape, StairThresholds,
    StraightSingleRunStair, Turn,
};
pub use storey::{process_storey, process_storey_with, PipelineOptions, StoreyElements};

// Re-export the geometry layer
pub use crowdplan_geometry as geometry;
