// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Stair shape inference
//!
//! A stair arrives as an oriented footprint rectangle, one run axis per
//! flight (bottom to top) and its common property set. Classification compares
//! the first flight's bearing with the bearing of the resultant run, from the
//! first flight's start to the last flight's end:
//!
//! - nearly equal bearings make a straight single run
//! - bearings roughly 90° apart make a double run turning at a landing
//! - anything else is unsupported
//!
//! Both shapes reduce to a [`StairFrame`], from which every gate and wall
//! edge is recomputed.

mod frame;
mod landing;
mod span;
mod straight;

pub use frame::StairFrame;
pub use landing::{DoubleRunStairWithLanding, Turn};
pub use span::{floor_span, run_height, SPAN_TOLERANCE_RATIO};
pub use straight::StraightSingleRunStair;

use crate::element::ElementKind;
use crowdplan_geometry::{compass_angle, smallest_angle_difference, Point2D, Segment};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Predefined type that marks a stair as straight regardless of its flights.
pub const STRAIGHT_RUN_STAIR: &str = "STRAIGHT_RUN_STAIR";

/// Reasons a stair cannot be converted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StairError {
    #[error("stair has no flights")]
    NoFlights,

    #[error("stair footprint has a zero-length edge")]
    DegenerateFootprint,

    #[error("unsupported flight topology: first flight and resultant run differ by {angle_difference:.1} degrees")]
    UnsupportedTopology { angle_difference: f64 },

    #[error("run line does not cross the stair footprint")]
    NoGateIntersection,

    #[error("missing property set {0}")]
    MissingPset(&'static str),
}

/// `Pset_StairCommon` values used by the converter
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StairCommonPset {
    #[serde(default, rename = "NumberOfTreads")]
    pub number_of_treads: Option<u32>,
    #[serde(default, rename = "NumberOfRiser", alias = "NumberOfRisers")]
    pub number_of_risers: Option<u32>,
    #[serde(default, rename = "RiserHeight")]
    pub riser_height: Option<f64>,
}

/// A stair as delivered by the extraction step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StairInput {
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub predefined_type: Option<String>,
    /// Oriented bounding rectangle, corners in order
    pub footprint: [Point2D; 4],
    /// Run axis of each flight, ordered bottom to top
    pub flights: Vec<Segment>,
    #[serde(default, rename = "Pset_StairCommon")]
    pub pset: Option<StairCommonPset>,
}

/// Angular thresholds used to tell stair shapes apart, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StairThresholds {
    pub straight_tolerance: f64,
    pub landing_window: (f64, f64),
}

impl Default for StairThresholds {
    fn default() -> Self {
        Self {
            straight_tolerance: 10.0,
            landing_window: (85.0, 95.0),
        }
    }
}

/// Storey context of a stair: where it starts and every storey elevation
#[derive(Debug, Clone, Copy)]
pub struct LevelContext<'a> {
    pub start_level_index: usize,
    /// Elevations of all storeys, ascending
    pub elevations: &'a [f64],
}

/// Supported stair shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StairShape {
    StraightSingleRun,
    DoubleRunWithLanding { turn: Turn },
}

/// Identity, frame and level range shared by both stair shapes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StairCommon {
    #[serde(default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub frame: StairFrame,
    #[serde(default)]
    pub no_of_treads: Option<u32>,
    pub start_level_index: usize,
    pub end_level_index: usize,
}

impl StairCommon {
    /// A single-storey stair on level 0 with no identity.
    pub fn new(frame: StairFrame) -> Self {
        Self {
            object_id: None,
            name: None,
            frame,
            no_of_treads: None,
            start_level_index: 0,
            end_level_index: 1,
        }
    }
}

/// A converted stair
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Stair {
    StraightSingleRunStair(StraightSingleRunStair),
    DoubleRunStairWithLanding(DoubleRunStairWithLanding),
}

impl Stair {
    pub fn kind(&self) -> ElementKind {
        match self {
            Stair::StraightSingleRunStair(_) => ElementKind::StraightSingleRunStair,
            Stair::DoubleRunStairWithLanding(_) => ElementKind::DoubleRunStairWithLanding,
        }
    }

    pub fn common(&self) -> &StairCommon {
        match self {
            Stair::StraightSingleRunStair(s) => &s.common,
            Stair::DoubleRunStairWithLanding(s) => &s.common,
        }
    }

    pub fn frame(&self) -> &StairFrame {
        &self.common().frame
    }

    pub fn name(&self) -> &str {
        self.common().name.as_deref().unwrap_or_default()
    }

    pub fn start_level_index(&self) -> usize {
        self.common().start_level_index
    }

    pub fn end_level_index(&self) -> usize {
        self.common().end_level_index
    }

    /// Whether the stair passes through `level` above its starting storey.
    pub fn voids_level(&self, level: usize) -> bool {
        self.start_level_index() < level && level <= self.end_level_index()
    }

    pub fn lower_gate(&self) -> Segment {
        match self {
            Stair::StraightSingleRunStair(s) => s.lower_gate(),
            Stair::DoubleRunStairWithLanding(s) => s.lower_gate(),
        }
    }

    pub fn upper_gate(&self) -> Segment {
        match self {
            Stair::StraightSingleRunStair(s) => s.upper_gate(),
            Stair::DoubleRunStairWithLanding(s) => s.upper_gate(),
        }
    }

    pub fn side_walls(&self) -> [Segment; 2] {
        match self {
            Stair::StraightSingleRunStair(s) => s.side_walls(),
            Stair::DoubleRunStairWithLanding(s) => s.side_walls(),
        }
    }

    /// Every perimeter edge; walls around the stair void on intermediate storeys.
    pub fn intermediate_perimeter_walls(&self) -> Vec<Segment> {
        match self {
            Stair::StraightSingleRunStair(s) => s.perimeter(),
            Stair::DoubleRunStairWithLanding(s) => s.perimeter(),
        }
    }

    /// Perimeter edges except the lower gate.
    pub fn lower_perimeter_walls(&self) -> Vec<Segment> {
        match self {
            Stair::StraightSingleRunStair(s) => s.lower_perimeter_walls(),
            Stair::DoubleRunStairWithLanding(s) => s.lower_perimeter_walls(),
        }
    }

    /// Perimeter edges except the upper gate.
    pub fn upper_perimeter_walls(&self) -> Vec<Segment> {
        match self {
            Stair::StraightSingleRunStair(s) => s.upper_perimeter_walls(),
            Stair::DoubleRunStairWithLanding(s) => s.upper_perimeter_walls(),
        }
    }
}

impl From<StraightSingleRunStair> for Stair {
    fn from(stair: StraightSingleRunStair) -> Self {
        Stair::StraightSingleRunStair(stair)
    }
}

impl From<DoubleRunStairWithLanding> for Stair {
    fn from(stair: DoubleRunStairWithLanding) -> Self {
        Stair::DoubleRunStairWithLanding(stair)
    }
}

/// Resultant run: first flight's start to last flight's end.
pub fn resultant_run(flights: &[Segment]) -> Option<Segment> {
    let first = flights.first()?;
    let last = flights.last()?;
    Some(Segment::new(first.start, last.end))
}

/// Decide the shape of a stair from its predefined type and flights.
pub fn classify(
    input: &StairInput,
    thresholds: &StairThresholds,
) -> Result<StairShape, StairError> {
    let (first, resultant) = match (input.flights.first(), resultant_run(&input.flights)) {
        (Some(first), Some(resultant)) => (first, resultant),
        _ => return Err(StairError::NoFlights),
    };

    if input.predefined_type.as_deref() == Some(STRAIGHT_RUN_STAIR) {
        return Ok(StairShape::StraightSingleRun);
    }

    let difference = smallest_angle_difference(
        compass_angle(&first.start, &first.end),
        compass_angle(&resultant.start, &resultant.end),
    );
    let magnitude = difference.abs();
    let (low, high) = thresholds.landing_window;

    if magnitude < thresholds.straight_tolerance {
        Ok(StairShape::StraightSingleRun)
    } else if low < magnitude && magnitude < high {
        Ok(StairShape::DoubleRunWithLanding {
            turn: Turn::from_angle_difference(difference),
        })
    } else {
        Err(StairError::UnsupportedTopology {
            angle_difference: magnitude,
        })
    }
}

/// Classify and build one stair.
pub fn build_stair(
    input: &StairInput,
    levels: LevelContext<'_>,
    thresholds: &StairThresholds,
) -> Result<Stair, StairError> {
    let stair: Stair = match classify(input, thresholds)? {
        StairShape::StraightSingleRun => build_straight_stair(input, levels)?.into(),
        StairShape::DoubleRunWithLanding { .. } => build_landing_stair(input, levels)?.into(),
    };

    let common = stair.common();
    tracing::debug!(
        name = common.name.as_deref().unwrap_or_default(),
        kind = ?stair.kind(),
        rotation = common.frame.rotation,
        width = common.frame.staircase_width,
        length = common.frame.run_length,
        start = common.start_level_index,
        end = common.end_level_index,
        "Built stair"
    );
    Ok(stair)
}

/// Build a single straight run from the resultant of all flights.
pub fn build_straight_stair(
    input: &StairInput,
    levels: LevelContext<'_>,
) -> Result<StraightSingleRunStair, StairError> {
    let resultant = resultant_run(&input.flights).ok_or(StairError::NoFlights)?;
    let pset = checked_pset(input)?;
    let frame = straight::straight_frame(&input.footprint, &resultant)?;
    Ok(StraightSingleRunStair {
        common: stair_common(input, pset, frame, levels),
    })
}

/// Build a double run turning on a landing, pivoting on the first flight.
pub fn build_landing_stair(
    input: &StairInput,
    levels: LevelContext<'_>,
) -> Result<DoubleRunStairWithLanding, StairError> {
    let first = input.flights.first().ok_or(StairError::NoFlights)?;
    let resultant = resultant_run(&input.flights).ok_or(StairError::NoFlights)?;
    let turn = Turn::from_angle_difference(smallest_angle_difference(
        compass_angle(&first.start, &first.end),
        compass_angle(&resultant.start, &resultant.end),
    ));
    let pset = checked_pset(input)?;
    let frame = landing::landing_frame(&input.footprint, first, turn)?;
    Ok(DoubleRunStairWithLanding {
        common: stair_common(input, pset, frame, levels),
        turn,
    })
}

fn checked_pset(input: &StairInput) -> Result<&StairCommonPset, StairError> {
    if footprint_edges(&input.footprint)
        .iter()
        .any(Segment::is_degenerate)
    {
        return Err(StairError::DegenerateFootprint);
    }
    input
        .pset
        .as_ref()
        .ok_or(StairError::MissingPset("Pset_StairCommon"))
}

fn stair_common(
    input: &StairInput,
    pset: &StairCommonPset,
    frame: StairFrame,
    levels: LevelContext<'_>,
) -> StairCommon {
    let start_elevation = levels
        .elevations
        .get(levels.start_level_index)
        .copied()
        .unwrap_or_default();
    let span = floor_span(start_elevation, run_height(pset), levels.elevations);

    StairCommon {
        object_id: input.object_id.clone(),
        name: input.name.clone(),
        frame,
        no_of_treads: pset.number_of_treads,
        start_level_index: levels.start_level_index,
        end_level_index: levels.start_level_index + span,
    }
}

/// Footprint edges in corner order, closing back to the first corner.
pub(crate) fn footprint_edges(footprint: &[Point2D; 4]) -> [Segment; 4] {
    let [a, b, c, d] = *footprint;
    [
        Segment::new(a, b),
        Segment::new(b, c),
        Segment::new(c, d),
        Segment::new(d, a),
    ]
}

/// Round a bearing to whole degrees in `[0, 360)`.
pub(crate) fn whole_degrees(bearing: f64) -> i32 {
    (bearing.round() as i32).rem_euclid(360)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight_input() -> StairInput {
        StairInput {
            object_id: Some("stair-1".into()),
            name: Some("Main stair".into()),
            predefined_type: None,
            footprint: [
                Point2D::new(0.0, 0.0),
                Point2D::new(2.0, 0.0),
                Point2D::new(2.0, 5.0),
                Point2D::new(0.0, 5.0),
            ],
            flights: vec![Segment::from(((1.0, 0.0), (1.0, 5.0)))],
            pset: Some(StairCommonPset {
                number_of_treads: Some(17),
                number_of_risers: Some(18),
                riser_height: Some(1.0 / 6.0),
            }),
        }
    }

    fn landing_input() -> StairInput {
        StairInput {
            object_id: Some("stair-2".into()),
            name: Some("Core stair".into()),
            predefined_type: None,
            footprint: [
                Point2D::new(0.0, 0.0),
                Point2D::new(4.0, 0.0),
                Point2D::new(4.0, 6.0),
                Point2D::new(0.0, 6.0),
            ],
            flights: vec![
                Segment::from(((1.0, 0.0), (1.0, 4.0))),
                Segment::from(((3.0, 4.0), (3.0, 0.0))),
            ],
            pset: Some(StairCommonPset::default()),
        }
    }

    const LEVELS: LevelContext<'static> = LevelContext {
        start_level_index: 0,
        elevations: &[0.0, 3.0, 6.0],
    };

    #[test]
    fn test_build_straight_stair() {
        let stair = build_stair(&straight_input(), LEVELS, &StairThresholds::default()).unwrap();
        assert_eq!(stair.kind(), ElementKind::StraightSingleRunStair);
        let frame = stair.frame();
        assert_eq!(frame.rotation, 0);
        assert_relative_eq!(frame.staircase_width, 2.0);
        assert_relative_eq!(frame.run_length, 5.0);
        assert_eq!(frame.vertex, Point2D::new(0.0, 0.0));
        assert_eq!(stair.start_level_index(), 0);
        assert_eq!(stair.end_level_index(), 1);
        assert_eq!(stair.common().no_of_treads, Some(17));

        assert_eq!(stair.lower_gate(), Segment::from(((0.0, 0.0), (2.0, 0.0))));
        assert_eq!(stair.upper_gate(), Segment::from(((0.0, 5.0), (2.0, 5.0))));
        assert_eq!(stair.intermediate_perimeter_walls().len(), 4);
        assert_eq!(stair.lower_perimeter_walls().len(), 3);
        assert_eq!(stair.upper_perimeter_walls().len(), 3);
    }

    #[test]
    fn test_build_landing_stair() {
        let stair = build_stair(&landing_input(), LEVELS, &StairThresholds::default()).unwrap();
        let Stair::DoubleRunStairWithLanding(landing) = &stair else {
            panic!("expected a landing stair, got {:?}", stair.kind());
        };
        assert_eq!(landing.turn, Turn::Clockwise);
        assert_eq!(stair.frame().vertex, Point2D::new(4.0, 6.0));
        assert_eq!(stair.frame().rotation, 180);
        // Default pset climbs one unit, short of the next storey
        assert_eq!(stair.end_level_index(), 0);
        assert!(stair.lower_gate().bounds_contain(&Point2D::new(1.0, 0.0), 1e-9));
        assert!(stair.upper_gate().bounds_contain(&Point2D::new(3.0, 0.0), 1e-9));
    }

    #[test]
    fn test_shape_builders_match_dispatch() {
        let straight = build_straight_stair(&straight_input(), LEVELS).unwrap();
        assert_eq!(
            Stair::from(straight),
            build_stair(&straight_input(), LEVELS, &StairThresholds::default()).unwrap()
        );

        let landing = build_landing_stair(&landing_input(), LEVELS).unwrap();
        assert_eq!(landing.turn, Turn::Clockwise);
        assert_eq!(
            Stair::from(landing),
            build_stair(&landing_input(), LEVELS, &StairThresholds::default()).unwrap()
        );
    }

    #[test]
    fn test_classify_counter_clockwise_landing() {
        let mut input = landing_input();
        input.flights = vec![
            Segment::from(((3.0, 0.0), (3.0, 4.0))),
            Segment::from(((1.0, 4.0), (1.0, 0.0))),
        ];
        assert_eq!(
            classify(&input, &StairThresholds::default()),
            Ok(StairShape::DoubleRunWithLanding {
                turn: Turn::CounterClockwise
            })
        );
    }

    #[test]
    fn test_predefined_straight_overrides_flights() {
        let mut input = landing_input();
        input.predefined_type = Some(STRAIGHT_RUN_STAIR.into());
        assert_eq!(
            classify(&input, &StairThresholds::default()),
            Ok(StairShape::StraightSingleRun)
        );
    }

    #[test]
    fn test_unsupported_topology() {
        let mut input = landing_input();
        // Second flight heads off at 45 degrees from the first
        input.flights = vec![
            Segment::from(((0.0, 0.0), (0.0, 4.0))),
            Segment::from(((0.0, 4.0), (4.0, 4.0))),
        ];
        let err = classify(&input, &StairThresholds::default()).unwrap_err();
        match err {
            StairError::UnsupportedTopology { angle_difference } => {
                assert_relative_eq!(angle_difference, 45.0, epsilon = 1e-9)
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_input_errors() {
        let thresholds = StairThresholds::default();

        let mut no_flights = straight_input();
        no_flights.flights.clear();
        assert_eq!(
            build_stair(&no_flights, LEVELS, &thresholds),
            Err(StairError::NoFlights)
        );

        let mut flat = straight_input();
        flat.footprint[1] = flat.footprint[0];
        assert_eq!(
            build_stair(&flat, LEVELS, &thresholds),
            Err(StairError::DegenerateFootprint)
        );

        let mut no_pset = straight_input();
        no_pset.pset = None;
        assert_eq!(
            build_stair(&no_pset, LEVELS, &thresholds),
            Err(StairError::MissingPset("Pset_StairCommon"))
        );
    }

    #[test]
    fn test_stair_serializes_with_type_tag() {
        let stair = build_stair(&straight_input(), LEVELS, &StairThresholds::default()).unwrap();
        let json = serde_json::to_value(&stair).unwrap();
        assert_eq!(json["type"], "StraightSingleRunStair");
        assert_eq!(json["rotation"], 0);
        assert_eq!(json["start_level_index"], 0);
        assert_eq!(json["vertex"]["x"], 0.0);
    }
}
