// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Conversion settings.

use crate::openings::OpeningStrategy;
use crate::stairs::StairThresholds;
use serde::{Deserialize, Serialize};

/// Settings for one building conversion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionConfig {
    /// Gluing and gap-closing tolerance in metres (0 disables both)
    pub close_wall_gap: f64,
    /// Minimum vertical wall extent above a storey for the wall to belong to it
    pub min_wall_height: f64,
    /// Allowed vertical gap between a wall base and the storey elevation
    pub wall_offset_tolerance: f64,
    /// How openings are laid out along their host wall
    pub opening_strategy: OpeningStrategy,
    /// Override of the splitting iteration cap
    pub split_iteration_cap: Option<usize>,
    /// Largest bearing difference for a straight stair (degrees)
    pub straight_tolerance_deg: f64,
    /// Open bearing difference window for a stair with a landing (degrees)
    pub landing_window_deg: (f64, f64),
}

impl Default for ConversionConfig {
    fn default() -> Self {
        let thresholds = StairThresholds::default();
        Self {
            close_wall_gap: 0.0,
            min_wall_height: 0.5,
            wall_offset_tolerance: 0.1,
            opening_strategy: OpeningStrategy::default(),
            split_iteration_cap: None,
            straight_tolerance_deg: thresholds.straight_tolerance,
            landing_window_deg: thresholds.landing_window,
        }
    }
}

impl ConversionConfig {
    pub fn stair_thresholds(&self) -> StairThresholds {
        StairThresholds {
            straight_tolerance: self.straight_tolerance_deg,
            landing_window: self.landing_window_deg,
        }
    }

    /// Whether connection inference, gluing and gap closing run at all.
    pub fn glues_walls(&self) -> bool {
        self.close_wall_gap > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::default();
        assert_eq!(config.close_wall_gap, 0.0);
        assert!(!config.glues_walls());
        assert_eq!(config.opening_strategy, OpeningStrategy::Containment);
        assert_eq!(config.stair_thresholds(), StairThresholds::default());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ConversionConfig =
            serde_json::from_str(r#"{"close_wall_gap": 0.1, "opening_strategy": "chaining"}"#)
                .unwrap();
        assert!(config.glues_walls());
        assert_eq!(config.opening_strategy, OpeningStrategy::Chaining);
        assert_eq!(config.min_wall_height, 0.5);
        assert_eq!(config.landing_window_deg, (85.0, 95.0));
    }
}
