// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Converter settings loaded from environment variables.

use crowdplan_processing::{ConversionConfig, OpeningStrategy};
use std::str::FromStr;

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Conversion settings, before command-line overrides.
    pub conversion: ConversionConfig,
    /// Number of worker threads for cross-storey processing.
    pub worker_threads: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = ConversionConfig::default();
        Self {
            conversion: ConversionConfig {
                close_wall_gap: env_or("CROWDPLAN_CLOSE_WALL_GAP", defaults.close_wall_gap),
                min_wall_height: env_or("CROWDPLAN_MIN_WALL_HEIGHT", defaults.min_wall_height),
                wall_offset_tolerance: env_or(
                    "CROWDPLAN_WALL_OFFSET_TOLERANCE",
                    defaults.wall_offset_tolerance,
                ),
                opening_strategy: env_or::<OpeningStrategy>(
                    "CROWDPLAN_OPENING_STRATEGY",
                    defaults.opening_strategy,
                ),
                ..defaults
            },
            worker_threads: std::env::var("CROWDPLAN_WORKER_THREADS")
                .ok()
                .and_then(|v| v.parse().ok()),
        }
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!(
                variable = name,
                value = %value,
                "Ignoring unparsable environment variable"
            );
            default
        }),
        Err(_) => default,
    }
}
