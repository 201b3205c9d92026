//! Simulation constants and the data-driven [`ScenarioConfig`] resource.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::pump::ControlPolicy;

/// Highest discrete water level (reservoir full).
pub const MAX_WATER_LEVEL: u8 = 2;

/// Water level at process start.
pub const INITIAL_WATER_LEVEL: u8 = 1;

/// The high-water sensor sits at the top of the reservoir: it reads dry for
/// every level below this threshold.
pub const HIGH_WATER_THRESHOLD: u8 = MAX_WATER_LEVEL;

/// Number of oracle-driven iterations in one scenario.
pub const SCENARIO_STEPS: u32 = 4;

/// Forced `TimeShift` steps run after the scenario loop ends.
pub const CLEANUP_TIME_SHIFTS: u32 = 4;

/// Seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

/// Tunables for one scenario run.
///
/// Every field has a default, so a partial JSON object such as
/// `{"seed": 7}` is a valid configuration.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct ScenarioConfig {
    /// Upper bound on oracle-driven iterations.
    pub steps: u32,
    /// Number of `TimeShift` steps in the cleanup phase.
    pub cleanup_time_shifts: u32,
    /// Seed for the random decision source.
    pub seed: u64,
    /// Control policy installed in the pump controller.
    pub policy: ControlPolicy,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            steps: SCENARIO_STEPS,
            cleanup_time_shifts: CLEANUP_TIME_SHIFTS,
            seed: DEFAULT_SEED,
            policy: ControlPolicy::default(),
        }
    }
}

impl ScenarioConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid scenario config: {e}"))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}
