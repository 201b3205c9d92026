//! Runtime invariant validation for the mine state.
//!
//! Validated invariants:
//! 1. **Water level range**: the level stays within `0..=MAX_WATER_LEVEL`.
//! 2. **Pump shutdown**: the pump never runs while the system is inactive.
//!
//! The pure [`check_invariants`] is used by the explorer; the ECS system
//! logs a warning for each violation and counts them for integration tests.

use std::fmt;

use bevy::prelude::*;
use serde::Serialize;

use crate::config::MAX_WATER_LEVEL;
use crate::environment::Environment;
use crate::mine::MineSnapshot;
use crate::pump::PumpController;
use crate::SimulationSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "invariant", rename_all = "snake_case")]
pub enum InvariantViolation {
    WaterLevelOutOfRange { level: u8 },
    PumpRunningWhileInactive,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantViolation::WaterLevelOutOfRange { level } => {
                write!(f, "water level {level} outside 0..={MAX_WATER_LEVEL}")
            }
            InvariantViolation::PumpRunningWhileInactive => {
                write!(f, "pump running while the system is inactive")
            }
        }
    }
}

/// Every invariant the state breaks, in a fixed order.
pub fn check_invariants(state: &MineSnapshot) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    if state.water_level > MAX_WATER_LEVEL {
        violations.push(InvariantViolation::WaterLevelOutOfRange {
            level: state.water_level,
        });
    }
    if state.pump_running && !state.system_active {
        violations.push(InvariantViolation::PumpRunningWhileInactive);
    }
    violations
}

/// Cumulative violation counts seen by [`validate_invariants`].
#[derive(Resource, Default, Debug)]
pub struct InvariantViolations {
    pub water_level_out_of_range: u32,
    pub pump_running_while_inactive: u32,
}

impl InvariantViolations {
    pub fn total(&self) -> u32 {
        self.water_level_out_of_range + self.pump_running_while_inactive
    }
}

pub fn validate_invariants(
    environment: Res<Environment>,
    pump: Res<PumpController>,
    mut violations: ResMut<InvariantViolations>,
) {
    let state = MineSnapshot::capture(&environment, &pump);
    for violation in check_invariants(&state) {
        warn!("Invariant violation: {violation} ({state:?})");
        match violation {
            InvariantViolation::WaterLevelOutOfRange { .. } => {
                violations.water_level_out_of_range += 1;
            }
            InvariantViolation::PumpRunningWhileInactive => {
                violations.pump_running_while_inactive += 1;
            }
        }
    }
}

pub struct InvariantsPlugin;

impl Plugin for InvariantsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InvariantViolations>();
        app.add_systems(
            FixedUpdate,
            validate_invariants.in_set(SimulationSet::PostSim),
        );
    }
}
