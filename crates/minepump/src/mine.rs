//! One self-contained simulation instance: environment plus controller.
//!
//! `MinePump` is the non-ECS entry point used by the scenario runner, the
//! explorer and pure replay. The ECS executor shares [`apply_action`] with it
//! so both paths mutate state identically.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::pump::{ControlPolicy, PumpController};
use crate::pump_actions::PumpAction;

/// Value snapshot of the four state variables.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
pub struct MineSnapshot {
    pub water_level: u8,
    pub methane_level_critical: bool,
    pub pump_running: bool,
    pub system_active: bool,
}

impl MineSnapshot {
    pub fn capture(env: &Environment, pump: &PumpController) -> Self {
        Self {
            water_level: env.water_level(),
            methane_level_critical: env.is_methane_level_critical(),
            pump_running: pump.is_pump_running(),
            system_active: pump.is_system_active(),
        }
    }
}

impl Default for MineSnapshot {
    fn default() -> Self {
        MinePump::default().snapshot()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MinePump {
    pub environment: Environment,
    pub controller: PumpController,
}

impl MinePump {
    /// Default start state with a specific control policy.
    pub fn with_policy(policy: ControlPolicy) -> Self {
        Self {
            environment: Environment::default(),
            controller: PumpController::new(policy),
        }
    }

    /// Rebuild an instance from a snapshot.
    pub fn from_snapshot(snapshot: MineSnapshot, policy: ControlPolicy) -> Self {
        Self {
            environment: Environment::new(snapshot.water_level, snapshot.methane_level_critical),
            controller: PumpController::from_parts(
                snapshot.pump_running,
                snapshot.system_active,
                policy,
            ),
        }
    }

    pub fn apply(&mut self, action: PumpAction) {
        apply_action(action, &mut self.environment, &mut self.controller);
    }

    pub fn time_shift(&mut self) {
        self.controller.time_shift(&mut self.environment);
    }

    pub fn snapshot(&self) -> MineSnapshot {
        MineSnapshot::capture(&self.environment, &self.controller)
    }

    /// `Env(...) Pump(...)` status line.
    pub fn describe(&self) -> String {
        format!(
            "{} {}",
            self.environment.print_environment(),
            self.controller.print_pump()
        )
    }
}

/// Dispatch one scenario action onto the environment and controller.
pub fn apply_action(action: PumpAction, env: &mut Environment, pump: &mut PumpController) {
    match action {
        PumpAction::WaterRise => env.water_rise(),
        PumpAction::ChangeMethaneLevel => env.change_methane_level(),
        PumpAction::StartSystem => pump.start_system(),
        PumpAction::StopSystem => pump.stop_system(),
        PumpAction::TimeShift => pump.time_shift(env),
    }
}
