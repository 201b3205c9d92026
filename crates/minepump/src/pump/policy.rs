use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use super::PumpController;
use crate::environment::Environment;

/// Control behaviour evaluated by [`PumpController::time_shift`] while the
/// system is active. Chosen once, when the controller is built.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Encode, Decode,
)]
#[serde(rename_all = "snake_case")]
pub enum ControlPolicy {
    /// Empty base behaviour: the environment is observed but nothing changes.
    Base,
    /// Switch the pump on when the high-water sensor is wet and the pump is
    /// off; otherwise defer to [`ControlPolicy::Base`].
    ///
    /// The methane alarm is not consulted.
    #[default]
    HighWaterActivation,
}

impl ControlPolicy {
    /// Stable name for logs and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            ControlPolicy::Base => "base",
            ControlPolicy::HighWaterActivation => "high_water_activation",
        }
    }

    /// Parse the name produced by [`ControlPolicy::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "base" => Some(ControlPolicy::Base),
            "high_water_activation" => Some(ControlPolicy::HighWaterActivation),
            _ => None,
        }
    }

    pub fn process_environment(self, pump: &mut PumpController, env: &Environment) {
        match self {
            ControlPolicy::Base => {}
            ControlPolicy::HighWaterActivation => {
                if !pump.is_pump_running() && pump.is_high_water_level(env) {
                    pump.activate_pump();
                } else {
                    ControlPolicy::Base.process_environment(pump, env);
                }
            }
        }
    }
}
