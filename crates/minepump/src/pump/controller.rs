use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::ControlPolicy;
use crate::environment::Environment;

/// Pump actuator and system switch.
///
/// The pump drains one water level per [`time_shift`](Self::time_shift)
/// while it runs. [`stop_system`](Self::stop_system) switches the pump off
/// before deactivating the system, so the pump is never left running while
/// the system is inactive.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PumpController {
    pump_running: bool,
    system_active: bool,
    policy: ControlPolicy,
}

impl Default for PumpController {
    fn default() -> Self {
        Self::new(ControlPolicy::default())
    }
}

impl PumpController {
    /// Pump off, system active, running the given policy.
    pub fn new(policy: ControlPolicy) -> Self {
        Self {
            pump_running: false,
            system_active: true,
            policy,
        }
    }

    /// Restore a controller at an arbitrary flag combination.
    pub fn from_parts(pump_running: bool, system_active: bool, policy: ControlPolicy) -> Self {
        Self {
            pump_running,
            system_active,
            policy,
        }
    }

    /// Policy evaluated on every active `time_shift`.
    pub fn policy(&self) -> ControlPolicy {
        self.policy
    }

    /// Switch the pump on regardless of the system switch.
    pub fn activate_pump(&mut self) {
        self.pump_running = true;
    }

    /// Switch the pump off.
    pub fn deactivate_pump(&mut self) {
        self.pump_running = false;
    }

    pub fn is_pump_running(&self) -> bool {
        self.pump_running
    }

    pub fn is_system_active(&self) -> bool {
        self.system_active
    }

    /// Reads the methane flag. No policy consults it.
    pub fn is_methane_alarm(&self, env: &Environment) -> bool {
        env.is_methane_level_critical()
    }

    /// True when the high-water sensor is wet.
    pub fn is_high_water_level(&self, env: &Environment) -> bool {
        !env.is_high_water_sensor_dry()
    }

    /// Re-enable the system. The pump stays off until the policy switches
    /// it on during a later `time_shift`.
    pub fn start_system(&mut self) {
        self.system_active = true;
    }

    /// Switch the pump off first, then deactivate the system, so there is
    /// never a state with the pump running and the system inactive.
    pub fn stop_system(&mut self) {
        if self.pump_running {
            self.deactivate_pump();
        }
        self.system_active = false;
    }

    /// One discrete tick: drain while the pump runs, then evaluate the
    /// control policy if the system is active.
    pub fn time_shift(&mut self, env: &mut Environment) {
        if self.pump_running {
            env.lower_water_level();
        }
        if self.system_active {
            let policy = self.policy;
            policy.process_environment(self, env);
        }
    }

    /// Compact one-line rendering, e.g. `Pump(System:On,Pump:Off)`.
    pub fn print_pump(&self) -> String {
        format!(
            "Pump(System:{},Pump:{})",
            on_off(self.system_active),
            on_off(self.pump_running)
        )
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "On"
    } else {
        "Off"
    }
}
