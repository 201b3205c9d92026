//! Plugin that wires up the pump-actions subsystem: queue, executor, and log.

use bevy::prelude::*;

use super::executor::execute_queued_actions;
use super::result_log::ActionLog;
use super::ActionQueue;
use crate::SimulationSet;

/// Registers the action queue, action log, and executor system.
pub struct ActionsPlugin;

impl Plugin for ActionsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActionQueue>();
        app.init_resource::<ActionLog>();

        app.add_systems(
            FixedUpdate,
            execute_queued_actions.in_set(SimulationSet::Simulation),
        );
    }
}
