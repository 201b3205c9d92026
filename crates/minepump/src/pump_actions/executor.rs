//! Action executor system: drains the [`ActionQueue`] each fixed-update tick
//! and applies every queued [`PumpAction`] to the environment and controller,
//! recording the before/after state in the [`ActionLog`].

use bevy::prelude::*;

use super::result_log::{ActionLog, ActionRecord};
use super::ActionQueue;
use crate::environment::Environment;
use crate::mine::{apply_action, MineSnapshot};
use crate::pump::PumpController;

/// Drains all pending actions from the queue and executes them in order.
pub fn execute_queued_actions(
    mut queue: ResMut<ActionQueue>,
    mut log: ResMut<ActionLog>,
    mut environment: ResMut<Environment>,
    mut pump: ResMut<PumpController>,
) {
    for queued in queue.drain() {
        let before = MineSnapshot::capture(&environment, &pump);
        apply_action(queued.action, &mut environment, &mut pump);
        let after = MineSnapshot::capture(&environment, &pump);

        debug!(
            "tick {} {:?}: {} -> {} {}",
            queued.tick,
            queued.source,
            queued.action.name(),
            environment.print_environment(),
            pump.print_pump()
        );
        if before.pump_running != after.pump_running {
            info!(
                "tick {}: pump {} (water level {})",
                queued.tick,
                if after.pump_running { "activated" } else { "deactivated" },
                after.water_level
            );
        }

        log.push(ActionRecord {
            tick: queued.tick,
            source: queued.source,
            action: queued.action,
            before,
            after,
        });
    }
}
