//! Bevy plugin that registers replay resources and systems.

use bevy::prelude::*;

use super::player::{feed_replay_actions, verify_replay_playback, ReplayPlayer};
use super::recorder::{record_actions, ReplayRecorder};
use crate::scenario::drive_scenario;
use crate::{tick_counter, SimulationSet};

/// Recording and playback run in `PreSim`: `feed_replay_actions` right after
/// the tick counter, `record_actions` once every source (replay and scenario)
/// has queued its actions for the tick. The playback hash check runs in
/// `PostSim`, after the executor.
pub struct ReplayPlugin;

impl Plugin for ReplayPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ReplayRecorder>();
        app.init_resource::<ReplayPlayer>();

        app.add_systems(
            FixedUpdate,
            (
                feed_replay_actions.after(tick_counter),
                record_actions
                    .after(feed_replay_actions)
                    .after(drive_scenario),
            )
                .in_set(SimulationSet::PreSim),
        );
        app.add_systems(
            FixedUpdate,
            verify_replay_playback.in_set(SimulationSet::PostSim),
        );
    }
}
