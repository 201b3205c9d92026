//! # TestMine: headless integration test harness
//!
//! Wraps `bevy::app::App` + `MinePumpPlugin` so tests (and benches, behind
//! the `bench` feature) can drive the ECS mine tick by tick without a
//! window or a real clock.

mod assertions;
mod queries;

use bevy::app::App;
use bevy::prelude::*;

use crate::config::ScenarioConfig;
use crate::replay::{ReplayFile, ReplayPlayer, ReplayRecorder};
use crate::scenario::{ScenarioRun, ScriptedDecisions};
use crate::state_hash::StateHash;
use crate::{MinePumpPlugin, TickCounter};

/// A headless Bevy App wrapping `MinePumpPlugin` for integration testing.
///
/// Use builder methods to pick a scenario source, then call `tick()` to
/// advance the simulation and query/assert on the resulting ECS state.
pub struct TestMine {
    app: App,
}

impl Default for TestMine {
    fn default() -> Self {
        Self::new()
    }
}

impl TestMine {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// A mine in its initial state with the default configuration and no
    /// scenario loaded.
    pub fn new() -> Self {
        Self::with_config(ScenarioConfig::default())
    }

    /// A mine built from `config` (policy and RNG seed are taken from it).
    pub fn with_config(config: ScenarioConfig) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        // Insert the config BEFORE the plugin so it picks up the policy.
        app.insert_resource(config);
        app.add_plugins(MinePumpPlugin);
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Scenario sources
    // -----------------------------------------------------------------------

    /// Load a random scenario drawing from the seeded `SimRng`.
    pub fn with_random_scenario(mut self) -> Self {
        let config = self.config().clone();
        self.app
            .world_mut()
            .insert_resource(ScenarioRun::random(&config));
        self
    }

    /// Load a scenario answered by a fixed oracle script.
    pub fn with_script(mut self, script: ScriptedDecisions) -> Self {
        let config = self.config().clone();
        self.app
            .world_mut()
            .insert_resource(ScenarioRun::scripted(&config, script));
        self
    }

    /// Queue a replay file for playback from the next tick on. The first
    /// played tick restores the recorded start state and policy.
    pub fn with_replay(mut self, replay: ReplayFile) -> Self {
        let tick = self.current_tick();
        self.app
            .world_mut()
            .resource_mut::<ReplayPlayer>()
            .load(replay, tick)
            .expect("replay should be valid");
        self
    }

    /// Start capturing every non-replay action from the next tick on.
    pub fn with_recording(mut self) -> Self {
        let config = self.config().clone();
        let tick = self.current_tick();
        let initial = self.snapshot();
        self.app
            .world_mut()
            .resource_mut::<ReplayRecorder>()
            .start(&config, tick, initial);
        self
    }

    /// Finish recording, stamping the footer with the latest state hash and
    /// the oracle answers the scenario consumed.
    pub fn stop_recording(&mut self) -> ReplayFile {
        let tick = self.current_tick();
        let hash = self.app.world().resource::<StateHash>().hash;
        let answers = self.scenario_run().answers().to_vec();
        self.app
            .world_mut()
            .resource_mut::<ReplayRecorder>()
            .stop(tick, hash, answers)
            .expect("recording should produce a valid replay")
    }

    fn current_tick(&self) -> u64 {
        self.app.world().resource::<TickCounter>().0
    }
}
