//! Query and simulation-tick methods for `TestMine`.

use bevy::prelude::*;

use crate::config::ScenarioConfig;
use crate::environment::Environment;
use crate::invariants::InvariantViolations;
use crate::mine::MineSnapshot;
use crate::pump::PumpController;
use crate::pump_actions::{ActionLog, ActionQueue, ActionSource, PumpAction};
use crate::scenario::ScenarioRun;
use crate::state_hash::StateHash;
use crate::TickCounter;

use super::TestMine;

impl TestMine {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by directly executing the `FixedUpdate`
    /// schedule, bypassing Bevy's time system.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Tick until the loaded scenario finishes or `max_ticks` have run.
    /// Returns the number of ticks executed.
    pub fn run_scenario_to_end(&mut self, max_ticks: u32) -> u32 {
        let mut ticks = 0;
        while ticks < max_ticks && self.scenario_run().is_active() {
            self.tick(1);
            ticks += 1;
        }
        ticks
    }

    /// Queue an agent action for the next tick.
    pub fn push_action(&mut self, action: PumpAction) {
        let tick = self.tick_count() + 1;
        self.app
            .world_mut()
            .resource_mut::<ActionQueue>()
            .push(tick, ActionSource::Agent, action);
    }

    /// Queue an action and run one tick so it executes.
    pub fn act(&mut self, action: PumpAction) -> &mut Self {
        self.push_action(action);
        self.tick(1);
        self
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<R: Resource>(&self) -> &R {
        self.app.world().resource::<R>()
    }

    pub fn config(&self) -> &ScenarioConfig {
        self.resource::<ScenarioConfig>()
    }

    pub fn tick_count(&self) -> u64 {
        self.resource::<TickCounter>().0
    }

    pub fn environment(&self) -> &Environment {
        self.resource::<Environment>()
    }

    pub fn pump(&self) -> &PumpController {
        self.resource::<PumpController>()
    }

    pub fn snapshot(&self) -> MineSnapshot {
        MineSnapshot::capture(self.environment(), self.pump())
    }

    pub fn action_log(&self) -> &ActionLog {
        self.resource::<ActionLog>()
    }

    pub fn scenario_run(&self) -> &ScenarioRun {
        self.resource::<ScenarioRun>()
    }

    pub fn state_hash(&self) -> &StateHash {
        self.resource::<StateHash>()
    }

    pub fn violations(&self) -> &InvariantViolations {
        self.resource::<InvariantViolations>()
    }
}
