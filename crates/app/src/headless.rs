//! Headless Bevy app construction and tick driving shared by every mode.

use bevy::log::LogPlugin;
use bevy::prelude::*;

use minepump::config::ScenarioConfig;
use minepump::environment::Environment;
use minepump::mine::MineSnapshot;
use minepump::pump::PumpController;
use minepump::pump_actions::{ActionLog, ActionRecord};
use minepump::replay::{ReplayFile, ReplayRecorder};
use minepump::scenario::ScenarioRun;
use minepump::state_hash::StateHash;
use minepump::{MinePumpPlugin, TickCounter};

/// Upper bound on ticks for a single scenario run.
const MAX_SCENARIO_TICKS: u64 = 100_000;

/// Minimal app with the mine simulation. With `with_logging` the bevy
/// `LogPlugin` is added too; it writes to stderr so stdout stays
/// machine-readable.
pub fn build_app(config: &ScenarioConfig, with_logging: bool) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    if with_logging {
        app.add_plugins(LogPlugin::default());
    }
    app.insert_resource(config.clone());
    app.add_plugins(MinePumpPlugin);
    app
}

pub fn config(app: &App) -> ScenarioConfig {
    app.world().resource::<ScenarioConfig>().clone()
}

pub fn snapshot(app: &App) -> MineSnapshot {
    let world = app.world();
    MineSnapshot::capture(
        world.resource::<Environment>(),
        world.resource::<PumpController>(),
    )
}

pub fn current_tick(app: &App) -> u64 {
    app.world().resource::<TickCounter>().0
}

/// Run one `FixedUpdate` tick directly, independent of wall-clock time.
pub fn tick(app: &mut App) -> u64 {
    app.world_mut().run_schedule(FixedUpdate);
    current_tick(app)
}

/// Load a random scenario and tick until it finishes, handing every
/// executed action to `on_record`.
pub fn run_random_scenario(app: &mut App, mut on_record: impl FnMut(&ActionRecord)) -> u64 {
    let config = config(app);
    app.world_mut()
        .insert_resource(ScenarioRun::random(&config));

    let mut ticks = 0;
    while ticks < MAX_SCENARIO_TICKS && app.world().resource::<ScenarioRun>().is_active() {
        let now = tick(app);
        ticks += 1;
        app.world()
            .resource::<ActionLog>()
            .iter()
            .filter(|record| record.tick == now)
            .for_each(&mut on_record);
    }
    ticks
}

pub fn start_recording(app: &mut App) {
    let config = config(app);
    let start_tick = current_tick(app);
    let initial = snapshot(app);
    app.world_mut()
        .resource_mut::<ReplayRecorder>()
        .start(&config, start_tick, initial);
}

/// Close the recording with the current state hash and the oracle answers
/// the scenario consumed.
pub fn stop_recording(app: &mut App) -> Result<ReplayFile, String> {
    let end_tick = current_tick(app);
    let hash = app.world().resource::<StateHash>().hash;
    let answers = app.world().resource::<ScenarioRun>().answers().to_vec();
    app.world_mut()
        .resource_mut::<ReplayRecorder>()
        .stop(end_tick, hash, answers)
}
