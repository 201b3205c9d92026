use bevy::prelude::*;

pub mod agent_protocol;
pub mod config;
pub mod environment;
pub mod explorer;
pub mod invariants;
pub mod mine;
pub mod pump;
pub mod pump_actions;
pub mod replay;
pub mod scenario;
pub mod sim_rng;
pub mod simulation_sets;
pub mod state_hash;

#[cfg(any(test, feature = "bench"))]
pub mod test_harness;


pub use simulation_sets::SimulationSet;

use config::ScenarioConfig;
use environment::Environment;
use pump::PumpController;
use sim_rng::SimRng;

// ---------------------------------------------------------------------------
// Core resources
// ---------------------------------------------------------------------------

/// Global tick counter incremented at the start of each `FixedUpdate`.
///
/// The first tick observed by the other systems is 1.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickCounter(pub u64);

pub fn tick_counter(mut tick: ResMut<TickCounter>) {
    tick.0 = tick.0.wrapping_add(1);
}

/// Registers the mine resources and every simulation plugin.
///
/// Insert a [`ScenarioConfig`] before adding the plugin to pick the control
/// policy and RNG seed; otherwise the defaults are used.
pub struct MinePumpPlugin;

impl Plugin for MinePumpPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TickCounter>()
            .init_resource::<ScenarioConfig>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::PreSim,
                    SimulationSet::Simulation,
                    SimulationSet::PostSim,
                )
                    .chain(),
            );

        let config = app.world().resource::<ScenarioConfig>().clone();
        if !app.world().contains_resource::<PumpController>() {
            app.insert_resource(PumpController::new(config.policy));
        }
        if !app.world().contains_resource::<Environment>() {
            app.insert_resource(Environment::default());
        }
        if !app.world().contains_resource::<SimRng>() {
            app.insert_resource(SimRng::from_seed_u64(config.seed));
        }

        app.add_systems(
            FixedUpdate,
            tick_counter.in_set(SimulationSet::PreSim),
        );

        app.add_plugins((
            sim_rng::SimRngPlugin,
            pump_actions::ActionsPlugin,
            scenario::ScenarioPlugin,
            invariants::InvariantsPlugin,
            state_hash::StateHashPlugin,
            replay::ReplayPlugin,
        ));

        info!(
            "Mine pump simulation ready: policy {}, seed {}",
            config.policy.name(),
            config.seed
        );
    }
}
