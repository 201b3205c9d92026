use bevy::prelude::*;

use super::{DecisionSource, RecordingDecisions, ScenarioDriver, ScenarioPhase, ScriptedDecisions};
use crate::config::ScenarioConfig;
use crate::pump_actions::{ActionQueue, ActionSource};
use crate::sim_rng::SimRng;
use crate::{tick_counter, SimulationSet, TickCounter};

/// A scenario being played one action per tick.
///
/// Without a script the oracle is the shared [`SimRng`] resource. Every
/// answer the oracle gives is kept in `answers`, whatever its source.
#[derive(Resource, Debug, Clone, Default)]
pub struct ScenarioRun {
    driver: Option<ScenarioDriver>,
    script: Option<ScriptedDecisions>,
    answers: Vec<bool>,
}

impl ScenarioRun {
    /// Random scenario drawing decisions from [`SimRng`].
    pub fn random(config: &ScenarioConfig) -> Self {
        Self {
            driver: Some(ScenarioDriver::new(config)),
            script: None,
            answers: Vec::new(),
        }
    }

    /// Scenario driven by a fixed answer script.
    pub fn scripted(config: &ScenarioConfig, script: ScriptedDecisions) -> Self {
        Self {
            driver: Some(ScenarioDriver::new(config)),
            script: Some(script),
            answers: Vec::new(),
        }
    }

    /// Whether a scenario is loaded and has actions left.
    pub fn is_active(&self) -> bool {
        self.driver
            .as_ref()
            .is_some_and(|driver| !driver.is_finished())
    }

    pub fn phase(&self) -> Option<ScenarioPhase> {
        self.driver.as_ref().map(ScenarioDriver::phase)
    }

    /// Oracle answers consumed so far. Feeding them to a
    /// [`ScriptedDecisions`] reproduces the same actions.
    pub fn answers(&self) -> &[bool] {
        &self.answers
    }

    /// Answers consumed by a scripted run so far.
    pub fn script_history(&self) -> Option<&[bool]> {
        self.script.as_ref().map(ScriptedDecisions::history)
    }
}

/// Pushes the next scenario action, if any, into the [`ActionQueue`].
pub fn drive_scenario(
    tick: Res<TickCounter>,
    mut run: ResMut<ScenarioRun>,
    mut rng: ResMut<SimRng>,
    mut queue: ResMut<ActionQueue>,
) {
    if !run.is_active() {
        return;
    }
    let ScenarioRun {
        driver,
        script,
        answers,
    } = &mut *run;
    let Some(driver) = driver.as_mut() else {
        return;
    };

    let inner: &mut dyn DecisionSource = match script.as_mut() {
        Some(script) => script,
        None => &mut *rng,
    };
    let step = driver.next_action(&mut RecordingDecisions { inner, answers });
    match step {
        Some(step) => queue.push(tick.0, ActionSource::Scenario, step.action),
        None => info!("Scenario finished at tick {}", tick.0),
    }
}

pub struct ScenarioPlugin;

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ScenarioRun>();

        app.add_systems(
            FixedUpdate,
            drive_scenario
                .in_set(SimulationSet::PreSim)
                .after(tick_counter),
        );
    }
}
