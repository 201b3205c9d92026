//! Scenario driver: turns a stream of oracle answers into pump actions.
//!
//! The driver runs a bounded number of iterations. In each one it offers the
//! actions of [`PumpAction::SCENARIO_ORDER`](crate::pump_actions::PumpAction::SCENARIO_ORDER)
//! to a [`DecisionSource`] in order and performs the first one accepted; if
//! every action is declined the loop ends early. A fixed cleanup of
//! `TimeShift` steps always follows.

pub mod decisions;
pub mod driver;
pub mod run;
pub mod systems;

pub use decisions::{ConstantDecisions, DecisionSource, RecordingDecisions, ScriptedDecisions};
pub use driver::{ScenarioDriver, ScenarioPhase, ScenarioStep, StepKind};
pub use run::{run_actions, run_scenario, specification_two, ScenarioTrace, TraceStep, SPECIFICATION_TWO};
pub use systems::{drive_scenario, ScenarioPlugin, ScenarioRun};
