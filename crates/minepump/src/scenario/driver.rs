use serde::{Deserialize, Serialize};

use super::DecisionSource;
use crate::config::ScenarioConfig;
use crate::pump_actions::PumpAction;

/// Where the driver is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum ScenarioPhase {
    /// Oracle-driven loop; `iteration` is the next iteration to run.
    Exploring { iteration: u32 },
    /// Forced `TimeShift` steps still to run.
    Cleanup { remaining: u32 },
    Finished,
}

/// Why a step was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepKind {
    /// Chosen by the oracle in the given loop iteration.
    Scenario { iteration: u32 },
    /// Position in a fixed action script.
    Scripted { index: u32 },
    /// Forced time shift after the loop.
    Cleanup { index: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioStep {
    pub action: PumpAction,
    pub kind: StepKind,
}

/// Resumable scenario state machine.
///
/// Produces one action per [`next_action`](Self::next_action) call so the
/// same driver can feed a tight loop or one ECS tick at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioDriver {
    steps: u32,
    cleanup_time_shifts: u32,
    phase: ScenarioPhase,
}

impl ScenarioDriver {
    pub fn new(config: &ScenarioConfig) -> Self {
        Self {
            steps: config.steps,
            cleanup_time_shifts: config.cleanup_time_shifts,
            phase: ScenarioPhase::Exploring { iteration: 0 },
        }
    }

    /// A driver that skips the oracle loop and only runs the cleanup.
    pub fn cleanup_only(config: &ScenarioConfig) -> Self {
        Self {
            steps: config.steps,
            cleanup_time_shifts: config.cleanup_time_shifts,
            phase: ScenarioPhase::Cleanup {
                remaining: config.cleanup_time_shifts,
            },
        }
    }

    pub fn phase(&self) -> ScenarioPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == ScenarioPhase::Finished
    }

    /// Advance to the next action, consulting `decisions` while in the
    /// oracle loop. Returns `None` once the cleanup is done.
    pub fn next_action(&mut self, decisions: &mut dyn DecisionSource) -> Option<ScenarioStep> {
        loop {
            match self.phase {
                ScenarioPhase::Exploring { iteration } => {
                    if iteration >= self.steps {
                        self.enter_cleanup();
                        continue;
                    }
                    let chosen = PumpAction::SCENARIO_ORDER
                        .into_iter()
                        .find(|_| decisions.next_choice());
                    match chosen {
                        Some(action) => {
                            self.phase = ScenarioPhase::Exploring {
                                iteration: iteration + 1,
                            };
                            return Some(ScenarioStep {
                                action,
                                kind: StepKind::Scenario { iteration },
                            });
                        }
                        // Every action declined: leave the loop early.
                        None => self.enter_cleanup(),
                    }
                }
                ScenarioPhase::Cleanup { remaining } => {
                    if remaining == 0 {
                        self.phase = ScenarioPhase::Finished;
                        return None;
                    }
                    self.phase = ScenarioPhase::Cleanup {
                        remaining: remaining - 1,
                    };
                    return Some(ScenarioStep {
                        action: PumpAction::TimeShift,
                        kind: StepKind::Cleanup {
                            index: self.cleanup_time_shifts - remaining,
                        },
                    });
                }
                ScenarioPhase::Finished => return None,
            }
        }
    }

    fn enter_cleanup(&mut self) {
        self.phase = ScenarioPhase::Cleanup {
            remaining: self.cleanup_time_shifts,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{ConstantDecisions, ScriptedDecisions};

    fn drain(driver: &mut ScenarioDriver, decisions: &mut dyn DecisionSource) -> Vec<ScenarioStep> {
        std::iter::from_fn(|| driver.next_action(decisions)).collect()
    }

    #[test]
    fn test_all_declined_goes_straight_to_cleanup() {
        let mut driver = ScenarioDriver::new(&ScenarioConfig::default());
        let mut decisions = ScriptedDecisions::default();
        let steps = drain(&mut driver, &mut decisions);

        assert_eq!(steps.len(), 4);
        assert!(steps.iter().all(|s| s.action == PumpAction::TimeShift));
        assert!(matches!(steps[0].kind, StepKind::Cleanup { index: 0 }));
        assert!(matches!(steps[3].kind, StepKind::Cleanup { index: 3 }));
        assert_eq!(decisions.consumed(), 5, "one full round of declines");
        assert!(driver.is_finished());
    }

    #[test]
    fn test_always_yes_picks_first_action_each_iteration() {
        let mut driver = ScenarioDriver::new(&ScenarioConfig::default());
        let steps = drain(&mut driver, &mut ConstantDecisions(true));

        assert_eq!(steps.len(), 8);
        for (i, step) in steps.iter().take(4).enumerate() {
            assert_eq!(step.action, PumpAction::WaterRise);
            assert_eq!(step.kind, StepKind::Scenario { iteration: i as u32 });
        }
        assert!(steps[4..].iter().all(|s| s.action == PumpAction::TimeShift));
    }

    #[test]
    fn test_scripted_indices_select_actions() {
        let mut driver = ScenarioDriver::new(&ScenarioConfig::default());
        let mut decisions = ScriptedDecisions::from_action_indices(&[3, 1, 4]);
        let actions: Vec<PumpAction> = drain(&mut driver, &mut decisions)
            .into_iter()
            .map(|s| s.action)
            .collect();

        assert_eq!(
            actions,
            vec![
                PumpAction::StopSystem,
                PumpAction::ChangeMethaneLevel,
                PumpAction::TimeShift,
                // fourth iteration declines everything
                PumpAction::TimeShift,
                PumpAction::TimeShift,
                PumpAction::TimeShift,
                PumpAction::TimeShift,
            ]
        );
    }

    #[test]
    fn test_each_action_offered_once_per_iteration() {
        let mut driver = ScenarioDriver::new(&ScenarioConfig {
            steps: 1,
            ..Default::default()
        });
        let mut decisions = ScriptedDecisions::default();
        driver.next_action(&mut decisions);
        assert_eq!(decisions.consumed(), PumpAction::SCENARIO_ORDER.len());
    }

    #[test]
    fn test_zero_steps_runs_only_cleanup() {
        let config = ScenarioConfig {
            steps: 0,
            cleanup_time_shifts: 2,
            ..Default::default()
        };
        let mut driver = ScenarioDriver::new(&config);
        let mut decisions = ScriptedDecisions::default();
        let steps = drain(&mut driver, &mut decisions);
        assert_eq!(steps.len(), 2);
        assert_eq!(decisions.consumed(), 0);
    }

    #[test]
    fn test_phase_progression() {
        let config = ScenarioConfig {
            steps: 1,
            cleanup_time_shifts: 1,
            ..Default::default()
        };
        let mut driver = ScenarioDriver::new(&config);
        let mut yes = ConstantDecisions(true);
        assert_eq!(driver.phase(), ScenarioPhase::Exploring { iteration: 0 });

        driver.next_action(&mut yes);
        assert_eq!(driver.phase(), ScenarioPhase::Exploring { iteration: 1 });

        driver.next_action(&mut yes);
        assert_eq!(driver.phase(), ScenarioPhase::Cleanup { remaining: 0 });

        assert!(driver.next_action(&mut yes).is_none());
        assert_eq!(driver.phase(), ScenarioPhase::Finished);
        assert!(driver.next_action(&mut yes).is_none());
    }

    #[test]
    fn test_cleanup_only_driver() {
        let mut driver = ScenarioDriver::cleanup_only(&ScenarioConfig::default());
        let steps = drain(&mut driver, &mut ConstantDecisions(true));
        assert_eq!(steps.len(), 4);
        assert!(steps.iter().all(|s| matches!(s.kind, StepKind::Cleanup { .. })));
    }
}
