//! Exhaustive exploration of every scenario the oracle can produce.
//!
//! The explorer is stateless: it re-runs the scenario from the initial state
//! once per oracle answer sequence. A run is driven by a [`ScriptedDecisions`]
//! prefix that answers `false` past its end; every `false` answered after the
//! prefix is a branch point, and flipping it to `true` yields a new prefix.
//! Each distinct answer sequence is therefore visited exactly once.

use std::collections::BTreeSet;

use bevy::log::info;
use serde::Serialize;

use crate::config::ScenarioConfig;
use crate::invariants::{check_invariants, InvariantViolation};
use crate::mine::{MinePump, MineSnapshot};
use crate::scenario::{run_scenario, ScriptedDecisions};

/// Largest `steps` value [`explore`] accepts. Path count grows as `5^steps`;
/// eight steps already means close to half a million scenario runs.
pub const MAX_EXPLORE_STEPS: u32 = 8;

/// An invariant broken somewhere along one explored path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathViolation {
    /// Oracle answers that reproduce the path.
    pub choices: Vec<bool>,
    /// Number of actions applied before the bad state (0 = initial state).
    pub depth: usize,
    pub state: MineSnapshot,
    pub violation: InvariantViolation,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExplorationReport {
    pub paths_explored: u64,
    /// Every state observed on any path, initial state included.
    pub reachable: BTreeSet<MineSnapshot>,
    pub violations: Vec<PathViolation>,
    /// Longest action sequence seen, cleanup included.
    pub max_depth: usize,
}

impl ExplorationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn summary(&self) -> String {
        format!(
            "explored {} paths, {} reachable states, max depth {}, {} violations",
            self.paths_explored,
            self.reachable.len(),
            self.max_depth,
            self.violations.len()
        )
    }
}

/// Run every oracle answer sequence allowed by `config` and check the
/// invariants after each action. Fails when `config.steps` is above
/// [`MAX_EXPLORE_STEPS`].
pub fn explore(config: &ScenarioConfig) -> Result<ExplorationReport, String> {
    if config.steps > MAX_EXPLORE_STEPS {
        return Err(format!(
            "cannot explore {} steps: at most {MAX_EXPLORE_STEPS} are supported",
            config.steps
        ));
    }

    let mut report = ExplorationReport::default();
    let mut pending: Vec<Vec<bool>> = vec![Vec::new()];

    while let Some(prefix) = pending.pop() {
        let mut mine = MinePump::with_policy(config.policy);
        let mut decisions = ScriptedDecisions::new(prefix.clone());
        let trace = run_scenario(&mut mine, config, &mut decisions);

        report.paths_explored += 1;
        report.max_depth = report.max_depth.max(trace.len());

        let history = decisions.history();
        for (depth, state) in trace.states().enumerate() {
            report.reachable.insert(state);
            for violation in check_invariants(&state) {
                report.violations.push(PathViolation {
                    choices: history.to_vec(),
                    depth,
                    state,
                    violation,
                });
            }
        }

        // Branch on every default answer given past the scripted prefix.
        for pos in prefix.len()..history.len() {
            if !history[pos] {
                let mut branch = history[..pos].to_vec();
                branch.push(true);
                pending.push(branch);
            }
        }
    }

    info!(
        "Exploration ({} policy): {}",
        config.policy.name(),
        report.summary()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pump::ControlPolicy;

    fn config(steps: u32) -> ScenarioConfig {
        ScenarioConfig {
            steps,
            ..Default::default()
        }
    }

    fn explored(config: &ScenarioConfig) -> ExplorationReport {
        explore(config).expect("steps within the cap")
    }

    #[test]
    fn test_path_counts() {
        assert_eq!(explored(&config(0)).paths_explored, 1);
        assert_eq!(explored(&config(1)).paths_explored, 6);
        assert_eq!(explored(&config(2)).paths_explored, 31);
        // 5^4 full-length paths plus 1 + 5 + 25 + 125 early exits.
        assert_eq!(explored(&ScenarioConfig::default()).paths_explored, 781);
    }

    #[test]
    fn test_default_scenario_has_no_violations() {
        let report = explored(&ScenarioConfig::default());
        assert!(report.is_ok(), "{:?}", report.violations.first());
        assert_eq!(report.max_depth, 8);
        assert!(report.reachable.iter().all(|s| s.water_level <= 2));
    }

    #[test]
    fn test_expected_states_are_reachable() {
        let report = explored(&ScenarioConfig::default());
        assert!(report.reachable.contains(&MineSnapshot::default()));
        assert!(report
            .reachable
            .iter()
            .any(|s| s.water_level == 0 && s.pump_running));
        assert!(report
            .reachable
            .iter()
            .any(|s| !s.system_active && !s.pump_running));
        assert!(report.reachable.iter().any(|s| s.methane_level_critical));
    }

    #[test]
    fn test_base_policy_never_runs_pump() {
        let report = explored(&ScenarioConfig {
            policy: ControlPolicy::Base,
            ..Default::default()
        });
        assert_eq!(report.paths_explored, 781);
        assert!(report.is_ok());
        assert!(report.reachable.iter().all(|s| !s.pump_running));
    }

    #[test]
    fn test_zero_steps_visits_cleanup_only() {
        let report = explored(&config(0));
        assert_eq!(report.max_depth, 4);
        // Initial state and the idle time shifts never move anything.
        assert_eq!(report.reachable.len(), 1);
    }

    #[test]
    fn test_rejects_steps_above_cap() {
        let err = explore(&config(MAX_EXPLORE_STEPS + 1)).unwrap_err();
        assert!(err.contains("at most 8"), "{err}");
        assert!(explore(&config(u32::MAX)).is_err());
    }

    #[test]
    fn test_summary_mentions_counts() {
        let report = explored(&config(1));
        let summary = report.summary();
        assert!(summary.contains("explored 6 paths"));
        assert!(summary.contains("0 violations"));
    }
}
