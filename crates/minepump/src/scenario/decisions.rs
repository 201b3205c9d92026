use rand::Rng;

use crate::sim_rng::SimRng;

/// Source of the scenario driver's nondeterministic choices.
///
/// Each call answers one yes/no question: "perform the action being offered
/// right now?". Swapping the source switches between random runs, scripted
/// replay and exhaustive enumeration without touching the driver.
pub trait DecisionSource {
    fn next_choice(&mut self) -> bool;
}

impl<T: DecisionSource + ?Sized> DecisionSource for &mut T {
    fn next_choice(&mut self) -> bool {
        (**self).next_choice()
    }
}

impl<T: DecisionSource + ?Sized> DecisionSource for Box<T> {
    fn next_choice(&mut self) -> bool {
        (**self).next_choice()
    }
}

/// Fair coin flips from the seeded simulation RNG.
impl DecisionSource for SimRng {
    fn next_choice(&mut self) -> bool {
        self.0.gen_bool(0.5)
    }
}

/// Answers every question the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantDecisions(pub bool);

impl DecisionSource for ConstantDecisions {
    fn next_choice(&mut self) -> bool {
        self.0
    }
}

/// Plays back a fixed answer script, then answers `false` once it runs out.
///
/// Every answer given, scripted or not, is appended to the history so a
/// caller can see exactly which choice points a run consumed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedDecisions {
    script: Vec<bool>,
    history: Vec<bool>,
}

impl ScriptedDecisions {
    pub fn new(script: Vec<bool>) -> Self {
        Self {
            script,
            history: Vec::new(),
        }
    }

    /// Script that makes the driver pick `index` in
    /// [`PumpAction::SCENARIO_ORDER`](crate::pump_actions::PumpAction::SCENARIO_ORDER)
    /// for each iteration in turn.
    pub fn from_action_indices(indices: &[usize]) -> Self {
        let mut script = Vec::new();
        for &index in indices {
            script.extend(std::iter::repeat(false).take(index));
            script.push(true);
        }
        Self::new(script)
    }

    /// Every answer given so far, in order.
    pub fn history(&self) -> &[bool] {
        &self.history
    }

    pub fn consumed(&self) -> usize {
        self.history.len()
    }

    /// Whether every scripted answer has been used.
    pub fn is_exhausted(&self) -> bool {
        self.history.len() >= self.script.len()
    }
}

impl DecisionSource for ScriptedDecisions {
    fn next_choice(&mut self) -> bool {
        let answer = self
            .script
            .get(self.history.len())
            .copied()
            .unwrap_or(false);
        self.history.push(answer);
        answer
    }
}

/// Forwards to another source and appends every answer it passes on.
///
/// The ECS scenario run wraps its oracle in this so a replay can carry the
/// exact answers that produced its actions.
pub struct RecordingDecisions<'a> {
    pub inner: &'a mut dyn DecisionSource,
    pub answers: &'a mut Vec<bool>,
}

impl DecisionSource for RecordingDecisions<'_> {
    fn next_choice(&mut self) -> bool {
        let answer = self.inner.next_choice();
        self.answers.push(answer);
        answer
    }
}
