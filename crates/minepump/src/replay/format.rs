//! Replay file layout and its consistency checks.
//!
//! A replay pins down a run completely: the header carries the scenario
//! configuration (policy and seed included) and the mine state recording
//! began from, the entries list every non-replay action by tick and source,
//! and the footer holds the oracle answers the scenario consumed plus the
//! state hash at the last recorded tick.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::config::ScenarioConfig;
use crate::invariants::check_invariants;
use crate::mine::MineSnapshot;
use crate::pump_actions::{ActionSource, PumpAction};
use crate::scenario::{ScenarioDriver, ScriptedDecisions};

/// Bumped on every breaking layout change.
pub const CURRENT_FORMAT_VERSION: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq)]
pub struct ReplayHeader {
    pub format_version: u32,
    /// Configuration of the recorded app. `config.policy` is installed in
    /// the controller on playback.
    pub config: ScenarioConfig,
    /// Tick counter value when recording began. Entries start one tick later.
    pub start_tick: u64,
    /// Mine state at `start_tick`.
    pub initial: MineSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq)]
pub struct ReplayEntry {
    pub tick: u64,
    pub source: ActionSource,
    pub action: PumpAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq)]
pub struct ReplayFooter {
    pub end_tick: u64,
    /// [`compute_state_hash`](crate::state_hash::compute_state_hash) at
    /// `end_tick`, or 0 when no hash was taken.
    pub final_state_hash: u64,
    pub entry_count: u64,
    /// Every oracle answer the scenario consumed, in order. Fed to a
    /// [`ScriptedDecisions`] they regenerate the scenario entries.
    pub oracle_answers: Vec<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Encode, Decode, PartialEq)]
pub struct ReplayFile {
    pub header: ReplayHeader,
    pub entries: Vec<ReplayEntry>,
    pub footer: ReplayFooter,
}

impl ReplayFile {
    pub fn to_bytes(&self) -> Vec<u8> {
        bitcode::encode(self)
    }

    /// Decode and validate a bitcode replay.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let replay: Self =
            bitcode::decode(bytes).map_err(|e| format!("bitcode decode error: {e}"))?;
        replay.validate()?;
        Ok(replay)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }

    /// Decode and validate a JSON replay.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let replay: Self =
            serde_json::from_str(json).map_err(|e| format!("JSON decode error: {e}"))?;
        replay.validate()?;
        Ok(replay)
    }

    /// Structural checks:
    /// - `header.format_version` is one this build understands
    /// - the initial state satisfies every invariant
    /// - `footer.end_tick` is not before `header.start_tick`
    /// - `footer.entry_count` matches `entries.len()`
    /// - every entry tick lies in `start_tick + 1..=end_tick`
    /// - entries are sorted by tick and none is replay-sourced
    pub fn validate(&self) -> Result<(), String> {
        let header = &self.header;
        let footer = &self.footer;

        if header.format_version != CURRENT_FORMAT_VERSION {
            return Err(format!(
                "unsupported format_version {} (expected {})",
                header.format_version, CURRENT_FORMAT_VERSION
            ));
        }

        if let Some(violation) = check_invariants(&header.initial).first() {
            return Err(format!("initial state is invalid: {violation}"));
        }

        if footer.end_tick < header.start_tick {
            return Err(format!(
                "end_tick {} is before start_tick {}",
                footer.end_tick, header.start_tick
            ));
        }

        if footer.entry_count != self.entries.len() as u64 {
            return Err(format!(
                "entry_count mismatch: footer says {} but found {} entries",
                footer.entry_count,
                self.entries.len()
            ));
        }

        let ticks = header.start_tick + 1..=footer.end_tick;
        for entry in &self.entries {
            if !ticks.contains(&entry.tick) {
                return Err(format!(
                    "entry at tick {} outside recorded range {}..={}",
                    entry.tick,
                    ticks.start(),
                    ticks.end()
                ));
            }
            if entry.source == ActionSource::Replay {
                return Err(format!("replay-sourced entry at tick {}", entry.tick));
            }
        }

        for window in self.entries.windows(2) {
            if window[1].tick < window[0].tick {
                return Err(format!(
                    "entries not sorted by tick: tick {} followed by {}",
                    window[0].tick, window[1].tick
                ));
            }
        }

        Ok(())
    }

    /// Re-run the scenario driver on the recorded oracle answers and check
    /// it yields exactly the scenario-sourced entries while consuming every
    /// answer. Recording has to start before the scenario's first tick.
    pub fn verify_oracle(&self) -> Result<(), String> {
        let answers = &self.footer.oracle_answers;
        let mut driver = ScenarioDriver::new(&self.header.config);
        let mut script = ScriptedDecisions::new(answers.clone());

        let scenario_entries = self
            .entries
            .iter()
            .filter(|entry| entry.source == ActionSource::Scenario);
        for (index, entry) in scenario_entries.enumerate() {
            match driver.next_action(&mut script) {
                Some(step) if step.action == entry.action => {}
                Some(step) => {
                    return Err(format!(
                        "scenario entry {index} at tick {} is {} but the oracle answers give {}",
                        entry.tick,
                        entry.action.name(),
                        step.action.name()
                    ))
                }
                None => {
                    return Err(format!(
                        "scenario entry {index} at tick {} is past the end of the oracle scenario",
                        entry.tick
                    ))
                }
            }
        }

        if script.consumed() != answers.len() {
            return Err(format!(
                "oracle answers unused: {} recorded, {} consumed",
                answers.len(),
                script.consumed()
            ));
        }
        Ok(())
    }
}
