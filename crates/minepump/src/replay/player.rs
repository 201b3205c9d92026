//! Replay player: feeds recorded `PumpAction`s into the `ActionQueue` at the
//! matching tick, or replays a file directly against a [`MinePump`].
//!
//! Playback can start at any tick. The first played tick restores the
//! recorded initial state and control policy; the tick that lines up with
//! `footer.end_tick` compares the state hash against the footer and ends
//! playback with a [`PlaybackOutcome`].

use bevy::prelude::*;

use crate::environment::Environment;
use crate::mine::{MinePump, MineSnapshot};
use crate::pump::PumpController;
use crate::pump_actions::{ActionQueue, ActionSource, PumpAction};
use crate::state_hash::compute_state_hash;
use crate::TickCounter;

use super::format::ReplayFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// State at the recorded end tick hashes to the footer's value.
    Matched,
    Diverged { expected: u64, actual: u64 },
    /// The footer carries no state hash.
    Unchecked,
}

#[derive(Resource, Debug, Default)]
pub struct ReplayPlayer {
    replay: Option<ReplayFile>,
    /// Index into `replay.entries`; entries before this index have been fed.
    cursor: usize,
    /// Tick counter value at load, lined up with `header.start_tick`.
    base_tick: u64,
    needs_restore: bool,
    outcome: Option<PlaybackOutcome>,
}

impl ReplayPlayer {
    /// Validate `replay` and start playing it from the tick after
    /// `current_tick`.
    pub fn load(&mut self, replay: ReplayFile, current_tick: u64) -> Result<(), String> {
        replay.validate()?;
        self.replay = Some(replay);
        self.cursor = 0;
        self.base_tick = current_tick;
        self.needs_restore = true;
        self.outcome = None;
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.replay.is_some() && self.outcome.is_none()
    }

    /// Whether every entry has been fed.
    pub fn is_finished(&self) -> bool {
        match &self.replay {
            Some(replay) => self.cursor >= replay.entries.len(),
            None => true,
        }
    }

    /// Result of the end-of-playback hash check, once it has run.
    pub fn outcome(&self) -> Option<PlaybackOutcome> {
        self.outcome
    }

    /// Map a live tick onto the recording's tick numbering.
    pub fn recorded_tick(&self, tick: u64) -> Option<u64> {
        let replay = self.replay.as_ref()?;
        let elapsed = tick.checked_sub(self.base_tick)?;
        Some(replay.header.start_tick + elapsed)
    }

    /// Return all actions recorded for the live `tick` and advance the
    /// cursor past them.
    pub fn actions_for_tick(&mut self, tick: u64) -> Vec<PumpAction> {
        if !self.is_playing() {
            return Vec::new();
        }
        let Some(recorded) = self.recorded_tick(tick) else {
            return Vec::new();
        };
        let Some(replay) = &self.replay else {
            return Vec::new();
        };

        let mut actions = Vec::new();
        while let Some(entry) = replay.entries.get(self.cursor) {
            if entry.tick > recorded {
                break;
            }
            if entry.tick == recorded {
                actions.push(entry.action);
            }
            self.cursor += 1;
        }
        actions
    }

    /// Stop playback and release the replay data.
    pub fn stop(&mut self) {
        *self = Self::default();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Initial state and policy to install before the first played tick.
    fn take_restore(&mut self) -> Option<MinePump> {
        if !std::mem::take(&mut self.needs_restore) {
            return None;
        }
        let header = &self.replay.as_ref()?.header;
        Some(MinePump::from_snapshot(header.initial, header.config.policy))
    }
}

/// Restores the recorded start state on the first played tick, then queues
/// the tick's recorded actions as `ActionSource::Replay`.
pub fn feed_replay_actions(
    tick: Res<TickCounter>,
    mut player: ResMut<ReplayPlayer>,
    mut queue: ResMut<ActionQueue>,
    mut environment: ResMut<Environment>,
    mut pump: ResMut<PumpController>,
) {
    if !player.is_playing() {
        return;
    }
    if let Some(start) = player.take_restore() {
        info!(
            "Replay playback from tick {}: {} under the {} policy",
            tick.0,
            start.describe(),
            start.controller.policy().name()
        );
        *environment = start.environment;
        *pump = start.controller;
    }
    for action in player.actions_for_tick(tick.0) {
        queue.push(tick.0, ActionSource::Replay, action);
    }
}

/// On the tick lined up with `footer.end_tick`, compares the live state hash
/// with the recorded one and ends playback.
pub fn verify_replay_playback(
    tick: Res<TickCounter>,
    environment: Res<Environment>,
    pump: Res<PumpController>,
    mut player: ResMut<ReplayPlayer>,
) {
    if !player.is_playing() {
        return;
    }
    let (Some(recorded), Some(replay)) = (player.recorded_tick(tick.0), player.replay.as_ref())
    else {
        return;
    };
    let end_tick = replay.footer.end_tick;
    let expected = replay.footer.final_state_hash;
    if recorded < end_tick {
        return;
    }

    let outcome = if expected == 0 {
        info!("Replay finished at tick {} (no state hash recorded)", tick.0);
        PlaybackOutcome::Unchecked
    } else {
        let actual = compute_state_hash(end_tick, &MineSnapshot::capture(&environment, &pump));
        if actual == expected {
            info!("Replay finished at tick {}: state hash matches", tick.0);
            PlaybackOutcome::Matched
        } else {
            warn!(
                "Replay diverged at recorded tick {end_tick}: expected hash {expected:#018x}, got {actual:#018x}"
            );
            PlaybackOutcome::Diverged { expected, actual }
        }
    };
    player.outcome = Some(outcome);
}

/// Replay a file against a fresh [`MinePump`] without an ECS app.
///
/// The file must validate and its scenario entries must follow from the
/// recorded oracle answers. When the footer carries a non-zero state hash,
/// the final state must hash to the same value at `footer.end_tick`.
pub fn replay_pure(replay: &ReplayFile) -> Result<MinePump, String> {
    replay.validate()?;
    replay.verify_oracle()?;

    let header = &replay.header;
    let mut mine = MinePump::from_snapshot(header.initial, header.config.policy);
    for entry in &replay.entries {
        mine.apply(entry.action);
    }

    if replay.footer.final_state_hash != 0 {
        let hash = compute_state_hash(replay.footer.end_tick, &mine.snapshot());
        if hash != replay.footer.final_state_hash {
            return Err(format!(
                "final state hash mismatch at tick {}: expected {:#018x}, got {:#018x}",
                replay.footer.end_tick, replay.footer.final_state_hash, hash
            ));
        }
    }
    Ok(mine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pump::ControlPolicy;
    use crate::replay::format::tests::sample_replay;

    #[test]
    fn feeds_correct_actions_for_each_tick() {
        let mut player = ReplayPlayer::default();
        player.load(sample_replay(), 0).expect("valid replay");

        assert!(player.is_playing());
        assert!(!player.is_finished());

        assert!(player.actions_for_tick(0).is_empty());
        assert_eq!(player.actions_for_tick(1), vec![PumpAction::WaterRise]);
        assert_eq!(
            player.actions_for_tick(2),
            vec![PumpAction::TimeShift, PumpAction::ChangeMethaneLevel]
        );
        for tick in 3..=6 {
            assert_eq!(player.actions_for_tick(tick), vec![PumpAction::TimeShift]);
        }
        assert!(player.is_finished());
        assert!(player.actions_for_tick(7).is_empty());
    }

    #[test]
    fn offsets_ticks_when_loaded_mid_run() {
        let mut player = ReplayPlayer::default();
        player.load(sample_replay(), 100).expect("valid replay");

        assert_eq!(player.recorded_tick(99), None);
        assert_eq!(player.recorded_tick(101), Some(1));
        assert!(player.actions_for_tick(1).is_empty());
        assert_eq!(player.actions_for_tick(101), vec![PumpAction::WaterRise]);
    }

    #[test]
    fn skips_entries_for_past_ticks() {
        let mut player = ReplayPlayer::default();
        player.load(sample_replay(), 0).expect("valid replay");
        assert_eq!(player.actions_for_tick(3), vec![PumpAction::TimeShift]);
        assert_eq!(player.cursor(), 4);
    }

    #[test]
    fn load_rejects_invalid_file() {
        let mut replay = sample_replay();
        replay.footer.end_tick = 2;
        let mut player = ReplayPlayer::default();
        assert!(player.load(replay, 0).is_err());
        assert!(!player.is_playing());
    }

    #[test]
    fn restore_uses_header_state_once() {
        let mut replay = sample_replay();
        replay.header.config.policy = ControlPolicy::Base;
        replay.header.initial.water_level = 2;

        let mut player = ReplayPlayer::default();
        player.load(replay, 0).expect("valid replay");
        let start = player.take_restore().expect("restore pending");
        assert_eq!(start.controller.policy(), ControlPolicy::Base);
        assert_eq!(start.environment.water_level(), 2);
        assert!(player.take_restore().is_none());
    }

    #[test]
    fn stop_clears_state() {
        let mut player = ReplayPlayer::default();
        player.load(sample_replay(), 0).expect("valid replay");
        player.stop();

        assert!(!player.is_playing());
        assert!(player.is_finished());
        assert_eq!(player.cursor(), 0);
        assert!(player.outcome().is_none());
        assert!(player.actions_for_tick(1).is_empty());
    }

    #[test]
    fn replay_pure_reproduces_state() {
        let mine = replay_pure(&sample_replay()).expect("valid replay");
        // rise to 2, time shift starts the pump, methane on, later shifts drain to 0
        assert_eq!(
            mine.snapshot(),
            MineSnapshot {
                water_level: 0,
                methane_level_critical: true,
                pump_running: true,
                system_active: true,
            }
        );
    }

    #[test]
    fn replay_pure_checks_hash() {
        let mut replay = sample_replay();
        let mine = replay_pure(&replay).expect("valid replay");
        replay.footer.final_state_hash = compute_state_hash(replay.footer.end_tick, &mine.snapshot());
        assert!(replay_pure(&replay).is_ok());

        replay.footer.final_state_hash ^= 1;
        let err = replay_pure(&replay).unwrap_err();
        assert!(err.contains("hash mismatch"));
    }

    #[test]
    fn replay_pure_rejects_edited_scenario() {
        let mut replay = sample_replay();
        replay.entries[0].action = PumpAction::StopSystem;
        let err = replay_pure(&replay).unwrap_err();
        assert!(err.contains("oracle answers give water_rise"), "{err}");
    }
}
