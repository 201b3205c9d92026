//! Replay recorder: copies every live action out of the `ActionQueue` while
//! a recording session is open.
//!
//! `record_actions` runs in `PreSim` once the scenario driver and the player
//! have queued their actions, so it sees the tick's full action list before
//! the executor drains it.

use bevy::prelude::*;

use crate::config::ScenarioConfig;
use crate::mine::MineSnapshot;
use crate::pump_actions::{ActionQueue, ActionSource, QueuedAction};

use super::format::{ReplayEntry, ReplayFile, ReplayFooter, ReplayHeader, CURRENT_FORMAT_VERSION};

#[derive(Debug)]
struct RecordingSession {
    header: ReplayHeader,
    entries: Vec<ReplayEntry>,
}

#[derive(Resource, Debug, Default)]
pub struct ReplayRecorder {
    session: Option<RecordingSession>,
}

impl ReplayRecorder {
    /// Open a session for a mine in state `initial` at `start_tick`,
    /// discarding any session already open.
    pub fn start(&mut self, config: &ScenarioConfig, start_tick: u64, initial: MineSnapshot) {
        if self.session.is_some() {
            warn!("Replay recording restarted at tick {start_tick}; previous entries dropped");
        }
        self.session = Some(RecordingSession {
            header: ReplayHeader {
                format_version: CURRENT_FORMAT_VERSION,
                config: config.clone(),
                start_tick,
                initial,
            },
            entries: Vec::new(),
        });
    }

    /// Append a queued action. Replay-sourced actions and actions queued
    /// while no session is open are ignored.
    pub fn record(&mut self, queued: &QueuedAction) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if queued.source == ActionSource::Replay {
            return;
        }
        session.entries.push(ReplayEntry {
            tick: queued.tick,
            source: queued.source,
            action: queued.action,
        });
    }

    /// Close the session and build the replay file.
    ///
    /// `state_hash` is the state hash at `end_tick` (0 to skip the check on
    /// playback); `oracle_answers` are the scenario's consumed answers. The
    /// file is validated before it is returned.
    pub fn stop(
        &mut self,
        end_tick: u64,
        state_hash: u64,
        oracle_answers: Vec<bool>,
    ) -> Result<ReplayFile, String> {
        let session = self
            .session
            .take()
            .ok_or_else(|| "no replay recording in progress".to_string())?;
        let entry_count = session.entries.len() as u64;
        let replay = ReplayFile {
            header: session.header,
            entries: session.entries,
            footer: ReplayFooter {
                end_tick,
                final_state_hash: state_hash,
                entry_count,
                oracle_answers,
            },
        };
        replay.validate()?;
        info!(
            "Replay recorded: {} entries over ticks {}..={}",
            entry_count, replay.header.start_tick, end_tick
        );
        Ok(replay)
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_some()
    }

    pub fn entry_count(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |session| session.entries.len())
    }
}

pub fn record_actions(queue: Res<ActionQueue>, mut recorder: ResMut<ReplayRecorder>) {
    if !recorder.is_recording() {
        return;
    }
    for queued in queue.iter() {
        recorder.record(queued);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pump::ControlPolicy;
    use crate::pump_actions::PumpAction;

    fn queued(tick: u64, source: ActionSource, action: PumpAction) -> QueuedAction {
        QueuedAction {
            tick,
            source,
            action,
        }
    }

    #[test]
    fn start_record_stop_produces_valid_file() {
        let config = ScenarioConfig {
            seed: 9,
            policy: ControlPolicy::Base,
            ..Default::default()
        };
        let mut recorder = ReplayRecorder::default();
        recorder.start(&config, 0, MineSnapshot::default());
        assert!(recorder.is_recording());

        recorder.record(&queued(1, ActionSource::Agent, PumpAction::WaterRise));
        recorder.record(&queued(3, ActionSource::Agent, PumpAction::TimeShift));
        assert_eq!(recorder.entry_count(), 2);

        let file = recorder.stop(10, 0xABCD, Vec::new()).expect("valid file");
        assert!(!recorder.is_recording());
        assert_eq!(file.header.config, config);
        assert_eq!(file.entries[1].tick, 3);
        assert_eq!(file.entries[1].source, ActionSource::Agent);
        assert_eq!(file.footer.entry_count, 2);
        assert_eq!(file.footer.end_tick, 10);
        assert_eq!(file.footer.final_state_hash, 0xABCD);
    }

    #[test]
    fn skips_replay_actions_and_idle_recorder() {
        let mut recorder = ReplayRecorder::default();
        recorder.record(&queued(1, ActionSource::Agent, PumpAction::StopSystem));
        assert_eq!(recorder.entry_count(), 0);

        recorder.start(&ScenarioConfig::default(), 0, MineSnapshot::default());
        recorder.record(&queued(1, ActionSource::Replay, PumpAction::StopSystem));
        assert_eq!(recorder.entry_count(), 0);
    }

    #[test]
    fn stop_without_session_fails() {
        let mut recorder = ReplayRecorder::default();
        let err = recorder.stop(1, 0, Vec::new()).unwrap_err();
        assert!(err.contains("no replay recording"));
    }

    #[test]
    fn stop_rejects_entries_past_end_tick() {
        let mut recorder = ReplayRecorder::default();
        recorder.start(&ScenarioConfig::default(), 0, MineSnapshot::default());
        recorder.record(&queued(5, ActionSource::Agent, PumpAction::WaterRise));
        let err = recorder.stop(4, 0, Vec::new()).unwrap_err();
        assert!(err.contains("outside recorded range"), "{err}");
    }

    #[test]
    fn restart_clears_previous_entries() {
        let mut recorder = ReplayRecorder::default();
        let config = ScenarioConfig::default();
        recorder.start(&config, 0, MineSnapshot::default());
        recorder.record(&queued(1, ActionSource::Agent, PumpAction::WaterRise));
        recorder.start(&config, 5, MineSnapshot::default());
        assert_eq!(recorder.entry_count(), 0);
        let file = recorder.stop(6, 0, Vec::new()).expect("valid file");
        assert_eq!(file.header.start_tick, 5);
    }
}
