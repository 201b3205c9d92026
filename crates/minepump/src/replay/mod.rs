//! Deterministic replay format with recorder and player.
//!
//! Operates at the `PumpAction` level: records actions by tick and replays
//! them through the same `ActionQueue` executor path, or directly against a
//! [`MinePump`](crate::mine::MinePump) with [`replay_pure`].

pub mod format;
pub mod player;
pub mod plugin;
pub mod recorder;

pub use format::{ReplayEntry, ReplayFile, ReplayFooter, ReplayHeader, CURRENT_FORMAT_VERSION};
pub use player::{
    feed_replay_actions, replay_pure, verify_replay_playback, PlaybackOutcome, ReplayPlayer,
};
pub use plugin::ReplayPlugin;
pub use recorder::{record_actions, ReplayRecorder};
