//! Ring-buffer log of recently executed pump actions.
//!
//! The [`ActionLog`] resource keeps the last 64 [`ActionRecord`]s so the CLI,
//! the agent protocol and tests can inspect what happened without polling
//! the ECS every tick.

use bevy::prelude::*;
use serde::Serialize;

use super::{ActionSource, PumpAction};
use crate::mine::MineSnapshot;

/// Maximum number of entries retained in the ring buffer.
const MAX_ENTRIES: usize = 64;

/// One executed action with the state on either side of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub tick: u64,
    pub source: ActionSource,
    pub action: PumpAction,
    pub before: MineSnapshot,
    pub after: MineSnapshot,
}

impl ActionRecord {
    /// Whether the action changed any state variable.
    pub fn changed_state(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ActionLog {
    entries: Vec<ActionRecord>,
}

impl ActionLog {
    /// Record an executed action. If the buffer is full the oldest entry is
    /// evicted.
    pub fn push(&mut self, record: ActionRecord) {
        if self.entries.len() >= MAX_ENTRIES {
            self.entries.remove(0);
        }
        self.entries.push(record);
    }

    /// Return the last `n` entries (or fewer if the log is shorter).
    pub fn last_n(&self, n: usize) -> &[ActionRecord] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn last(&self) -> Option<&ActionRecord> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionRecord> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
