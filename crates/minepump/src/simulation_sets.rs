//! Deterministic tick ordering via `SystemSet` phases.
//!
//! Every system in `FixedUpdate` belongs to one of these sets:
//!
//! ```text
//! PreSim  →  Simulation  →  PostSim
//! ```
//!
//! * **PreSim** – Tick counter, replay playback, scenario driver and replay
//!   recording. These fill the `ActionQueue` for the tick.
//! * **Simulation** – The action executor, the only writer of `Environment`
//!   and `PumpController`.
//! * **PostSim** – Invariant validation and state hashing. These only read
//!   the mine state.

use bevy::prelude::*;

/// Ordered phases for systems running in the `FixedUpdate` schedule.
///
/// Configured as a chain by [`MinePumpPlugin`](crate::MinePumpPlugin).
/// Plugins use `.in_set(SimulationSet::X)` and add `.after()` constraints
/// within a phase where two systems touch the same queue.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// Per-tick setup: tick counter and every action source.
    PreSim,
    /// Applying queued actions to the mine.
    Simulation,
    /// Read-only checks over the resulting state.
    PostSim,
}
