//! Deterministic state hashing for replay verification.
//!
//! Computes a 64-bit hash of the mine state every tick, stored in the
//! `StateHash` resource. The hash covers, in this order:
//!
//! 1. Tick counter
//! 2. Water level
//! 3. Methane flag
//! 4. Pump running flag
//! 5. System active flag

use std::hash::{Hash, Hasher};

use bevy::prelude::*;

use crate::environment::Environment;
use crate::mine::MineSnapshot;
use crate::pump::PumpController;
use crate::{SimulationSet, TickCounter};

/// Stores the deterministic hash computed at the end of each simulation tick.
#[derive(Resource, Default, Clone, Debug)]
pub struct StateHash {
    /// The tick at which this hash was computed.
    pub tick: u64,
    /// The 64-bit FNV-1a hash of simulation state.
    pub hash: u64,
}

// ---------------------------------------------------------------------------
// FNV-1a hasher (deterministic, no random seed)
// ---------------------------------------------------------------------------

/// FNV-1a produces the same output on every platform and Rust version,
/// unlike the randomized `DefaultHasher`.
struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x00000100000001B3;

    fn new() -> Self {
        Self {
            state: Self::FNV_OFFSET_BASIS,
        }
    }
}

impl Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::FNV_PRIME);
        }
    }
}

/// Compute a deterministic hash of the mine state at `tick`.
pub fn compute_state_hash(tick: u64, state: &MineSnapshot) -> u64 {
    let mut hasher = Fnv1aHasher::new();
    tick.hash(&mut hasher);
    state.water_level.hash(&mut hasher);
    state.methane_level_critical.hash(&mut hasher);
    state.pump_running.hash(&mut hasher);
    state.system_active.hash(&mut hasher);
    hasher.finish()
}

fn update_state_hash(
    tick: Res<TickCounter>,
    environment: Res<Environment>,
    pump: Res<PumpController>,
    mut state_hash: ResMut<StateHash>,
) {
    let state = MineSnapshot::capture(&environment, &pump);
    state_hash.tick = tick.0;
    state_hash.hash = compute_state_hash(tick.0, &state);
}

pub struct StateHashPlugin;

impl Plugin for StateHashPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StateHash>();
        app.add_systems(
            FixedUpdate,
            update_state_hash.in_set(SimulationSet::PostSim),
        );
    }
}
