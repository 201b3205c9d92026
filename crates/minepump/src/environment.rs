//! Mine shaft environment: discrete water level and the methane flag.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{HIGH_WATER_THRESHOLD, INITIAL_WATER_LEVEL, MAX_WATER_LEVEL};

/// Water level and methane state of the shaft.
///
/// The level only changes in steps of one and every mutator clamps it to
/// `0..=MAX_WATER_LEVEL`, so no sequence of operations can leave it out of
/// range.
#[derive(Resource, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Environment {
    water_level: u8,
    methane_level_critical: bool,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            water_level: INITIAL_WATER_LEVEL,
            methane_level_critical: false,
        }
    }
}

impl Environment {
    /// Build an environment at a given state. Levels above the maximum are
    /// clamped.
    pub fn new(water_level: u8, methane_level_critical: bool) -> Self {
        Self {
            water_level: water_level.min(MAX_WATER_LEVEL),
            methane_level_critical,
        }
    }

    pub fn lower_water_level(&mut self) {
        if self.water_level > 0 {
            self.water_level -= 1;
        }
    }

    pub fn water_rise(&mut self) {
        if self.water_level < MAX_WATER_LEVEL {
            self.water_level += 1;
        }
    }

    pub fn change_methane_level(&mut self) {
        self.methane_level_critical = !self.methane_level_critical;
    }

    pub fn is_methane_level_critical(&self) -> bool {
        self.methane_level_critical
    }

    pub fn water_level(&self) -> u8 {
        self.water_level
    }

    /// The high-water sensor reads dry for every level below the top of the
    /// reservoir; it is wet only when the reservoir is full.
    pub fn is_high_water_sensor_dry(&self) -> bool {
        self.water_level < HIGH_WATER_THRESHOLD
    }

    /// Compact one-line rendering, e.g. `Env(Water:2,Methane:CRIT)`.
    pub fn print_environment(&self) -> String {
        let methane = if self.methane_level_critical {
            "CRIT"
        } else {
            "OK"
        };
        format!("Env(Water:{},Methane:{})", self.water_level, methane)
    }
}
