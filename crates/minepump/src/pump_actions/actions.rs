use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// One externally triggered operation on the mine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum PumpAction {
    WaterRise,
    ChangeMethaneLevel,
    StartSystem,
    StopSystem,
    TimeShift,
}

impl PumpAction {
    /// Order in which the scenario driver offers actions to the oracle.
    pub const SCENARIO_ORDER: [PumpAction; 5] = [
        PumpAction::WaterRise,
        PumpAction::ChangeMethaneLevel,
        PumpAction::StartSystem,
        PumpAction::StopSystem,
        PumpAction::TimeShift,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PumpAction::WaterRise => "water_rise",
            PumpAction::ChangeMethaneLevel => "change_methane_level",
            PumpAction::StartSystem => "start_system",
            PumpAction::StopSystem => "stop_system",
            PumpAction::TimeShift => "time_shift",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::SCENARIO_ORDER
            .into_iter()
            .find(|action| action.name() == name)
    }
}
