//! Agent text protocol types for the `--agent` headless mode.
//!
//! Defines the JSON command/response envelope that external programs use to
//! drive the mine over newline-delimited JSON on stdin/stdout. The I/O loop
//! lives in `crates/app/src/agent_mode.rs`.

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::mine::MineSnapshot;
use crate::pump::{ControlPolicy, PumpController};
use crate::pump_actions::{ActionRecord, PumpAction};
use crate::state_hash::compute_state_hash;

// ---------------------------------------------------------------------------
// Commands (stdin → simulation)
// ---------------------------------------------------------------------------

/// A single command sent by the external agent over stdin.
///
/// Each line of stdin is parsed as one `AgentCommand`. The `cmd` field acts as
/// the discriminator tag.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AgentCommand {
    /// Request the current mine observation.
    Observe,

    /// Queue one action and run a tick so it executes.
    Act { action: PumpAction },

    /// Queue and execute several actions, one tick each.
    BatchAct { actions: Vec<PumpAction> },

    /// Advance the simulation by `ticks` fixed-update ticks.
    Step { ticks: u64 },

    /// Restore the initial mine state, optionally switching policy or seed.
    Reset {
        #[serde(default)]
        policy: Option<ControlPolicy>,
        #[serde(default)]
        seed: Option<u64>,
    },

    /// Gracefully shut down the agent session.
    Quit,
}

// ---------------------------------------------------------------------------
// Responses (simulation → stdout)
// ---------------------------------------------------------------------------

/// Everything an agent can see about the mine at one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MineObservation {
    pub tick: u64,
    pub policy: ControlPolicy,
    pub state: MineSnapshot,
    pub environment: String,
    pub pump: String,
    pub state_hash: u64,
}

impl MineObservation {
    pub fn new(tick: u64, environment: &Environment, pump: &PumpController) -> Self {
        let state = MineSnapshot::capture(environment, pump);
        Self {
            tick,
            policy: pump.policy(),
            state,
            environment: environment.print_environment(),
            pump: pump.print_pump(),
            state_hash: compute_state_hash(tick, &state),
        }
    }
}

/// Every response includes the protocol version and a tagged payload.
#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

/// Tagged payload variants for agent responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    /// The simulation is ready to accept commands.
    Ready,

    Observation { observation: MineObservation },

    /// Result of a single `act` command.
    ActionResult { record: ActionRecord },

    /// Results of a `batch_act` command, in submission order.
    BatchResult { records: Vec<ActionRecord> },

    /// The simulation has advanced; reports the current tick counter.
    StepComplete { tick: u64 },

    /// Generic success acknowledgement (used by `reset`).
    Ok,

    /// An error occurred while processing the command.
    Error { message: String },

    /// The session is ending (response to `quit`).
    Goodbye,
}

/// Current protocol version. Bump when the command/response schema changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Wraps a payload with the current protocol version.
pub fn make_response(payload: ResponsePayload) -> AgentResponse {
    AgentResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

/// Parse one stdin line into a command.
pub fn parse_command(line: &str) -> Result<AgentCommand, String> {
    serde_json::from_str(line).map_err(|e| format!("Parse error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pump_actions::ActionSource;

    #[test]
    fn deserialize_observe_command() {
        let cmd = parse_command(r#"{"cmd":"observe"}"#).unwrap();
        assert!(matches!(cmd, AgentCommand::Observe));
    }

    #[test]
    fn deserialize_act_command() {
        let cmd = parse_command(r#"{"cmd":"act","action":"water_rise"}"#).unwrap();
        assert!(matches!(
            cmd,
            AgentCommand::Act {
                action: PumpAction::WaterRise
            }
        ));
    }

    #[test]
    fn deserialize_batch_act_command() {
        let json = r#"{"cmd":"batch_act","actions":["time_shift","stop_system"]}"#;
        if let AgentCommand::BatchAct { actions } = parse_command(json).unwrap() {
            assert_eq!(actions, vec![PumpAction::TimeShift, PumpAction::StopSystem]);
        } else {
            panic!("expected BatchAct");
        }
    }

    #[test]
    fn deserialize_step_command() {
        if let AgentCommand::Step { ticks } = parse_command(r#"{"cmd":"step","ticks":100}"#).unwrap()
        {
            assert_eq!(ticks, 100);
        } else {
            panic!("expected Step");
        }
    }

    #[test]
    fn deserialize_reset_with_and_without_fields() {
        match parse_command(r#"{"cmd":"reset"}"#).unwrap() {
            AgentCommand::Reset { policy, seed } => {
                assert!(policy.is_none());
                assert!(seed.is_none());
            }
            other => panic!("expected Reset, got {other:?}"),
        }
        match parse_command(r#"{"cmd":"reset","policy":"base","seed":9}"#).unwrap() {
            AgentCommand::Reset { policy, seed } => {
                assert_eq!(policy, Some(ControlPolicy::Base));
                assert_eq!(seed, Some(9));
            }
            other => panic!("expected Reset, got {other:?}"),
        }
    }

    #[test]
    fn deserialize_quit_command() {
        assert!(matches!(
            parse_command(r#"{"cmd":"quit"}"#).unwrap(),
            AgentCommand::Quit
        ));
    }

    #[test]
    fn unknown_command_and_action_are_errors() {
        assert!(parse_command(r#"{"cmd":"fly"}"#).is_err());
        let err = parse_command(r#"{"cmd":"act","action":"flood"}"#).unwrap_err();
        assert!(err.starts_with("Parse error"));
    }

    #[test]
    fn serialize_ready_response() {
        let json = serde_json::to_string(&make_response(ResponsePayload::Ready)).unwrap();
        assert!(json.contains("\"protocol_version\":1"));
        assert!(json.contains("\"type\":\"ready\""));
    }

    #[test]
    fn serialize_observation_response() {
        let observation =
            MineObservation::new(3, &Environment::default(), &PumpController::default());
        assert_eq!(observation.state, MineSnapshot::default());
        let json = serde_json::to_string(&make_response(ResponsePayload::Observation {
            observation,
        }))
        .unwrap();
        assert!(json.contains("\"type\":\"observation\""));
        assert!(json.contains("\"tick\":3"));
        assert!(json.contains("\"policy\":\"high_water_activation\""));
        assert!(json.contains("Env(Water:1,Methane:OK)"));
    }

    #[test]
    fn serialize_action_result_response() {
        let record = ActionRecord {
            tick: 1,
            source: ActionSource::Agent,
            action: PumpAction::StopSystem,
            before: MineSnapshot::default(),
            after: MineSnapshot {
                system_active: false,
                ..MineSnapshot::default()
            },
        };
        let json =
            serde_json::to_string(&make_response(ResponsePayload::ActionResult { record }))
                .unwrap();
        assert!(json.contains("\"type\":\"action_result\""));
        assert!(json.contains("\"action\":\"stop_system\""));
        assert!(json.contains("\"source\":\"agent\""));
    }

    #[test]
    fn serialize_step_complete_response() {
        let json =
            serde_json::to_string(&make_response(ResponsePayload::StepComplete { tick: 42 }))
                .unwrap();
        assert!(json.contains("\"type\":\"step_complete\""));
        assert!(json.contains("\"tick\":42"));
    }

    #[test]
    fn serialize_error_and_goodbye_responses() {
        let json = serde_json::to_string(&make_response(ResponsePayload::Error {
            message: "something went wrong".to_string(),
        }))
        .unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("something went wrong"));

        let json = serde_json::to_string(&make_response(ResponsePayload::Goodbye)).unwrap();
        assert!(json.contains("\"type\":\"goodbye\""));
    }
}
