//! Headless `--agent` mode: a blocking synchronous loop that reads JSON
//! commands from stdin and writes JSON responses to stdout.
//!
//! ## Protocol
//!
//! Each line of stdin is a JSON object with a `"cmd"` discriminator.
//! Each line of stdout is a JSON response with `"protocol_version"` and
//! `"type"` fields. See [`minepump::agent_protocol`] for the full schema.

use std::io::{BufRead, Write};

use bevy::app::App;

use minepump::agent_protocol::{
    make_response, parse_command, AgentCommand, AgentResponse, MineObservation, ResponsePayload,
    PROTOCOL_VERSION,
};
use minepump::config::ScenarioConfig;
use minepump::environment::Environment;
use minepump::pump::PumpController;
use minepump::pump_actions::{ActionLog, ActionQueue, ActionRecord, ActionSource, PumpAction};

use crate::headless;

/// Cap on a single `step` command to prevent accidental endless loops.
const MAX_STEP_TICKS: u64 = 10_000;

struct AgentSession {
    config: ScenarioConfig,
    app: App,
}

pub fn run_agent_mode(config: ScenarioConfig) {
    let mut session = AgentSession {
        app: headless::build_app(&config, false),
        config,
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    // Send the "ready" message so the external program knows we are live.
    write_response(&mut stdout, &make_response(ResponsePayload::Ready));

    // Log to stderr so it does not interfere with the JSON protocol on stdout.
    eprintln!("minepump agent mode v{PROTOCOL_VERSION} ready, waiting for commands on stdin");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("stdin read error: {e}");
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let response = match parse_command(&line) {
            Ok(cmd) => session.process_command(cmd),
            Err(message) => make_response(ResponsePayload::Error { message }),
        };
        let is_goodbye = matches!(response.payload, ResponsePayload::Goodbye);
        write_response(&mut stdout, &response);

        if is_goodbye {
            break;
        }
    }

    eprintln!("minepump agent mode shutting down");
}

fn write_response(out: &mut impl Write, response: &AgentResponse) {
    let line = serde_json::to_string(response)
        .unwrap_or_else(|e| format!("{{\"type\":\"error\",\"message\":\"{e}\"}}"));
    let _ = writeln!(out, "{line}");
    let _ = out.flush();
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

impl AgentSession {
    fn process_command(&mut self, cmd: AgentCommand) -> AgentResponse {
        match cmd {
            AgentCommand::Observe => make_response(ResponsePayload::Observation {
                observation: self.observe(),
            }),

            AgentCommand::Act { action } => match self.act(action) {
                Ok(record) => make_response(ResponsePayload::ActionResult { record }),
                Err(message) => make_response(ResponsePayload::Error { message }),
            },

            AgentCommand::BatchAct { actions } => {
                let mut records = Vec::with_capacity(actions.len());
                for action in actions {
                    match self.act(action) {
                        Ok(record) => records.push(record),
                        Err(message) => {
                            return make_response(ResponsePayload::Error { message })
                        }
                    }
                }
                make_response(ResponsePayload::BatchResult { records })
            }

            AgentCommand::Step { ticks } => {
                for _ in 0..ticks.min(MAX_STEP_TICKS) {
                    headless::tick(&mut self.app);
                }
                make_response(ResponsePayload::StepComplete {
                    tick: headless::current_tick(&self.app),
                })
            }

            AgentCommand::Reset { policy, seed } => {
                if let Some(policy) = policy {
                    self.config.policy = policy;
                }
                if let Some(seed) = seed {
                    self.config.seed = seed;
                }
                self.app = headless::build_app(&self.config, false);
                make_response(ResponsePayload::Ok)
            }

            AgentCommand::Quit => make_response(ResponsePayload::Goodbye),
        }
    }

    fn observe(&self) -> MineObservation {
        let world = self.app.world();
        MineObservation::new(
            headless::current_tick(&self.app),
            world.resource::<Environment>(),
            world.resource::<PumpController>(),
        )
    }

    /// Queue `action` for the next tick and run that tick.
    fn act(&mut self, action: PumpAction) -> Result<ActionRecord, String> {
        let tick = headless::current_tick(&self.app) + 1;
        self.app
            .world_mut()
            .resource_mut::<ActionQueue>()
            .push(tick, ActionSource::Agent, action);
        headless::tick(&mut self.app);

        self.app
            .world()
            .resource::<ActionLog>()
            .iter()
            .filter(|record| record.tick == tick && record.source == ActionSource::Agent)
            .last()
            .copied()
            .ok_or_else(|| format!("action {} was not executed", action.name()))
    }
}
