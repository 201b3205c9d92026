mod agent_mode;
mod cli;
mod headless;

use std::process::ExitCode;

use bevy::app::App;
use bevy::log::{info, warn};
use clap::Parser;

use minepump::explorer::explore;
use minepump::mine::MinePump;
use minepump::replay::replay_pure;
use minepump::scenario::specification_two;

use cli::{Cli, Mode};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.scenario_config();

    // Every mode but the agent logs to stderr through the app's LogPlugin;
    // the agent keeps stderr for its own status lines.
    let logged_app = || headless::build_app(&config, true);
    let result = match cli.mode() {
        Mode::Agent => {
            agent_mode::run_agent_mode(config.clone());
            Ok(ExitCode::SUCCESS)
        }
        Mode::Run => run_random(&mut logged_app()),
        Mode::Spec2 => run_spec2(&logged_app()),
        Mode::Explore => run_explore(&logged_app()),
        Mode::ReplayJson => run_replay_json(&mut logged_app()),
    };

    result.unwrap_or_else(|e| {
        eprintln!("error: {e}");
        ExitCode::FAILURE
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let line = serde_json::to_string(value).map_err(|e| format!("serialize error: {e}"))?;
    println!("{line}");
    Ok(())
}

/// One random scenario through the ECS app; each executed action is one
/// JSON line on stdout.
fn run_random(app: &mut App) -> Result<ExitCode, String> {
    let mut failure = None;
    let ticks = headless::run_random_scenario(app, |record| {
        if let Err(e) = print_json(record) {
            if failure.is_none() {
                failure = Some(e);
            }
        }
    });
    if let Some(e) = failure {
        return Err(e);
    }

    let config = headless::config(app);
    let mine = MinePump::from_snapshot(headless::snapshot(app), config.policy);
    info!(
        "Scenario (seed {}) finished after {ticks} ticks: {}",
        config.seed,
        mine.describe()
    );
    Ok(ExitCode::SUCCESS)
}

fn run_spec2(app: &App) -> Result<ExitCode, String> {
    let config = headless::config(app);
    let mut mine = MinePump::with_policy(config.policy);
    let trace = specification_two(&mut mine, &config);
    for step in &trace.steps {
        print_json(step)?;
    }
    info!("Specification two finished: {}", mine.describe());
    Ok(ExitCode::SUCCESS)
}

fn run_explore(app: &App) -> Result<ExitCode, String> {
    let report = explore(&headless::config(app))?;
    println!("{}", report.summary());
    if report.is_ok() {
        return Ok(ExitCode::SUCCESS);
    }
    for violation in &report.violations {
        warn!("{} at depth {}", violation.violation, violation.depth);
        print_json(violation)?;
    }
    Ok(ExitCode::from(1))
}

/// Record a random ECS run, check it replays to the same hash, and print
/// the replay file.
fn run_replay_json(app: &mut App) -> Result<ExitCode, String> {
    headless::start_recording(app);
    headless::run_random_scenario(app, |_| {});
    let replay = headless::stop_recording(app)?;

    let replayed = replay_pure(&replay)?;
    info!(
        "Recorded {} actions over {} ticks; pure replay ends at {}",
        replay.footer.entry_count,
        replay.footer.end_tick,
        replayed.describe()
    );
    println!("{}", replay.to_json());
    Ok(ExitCode::SUCCESS)
}
