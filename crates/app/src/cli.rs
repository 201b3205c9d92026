//! Command-line parsing for the `minepump` binary.

use clap::{ArgGroup, Parser, ValueEnum};

use minepump::config::ScenarioConfig;
use minepump::pump::ControlPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One random scenario, trace printed as JSON lines.
    Run,
    Spec2,
    Explore,
    ReplayJson,
    Agent,
}

/// `--policy` values, spelled like [`ControlPolicy::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Observe the environment, never switch the pump
    Base,
    /// Start the pump when the high-water sensor is wet
    #[value(name = "high_water_activation", alias = "high-water-activation")]
    HighWaterActivation,
}

impl From<PolicyArg> for ControlPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::Base => ControlPolicy::Base,
            PolicyArg::HighWaterActivation => ControlPolicy::HighWaterActivation,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "minepump")]
#[command(version)]
#[command(about = "Toy mine pump controller: scenarios, exhaustive checks and replays")]
#[command(long_about = "
Toy mine pump controller.

Without a mode flag one random scenario runs and every executed action is
printed to stdout as a JSON line. Logs go to stderr.
")]
#[command(group(
    ArgGroup::new("mode").args(["spec2", "explore", "replay_json", "agent"])
))]
pub struct Cli {
    /// Run the fixed demonstration scenario
    #[arg(long)]
    pub spec2: bool,

    /// Enumerate every scenario (at most 8 steps); exit 1 on an invariant
    /// violation
    #[arg(long)]
    pub explore: bool,

    /// Record a random scenario and print the replay as JSON
    #[arg(long)]
    pub replay_json: bool,

    /// JSON-lines agent protocol on stdin/stdout
    #[arg(long)]
    pub agent: bool,

    /// RNG seed for the random scenario
    #[arg(long)]
    pub seed: Option<u64>,

    /// Oracle iterations per scenario
    #[arg(long)]
    pub steps: Option<u32>,

    /// Control policy installed in the pump controller
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Inline ScenarioConfig JSON; --seed, --steps and --policy override it
    #[arg(long, value_name = "JSON", value_parser = ScenarioConfig::from_json)]
    pub config: Option<ScenarioConfig>,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.spec2 {
            Mode::Spec2
        } else if self.explore {
            Mode::Explore
        } else if self.replay_json {
            Mode::ReplayJson
        } else if self.agent {
            Mode::Agent
        } else {
            Mode::Run
        }
    }

    /// `--config` (or the defaults) with the individual flags applied on top.
    pub fn scenario_config(&self) -> ScenarioConfig {
        let mut config = self.config.clone().unwrap_or_default();
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(steps) = self.steps {
            config.steps = steps;
        }
        if let Some(policy) = self.policy {
            config.policy = policy.into();
        }
        config
    }
}
