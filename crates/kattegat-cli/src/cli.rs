use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::common::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "kattegat",
    author,
    version,
    about = "Linear optimal power flow on tiny networks",
    long_about = None
)]
pub struct Cli {
    /// Set the logging level (defaults to the config file, else warn)
    #[arg(long, global = true)]
    pub log_level: Option<tracing::Level>,

    /// Configuration file (defaults to ~/.kattegat/config.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Solve the Danish triangle once and print the dispatch
    Solve {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        solver: SolverArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Also draw the map with line overlays
        #[arg(long)]
        map: bool,
        /// Write the solved map as GeoJSON
        #[arg(long, value_hint = ValueHint::FilePath)]
        geojson: Option<PathBuf>,
    },
    /// Interactive session: edit the nine inputs, solve, inspect
    Shell {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// N-1 line outage screening with load shedding
    Contingency {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        solver: SolverArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// What-if scenario sets
    Scenarios {
        #[command(subcommand)]
        command: ScenariosCommands,
    },
    /// Draw the idle map (bus markers only)
    Map {
        /// Canvas width in characters
        #[arg(long)]
        width: Option<usize>,
        /// Canvas height in characters
        #[arg(long)]
        height: Option<usize>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
        /// Write output to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScenariosCommands {
    /// Solve every scenario in a spec file
    Run {
        /// Scenario spec (YAML or JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        spec: PathBuf,
        #[command(flatten)]
        solver: SolverArgs,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Check a spec file without solving
    Validate {
        /// Scenario spec (YAML or JSON)
        #[arg(value_hint = ValueHint::FilePath)]
        spec: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration file path
    Path,
}

/// The nine model inputs. Unset flags fall back to the configured defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Demand at Copenhagen (MW)
    #[arg(long, allow_hyphen_values = true)]
    pub demand_copenhagen: Option<f64>,
    /// Demand at Aarhus (MW)
    #[arg(long, allow_hyphen_values = true)]
    pub demand_aarhus: Option<f64>,
    /// Demand at Aalborg (MW)
    #[arg(long, allow_hyphen_values = true)]
    pub demand_aalborg: Option<f64>,
    /// Wind capacity at Copenhagen (MW)
    #[arg(long, allow_hyphen_values = true)]
    pub capacity_wind: Option<f64>,
    /// Solar capacity at Aarhus (MW)
    #[arg(long, allow_hyphen_values = true)]
    pub capacity_solar: Option<f64>,
    /// Gas capacity at Aalborg (MW)
    #[arg(long, allow_hyphen_values = true)]
    pub capacity_gas: Option<f64>,
    /// Wind marginal cost (per MWh)
    #[arg(long, allow_hyphen_values = true)]
    pub cost_wind: Option<f64>,
    /// Solar marginal cost (per MWh)
    #[arg(long, allow_hyphen_values = true)]
    pub cost_solar: Option<f64>,
    /// Gas marginal cost (per MWh)
    #[arg(long, allow_hyphen_values = true)]
    pub cost_gas: Option<f64>,
}

impl ModelArgs {
    /// Flag values in canonical field order.
    pub fn values(&self) -> [Option<f64>; 9] {
        [
            self.demand_copenhagen,
            self.demand_aarhus,
            self.demand_aalborg,
            self.capacity_wind,
            self.capacity_solar,
            self.capacity_gas,
            self.cost_wind,
            self.cost_solar,
            self.cost_gas,
        ]
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct SolverArgs {
    /// OPF method: dc or economic
    #[arg(long)]
    pub method: Option<String>,
    /// LP solver backend: clarabel or highs
    #[arg(long)]
    pub lp_solver: Option<String>,
    /// Solve timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Enable load shedding at this value of lost load (per MWh)
    #[arg(long)]
    pub voll: Option<f64>,
    /// Compute bus marginal prices
    #[arg(long)]
    pub prices: bool,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn negative_values_parse_as_values() {
        let cli = Cli::try_parse_from(["kattegat", "solve", "--demand-aarhus", "-5"]).unwrap();
        match cli.command {
            Some(Commands::Solve { model, .. }) => assert_eq!(model.demand_aarhus, Some(-5.0)),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
