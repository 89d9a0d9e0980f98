use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use kattegat_cli::config::{load_config, resolve_config_path, LoggingConfig};
use kattegat_cli::{build_cli_command, Cli, Commands};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::solve::SolveOptions;

fn init_logging(cli_level: Option<Level>, config: &LoggingConfig) -> Result<()> {
    let level = match cli_level {
        Some(level) => level,
        None => config
            .level
            .parse::<Level>()
            .with_context(|| format!("invalid log level '{}' in config", config.level))?,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
}

fn run(cli: Cli) -> Result<()> {
    let config_path = resolve_config_path(cli.config.as_deref())?;
    let config = load_config(&config_path)?;
    init_logging(cli.log_level, &config.logging)?;
    debug!(path = %config_path.display(), "configuration loaded");

    let Some(command) = &cli.command else {
        build_cli_command().print_help()?;
        println!();
        return Ok(());
    };

    match command {
        Commands::Solve {
            model,
            solver,
            format,
            map,
            geojson,
        } => commands::solve::handle(
            &config,
            model,
            solver,
            SolveOptions {
                format: *format,
                map: *map,
                geojson: geojson.as_deref(),
            },
        ),
        Commands::Shell { model, solver } => commands::shell::handle(&config, model, solver),
        Commands::Contingency {
            model,
            solver,
            format,
        } => commands::contingency::handle(&config, model, solver, *format),
        Commands::Scenarios { command } => commands::scenarios::handle(command, &config),
        Commands::Map { width, height } => commands::map::handle(&config, *width, *height),
        Commands::Config { command } => commands::config::handle(command, &config_path, &config),
        Commands::Completions { shell, out } => {
            commands::completions::handle(*shell, out.as_deref())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
