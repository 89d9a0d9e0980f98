use anyhow::Result;
use kattegat_cli::cli::ScenariosCommands;
use kattegat_cli::config::KattegatConfig;

pub mod run;
pub mod validate;

pub fn handle(command: &ScenariosCommands, config: &KattegatConfig) -> Result<()> {
    match command {
        ScenariosCommands::Run {
            spec,
            solver,
            format,
        } => run::handle(spec, config, solver, *format),
        ScenariosCommands::Validate { spec } => validate::handle(spec),
    }
}
