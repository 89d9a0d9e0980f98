use std::path::Path;

use anyhow::{bail, Result};
use kattegat_cli::cli::ConfigCommands;
use kattegat_cli::config::{save_config, KattegatConfig};

pub fn handle(command: &ConfigCommands, path: &Path, config: &KattegatConfig) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("# {}", path.display());
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                bail!(
                    "config file '{}' already exists (use --force to overwrite)",
                    path.display()
                );
            }
            save_config(path, &KattegatConfig::default())?;
            println!("Wrote default configuration to {}", path.display());
        }
        ConfigCommands::Path => println!("{}", path.display()),
    }
    Ok(())
}
