pub mod cli;
pub mod common;
pub mod config;
pub mod shell;

pub use cli::{
    build_cli_command, Cli, Commands, ConfigCommands, ModelArgs, ScenariosCommands, SolverArgs,
};
