use std::io::{self, IsTerminal};

use anyhow::Result;
use kattegat_cli::common::{build_solver, model_params};
use kattegat_cli::config::KattegatConfig;
use kattegat_cli::shell::{run, Session};
use kattegat_cli::{ModelArgs, SolverArgs};

pub fn handle(config: &KattegatConfig, model: &ModelArgs, solver: &SolverArgs) -> Result<()> {
    let params = model_params(config.defaults, model)?;
    let solver = build_solver(&config.solver, solver)?;
    let mut session =
        Session::new(params, solver).with_map_size(config.map.width, config.map.height);

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut stdout = io::stdout();
    if interactive {
        println!("Danish triangle shell. Type `help` for commands.");
    }
    run(&mut session, stdin.lock(), &mut stdout, interactive)
}
