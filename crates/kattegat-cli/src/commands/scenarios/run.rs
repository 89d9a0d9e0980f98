use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use kattegat_cli::common::{build_solver, print_json, OutputFormat};
use kattegat_cli::config::KattegatConfig;
use kattegat_cli::SolverArgs;
use kattegat_scenarios::{load_spec_from_path, resolve_scenarios, run_scenarios, ScenarioOutcome};
use tabwriter::TabWriter;
use tracing::info;

pub fn handle(
    spec: &Path,
    config: &KattegatConfig,
    solver: &SolverArgs,
    format: OutputFormat,
) -> Result<()> {
    let set = load_spec_from_path(spec)?;
    let scenarios = resolve_scenarios(&set)?;
    let solver = build_solver(&config.solver, solver)?;

    let outcomes = run_scenarios(&scenarios, &solver);
    info!(
        total = outcomes.len(),
        failed = outcomes.iter().filter(|o| !o.is_ok()).count(),
        "scenario batch finished"
    );

    match format {
        OutputFormat::Json => print_json(&outcomes),
        OutputFormat::Table => print_outcomes(&outcomes),
    }
}

fn print_outcomes(outcomes: &[ScenarioOutcome]) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "SCENARIO\tSTATUS\tCOST\tSHED (MW)\tDETAIL")?;
    for outcome in outcomes {
        match &outcome.result {
            Some(result) => writeln!(
                writer,
                "{}\t{}\t{:.2}\t{:.2}\t",
                outcome.scenario_id,
                outcome.status(),
                result.total_cost(),
                result.total_load_shed()
            )?,
            None => writeln!(
                writer,
                "{}\t{}\t-\t-\t{}",
                outcome.scenario_id,
                outcome.status(),
                outcome.error.as_deref().unwrap_or("")
            )?,
        }
    }
    writer.flush()?;
    Ok(())
}
