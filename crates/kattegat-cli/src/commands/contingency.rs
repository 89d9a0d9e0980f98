use std::io::{self, Write};

use anyhow::Result;
use kattegat_algo::{screen_n1, ContingencyReport};
use kattegat_cli::common::{build_solver, model_params, print_json, OutputFormat};
use kattegat_cli::config::KattegatConfig;
use kattegat_cli::{ModelArgs, SolverArgs};
use kattegat_scenarios::{build_network, Topology};
use tabwriter::TabWriter;

pub fn handle(
    config: &KattegatConfig,
    model: &ModelArgs,
    solver: &SolverArgs,
    format: OutputFormat,
) -> Result<()> {
    let params = model_params(config.defaults, model)?;
    params.validate()?;
    let solver = build_solver(&config.solver, solver)?;
    let network = build_network(&Topology::danish_triangle(), &params)?;

    let report = screen_n1(&network, &solver);
    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Table => print_report(&report),
    }
}

fn print_report(report: &ContingencyReport) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "OUTAGE\tISLANDS\tCOST\tSHED (MW)\tMOST LOADED\tLOADING (%)\tSTATUS")?;
    for outage in &report.outages {
        let status = match &outage.error {
            Some(err) => err.clone(),
            None if outage.is_secure() => "secure".to_string(),
            None => "shedding".to_string(),
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            outage.branch,
            outage.islands,
            fmt_opt(outage.objective),
            fmt_opt(outage.load_shed_mw),
            outage.most_loaded_branch.as_deref().unwrap_or("-"),
            fmt_opt(outage.max_loading.map(|l| 100.0 * l)),
            status,
        )?;
    }
    writer.flush()?;

    println!();
    match report.base_objective {
        Some(cost) => println!("Intact cost: {cost:.2}"),
        None => println!("Intact network did not solve"),
    }
    println!(
        "Value of lost load: {:.2} per MWh; {} of {} outages insecure",
        report.value_of_lost_load,
        report.num_insecure(),
        report.outages.len()
    );
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "-".to_string())
}
