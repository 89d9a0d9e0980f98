use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use kattegat_cli::common::{build_solver, model_params, print_json, OutputFormat};
use kattegat_cli::config::KattegatConfig;
use kattegat_cli::{ModelArgs, SolverArgs};
use kattegat_scenarios::{run_model, Topology};
use kattegat_viz::{
    write_dispatch_table, write_flow_table, write_price_table, write_summary, MapView,
};
use tracing::info;

pub struct SolveOptions<'a> {
    pub format: OutputFormat,
    pub map: bool,
    pub geojson: Option<&'a Path>,
}

pub fn handle(
    config: &KattegatConfig,
    model: &ModelArgs,
    solver: &SolverArgs,
    options: SolveOptions<'_>,
) -> Result<()> {
    let params = model_params(config.defaults, model)?;
    let solver = build_solver(&config.solver, solver)?;

    let start = Instant::now();
    let result = run_model(&params, &solver)?;
    info!(
        method = %result.method(),
        backend = result.backend(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "solve finished"
    );

    let mut view = MapView::from_topology(&Topology::danish_triangle());
    view.set_overlays(&result);

    match options.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_dispatch_table(&mut out, &result)?;
            writeln!(out)?;
            write_flow_table(&mut out, &result)?;
            if !result.marginal_prices().is_empty() {
                writeln!(out)?;
                write_price_table(&mut out, &result)?;
            }
            writeln!(out)?;
            write_summary(&mut out, &result)?;
            if options.map {
                writeln!(out)?;
                write!(
                    out,
                    "{}",
                    view.render_ascii(config.map.width, config.map.height)
                )?;
            }
        }
    }

    if let Some(path) = options.geojson {
        let text = serde_json::to_string_pretty(&view.to_geojson())?;
        fs::write(path, text).with_context(|| format!("writing GeoJSON '{}'", path.display()))?;
        info!(path = %path.display(), "GeoJSON written");
    }
    Ok(())
}
