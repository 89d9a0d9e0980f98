use std::path::Path;

use anyhow::Result;
use kattegat_scenarios::{load_spec_from_path, resolve_scenarios};

pub fn handle(spec: &Path) -> Result<()> {
    let set = load_spec_from_path(spec)?;
    let resolved = resolve_scenarios(&set)?;
    println!(
        "Scenario spec validated successfully ({} scenarios)",
        resolved.len()
    );
    Ok(())
}
