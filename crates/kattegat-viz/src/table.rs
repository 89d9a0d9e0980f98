//! Tab-aligned result tables.

use std::io::{self, Write};

use kattegat_scenarios::{params::capitalize, ResultSet};
use tabwriter::TabWriter;

/// Split a generator identifier at the first `_` into a capitalised
/// technology and a location: `wind_Copenhagen` -> (`Wind`, `Copenhagen`).
/// An identifier without `_` is all technology.
pub fn split_generator_id(id: &str) -> (String, String) {
    match id.split_once('_') {
        Some((tech, location)) => (capitalize(tech), location.to_string()),
        None => (capitalize(id), String::new()),
    }
}

pub fn write_dispatch_table<W: Write>(out: W, result: &ResultSet) -> io::Result<()> {
    let mut writer = TabWriter::new(out);
    writeln!(writer, "Technology\tLocation\tOutput (MW)")?;
    for (id, mw) in result.dispatch() {
        let (tech, location) = split_generator_id(id);
        writeln!(writer, "{}\t{}\t{:.2}", tech, location, mw)?;
    }
    writer.flush()
}

/// Signed flows, positive from `From` to `To`. Loading is `-` for unrated lines.
pub fn write_flow_table<W: Write>(out: W, result: &ResultSet) -> io::Result<()> {
    let mut writer = TabWriter::new(out);
    writeln!(writer, "Line\tFrom\tTo\tFlow (MW)\tLoading (%)")?;
    for (line, flow) in result.line_flows() {
        let (from, to) = result
            .line_buses()
            .get(line)
            .map(|(f, t)| (f.as_str(), t.as_str()))
            .unwrap_or(("?", "?"));
        let loading = result
            .line_loading_percent(line)
            .map(|p| format!("{:.1}", p))
            .unwrap_or_else(|| "-".to_string());
        writeln!(writer, "{}\t{}\t{}\t{:.2}\t{}", line, from, to, flow, loading)?;
    }
    writer.flush()
}

pub fn write_price_table<W: Write>(out: W, result: &ResultSet) -> io::Result<()> {
    let mut writer = TabWriter::new(out);
    writeln!(writer, "Bus\tPrice (per MWh)")?;
    for (bus, price) in result.marginal_prices() {
        writeln!(writer, "{}\t{:.2}", bus, price)?;
    }
    writer.flush()
}

/// Totals printed under the dispatch table.
pub fn write_summary<W: Write>(mut out: W, result: &ResultSet) -> io::Result<()> {
    writeln!(out, "Total generation: {:.2} MW", result.total_generation())?;
    writeln!(out, "Total cost: {:.2}", result.total_cost())?;
    let shed = result.total_load_shed();
    if shed > 0.0 {
        writeln!(out, "Unserved load: {:.2} MW", shed)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_first_underscore() {
        assert_eq!(
            split_generator_id("wind_Copenhagen"),
            ("Wind".to_string(), "Copenhagen".to_string())
        );
        assert_eq!(
            split_generator_id("gas_North_Jutland"),
            ("Gas".to_string(), "North_Jutland".to_string())
        );
        assert_eq!(split_generator_id("hydro"), ("Hydro".to_string(), String::new()));
    }
}
