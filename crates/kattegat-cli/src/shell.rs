//! Interactive session over the nine model inputs.
//!
//! A [`Session`] holds the current inputs, the solver, the map view and the
//! last outcome. Editing never solves; only [`Session::solve`] moves the
//! state, and every solve starts by dropping the previous overlays so a
//! failure can never leave stale flows on the map.

use std::fmt;
use std::fs;
use std::io::{BufRead, Write};

use anyhow::{anyhow, Context, Result};
use kattegat_algo::{OpfError, OpfSolver};
use kattegat_scenarios::{run_model_on, ModelParams, ParamField, ResultSet, Topology};
use kattegat_viz::{
    write_dispatch_table, write_flow_table, write_price_table, write_summary, MapView,
};
use tracing::{debug, info, warn};

pub const PROMPT: &str = "kattegat> ";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Nothing solved yet, or inputs reset
    Idle,
    Solved(ResultSet),
    /// Last solve failed; holds the message shown to the user
    Failed(String),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Solved(_) => "solved",
            SessionState::Failed(_) => "failed",
        }
    }
}

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Set(ParamField, f64),
    Form,
    Solve,
    Table,
    Flows,
    Prices,
    Map,
    GeoJson(String),
    Reset,
    Status,
    Help,
    Quit,
}

pub struct Session {
    params: ModelParams,
    defaults: ModelParams,
    topology: Topology,
    solver: OpfSolver,
    state: SessionState,
    map: MapView,
    map_size: (usize, usize),
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("params", &self.params)
            .field("state", &self.state.name())
            .field("overlays", &self.map.overlays().len())
            .finish()
    }
}

impl Session {
    pub fn new(params: ModelParams, solver: OpfSolver) -> Self {
        let topology = Topology::danish_triangle();
        let map = MapView::from_topology(&topology);
        Self {
            params,
            defaults: params,
            topology,
            solver,
            state: SessionState::Idle,
            map,
            map_size: (
                kattegat_viz::map::DEFAULT_WIDTH,
                kattegat_viz::map::DEFAULT_HEIGHT,
            ),
        }
    }

    pub fn with_map_size(mut self, width: usize, height: usize) -> Self {
        self.map_size = (width, height);
        self
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The current result, only while the state is `Solved`.
    pub fn result(&self) -> Option<&ResultSet> {
        match &self.state {
            SessionState::Solved(result) => Some(result),
            _ => None,
        }
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    /// Update one input. Invalid values are rejected and the field keeps its
    /// previous value. The state is left alone.
    pub fn set_field(&mut self, field: ParamField, value: f64) -> Result<(), OpfError> {
        self.params.set(field, value)
    }

    /// Solve the current inputs. On success the overlays are redrawn from the
    /// new result; on failure they stay cleared and the state is `Failed`.
    pub fn solve(&mut self) -> Result<(), OpfError> {
        self.map.clear_overlays();
        match run_model_on(&self.topology, &self.params, &self.solver) {
            Ok(result) => {
                info!(cost = result.total_cost(), "session solve succeeded");
                self.map.set_overlays(&result);
                self.state = SessionState::Solved(result);
                Ok(())
            }
            Err(err) => {
                debug!(error = %err, "session solve failed");
                self.state = SessionState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Restore the starting inputs and return to `Idle`.
    pub fn reset(&mut self) {
        self.params = self.defaults;
        self.map.clear_overlays();
        self.state = SessionState::Idle;
    }

    /// Run one input line. Errors from the line itself (unknown command, bad
    /// value, failed solve) are printed and do not end the session.
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Control> {
        let command = match parse_command(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Control::Continue),
            Err(err) => {
                writeln!(out, "error: {err}")?;
                return Ok(Control::Continue);
            }
        };

        match command {
            Command::Set(field, value) => match self.set_field(field, value) {
                Ok(()) => writeln!(out, "{} = {}", field.label(), value)?,
                Err(err) => writeln!(
                    out,
                    "error: {err} (keeping {})",
                    self.params.get(field)
                )?,
            },
            Command::Form => self.write_form(out)?,
            Command::Solve => {
                writeln!(out, "solving…")?;
                out.flush()?;
                match self.solve() {
                    Ok(()) => {
                        if let Some(result) = self.result() {
                            write_result(result, out)?;
                        }
                    }
                    Err(err) => writeln!(out, "error: {err}")?,
                }
            }
            Command::Table => match &self.state {
                SessionState::Solved(result) => write_result(result, out)?,
                other => self.write_no_result(other, out)?,
            },
            Command::Flows => match &self.state {
                SessionState::Solved(result) => write_flow_table(&mut *out, result)?,
                other => self.write_no_result(other, out)?,
            },
            Command::Prices => match &self.state {
                SessionState::Solved(result) if result.marginal_prices().is_empty() => {
                    writeln!(out, "no prices; start the shell with --prices")?
                }
                SessionState::Solved(result) => write_price_table(&mut *out, result)?,
                other => self.write_no_result(other, out)?,
            },
            Command::Map => {
                let (width, height) = self.map_size;
                write!(out, "{}", self.map.render_ascii(width, height))?;
                if let SessionState::Failed(message) = &self.state {
                    writeln!(out, "last solve failed: {message}")?;
                }
            }
            Command::GeoJson(path) => {
                let text = serde_json::to_string_pretty(&self.map.to_geojson())?;
                match fs::write(&path, text) {
                    Ok(()) => writeln!(out, "GeoJSON written to {path}")?,
                    Err(err) => writeln!(out, "error: writing {path}: {err}")?,
                }
            }
            Command::Reset => {
                self.reset();
                writeln!(out, "inputs reset")?;
            }
            Command::Status => {
                writeln!(out, "state: {}", self.state.name())?;
                if let SessionState::Failed(message) = &self.state {
                    writeln!(out, "error: {message}")?;
                }
                if let Some(voll) = self.solver.value_of_lost_load() {
                    writeln!(
                        out,
                        "load shedding: on at {voll} per MWh (unservable demand is shed, not reported as infeasible)"
                    )?;
                }
            }
            Command::Help => write!(out, "{HELP}")?,
            Command::Quit => return Ok(Control::Quit),
        }
        Ok(Control::Continue)
    }

    fn write_form<W: Write>(&self, out: &mut W) -> Result<()> {
        for field in ParamField::ALL {
            writeln!(
                out,
                "{:<20} {:<32} {}",
                field.key(),
                field.label(),
                self.params.get(field)
            )?;
        }
        Ok(())
    }

    fn write_no_result<W: Write>(&self, state: &SessionState, out: &mut W) -> Result<()> {
        match state {
            SessionState::Failed(message) => writeln!(out, "no result: last solve failed: {message}")?,
            _ => writeln!(out, "no result yet; run `solve`")?,
        }
        Ok(())
    }
}

/// Dispatch table and summary, with a warning when demand went unserved.
fn write_result<W: Write>(result: &ResultSet, out: &mut W) -> Result<()> {
    let shed = result.total_load_shed();
    if shed > 0.0 {
        warn!(shed_mw = shed, "solve shed load");
        writeln!(
            out,
            "warning: load shed: {shed:.2} MW of demand could not be served"
        )?;
    }
    write_dispatch_table(&mut *out, result)?;
    write_summary(&mut *out, result)?;
    Ok(())
}

const HELP: &str = "\
commands:
  set <field> <value>   change one input (see `form` for field names)
  form                  show the nine inputs
  solve                 solve the current inputs
  table                 dispatch table of the last solve
  flows                 line flow table of the last solve
  prices                bus marginal prices of the last solve
  map                   draw the map
  geojson <path>        write the map as GeoJSON
  reset                 restore the starting inputs
  status                show the session state
  help                  this text
  quit                  leave the shell
";

fn parse_command(line: &str) -> Result<Option<Command>> {
    let words = shell_words::split(line).map_err(|e| anyhow!("could not parse line: {e}"))?;
    let Some((head, args)) = words.split_first() else {
        return Ok(None);
    };

    let expect_args = |n: usize| -> Result<()> {
        if args.len() == n {
            Ok(())
        } else {
            Err(anyhow!("`{head}` takes {n} argument(s), got {}", args.len()))
        }
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "set" => {
            expect_args(2)?;
            let field: ParamField = args[0].parse().map_err(anyhow::Error::msg)?;
            let value: f64 = args[1]
                .parse()
                .with_context(|| format!("'{}' is not a number", args[1]))?;
            Command::Set(field, value)
        }
        "form" => Command::Form,
        "solve" => Command::Solve,
        "table" => Command::Table,
        "flows" => Command::Flows,
        "prices" => Command::Prices,
        "map" => Command::Map,
        "geojson" => {
            expect_args(1)?;
            Command::GeoJson(args[0].clone())
        }
        "reset" => Command::Reset,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(anyhow!("unknown command '{other}'; try `help`")),
    };
    Ok(Some(command))
}

/// Read commands from `input` until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    out: &mut W,
    prompt: bool,
) -> Result<()> {
    if prompt {
        write!(out, "{PROMPT}")?;
        out.flush()?;
    }
    for line in input.lines() {
        let line = line.context("reading shell input")?;
        if session.execute(&line, out)? == Control::Quit {
            break;
        }
        if prompt {
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }
    }
    Ok(())
}
