//! The Danish triangle model and what-if scenarios on top of it.
//!
//! [`run_model`] turns nine scalar inputs into a [`ResultSet`]; scenario
//! sets (YAML or JSON) describe batches of parameter overrides, outages and
//! added links.

pub mod apply;
mod builder;
pub mod params;
mod result;
pub mod spec;
pub mod topology;

pub use apply::apply_scenario_to_network;
pub use builder::{build_network, run_model, run_model_on};
pub use params::{ModelParams, ParamField, ParamKind, LOCATIONS, TECHNOLOGIES};
pub use result::ResultSet;
pub use spec::{
    load_spec_from_path, resolve_scenarios, run_scenarios, validate, LinkSpec, OutageSpec,
    ResolvedScenario, ScenarioOutcome, ScenarioSet, ScenarioSpec,
};
pub use topology::{Corridor, LinkCorridor, Site, Topology};
