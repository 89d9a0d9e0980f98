use std::collections::BTreeMap;

use kattegat_algo::{OpfMethod, OpfSolution};
use kattegat_core::{GeoPoint, Network};
use serde::Serialize;

/// Snapshot of one solve, in the shape the presentation layer consumes.
///
/// Built once per successful solve and never mutated. Every map is ordered
/// by name, so identical solves compare and serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    method: OpfMethod,
    backend: String,
    /// Generator identifier -> output (MW)
    dispatch: BTreeMap<String, f64>,
    /// Line identifier -> signed flow (MW), positive from the first bus to the second
    line_flows: BTreeMap<String, f64>,
    /// Line identifier -> (from bus, to bus)
    line_buses: BTreeMap<String, (String, String)>,
    /// Line identifier -> rating (MW), rated lines only
    line_ratings: BTreeMap<String, f64>,
    bus_coordinates: BTreeMap<String, GeoPoint>,
    total_cost: f64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    marginal_prices: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    load_shed: BTreeMap<String, f64>,
}

impl ResultSet {
    /// Combine a solution with the network metadata needed to draw it.
    /// Links are reported alongside lines.
    pub fn from_solution(network: &Network, solution: &OpfSolution) -> Self {
        let bus_name = |id| {
            network
                .bus(id)
                .map(|b| b.name.clone())
                .unwrap_or_default()
        };

        let mut line_buses = BTreeMap::new();
        let mut line_ratings = BTreeMap::new();
        for branch in network.branches() {
            line_buses.insert(
                branch.name.clone(),
                (bus_name(branch.from_bus), bus_name(branch.to_bus)),
            );
            if let Some(limit) = branch.s_max {
                line_ratings.insert(branch.name.clone(), limit.value());
            }
        }
        for link in network.links() {
            line_buses.insert(
                link.name.clone(),
                (bus_name(link.from_bus), bus_name(link.to_bus)),
            );
            line_ratings.insert(
                link.name.clone(),
                link.p_max.value().max(-link.p_min.value()),
            );
        }

        let mut line_flows = solution.branch_p_flow.clone();
        line_flows.extend(solution.link_p_flow.iter().map(|(k, v)| (k.clone(), *v)));

        // Out-of-service units report zero rather than disappearing
        let dispatch = network
            .generators()
            .into_iter()
            .map(|g| {
                let p = solution.generator_p.get(&g.name).copied().unwrap_or(0.0);
                (g.name.clone(), p)
            })
            .collect();

        let bus_coordinates = network
            .buses()
            .into_iter()
            .map(|b| (b.name.clone(), b.location))
            .collect();

        Self {
            method: solution.method_used,
            backend: solution.backend.clone(),
            dispatch,
            line_flows,
            line_buses,
            line_ratings,
            bus_coordinates,
            total_cost: solution.objective_value,
            marginal_prices: solution.bus_lmp.clone(),
            load_shed: solution.load_shed.clone(),
        }
    }

    pub fn method(&self) -> OpfMethod {
        self.method
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn dispatch(&self) -> &BTreeMap<String, f64> {
        &self.dispatch
    }

    pub fn line_flows(&self) -> &BTreeMap<String, f64> {
        &self.line_flows
    }

    pub fn line_buses(&self) -> &BTreeMap<String, (String, String)> {
        &self.line_buses
    }

    pub fn bus_coordinates(&self) -> &BTreeMap<String, GeoPoint> {
        &self.bus_coordinates
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn marginal_prices(&self) -> &BTreeMap<String, f64> {
        &self.marginal_prices
    }

    pub fn load_shed(&self) -> &BTreeMap<String, f64> {
        &self.load_shed
    }

    pub fn total_generation(&self) -> f64 {
        self.dispatch.values().sum()
    }

    pub fn total_load_shed(&self) -> f64 {
        self.load_shed.values().sum()
    }

    pub fn line_rating(&self, line: &str) -> Option<f64> {
        self.line_ratings.get(line).copied()
    }

    /// |flow| / rating as a percentage, for rated lines with a flow
    pub fn line_loading_percent(&self, line: &str) -> Option<f64> {
        let flow = self.line_flows.get(line)?;
        let rating = self.line_rating(line).filter(|r| *r > 0.0)?;
        Some(100.0 * flow.abs() / rating)
    }
}
