//! # kattegat-core: network model for small dispatch studies
//!
//! Networks are **undirected multigraphs**:
//! - **Nodes**: buses, generators and loads
//! - **Edges**: AC branches (lines obeying DC power flow) and controllable links
//!
//! Generators and loads are nodes that point at their bus through a [`BusId`]
//! rather than through a graph edge, so the edge set is exactly the
//! transmission topology. Every element carries a typed ID, which keeps the
//! balance and capacity invariants checkable for any topology, not just the
//! three-bus triangle the CLI ships with.
//!
//! ## Quick Start
//!
//! ```rust
//! use kattegat_core::*;
//!
//! let mut network = Network::new();
//! network.add_bus(Bus::new(BusId::new(0), "Copenhagen", GeoPoint::new(55.6761, 12.5683)))?;
//! network.add_bus(Bus::new(BusId::new(1), "Aarhus", GeoPoint::new(56.1629, 10.2039)))?;
//!
//! network.add_gen(
//!     Gen::new(GenId::new(0), "wind_Copenhagen", BusId::new(0))
//!         .with_p_limits(0.0, 100.0)
//!         .with_marginal_cost(20.0)
//!         .with_carrier("wind"),
//! )?;
//! network.add_load(Load::new(LoadId::new(0), "load_Aarhus", BusId::new(1), 50.0))?;
//! network.add_branch(
//!     Branch::new(BranchId::new(0), "Copenhagen_Aarhus", BusId::new(0), BusId::new(1), 1.5)
//!         .with_s_max(Some(100.0)),
//! )?;
//!
//! assert_eq!(network.stats().num_buses, 2);
//! # Ok::<(), kattegat_core::GridError>(())
//! ```
//!
//! ## Modules
//!
//! - [`diagnostics`] - issues collected by [`Network::validate_into`]
//! - [`geo`] - bus coordinates and bounding boxes for maps
//! - [`graph_utils`] - island detection over the transmission edges
//! - [`units`] - MW, cost and coordinate newtypes

use petgraph::graph::EdgeIndex;
use petgraph::{prelude::*, Undirected};
use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod error;
pub mod geo;
pub mod graph_utils;
pub mod units;

pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity};
pub use error::{GridError, GridResult};
pub use geo::{BoundingBox, GeoPoint};
pub use graph_utils::bus_islands;
pub use petgraph::graph::NodeIndex;
pub use units::{CostPerMwh, Degrees, Kilometers, Megawatts, PerUnit};

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(usize);

        impl $name {
            #[inline]
            pub fn new(value: usize) -> Self {
                $name(value)
            }

            #[inline]
            pub fn value(&self) -> usize {
                self.0
            }
        }
    };
}

typed_id!(BusId);
typed_id!(GenId);
typed_id!(LoadId);
typed_id!(
    /// Identifier of an AC branch (transmission line)
    BranchId
);
typed_id!(
    /// Identifier of a controllable link
    LinkId
);

#[derive(Debug, Clone)]
pub struct Bus {
    pub id: BusId,
    pub name: String,
    pub location: GeoPoint,
    /// Energy carrier at this bus; "AC" for electrical buses
    pub carrier: String,
}

impl Bus {
    pub fn new(id: BusId, name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id,
            name: name.into(),
            location,
            carrier: "AC".to_string(),
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(BusId(0), String::new(), GeoPoint::default())
    }
}

#[derive(Debug, Clone)]
pub struct Gen {
    pub id: GenId,
    pub name: String,
    pub bus: BusId,
    /// Technology label ("wind", "solar", "gas"). Display metadata only.
    pub carrier: Option<String>,
    /// Minimum output (MW)
    pub pmin: Megawatts,
    /// Installed capacity (MW)
    pub pmax: Megawatts,
    pub marginal_cost: CostPerMwh,
    /// In-service status
    pub status: bool,
}

impl Gen {
    /// Generator with zero capacity and zero cost; set limits with the builders.
    pub fn new(id: GenId, name: impl Into<String>, bus: BusId) -> Self {
        Self {
            id,
            name: name.into(),
            bus,
            carrier: None,
            pmin: Megawatts(0.0),
            pmax: Megawatts(0.0),
            marginal_cost: CostPerMwh(0.0),
            status: true,
        }
    }

    pub fn with_p_limits(mut self, pmin: f64, pmax: f64) -> Self {
        self.pmin = Megawatts(pmin);
        self.pmax = Megawatts(pmax);
        self
    }

    pub fn with_marginal_cost(mut self, cost: f64) -> Self {
        self.marginal_cost = CostPerMwh(cost);
        self
    }

    pub fn with_carrier(mut self, carrier: impl Into<String>) -> Self {
        self.carrier = Some(carrier.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Load {
    pub id: LoadId,
    pub name: String,
    pub bus: BusId,
    /// Fixed active power demand (MW)
    pub active_power: Megawatts,
}

impl Load {
    pub fn new(id: LoadId, name: impl Into<String>, bus: BusId, demand_mw: f64) -> Self {
        Self {
            id,
            name: name.into(),
            bus,
            active_power: Megawatts(demand_mw),
        }
    }
}

/// AC transmission line. Flow follows `(θ_from - θ_to) / reactance`.
#[derive(Debug, Clone)]
pub struct Branch {
    pub id: BranchId,
    pub name: String,
    pub from_bus: BusId,
    pub to_bus: BusId,
    /// Series reactance; only ratios between lines matter for flow sharing
    pub reactance: PerUnit,
    pub length: Option<Kilometers>,
    /// Thermal rating applied symmetrically to the flow
    pub s_max: Option<Megawatts>,
    pub status: bool,
}

impl Branch {
    pub fn new(
        id: BranchId,
        name: impl Into<String>,
        from_bus: BusId,
        to_bus: BusId,
        reactance: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            from_bus,
            to_bus,
            reactance: PerUnit(reactance),
            length: None,
            s_max: None,
            status: true,
        }
    }

    pub fn with_s_max(mut self, s_max_mw: Option<f64>) -> Self {
        self.s_max = s_max_mw.map(Megawatts);
        self
    }

    pub fn with_length(mut self, km: f64) -> Self {
        self.length = Some(Kilometers(km));
        self
    }
}

/// Controllable point-to-point link (HVDC corridor). Its flow is a free
/// decision within `[p_min, p_max]` and does not take part in the angle
/// equations; `efficiency` scales what arrives at `to_bus`.
#[derive(Debug, Clone)]
pub struct Link {
    pub id: LinkId,
    pub name: String,
    pub from_bus: BusId,
    pub to_bus: BusId,
    pub p_min: Megawatts,
    pub p_max: Megawatts,
    pub efficiency: f64,
    pub status: bool,
}

impl Link {
    /// Unidirectional, lossless link with nominal power `p_nom`.
    pub fn new(
        id: LinkId,
        name: impl Into<String>,
        from_bus: BusId,
        to_bus: BusId,
        p_nom: f64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            from_bus,
            to_bus,
            p_min: Megawatts(0.0),
            p_max: Megawatts(p_nom),
            efficiency: 1.0,
            status: true,
        }
    }

    /// Allow flow in both directions up to `p_nom`.
    pub fn bidirectional(mut self) -> Self {
        self.p_min = -self.p_max;
        self
    }

    pub fn with_efficiency(mut self, efficiency: f64) -> Self {
        self.efficiency = efficiency;
        self
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Bus(Bus),
    Gen(Gen),
    Load(Load),
}

#[derive(Debug, Clone)]
pub enum Edge {
    Branch(Branch),
    Link(Link),
}

/// The power network graph.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub graph: Graph<Node, Edge, Undirected>,
}

impl Network {
    pub fn new() -> Self {
        Self {
            graph: Graph::new_undirected(),
        }
    }

    /// Add a bus. IDs and names must be unique.
    pub fn add_bus(&mut self, bus: Bus) -> GridResult<NodeIndex> {
        if self.bus_node(bus.id).is_some() {
            return Err(GridError::Duplicate(format!("bus id {}", bus.id.value())));
        }
        if self.bus_by_name(&bus.name).is_some() {
            return Err(GridError::Duplicate(format!("bus '{}'", bus.name)));
        }
        Ok(self.graph.add_node(Node::Bus(bus)))
    }

    /// Add a generator attached to an existing bus.
    pub fn add_gen(&mut self, gen: Gen) -> GridResult<NodeIndex> {
        self.require_bus(gen.bus, &gen.name)?;
        if self.generators().iter().any(|g| g.name == gen.name) {
            return Err(GridError::Duplicate(format!("generator '{}'", gen.name)));
        }
        Ok(self.graph.add_node(Node::Gen(gen)))
    }

    /// Add a load attached to an existing bus.
    pub fn add_load(&mut self, load: Load) -> GridResult<NodeIndex> {
        self.require_bus(load.bus, &load.name)?;
        Ok(self.graph.add_node(Node::Load(load)))
    }

    /// Add a branch between two existing, distinct buses.
    pub fn add_branch(&mut self, branch: Branch) -> GridResult<EdgeIndex> {
        let (from, to) = self.endpoints(branch.from_bus, branch.to_bus, &branch.name)?;
        self.require_unique_edge(&branch.name)?;
        Ok(self.graph.add_edge(from, to, Edge::Branch(branch)))
    }

    /// Add a link between two existing, distinct buses. Links share the
    /// branch namespace.
    pub fn add_link(&mut self, link: Link) -> GridResult<EdgeIndex> {
        let (from, to) = self.endpoints(link.from_bus, link.to_bus, &link.name)?;
        self.require_unique_edge(&link.name)?;
        Ok(self.graph.add_edge(from, to, Edge::Link(link)))
    }

    /// Remove a branch by name, returning it. Used to model line outages.
    pub fn remove_branch(&mut self, name: &str) -> GridResult<Branch> {
        let edge = self
            .graph
            .edge_indices()
            .find(|&e| matches!(&self.graph[e], Edge::Branch(b) if b.name == name))
            .ok_or_else(|| GridError::NotFound(format!("branch '{}'", name)))?;
        match self.graph.remove_edge(edge) {
            Some(Edge::Branch(branch)) => Ok(branch),
            _ => Err(GridError::NotFound(format!("branch '{}'", name))),
        }
    }

    /// Put a generator in or out of service.
    pub fn set_gen_status(&mut self, name: &str, in_service: bool) -> GridResult<()> {
        let gen = self
            .graph
            .node_weights_mut()
            .find_map(|n| match n {
                Node::Gen(g) if g.name == name => Some(g),
                _ => None,
            })
            .ok_or_else(|| GridError::NotFound(format!("generator '{}'", name)))?;
        gen.status = in_service;
        Ok(())
    }

    fn require_bus(&self, bus: BusId, owner: &str) -> GridResult<NodeIndex> {
        self.bus_node(bus).ok_or_else(|| {
            GridError::NotFound(format!("bus id {} referenced by '{}'", bus.value(), owner))
        })
    }

    fn require_unique_edge(&self, name: &str) -> GridResult<()> {
        if self.graph.edge_weights().any(|e| e.label() == name) {
            return Err(GridError::Duplicate(format!("branch or link '{}'", name)));
        }
        Ok(())
    }

    fn endpoints(&self, from: BusId, to: BusId, owner: &str) -> GridResult<(NodeIndex, NodeIndex)> {
        if from == to {
            return Err(GridError::InvalidConnection(format!(
                "'{}' connects bus {} to itself",
                owner,
                from.value()
            )));
        }
        Ok((self.require_bus(from, owner)?, self.require_bus(to, owner)?))
    }

    /// Graph node holding the bus with this ID.
    pub fn bus_node(&self, id: BusId) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&n| matches!(&self.graph[n], Node::Bus(b) if b.id == id))
    }

    pub fn bus(&self, id: BusId) -> Option<&Bus> {
        self.buses().into_iter().find(|b| b.id == id)
    }

    pub fn bus_by_name(&self, name: &str) -> Option<&Bus> {
        self.buses().into_iter().find(|b| b.name == name)
    }

    /// Compute basic statistics about the network
    pub fn stats(&self) -> NetworkStats {
        let mut stats = NetworkStats::default();

        for node in self.graph.node_weights() {
            match node {
                Node::Bus(_) => stats.num_buses += 1,
                Node::Gen(g) => {
                    stats.num_gens += 1;
                    if g.status {
                        stats.total_gen_capacity_mw += g.pmax.value();
                    }
                }
                Node::Load(l) => {
                    stats.num_loads += 1;
                    stats.total_load_mw += l.active_power.value();
                }
            }
        }
        for edge in self.graph.edge_weights() {
            match edge {
                Edge::Branch(_) => stats.num_branches += 1,
                Edge::Link(_) => stats.num_links += 1,
            }
        }
        stats
    }

    /// Check the network for problems that would make a solve fail or
    /// produce a meaningless answer. Errors are fatal; warnings are not.
    pub fn validate_into(&self, diag: &mut Diagnostics) {
        let stats = self.stats();

        if stats.num_buses == 0 {
            diag.add_error("structure", "Network has no buses");
            return;
        }
        if stats.num_gens == 0 {
            diag.add_error("structure", "Network has no generators");
        }
        if stats.num_branches + stats.num_links == 0 && stats.num_buses > 1 {
            diag.add_warning("topology", "Network has multiple buses but no branches");
        }

        for bus in self.buses() {
            if !bus.location.is_valid() {
                diag.add_warning_with_entity("input", "coordinates out of range", &bus.name);
            }
        }

        for gen in self.generators() {
            if !gen.pmax.is_non_negative() {
                diag.add_error_with_entity("input", "capacity must be non-negative", &gen.name);
            }
            if !gen.pmin.is_non_negative() {
                diag.add_error_with_entity(
                    "input",
                    "minimum output must be non-negative",
                    &gen.name,
                );
            } else if gen.pmin > gen.pmax {
                diag.add_error_with_entity(
                    "input",
                    "minimum output exceeds capacity",
                    &gen.name,
                );
            }
            if !gen.marginal_cost.is_non_negative() {
                diag.add_error_with_entity(
                    "input",
                    "marginal cost must be non-negative",
                    &gen.name,
                );
            }
        }

        for load in self.loads() {
            if !load.active_power.is_non_negative() {
                diag.add_error_with_entity("input", "demand must be non-negative", &load.name);
            }
        }

        for branch in self.branches() {
            let x = branch.reactance.value();
            if !x.is_finite() || x <= 0.0 {
                diag.add_error_with_entity("input", "reactance must be positive", &branch.name);
            }
            match branch.s_max {
                Some(limit) if !limit.is_non_negative() => diag.add_error_with_entity(
                    "input",
                    "rating must be non-negative",
                    &branch.name,
                ),
                None => diag.add_warning_with_entity("topology", "line has no rating", &branch.name),
                _ => {}
            }
        }

        for link in self.links() {
            if !(link.p_min.is_finite() && link.p_max.is_finite()) || link.p_min > link.p_max {
                diag.add_error_with_entity("input", "link bounds are inconsistent", &link.name);
            }
            if !(link.efficiency > 0.0 && link.efficiency <= 1.0) {
                diag.add_error_with_entity("input", "link efficiency must be in (0, 1]", &link.name);
            }
        }

        if stats.total_load_mw.abs() < 1e-9 {
            diag.add_warning("structure", "Network has no demand");
        }
        if stats.total_gen_capacity_mw < stats.total_load_mw {
            diag.add_warning(
                "capacity",
                &format!(
                    "Total generation capacity ({:.1} MW) is less than total load ({:.1} MW)",
                    stats.total_gen_capacity_mw, stats.total_load_mw
                ),
            );
        }

        let islands = bus_islands(self);
        if islands.len() > 1 {
            diag.add_warning(
                "topology",
                &format!("Network splits into {} islands", islands.len()),
            );
        }
    }

    /// Total fixed demand
    pub fn total_load(&self) -> Megawatts {
        self.loads().iter().map(|l| l.active_power).sum()
    }

    /// Total capacity of in-service generators
    pub fn total_capacity(&self) -> Megawatts {
        self.generators()
            .iter()
            .filter(|g| g.status)
            .map(|g| g.pmax)
            .sum()
    }

    pub fn generators_at_bus(&self, bus_id: BusId) -> Vec<&Gen> {
        self.generators()
            .into_iter()
            .filter(|g| g.bus == bus_id)
            .collect()
    }

    pub fn loads_at_bus(&self, bus_id: BusId) -> Vec<&Load> {
        self.loads()
            .into_iter()
            .filter(|l| l.bus == bus_id)
            .collect()
    }

    /// Demand summed per bus
    pub fn demand_at_bus(&self, bus_id: BusId) -> Megawatts {
        self.loads_at_bus(bus_id)
            .iter()
            .map(|l| l.active_power)
            .sum()
    }

    /// Buses in insertion order
    pub fn buses(&self) -> Vec<&Bus> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Bus(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn generators(&self) -> Vec<&Gen> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Gen(g) => Some(g),
                _ => None,
            })
            .collect()
    }

    pub fn loads(&self) -> Vec<&Load> {
        self.graph
            .node_weights()
            .filter_map(|n| match n {
                Node::Load(l) => Some(l),
                _ => None,
            })
            .collect()
    }

    pub fn branches(&self) -> Vec<&Branch> {
        self.graph
            .edge_weights()
            .filter_map(|e| match e {
                Edge::Branch(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    pub fn links(&self) -> Vec<&Link> {
        self.graph
            .edge_weights()
            .filter_map(|e| match e {
                Edge::Link(l) => Some(l),
                _ => None,
            })
            .collect()
    }
}

/// Statistics about a network's size and capacity
#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkStats {
    pub num_buses: usize,
    pub num_gens: usize,
    pub num_loads: usize,
    pub num_branches: usize,
    pub num_links: usize,
    pub total_load_mw: f64,
    pub total_gen_capacity_mw: f64,
}

impl std::fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} buses, {} branches, {} links, {} gens ({:.0} MW), {} loads ({:.0} MW)",
            self.num_buses,
            self.num_branches,
            self.num_links,
            self.num_gens,
            self.total_gen_capacity_mw,
            self.num_loads,
            self.total_load_mw
        )
    }
}

impl Edge {
    pub fn label(&self) -> &str {
        match self {
            Edge::Branch(branch) => &branch.name,
            Edge::Link(link) => &link.name,
        }
    }

    pub fn in_service(&self) -> bool {
        match self {
            Edge::Branch(b) => b.status,
            Edge::Link(l) => l.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bus() -> Network {
        let mut network = Network::new();
        network
            .add_bus(Bus::new(BusId::new(0), "North", GeoPoint::new(57.0, 10.0)))
            .unwrap();
        network
            .add_bus(Bus::new(BusId::new(1), "South", GeoPoint::new(55.0, 12.0)))
            .unwrap();
        network
            .add_gen(
                Gen::new(GenId::new(0), "wind_North", BusId::new(0))
                    .with_p_limits(0.0, 100.0)
                    .with_marginal_cost(20.0),
            )
            .unwrap();
        network
            .add_load(Load::new(LoadId::new(0), "load_South", BusId::new(1), 50.0))
            .unwrap();
        network
            .add_branch(
                Branch::new(BranchId::new(0), "North_South", BusId::new(0), BusId::new(1), 1.0)
                    .with_s_max(Some(100.0)),
            )
            .unwrap();
        network
    }

    #[test]
    fn test_network_creation() {
        let network = two_bus();
        assert_eq!(network.graph.node_count(), 4);
        assert_eq!(network.graph.edge_count(), 1);
        assert_eq!(network.bus(BusId::new(1)).unwrap().name, "South");
        assert_eq!(network.bus_by_name("North").unwrap().id, BusId::new(0));
    }

    #[test]
    fn test_network_stats() {
        let stats = two_bus().stats();
        assert_eq!(stats.num_buses, 2);
        assert_eq!(stats.num_gens, 1);
        assert_eq!(stats.num_loads, 1);
        assert_eq!(stats.num_branches, 1);
        assert_eq!(stats.num_links, 0);
        assert!((stats.total_load_mw - 50.0).abs() < 1e-9);
        assert!((stats.total_gen_capacity_mw - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_valid_network_has_no_errors() {
        let mut diag = Diagnostics::new();
        two_bus().validate_into(&mut diag);
        assert!(!diag.has_errors(), "{diag}");
    }

    #[test]
    fn test_network_validation_empty() {
        let mut diag = Diagnostics::new();
        Network::new().validate_into(&mut diag);
        assert!(diag.errors().any(|i| i.message.contains("no buses")));
    }

    #[test]
    fn test_negative_inputs_are_errors() {
        let mut network = two_bus();
        network
            .add_gen(
                Gen::new(GenId::new(1), "gas_South", BusId::new(1))
                    .with_p_limits(0.0, -5.0)
                    .with_marginal_cost(-1.0),
            )
            .unwrap();
        network
            .add_load(Load::new(LoadId::new(1), "load_North", BusId::new(0), -10.0))
            .unwrap();

        let mut diag = Diagnostics::new();
        network.validate_into(&mut diag);
        let entities: Vec<_> = diag
            .errors()
            .filter_map(|i| i.entity.as_deref())
            .collect();
        assert!(entities.contains(&"gas_South"));
        assert!(entities.contains(&"load_North"));
    }

    #[test]
    fn test_capacity_shortfall_is_warning() {
        let mut network = two_bus();
        network
            .add_load(Load::new(LoadId::new(1), "load_North", BusId::new(0), 80.0))
            .unwrap();
        let mut diag = Diagnostics::new();
        network.validate_into(&mut diag);
        assert!(diag.issues_by_category("capacity").count() == 1);
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_unknown_bus_rejected() {
        let mut network = two_bus();
        let err = network
            .add_gen(Gen::new(GenId::new(5), "solar_Nowhere", BusId::new(9)))
            .unwrap_err();
        assert!(matches!(err, GridError::NotFound(_)));

        let err = network
            .add_branch(Branch::new(BranchId::new(5), "loop", BusId::new(0), BusId::new(0), 1.0))
            .unwrap_err();
        assert!(err.to_string().contains("itself"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut network = two_bus();
        assert!(network
            .add_bus(Bus::new(BusId::new(7), "North", GeoPoint::default()))
            .is_err());
        assert!(network
            .add_gen(Gen::new(GenId::new(9), "wind_North", BusId::new(1)))
            .is_err());
    }

    #[test]
    fn test_totals_and_lookups() {
        let network = two_bus();
        assert_eq!(network.total_load(), Megawatts(50.0));
        assert_eq!(network.total_capacity(), Megawatts(100.0));
        assert_eq!(network.demand_at_bus(BusId::new(1)), Megawatts(50.0));
        assert_eq!(network.generators_at_bus(BusId::new(0)).len(), 1);
        assert!(network.loads_at_bus(BusId::new(0)).is_empty());
    }

    #[test]
    fn test_remove_branch() {
        let mut network = two_bus();
        let removed = network.remove_branch("North_South").unwrap();
        assert_eq!(removed.id, BranchId::new(0));
        assert!(network.branches().is_empty());
        assert!(network.remove_branch("North_South").is_err());
    }

    #[test]
    fn test_gen_outage() {
        let mut network = two_bus();
        network.set_gen_status("wind_North", false).unwrap();
        assert!(!network.generators()[0].status);
        assert_eq!(network.total_capacity(), Megawatts(0.0));
        assert!(network.set_gen_status("nope", false).is_err());
    }

    #[test]
    fn test_links() {
        let mut network = two_bus();
        network
            .add_link(Link::new(LinkId::new(0), "hvdc", BusId::new(0), BusId::new(1), 40.0).bidirectional())
            .unwrap();
        let link = network.links()[0];
        assert_eq!(link.p_min, Megawatts(-40.0));
        assert_eq!(link.p_max, Megawatts(40.0));
        assert_eq!(network.stats().num_links, 1);

        let err = network
            .add_link(Link::new(LinkId::new(1), "North_South", BusId::new(0), BusId::new(1), 10.0))
            .unwrap_err();
        assert_eq!(err, GridError::Duplicate("branch or link 'North_South'".into()));
    }
}
