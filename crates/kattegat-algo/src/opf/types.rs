use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// OPF solution method
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpfMethod {
    /// DC optimal power flow (LP with line flows obeying KVL)
    #[default]
    #[serde(rename = "dc")]
    DcOpf,
    /// Merit-order economic dispatch (copper plate, no network constraints)
    #[serde(rename = "economic")]
    EconomicDispatch,
}

impl fmt::Display for OpfMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpfMethod::DcOpf => write!(f, "dc"),
            OpfMethod::EconomicDispatch => write!(f, "economic"),
        }
    }
}

impl std::str::FromStr for OpfMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dc" | "dc-opf" | "lopf" => Ok(OpfMethod::DcOpf),
            "economic" | "merit" => Ok(OpfMethod::EconomicDispatch),
            _ => Err(format!("Unknown OPF method: {}", s)),
        }
    }
}

/// Type of constraint for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConstraintType {
    GeneratorPMax,
    GeneratorPMin,
    BranchFlowLimit,
    LinkLimit,
}

/// A constraint that holds with equality at the optimum
#[derive(Debug, Clone, Serialize)]
pub struct ConstraintInfo {
    pub name: String,
    pub constraint_type: ConstraintType,
    pub value: f64,
    pub limit: f64,
}

/// OPF solution output. Maps are keyed by element name and ordered, so two
/// identical solves serialize identically.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OpfSolution {
    // === Status ===
    pub method_used: OpfMethod,
    /// Backend that produced the dispatch ("merit-order" for economic dispatch)
    pub backend: String,
    pub solve_time_ms: u128,

    // === Objective ===
    /// Generation cost plus shed energy at the value of lost load
    pub objective_value: f64,

    // === Primal Variables ===
    pub generator_p: BTreeMap<String, f64>,
    /// Signed branch flow, positive from `from_bus` to `to_bus`
    pub branch_p_flow: BTreeMap<String, f64>,
    pub link_p_flow: BTreeMap<String, f64>,
    /// Voltage angles in the DC model's scaled units
    pub bus_angle: BTreeMap<String, f64>,
    /// Shed demand per bus; only non-zero entries
    pub load_shed: BTreeMap<String, f64>,

    // === Prices ===
    /// Marginal cost of one more MW of demand at each bus
    pub bus_lmp: BTreeMap<String, f64>,

    // === Constraint Info ===
    pub binding_constraints: Vec<ConstraintInfo>,
}

impl OpfSolution {
    pub fn total_generation(&self) -> f64 {
        self.generator_p.values().sum()
    }

    pub fn total_load_shed(&self) -> f64 {
        self.load_shed.values().sum()
    }

    pub fn is_binding(&self, name: &str) -> bool {
        self.binding_constraints.iter().any(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_strings() {
        for method in [OpfMethod::DcOpf, OpfMethod::EconomicDispatch] {
            assert_eq!(method.to_string().parse::<OpfMethod>().unwrap(), method);
        }
        assert_eq!("merit".parse::<OpfMethod>().unwrap(), OpfMethod::EconomicDispatch);
        assert!("socp".parse::<OpfMethod>().is_err());
    }

    #[test]
    fn method_serializes_as_short_name() {
        assert_eq!(serde_json::to_string(&OpfMethod::DcOpf).unwrap(), "\"dc\"");
        let parsed: OpfMethod = serde_json::from_str("\"economic\"").unwrap();
        assert_eq!(parsed, OpfMethod::EconomicDispatch);
    }

    #[test]
    fn totals() {
        let mut solution = OpfSolution::default();
        solution.generator_p.insert("wind_Copenhagen".into(), 100.0);
        solution.generator_p.insert("solar_Aarhus".into(), 50.0);
        solution.load_shed.insert("Aalborg".into(), 5.0);
        assert_eq!(solution.total_generation(), 150.0);
        assert_eq!(solution.total_load_shed(), 5.0);
    }
}
