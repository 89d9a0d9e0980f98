//! Post-solve checks of a dispatch against the network it was solved on.
//!
//! [`verify_dispatch`] re-derives the physical invariants from the network
//! rather than trusting the solver: balance net of link losses, generator
//! bounds, line ratings and link bounds.

use kattegat_core::Network;
use serde::Serialize;

use crate::opf::OpfSolution;

/// One broken invariant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub element: String,
    pub message: String,
    /// How far past the limit, in MW
    pub excess_mw: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub total_generation_mw: f64,
    pub total_demand_mw: f64,
    pub total_shed_mw: f64,
    /// Power lost in links with efficiency below 1
    pub link_losses_mw: f64,
    /// generation + shed - demand - link losses
    pub balance_error_mw: f64,
    pub violations: Vec<Violation>,
}

impl DispatchReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check `solution` against `network` with absolute tolerance `tol` (MW).
///
/// The balance tolerance grows with system size so that large demands are
/// not held to a stricter relative standard than small ones.
pub fn verify_dispatch(network: &Network, solution: &OpfSolution, tol: f64) -> DispatchReport {
    let mut violations = Vec::new();

    let total_demand_mw = network.total_load().value();
    let total_generation_mw = solution.total_generation();
    let total_shed_mw = solution.total_load_shed();
    let link_losses_mw: f64 = network
        .links()
        .iter()
        .filter_map(|link| {
            let flow = solution.link_p_flow.get(&link.name)?;
            Some((1.0 - link.efficiency) * flow)
        })
        .sum();
    let balance_error_mw = total_generation_mw + total_shed_mw - total_demand_mw - link_losses_mw;
    let balance_tol = tol * total_demand_mw.max(1.0);
    if balance_error_mw.abs() > balance_tol {
        violations.push(Violation {
            element: "system".to_string(),
            message: format!(
                "generation {:.3} MW + shed {:.3} MW != demand {:.3} MW + losses {:.3} MW",
                total_generation_mw, total_shed_mw, total_demand_mw, link_losses_mw
            ),
            excess_mw: balance_error_mw.abs(),
        });
    }

    let mut exceed = |element: &str, message: String, excess: f64| {
        if excess > tol {
            violations.push(Violation {
                element: element.to_string(),
                message,
                excess_mw: excess,
            });
        }
    };

    for gen in network.generators() {
        let Some(&p) = solution.generator_p.get(&gen.name) else {
            if gen.status {
                exceed(&gen.name, "missing from dispatch".to_string(), f64::INFINITY);
            }
            continue;
        };
        exceed(
            &gen.name,
            format!("output {:.3} MW above capacity {:.3} MW", p, gen.pmax.value()),
            p - gen.pmax.value(),
        );
        exceed(
            &gen.name,
            format!("output {:.3} MW below minimum {:.3} MW", p, gen.pmin.value()),
            gen.pmin.value() - p,
        );
    }

    for branch in network.branches() {
        let (Some(&flow), Some(limit)) = (solution.branch_p_flow.get(&branch.name), branch.s_max) else {
            continue;
        };
        exceed(
            &branch.name,
            format!("|flow| {:.3} MW above rating {:.3} MW", flow.abs(), limit.value()),
            flow.abs() - limit.value(),
        );
    }

    for link in network.links() {
        let Some(&flow) = solution.link_p_flow.get(&link.name) else {
            continue;
        };
        exceed(
            &link.name,
            format!("flow {:.3} MW above {:.3} MW", flow, link.p_max.value()),
            flow - link.p_max.value(),
        );
        exceed(
            &link.name,
            format!("flow {:.3} MW below {:.3} MW", flow, link.p_min.value()),
            link.p_min.value() - flow,
        );
    }

    DispatchReport {
        total_generation_mw,
        total_demand_mw,
        total_shed_mw,
        link_losses_mw,
        balance_error_mw,
        violations,
    }
}
