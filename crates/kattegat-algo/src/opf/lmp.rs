//! Marginal prices by finite difference.
//!
//! The price at a bus is the change in optimal cost when one more MW of
//! demand appears there. Re-solving is cheap for networks of this size and
//! works the same for every backend, including ones that do not report duals.

use std::collections::BTreeMap;

use kattegat_core::{Load, LoadId, Network};
use tracing::warn;

use super::OpfSolution;
use crate::OpfError;

/// Size of the demand step in MW
pub const STEP_MW: f64 = 1.0;

/// Price every bus of `network` by re-solving with a one-step load.
///
/// Buses where the stepped problem cannot be solved are left out and logged.
pub(crate) fn marginal_prices<F>(network: &Network, base_objective: f64, mut solve: F) -> BTreeMap<String, f64>
where
    F: FnMut(&Network) -> Result<OpfSolution, OpfError>,
{
    let step_id = network
        .loads()
        .iter()
        .map(|l| l.id.value() + 1)
        .max()
        .unwrap_or(0);

    let mut prices = BTreeMap::new();
    for bus in network.buses() {
        let mut stepped = network.clone();
        let step = Load::new(LoadId::new(step_id), format!("price_step_{}", bus.name), bus.id, STEP_MW);
        if let Err(err) = stepped.add_load(step) {
            warn!(bus = %bus.name, error = %err, "could not add price step load");
            continue;
        }
        match solve(&stepped) {
            Ok(solution) => {
                let price = (solution.objective_value - base_objective) / STEP_MW;
                prices.insert(bus.name.clone(), round_price(price));
            }
            Err(err) => {
                warn!(bus = %bus.name, error = %err, "skipping marginal price");
            }
        }
    }
    prices
}

/// Interior-point noise shows up in the sixth decimal; prices are quoted to four.
fn round_price(price: f64) -> f64 {
    (price * 1e4).round() / 1e4
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opf::economic;
    use kattegat_core::{Bus, BusId, Gen, GenId, GeoPoint};

    #[test]
    fn price_is_cost_of_marginal_unit() {
        let mut network = Network::new();
        network
            .add_bus(Bus::new(BusId::new(0), "plate", GeoPoint::default()))
            .unwrap();
        network
            .add_gen(
                Gen::new(GenId::new(0), "wind", BusId::new(0))
                    .with_p_limits(0.0, 100.0)
                    .with_marginal_cost(20.0),
            )
            .unwrap();
        network
            .add_gen(
                Gen::new(GenId::new(1), "gas", BusId::new(0))
                    .with_p_limits(0.0, 100.0)
                    .with_marginal_cost(50.0),
            )
            .unwrap();
        network
            .add_load(Load::new(LoadId::new(0), "load_plate", BusId::new(0), 120.0))
            .unwrap();

        let base = economic::solve(&network, None).unwrap();
        let prices = marginal_prices(&network, base.objective_value, |n| economic::solve(n, None));
        assert_eq!(prices["plate"], 50.0);
    }

    #[test]
    fn unsolvable_step_is_skipped() {
        let mut network = Network::new();
        network
            .add_bus(Bus::new(BusId::new(0), "plate", GeoPoint::default()))
            .unwrap();
        let prices = marginal_prices(&network, 0.0, |_| Err(OpfError::Infeasible("full".into())));
        assert!(prices.is_empty());
    }

    #[test]
    fn rounding() {
        assert_eq!(round_price(24.999_999_8), 25.0);
    }
}
