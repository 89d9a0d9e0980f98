use crate::{BusId, Network, Node};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;

/// Groups of buses joined by in-service branches or links.
///
/// Generators and loads hang off their bus by ID, so only bus nodes and
/// transmission edges take part. Islands are ordered by their first bus in
/// insertion order, and buses keep insertion order inside each island.
pub fn bus_islands(network: &Network) -> Vec<Vec<BusId>> {
    let graph = &network.graph;
    let mut sets = UnionFind::<usize>::new(graph.node_count());

    for edge in graph.edge_references() {
        if edge.weight().in_service() {
            sets.union(edge.source().index(), edge.target().index());
        }
    }

    let mut islands: Vec<Vec<BusId>> = Vec::new();
    let mut slot_by_root: BTreeMap<usize, usize> = BTreeMap::new();
    for node in graph.node_indices() {
        let Node::Bus(bus) = &graph[node] else {
            continue;
        };
        let root = sets.find(node.index());
        let slot = *slot_by_root.entry(root).or_insert_with(|| {
            islands.push(Vec::new());
            islands.len() - 1
        });
        islands[slot].push(bus.id);
    }
    islands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Branch, BranchId, Bus, GeoPoint};

    fn buses(n: usize) -> Network {
        let mut network = Network::new();
        for i in 0..n {
            network
                .add_bus(Bus::new(BusId::new(i), format!("b{i}"), GeoPoint::default()))
                .unwrap();
        }
        network
    }

    fn connect(network: &mut Network, id: usize, a: usize, b: usize) {
        network
            .add_branch(Branch::new(
                BranchId::new(id),
                format!("b{a}_b{b}"),
                BusId::new(a),
                BusId::new(b),
                1.0,
            ))
            .unwrap();
    }

    #[test]
    fn triangle_is_one_island() {
        let mut network = buses(3);
        connect(&mut network, 0, 0, 1);
        connect(&mut network, 1, 1, 2);
        connect(&mut network, 2, 2, 0);
        assert_eq!(
            bus_islands(&network),
            vec![vec![BusId::new(0), BusId::new(1), BusId::new(2)]]
        );
    }

    #[test]
    fn removing_two_lines_isolates_a_bus() {
        let mut network = buses(3);
        connect(&mut network, 0, 0, 1);
        connect(&mut network, 1, 1, 2);
        connect(&mut network, 2, 2, 0);
        network.remove_branch("b1_b2").unwrap();
        network.remove_branch("b2_b0").unwrap();

        let islands = bus_islands(&network);
        assert_eq!(islands.len(), 2);
        assert_eq!(islands[1], vec![BusId::new(2)]);
    }

    #[test]
    fn out_of_service_branch_does_not_connect() {
        let mut network = buses(2);
        network
            .add_branch({
                let mut branch = Branch::new(BranchId::new(0), "b0_b1", BusId::new(0), BusId::new(1), 1.0);
                branch.status = false;
                branch
            })
            .unwrap();
        assert_eq!(bus_islands(&network).len(), 2);
    }

    #[test]
    fn empty_network_has_no_islands() {
        assert!(bus_islands(&Network::new()).is_empty());
    }
}
