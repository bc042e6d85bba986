//! Residual network for the graph-algorithmic optimization variants.
//!
//! Every operational segment becomes two arcs in a `petgraph` digraph: a
//! forward arc with residual `capacity − flow` and a backward arc with
//! residual `flow − min_flow` (so augmenting along the backward arc undoes
//! committed flow, and bidirectional segments can genuinely reverse). The
//! three graph strategies share this structure: depth-first augmenting paths
//! for throughput, multi-source Dijkstra for cheapest delivery paths, and
//! bounded simple-path enumeration for load balancing.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::FlowNetwork;

/// Whether an arc adds to or undoes the underlying segment's flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArcDirection {
    Forward,
    Backward,
}

/// Arc payload: the segment it belongs to and its orientation.
#[derive(Debug, Clone, Copy)]
pub struct ResidualArc {
    pub segment: usize,
    pub direction: ArcDirection,
}

/// A cheapest path found by [`ResidualNetwork::cheapest_forward_path`].
#[derive(Debug, Clone)]
pub struct CheapestPath {
    pub edges: Vec<EdgeIndex>,
    /// Point index of the source the path starts from
    pub source: usize,
    /// Total transportation cost per unit of flow
    pub unit_cost: f64,
    /// Smallest residual along the path
    pub bottleneck: f64,
}

/// Mutable residual state over an extracted network.
pub struct ResidualNetwork {
    graph: DiGraph<usize, ResidualArc>,
    nodes: Vec<NodeIndex>,
    /// Committed flow per segment index; signed for bidirectional segments
    pub flows: Vec<f64>,
    capacity: Vec<f64>,
    min_flow: Vec<f64>,
    cost: Vec<f64>,
}

impl ResidualNetwork {
    pub fn build(net: &FlowNetwork) -> Self {
        let mut graph = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..net.points.len()).map(|p| graph.add_node(p)).collect();
        for (e, segment) in net.segments.iter().enumerate() {
            graph.add_edge(
                nodes[segment.from],
                nodes[segment.to],
                ResidualArc {
                    segment: e,
                    direction: ArcDirection::Forward,
                },
            );
            graph.add_edge(
                nodes[segment.to],
                nodes[segment.from],
                ResidualArc {
                    segment: e,
                    direction: ArcDirection::Backward,
                },
            );
        }
        Self {
            graph,
            nodes,
            flows: vec![0.0; net.segments.len()],
            capacity: net.segments.iter().map(|s| s.capacity).collect(),
            min_flow: net.segments.iter().map(|s| s.min_flow).collect(),
            cost: net.segments.iter().map(|s| s.cost).collect(),
        }
    }

    /// Remaining capacity of an arc under the committed flows.
    pub fn residual(&self, edge: EdgeIndex) -> f64 {
        let arc = self.graph[edge];
        match arc.direction {
            ArcDirection::Forward => self.capacity[arc.segment] - self.flows[arc.segment],
            ArcDirection::Backward => self.flows[arc.segment] - self.min_flow[arc.segment],
        }
    }

    /// Commit `amount` of flow along a path of residual arcs.
    pub fn augment_along(&mut self, path: &[EdgeIndex], amount: f64) {
        for &edge in path {
            let arc = self.graph[edge];
            match arc.direction {
                ArcDirection::Forward => self.flows[arc.segment] += amount,
                ArcDirection::Backward => self.flows[arc.segment] -= amount,
            }
        }
    }

    /// Smallest residual along a path.
    pub fn path_residual(&self, path: &[EdgeIndex]) -> f64 {
        path.iter()
            .map(|&e| self.residual(e))
            .fold(f64::INFINITY, f64::min)
    }

    /// Flow that can still be added along a forward path before some segment
    /// reaches `ceiling` utilization.
    pub fn path_ceiling_headroom(&self, path: &[EdgeIndex], ceiling: f64) -> f64 {
        path.iter()
            .map(|&e| {
                let arc = self.graph[e];
                ceiling * self.capacity[arc.segment] - self.flows[arc.segment]
            })
            .fold(f64::INFINITY, f64::min)
    }

    /// Largest segment utilization along a path (fraction, not percent).
    pub fn max_utilization(&self, path: &[EdgeIndex]) -> f64 {
        path.iter()
            .map(|&e| {
                let arc = self.graph[e];
                self.flows[arc.segment].abs() / self.capacity[arc.segment]
            })
            .fold(0.0, f64::max)
    }

    /// Any simple path with positive residual from `source` to `target`,
    /// found depth-first over both forward and backward arcs.
    pub fn find_augmenting_path(
        &self,
        source: usize,
        target: usize,
        threshold: f64,
    ) -> Option<(Vec<EdgeIndex>, f64)> {
        let start = self.nodes[source];
        let goal = self.nodes[target];
        let mut visited = vec![false; self.graph.node_count()];
        let mut parent: Vec<Option<EdgeIndex>> = vec![None; self.graph.node_count()];
        visited[start.index()] = true;
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            if node == goal {
                let path = self.reconstruct(start, goal, &parent);
                let bottleneck = self.path_residual(&path);
                return Some((path, bottleneck));
            }
            for edge in self.graph.edges(node) {
                let next = edge.target();
                if !visited[next.index()] && self.residual(edge.id()) > threshold {
                    visited[next.index()] = true;
                    parent[next.index()] = Some(edge.id());
                    stack.push(next);
                }
            }
        }
        None
    }

    /// Cheapest forward path from any of `sources` to `target`, Dijkstra on
    /// per-unit transportation cost over arcs with residual above
    /// `threshold`. Backward arcs are not used: the cost heuristic only ever
    /// pushes new flow forward.
    pub fn cheapest_forward_path(
        &self,
        sources: &[usize],
        target: usize,
        threshold: f64,
    ) -> Option<CheapestPath> {
        let n = self.graph.node_count();
        let mut dist = vec![f64::INFINITY; n];
        let mut parent: Vec<Option<EdgeIndex>> = vec![None; n];
        let mut origin: Vec<Option<usize>> = vec![None; n];
        let mut heap = BinaryHeap::new();

        for &s in sources {
            let node = self.nodes[s];
            dist[node.index()] = 0.0;
            origin[node.index()] = Some(s);
            heap.push(HeapEntry {
                cost: 0.0,
                node,
            });
        }

        let goal = self.nodes[target];
        while let Some(HeapEntry { cost, node }) = heap.pop() {
            if cost > dist[node.index()] + 1e-12 {
                continue;
            }
            if node == goal {
                break;
            }
            for edge in self.graph.edges(node) {
                let arc = self.graph[edge.id()];
                if arc.direction != ArcDirection::Forward {
                    continue;
                }
                if self.residual(edge.id()) <= threshold {
                    continue;
                }
                let next = edge.target();
                let next_cost = cost + self.cost[arc.segment];
                if next_cost < dist[next.index()] - 1e-12 {
                    dist[next.index()] = next_cost;
                    parent[next.index()] = Some(edge.id());
                    origin[next.index()] = origin[node.index()];
                    heap.push(HeapEntry {
                        cost: next_cost,
                        node: next,
                    });
                }
            }
        }

        if dist[goal.index()].is_infinite() {
            return None;
        }
        let source = origin[goal.index()]?;
        let path = self.reconstruct(self.nodes[source], goal, &parent);
        Some(CheapestPath {
            bottleneck: self.path_residual(&path),
            unit_cost: dist[goal.index()],
            source,
            edges: path,
        })
    }

    /// All simple forward paths from `source` to `target`, bounded by depth
    /// and count so enumeration cannot blow up on dense networks.
    pub fn enumerate_forward_paths(
        &self,
        source: usize,
        target: usize,
        threshold: f64,
        max_depth: usize,
        max_paths: usize,
    ) -> Vec<Vec<EdgeIndex>> {
        let mut paths = Vec::new();
        let mut visited = vec![false; self.graph.node_count()];
        let mut current = Vec::new();
        visited[self.nodes[source].index()] = true;
        self.enumerate_rec(
            self.nodes[source],
            self.nodes[target],
            threshold,
            max_depth,
            max_paths,
            &mut visited,
            &mut current,
            &mut paths,
        );
        paths
    }

    #[allow(clippy::too_many_arguments)]
    fn enumerate_rec(
        &self,
        node: NodeIndex,
        goal: NodeIndex,
        threshold: f64,
        max_depth: usize,
        max_paths: usize,
        visited: &mut Vec<bool>,
        current: &mut Vec<EdgeIndex>,
        paths: &mut Vec<Vec<EdgeIndex>>,
    ) {
        if paths.len() >= max_paths {
            return;
        }
        if node == goal {
            paths.push(current.clone());
            return;
        }
        if current.len() >= max_depth {
            return;
        }
        for edge in self.graph.edges(node) {
            let arc = self.graph[edge.id()];
            if arc.direction != ArcDirection::Forward {
                continue;
            }
            if self.residual(edge.id()) <= threshold {
                continue;
            }
            let next = edge.target();
            if visited[next.index()] {
                continue;
            }
            visited[next.index()] = true;
            current.push(edge.id());
            self.enumerate_rec(
                next, goal, threshold, max_depth, max_paths, visited, current, paths,
            );
            current.pop();
            visited[next.index()] = false;
        }
    }

    fn reconstruct(
        &self,
        start: NodeIndex,
        goal: NodeIndex,
        parent: &[Option<EdgeIndex>],
    ) -> Vec<EdgeIndex> {
        let mut path = Vec::new();
        let mut node = goal;
        while node != start {
            let edge = parent[node.index()].expect("parent chain is complete");
            path.push(edge);
            let (from, _) = self
                .graph
                .edge_endpoints(edge)
                .expect("edge endpoints exist");
            node = from;
        }
        path.reverse();
        path
    }
}

/// Min-heap entry with deterministic tie-breaking on node index.
#[derive(Debug, Clone, Copy)]
struct HeapEntry {
    cost: f64,
    node: NodeIndex,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the cheapest first
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.index().cmp(&self.node.index()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gasnet_core::{Network, Point, Segment};

    use crate::model::FlowNetwork;

    fn diamond() -> FlowNetwork {
        // R1 -> A -> D1 and R1 -> B -> D1, with A cheaper but smaller
        let mut network = Network::new("diamond", "");
        network.add_point(Point::receipt("R1", "R1", 1000.0, 0.0).with_pressure_window(800.0, 1000.0));
        network.add_point(Point::compressor("A", "A", 100.0, 0.01).with_pressure_window(300.0, 1200.0));
        network.add_point(Point::compressor("B", "B", 100.0, 0.01).with_pressure_window(300.0, 1200.0));
        network.add_point(Point::delivery("D1", "D1", 500.0).with_pressure_window(300.0, 800.0));
        network.add_segment(Segment::new("S1", "r-a", "R1", "A", 200.0).with_cost(0.10));
        network.add_segment(Segment::new("S2", "a-d", "A", "D1", 200.0).with_cost(0.10));
        network.add_segment(Segment::new("S3", "r-b", "R1", "B", 600.0).with_cost(0.30));
        network.add_segment(Segment::new("S4", "b-d", "B", "D1", 600.0).with_cost(0.30));
        network.recompute_drop_constants();
        FlowNetwork::extract(&network).unwrap()
    }

    fn index_of(net: &FlowNetwork, id: &str) -> usize {
        net.points.iter().position(|p| p.id.as_str() == id).unwrap()
    }

    #[test]
    fn test_augmenting_path_and_residuals() {
        let net = diamond();
        let mut residual = ResidualNetwork::build(&net);
        let r1 = index_of(&net, "R1");
        let d1 = index_of(&net, "D1");

        let (path, bottleneck) = residual.find_augmenting_path(r1, d1, 0.01).unwrap();
        assert_eq!(path.len(), 2);
        residual.augment_along(&path, bottleneck);

        // A second augmentation must route over the other branch
        let (path2, bottleneck2) = residual.find_augmenting_path(r1, d1, 0.01).unwrap();
        residual.augment_along(&path2, bottleneck2);
        let total: f64 = bottleneck + bottleneck2;
        assert!((total - 800.0).abs() < 1e-9, "total = {}", total);

        // Saturated: no third path
        assert!(residual.find_augmenting_path(r1, d1, 0.01).is_none());
    }

    #[test]
    fn test_cheapest_path_prefers_low_cost() {
        let net = diamond();
        let residual = ResidualNetwork::build(&net);
        let r1 = index_of(&net, "R1");
        let d1 = index_of(&net, "D1");

        let cheapest = residual.cheapest_forward_path(&[r1], d1, 0.01).unwrap();
        assert!((cheapest.unit_cost - 0.20).abs() < 1e-9);
        assert!((cheapest.bottleneck - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_cheapest_path_reroutes_after_saturation() {
        let net = diamond();
        let mut residual = ResidualNetwork::build(&net);
        let r1 = index_of(&net, "R1");
        let d1 = index_of(&net, "D1");

        let cheap = residual.cheapest_forward_path(&[r1], d1, 0.01).unwrap();
        let amount = cheap.bottleneck;
        residual.augment_along(&cheap.edges, amount);

        let next = residual.cheapest_forward_path(&[r1], d1, 0.01).unwrap();
        assert!((next.unit_cost - 0.60).abs() < 1e-9);
    }

    #[test]
    fn test_no_path_when_disconnected() {
        let net = diamond();
        let residual = ResidualNetwork::build(&net);
        let d1 = index_of(&net, "D1");
        let a = index_of(&net, "A");
        // Nothing flows into a receipt-ward direction from D1 forward-only
        assert!(residual.cheapest_forward_path(&[d1], a, 0.01).is_none());
    }

    #[test]
    fn test_enumerate_paths_bounded() {
        let net = diamond();
        let residual = ResidualNetwork::build(&net);
        let r1 = index_of(&net, "R1");
        let d1 = index_of(&net, "D1");

        let paths = residual.enumerate_forward_paths(r1, d1, 0.01, 25, 200);
        assert_eq!(paths.len(), 2);
        let capped = residual.enumerate_forward_paths(r1, d1, 0.01, 25, 1);
        assert_eq!(capped.len(), 1);
        let shallow = residual.enumerate_forward_paths(r1, d1, 0.01, 1, 200);
        assert!(shallow.is_empty());
    }

    #[test]
    fn test_backward_arc_allows_rerouting() {
        let net = diamond();
        let mut residual = ResidualNetwork::build(&net);
        // Force flow up S1 then check its backward residual appears
        residual.flows[0] = 150.0; // S1
        let back_res: Vec<f64> = (0..residual.graph.edge_count())
            .map(|i| residual.residual(EdgeIndex::new(i)))
            .collect();
        // Edge 1 is the backward arc of segment 0
        assert!((back_res[1] - 150.0).abs() < 1e-9);
        assert!((back_res[0] - 50.0).abs() < 1e-9);
    }
}
