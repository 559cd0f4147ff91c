//! Directed weighted topology graph built from hop transitions.
//!
//! Adjacency-map representation over plain std collections. The graph
//! is rebuilt from scratch on every analysis run and never persisted;
//! nodes only enter via edges, so there are no isolated nodes by
//! construction.

use std::collections::{HashMap, HashSet};

use super::types::EdgeReport;

#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    nodes: HashSet<String>,
    out_adj: HashMap<String, HashSet<String>>,
    in_adj: HashMap<String, HashSet<String>>,
    weights: HashMap<(String, String), u32>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate one observed route. Each consecutive hop pair
    /// increments the edge weight by one, creating the edge at weight 1
    /// if absent. Sequences shorter than two hops contribute nothing.
    /// Additive across calls; weights never reset.
    pub fn add_route(&mut self, hops: &[String]) {
        if hops.len() < 2 {
            return;
        }

        for pair in hops.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);

            self.nodes.insert(from.clone());
            self.nodes.insert(to.clone());

            self.out_adj
                .entry(from.clone())
                .or_default()
                .insert(to.clone());
            self.in_adj
                .entry(to.clone())
                .or_default()
                .insert(from.clone());

            *self
                .weights
                .entry((from.clone(), to.clone()))
                .or_insert(0) += 1;
        }
    }

    pub fn nodes(&self) -> &HashSet<String> {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Unique successors of `node`
    pub fn neighbors_out(&self, node: &str) -> Option<&HashSet<String>> {
        self.out_adj.get(node)
    }

    /// Unique predecessors of `node`
    pub fn neighbors_in(&self, node: &str) -> Option<&HashSet<String>> {
        self.in_adj.get(node)
    }

    pub fn edge_weight(&self, from: &str, to: &str) -> u32 {
        self.weights
            .get(&(from.to_string(), to.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&(String, String), &u32)> {
        self.weights.iter()
    }

    /// Edges as report entries, sorted by weight descending then
    /// endpoints, for deterministic output.
    pub fn edge_reports(&self) -> Vec<EdgeReport> {
        let mut edges: Vec<EdgeReport> = self
            .weights
            .iter()
            .map(|((from, to), weight)| EdgeReport {
                from: from.clone(),
                to: to.clone(),
                weight: *weight,
            })
            .collect();
        edges.sort_by(|a, b| {
            b.weight
                .cmp(&a.weight)
                .then_with(|| a.from.cmp(&b.from))
                .then_with(|| a.to.cmp(&b.to))
        });
        edges
    }

    /// Undirected projection used for weak connectivity: every directed
    /// edge implies adjacency both ways, for this purpose only.
    pub fn undirected_adjacency(&self) -> HashMap<String, HashSet<String>> {
        let mut adj: HashMap<String, HashSet<String>> = HashMap::new();
        for node in &self.nodes {
            adj.entry(node.clone()).or_default();
        }
        for (from, to) in self.weights.keys() {
            adj.entry(from.clone()).or_default().insert(to.clone());
            adj.entry(to.clone()).or_default().insert(from.clone());
        }
        adj
    }
}
