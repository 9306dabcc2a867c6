use crate::graph::{Graph, click_count, ratio};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// The `start` and `end` markers; add this to a "top N screens" limit before
/// calling [`Graph::reduce_to`].
pub const RESERVED_NODE_COUNT: usize = 2;

impl Graph {
    /// Returns a new graph holding only the `limit` most visited nodes and
    /// the edges between them. `limit` counts the `start`/`end` markers and
    /// is clamped to the node count.
    ///
    /// Node and edge ranks are carried over from `self` unchanged, so they
    /// stay comparable with the full data set. Only `total_click_count` is
    /// recomputed over the retained edges.
    pub fn reduce_to(&self, limit: usize) -> Graph {
        let keep = limit.min(self.nodes_by_visit_desc.len());
        let selected: Vec<String> = self.nodes_by_visit_desc[..keep].to_vec();
        let selected_names: BTreeSet<&str> = selected.iter().map(String::as_str).collect();

        let edges: BTreeMap<_, _> = self
            .edges
            .iter()
            .filter(|(key, _)| {
                selected_names.contains(key.origin.as_str())
                    && selected_names.contains(key.destination.as_str())
            })
            .map(|(key, edge)| (key.clone(), edge.clone()))
            .collect();

        let total_click_count = click_count(
            edges
                .values()
                .map(|edge| (edge.destination(), edge.visit_count)),
        );

        let nodes = selected
            .iter()
            .filter_map(|name| self.nodes.get(name))
            .map(|node| {
                let mut node = node.clone();
                node.outgoing.retain(|key| edges.contains_key(key));
                (node.name.clone(), node)
            })
            .collect();

        debug!(
            "Reduced graph from {} to {} nodes, {} of {} clicks kept",
            self.node_count(),
            keep,
            total_click_count,
            self.total_click_count
        );

        Graph {
            total_click_count,
            nodes,
            edges,
            nodes_by_visit_desc: selected,
        }
    }
}

/// Share of the original clicks a reduced graph still covers.
pub fn fraction_represented(reduced_click_count: u64, original_click_count: u64) -> f64 {
    ratio(reduced_click_count, original_click_count)
}
