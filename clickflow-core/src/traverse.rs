use crate::graph::Edge;

/// Slack for accumulated rounding when comparing running sums.
const CUMULATIVE_TOLERANCE: f64 = 1e-9;

/// An outgoing edge annotated with the running `local_rank` sum up to and
/// including it.
#[derive(Debug, Clone, Copy)]
pub struct CumulativeEdge<'a> {
    pub edge: &'a Edge,
    pub cumulative: f64,
    pub within: bool,
}

/// Walks `edges` (most visited first) and marks each one whose cumulative
/// `local_rank` stays within `threshold`.
pub fn cumulative_edges<'a>(
    edges: impl IntoIterator<Item = &'a Edge>,
    threshold: f64,
) -> Vec<CumulativeEdge<'a>> {
    let mut sofar = 0.0;
    edges
        .into_iter()
        .map(|edge| {
            sofar += edge.local_rank;
            CumulativeEdge {
                edge,
                cumulative: sofar,
                within: sofar <= threshold + CUMULATIVE_TOLERANCE,
            }
        })
        .collect()
}

/// The prefix of `edges` whose cumulative `local_rank` is at most
/// `threshold`.
pub fn edges_within<'a>(edges: impl IntoIterator<Item = &'a Edge>, threshold: f64) -> Vec<&'a Edge> {
    cumulative_edges(edges, threshold)
        .into_iter()
        .take_while(|annotated| annotated.within)
        .map(|annotated| annotated.edge)
        .collect()
}
