// Screen-transition graph: two-phase construction and ranking

use clickflow_logs::event::{END_SCREEN, START_SCREEN, is_marker};
use clickflow_logs::{SessionMap, VisitEvent};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Composite key of a transition `origin -> destination`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    pub origin: String,
    pub destination: String,
}

impl EdgeKey {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }
}

/// A distinct screen with its aggregate visit statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub name: String,
    pub visit_count: u64,
    /// `visit_count / total_click_count`
    pub rank: f64,
    /// Keys of the outgoing edges, most visited first.
    pub(crate) outgoing: Vec<EdgeKey>,
}

impl Node {
    pub fn outgoing_keys(&self) -> &[EdgeKey] {
        &self.outgoing
    }

    pub fn is_marker(&self) -> bool {
        is_marker(&self.name)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node: {} ({:.0}%)", self.name, self.rank * 100.0)
    }
}

/// An observed transition between two screens.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub key: EdgeKey,
    pub visit_count: u64,
    /// `visit_count / total_click_count`
    pub rank: f64,
    /// `visit_count / origin.visit_count`
    pub local_rank: f64,
}

impl Edge {
    pub fn origin(&self) -> &str {
        &self.key.origin
    }

    pub fn destination(&self) -> &str {
        &self.key.destination
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "edge: {} -> {} ({:.0}%)",
            self.origin(),
            self.destination(),
            self.local_rank * 100.0
        )
    }
}

/// Ranked, immutable transition graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    pub(crate) total_click_count: u64,
    pub(crate) nodes: BTreeMap<String, Node>,
    pub(crate) edges: BTreeMap<EdgeKey, Edge>,
    pub(crate) nodes_by_visit_desc: Vec<String>,
}

impl Graph {
    /// Builds and ranks the graph of every session in `sessions`.
    pub fn from_sessions(sessions: &SessionMap) -> Self {
        let mut builder = GraphBuilder::new();
        for session in sessions.values() {
            builder.record_session(session);
        }
        builder.finish()
    }

    /// Sum of edge visits, excluding transitions into `end`.
    pub fn total_click_count(&self) -> u64 {
        self.total_click_count
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of nodes that are real screens, not session markers.
    pub fn screen_count(&self) -> usize {
        self.nodes.values().filter(|node| !node.is_marker()).count()
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    pub fn edge(&self, origin: &str, destination: &str) -> Option<&Edge> {
        self.edges.get(&EdgeKey::new(origin, destination))
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Nodes ordered by visit count, highest first.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes_by_visit_desc
            .iter()
            .filter_map(|name| self.nodes.get(name))
    }

    /// Edges ordered by `(origin, destination)`.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Outgoing edges of `node`, highest visit count first.
    pub fn outgoing<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Edge> {
        node.outgoing.iter().filter_map(|key| self.edges.get(key))
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node-count:{} - total-click-count: {}",
            self.node_count(),
            self.total_click_count
        )
    }
}

/// Accumulates raw visit counts for nodes and edges. Nothing is ranked
/// until [`GraphBuilder::finish`].
#[derive(Debug, Default)]
pub struct GraphBuilder {
    node_visits: BTreeMap<String, u64>,
    edge_visits: BTreeMap<EdgeKey, u64>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts every visit of `session` and every consecutive pair of visits.
    /// `session` must already be ordered on time.
    pub fn record_session(&mut self, session: &[VisitEvent]) {
        for event in session {
            *self
                .node_visits
                .entry(event.screen_name.clone())
                .or_default() += 1;
        }

        for pair in session.windows(2) {
            let key = EdgeKey::new(pair[0].screen_name.clone(), pair[1].screen_name.clone());
            *self.edge_visits.entry(key).or_default() += 1;
        }
    }

    /// Runs the ranking pass and freezes the result.
    pub fn finish(self) -> Graph {
        let GraphBuilder {
            node_visits,
            edge_visits,
        } = self;

        let total_click_count = click_count(
            edge_visits
                .iter()
                .map(|(key, visits)| (key.destination.as_str(), *visits)),
        );

        let mut outgoing: BTreeMap<String, Vec<(u64, EdgeKey)>> = BTreeMap::new();
        let mut edges = BTreeMap::new();
        for (key, visit_count) in edge_visits {
            let origin_visits = node_visits.get(&key.origin).copied().unwrap_or(0);
            outgoing
                .entry(key.origin.clone())
                .or_default()
                .push((visit_count, key.clone()));
            edges.insert(
                key.clone(),
                Edge {
                    key,
                    visit_count,
                    rank: ratio(visit_count, total_click_count),
                    local_rank: ratio(visit_count, origin_visits),
                },
            );
        }

        let mut nodes = BTreeMap::new();
        for (name, visit_count) in node_visits {
            let mut ranked = outgoing.remove(&name).unwrap_or_default();
            ranked.sort_by(|(a_visits, a), (b_visits, b)| {
                b_visits
                    .cmp(a_visits)
                    .then_with(|| a.destination.cmp(&b.destination))
            });

            nodes.insert(
                name.clone(),
                Node {
                    name,
                    visit_count,
                    rank: ratio(visit_count, total_click_count),
                    outgoing: ranked.into_iter().map(|(_, key)| key).collect(),
                },
            );
        }

        let mut by_visits: Vec<&Node> = nodes.values().collect();
        by_visits.sort_by(|a, b| visit_order(a, b));
        let nodes_by_visit_desc = by_visits.into_iter().map(|node| node.name.clone()).collect();

        debug!(
            "Built graph with {} nodes, {} edges and {} clicks",
            nodes.len(),
            edges.len(),
            total_click_count
        );

        Graph {
            total_click_count,
            nodes,
            edges,
            nodes_by_visit_desc,
        }
    }
}

/// Sums visits of transitions whose destination is not `end`; reaching `end`
/// is not a click.
pub(crate) fn click_count<'a>(edges: impl IntoIterator<Item = (&'a str, u64)>) -> u64 {
    edges
        .into_iter()
        .filter(|(destination, _)| *destination != END_SCREEN)
        .map(|(_, visits)| visits)
        .sum()
}

/// `part / whole`, defined as 0 for an empty whole.
pub(crate) fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Visit count descending. Ties put `start`, then `end`, ahead of real
/// screens, then order by name.
fn visit_order(a: &Node, b: &Node) -> Ordering {
    b.visit_count
        .cmp(&a.visit_count)
        .then_with(|| marker_priority(&a.name).cmp(&marker_priority(&b.name)))
        .then_with(|| a.name.cmp(&b.name))
}

fn marker_priority(name: &str) -> u8 {
    match name {
        START_SCREEN => 0,
        END_SCREEN => 1,
        _ => 2,
    }
}
