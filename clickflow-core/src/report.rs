// Report generation from a ranked graph

use crate::graph::Graph;
use crate::reduce::fraction_represented;
use crate::traverse::cumulative_edges;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Dot,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dot" | "graphviz" => Some(OutputFormat::Dot),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Counts reported on the diagnostic stream for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub visits: usize,
    pub sessions: usize,
    pub full_nodes: usize,
    pub reduced_screens: usize,
    pub fraction_represented: f64,
}

impl RunSummary {
    pub fn new(visits: usize, sessions: usize, full: &Graph, reduced: &Graph) -> Self {
        Self {
            visits,
            sessions,
            full_nodes: full.node_count(),
            reduced_screens: reduced.screen_count(),
            fraction_represented: fraction_represented(
                reduced.total_click_count(),
                full.total_click_count(),
            ),
        }
    }

    pub fn average_session_length(&self) -> f64 {
        if self.sessions == 0 {
            0.0
        } else {
            self.visits as f64 / self.sessions as f64
        }
    }

    pub fn to_text(&self) -> String {
        let mut text = String::new();
        text.push_str(&format!(
            "Found {} visits, divided over {} sessions, so on average {:.0} clicks per session.\n",
            self.visits,
            self.sessions,
            self.average_session_length()
        ));
        text.push_str(&format!(
            "Entire data-set contains {} nodes. After reducing to top {}, {:.0} % of all clicks is still represented\n",
            self.full_nodes,
            self.reduced_screens,
            self.fraction_represented * 100.0
        ));
        text
    }
}

/// Dumps every node and its outgoing edges with the running share of the
/// node's traffic. Edges beyond `represented` are parenthesized. Ends with
/// the rank sum of the real screens, which should be close to 100.
pub fn generate_graph_dump(graph: &Graph, represented: f64) -> String {
    let mut dump = String::new();
    let mut node_sum = 0.0;

    for node in graph.nodes() {
        dump.push_str(&format!("{}\n", node));

        for annotated in cumulative_edges(graph.outgoing(node), represented) {
            let percent = annotated.cumulative * 100.0;
            if annotated.within {
                dump.push_str(&format!("\t{} ({:.0})\n", annotated.edge, percent));
            } else {
                dump.push_str(&format!("\t({} ({:.0}))\n", annotated.edge, percent));
            }
        }

        if !node.is_marker() {
            node_sum += node.rank;
        }
    }

    dump.push_str(&format!(
        "***Node sum: {} {:.0}\n",
        graph.total_click_count(),
        node_sum * 100.0
    ));
    dump
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphReport {
    pub total_click_count: u64,
    pub original_click_count: u64,
    pub fraction_represented: f64,
    pub screens: usize,
    pub nodes: Vec<NodeReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NodeReport {
    pub name: String,
    pub visit_count: u64,
    pub rank: f64,
    pub edges: Vec<EdgeReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EdgeReport {
    pub destination: String,
    pub visit_count: u64,
    pub rank: f64,
    pub local_rank: f64,
    pub cumulative_local_rank: f64,
    pub within_represented: bool,
}

pub fn gather_report_data(graph: &Graph, original_click_count: u64) -> GraphReport {
    let represented = fraction_represented(graph.total_click_count(), original_click_count);

    let nodes = graph
        .nodes()
        .map(|node| NodeReport {
            name: node.name.clone(),
            visit_count: node.visit_count,
            rank: node.rank,
            edges: cumulative_edges(graph.outgoing(node), represented)
                .into_iter()
                .map(|annotated| EdgeReport {
                    destination: annotated.edge.destination().to_string(),
                    visit_count: annotated.edge.visit_count,
                    rank: annotated.edge.rank,
                    local_rank: annotated.edge.local_rank,
                    cumulative_local_rank: annotated.cumulative,
                    within_represented: annotated.within,
                })
                .collect(),
        })
        .collect();

    GraphReport {
        total_click_count: graph.total_click_count(),
        original_click_count,
        fraction_represented: represented,
        screens: graph.screen_count(),
        nodes,
    }
}

pub fn generate_json_report(
    graph: &Graph,
    original_click_count: u64,
) -> Result<String, serde_json::Error> {
    let data = gather_report_data(graph, original_click_count);

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Clickflow",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "graph": data
        }
    });

    serde_json::to_string_pretty(&json_report)
}
