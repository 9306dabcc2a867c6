// Graphviz rendering of a reduced graph

use crate::graph::{Graph, Node, ratio};
use crate::reduce::fraction_represented;
use crate::traverse::edges_within;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub const DEFAULT_LINK_BASE: &str = "https://ca-test.adyen.com/ca/ca";
pub const DEFAULT_SUBJECT: &str = "clicks";

/// Visual encoding for values in `[lower, upper)`. A missing `upper` is
/// unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: f64,
    #[serde(default)]
    pub upper: Option<f64>,
    pub color: String,
    pub penwidth: f64,
}

impl Band {
    pub fn new(lower: f64, upper: Option<f64>, color: &str, penwidth: f64) -> Self {
        Self {
            lower,
            upper,
            color: color.to_string(),
            penwidth,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && self.upper.is_none_or(|upper| value < upper)
    }
}

/// Ordered threshold bands; the first band containing a value wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandTable(pub Vec<Band>);

impl BandTable {
    /// Node bands: grey, black, orange and red per tenth of the clicks, then
    /// red with a heavy line from 40% up.
    pub fn node_default() -> Self {
        BandTable(vec![
            Band::new(0.0, Some(0.1), "grey", 1.0),
            Band::new(0.1, Some(0.2), "black", 2.0),
            Band::new(0.2, Some(0.3), "orange", 3.0),
            Band::new(0.3, Some(0.4), "red", 4.0),
            Band::new(0.4, None, "red", 6.0),
        ])
    }

    /// Edge bands: the node scheme per hundredth of the clicks.
    pub fn edge_default() -> Self {
        BandTable(vec![
            Band::new(0.0, Some(0.01), "grey", 1.0),
            Band::new(0.01, Some(0.02), "black", 2.0),
            Band::new(0.02, Some(0.03), "orange", 3.0),
            Band::new(0.03, Some(0.04), "red", 4.0),
            Band::new(0.04, None, "red", 6.0),
        ])
    }

    /// The band containing `value`, else the last band.
    pub fn lookup(&self, value: f64) -> Option<&Band> {
        self.0
            .iter()
            .find(|band| band.contains(value))
            .or_else(|| self.0.last())
    }

    fn style(&self, value: f64) -> (&str, f64) {
        self.lookup(value)
            .map(|band| (band.color.as_str(), band.penwidth))
            .unwrap_or(("black", 1.0))
    }
}

/// Threshold tables and link template used by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Keyed on a node's share of the original clicks.
    pub node_bands: BandTable,
    /// Keyed on an edge's global rank.
    pub edge_bands: BandTable,
    pub link_base: String,
    /// What the title says the clicks are of.
    pub subject: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            node_bands: BandTable::node_default(),
            edge_bands: BandTable::edge_default(),
            link_base: DEFAULT_LINK_BASE.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
        }
    }
}

impl RenderConfig {
    /// Loads a JSON config; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(io::Error::from)
    }

    pub fn link_for(&self, node_name: &str) -> String {
        format!(
            "{}/{}",
            self.link_base.trim_end_matches('/'),
            node_name.trim_start_matches('/')
        )
    }
}

/// Renders `graph` as a Graphviz digraph. Percentages on nodes are relative
/// to `original_click_count`, the total of the unreduced graph.
pub fn generate_dot(graph: &Graph, original_click_count: u64, config: &RenderConfig) -> String {
    let represented = fraction_represented(graph.total_click_count(), original_click_count);

    let mut dot = String::new();
    dot.push_str("\n\ndigraph mygraph {\n");
    dot.push_str("\trankdir = \"TD\"");

    for node in graph.nodes() {
        dot.push_str(&node_statement(node, original_click_count, config));

        for edge in edges_within(graph.outgoing(node), represented) {
            let (color, penwidth) = config.edge_bands.style(edge.rank);
            dot.push_str(&format!(
                "\t\"{}\" -> \"{}\" [label=\"{:.0}% ({})\", penwidth={:.0}, color={}];\n",
                escape(edge.origin()),
                escape(edge.destination()),
                edge.local_rank * 100.0,
                edge.visit_count,
                penwidth,
                color
            ));
        }
    }

    dot.push_str("\n\tfontsize = \"40\"\n");
    dot.push_str(&format!(
        "\tlabel=\"Top {} screens represent {:.0} % of {}\"\n",
        graph.screen_count(),
        represented * 100.0,
        escape(&config.subject)
    ));
    dot.push_str("\tlabelloc=\"t\"\n\n");
    dot.push_str("}\n");

    dot
}

pub fn write_dot<W: Write>(
    out: &mut W,
    graph: &Graph,
    original_click_count: u64,
    config: &RenderConfig,
) -> io::Result<()> {
    out.write_all(generate_dot(graph, original_click_count, config).as_bytes())
}

fn node_statement(node: &Node, original_click_count: u64, config: &RenderConfig) -> String {
    let name = escape(&node.name);
    if node.is_marker() {
        return format!("\n\t\"{name}\" [shape=circle, style=filled, color=black, fontcolor=white];\n");
    }

    let factor = ratio(node.visit_count, original_click_count);
    let (color, penwidth) = config.node_bands.style(factor);
    format!(
        "\n\t\"{}\" [label=\"{}\\n{:.0}% ({})\", penwidth={:.0}, color={}, href=\"{}\"];\n",
        name,
        name,
        factor * 100.0,
        node.visit_count,
        penwidth,
        color,
        escape(&config.link_for(&node.name))
    )
}

/// Escapes a value for use inside a double-quoted DOT string.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
