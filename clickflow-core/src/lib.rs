pub mod graph;
pub mod reduce;
pub mod render;
pub mod report;
pub mod traverse;

pub use graph::{Edge, EdgeKey, Graph, GraphBuilder, Node};
pub use reduce::{RESERVED_NODE_COUNT, fraction_represented};
pub use render::{Band, BandTable, RenderConfig};
pub use report::{OutputFormat, RunSummary};
