pub mod annotations;
pub mod collection;
pub mod edge;
pub mod error;
pub mod graph;
pub mod id;
pub mod node;
pub mod time;

// Re-export commonly used types
pub use annotations::Annotations;
pub use collection::{StaticEdges, TemporalEdges};
pub use edge::{Edge, StaticEdge, TemporalEdge};
pub use error::CoreError;
pub use graph::{EdgeRecord, EdgeSet, Graph, GraphKind, GraphSummary};
pub use id::EdgeUid;
pub use node::Node;
pub use time::{Distance, Interval, Time, Timespan};
