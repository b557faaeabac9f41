//! graphstat core: graph store, adjacency, traversal and structural metrics
//! for undirected, unweighted node/edge graphs.

pub mod adjacency;
pub mod config;
pub mod error;
pub mod hash;
pub mod metrics;
pub mod model;
pub mod store;
pub mod traversal;


#[cfg(test)]
pub mod test_utils;

pub use adjacency::{Adjacency, NodeIndexMap};
pub use config::{Config, EngineConfig, PathStrategy, WatchConfig, CONFIG_FILE};
pub use error::{GraphError, GraphResult};
pub use hash::{content_hash, HashGated};
pub use metrics::GraphStats;
pub use model::{AttrValue, Attributes, Edge, GraphData, Node, NodeId};
pub use store::GraphStore;
pub use traversal::{Components, Distance, DistanceMatrix, NodeDistance, UNREACHABLE};
