//! Error types for graph store and metric operations

use crate::model::NodeId;
use thiserror::Error;

/// Errors raised by the graph store, adjacency build and metrics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A node id is not present in the store.
    #[error("node not found: {0}")]
    NotFound(NodeId),

    /// No edge joins the two nodes.
    #[error("edge not found: {source_id} -- {target_id}")]
    EdgeNotFound { source_id: NodeId, target_id: NodeId },

    /// An edge endpoint is absent from the node list at adjacency-build time.
    #[error("edge {source_id} -- {target_id} references missing node {missing}")]
    DanglingEdgeReference {
        source_id: NodeId,
        target_id: NodeId,
        missing: NodeId,
    },

    /// A node index is outside the current node sequence.
    #[error("node index {index} out of range for {len} nodes")]
    IndexOutOfRange { index: usize, len: usize },

    /// Node ids must be unique.
    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    /// Statistic requested on a graph with no nodes.
    #[error("graph has no nodes")]
    EmptyGraph,

    /// Statistic needs more nodes than the graph has.
    #[error("statistic needs at least {required} nodes, graph has {actual}")]
    InsufficientNodes { required: usize, actual: usize },

    /// Average path length requested but no two nodes are connected.
    #[error("no pair of nodes is connected")]
    NoReachablePairs,

    /// All-pairs computation refused by the configured size guard.
    #[error("graph has {nodes} nodes, all-pairs limit is {limit}")]
    GraphTooLarge { nodes: usize, limit: usize },
}

impl GraphError {
    /// True for "not enough data" conditions, as opposed to structural errors.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            GraphError::EmptyGraph
                | GraphError::InsufficientNodes { .. }
                | GraphError::NoReachablePairs
        )
    }
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
