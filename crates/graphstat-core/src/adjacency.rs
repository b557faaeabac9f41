//! Adjacency builder: id→index map plus per-node neighbor index lists
//!
//! Indices are positions in the store's node sequence. Every edge contributes
//! one entry on each endpoint, so a self-loop puts its own index into the
//! node's list twice and each list length equals the node's degree.

use std::collections::HashMap;

use crate::error::{GraphError, GraphResult};
use crate::model::{Edge, Node, NodeId};

/// Bijective mapping from node id to position in the node sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeIndexMap {
    index: HashMap<NodeId, usize>,
    ids: Vec<NodeId>,
}

impl NodeIndexMap {
    /// Build from the node sequence. Fails on repeated ids.
    pub fn build(nodes: &[Node]) -> GraphResult<Self> {
        let mut index = HashMap::with_capacity(nodes.len());
        let mut ids = Vec::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
            ids.push(node.id.clone());
        }
        Ok(NodeIndexMap { index, ids })
    }

    pub fn get(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Like [`get`](Self::get) but reports `NotFound`.
    pub fn index_of(&self, id: &NodeId) -> GraphResult<usize> {
        self.get(id).ok_or_else(|| GraphError::NotFound(id.clone()))
    }

    pub fn id(&self, index: usize) -> Option<&NodeId> {
        self.ids.get(index)
    }

    /// Ids in index order.
    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Adjacency-list view of the graph over dense node indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    index: NodeIndexMap,
    neighbors: Vec<Vec<usize>>,
}

impl Adjacency {
    /// Build the index map and neighbor lists in O(V + E).
    ///
    /// Fails with `DanglingEdgeReference` if an edge names a node that is not
    /// in `nodes`.
    pub fn build(nodes: &[Node], edges: &[Edge]) -> GraphResult<Self> {
        let index = NodeIndexMap::build(nodes)?;
        let mut neighbors = vec![Vec::new(); nodes.len()];

        for edge in edges {
            let resolve = |id: &NodeId| {
                index.get(id).ok_or_else(|| GraphError::DanglingEdgeReference {
                    source_id: edge.source.clone(),
                    target_id: edge.target.clone(),
                    missing: id.clone(),
                })
            };
            let s = resolve(&edge.source)?;
            let t = resolve(&edge.target)?;
            neighbors[s].push(t);
            neighbors[t].push(s);
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            "adjacency built"
        );

        Ok(Adjacency { index, neighbors })
    }

    pub fn index_map(&self) -> &NodeIndexMap {
        &self.index
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbor indices of `index`, with repeats for parallel edges and self-loops.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.neighbors[index]
    }

    pub fn degree(&self, index: usize) -> usize {
        self.neighbors[index].len()
    }
}
