//! Graph store: canonical node/edge lists, degree map and lazily derived state

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use petgraph::graph::{NodeIndex, UnGraph};

use crate::adjacency::Adjacency;
use crate::config::EngineConfig;
use crate::error::{GraphError, GraphResult};
use crate::hash::{content_hash, HashGated};
use crate::model::{Edge, GraphData, Node, NodeId};
use crate::traversal::{self, Components, Distance, DistanceMatrix, NodeDistance};

/// The graph and everything derived from it.
///
/// Reads take `&self` and fill the derived caches on first use; mutations take
/// `&mut self` and drop the adjacency, component and hash caches. The
/// all-pairs matrix is kept across mutations and reused whenever the content
/// hash matches the one it was computed under.
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    degrees: HashMap<NodeId, usize>,
    config: EngineConfig,
    adjacency: OnceLock<Arc<Adjacency>>,
    components: OnceLock<Arc<Components>>,
    hash: OnceLock<u64>,
    pub(crate) apsp: HashGated<DistanceMatrix>,
}

impl std::fmt::Debug for GraphStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphStore")
            .field("node_count", &self.nodes.len())
            .field("edge_count", &self.edges.len())
            .finish()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        GraphStore {
            nodes: Vec::new(),
            edges: Vec::new(),
            degrees: HashMap::new(),
            config,
            adjacency: OnceLock::new(),
            components: OnceLock::new(),
            hash: OnceLock::new(),
            apsp: HashGated::new(),
        }
    }

    /// Build a store from an initial load.
    pub fn from_data(data: GraphData) -> GraphResult<Self> {
        let mut store = Self::new();
        store.set_graph(data.nodes, data.edges)?;
        Ok(store)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    // ── Mutation ────────────────────────────────────────────

    /// Replace the whole graph.
    ///
    /// Node ids must be unique. Edge endpoints are not checked here; a
    /// dangling endpoint surfaces as `DanglingEdgeReference` on the first
    /// adjacency-dependent query.
    pub fn set_graph(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> GraphResult<()> {
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(&node.id) {
                return Err(GraphError::DuplicateNode(node.id.clone()));
            }
        }

        self.nodes = nodes;
        self.edges = edges;
        self.recompute_degrees();
        self.invalidate();
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "graph replaced"
        );
        Ok(())
    }

    /// Replace the whole graph from a `{nodes, edges}` record.
    pub fn load(&mut self, data: GraphData) -> GraphResult<()> {
        self.set_graph(data.nodes, data.edges)
    }

    pub fn add_node(&mut self, node: Node) -> GraphResult<()> {
        if self.contains(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        // Bulk loads may already carry edges naming this id.
        let degree = self
            .edges
            .iter()
            .flat_map(|e| [&e.source, &e.target])
            .filter(|endpoint| **endpoint == node.id)
            .count();
        self.degrees.insert(node.id.clone(), degree);
        self.nodes.push(node);
        self.invalidate();
        Ok(())
    }

    /// Remove a node and every edge incident to it.
    pub fn remove_node(&mut self, id: &NodeId) -> GraphResult<Node> {
        let position = self
            .nodes
            .iter()
            .position(|n| &n.id == id)
            .ok_or_else(|| GraphError::NotFound(id.clone()))?;
        let node = self.nodes.remove(position);

        let degrees = &mut self.degrees;
        let before = self.edges.len();
        self.edges.retain(|edge| {
            if !edge.touches(id) {
                return true;
            }
            for endpoint in [&edge.source, &edge.target] {
                if endpoint != id {
                    if let Some(d) = degrees.get_mut(endpoint) {
                        *d = d.saturating_sub(1);
                    }
                }
            }
            false
        });
        self.degrees.remove(id);
        self.invalidate();

        tracing::debug!(
            node = %id,
            removed_edges = before - self.edges.len(),
            "node removed"
        );
        Ok(node)
    }

    /// Add an undirected edge between two existing nodes.
    pub fn add_edge(
        &mut self,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> GraphResult<()> {
        self.insert_edge(Edge::new(source, target))
    }

    /// Add an edge carrying attributes. Both endpoints must exist.
    pub fn insert_edge(&mut self, edge: Edge) -> GraphResult<()> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.contains(endpoint) {
                return Err(GraphError::NotFound(endpoint.clone()));
            }
        }
        self.bump_degrees(&edge, true);
        self.edges.push(edge);
        self.invalidate();
        Ok(())
    }

    /// Remove the first edge joining `source` and `target`, in either
    /// orientation.
    pub fn remove_edge(&mut self, source: &NodeId, target: &NodeId) -> GraphResult<Edge> {
        for endpoint in [source, target] {
            if !self.contains(endpoint) {
                return Err(GraphError::NotFound(endpoint.clone()));
            }
        }
        let position = self
            .edges
            .iter()
            .position(|e| e.connects(source, target))
            .ok_or_else(|| GraphError::EdgeNotFound {
                source_id: source.clone(),
                target_id: target.clone(),
            })?;
        let edge = self.edges.remove(position);
        self.bump_degrees(&edge, false);
        self.invalidate();
        Ok(edge)
    }

    /// Degree counts each incident endpoint, so a self-loop adds two.
    fn bump_degrees(&mut self, edge: &Edge, add: bool) {
        for endpoint in [&edge.source, &edge.target] {
            if let Some(d) = self.degrees.get_mut(endpoint) {
                *d = if add { *d + 1 } else { d.saturating_sub(1) };
            }
        }
    }

    fn recompute_degrees(&mut self) {
        self.degrees = self.nodes.iter().map(|n| (n.id.clone(), 0)).collect();
        for edge in &self.edges {
            for endpoint in [&edge.source, &edge.target] {
                if let Some(d) = self.degrees.get_mut(endpoint) {
                    *d += 1;
                }
            }
        }
    }

    fn invalidate(&mut self) {
        self.adjacency = OnceLock::new();
        self.components = OnceLock::new();
        self.hash = OnceLock::new();
    }

    // ── Reads ───────────────────────────────────────────────

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.degrees.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn degree(&self, id: &NodeId) -> GraphResult<usize> {
        self.degrees
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NotFound(id.clone()))
    }

    /// Node id → degree mapping.
    pub fn degrees(&self) -> &HashMap<NodeId, usize> {
        &self.degrees
    }

    /// Snapshot as a plain `{nodes, edges}` record.
    pub fn to_data(&self) -> GraphData {
        GraphData::new(self.nodes.clone(), self.edges.clone())
    }

    /// Content hash over node ids and edge endpoints, cached until the next
    /// mutation.
    pub fn content_hash(&self) -> u64 {
        *self
            .hash
            .get_or_init(|| content_hash(&self.nodes, &self.edges))
    }

    // ── Derived structure ───────────────────────────────────

    /// Index map and neighbor lists, built on first use after a mutation.
    pub fn build_index(&self) -> GraphResult<Arc<Adjacency>> {
        if let Some(adj) = self.adjacency.get() {
            return Ok(Arc::clone(adj));
        }
        let built = Arc::new(Adjacency::build(&self.nodes, &self.edges)?);
        Ok(Arc::clone(self.adjacency.get_or_init(|| built)))
    }

    /// Index of a node id in the node sequence.
    pub fn index_of(&self, id: &NodeId) -> GraphResult<usize> {
        self.build_index()?.index_map().index_of(id)
    }

    /// Hop counts from the node at `source`; `UNREACHABLE` where no path exists.
    pub fn single_source_shortest_paths(&self, source: usize) -> GraphResult<Vec<Distance>> {
        traversal::single_source_shortest_paths(&*self.build_index()?, source)
    }

    /// Hop counts from the node `source`, keyed by node id in node order.
    pub fn shortest_path_lengths_from(&self, source: &NodeId) -> GraphResult<Vec<NodeDistance>> {
        let adj = self.build_index()?;
        let from = adj.index_map().index_of(source)?;
        let dist = traversal::single_source_shortest_paths(&adj, from)?;
        Ok(adj
            .index_map()
            .ids()
            .iter()
            .zip(dist)
            .map(|(id, d)| NodeDistance {
                id: id.clone(),
                distance: u32::try_from(d).ok(),
            })
            .collect())
    }

    /// Component partition, retained until the next mutation.
    pub fn components(&self) -> GraphResult<Arc<Components>> {
        if let Some(comps) = self.components.get() {
            return Ok(Arc::clone(comps));
        }
        let comps = Arc::new(traversal::connected_components(&*self.build_index()?));
        tracing::debug!(components = comps.count(), "components discovered");
        Ok(Arc::clone(self.components.get_or_init(|| comps)))
    }

    /// Number of connected components.
    pub fn connected_components(&self) -> GraphResult<usize> {
        Ok(self.components()?.count())
    }

    /// Components as node ids, members in node order.
    pub fn component_ids(&self) -> GraphResult<Vec<Vec<NodeId>>> {
        let comps = self.components()?;
        Ok(comps
            .members()
            .iter()
            .map(|members| members.iter().map(|&i| self.nodes[i].id.clone()).collect())
            .collect())
    }

    /// Hand the graph to petgraph-based collaborators. Node weights are ids and
    /// petgraph node indices equal store indices.
    pub fn to_petgraph(&self) -> GraphResult<UnGraph<NodeId, ()>> {
        let adj = self.build_index()?;
        let mut graph = UnGraph::with_capacity(self.nodes.len(), self.edges.len());
        for node in &self.nodes {
            graph.add_node(node.id.clone());
        }
        for edge in &self.edges {
            let s = adj.index_map().index_of(&edge.source)?;
            let t = adj.index_map().index_of(&edge.target)?;
            graph.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
        }
        Ok(graph)
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}
