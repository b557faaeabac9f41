//! Structural metrics over the graph store
//!
//! Degenerate statistics (no nodes, too few nodes, nothing connected) come back
//! as typed errors, never NaN or infinity; [`GraphStats`] folds them into
//! `None` for display.

use std::sync::Arc;

use serde::Serialize;

use crate::config::PathStrategy;
use crate::error::{GraphError, GraphResult};
use crate::model::{GraphData, NodeId};
use crate::store::GraphStore;
use crate::traversal::{self, DistanceMatrix};

/// Largest finite entry of a distance matrix. Disconnected pairs are ignored.
pub fn diameter_of(matrix: &DistanceMatrix) -> GraphResult<u32> {
    if matrix.size() < 2 {
        return Err(GraphError::InsufficientNodes {
            required: 2,
            actual: matrix.size(),
        });
    }
    Ok(matrix.reachable_pairs().max().unwrap_or(0))
}

/// Mean hop count over unordered reachable pairs `i < j`.
pub fn average_path_length_of(matrix: &DistanceMatrix) -> GraphResult<f64> {
    if matrix.size() < 2 {
        return Err(GraphError::InsufficientNodes {
            required: 2,
            actual: matrix.size(),
        });
    }
    let (sum, pairs) = matrix
        .reachable_pairs()
        .fold((0u64, 0u64), |(sum, pairs), d| (sum + u64::from(d), pairs + 1));
    if pairs == 0 {
        return Err(GraphError::NoReachablePairs);
    }
    Ok(sum as f64 / pairs as f64)
}

/// `2E / (V(V−1))`, or `None` when undefined (fewer than two nodes).
pub fn density_of(node_count: usize, edge_count: usize) -> Option<f64> {
    if node_count <= 1 {
        tracing::warn!(
            nodes = node_count,
            "density undefined for fewer than two nodes"
        );
        return None;
    }
    let v = node_count as f64;
    Some(2.0 * edge_count as f64 / (v * (v - 1.0)))
}

/// Summary of every metric, ready for serialization.
///
/// Metrics that are undefined for this graph are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub average_degree: Option<f64>,
    pub component_count: usize,
    pub largest_component_size: usize,
    pub density: Option<f64>,
    pub diameter: Option<u32>,
    pub average_path_length: Option<f64>,
    /// Content hash as 16 hex digits.
    pub content_hash: String,
}

/// Turn a degenerate-statistic error into `None`, keep structural errors.
fn defined<T>(result: GraphResult<T>) -> GraphResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_degenerate() => Ok(None),
        Err(e) => Err(e),
    }
}

impl GraphStore {
    /// Mean node degree.
    pub fn average_degree(&self) -> GraphResult<f64> {
        if self.node_count() == 0 {
            return Err(GraphError::EmptyGraph);
        }
        let total: usize = self.degrees().values().sum();
        Ok(total as f64 / self.node_count() as f64)
    }

    /// Fraction of undirected node pairs joined by an edge. `None` for fewer
    /// than two nodes. Parallel edges and self-loops count, so multigraphs can
    /// exceed 1.
    pub fn density(&self) -> Option<f64> {
        density_of(self.node_count(), self.edge_count())
    }

    fn check_apsp_limit(&self) -> GraphResult<()> {
        match self.config().max_apsp_nodes {
            Some(limit) if self.node_count() > limit => Err(GraphError::GraphTooLarge {
                nodes: self.node_count(),
                limit,
            }),
            _ => Ok(()),
        }
    }

    /// All-pairs hop counts, recomputed only when the content hash changes.
    pub fn all_pairs_shortest_paths(&self) -> GraphResult<Arc<DistanceMatrix>> {
        self.check_apsp_limit()?;
        let hash = self.content_hash();
        self.apsp.get_or_try_compute(hash, || -> GraphResult<DistanceMatrix> {
            let adj = self.build_index()?;
            tracing::info!(nodes = adj.node_count(), "computing all-pairs shortest paths");
            Ok(traversal::all_pairs_bfs(&adj))
        })
    }

    /// Longest shortest path between any two connected nodes.
    pub fn diameter(&self) -> GraphResult<u32> {
        if self.node_count() < 2 {
            return Err(GraphError::InsufficientNodes {
                required: 2,
                actual: self.node_count(),
            });
        }
        diameter_of(&*self.all_pairs_shortest_paths()?)
    }

    /// Mean shortest-path length over reachable unordered pairs.
    pub fn average_path_length(&self) -> GraphResult<f64> {
        if self.node_count() < 2 {
            return Err(GraphError::InsufficientNodes {
                required: 2,
                actual: self.node_count(),
            });
        }
        match self.config().path_strategy {
            PathStrategy::Bfs => average_path_length_of(&*self.all_pairs_shortest_paths()?),
            PathStrategy::FloydWarshall => {
                self.check_apsp_limit()?;
                average_path_length_of(&traversal::floyd_warshall(&*self.build_index()?))
            }
        }
    }

    /// Size of the largest connected component (0 for an empty graph).
    pub fn largest_component_size(&self) -> GraphResult<usize> {
        let comps = self.components()?;
        Ok(comps.sizes().max().unwrap_or(0))
    }

    /// Induced subgraph of the largest component: its nodes and every edge with
    /// both endpoints inside, both in store order.
    pub fn extract_largest_component(&self) -> GraphResult<GraphData> {
        let adj = self.build_index()?;
        let comps = self.components()?;
        let largest = comps.largest().ok_or(GraphError::EmptyGraph)?;
        let inside = |id: &NodeId| {
            adj.index_map()
                .get(id)
                .and_then(|i| comps.component_of(i))
                .map_or(false, |c| c == largest)
        };

        let nodes = self
            .nodes()
            .iter()
            .filter(|n| inside(&n.id))
            .cloned()
            .collect();
        let edges = self
            .edges()
            .iter()
            .filter(|e| inside(&e.source) && inside(&e.target))
            .cloned()
            .collect();
        Ok(GraphData::new(nodes, edges))
    }

    /// Compute every metric at once.
    pub fn stats(&self) -> GraphResult<GraphStats> {
        let comps = self.components()?;
        let stats = GraphStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            average_degree: defined(self.average_degree())?,
            component_count: comps.count(),
            largest_component_size: comps.sizes().max().unwrap_or(0),
            density: self.density(),
            diameter: defined(self.diameter())?,
            average_path_length: defined(self.average_path_length())?,
            content_hash: format!("{:016x}", self.content_hash()),
        };
        tracing::debug!(?stats, "stats computed");
        Ok(stats)
    }
}
