//! Test fixtures for graphstat-core

use crate::model::{Edge, GraphData, Node, NodeId};
use crate::store::GraphStore;
use std::path::PathBuf;
use tempfile::TempDir;

pub fn ids(ids: &[&str]) -> Vec<NodeId> {
    ids.iter().map(|id| NodeId::from(*id)).collect()
}

pub fn data_from(nodes: &[&str], edges: &[(&str, &str)]) -> GraphData {
    GraphData::new(
        nodes.iter().map(|id| Node::new(*id)).collect(),
        edges.iter().map(|(s, t)| Edge::new(*s, *t)).collect(),
    )
}

pub fn store_from(nodes: &[&str], edges: &[(&str, &str)]) -> GraphStore {
    GraphStore::from_data(data_from(nodes, edges)).unwrap()
}

/// A–B–C path plus isolated D.
pub fn sample_store() -> GraphStore {
    store_from(&["A", "B", "C", "D"], &[("A", "B"), ("B", "C")])
}

/// Complete graph on `n` nodes named `0..n`.
pub fn complete_store(n: usize) -> GraphStore {
    let names: Vec<String> = (0..n).map(|i| i.to_string()).collect();
    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            edges.push(Edge::new(names[i].as_str(), names[j].as_str()));
        }
    }
    let nodes = names.iter().map(|id| Node::new(id.as_str())).collect();
    GraphStore::from_data(GraphData::new(nodes, edges)).unwrap()
}

/// Write a graph document in the `{nodes, links}` shape a browser front end
/// would fetch, returning the directory guard and the file path.
pub fn write_graph_json(json: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.json");
    std::fs::write(&path, json).unwrap();
    (dir, path)
}

pub const SAMPLE_JSON: &str = r#"{
  "nodes": [
    {"id": "A", "group": 1},
    {"id": "B", "group": 1},
    {"id": "C", "group": 2},
    {"id": "D", "group": 3}
  ],
  "links": [
    {"source": "A", "target": "B"},
    {"source": "B", "target": "C"}
  ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_store_edge_count() {
        let store = complete_store(5);
        assert_eq!(store.node_count(), 5);
        assert_eq!(store.edge_count(), 10);
    }

    #[test]
    fn test_write_graph_json() {
        let (_dir, path) = write_graph_json(SAMPLE_JSON);
        assert!(path.exists());
    }
}
