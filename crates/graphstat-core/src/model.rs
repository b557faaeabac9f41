//! Core data structures for the node/edge graph

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Externally assigned, stable node identifier.
///
/// JSON documents may carry ids as strings or integers; integers are kept as
/// their decimal text so that `1` and `"1"` name the same node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Default)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        NodeId(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        NodeId(id)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        NodeId(id.to_string())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => NodeId(s),
            RawId::Signed(n) => NodeId(n.to_string()),
            RawId::Unsigned(n) => NodeId(n.to_string()),
        })
    }
}

/// Edge endpoints are either a bare id or a resolved node object `{ "id": ... }`,
/// which is what force-layout libraries leave in `links` after a simulation run.
fn endpoint<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NodeId, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Endpoint {
        Id(NodeId),
        Resolved { id: NodeId },
    }

    Ok(match Endpoint::deserialize(deserializer)? {
        Endpoint::Id(id) | Endpoint::Resolved { id } => id,
    })
}

/// A single attribute value attached to a node or edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
}

impl From<bool> for AttrValue {
    fn from(v: bool) -> Self {
        AttrValue::Bool(v)
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Integer(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

/// Display metadata carried alongside the numeric model. Never read by the
/// algorithms.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A node in the graph. Attributes are flattened next to `id` in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Node {
    pub fn new(id: impl Into<NodeId>) -> Self {
        Node {
            id: id.into(),
            attributes: Attributes::new(),
        }
    }

    /// Attach an attribute, builder style.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attributes.get(key)
    }
}

/// An undirected edge. `source`/`target` order is kept only for output
/// fidelity; the pair is unordered for every computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(deserialize_with = "endpoint")]
    pub source: NodeId,
    #[serde(deserialize_with = "endpoint")]
    pub target: NodeId,
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Edge {
            source: source.into(),
            target: target.into(),
            attributes: Attributes::new(),
        }
    }

    /// True if this edge joins `a` and `b`, in either orientation.
    pub fn connects(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }

    pub fn touches(&self, id: &NodeId) -> bool {
        &self.source == id || &self.target == id
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Plain `{nodes, edges}` record exchanged with collaborators: the input
/// document shape and the shape of extracted subgraphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default, alias = "links")]
    pub edges: Vec<Edge>,
}

impl GraphData {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        GraphData { nodes, edges }
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
