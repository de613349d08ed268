//! Value types shared by store implementations
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use taxomatch_core::NodeId;

/// A node or edge property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    TextList(Vec<String>),
    Ids(Vec<NodeId>),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            PropertyValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            PropertyValue::TextList(list) => Some(list.as_slice()),
            _ => None,
        }
    }

    pub fn as_ids(&self) -> Option<&[NodeId]> {
        match self {
            PropertyValue::Ids(ids) => Some(ids.as_slice()),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::Text(s)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(list: Vec<String>) -> Self {
        PropertyValue::TextList(list)
    }
}

impl From<Vec<NodeId>> for PropertyValue {
    fn from(ids: Vec<NodeId>) -> Self {
        PropertyValue::Ids(ids)
    }
}

pub type Properties = BTreeMap<String, PropertyValue>;

/// Relation types between graph nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Child to parent, one per source taxonomy
    ChildOf,
    /// The single chosen child-to-parent edge
    PreferredChildOf,
    /// Synonym node to the taxon it names
    SynonymOf,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EdgeKind::ChildOf => "CHILD_OF",
            EdgeKind::PreferredChildOf => "PREFERRED_CHILD_OF",
            EdgeKind::SynonymOf => "SYNONYM_OF",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges starting at the node
    Outgoing,
    /// Edges ending at the node
    Incoming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
    pub properties: Properties,
}

impl Edge {
    /// Source taxonomy tag, when the edge carries one
    pub fn source(&self) -> Option<&str> {
        self.properties.get("source").and_then(|v| v.as_str())
    }

    /// The endpoint that is not `node`
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.from == node {
            self.to
        } else {
            self.from
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }
}

/// A node matched through a text index, with the indexed key it matched on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHit {
    pub node: NodeId,
    pub key: String,
    /// Edit distance between query and key; zero for exact and prefix hits
    pub distance: usize,
}

/// Name of a text index held by the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IndexName(pub String);

impl IndexName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Counters returned by a successful commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitStats {
    pub operations: usize,
    pub nodes_created: usize,
    pub edges_created: usize,
    pub index_entries: usize,
}

impl CommitStats {
    pub fn merge(&mut self, other: CommitStats) {
        self.operations += other.operations;
        self.nodes_created += other.nodes_created;
        self.edges_created += other.edges_created;
        self.index_entries += other.index_entries;
    }
}
