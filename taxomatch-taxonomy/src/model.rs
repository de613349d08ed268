//! Taxon records and the read-side view of taxon nodes

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

use taxomatch_core::{NodeId, Nomenclature, OttId, Rank, TaxomatchError, TaxomatchResult, TaxonFlag};
use taxomatch_storage::{Direction, EdgeKind, Properties, PropertyValue, TaxonStore};

/// Node and edge property keys
pub mod props {
    pub const KIND: &str = "kind";
    pub const NAME: &str = "name";
    pub const OTT_ID: &str = "ott_id";
    pub const RANK: &str = "rank";
    pub const UNIQUE_NAME: &str = "uniqname";
    pub const SOURCES: &str = "sources";
    pub const FLAGS: &str = "flags";
    pub const UNRECOGNIZED_FLAGS: &str = "unrecognized_flags";
    pub const DUBIOUS: &str = "dubious";
    pub const NOMENCLATURE: &str = "taxcode";
    pub const LEAST_CONTEXT: &str = "leastcontext";
    /// Descendant tips
    pub const LEAF_IDS: &str = "mrca";
    /// Descendant internal nodes, self included
    pub const INTERNAL_IDS: &str = "nested_mrca";
    pub const SYNONYM_TYPE: &str = "nametype";
    pub const REASON: &str = "reason";
    pub const SOURCE: &str = "source";
}

/// Store metadata keys
pub mod meta {
    pub const LIFE_NODE: &str = "life_node";
    pub const TAXON_COUNT: &str = "taxon_count";
    pub const PREFERRED_COMPLETE: &str = "preferred_hierarchy_complete";
    pub const CONTEXT_HIERARCHY: &str = "context_hierarchy";
    /// Prefix for caller-supplied taxonomy metadata such as version
    pub const TAXONOMY_PREFIX: &str = "taxonomy.";
}

/// What a graph node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Taxon,
    Synonym,
    Deprecated,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Taxon => "taxon",
            NodeKind::Synonym => "synonym",
            NodeKind::Deprecated => "deprecated",
        }
    }

    pub fn of(properties: &Properties) -> Option<NodeKind> {
        match properties.get(props::KIND).and_then(|v| v.as_str())? {
            "taxon" => Some(NodeKind::Taxon),
            "synonym" => Some(NodeKind::Synonym),
            "deprecated" => Some(NodeKind::Deprecated),
            _ => None,
        }
    }
}

/// One row of the taxonomy input, supplied in taxon-id order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonRecord {
    pub ott_id: OttId,
    /// None for the life node
    pub parent_ott_id: Option<OttId>,
    pub name: String,
    #[serde(default)]
    pub rank: Rank,
    /// Source identifiers such as `ncbi:9606`
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub uniqname: String,
    #[serde(default)]
    pub flags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymRecord {
    pub name: String,
    pub synonym_type: String,
    /// The taxon this name refers to
    pub ott_id: OttId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecatedRecord {
    pub ott_id: OttId,
    pub name: String,
    pub reason: String,
}

/// An extra child-of assertion from one source classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEdgeRecord {
    pub child: OttId,
    pub parent: OttId,
    pub source: String,
}

/// A taxon node as read back from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxon {
    pub node: NodeId,
    pub ott_id: OttId,
    pub name: String,
    /// `uniqname` when present, else the name
    pub unique_name: String,
    pub rank: Rank,
    pub sources: Vec<String>,
    pub flags: Vec<TaxonFlag>,
    pub dubious: bool,
    pub nomenclature: Nomenclature,
    /// Name of the least inclusive context containing this taxon; None means all life
    pub least_context: Option<String>,
}

impl Taxon {
    /// Load a taxon node; None when the node is missing or not a taxon
    pub fn load(store: &dyn TaxonStore, node: NodeId) -> TaxomatchResult<Option<Taxon>> {
        Ok(store
            .properties(node)?
            .and_then(|properties| Taxon::from_properties(node, &properties)))
    }

    /// Like [`Taxon::load`] but a missing taxon is an error
    pub fn require(store: &dyn TaxonStore, node: NodeId) -> TaxomatchResult<Taxon> {
        Taxon::load(store, node)?
            .ok_or_else(|| TaxomatchError::NotFound(format!("taxon node {}", node)))
    }

    pub fn from_properties(node: NodeId, properties: &Properties) -> Option<Taxon> {
        if NodeKind::of(properties) != Some(NodeKind::Taxon) {
            return None;
        }

        let text = |key: &str| {
            properties
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        let list = |key: &str| {
            properties
                .get(key)
                .and_then(|v| v.as_text_list())
                .map(|l| l.to_vec())
                .unwrap_or_default()
        };

        let name = text(props::NAME);
        let uniqname = text(props::UNIQUE_NAME);
        let unique_name = if uniqname.is_empty() { name.clone() } else { uniqname };

        Some(Taxon {
            node,
            ott_id: OttId(properties.get(props::OTT_ID).and_then(|v| v.as_int()).unwrap_or(0) as u64),
            unique_name,
            rank: Rank::parse(&text(props::RANK)),
            sources: list(props::SOURCES),
            flags: list(props::FLAGS)
                .iter()
                .filter_map(|label| TaxonFlag::from_str(label).ok())
                .collect(),
            dubious: properties
                .get(props::DUBIOUS)
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            nomenclature: properties
                .get(props::NOMENCLATURE)
                .and_then(|v| v.as_str())
                .and_then(|code| Nomenclature::from_str(code).ok())
                .unwrap_or_default(),
            least_context: properties
                .get(props::LEAST_CONTEXT)
                .and_then(|v| v.as_str())
                .map(str::to_string),
            name,
        })
    }

    /// Names of the synonym nodes pointing at this taxon
    pub fn synonyms(&self, store: &dyn TaxonStore) -> TaxomatchResult<Vec<String>> {
        synonym_names(store, self.node)
    }

    pub fn is_higher(&self) -> bool {
        self.rank.is_higher()
    }
}

/// A retired ott id kept for lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprecatedTaxon {
    pub node: NodeId,
    pub ott_id: OttId,
    pub name: String,
    pub reason: String,
}

impl DeprecatedTaxon {
    pub fn load(store: &dyn TaxonStore, node: NodeId) -> TaxomatchResult<Option<DeprecatedTaxon>> {
        let Some(properties) = store.properties(node)? else {
            return Ok(None);
        };
        if NodeKind::of(&properties) != Some(NodeKind::Deprecated) {
            return Ok(None);
        }
        let text = |key: &str| {
            properties
                .get(key)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };
        Ok(Some(DeprecatedTaxon {
            node,
            ott_id: OttId(properties.get(props::OTT_ID).and_then(|v| v.as_int()).unwrap_or(0) as u64),
            name: text(props::NAME),
            reason: text(props::REASON),
        }))
    }
}

pub fn synonym_names(store: &dyn TaxonStore, node: NodeId) -> TaxomatchResult<Vec<String>> {
    let mut names = Vec::new();
    for edge in store.edges(node, EdgeKind::SynonymOf, Direction::Incoming)? {
        if let Some(PropertyValue::Text(name)) = store.property(edge.from, props::NAME)? {
            names.push(name);
        }
    }
    Ok(names)
}

pub fn node_kind(store: &dyn TaxonStore, node: NodeId) -> TaxomatchResult<Option<NodeKind>> {
    Ok(store.properties(node)?.as_ref().and_then(NodeKind::of))
}

pub fn preferred_parent(store: &dyn TaxonStore, node: NodeId) -> TaxomatchResult<Option<NodeId>> {
    Ok(store
        .first_edge(node, EdgeKind::PreferredChildOf, Direction::Outgoing)?
        .map(|edge| edge.to))
}

/// Preferred children, in edge creation order
pub fn preferred_children(store: &dyn TaxonStore, node: NodeId) -> TaxomatchResult<Vec<NodeId>> {
    Ok(store
        .edges(node, EdgeKind::PreferredChildOf, Direction::Incoming)?
        .into_iter()
        .map(|edge| edge.from)
        .collect())
}

/// `node` followed by each preferred ancestor up to the top of its tree
pub fn root_path(store: &dyn TaxonStore, node: NodeId) -> TaxomatchResult<Vec<NodeId>> {
    let mut path = vec![node];
    let mut seen: HashSet<NodeId> = HashSet::from([node]);
    let mut current = node;

    while let Some(parent) = preferred_parent(store, current)? {
        if !seen.insert(parent) {
            return Err(TaxomatchError::MalformedTaxonomy(format!(
                "preferred edges from node {} form a cycle at node {}",
                node, parent
            )));
        }
        path.push(parent);
        current = parent;
    }
    Ok(path)
}

/// Preferred subtree below `root` in breadth-first order, `root` first
pub fn preferred_subtree(store: &dyn TaxonStore, root: NodeId) -> TaxomatchResult<Vec<NodeId>> {
    traverse_down(store, root, EdgeKind::PreferredChildOf)
}

/// All taxa below `root` along child-of edges, `root` first
pub fn full_subtree(store: &dyn TaxonStore, root: NodeId) -> TaxomatchResult<Vec<NodeId>> {
    traverse_down(store, root, EdgeKind::ChildOf)
}

fn traverse_down(store: &dyn TaxonStore, root: NodeId, kind: EdgeKind) -> TaxomatchResult<Vec<NodeId>> {
    let mut order = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::from([root]);
    let mut queue = std::collections::VecDeque::from([root]);

    while let Some(node) = queue.pop_front() {
        order.push(node);
        for edge in store.edges(node, kind, Direction::Incoming)? {
            if seen.insert(edge.from) {
                queue.push_back(edge.from);
            }
        }
    }
    Ok(order)
}

pub fn life_node(store: &dyn TaxonStore) -> TaxomatchResult<NodeId> {
    store
        .metadata(meta::LIFE_NODE)?
        .and_then(|v| v.as_int())
        .map(|id| NodeId(id as u32))
        .ok_or_else(|| TaxomatchError::NotFound("life node; no taxonomy has been loaded".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn taxon_properties() -> Properties {
        let mut p = Properties::new();
        p.insert(props::KIND.to_string(), "taxon".into());
        p.insert(props::NAME.to_string(), "Aotus".into());
        p.insert(props::UNIQUE_NAME.to_string(), "Aotus (genus in Fabaceae)".into());
        p.insert(props::OTT_ID.to_string(), PropertyValue::Int(1000));
        p.insert(props::RANK.to_string(), "genus".into());
        p.insert(props::FLAGS.to_string(), vec!["extinct".to_string()].into());
        p.insert(props::NOMENCLATURE.to_string(), "ICN".into());
        p
    }

    #[test]
    fn test_taxon_from_properties() {
        let taxon = Taxon::from_properties(NodeId(3), &taxon_properties()).unwrap();
        assert_eq!(taxon.ott_id, OttId(1000));
        assert_eq!(taxon.unique_name, "Aotus (genus in Fabaceae)");
        assert_eq!(taxon.rank, Rank::Genus);
        assert_eq!(taxon.flags, vec![TaxonFlag::Extinct]);
        assert_eq!(taxon.nomenclature, Nomenclature::Icn);
        assert!(!taxon.dubious);
        assert!(taxon.least_context.is_none());
    }

    #[test]
    fn test_unique_name_falls_back_to_name() {
        let mut p = taxon_properties();
        p.remove(props::UNIQUE_NAME);
        let taxon = Taxon::from_properties(NodeId(3), &p).unwrap();
        assert_eq!(taxon.unique_name, "Aotus");
    }

    #[test]
    fn test_non_taxon_nodes_are_skipped() {
        let mut p = taxon_properties();
        p.insert(props::KIND.to_string(), "synonym".into());
        assert!(Taxon::from_properties(NodeId(3), &p).is_none());
        assert_eq!(NodeKind::of(&p), Some(NodeKind::Synonym));
    }
}
