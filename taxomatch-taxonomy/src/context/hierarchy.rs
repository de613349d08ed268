//! Taxonomic contexts and their nesting
//!
//! Contexts are built for configured clades. Each context links to the nearest enclosing
//! context along preferred edges; materialization runs pre-order so the deepest context is
//! the last to stamp a taxon.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info};

use taxomatch_core::config::{ContextDescriptor, ContextGroup, ContextsConfig};
use taxomatch_core::{NodeId, Nomenclature, TaxomatchError, TaxomatchResult};
use taxomatch_storage::{BatchWriter, IndexScope, NodeIndexKind, PropertyValue, TaxonStore};

use super::barriers::nearest_to_root;
use crate::model::{full_subtree, meta, preferred_subtree, props, root_path, synonym_names, Taxon};
use crate::synthesis::IndexPopulator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyContext {
    pub descriptor: ContextDescriptor,
    pub root: NodeId,
    /// Enclosing context; None only for all life
    pub parent: Option<String>,
    pub children: Vec<String>,
}

impl TaxonomyContext {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn nomenclature(&self) -> Nomenclature {
        self.descriptor.nomenclature
    }

    pub fn group(&self) -> ContextGroup {
        self.descriptor.group
    }

    /// Store name of one of this context's indexes
    pub fn index(&self, kind: NodeIndexKind) -> taxomatch_storage::IndexName {
        kind.index_name(&self.descriptor.index_suffix)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextHierarchy {
    life: String,
    contexts: IndexMap<String, TaxonomyContext>,
}

impl ContextHierarchy {
    pub fn life(&self) -> &TaxonomyContext {
        // Construction always inserts the life context
        &self.contexts[&self.life]
    }

    pub fn get(&self, name: &str) -> TaxomatchResult<&TaxonomyContext> {
        self.contexts
            .get(name)
            .ok_or_else(|| TaxomatchError::ContextNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.contexts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Contexts in configured order
    pub fn iter(&self) -> impl Iterator<Item = &TaxonomyContext> {
        self.contexts.values()
    }

    /// Most inclusive first; every context follows its parent
    pub fn preorder(&self) -> Vec<&TaxonomyContext> {
        let mut order = Vec::with_capacity(self.contexts.len());
        let mut stack = vec![self.life()];
        while let Some(context) = stack.pop() {
            order.push(context);
            for child in context.children.iter().rev() {
                if let Some(child) = self.contexts.get(child) {
                    stack.push(child);
                }
            }
        }
        order
    }

    /// The least inclusive context containing `taxon`
    pub fn home_context(&self, taxon: &Taxon) -> &TaxonomyContext {
        taxon
            .least_context
            .as_deref()
            .and_then(|name| self.contexts.get(name))
            .unwrap_or_else(|| self.life())
    }

    pub fn to_json(&self) -> TaxomatchResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> TaxomatchResult<Self> {
        let hierarchy: ContextHierarchy = serde_json::from_str(json)?;
        if !hierarchy.contexts.contains_key(&hierarchy.life) {
            return Err(TaxomatchError::ContextNotFound(hierarchy.life));
        }
        Ok(hierarchy)
    }

    /// Hierarchy saved by the last successful build, if any
    pub fn load(store: &dyn TaxonStore) -> TaxomatchResult<Option<Self>> {
        match store.metadata(meta::CONTEXT_HIERARCHY)? {
            Some(PropertyValue::Text(json)) => Ok(Some(Self::from_json(&json)?)),
            _ => Ok(None),
        }
    }
}

/// Descriptors grouped for display, groups and members in configured order
pub fn contexts_by_group(config: &ContextsConfig) -> IndexMap<ContextGroup, Vec<ContextDescriptor>> {
    let mut groups: IndexMap<ContextGroup, Vec<ContextDescriptor>> = IndexMap::new();
    for descriptor in &config.descriptors {
        groups.entry(descriptor.group).or_default().push(descriptor.clone());
    }
    groups
}

pub struct ContextBuilder<'a> {
    store: &'a dyn TaxonStore,
    config: &'a ContextsConfig,
    batch_size: usize,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(store: &'a dyn TaxonStore, config: &'a ContextsConfig, batch_size: usize) -> Self {
        Self {
            store,
            config,
            batch_size,
        }
    }

    /// Resolve, link and materialize every configured context.
    ///
    /// All roots are resolved before anything is written; an unresolvable root fails the build
    /// and leaves the previous build's contexts untouched.
    pub fn build(&self, life: NodeId) -> TaxomatchResult<ContextHierarchy> {
        let life_descriptor = self
            .config
            .life_descriptor()
            .ok_or_else(|| TaxomatchError::ContextNotFound(self.config.life_context.clone()))?;

        let mut roots: Vec<(ContextDescriptor, NodeId)> = Vec::with_capacity(self.config.descriptors.len());
        for descriptor in &self.config.descriptors {
            let is_life = descriptor.name == life_descriptor.name;
            let root = self
                .resolve_root(descriptor, life, is_life)?
                .ok_or_else(|| TaxomatchError::ContextNotFound(descriptor.name.clone()))?;
            roots.push((descriptor.clone(), root));
        }

        let hierarchy = self.link(roots, &life_descriptor.name)?;
        self.materialize(&hierarchy)?;

        let mut writer = BatchWriter::new(self.store, self.batch_size);
        writer.set_metadata(meta::CONTEXT_HIERARCHY, hierarchy.to_json()?)?;
        writer.finish()?;

        info!("Built {} taxonomic contexts", hierarchy.len());
        Ok(hierarchy)
    }

    fn resolve_root(
        &self,
        descriptor: &ContextDescriptor,
        life: NodeId,
        is_life: bool,
    ) -> TaxomatchResult<Option<NodeId>> {
        let hits = self
            .store
            .exact_lookup(&NodeIndexKind::TaxonByName.index_name(""), &descriptor.root_name)?;

        let mut taxa = Vec::with_capacity(hits.len());
        for hit in &hits {
            if let Some(taxon) = Taxon::load(self.store, *hit)? {
                taxa.push(taxon);
            }
        }

        if let Some(ott_id) = descriptor.ott_id {
            if let Some(taxon) = taxa.iter().find(|t| t.ott_id == ott_id) {
                return Ok(Some(taxon.node));
            }
        }

        let same_code: Vec<NodeId> = taxa
            .iter()
            .filter(|t| t.nomenclature == descriptor.nomenclature)
            .map(|t| t.node)
            .collect();
        if let Some(node) = nearest_to_root(self.store, &same_code)? {
            return Ok(Some(node));
        }

        if is_life && taxa.iter().any(|t| t.node == life) {
            return Ok(Some(life));
        }

        let all: Vec<NodeId> = taxa.iter().map(|t| t.node).collect();
        nearest_to_root(self.store, &all)
    }

    fn link(&self, roots: Vec<(ContextDescriptor, NodeId)>, life_name: &str) -> TaxomatchResult<ContextHierarchy> {
        let mut by_root: HashMap<NodeId, String> = HashMap::new();
        for (descriptor, root) in &roots {
            by_root.entry(*root).or_insert_with(|| descriptor.name.clone());
        }

        let mut contexts: IndexMap<String, TaxonomyContext> = IndexMap::new();
        for (descriptor, root) in &roots {
            let parent = if descriptor.name == life_name {
                None
            } else {
                let mut parent = None;
                for ancestor in root_path(self.store, *root)?.into_iter().skip(1) {
                    if let Some(name) = by_root.get(&ancestor) {
                        if *name != descriptor.name {
                            parent = Some(name.clone());
                            break;
                        }
                    }
                }
                Some(parent.unwrap_or_else(|| life_name.to_string()))
            };

            contexts.insert(
                descriptor.name.clone(),
                TaxonomyContext {
                    descriptor: descriptor.clone(),
                    root: *root,
                    parent,
                    children: Vec::new(),
                },
            );
        }

        let links: Vec<(String, String)> = contexts
            .values()
            .filter_map(|c| c.parent.clone().map(|p| (p, c.name().to_string())))
            .collect();
        for (parent, child) in links {
            debug!("Context '{}' nests inside '{}'", child, parent);
            if let Some(parent) = contexts.get_mut(&parent) {
                parent.children.push(child);
            }
        }

        Ok(ContextHierarchy {
            life: life_name.to_string(),
            contexts,
        })
    }

    fn materialize(&self, hierarchy: &ContextHierarchy) -> TaxomatchResult<()> {
        let mut writer = BatchWriter::new(self.store, self.batch_size);

        for context in hierarchy.preorder() {
            let is_life = context.parent.is_none();
            if is_life {
                // The all-life indexes belong to the synthesizer; only reset stamps here
                for node in preferred_subtree(self.store, context.root)? {
                    writer.remove_property(node, props::LEAST_CONTEXT)?;
                }
                continue;
            }

            let populator = IndexPopulator::new(context.descriptor.index_suffix.clone());
            populator.clear(&mut writer)?;

            let preferred = preferred_subtree(self.store, context.root)?;
            for node in &preferred {
                let Some(taxon) = Taxon::load(self.store, *node)? else {
                    continue;
                };
                writer.set_property(*node, props::LEAST_CONTEXT, context.name())?;
                if !taxon.dubious {
                    let synonyms = synonym_names(self.store, *node)?;
                    populator.add(&mut writer, *node, &taxon.name, &taxon.rank, &synonyms, IndexScope::Preferred)?;
                }
            }

            let full = full_subtree(self.store, context.root)?;
            for node in &full {
                let Some(taxon) = Taxon::load(self.store, *node)? else {
                    continue;
                };
                let synonyms = synonym_names(self.store, *node)?;
                populator.add(&mut writer, *node, &taxon.name, &taxon.rank, &synonyms, IndexScope::Full)?;
            }

            debug!(
                "Context '{}': {} preferred taxa, {} taxa in full",
                context.name(),
                preferred.len(),
                full.len()
            );
        }

        writer.finish()?;
        Ok(())
    }
}
