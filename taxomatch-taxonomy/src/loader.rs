//! Batch loading of taxonomy records into a store
//!
//! Creates taxon nodes with their child-of edges, synonym nodes, deprecated entries, the
//! by-ott-id and by-flag indexes and the store metadata. Preferred edges and name indexes
//! are left to the synthesizer.

use indexmap::IndexMap;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use taxomatch_core::{
    create_progress_bar, evaluate_flags, Config, NodeId, OttId, TaxomatchError, TaxomatchResult,
};
use taxomatch_storage::{
    BatchWriter, EdgeKind, NodeIndexKind, Properties, PropertyValue, TaxonStore,
};

use crate::model::{
    meta, props, DeprecatedRecord, NodeKind, SourceEdgeRecord, SynonymRecord, TaxonRecord,
};

/// Counts reported after a load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub taxa: usize,
    pub synonyms: usize,
    pub deprecated: usize,
    pub dubious: usize,
    pub skipped_synonyms: usize,
    pub life_node: NodeId,
}

pub struct TaxonomyLoader<'a> {
    store: &'a dyn TaxonStore,
    batch_size: usize,
    show_progress: bool,
    source: String,
}

impl<'a> TaxonomyLoader<'a> {
    pub fn new(store: &'a dyn TaxonStore, config: &Config) -> Self {
        Self {
            store,
            batch_size: config.synthesis.batch_size,
            show_progress: config.synthesis.show_progress,
            source: config.tnrs.taxonomy_name.clone(),
        }
    }

    /// Tag written on the child-of edges of loaded records
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn load(
        &self,
        records: Vec<TaxonRecord>,
        synonyms: Vec<SynonymRecord>,
        deprecated: Vec<DeprecatedRecord>,
        metadata: &IndexMap<String, String>,
    ) -> TaxomatchResult<LoadSummary> {
        info!("Loading {} taxa", records.len());

        let node_for_ott = self.allocate(&records)?;
        let life = self.find_life(&records, &node_for_ott)?;

        let mut writer = BatchWriter::new(self.store, self.batch_size);
        let mut summary = LoadSummary {
            life_node: life,
            ..Default::default()
        };

        let pb = create_progress_bar(records.len() as u64, "Creating taxa", self.show_progress);
        for record in &records {
            let node = node_for_ott[&record.ott_id];
            if self.write_taxon(&mut writer, node, record)? {
                summary.dubious += 1;
            }
            summary.taxa += 1;
            pb.inc(1);
        }
        pb.finish_and_clear();

        for record in &records {
            if let Some(parent) = record.parent_ott_id {
                let mut edge = Properties::new();
                edge.insert(props::SOURCE.to_string(), self.source.as_str().into());
                writer.create_edge(
                    node_for_ott[&record.ott_id],
                    node_for_ott[&parent],
                    EdgeKind::ChildOf,
                    edge,
                )?;
            }
        }

        for synonym in &synonyms {
            let Some(&target) = node_for_ott.get(&synonym.ott_id) else {
                warn!(
                    "Skipping synonym '{}': ott id {} is not a loaded taxon",
                    synonym.name, synonym.ott_id
                );
                summary.skipped_synonyms += 1;
                continue;
            };
            self.write_synonym(&mut writer, target, synonym)?;
            summary.synonyms += 1;
        }

        for record in &deprecated {
            self.write_deprecated(&mut writer, record)?;
            summary.deprecated += 1;
        }

        writer.set_metadata(meta::LIFE_NODE, PropertyValue::Int(life.value() as i64))?;
        writer.set_metadata(meta::TAXON_COUNT, PropertyValue::Int(summary.taxa as i64))?;
        writer.set_metadata(meta::PREFERRED_COMPLETE, false)?;
        for (key, value) in metadata {
            writer.set_metadata(format!("{}{}", meta::TAXONOMY_PREFIX, key), value.as_str())?;
        }

        let stats = writer.finish()?;
        debug!(
            "Load wrote {} nodes, {} edges, {} index entries",
            stats.nodes_created, stats.edges_created, stats.index_entries
        );
        info!(
            "Loaded {} taxa ({} dubious), {} synonyms, {} deprecated ids",
            summary.taxa, summary.dubious, summary.synonyms, summary.deprecated
        );
        Ok(summary)
    }

    /// Add child-of edges asserted by other source classifications.
    ///
    /// Both ends must already be loaded.
    pub fn load_source_edges(&self, edges: &[SourceEdgeRecord]) -> TaxomatchResult<usize> {
        let by_ott = NodeIndexKind::TaxonByOttId.index_name("");
        let resolve = |ott: OttId| -> TaxomatchResult<NodeId> {
            self.store
                .exact_lookup(&by_ott, &ott.to_string())?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    TaxomatchError::MalformedTaxonomy(format!("source edge refers to unknown ott id {}", ott))
                })
        };

        let mut writer = BatchWriter::new(self.store, self.batch_size);
        for edge in edges {
            let mut properties = Properties::new();
            properties.insert(props::SOURCE.to_string(), edge.source.as_str().into());
            writer.create_edge(resolve(edge.child)?, resolve(edge.parent)?, EdgeKind::ChildOf, properties)?;
        }
        writer.finish()?;
        debug!("Added {} source edges", edges.len());
        Ok(edges.len())
    }

    fn allocate(&self, records: &[TaxonRecord]) -> TaxomatchResult<HashMap<OttId, NodeId>> {
        let mut node_for_ott = HashMap::with_capacity(records.len());
        for record in records {
            if node_for_ott.contains_key(&record.ott_id) {
                return Err(TaxomatchError::MalformedTaxonomy(format!(
                    "ott id {} appears more than once",
                    record.ott_id
                )));
            }
            node_for_ott.insert(record.ott_id, self.store.allocate_node_id());
        }

        for record in records {
            if let Some(parent) = record.parent_ott_id {
                if !node_for_ott.contains_key(&parent) {
                    return Err(TaxomatchError::MalformedTaxonomy(format!(
                        "taxon {} ('{}') has unknown parent {}",
                        record.ott_id, record.name, parent
                    )));
                }
            }
        }
        Ok(node_for_ott)
    }

    fn find_life(
        &self,
        records: &[TaxonRecord],
        node_for_ott: &HashMap<OttId, NodeId>,
    ) -> TaxomatchResult<NodeId> {
        let mut roots = records.iter().filter(|r| r.parent_ott_id.is_none());
        let root = roots
            .next()
            .ok_or_else(|| TaxomatchError::MalformedTaxonomy("no record without a parent".to_string()))?;
        if let Some(other) = roots.next() {
            return Err(TaxomatchError::MalformedTaxonomy(format!(
                "more than one root: {} and {}",
                root.ott_id, other.ott_id
            )));
        }
        Ok(node_for_ott[&root.ott_id])
    }

    /// Returns whether the taxon is dubious
    fn write_taxon(&self, writer: &mut BatchWriter<'_>, node: NodeId, record: &TaxonRecord) -> TaxomatchResult<bool> {
        let flags = evaluate_flags(record.flags.iter().map(String::as_str));
        for label in &flags.unrecognized {
            warn!("Taxon {} ('{}') has unrecognized flag '{}'", record.ott_id, record.name, label);
        }

        let mut properties = Properties::new();
        properties.insert(props::KIND.to_string(), NodeKind::Taxon.as_str().into());
        properties.insert(props::NAME.to_string(), record.name.as_str().into());
        properties.insert(props::OTT_ID.to_string(), PropertyValue::Int(record.ott_id.value() as i64));
        properties.insert(props::RANK.to_string(), record.rank.as_str().into());
        properties.insert(props::UNIQUE_NAME.to_string(), record.uniqname.as_str().into());
        properties.insert(props::SOURCES.to_string(), record.sources.clone().into());
        properties.insert(
            props::FLAGS.to_string(),
            flags
                .flags
                .iter()
                .map(|f| f.label().to_string())
                .collect::<Vec<_>>()
                .into(),
        );
        if !flags.unrecognized.is_empty() {
            properties.insert(props::UNRECOGNIZED_FLAGS.to_string(), flags.unrecognized.clone().into());
        }
        properties.insert(props::DUBIOUS.to_string(), flags.dubious.into());
        writer.create_node(node, properties)?;

        writer.index_add(
            &NodeIndexKind::TaxonByOttId.index_name(""),
            record.ott_id.to_string(),
            node,
        )?;
        let by_flag = NodeIndexKind::TaxonByFlag.index_name("");
        for flag in &flags.flags {
            writer.index_add(&by_flag, flag.label(), node)?;
        }
        Ok(flags.dubious)
    }

    fn write_synonym(&self, writer: &mut BatchWriter<'_>, target: NodeId, synonym: &SynonymRecord) -> TaxomatchResult<()> {
        let node = self.store.allocate_node_id();
        let mut properties = Properties::new();
        properties.insert(props::KIND.to_string(), NodeKind::Synonym.as_str().into());
        properties.insert(props::NAME.to_string(), synonym.name.as_str().into());
        properties.insert(props::SYNONYM_TYPE.to_string(), synonym.synonym_type.as_str().into());
        properties.insert(props::SOURCE.to_string(), self.source.as_str().into());
        writer.create_node(node, properties)?;

        let mut edge = Properties::new();
        edge.insert(props::SYNONYM_TYPE.to_string(), synonym.synonym_type.as_str().into());
        writer.create_edge(node, target, EdgeKind::SynonymOf, edge)
    }

    fn write_deprecated(&self, writer: &mut BatchWriter<'_>, record: &DeprecatedRecord) -> TaxomatchResult<()> {
        let node = self.store.allocate_node_id();
        let mut properties = Properties::new();
        properties.insert(props::KIND.to_string(), NodeKind::Deprecated.as_str().into());
        properties.insert(props::NAME.to_string(), record.name.as_str().into());
        properties.insert(props::OTT_ID.to_string(), PropertyValue::Int(record.ott_id.value() as i64));
        properties.insert(props::REASON.to_string(), record.reason.as_str().into());
        writer.create_node(node, properties)?;

        writer.index_add(&NodeIndexKind::DeprecatedTaxa.index_name(""), record.name.as_str(), node)?;
        writer.index_add(
            &NodeIndexKind::TaxonByOttId.index_name(""),
            record.ott_id.to_string(),
            node,
        )
    }
}
