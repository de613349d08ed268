//! Batch name-resolution requests

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use taxomatch_core::config::TnrsConfig;
use taxomatch_core::{TaxomatchError, TaxomatchResult};

use crate::scrubber::scrub_name;

fn default_true() -> bool {
    true
}

/// A batch of names to resolve, with optional caller ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TnrsRequest {
    pub names: Vec<String>,
    /// One id per name; names serve as their own ids when omitted
    #[serde(default)]
    pub ids: Option<Vec<String>>,
    /// Context to search in; disables context inference when set
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default = "default_true")]
    pub fuzzy: bool,
    #[serde(default)]
    pub include_dubious: bool,
    #[serde(default)]
    pub include_deprecated: bool,
    /// Retry unmatched "Genus sp." names against the genus
    #[serde(default = "default_true")]
    pub match_sp_to_genus: bool,
}

impl TnrsRequest {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ids: None,
            context: None,
            fuzzy: true,
            include_dubious: false,
            include_deprecated: false,
            match_sp_to_genus: true,
        }
    }

    pub fn with_ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn in_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn include_dubious(mut self, include: bool) -> Self {
        self.include_dubious = include;
        self
    }

    pub fn include_deprecated(mut self, include: bool) -> Self {
        self.include_deprecated = include;
        self
    }

    pub fn match_sp_to_genus(mut self, enabled: bool) -> Self {
        self.match_sp_to_genus = enabled;
        self
    }

    /// Largest batch this request may carry under `config`
    pub fn limit(&self, config: &TnrsConfig) -> usize {
        if self.fuzzy {
            config.max_fuzzy_names
        } else {
            config.max_exact_names
        }
    }

    /// Check ids and batch size, then pair every name with its id and cleaned form.
    ///
    /// Nothing is looked up before this succeeds.
    pub fn validate(&self, config: &TnrsConfig) -> TaxomatchResult<Vec<NameQuery>> {
        if let Some(ids) = &self.ids {
            if ids.len() != self.names.len() {
                return Err(TaxomatchError::AmbiguousIdCount {
                    names: self.names.len(),
                    ids: ids.len(),
                });
            }
        }

        let ids: Vec<String> = match &self.ids {
            Some(ids) => ids.clone(),
            None => self.names.clone(),
        };
        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(id.as_str()) {
                return Err(TaxomatchError::DuplicateQueryId(id.clone()));
            }
        }

        let limit = self.limit(config);
        if self.names.len() > limit {
            return Err(TaxomatchError::BatchTooLarge {
                size: self.names.len(),
                limit,
            });
        }

        Ok(ids
            .into_iter()
            .zip(&self.names)
            .map(|(id, name)| NameQuery {
                id,
                original: name.clone(),
                scrubbed: scrub_name(name),
            })
            .collect())
    }
}

/// One name of a validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameQuery {
    pub id: String,
    /// The name as submitted
    pub original: String,
    pub scrubbed: String,
}

impl NameQuery {
    /// The genus part of a "Genus sp." name
    pub fn sp_genus(&self) -> Option<&str> {
        let (genus, last) = self.scrubbed.rsplit_once(' ')?;
        let last = last.to_lowercase();
        if (last == "sp." || last == "sp") && !genus.trim().is_empty() {
            Some(genus.trim())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TnrsConfig {
        TnrsConfig {
            max_exact_names: 3,
            max_fuzzy_names: 2,
            ..TnrsConfig::default()
        }
    }

    #[test]
    fn test_names_are_their_own_ids() {
        let queries = TnrsRequest::new(["Homo_sapiens"]).validate(&config()).unwrap();
        assert_eq!(queries[0].id, "Homo_sapiens");
        assert_eq!(queries[0].original, "Homo_sapiens");
        assert_eq!(queries[0].scrubbed, "Homo sapiens");
    }

    #[test]
    fn test_id_count_must_match() {
        let result = TnrsRequest::new(["a", "b"]).with_ids(["1"]).validate(&config());
        assert!(matches!(
            result,
            Err(TaxomatchError::AmbiguousIdCount { names: 2, ids: 1 })
        ));
    }

    #[test]
    fn test_duplicate_ids() {
        let result = TnrsRequest::new(["Aotus", "Aotus"]).fuzzy(false).validate(&config());
        match result {
            Err(TaxomatchError::DuplicateQueryId(id)) => assert_eq!(id, "Aotus"),
            other => panic!("Expected DuplicateQueryId, got {:?}", other),
        }

        // Distinct ids make repeated names fine
        let queries = TnrsRequest::new(["Aotus", "Aotus"])
            .with_ids(["1", "2"])
            .validate(&config())
            .unwrap();
        assert_eq!(queries.len(), 2);
    }

    #[test]
    fn test_batch_limit_depends_on_fuzzy() {
        let names = ["a", "b", "c"];
        assert!(matches!(
            TnrsRequest::new(names).validate(&config()),
            Err(TaxomatchError::BatchTooLarge { size: 3, limit: 2 })
        ));
        assert!(TnrsRequest::new(names).fuzzy(false).validate(&config()).is_ok());
    }

    #[test]
    fn test_sp_genus() {
        let query = |name: &str| NameQuery {
            id: name.to_string(),
            original: name.to_string(),
            scrubbed: scrub_name(name),
        };
        assert_eq!(query("Homo sp.").sp_genus(), Some("Homo"));
        assert_eq!(query("Homo SP").sp_genus(), Some("Homo"));
        assert_eq!(query("Homo sapiens").sp_genus(), None);
        assert_eq!(query("sp.").sp_genus(), None);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: TnrsRequest = serde_json::from_str(r#"{"names": ["Homo sapiens"]}"#).unwrap();
        assert!(request.fuzzy);
        assert!(request.match_sp_to_genus);
        assert!(!request.include_dubious);
        assert_eq!(request.ids, None);
    }
}
