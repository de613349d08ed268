//! Core error types for taxomatch

use thiserror::Error;

use crate::types::NodeId;

/// Main error type for taxomatch operations
#[derive(Error, Debug)]
pub enum TaxomatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    // Taxonomy construction
    #[error("Context not found: {0}")]
    ContextNotFound(String),

    #[error("Barrier names '{first}' and '{second}' both resolve to node {node}")]
    DuplicateBarrierMapping {
        first: String,
        second: String,
        node: NodeId,
    },

    #[error("Preferred edge for node {node} would point at itself")]
    SelfReferencingPreferredEdge { node: NodeId },

    #[error("Cannot compute the LICA of an empty taxon set")]
    EmptyTaxonSet,

    #[error("Walk toward the root stopped at node {node} with no usable parent edge")]
    DeadEndWalk { node: NodeId },

    #[error("Malformed taxonomy: {0}")]
    MalformedTaxonomy(String),

    #[error("Preferred hierarchy has not been synthesized")]
    SynthesisIncomplete,

    #[error("Nodes {first} and {other} share no preferred ancestor")]
    NoCommonAncestor { first: NodeId, other: NodeId },

    // Query-time
    #[error("Duplicate query id: {0}")]
    DuplicateQueryId(String),

    #[error("Batch of {size} names exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    #[error("Got {ids} ids for {names} names")]
    AmbiguousIdCount { names: usize, ids: usize },

    #[error("Other error: {0}")]
    Other(String),
}

impl TaxomatchError {
    /// Errors the caller can fix by correcting the query; none of them touch stored state
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            TaxomatchError::DuplicateQueryId(_)
                | TaxomatchError::BatchTooLarge { .. }
                | TaxomatchError::AmbiguousIdCount { .. }
                | TaxomatchError::ContextNotFound(_)
        )
    }
}

/// Result type alias for taxomatch operations
pub type TaxomatchResult<T> = Result<T, TaxomatchError>;

impl From<serde_json::Error> for TaxomatchError {
    fn from(err: serde_json::Error) -> Self {
        TaxomatchError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for TaxomatchError {
    fn from(err: anyhow::Error) -> Self {
        TaxomatchError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let config_error = TaxomatchError::Configuration("missing field".to_string());
        assert_eq!(format!("{}", config_error), "Configuration error: missing field");

        let missing = TaxomatchError::ContextNotFound("Mammals".to_string());
        assert_eq!(format!("{}", missing), "Context not found: Mammals");

        let dup = TaxomatchError::DuplicateBarrierMapping {
            first: "Metazoa".to_string(),
            second: "Animalia".to_string(),
            node: NodeId(7),
        };
        assert_eq!(
            format!("{}", dup),
            "Barrier names 'Metazoa' and 'Animalia' both resolve to node 7"
        );

        let too_large = TaxomatchError::BatchTooLarge { size: 300, limit: 250 };
        assert_eq!(format!("{}", too_large), "Batch of 300 names exceeds the limit of 250");

        let ids = TaxomatchError::AmbiguousIdCount { names: 3, ids: 2 };
        assert_eq!(format!("{}", ids), "Got 2 ids for 3 names");

        assert_eq!(
            format!("{}", TaxomatchError::EmptyTaxonSet),
            "Cannot compute the LICA of an empty taxon set"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: TaxomatchError = io_err.into();

        match err {
            TaxomatchError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_result: Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{invalid json}");
        let err: TaxomatchError = parse_result.unwrap_err().into();

        match err {
            TaxomatchError::Serialization(msg) => assert!(msg.contains("key must be a string")),
            _ => panic!("Expected Serialization error variant"),
        }
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let err: TaxomatchError = anyhow::anyhow!("custom error message").into();

        match err {
            TaxomatchError::Other(msg) => assert_eq!(msg, "custom error message"),
            _ => panic!("Expected Other error variant"),
        }
    }

    #[test]
    fn test_query_errors_are_recoverable() {
        assert!(TaxomatchError::DuplicateQueryId("a".into()).is_query_error());
        assert!(TaxomatchError::BatchTooLarge { size: 2, limit: 1 }.is_query_error());
        assert!(TaxomatchError::AmbiguousIdCount { names: 2, ids: 1 }.is_query_error());

        assert!(!TaxomatchError::EmptyTaxonSet.is_query_error());
        assert!(!TaxomatchError::SelfReferencingPreferredEdge { node: NodeId(1) }.is_query_error());
        assert!(!TaxomatchError::SynthesisIncomplete.is_query_error());
    }
}
