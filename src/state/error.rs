// ABOUTME: Error types for deployment state persistence.
// ABOUTME: Covers reading, parsing, writing and record lookups.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to read deployment state {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse deployment state {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write deployment state {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize deployment state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("{kind} record not found: {id}")]
    RecordNotFound { kind: &'static str, id: String },

    #[error("{kind} record with cid '{cid}' already exists")]
    DuplicateCid { kind: &'static str, cid: String },
}
