use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error type for extraction, persistence, and materialization failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("report root '{}' is missing required folder '{folder}'", root.display())]
    MissingLayout { root: PathBuf, folder: String },
    #[error("filename digits '{digits}' are not a valid YYYYMMDD date")]
    MalformedDate { digits: String },
    #[error("detection metadata '{}' is malformed: {reason}", path.display())]
    MalformedMetadata { path: PathBuf, reason: String },
    #[error("split file '{}' could not be read: {source}", path.display())]
    MissingPartition {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("split file '{}' is malformed: {source}", path.display())]
    MalformedPartition {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("image '{}' could not be decoded: {reason}", path.display())]
    ImageDecode { path: PathBuf, reason: String },
    #[error("image metadata literal is malformed: {0}")]
    MetadataLiteral(String),
    #[error("instruction template '{version}' expects {expected} values, got {found}")]
    TemplateArity {
        version: String,
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
