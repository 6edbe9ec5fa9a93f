use thiserror::Error;

use crate::core::types::SubjectId;

#[derive(Error, Debug)]
pub enum SkirmishError {
    #[error("Wrong mode: {0}")]
    WrongMode(String),

    #[error("Subject not found: {0:?}")]
    SubjectNotFound(SubjectId),

    #[error("Duplicate subject: {0:?}")]
    DuplicateSubject(SubjectId),

    #[error("State load error: {0}")]
    StateLoad(#[from] StateLoadError),

    #[error("State dump error: {0}")]
    StateDump(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Map error: {0}")]
    Map(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Errors raised while reading a persisted state document
///
/// Loading a state never fails with anything else.
#[derive(Error, Debug)]
pub enum StateLoadError {
    /// Document has no content at all
    #[error("state document is empty")]
    Empty,
    /// Document is not well-formed XML
    #[error("state document is malformed: {0}")]
    Malformed(String),
    /// Document is well-formed but does not match the state schema
    #[error("state document does not match schema: {0}")]
    Schema(String),
    /// Document could not be read
    #[error("state document could not be read: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, SkirmishError>;
