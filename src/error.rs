//! Error types for the fallible edges of the engine.
//!
//! Insufficient funds or a missing prerequisite are not errors: actions
//! report those as a `false` return and leave state untouched.

use thiserror::Error;

/// A string that does not describe a finite decimal number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid decimal literal: {0:?}")]
pub struct ParseDecimalError(pub String);

/// Why a persisted blob could not be turned back into a game.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("save blob is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("save blob is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("save blob has an invalid structure: {0}")]
    Structure(#[from] serde_json::Error),
    #[error("save version {version} is older than the oldest supported version {min}")]
    Incompatible { version: u32, min: u32 },
    #[error("save field `{field}` holds a negative or non-finite value")]
    InvalidValue { field: &'static str },
}

/// Why an import was refused. Storage is never touched on error.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("paste a save first")]
    Empty,
    #[error("import failed: invalid JSON (and not valid base64 JSON)")]
    InvalidEncoding,
    #[error("import failed: not a valid save ({0})")]
    InvalidStructure(String),
    #[error("import failed: could not write to storage ({0})")]
    Storage(#[from] StorageError),
}

/// A failed write to the save backend.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct StorageError(pub String);

/// A simulation step that would have committed an invalid value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationFault {
    #[error("step produced a non-finite or negative `{field}`")]
    NonFinite { field: &'static str },
}
