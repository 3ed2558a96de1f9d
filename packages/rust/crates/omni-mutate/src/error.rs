//! Error types for mutation operations.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use std::path::PathBuf;

use omni_gotree::{EditError, ParseError, TypeParseError, Violation};
use omni_io::IoError;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type MutateResult<T> = Result<T, MutateError>;

/// A malformed [`crate::ModificationSpec`], rejected before any file is read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// A required parameter is absent or empty.
    #[error("Missing parameter `{parameter}` for {kind}")]
    MissingParameter {
        /// Modification kind, e.g. `add_record_field`.
        kind: &'static str,
        /// Parameter name.
        parameter: &'static str,
    },

    /// A name that is not a Go identifier.
    #[error("Invalid identifier `{0}`")]
    InvalidIdentifier(String),

    /// Type text rejected by the type expression parser.
    #[error("Invalid type `{text}`: {source}")]
    InvalidType {
        /// Text as given.
        text: String,
        /// Parser error.
        source: TypeParseError,
    },

    /// A struct tag that cannot be written as a Go string literal.
    #[error("Invalid struct tag {0}")]
    InvalidTag(String),

    /// An import path that cannot be written as a Go string literal.
    #[error("Invalid import path `{0}`")]
    InvalidImportPath(String),

    /// The same field name appears twice in one new type.
    #[error("Duplicate field `{field}` in type `{record}`")]
    DuplicateField {
        /// Type being declared.
        record: String,
        /// Repeated field name.
        field: String,
    },

    /// A new type given both struct fields and an underlying type.
    #[error("Type `{0}` cannot have both fields and an underlying type")]
    ConflictingBody(String),

    /// The modification list could not be decoded.
    #[error("Failed to decode modification specs: {0}")]
    Decode(String),
}

/// Error types for mutation sessions and operations.
#[derive(Error, Debug)]
pub enum MutateError {
    /// Reading the target file failed.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// The target file (or the serialized result) is not well-formed Go.
    #[error("Parse error in {}: {source}", .path.display())]
    Parse {
        /// File being parsed.
        path: PathBuf,
        /// Underlying parse error.
        source: ParseError,
    },

    /// A tree edit failed to splice.
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// `AddRecordField` names a struct type the file does not declare.
    #[error("Target struct type `{0}` not found")]
    TargetNotFound(String),

    /// The tree broke one or more structural invariants.
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<Violation>),

    /// A modification spec was rejected.
    #[error("Invalid modification: {0}")]
    Spec(#[from] SpecError),

    /// The atomic write failed; the file was left as it was.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Target file.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// Restoring the original bytes failed.
    #[error("Failed to restore {}: {source}", .path.display())]
    Rollback {
        /// Target file.
        path: PathBuf,
        /// Underlying I/O error.
        source: IoError,
    },

    /// An operation failed and the rollback that followed failed too.
    #[error("{cause}; rollback also failed: {source}")]
    RollbackFailed {
        /// The error that triggered the rollback.
        cause: Box<MutateError>,
        /// Why the rollback failed.
        source: IoError,
    },

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(String),
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
