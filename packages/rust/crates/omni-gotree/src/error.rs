//! Error types for tree loading, type expressions and tree edits.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Failure to turn Go source text into a [`crate::SourceTree`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The Go grammar could not be loaded into the parser.
    #[error("Failed to load Go grammar: {0}")]
    Language(String),

    /// tree-sitter returned no tree at all.
    #[error("Parser produced no syntax tree")]
    NoTree,

    /// The source contains an ERROR or MISSING node, or a top-level
    /// statement where only declarations are allowed.
    #[error("Syntax error at {line}:{column} near `{snippet}`")]
    Syntax {
        /// 1-indexed line.
        line: usize,
        /// 1-indexed column (bytes).
        column: usize,
        /// Source text of the offending node, truncated.
        snippet: String,
    },

    /// A declaration appears before any `package` clause.
    #[error("Missing package clause")]
    MissingPackage,

    /// A rendered declaration did not parse back into exactly one declaration.
    #[error("Snippet is not a single declaration: {0}")]
    UnexpectedSnippet(String),
}

/// Rejected type expression text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeParseError {
    /// Empty text, or an empty pointee/element/key/value.
    #[error("Empty type expression")]
    Empty,

    /// A map whose key is itself a map, e.g. `map[map[K]V]X`.
    #[error("Nested map keys are not supported: {0}")]
    NestedMapKey(String),
}

/// Failure to splice a change into the tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The declaration index is out of range.
    #[error("No declaration at index {0}")]
    NoSuchDeclaration(usize),

    /// The located type spec is not a struct.
    #[error("Type `{0}` is not a struct type")]
    NotARecord(String),

    /// The edited declaration text failed to re-parse.
    #[error("Edited declaration does not parse: {0}")]
    Reparse(#[from] ParseError),
}
