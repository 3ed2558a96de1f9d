#![allow(clippy::doc_markdown)]

//! omni-gotree - Lossless Go declaration tree for Omni DevEnv
//!
//! Loads a Go file into a declaration-level tree that prints back byte for
//! byte, and offers the small set of edits code generators need: append a
//! struct field, insert a type declaration, add an import.
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! omni-gotree/src/
//! ├── lib.rs       # Re-exports (this file)
//! ├── error.rs     # ParseError, TypeParseError, EditError (thiserror)
//! ├── types.rs     # TypeReference + type expression parser
//! ├── tree.rs      # SourceTree, Declaration and friends
//! ├── parse.rs     # tree-sitter-go loader
//! ├── edit.rs      # Text splices (fields, types, imports)
//! ├── locator.rs   # Name lookup and Position resolution
//! └── validate.rs  # Structural checks
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use omni_gotree::{SourceTree, NewType, Position, resolve_position};
//!
//! let mut tree = SourceTree::parse("package config\n\ntype Config struct{}\n")?;
//! let at = resolve_position(&tree, &Position::After("Config".into()));
//! tree.insert_type(at, &NewType::record("ModulesConfig"))?;
//! assert!(tree.render().contains("type ModulesConfig struct {"));
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod edit;
mod error;
mod locator;
mod parse;
mod tree;
mod types;
mod validate;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::{EditError, ParseError, TypeParseError};
pub use tree::{
    DeclKind, Declaration, Field, ImportDecl, ImportSpec, RecordType, SourceTree, TypeBody,
    TypeDecl, TypeLocation, TypeSpec,
};
pub use types::{TypeReference, is_identifier, parse_type};

// Edits
pub use edit::{NewField, NewType, NewTypeBody};

// Lookup
pub use locator::{
    Position, find_import, find_import_for_namespace, find_record_type, find_type_decl,
    locate_record, resolve_position,
};

// Validation
pub use validate::{Violation, ViolationKind, check_circular_references, validate};
