#![allow(clippy::doc_markdown)]

//! omni-mutate - Idempotent declaration-level edits for Go sources
//!
//! Code generators call this crate to grow a Go file one capability at a
//! time: add a field to a struct, insert a type next to another one, make
//! sure an import exists. Untouched regions keep every byte, re-running a
//! request changes nothing, and a failed batch leaves the file exactly as it
//! was.
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! omni-mutate/src/
//! ├── lib.rs           # Re-exports (this file)
//! ├── error.rs         # MutateError, SpecError (thiserror)
//! ├── config.rs        # MutateConfig (serde_yaml + env overrides)
//! ├── modification.rs  # Modification enum, idempotent apply
//! ├── pipeline.rs      # Ordered apply + per-step validation
//! ├── spec.rs          # ModificationSpec (serde) -> Modification
//! ├── modifier.rs      # FileModifier session: open/apply/write/rollback
//! ├── operation.rs     # ModifyFileOperation facade
//! └── diff.rs          # Unified diff for dry runs
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use omni_mutate::{ModificationSpec, ModifyFileOperation};
//!
//! let specs = ModificationSpec::list_from_json(r#"[
//!   {"kind": "add_record_field",
//!    "parameters": {"record": "Config", "field": "Modules",
//!                   "type": "ModulesConfig", "tag": "yaml:\"modules\""}},
//!   {"kind": "add_type_declaration",
//!    "parameters": {"name": "ModulesConfig", "position": {"after": "Config"}}}
//! ]"#)?;
//!
//! let report = ModifyFileOperation::new("config.go", specs).execute()?;
//! println!("{} change(s) applied", report.pipeline.applied());
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod config;
mod diff;
mod error;
mod modification;
mod modifier;
mod operation;
mod pipeline;
mod spec;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use config::MutateConfig;
pub use error::{MutateError, MutateResult, SpecError};
pub use modification::{AddImport, AddRecordField, AddTypeDeclaration, Modification, Outcome};
pub use modifier::{FileModifier, WriteOutcome};
pub use operation::{ExecutionReport, ModifyFileOperation};
pub use pipeline::{PipelineReport, StepReport, apply_all};
pub use spec::{
    FieldParams, ImportParams, ModificationSpec, RecordFieldParams, TypeDeclarationParams,
};

// Re-export the tree types callers need to build modifications by hand
pub use omni_gotree::{NewField, NewType, NewTypeBody, Position, SourceTree, TypeReference};

// Re-export diff utility for external use
pub use diff::generate_unified_diff;
