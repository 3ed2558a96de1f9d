//! Declaration lookup and insertion-point resolution.
//!
//! All lookups are by exact name; the first occurrence in declaration order
//! wins. Callers hold names, never indices, so lookups made after an earlier
//! edit see that edit.

use serde::{Deserialize, Serialize};

use crate::tree::{ImportSpec, RecordType, SourceTree, TypeLocation};

/// Where a new declaration goes relative to an anchor declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// After the last declaration.
    #[default]
    End,
    /// Directly after the named declaration.
    After(String),
    /// Directly before the named declaration.
    Before(String),
}

impl Position {
    /// The anchor name, if any.
    #[must_use]
    pub fn anchor(&self) -> Option<&str> {
        match self {
            Self::End => None,
            Self::After(name) | Self::Before(name) => Some(name),
        }
    }
}

/// The struct body of the first type named `name`.
///
/// Returns `None` when no such type exists or the first one is not a struct.
#[must_use]
pub fn find_record_type<'t>(tree: &'t SourceTree, name: &str) -> Option<&'t RecordType> {
    locate_record(tree, name)
        .and_then(|loc| tree.type_spec(loc))
        .and_then(|spec| spec.record())
}

/// Location of the first type named `name`, if it is a struct.
#[must_use]
pub fn locate_record(tree: &SourceTree, name: &str) -> Option<TypeLocation> {
    let location = tree.type_location(name)?;
    tree.type_spec(location)?.record().map(|_| location)
}

/// Whether any type (struct or not) named `name` exists.
#[must_use]
pub fn find_type_decl(tree: &SourceTree, name: &str) -> bool {
    tree.type_location(name).is_some()
}

/// Whether `path` is imported.
#[must_use]
pub fn find_import(tree: &SourceTree, path: &str) -> bool {
    tree.imports().any(|spec| spec.path == path)
}

/// The import that makes `namespace` resolvable, matched by alias or by the
/// last path segment.
#[must_use]
pub fn find_import_for_namespace<'t>(
    tree: &'t SourceTree,
    namespace: &str,
) -> Option<&'t ImportSpec> {
    tree.imports().find(|spec| spec.namespace() == namespace)
}

/// Declaration index a new declaration should be inserted at.
///
/// A missing anchor falls back to the end of the file. The result never
/// precedes the import declarations at the top of the file.
#[must_use]
pub fn resolve_position(tree: &SourceTree, position: &Position) -> usize {
    let index = match position {
        Position::End => tree.len(),
        Position::After(anchor) | Position::Before(anchor) => match tree.position_of(anchor) {
            Some(idx) if matches!(position, Position::After(_)) => idx + 1,
            Some(idx) => idx,
            None => {
                tracing::debug!(anchor = %anchor, "anchor not found, appending at end");
                tree.len()
            }
        },
    };
    index.max(tree.leading_imports())
}
