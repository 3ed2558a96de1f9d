//! Structural checks over a [`SourceTree`].
//!
//! The checks are cheap and run after every edit. They return every problem
//! found rather than stopping at the first one.

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::tree::{DeclKind, SourceTree, TypeBody};
use crate::types::TypeReference;

/// A structural problem, tied to the declaration it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Index of the offending declaration.
    pub declaration: usize,
    /// What is wrong.
    pub kind: ViolationKind,
}

/// The kinds of structural problems the validator reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationKind {
    /// A type spec without a name.
    EmptyTypeName,
    /// A type spec whose underlying type is empty.
    EmptyTypeExpression {
        /// Type name.
        type_name: String,
    },
    /// A struct field without a name.
    EmptyFieldName {
        /// Enclosing type.
        type_name: String,
    },
    /// A struct field whose type is empty.
    EmptyFieldType {
        /// Enclosing type.
        type_name: String,
        /// Field name.
        field: String,
    },
    /// An import with an empty path.
    EmptyImportPath,
    /// An import path literal not wrapped in matching quotes.
    UndelimitedImportPath {
        /// Literal as written.
        raw: String,
    },
    /// A function, method, var or const without a name.
    EmptyDeclarationName,
    /// An import declaration after a non-import declaration.
    ImportAfterDeclaration,
    /// A struct naming itself directly as a field type.
    SelfReference {
        /// The struct.
        type_name: String,
        /// The field referencing it.
        field: String,
    },
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "declaration {}: ", self.declaration)?;
        match &self.kind {
            ViolationKind::EmptyTypeName => write!(f, "type declaration has an empty name"),
            ViolationKind::EmptyTypeExpression { type_name } => {
                write!(f, "type `{type_name}` has an empty type expression")
            }
            ViolationKind::EmptyFieldName { type_name } => {
                write!(f, "type `{type_name}` has a field with an empty name")
            }
            ViolationKind::EmptyFieldType { type_name, field } => {
                write!(f, "field `{type_name}.{field}` has an empty type")
            }
            ViolationKind::EmptyImportPath => write!(f, "import has an empty path"),
            ViolationKind::UndelimitedImportPath { raw } => {
                write!(f, "import path {raw} is not properly quoted")
            }
            ViolationKind::EmptyDeclarationName => write!(f, "declaration has an empty name"),
            ViolationKind::ImportAfterDeclaration => {
                write!(f, "import declaration follows a non-import declaration")
            }
            ViolationKind::SelfReference { type_name, field } => {
                write!(f, "field `{type_name}.{field}` directly embeds its own type")
            }
        }
    }
}

/// Check every structural invariant of `tree`.
#[must_use]
pub fn validate(tree: &SourceTree) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut seen_non_import = false;

    for (idx, decl) in tree.declarations().iter().enumerate() {
        let mut report = |kind| {
            violations.push(Violation {
                declaration: idx,
                kind,
            });
        };

        match decl.kind() {
            DeclKind::Import(import) => {
                if seen_non_import {
                    report(ViolationKind::ImportAfterDeclaration);
                }
                for spec in &import.specs {
                    if spec.path.is_empty() {
                        report(ViolationKind::EmptyImportPath);
                    }
                    if !is_delimited(&spec.raw) {
                        report(ViolationKind::UndelimitedImportPath {
                            raw: spec.raw.clone(),
                        });
                    }
                }
            }
            DeclKind::Type(ty) => {
                seen_non_import = true;
                for spec in &ty.specs {
                    if spec.name.trim().is_empty() {
                        report(ViolationKind::EmptyTypeName);
                    }
                    match &spec.body {
                        TypeBody::Expr(expr) if !expr.is_well_formed() => {
                            report(ViolationKind::EmptyTypeExpression {
                                type_name: spec.name.clone(),
                            });
                        }
                        TypeBody::Expr(_) => {}
                        TypeBody::Record(record) => {
                            for field in &record.fields {
                                if field.name.trim().is_empty() {
                                    report(ViolationKind::EmptyFieldName {
                                        type_name: spec.name.clone(),
                                    });
                                }
                                if !field.ty.is_well_formed() {
                                    report(ViolationKind::EmptyFieldType {
                                        type_name: spec.name.clone(),
                                        field: field.name.clone(),
                                    });
                                }
                            }
                        }
                    }
                }
            }
            DeclKind::Function { .. } | DeclKind::Value { .. } => {
                seen_non_import = true;
                if decl.names().iter().any(|n| n.trim().is_empty()) {
                    report(ViolationKind::EmptyDeclarationName);
                }
            }
        }
    }

    violations
}

/// Flag structs that name themselves directly as a field type.
///
/// This is a one-hop heuristic: `type A struct { next A }` is caught, while
/// `*A`, `[]A`, `map[K]A` and cycles through other types are not inspected.
#[must_use]
pub fn check_circular_references(tree: &SourceTree) -> Vec<Violation> {
    tree.type_specs()
        .filter_map(|(loc, spec)| spec.record().map(|record| (loc, spec, record)))
        .flat_map(|(loc, spec, record)| {
            record
                .fields
                .iter()
                .filter(move |field| {
                    matches!(&field.ty, TypeReference::Simple(name) if *name == spec.name)
                })
                .map(move |field| Violation {
                    declaration: loc.decl,
                    kind: ViolationKind::SelfReference {
                        type_name: spec.name.clone(),
                        field: field.name.clone(),
                    },
                })
        })
        .collect()
}

fn is_delimited(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.len() >= 2
        && matches!(
            (bytes[0], bytes[bytes.len() - 1]),
            (b'"', b'"') | (b'`', b'`')
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_delimited() {
        assert!(is_delimited("\"time\""));
        assert!(is_delimited("`time`"));
        assert!(!is_delimited("\"time`"));
        assert!(!is_delimited("\""));
        assert!(!is_delimited("time"));
    }
}
