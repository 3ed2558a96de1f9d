//! The closed set of mutations and how each applies to a tree.
//!
//! Every variant is idempotent: applying it to a tree that already
//! satisfies it reports [`Outcome::AlreadyPresent`] and changes nothing.

use std::fmt;

use omni_gotree::{
    NewField, NewType, Position, SourceTree, TypeReference, find_import,
    find_import_for_namespace, find_record_type, find_type_decl, locate_record, resolve_position,
};
use serde::Serialize;

use crate::error::{MutateError, MutateResult};

/// Append a field to an existing struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddRecordField {
    /// Struct type to extend.
    pub record: String,
    /// Field to append.
    pub field: NewField,
}

/// Insert a new type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTypeDeclaration {
    /// Declaration to insert.
    pub ty: NewType,
    /// Where it goes.
    pub position: Position,
}

/// Ensure an import is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddImport {
    /// Import path, without quotes.
    pub path: String,
    /// Optional local name.
    pub alias: Option<String>,
}

/// A single declarative change to a Go file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modification {
    /// See [`AddRecordField`].
    AddRecordField(AddRecordField),
    /// See [`AddTypeDeclaration`].
    AddTypeDeclaration(AddTypeDeclaration),
    /// See [`AddImport`].
    AddImport(AddImport),
}

/// What applying a modification did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The tree changed.
    Applied,
    /// The tree already satisfied the modification.
    AlreadyPresent,
}

impl Modification {
    /// Apply to `tree`.
    ///
    /// # Errors
    /// `MutateError::TargetNotFound` when `AddRecordField` names a struct
    /// the file does not declare; `MutateError::Edit` if a splice does not
    /// re-parse.
    pub fn apply(&self, tree: &mut SourceTree) -> MutateResult<Outcome> {
        match self {
            Self::AddRecordField(m) => m.apply(tree),
            Self::AddTypeDeclaration(m) => m.apply(tree),
            Self::AddImport(m) => m.apply(tree),
        }
    }

    /// Short human description, e.g. `add field Config.Modules`.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Modification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddRecordField(m) => {
                write!(f, "add field {}.{} {}", m.record, m.field.name, m.field.ty)
            }
            Self::AddTypeDeclaration(m) => {
                write!(f, "add type {}", m.ty.name)?;
                match &m.position {
                    Position::End => Ok(()),
                    Position::After(anchor) => write!(f, " after {anchor}"),
                    Position::Before(anchor) => write!(f, " before {anchor}"),
                }
            }
            Self::AddImport(m) => match &m.alias {
                Some(alias) => write!(f, "add import {alias} \"{}\"", m.path),
                None => write!(f, "add import \"{}\"", m.path),
            },
        }
    }
}

impl AddRecordField {
    fn apply(&self, tree: &mut SourceTree) -> MutateResult<Outcome> {
        let location = locate_record(tree, &self.record)
            .ok_or_else(|| MutateError::TargetNotFound(self.record.clone()))?;

        let exists = find_record_type(tree, &self.record)
            .is_some_and(|record| record.has_field(&self.field.name));
        if exists {
            tracing::debug!(
                record = %self.record,
                field = %self.field.name,
                "field already present"
            );
            return Ok(Outcome::AlreadyPresent);
        }

        tree.append_field(location, &self.field)?;
        ensure_imports(tree, [&self.field.ty])?;
        Ok(Outcome::Applied)
    }
}

impl AddTypeDeclaration {
    fn apply(&self, tree: &mut SourceTree) -> MutateResult<Outcome> {
        if find_type_decl(tree, &self.ty.name) {
            tracing::debug!(name = %self.ty.name, "type already declared");
            return Ok(Outcome::AlreadyPresent);
        }

        let index = resolve_position(tree, &self.position);
        let landed = tree.insert_type(index, &self.ty)?;
        tracing::debug!(name = %self.ty.name, index = landed, "type inserted");
        ensure_imports(tree, self.ty.referenced_types())?;
        Ok(Outcome::Applied)
    }
}

impl AddImport {
    fn apply(&self, tree: &mut SourceTree) -> MutateResult<Outcome> {
        if find_import(tree, &self.path) {
            tracing::debug!(path = %self.path, "import already present");
            return Ok(Outcome::AlreadyPresent);
        }
        tree.append_import(&self.path, self.alias.as_deref())?;
        Ok(Outcome::Applied)
    }
}

/// Import every package a new type expression selects from, unless an
/// existing import already binds that name.
fn ensure_imports<'a>(
    tree: &mut SourceTree,
    types: impl IntoIterator<Item = &'a TypeReference>,
) -> MutateResult<()> {
    let mut needed: Vec<String> = Vec::new();
    for ty in types {
        for namespace in ty.namespaces() {
            if !needed.iter().any(|n| n == namespace) {
                needed.push(namespace.to_string());
            }
        }
    }

    for namespace in needed {
        if find_import_for_namespace(tree, &namespace).is_some() {
            continue;
        }
        tree.append_import(&namespace, None)?;
        tracing::debug!(namespace = %namespace, "inferred import");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use omni_gotree::NewTypeBody;

    fn tree(source: &str) -> SourceTree {
        SourceTree::parse(source).expect("Fixture should parse")
    }

    fn add_field(record: &str, name: &str, ty: TypeReference) -> Modification {
        Modification::AddRecordField(AddRecordField {
            record: record.into(),
            field: NewField::new(name, ty),
        })
    }

    #[test]
    fn test_add_field_twice_is_noop() {
        let mut tree = tree("package a\n\ntype A struct {\n}\n");
        let m = add_field("A", "X", TypeReference::simple("int"));

        assert_eq!(m.apply(&mut tree).expect("Should apply"), Outcome::Applied);
        let once = tree.render();
        assert_eq!(m.apply(&mut tree).expect("Should apply"), Outcome::AlreadyPresent);
        assert_eq!(tree.render(), once);
    }

    #[test]
    fn test_add_field_missing_record() {
        let mut tree = tree("package a\n\ntype A int\n");
        let m = add_field("A", "X", TypeReference::simple("int"));
        assert!(matches!(
            m.apply(&mut tree),
            Err(MutateError::TargetNotFound(name)) if name == "A"
        ));
    }

    #[test]
    fn test_qualified_field_type_adds_import() {
        let mut tree = tree("package a\n\ntype A struct {\n}\n");
        let ty: TypeReference = "map[string]time.Duration".parse().expect("Should parse");
        add_field("A", "Timeouts", ty)
            .apply(&mut tree)
            .expect("Should apply");
        assert!(omni_gotree::find_import(&tree, "time"));
    }

    #[test]
    fn test_aliased_import_satisfies_namespace() {
        let source = "package a\n\nimport yaml \"gopkg.in/yaml.v3\"\n\ntype A struct {\n}\n";
        let mut tree = tree(source);
        let ty: TypeReference = "*yaml.Node".parse().expect("Should parse");
        add_field("A", "Raw", ty).apply(&mut tree).expect("Should apply");
        assert!(!omni_gotree::find_import(&tree, "yaml"));
        assert_eq!(tree.imports().count(), 1);
    }

    #[test]
    fn test_add_type_existing_non_struct_is_noop() {
        let mut tree = tree("package a\n\ntype A int\n");
        let m = Modification::AddTypeDeclaration(AddTypeDeclaration {
            ty: NewType::record("A"),
            position: Position::End,
        });
        assert_eq!(m.apply(&mut tree).expect("Should apply"), Outcome::AlreadyPresent);
    }

    #[test]
    fn test_add_import_by_path() {
        let mut tree = tree("package a\n\nimport \"fmt\"\n");
        let m = Modification::AddImport(AddImport {
            path: "fmt".into(),
            alias: Some("f".into()),
        });
        assert_eq!(m.apply(&mut tree).expect("Should apply"), Outcome::AlreadyPresent);
    }

    #[test]
    fn test_describe() {
        let m = Modification::AddTypeDeclaration(AddTypeDeclaration {
            ty: NewType {
                name: "Owl".into(),
                doc: None,
                body: NewTypeBody::Record(Vec::new()),
            },
            position: Position::After("Config".into()),
        });
        assert_eq!(m.describe(), "add type Owl after Config");
        assert_eq!(
            add_field("Config", "Port", TypeReference::simple("int")).describe(),
            "add field Config.Port int"
        );
    }
}
