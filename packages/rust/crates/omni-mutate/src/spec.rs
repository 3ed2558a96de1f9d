//! Declarative, serializable modification requests.
//!
//! A spec list is what orchestration hands over, as JSON or YAML:
//!
//! ```yaml
//! - kind: add_record_field
//!   parameters: { record: Config, field: Modules, type: ModulesConfig, tag: 'yaml:"modules"' }
//! - kind: add_type_declaration
//!   parameters: { name: ModulesConfig, position: { after: Config } }
//! - kind: add_import
//!   parameters: { path: time }
//! ```
//!
//! Required string parameters default to empty when omitted so that a
//! missing parameter surfaces as [`SpecError::MissingParameter`] rather than
//! a generic decode error.

use std::collections::HashSet;
use std::fmt;

use omni_gotree::{
    NewField, NewType, NewTypeBody, Position, TypeParseError, TypeReference, is_identifier,
    parse_type,
};
use serde::{Deserialize, Serialize};

use crate::error::SpecError;
use crate::modification::{AddImport, AddRecordField, AddTypeDeclaration, Modification};

const ADD_RECORD_FIELD: &str = "add_record_field";
const ADD_TYPE_DECLARATION: &str = "add_type_declaration";
const ADD_IMPORT: &str = "add_import";

/// One requested change, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parameters", rename_all = "snake_case")]
pub enum ModificationSpec {
    /// Append a field to an existing struct.
    AddRecordField(RecordFieldParams),
    /// Insert a type declaration.
    AddTypeDeclaration(TypeDeclarationParams),
    /// Ensure an import.
    AddImport(ImportParams),
}

/// Parameters of [`ModificationSpec::AddRecordField`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFieldParams {
    /// Struct to extend.
    #[serde(default)]
    pub record: String,
    /// Field name.
    #[serde(default)]
    pub field: String,
    /// Field type, e.g. `map[string]*time.Duration`.
    #[serde(default, rename = "type")]
    pub type_text: String,
    /// Tag content, with or without surrounding backticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Doc comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// A field of a new struct type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldParams {
    /// Field name.
    #[serde(default)]
    pub name: String,
    /// Field type.
    #[serde(default, rename = "type")]
    pub type_text: String,
    /// Tag content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Doc comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Parameters of [`ModificationSpec::AddTypeDeclaration`].
///
/// Without `type` the declaration is a struct holding `fields` (possibly
/// none); with `type` it is a defined type, or an alias when `alias` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDeclarationParams {
    /// Type name.
    #[serde(default)]
    pub name: String,
    /// Doc comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Struct fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldParams>,
    /// Underlying type for non-struct declarations.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub underlying: Option<String>,
    /// Declare `type Name = T` instead of `type Name T`.
    #[serde(default)]
    pub alias: bool,
    /// Placement relative to another declaration.
    #[serde(default)]
    pub position: Position,
}

/// Parameters of [`ModificationSpec::AddImport`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportParams {
    /// Import path, without quotes.
    #[serde(default)]
    pub path: String,
    /// Optional local name (`_` and `.` allowed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ModificationSpec {
    /// Decode a JSON array of specs.
    ///
    /// # Errors
    /// `SpecError::Decode` on malformed input.
    pub fn list_from_json(raw: &str) -> Result<Vec<Self>, SpecError> {
        serde_json::from_str(raw).map_err(|e| SpecError::Decode(e.to_string()))
    }

    /// Decode a YAML sequence of specs.
    ///
    /// # Errors
    /// `SpecError::Decode` on malformed input.
    pub fn list_from_yaml(raw: &str) -> Result<Vec<Self>, SpecError> {
        serde_yaml::from_str(raw).map_err(|e| SpecError::Decode(e.to_string()))
    }

    /// Check well-formedness without building the modification.
    ///
    /// # Errors
    /// The first problem found.
    pub fn validate(&self) -> Result<(), SpecError> {
        self.to_modification().map(drop)
    }

    /// Build the modification this spec describes.
    ///
    /// # Errors
    /// The first problem found.
    pub fn to_modification(&self) -> Result<Modification, SpecError> {
        match self {
            Self::AddRecordField(p) => {
                require(ADD_RECORD_FIELD, "record", &p.record)?;
                check_identifier(&p.record)?;
                let field = build_field(
                    ADD_RECORD_FIELD,
                    ("field", &p.field),
                    &p.type_text,
                    p.tag.as_deref(),
                    p.doc.as_deref(),
                )?;
                Ok(Modification::AddRecordField(AddRecordField {
                    record: p.record.clone(),
                    field,
                }))
            }
            Self::AddTypeDeclaration(p) => {
                let ty = build_type(p)?;
                check_position(&p.position)?;
                Ok(Modification::AddTypeDeclaration(AddTypeDeclaration {
                    ty,
                    position: p.position.clone(),
                }))
            }
            Self::AddImport(p) => {
                require(ADD_IMPORT, "path", &p.path)?;
                check_import_path(&p.path)?;
                if let Some(alias) = &p.alias {
                    if alias != "." && !is_identifier(alias) {
                        return Err(SpecError::InvalidIdentifier(alias.clone()));
                    }
                }
                Ok(Modification::AddImport(AddImport {
                    path: p.path.clone(),
                    alias: p.alias.clone(),
                }))
            }
        }
    }
}

impl TryFrom<ModificationSpec> for Modification {
    type Error = SpecError;

    fn try_from(spec: ModificationSpec) -> Result<Self, Self::Error> {
        spec.to_modification()
    }
}

impl fmt::Display for ModificationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddRecordField(p) => write!(f, "add field {}.{}", p.record, p.field),
            Self::AddTypeDeclaration(p) => write!(f, "add type {}", p.name),
            Self::AddImport(p) => write!(f, "add import \"{}\"", p.path),
        }
    }
}

/// Validate a hand-built [`NewType`] the same way a spec would be.
pub(crate) fn check_new_type(ty: &NewType) -> Result<(), SpecError> {
    require(ADD_TYPE_DECLARATION, "name", &ty.name)?;
    check_identifier(&ty.name)?;
    match &ty.body {
        NewTypeBody::Record(fields) => {
            let mut seen = HashSet::new();
            for field in fields {
                require(ADD_TYPE_DECLARATION, "fields.name", &field.name)?;
                check_identifier(&field.name)?;
                check_type_reference(&field.ty)?;
                if let Some(tag) = &field.tag {
                    check_tag(tag)?;
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(SpecError::DuplicateField {
                        record: ty.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
            Ok(())
        }
        NewTypeBody::Defined(underlying) | NewTypeBody::Alias(underlying) => {
            check_type_reference(underlying)
        }
    }
}

fn build_type(p: &TypeDeclarationParams) -> Result<NewType, SpecError> {
    require(ADD_TYPE_DECLARATION, "name", &p.name)?;

    let body = match &p.underlying {
        Some(_) if !p.fields.is_empty() => {
            return Err(SpecError::ConflictingBody(p.name.clone()));
        }
        Some(text) => {
            let ty = parse_type_text(ADD_TYPE_DECLARATION, text)?;
            if p.alias {
                NewTypeBody::Alias(ty)
            } else {
                NewTypeBody::Defined(ty)
            }
        }
        None if p.alias => {
            return Err(SpecError::MissingParameter {
                kind: ADD_TYPE_DECLARATION,
                parameter: "type",
            });
        }
        None => NewTypeBody::Record(
            p.fields
                .iter()
                .map(|f| {
                    build_field(
                        ADD_TYPE_DECLARATION,
                        ("fields.name", &f.name),
                        &f.type_text,
                        f.tag.as_deref(),
                        f.doc.as_deref(),
                    )
                })
                .collect::<Result<_, _>>()?,
        ),
    };

    let ty = NewType {
        name: p.name.clone(),
        doc: p.doc.clone(),
        body,
    };
    check_new_type(&ty)?;
    Ok(ty)
}

/// `name` pairs the parameter key with its value for error reporting.
fn build_field(
    kind: &'static str,
    name: (&'static str, &str),
    type_text: &str,
    tag: Option<&str>,
    doc: Option<&str>,
) -> Result<NewField, SpecError> {
    let (parameter, name) = name;
    require(kind, parameter, name)?;
    check_identifier(name)?;
    let ty = parse_type_text(kind, type_text)?;

    let mut field = NewField::new(name, ty);
    if let Some(tag) = tag.filter(|t| !t.is_empty()) {
        check_tag(tag)?;
        field = field.with_tag(tag);
    }
    if let Some(doc) = doc {
        field = field.with_doc(doc);
    }
    Ok(field)
}

fn parse_type_text(kind: &'static str, text: &str) -> Result<TypeReference, SpecError> {
    require(kind, "type", text)?;
    let ty = parse_type(text).map_err(|source| SpecError::InvalidType {
        text: text.to_string(),
        source,
    })?;
    check_type_reference(&ty)?;
    Ok(ty)
}

fn require(kind: &'static str, parameter: &'static str, value: &str) -> Result<(), SpecError> {
    if value.trim().is_empty() {
        return Err(SpecError::MissingParameter { kind, parameter });
    }
    Ok(())
}

fn check_identifier(name: &str) -> Result<(), SpecError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(SpecError::InvalidIdentifier(name.to_string()))
    }
}

fn check_type_reference(ty: &TypeReference) -> Result<(), SpecError> {
    if ty.is_well_formed() {
        return Ok(());
    }
    Err(SpecError::InvalidType {
        text: ty.to_string(),
        source: TypeParseError::Empty,
    })
}

/// A tag is raw content, or a complete `` `...` `` / `"..."` literal.
fn check_tag(tag: &str) -> Result<(), SpecError> {
    let invalid = || SpecError::InvalidTag(tag.to_string());
    if tag.contains('\n') {
        return Err(invalid());
    }
    if let Some(rest) = tag.strip_prefix('`') {
        let inner = rest.strip_suffix('`').ok_or_else(invalid)?;
        if inner.contains('`') {
            return Err(invalid());
        }
    } else if let Some(rest) = tag.strip_prefix('"') {
        rest.strip_suffix('"').ok_or_else(invalid)?;
    } else if tag.contains('`') {
        return Err(invalid());
    }
    Ok(())
}

fn check_import_path(path: &str) -> Result<(), SpecError> {
    let bad = path
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '`' | '\\'));
    if bad {
        Err(SpecError::InvalidImportPath(path.to_string()))
    } else {
        Ok(())
    }
}

fn check_position(position: &Position) -> Result<(), SpecError> {
    match position.anchor() {
        Some(anchor) => check_identifier(anchor),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tag() {
        assert!(check_tag("yaml:\"modules\"").is_ok());
        assert!(check_tag("`json:\"a\"`").is_ok());
        assert!(check_tag("\"plain\"").is_ok());
        assert!(check_tag("`unterminated").is_err());
        assert!(check_tag("a`b").is_err());
        assert!(check_tag("``x``").is_err());
        assert!(check_tag("line\nbreak").is_err());
    }

    #[test]
    fn test_check_import_path() {
        assert!(check_import_path("gopkg.in/yaml.v3").is_ok());
        assert!(check_import_path("bad path").is_err());
        assert!(check_import_path("quo\"te").is_err());
    }
}
