//! Type expressions.
//!
//! A deliberately small grammar over Go type syntax. It is a builder
//! convenience for code generators, not a type checker: anything it does not
//! recognize is kept verbatim as [`TypeReference::Simple`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeParseError;

/// Structured description of a Go type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeReference {
    /// `*T`
    Pointer(Box<TypeReference>),
    /// `[]T`
    Sequence(Box<TypeReference>),
    /// `map[K]V`
    Mapping(Box<TypeReference>, Box<TypeReference>),
    /// `pkg.Name`
    Qualified {
        /// Package name the type is selected from.
        namespace: String,
        /// Type name inside the package.
        name: String,
    },
    /// Anything else, kept verbatim.
    Simple(String),
}

impl TypeReference {
    /// Shorthand for a [`TypeReference::Simple`].
    #[must_use]
    pub fn simple(name: impl Into<String>) -> Self {
        Self::Simple(name.into())
    }

    /// Package namespaces referenced anywhere in the expression, in order of
    /// appearance and without duplicates.
    #[must_use]
    pub fn namespaces(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_namespaces(&mut out);
        out
    }

    fn collect_namespaces<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Pointer(inner) | Self::Sequence(inner) => inner.collect_namespaces(out),
            Self::Mapping(key, value) => {
                key.collect_namespaces(out);
                value.collect_namespaces(out);
            }
            Self::Qualified { namespace, .. } => {
                if !out.contains(&namespace.as_str()) {
                    out.push(namespace);
                }
            }
            Self::Simple(_) => {}
        }
    }

    /// Whether every leaf of the expression carries a non-empty name.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        match self {
            Self::Pointer(inner) | Self::Sequence(inner) => inner.is_well_formed(),
            Self::Mapping(key, value) => key.is_well_formed() && value.is_well_formed(),
            Self::Qualified { namespace, name } => {
                !namespace.trim().is_empty() && !name.trim().is_empty()
            }
            Self::Simple(name) => !name.trim().is_empty(),
        }
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pointer(inner) => write!(f, "*{inner}"),
            Self::Sequence(inner) => write!(f, "[]{inner}"),
            Self::Mapping(key, value) => write!(f, "map[{key}]{value}"),
            Self::Qualified { namespace, name } => write!(f, "{namespace}.{name}"),
            Self::Simple(name) => f.write_str(name),
        }
    }
}

impl FromStr for TypeReference {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_type(s)
    }
}

/// Parse a textual type expression.
///
/// Prefixes are handled recursively: `*T`, `[]T`, `map[K]V` and `pkg.Name`.
/// The map key is the text between the first `[` and its matching `]`.
///
/// # Errors
/// `TypeParseError::Empty` for empty text (at any level) and
/// `TypeParseError::NestedMapKey` when a map key contains another map.
pub fn parse_type(text: &str) -> Result<TypeReference, TypeParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TypeParseError::Empty);
    }

    if let Some(rest) = text.strip_prefix('*') {
        return Ok(TypeReference::Pointer(Box::new(parse_type(rest)?)));
    }
    if let Some(rest) = text.strip_prefix("[]") {
        return Ok(TypeReference::Sequence(Box::new(parse_type(rest)?)));
    }
    if let Some(rest) = text.strip_prefix("map[") {
        let Some(close) = matching_bracket(rest) else {
            return Ok(TypeReference::Simple(text.to_string()));
        };
        let key = &rest[..close];
        if key.contains("map[") {
            return Err(TypeParseError::NestedMapKey(text.to_string()));
        }
        let value = &rest[close + 1..];
        return Ok(TypeReference::Mapping(
            Box::new(parse_type(key)?),
            Box::new(parse_type(value)?),
        ));
    }
    if let Some((namespace, name)) = text.split_once('.') {
        if is_identifier(namespace) && is_selector(name) {
            return Ok(TypeReference::Qualified {
                namespace: namespace.to_string(),
                name: name.to_string(),
            });
        }
    }

    Ok(TypeReference::Simple(text.to_string()))
}

/// Whether `text` is a Go identifier.
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn is_selector(text: &str) -> bool {
    !text.is_empty() && text.split('.').all(is_identifier)
}

/// Byte index of the `]` closing an already-consumed `[`.
fn matching_bracket(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (idx, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}
