//! Lossless declaration tree.
//!
//! A [`SourceTree`] splits a Go file into the header (everything through the
//! `package` clause), a list of top-level [`Declaration`]s and a trailer.
//! Each declaration owns its verbatim text, including the blank lines and
//! doc comments that lead into it and a comment trailing it on the same
//! line, so [`SourceTree::render`] reproduces an untouched file byte for
//! byte.

use std::collections::HashMap;

use crate::error::ParseError;
use crate::parse;
use crate::types::TypeReference;

/// Where a type spec lives: declaration index plus spec index inside a
/// (possibly grouped) `type` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeLocation {
    /// Index into [`SourceTree::declarations`].
    pub decl: usize,
    /// Index into [`TypeDecl::specs`].
    pub spec: usize,
}

/// Parsed Go file at declaration granularity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTree {
    pub(crate) header: String,
    pub(crate) package: String,
    pub(crate) decls: Vec<Declaration>,
    pub(crate) trailer: String,
    types: HashMap<String, TypeLocation>,
    names: HashMap<String, usize>,
}

impl SourceTree {
    pub(crate) fn from_parts(
        header: String,
        package: String,
        decls: Vec<Declaration>,
        trailer: String,
    ) -> Self {
        let mut tree = Self {
            header,
            package,
            decls,
            trailer,
            types: HashMap::new(),
            names: HashMap::new(),
        };
        tree.reindex();
        tree
    }

    /// Parse Go source text.
    ///
    /// # Errors
    /// Returns a [`ParseError`] when the text is not a well-formed Go file.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        parse::parse_source(source)
    }

    /// Print the tree back to source text.
    #[must_use]
    pub fn render(&self) -> String {
        let capacity = self.header.len()
            + self.trailer.len()
            + self.decls.iter().map(|d| d.text.len()).sum::<usize>();
        let mut out = String::with_capacity(capacity);
        out.push_str(&self.header);
        for decl in &self.decls {
            out.push_str(&decl.text);
        }
        out.push_str(&self.trailer);
        out
    }

    /// Package name from the `package` clause.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Top-level declarations in source order.
    #[must_use]
    pub fn declarations(&self) -> &[Declaration] {
        &self.decls
    }

    /// Number of top-level declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Whether the file has no declarations beyond its package clause.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// Location of the first type spec named `name`.
    #[must_use]
    pub fn type_location(&self, name: &str) -> Option<TypeLocation> {
        self.types.get(name).copied()
    }

    /// Index of the first declaration binding `name` (type, function,
    /// method, var or const).
    #[must_use]
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.names.get(name).copied()
    }

    /// The type spec at `location`, if it still exists.
    #[must_use]
    pub fn type_spec(&self, location: TypeLocation) -> Option<&TypeSpec> {
        match &self.decls.get(location.decl)?.kind {
            DeclKind::Type(decl) => decl.specs.get(location.spec),
            _ => None,
        }
    }

    /// Number of import declarations at the top of the file.
    #[must_use]
    pub fn leading_imports(&self) -> usize {
        self.decls
            .iter()
            .take_while(|d| matches!(d.kind, DeclKind::Import(_)))
            .count()
    }

    /// All import specs across every import declaration, in order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().flat_map(|d| match &d.kind {
            DeclKind::Import(decl) => decl.specs.as_slice(),
            _ => &[],
        })
    }

    /// All type specs with their locations, in order.
    pub fn type_specs(&self) -> impl Iterator<Item = (TypeLocation, &TypeSpec)> {
        self.decls.iter().enumerate().flat_map(|(decl, d)| {
            let specs = match &d.kind {
                DeclKind::Type(t) => t.specs.as_slice(),
                _ => &[],
            };
            specs
                .iter()
                .enumerate()
                .map(move |(spec, s)| (TypeLocation { decl, spec }, s))
        })
    }

    pub(crate) fn insert(&mut self, index: usize, decl: Declaration) -> usize {
        let index = index.min(self.decls.len());
        self.decls.insert(index, decl);
        self.reindex();
        index
    }

    pub(crate) fn replace(&mut self, index: usize, decl: Declaration) {
        if let Some(slot) = self.decls.get_mut(index) {
            *slot = decl;
            self.reindex();
        }
    }

    fn reindex(&mut self) {
        self.types.clear();
        self.names.clear();
        for (decl_idx, decl) in self.decls.iter().enumerate() {
            if let DeclKind::Type(t) = &decl.kind {
                for (spec_idx, spec) in t.specs.iter().enumerate() {
                    self.types.entry(spec.name.clone()).or_insert(TypeLocation {
                        decl: decl_idx,
                        spec: spec_idx,
                    });
                }
            }
            for name in decl.names() {
                self.names.entry(name.to_string()).or_insert(decl_idx);
            }
        }
    }
}

/// One top-level declaration with its verbatim text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub(crate) text: String,
    pub(crate) kind: DeclKind,
}

impl Declaration {
    /// Verbatim text, including leading trivia.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Structured view of the declaration.
    #[must_use]
    pub fn kind(&self) -> &DeclKind {
        &self.kind
    }

    /// Names bound by this declaration.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match &self.kind {
            DeclKind::Type(t) => t.specs.iter().map(|s| s.name.as_str()).collect(),
            DeclKind::Function { name } => vec![name.as_str()],
            DeclKind::Value { names } => names.iter().map(String::as_str).collect(),
            DeclKind::Import(_) => Vec::new(),
        }
    }

    /// Parse a standalone declaration (leading trivia included).
    ///
    /// # Errors
    /// Returns a [`ParseError`] unless `text` is exactly one declaration.
    pub fn from_snippet(text: &str) -> Result<Self, ParseError> {
        parse::parse_snippet(text)
    }
}

/// Structured content of a declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    /// `import "x"` or `import ( ... )`
    Import(ImportDecl),
    /// `type X ...` or `type ( ... )`
    Type(TypeDecl),
    /// A function or method.
    Function {
        /// Function or method name.
        name: String,
    },
    /// A `var` or `const` declaration.
    Value {
        /// Every bound name, in order.
        names: Vec<String>,
    },
}

/// A `type` declaration holding one or more specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    /// Specs in source order.
    pub specs: Vec<TypeSpec>,
}

/// A single named type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    /// Declared name.
    pub name: String,
    /// `type A = B` rather than `type A B`.
    pub alias: bool,
    /// Underlying type.
    pub body: TypeBody,
}

impl TypeSpec {
    /// The struct body, when the underlying type is a struct.
    #[must_use]
    pub fn record(&self) -> Option<&RecordType> {
        match &self.body {
            TypeBody::Record(record) => Some(record),
            TypeBody::Expr(_) => None,
        }
    }
}

/// Underlying type of a [`TypeSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBody {
    /// `struct { ... }`
    Record(RecordType),
    /// Any other type expression.
    Expr(TypeReference),
}

/// A struct type: named aggregate of fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordType {
    /// Fields in source order. `A, B int` yields two entries.
    pub fields: Vec<Field>,
    pub(crate) close_brace: usize,
    pub(crate) field_indent: Option<String>,
}

impl RecordType {
    /// The first field named `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Whether a field named `name` exists.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// A struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field name; for embedded fields the embedded type's name.
    pub name: String,
    /// Field type.
    pub ty: TypeReference,
    /// Raw tag literal, quotes included.
    pub tag: Option<String>,
    /// Embedded (anonymous) field.
    pub embedded: bool,
}

/// An import declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Specs in source order.
    pub specs: Vec<ImportSpec>,
    pub(crate) layout: ImportLayout,
}

/// Byte offsets (relative to the declaration text) needed to splice specs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ImportLayout {
    Grouped {
        close_paren: usize,
        spec_indent: Option<String>,
    },
    Single {
        start: usize,
        spec_start: usize,
        end: usize,
    },
}

/// A single imported package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Local name (`yaml "gopkg.in/yaml.v3"`), `_` or `.` included.
    pub alias: Option<String>,
    /// Path without quotes.
    pub path: String,
    /// Path literal exactly as written.
    pub raw: String,
}

impl ImportSpec {
    /// Name the package is referred to by in this file: the alias, or the
    /// last path segment.
    #[must_use]
    pub fn namespace(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}
