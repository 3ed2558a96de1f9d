//! Text splices on a [`SourceTree`].
//!
//! Every edit rewrites the text of exactly one declaration (or adds one),
//! then re-parses that declaration on its own so offsets and structure are
//! always derived from the text, never patched by hand.

use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::tree::{DeclKind, Declaration, ImportLayout, SourceTree, TypeBody, TypeLocation};
use crate::types::TypeReference;

/// Import path that carries a cgo preamble and must stay a lone declaration.
const CGO_IMPORT: &str = "C";

/// A struct field to append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewField {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: TypeReference,
    /// Tag content, e.g. `yaml:"modules"`. Backticks are added when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Doc comment text, one `//` line per text line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl NewField {
    /// Field without tag or doc.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeReference) -> Self {
        Self {
            name: name.into(),
            ty,
            tag: None,
            doc: None,
        }
    }

    /// Set the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the doc comment.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    fn render(&self, indent: &str, eol: &str) -> String {
        let mut out = render_doc(self.doc.as_deref(), indent, eol);
        out.push_str(indent);
        out.push_str(&self.name);
        out.push(' ');
        out.push_str(&self.ty.to_string());
        if let Some(tag) = self.tag.as_deref().filter(|t| !t.is_empty()) {
            out.push(' ');
            if tag.starts_with('`') || tag.starts_with('"') {
                out.push_str(tag);
            } else {
                out.push('`');
                out.push_str(tag);
                out.push('`');
            }
        }
        out.push_str(eol);
        out
    }
}

/// A type declaration to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewType {
    /// Type name.
    pub name: String,
    /// Doc comment text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Underlying type.
    pub body: NewTypeBody,
}

/// Underlying type of a [`NewType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewTypeBody {
    /// `struct { ... }` with the given fields (possibly none).
    Record(Vec<NewField>),
    /// `type Name T`
    Defined(TypeReference),
    /// `type Name = T`
    Alias(TypeReference),
}

impl NewType {
    /// An empty struct type.
    #[must_use]
    pub fn record(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: None,
            body: NewTypeBody::Record(Vec::new()),
        }
    }

    /// Set the doc comment.
    #[must_use]
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Add a field (only meaningful for record bodies).
    #[must_use]
    pub fn with_field(mut self, field: NewField) -> Self {
        if let NewTypeBody::Record(fields) = &mut self.body {
            fields.push(field);
        }
        self
    }

    /// Every type this declaration mentions.
    #[must_use]
    pub fn referenced_types(&self) -> Vec<&TypeReference> {
        match &self.body {
            NewTypeBody::Record(fields) => fields.iter().map(|f| &f.ty).collect(),
            NewTypeBody::Defined(ty) | NewTypeBody::Alias(ty) => vec![ty],
        }
    }

    /// Go source for the declaration, without leading separator.
    #[must_use]
    pub fn render(&self) -> String {
        self.render_with("\n")
    }

    fn render_with(&self, eol: &str) -> String {
        let mut out = render_doc(self.doc.as_deref(), "", eol);
        out.push_str("type ");
        out.push_str(&self.name);
        match &self.body {
            NewTypeBody::Record(fields) => {
                out.push_str(" struct {");
                out.push_str(eol);
                for field in fields {
                    out.push_str(&field.render("\t", eol));
                }
                out.push('}');
            }
            NewTypeBody::Defined(ty) => {
                out.push(' ');
                out.push_str(&ty.to_string());
            }
            NewTypeBody::Alias(ty) => {
                out.push_str(" = ");
                out.push_str(&ty.to_string());
            }
        }
        out
    }
}

fn render_doc(doc: Option<&str>, indent: &str, eol: &str) -> String {
    let mut out = String::new();
    for line in doc.into_iter().flat_map(str::lines) {
        out.push_str(indent);
        out.push_str("//");
        if !line.is_empty() {
            out.push(' ');
            out.push_str(line);
        }
        out.push_str(eol);
    }
    out
}

fn render_import(path: &str, alias: Option<&str>) -> String {
    match alias {
        Some(alias) => format!("{alias} \"{path}\""),
        None => format!("\"{path}\""),
    }
}

/// Position of `offset` within its line: (line start, whitespace-only prefix?).
fn line_of(text: &str, offset: usize) -> (usize, bool) {
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    let own_line = text[start..offset].chars().all(|c| c == ' ' || c == '\t');
    (start, own_line)
}

fn leading_whitespace(text: &str) -> &str {
    let end = text
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(text.len());
    &text[..end]
}

/// Insert `entry` (one or more complete lines) as the last item before the
/// closing delimiter at `close`.
fn splice_before_close(
    text: &str,
    close: usize,
    indent: Option<&str>,
    eol: &str,
    entry: &dyn Fn(&str) -> String,
) -> String {
    let (line_start, own_line) = line_of(text, close);
    let line_indent = leading_whitespace(&text[line_start..]);
    let indent = indent.map_or_else(|| format!("{line_indent}\t"), str::to_string);

    let mut out = String::with_capacity(text.len() + 64);
    if own_line {
        out.push_str(&text[..line_start]);
        out.push_str(&entry(&indent));
        out.push_str(&text[line_start..]);
    } else {
        out.push_str(&text[..close]);
        out.push_str(eol);
        out.push_str(&entry(&indent));
        out.push_str(line_indent);
        out.push_str(&text[close..]);
    }
    out
}

impl SourceTree {
    /// Line terminator of the file: `"\r\n"` when its first line ends that
    /// way, `"\n"` otherwise.
    #[must_use]
    pub fn line_ending(&self) -> &'static str {
        let parts = std::iter::once(self.header.as_str())
            .chain(self.decls.iter().map(|d| d.text.as_str()))
            .chain(std::iter::once(self.trailer.as_str()));
        for part in parts {
            if let Some(newline) = part.find('\n') {
                return if part[..newline].ends_with('\r') {
                    "\r\n"
                } else {
                    "\n"
                };
            }
        }
        "\n"
    }

    /// First import declaration that may take another spec. A cgo
    /// `import "C"` declaration is never extended.
    fn extendable_import(&self) -> Option<usize> {
        self.decls.iter().position(|d| match &d.kind {
            DeclKind::Import(import) => !import.specs.iter().any(|s| s.path == CGO_IMPORT),
            _ => false,
        })
    }

    /// Append `field` as the last field of the struct at `location`.
    ///
    /// # Errors
    /// `EditError::NoSuchDeclaration` / `EditError::NotARecord` for a stale
    /// location, `EditError::Reparse` if the result does not parse.
    pub fn append_field(
        &mut self,
        location: TypeLocation,
        field: &NewField,
    ) -> Result<(), EditError> {
        let decl = self
            .decls
            .get(location.decl)
            .ok_or(EditError::NoSuchDeclaration(location.decl))?;
        let spec = match &decl.kind {
            DeclKind::Type(t) => t.specs.get(location.spec),
            _ => None,
        }
        .ok_or(EditError::NoSuchDeclaration(location.decl))?;
        let TypeBody::Record(record) = &spec.body else {
            return Err(EditError::NotARecord(spec.name.clone()));
        };

        let eol = self.line_ending();
        let text = splice_before_close(
            &decl.text,
            record.close_brace,
            record.field_indent.as_deref(),
            eol,
            &|indent| field.render(indent, eol),
        );
        let updated = Declaration::from_snippet(&text)?;
        self.replace(location.decl, updated);
        Ok(())
    }

    /// Insert a new type declaration at `index` (clamped to the end).
    ///
    /// Returns the index the declaration landed at.
    ///
    /// # Errors
    /// `EditError::Reparse` if the rendered declaration does not parse.
    pub fn insert_type(&mut self, index: usize, ty: &NewType) -> Result<usize, EditError> {
        let eol = self.line_ending();
        let text = format!("{eol}{eol}{}", ty.render_with(eol));
        let decl = Declaration::from_snippet(&text)?;
        Ok(self.insert(index, decl))
    }

    /// Add an import spec to the first import declaration, creating a
    /// grouped import block after the leading imports when none can be
    /// extended.
    ///
    /// # Errors
    /// `EditError::Reparse` if the result does not parse.
    pub fn append_import(&mut self, path: &str, alias: Option<&str>) -> Result<(), EditError> {
        let spec = render_import(path, alias);
        let eol = self.line_ending();

        let Some(index) = self.extendable_import() else {
            let text = format!("{eol}{eol}import ({eol}\t{spec}{eol})");
            let decl = Declaration::from_snippet(&text)?;
            let at = self.leading_imports();
            self.insert(at, decl);
            return Ok(());
        };

        let decl = &self.decls[index];
        let DeclKind::Import(import) = &decl.kind else {
            return Err(EditError::NoSuchDeclaration(index));
        };

        let text = match &import.layout {
            ImportLayout::Grouped {
                close_paren,
                spec_indent,
            } => splice_before_close(
                &decl.text,
                *close_paren,
                spec_indent.as_deref(),
                eol,
                &|indent| format!("{indent}{spec}{eol}"),
            ),
            ImportLayout::Single {
                start,
                spec_start,
                end,
            } => {
                let existing = &decl.text[*spec_start..*end];
                format!(
                    "{}import ({eol}\t{existing}{eol}\t{spec}{eol}){}",
                    &decl.text[..*start],
                    &decl.text[*end..]
                )
            }
        };

        let updated = Declaration::from_snippet(&text)?;
        self.replace(index, updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_field_with_tag_and_doc() {
        let field = NewField::new("Modules", TypeReference::simple("ModulesConfig"))
            .with_tag("yaml:\"modules\"")
            .with_doc("Modules holds module settings.");
        assert_eq!(
            field.render("\t", "\n"),
            "\t// Modules holds module settings.\n\tModules ModulesConfig `yaml:\"modules\"`\n"
        );
    }

    #[test]
    fn test_render_field_keeps_quoted_tag() {
        let field = NewField::new("A", TypeReference::simple("int")).with_tag("`json:\"a\"`");
        assert_eq!(field.render("", "\n"), "A int `json:\"a\"`\n");
    }

    #[test]
    fn test_render_empty_record() {
        assert_eq!(
            NewType::record("ModulesConfig").render(),
            "type ModulesConfig struct {\n}"
        );
    }

    #[test]
    fn test_render_alias() {
        let ty = NewType {
            name: "Names".into(),
            doc: None,
            body: NewTypeBody::Alias(TypeReference::Sequence(Box::new(TypeReference::simple(
                "string",
            )))),
        };
        assert_eq!(ty.render(), "type Names = []string");
    }

    #[test]
    fn test_splice_own_line() {
        let text = "type A struct {\n\tX int\n}";
        let out = splice_before_close(text, text.len() - 1, Some("\t"), "\n", &|i| {
            format!("{i}Y int\n")
        });
        assert_eq!(out, "type A struct {\n\tX int\n\tY int\n}");
    }

    #[test]
    fn test_splice_inline_braces() {
        let text = "type A struct{}";
        let out = splice_before_close(text, text.len() - 1, None, "\n", &|i| {
            format!("{i}Y int\n")
        });
        assert_eq!(out, "type A struct{\n\tY int\n}");
    }

    #[test]
    fn test_render_record_with_crlf() {
        let ty = NewType::record("Limits")
            .with_doc("Limits caps resource use.")
            .with_field(NewField::new("Max", TypeReference::simple("int")));
        assert_eq!(
            ty.render_with("\r\n"),
            "// Limits caps resource use.\r\ntype Limits struct {\r\n\tMax int\r\n}"
        );
    }
}
