//! tree-sitter based loader for [`SourceTree`].
//!
//! Only top-level structure is modelled. Everything between two
//! declarations (blank lines, free-standing comments, terminators) becomes
//! leading trivia of the next one, so no byte is ever dropped.

use tree_sitter::{Language, Node, Parser};

use crate::error::ParseError;
use crate::tree::{
    DeclKind, Declaration, Field, ImportDecl, ImportLayout, ImportSpec, RecordType, SourceTree,
    TypeBody, TypeDecl, TypeSpec,
};
use crate::types::{TypeReference, parse_type};

/// Package clause prepended when parsing a detached declaration.
const SNIPPET_HEADER: &str = "package snippet";

/// Longest source excerpt quoted in a syntax error.
const SNIPPET_LIMIT: usize = 40;

fn go_parser() -> Result<Parser, ParseError> {
    let language: Language = tree_sitter_go::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::Language(e.to_string()))?;
    Ok(parser)
}

/// Top-level node kinds Go allows after the package clause.
const DECLARATION_KINDS: &[&str] = &[
    "import_declaration",
    "type_declaration",
    "function_declaration",
    "method_declaration",
    "var_declaration",
    "const_declaration",
];

pub(crate) fn parse_source(source: &str) -> Result<SourceTree, ParseError> {
    if source.ends_with('\n') {
        return parse_terminated(source);
    }
    // The grammar needs a terminator after the last declaration.
    let padded = format!("{source}\n");
    let mut tree = parse_terminated(&padded)?;
    if tree.trailer.pop() != Some('\n') {
        return Err(ParseError::UnexpectedSnippet(truncate(source)));
    }
    Ok(tree)
}

fn parse_terminated(source: &str) -> Result<SourceTree, ParseError> {
    let mut parser = go_parser()?;
    let tree = parser.parse(source, None).ok_or(ParseError::NoTree)?;
    let root = tree.root_node();

    if root.has_error() {
        return Err(syntax_error(root, source));
    }

    let mut builder = TreeBuilder::new(source);
    let mut cursor = root.walk();
    let children: Vec<Node<'_>> = root.named_children(&mut cursor).collect();
    for child in children {
        builder.visit(child)?;
    }
    builder.finish()
}

pub(crate) fn parse_snippet(text: &str) -> Result<Declaration, ParseError> {
    let source = format!("{SNIPPET_HEADER}{text}");
    let tree = parse_source(&source)?;
    if tree.header != SNIPPET_HEADER || !tree.trailer.is_empty() || tree.decls.len() != 1 {
        return Err(ParseError::UnexpectedSnippet(truncate(text)));
    }
    let mut decls = tree.decls;
    decls.pop().ok_or_else(|| ParseError::UnexpectedSnippet(truncate(text)))
}

struct TreeBuilder<'s> {
    source: &'s str,
    header_end: Option<usize>,
    package: String,
    decls: Vec<Declaration>,
    /// Where the next declaration's text starts.
    offset: usize,
    /// Row on which the previous item ended.
    last_row: Option<usize>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            header_end: None,
            package: String::new(),
            decls: Vec::new(),
            offset: 0,
            last_row: None,
        }
    }

    fn visit(&mut self, node: Node<'_>) -> Result<(), ParseError> {
        match node.kind() {
            "comment" => {
                // A comment sharing a line with the previous item stays with it.
                if self.last_row == Some(node.start_position().row) {
                    let end = node.end_byte();
                    let tail = slice(self.source, self.offset, end);
                    match self.decls.last_mut() {
                        Some(decl) => decl.text.push_str(tail),
                        None => self.header_end = Some(end),
                    }
                    self.offset = end;
                    self.last_row = Some(node.end_position().row);
                }
            }
            "package_clause" => {
                if self.header_end.is_some() {
                    return Err(syntax_error(node, self.source));
                }
                self.package = node
                    .named_child(0)
                    .map(|n| text(n, self.source).to_string())
                    .unwrap_or_default();
                self.header_end = Some(node.end_byte());
                self.offset = node.end_byte();
                self.last_row = Some(node.end_position().row);
            }
            _ => {
                if self.header_end.is_none() {
                    return Err(ParseError::MissingPackage);
                }
                if !DECLARATION_KINDS.contains(&node.kind()) {
                    return Err(syntax_error(node, self.source));
                }
                let start = self.offset;
                let end = node.end_byte();
                let kind = classify(node, self.source, start);
                self.decls.push(Declaration {
                    text: slice(self.source, start, end).to_string(),
                    kind,
                });
                self.offset = end;
                self.last_row = Some(node.end_position().row);
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<SourceTree, ParseError> {
        let header_end = self.header_end.ok_or(ParseError::MissingPackage)?;
        let header = slice(self.source, 0, header_end).to_string();
        let trailer = slice(self.source, self.offset, self.source.len()).to_string();
        Ok(SourceTree::from_parts(
            header,
            self.package,
            self.decls,
            trailer,
        ))
    }
}

fn classify(node: Node<'_>, source: &str, base: usize) -> DeclKind {
    match node.kind() {
        "import_declaration" => DeclKind::Import(import_decl(node, source, base)),
        "type_declaration" => DeclKind::Type(type_decl(node, source, base)),
        "function_declaration" | "method_declaration" => DeclKind::Function {
            name: field_text(node, "name", source).unwrap_or_default(),
        },
        // var_declaration | const_declaration
        _ => {
            let mut specs = Vec::new();
            collect_kind(node, &["var_spec", "const_spec"], &mut specs);
            let names = specs
                .into_iter()
                .flat_map(|spec| {
                    let mut cursor = spec.walk();
                    spec.children_by_field_name("name", &mut cursor)
                        .map(|n| text(n, source).to_string())
                        .collect::<Vec<_>>()
                })
                .collect();
            DeclKind::Value { names }
        }
    }
}

fn import_decl(node: Node<'_>, source: &str, base: usize) -> ImportDecl {
    let mut spec_nodes = Vec::new();
    collect_kind(node, &["import_spec"], &mut spec_nodes);

    let specs = spec_nodes
        .iter()
        .map(|spec| {
            let raw = field_text(*spec, "path", source).unwrap_or_default();
            ImportSpec {
                alias: field_text(*spec, "name", source),
                path: unquote(&raw).to_string(),
                raw,
            }
        })
        .collect();

    let mut cursor = node.walk();
    let list = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "import_spec_list");

    let layout = match (list, spec_nodes.first()) {
        (Some(list), _) => ImportLayout::Grouped {
            close_paren: list.end_byte().saturating_sub(1 + base),
            spec_indent: spec_nodes
                .last()
                .and_then(|s| line_indent(source, s.start_byte())),
        },
        (None, Some(spec)) => ImportLayout::Single {
            start: node.start_byte().saturating_sub(base),
            spec_start: spec.start_byte().saturating_sub(base),
            end: spec.end_byte().saturating_sub(base),
        },
        (None, None) => ImportLayout::Single {
            start: node.start_byte().saturating_sub(base),
            spec_start: node.end_byte().saturating_sub(base),
            end: node.end_byte().saturating_sub(base),
        },
    };

    ImportDecl { specs, layout }
}

fn type_decl(node: Node<'_>, source: &str, base: usize) -> TypeDecl {
    let mut spec_nodes = Vec::new();
    collect_kind(node, &["type_spec", "type_alias"], &mut spec_nodes);

    let specs = spec_nodes
        .into_iter()
        .map(|spec| {
            let name = field_text(spec, "name", source).unwrap_or_default();
            let body = match spec.child_by_field_name("type") {
                Some(ty) if ty.kind() == "struct_type" => {
                    TypeBody::Record(record_type(ty, source, base))
                }
                Some(ty) => TypeBody::Expr(lenient_type(text(ty, source))),
                None => TypeBody::Expr(TypeReference::Simple(String::new())),
            };
            TypeSpec {
                name,
                alias: spec.kind() == "type_alias",
                body,
            }
        })
        .collect();

    TypeDecl { specs }
}

fn record_type(node: Node<'_>, source: &str, base: usize) -> RecordType {
    let mut cursor = node.walk();
    let list = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "field_declaration_list");

    let Some(list) = list else {
        return RecordType {
            fields: Vec::new(),
            close_brace: node.end_byte().saturating_sub(1 + base),
            field_indent: None,
        };
    };

    let mut field_nodes = Vec::new();
    collect_kind(list, &["field_declaration"], &mut field_nodes);

    let mut fields = Vec::new();
    for decl in &field_nodes {
        let ty_text = field_text(*decl, "type", source).unwrap_or_default();
        let tag = field_text(*decl, "tag", source);
        let mut cursor = decl.walk();
        let names: Vec<String> = decl
            .children_by_field_name("name", &mut cursor)
            .map(|n| text(n, source).to_string())
            .collect();

        if names.is_empty() {
            fields.push(Field {
                name: embedded_name(&ty_text).to_string(),
                ty: lenient_type(&ty_text),
                tag,
                embedded: true,
            });
        } else {
            for name in names {
                fields.push(Field {
                    name,
                    ty: lenient_type(&ty_text),
                    tag: tag.clone(),
                    embedded: false,
                });
            }
        }
    }

    RecordType {
        fields,
        close_brace: list.end_byte().saturating_sub(1 + base),
        field_indent: field_nodes
            .last()
            .and_then(|n| line_indent(source, n.start_byte())),
    }
}

/// Existing code is taken as-is: text the grammar rejects stays `Simple`.
fn lenient_type(text: &str) -> TypeReference {
    parse_type(text).unwrap_or_else(|_| TypeReference::Simple(text.to_string()))
}

/// `pkg.Name[T]` -> `Name`
fn embedded_name(type_text: &str) -> &str {
    let base = type_text.split('[').next().unwrap_or(type_text);
    base.rsplit('.')
        .next()
        .unwrap_or(base)
        .trim()
        .trim_start_matches('*')
}

/// Collect descendants of the given kinds without descending into matches.
fn collect_kind<'t>(node: Node<'t>, kinds: &[&str], out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
    for child in children {
        if kinds.contains(&child.kind()) {
            out.push(child);
        } else {
            collect_kind(child, kinds, out);
        }
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error)
}

fn syntax_error(node: Node<'_>, source: &str) -> ParseError {
    let culprit = first_error(node).unwrap_or(node);
    let point = culprit.start_position();
    ParseError::Syntax {
        line: point.row + 1,
        column: point.column + 1,
        snippet: truncate(text(culprit, source)),
    }
}

fn field_text(node: Node<'_>, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .map(|n| text(n, source).to_string())
}

fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    slice(source, node.start_byte(), node.end_byte())
}

fn slice(source: &str, start: usize, end: usize) -> &str {
    source.get(start..end).unwrap_or_default()
}

/// Whitespace preceding `offset` on its line, if nothing else precedes it.
fn line_indent(source: &str, offset: usize) -> Option<String> {
    let before = source.get(..offset)?;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let prefix = &before[line_start..];
    prefix
        .chars()
        .all(|c| c == ' ' || c == '\t')
        .then(|| prefix.to_string())
}

fn unquote(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(b'"'), Some(b'"')) | (Some(b'`'), Some(b'`')) if raw.len() >= 2 => {
            &raw[1..raw.len() - 1]
        }
        _ => raw,
    }
}

fn truncate(text: &str) -> String {
    let mut out: String = text.chars().take(SNIPPET_LIMIT).collect();
    if text.chars().count() > SNIPPET_LIMIT {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_name() {
        assert_eq!(embedded_name("Base"), "Base");
        assert_eq!(embedded_name("sync.Mutex"), "Mutex");
        assert_eq!(embedded_name("List[T]"), "List");
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"time\""), "time");
        assert_eq!(unquote("`net/http`"), "net/http");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn test_line_indent() {
        let src = "type A struct {\n\tX int\n}";
        let x = src.find('X').unwrap_or_default();
        assert_eq!(line_indent(src, x).as_deref(), Some("\t"));
        assert_eq!(line_indent(src, src.find("struct").unwrap_or_default()), None);
    }
}
