//! Tests for tree edits: fields, types and imports.

use omni_gotree::{
    NewField, NewType, NewTypeBody, Position, SourceTree, TypeReference, resolve_position,
};

const CONFIG_GO: &str = r#"package config

import (
	"fmt"
	"strings"
)

type Config struct {
	Name string `yaml:"name"`
	Port int    `yaml:"port"`
}

type Mode int

func (c Config) String() string {
	return fmt.Sprint(strings.TrimSpace(c.Name))
}
"#;

fn parse(source: &str) -> SourceTree {
    SourceTree::parse(source).expect("Fixture should parse")
}

#[test]
fn test_append_field_after_last_field() {
    let mut tree = parse(CONFIG_GO);
    let location = tree.type_location("Config").expect("Config exists");
    let field = NewField::new("Modules", TypeReference::simple("ModulesConfig"))
        .with_tag("yaml:\"modules\"");

    tree.append_field(location, &field).expect("Should append");

    let rendered = tree.render();
    assert!(rendered.contains(
        "\tPort int    `yaml:\"port\"`\n\tModules ModulesConfig `yaml:\"modules\"`\n}"
    ));
    let record = tree
        .type_spec(location)
        .and_then(|s| s.record())
        .expect("Still a struct");
    assert_eq!(record.fields.last().map(|f| f.name.as_str()), Some("Modules"));
}

#[test]
fn test_append_field_leaves_other_declarations_untouched() {
    let mut tree = parse(CONFIG_GO);
    let before: Vec<String> = tree
        .declarations()
        .iter()
        .map(|d| d.text().to_string())
        .collect();
    let location = tree.type_location("Config").expect("Config exists");

    tree.append_field(location, &NewField::new("Debug", TypeReference::simple("bool")))
        .expect("Should append");

    for (idx, decl) in tree.declarations().iter().enumerate() {
        if idx != location.decl {
            assert_eq!(decl.text(), before[idx]);
        }
    }
}

#[test]
fn test_append_field_to_empty_inline_struct() {
    let mut tree = parse("package a\n\ntype A struct{}\n");
    let location = tree.type_location("A").expect("A exists");
    tree.append_field(location, &NewField::new("X", TypeReference::simple("int")))
        .expect("Should append");
    assert_eq!(tree.render(), "package a\n\ntype A struct{\n\tX int\n}\n");
}

#[test]
fn test_append_field_in_grouped_declaration() {
    let source = "package a\n\ntype (\n\tA struct {\n\t\tX int\n\t}\n\tB int\n)\n";
    let mut tree = parse(source);
    let location = tree.type_location("A").expect("A exists");
    tree.append_field(location, &NewField::new("Y", TypeReference::simple("string")))
        .expect("Should append");
    assert!(tree.render().contains("\t\tX int\n\t\tY string\n\t}\n\tB int\n)"));
}

#[test]
fn test_append_field_to_non_struct_fails() {
    let mut tree = parse(CONFIG_GO);
    let location = tree.type_location("Mode").expect("Mode exists");
    let result = tree.append_field(location, &NewField::new("X", TypeReference::simple("int")));
    assert!(result.is_err());
    assert_eq!(tree.render(), CONFIG_GO);
}

#[test]
fn test_insert_type_after_anchor() {
    let mut tree = parse(CONFIG_GO);
    let index = resolve_position(&tree, &Position::After("Config".into()));
    let landed = tree
        .insert_type(index, &NewType::record("ModulesConfig"))
        .expect("Should insert");

    assert_eq!(landed, 2);
    assert_eq!(tree.position_of("ModulesConfig"), Some(2));
    assert_eq!(tree.position_of("Mode"), Some(3));
    assert!(tree.render().contains(
        "}\n\ntype ModulesConfig struct {\n}\n\ntype Mode int"
    ));
}

#[test]
fn test_insert_type_at_end_of_bare_file() {
    let mut tree = parse("package a\n\ntype A struct{}\n");
    let index = resolve_position(&tree, &Position::End);
    tree.insert_type(index, &NewType::record("B"))
        .expect("Should insert");
    assert_eq!(
        tree.render(),
        "package a\n\ntype A struct{}\n\ntype B struct {\n}\n"
    );
}

#[test]
fn test_insert_type_with_doc_and_fields() {
    let mut tree = parse("package a\n");
    let ty = NewType::record("Limits")
        .with_doc("Limits caps resource use.")
        .with_field(NewField::new("Max", TypeReference::simple("int")).with_tag("json:\"max\""));
    tree.insert_type(0, &ty).expect("Should insert");
    assert_eq!(
        tree.render(),
        "package a\n\n// Limits caps resource use.\ntype Limits struct {\n\tMax int `json:\"max\"`\n}\n"
    );
    let record = tree
        .type_location("Limits")
        .and_then(|loc| tree.type_spec(loc))
        .and_then(|s| s.record())
        .expect("Limits is a struct");
    assert!(record.has_field("Max"));
}

#[test]
fn test_insert_defined_type() {
    let mut tree = parse("package a\n");
    let ty = NewType {
        name: "Timeout".into(),
        doc: None,
        body: NewTypeBody::Defined(TypeReference::Qualified {
            namespace: "time".into(),
            name: "Duration".into(),
        }),
    };
    tree.insert_type(0, &ty).expect("Should insert");
    assert_eq!(tree.render(), "package a\n\ntype Timeout time.Duration\n");
}

#[test]
fn test_append_import_to_group() {
    let mut tree = parse(CONFIG_GO);
    tree.append_import("time", None).expect("Should append");
    assert!(tree.render().contains("\t\"fmt\"\n\t\"strings\"\n\t\"time\"\n)"));
    assert_eq!(tree.imports().count(), 3);
}

#[test]
fn test_append_aliased_import() {
    let mut tree = parse(CONFIG_GO);
    tree.append_import("gopkg.in/yaml.v3", Some("yaml"))
        .expect("Should append");
    assert!(tree.render().contains("\tyaml \"gopkg.in/yaml.v3\"\n)"));
}

#[test]
fn test_append_import_converts_single_import() {
    let source = "package a\n\nimport \"fmt\"\n\nfunc f() { fmt.Println() }\n";
    let mut tree = parse(source);
    tree.append_import("os", None).expect("Should append");
    assert_eq!(
        tree.render(),
        "package a\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nfunc f() { fmt.Println() }\n"
    );
}

#[test]
fn test_append_import_creates_block() {
    let mut tree = parse("package a\n\ntype A struct{}\n");
    tree.append_import("time", None).expect("Should append");
    assert_eq!(
        tree.render(),
        "package a\n\nimport (\n\t\"time\"\n)\n\ntype A struct{}\n"
    );
    assert_eq!(tree.leading_imports(), 1);
}

#[test]
fn test_insert_type_into_file_without_final_newline() {
    let mut tree = parse("package a\n\ntype Z struct {\n}");
    let index = resolve_position(&tree, &Position::End);
    tree.insert_type(index, &NewType::record("Y"))
        .expect("Should insert");
    assert_eq!(
        tree.render(),
        "package a\n\ntype Z struct {\n}\n\ntype Y struct {\n}"
    );
}

#[test]
fn test_append_field_in_file_without_final_newline() {
    let mut tree = parse("package a\n\ntype Z struct {\n}");
    let location = tree.type_location("Z").expect("Z exists");
    tree.append_field(location, &NewField::new("N", TypeReference::simple("int")))
        .expect("Should append");
    assert_eq!(tree.render(), "package a\n\ntype Z struct {\n\tN int\n}");
}

#[test]
fn test_crlf_file_keeps_crlf_line_endings() {
    let source = "package a\r\n\r\nimport \"fmt\"\r\n\r\ntype A struct {\r\n\tX int\r\n}\r\n";
    let mut tree = parse(source);

    tree.append_import("os", None).expect("Should append import");
    let location = tree.type_location("A").expect("A exists");
    let field = NewField::new("Y", TypeReference::simple("string")).with_doc("Y is new.");
    tree.append_field(location, &field)
        .expect("Should append field");
    let index = resolve_position(&tree, &Position::End);
    tree.insert_type(index, &NewType::record("B"))
        .expect("Should insert type");

    let rendered = tree.render();
    assert_eq!(
        rendered,
        "package a\r\n\r\nimport (\r\n\t\"fmt\"\r\n\t\"os\"\r\n)\r\n\r\ntype A struct {\r\n\tX int\r\n\t// Y is new.\r\n\tY string\r\n}\r\n\r\ntype B struct {\r\n}\r\n"
    );
    assert!(!rendered.replace("\r\n", "").contains('\n'));
}

#[test]
fn test_lf_file_reports_lf() {
    assert_eq!(parse(CONFIG_GO).line_ending(), "\n");
}

#[test]
fn test_cgo_import_is_never_extended() {
    let source = "package a\n\n// #include <stdio.h>\nimport \"C\"\n\nfunc f() {}\n";
    let mut tree = parse(source);
    tree.append_import("fmt", None).expect("Should append");
    assert_eq!(
        tree.render(),
        "package a\n\n// #include <stdio.h>\nimport \"C\"\n\nimport (\n\t\"fmt\"\n)\n\nfunc f() {}\n"
    );
    assert_eq!(tree.leading_imports(), 2);
}

#[test]
fn test_import_after_cgo_block_is_extended() {
    let source = "package a\n\n// #include <stdio.h>\nimport \"C\"\n\nimport \"fmt\"\n\nfunc f() {}\n";
    let mut tree = parse(source);
    tree.append_import("os", None).expect("Should append");
    assert_eq!(
        tree.render(),
        "package a\n\n// #include <stdio.h>\nimport \"C\"\n\nimport (\n\t\"fmt\"\n\t\"os\"\n)\n\nfunc f() {}\n"
    );
}
