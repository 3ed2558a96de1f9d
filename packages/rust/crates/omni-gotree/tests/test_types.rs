//! Tests for the type expression grammar.

use omni_gotree::{TypeParseError, TypeReference, parse_type};

fn simple(name: &str) -> Box<TypeReference> {
    Box::new(TypeReference::simple(name))
}

#[test]
fn test_simple_and_qualified() {
    assert_eq!(parse_type("ModulesConfig"), Ok(TypeReference::simple("ModulesConfig")));
    assert_eq!(
        parse_type("time.Duration"),
        Ok(TypeReference::Qualified {
            namespace: "time".into(),
            name: "Duration".into(),
        })
    );
}

#[test]
fn test_prefixes_nest() {
    let parsed = parse_type("[]*map[string]time.Duration").expect("Should parse");
    let expected = TypeReference::Sequence(Box::new(TypeReference::Pointer(Box::new(
        TypeReference::Mapping(
            simple("string"),
            Box::new(TypeReference::Qualified {
                namespace: "time".into(),
                name: "Duration".into(),
            }),
        ),
    ))));
    assert_eq!(parsed, expected);
    assert_eq!(parsed.to_string(), "[]*map[string]time.Duration");
}

#[test]
fn test_map_key_uses_matching_bracket() {
    let parsed = parse_type("map[[2]int][]string").expect("Should parse");
    assert_eq!(
        parsed,
        TypeReference::Mapping(
            simple("[2]int"),
            Box::new(TypeReference::Sequence(simple("string")))
        )
    );
}

#[test]
fn test_map_value_may_be_a_map() {
    let parsed = parse_type("map[string]map[string]int").expect("Should parse");
    assert_eq!(parsed.to_string(), "map[string]map[string]int");
}

#[test]
fn test_nested_map_key_rejected() {
    assert!(matches!(
        parse_type("map[map[string]int]bool"),
        Err(TypeParseError::NestedMapKey(_))
    ));
}

#[test]
fn test_empty_rejected_at_any_level() {
    assert_eq!(parse_type(""), Err(TypeParseError::Empty));
    assert_eq!(parse_type("   "), Err(TypeParseError::Empty));
    assert_eq!(parse_type("*"), Err(TypeParseError::Empty));
    assert_eq!(parse_type("[]"), Err(TypeParseError::Empty));
    assert_eq!(parse_type("map[]int"), Err(TypeParseError::Empty));
}

#[test]
fn test_unrecognized_forms_stay_verbatim() {
    for text in ["[4]int", "func(a.B) error", "chan int", "map[string", "interface{}"] {
        assert_eq!(parse_type(text), Ok(TypeReference::simple(text)), "{text}");
    }
}

#[test]
fn test_namespaces_deduplicated() {
    let parsed: TypeReference = "map[time.Month][]time.Duration".parse().expect("Should parse");
    assert_eq!(parsed.namespaces(), vec!["time"]);

    let parsed: TypeReference = "map[string]*yaml.Node".parse().expect("Should parse");
    assert_eq!(parsed.namespaces(), vec!["yaml"]);
}

#[test]
fn test_well_formed() {
    assert!(TypeReference::simple("int").is_well_formed());
    assert!(!TypeReference::simple(" ").is_well_formed());
    assert!(!TypeReference::Pointer(simple("")).is_well_formed());
}

#[test]
fn test_serde_shape() {
    let parsed = parse_type("*time.Time").expect("Should parse");
    let json = serde_json::to_string(&parsed).expect("Should serialize");
    assert_eq!(
        json,
        r#"{"pointer":{"qualified":{"namespace":"time","name":"Time"}}}"#
    );
}
