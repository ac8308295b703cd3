use css_selector_parser::*;

fn head(input: &str) -> CompoundSelector {
    parse(input).unwrap().into_vec().remove(0).head
}

fn class_value(input: &str) -> String {
    match &head(input).subclasses[0] {
        SubclassSelector::Class(class) => class.value.clone(),
        other => panic!("expected class selector for {:?}, got {:?}", input, other),
    }
}

fn id_value(input: &str) -> String {
    match &head(input).subclasses[0] {
        SubclassSelector::Id(id) => id.value.clone(),
        other => panic!("expected id selector for {:?}, got {:?}", input, other),
    }
}

// ==============================================================================
// Escapes
// ==============================================================================

#[test]
fn test_escapes_decode_like_literal_characters() {
    let cases = vec![
        (".\\66oo", ".foo"),
        (".\\000066oo", ".foo"),
        (".caf\\e9", ".café"),
        (".caf\\E9 ", ".café"),
        (".\\41 B", ".AB"),
        (".a\\-b", ".a-b"),
        (".\\_x", "._x"),
    ];

    for (escaped, literal) in cases {
        assert_eq!(class_value(escaped), class_value(literal), "input: {:?}", escaped);
    }
}

#[test]
fn test_escapes_of_characters_illegal_in_identifiers() {
    let cases = vec![
        ("#\\31 23", "123"),
        (".\\#x", "#x"),
        (".a\\.b", "a.b"),
        (".\\:hover", ":hover"),
        (".\\ x", " x"),
        (".\\31\r\n0", "10"),
    ];

    for (input, value) in cases {
        let decoded = if input.starts_with('#') {
            id_value(input)
        } else {
            class_value(input)
        };
        assert_eq!(decoded, value, "input: {:?}", input);
    }
}

#[test]
fn test_out_of_range_escapes_become_replacement_character() {
    let cases = vec![".\\0 a", ".\\d800 a", ".\\110000 a"];

    for input in cases {
        assert_eq!(class_value(input), "\u{FFFD}a", "input: {:?}", input);
    }
}

#[test]
fn test_escape_consumes_one_whitespace_only() {
    let list = parse(".\\41  b").unwrap();
    let complex = &list.0[0];
    assert_eq!(complex.tail.len(), 1);
    assert_eq!(complex.tail[0].0, Combinator::Descendant);
    assert_eq!(
        complex.head.subclasses,
        vec![SubclassSelector::Class(ClassSelector {
            value: "A".to_string()
        })]
    );
}

#[test]
fn test_string_escapes_and_line_continuation() {
    let cases = vec![
        ("[a=\"x\\\"y\"]", "x\"y"),
        ("[a='it\\'s']", "it's"),
        ("[a=\"\\41\"]", "A"),
        ("[a=\"line\\\nbreak\"]", "linebreak"),
        ("[a=\"\"]", ""),
    ];

    for (input, value) in cases {
        let SubclassSelector::Attribute(attribute) = &head(input).subclasses[0] else {
            panic!("expected attribute selector for {:?}", input);
        };
        let value_match = attribute.value_match.as_ref().unwrap();
        assert!(value_match.value.quoted);
        assert_eq!(value_match.value.value, value, "input: {:?}", input);
    }
}

// ==============================================================================
// Identifiers
// ==============================================================================

#[test]
fn test_identifier_forms() {
    let cases = vec![".-foo", ".--bar", ".--", "._x", ".日本", ".a1-2_b"];

    for input in cases {
        assert_eq!(class_value(input), &input[1..], "input: {:?}", input);
    }
}

#[test]
fn test_identifiers_cannot_start_with_a_digit() {
    let cases = vec![".1a", "#-1", ".-", "1a"];

    for input in cases {
        assert!(parse(input).is_err(), "input: {:?}", input);
    }
}

#[test]
fn test_names_keep_their_case() {
    let compound = head("DIV.Foo:HOVER::Before");
    assert_eq!(compound.type_selector.unwrap().value, "DIV");
    assert_eq!(compound.pseudos[0].name(), "Before");
    match &compound.subclasses[1] {
        SubclassSelector::PseudoClass(pseudo) => assert_eq!(pseudo.name, "HOVER"),
        other => panic!("expected pseudo-class, got {:?}", other),
    }
}

// ==============================================================================
// Whitespace and comments
// ==============================================================================

#[test]
fn test_surrounding_whitespace_is_ignored() {
    assert_eq!(parse("  a  "), parse("a"));
    assert_eq!(parse("\n\ta , b\x0C"), parse("a,b"));
}

#[test]
fn test_every_whitespace_character_is_a_descendant_combinator() {
    let cases = vec!["a b", "a\tb", "a\nb", "a\r\nb", "a\x0Cb", "a /* x */ b", "a/**/b"];

    for input in cases {
        let list = parse(input).unwrap();
        assert_eq!(
            list.0[0].combinators().collect::<Vec<_>>(),
            vec![Combinator::Descendant],
            "input: {:?}",
            input
        );
    }
}

#[test]
fn test_comments_around_explicit_combinators() {
    let list = parse("a/* x */>/* y */b").unwrap();
    assert_eq!(list.0[0].combinators().collect::<Vec<_>>(), vec![Combinator::Child]);

    let list = parse("a /* , */ , b").unwrap();
    assert_eq!(list.len(), 2);
}

#[test]
fn test_unterminated_comment_fails() {
    assert!(parse("a /* b").is_err());
}

#[test]
fn test_whitespace_is_not_allowed_inside_compounds() {
    let cases = vec!["a .b", "a #b", "a [b]", "a :hover"];

    for input in cases {
        let list = parse(input).unwrap();
        assert_eq!(list.0[0].tail.len(), 1, "input: {:?}", input);
        assert!(list.0[0].tail[0].1.is_implicitly_universal(), "input: {:?}", input);
    }
}

#[test]
fn test_type_selector_must_come_first() {
    let cases = vec![".a*", "#b div", ".a.b c"];
    assert!(parse(cases[0]).is_err());
    assert_eq!(parse(cases[1]).unwrap().0[0].tail.len(), 1);
    assert_eq!(parse(cases[2]).unwrap().0[0].tail.len(), 1);
    assert!(parse(".a div").unwrap().0[0].head.type_selector.is_none());
}
