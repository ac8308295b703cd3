use css_selector_parser::*;

fn pseudo_class(input: &str) -> PseudoClassSelector {
    let list = parse(input).unwrap();
    let compound = &list.0[0].head;
    match compound.subclasses.last() {
        Some(SubclassSelector::PseudoClass(pseudo)) => pseudo.clone(),
        other => panic!("expected pseudo-class for {:?}, got {:?}", input, other),
    }
}

fn text(value: &str) -> AnyValue {
    AnyValue::from(value)
}

fn list(items: Vec<AnyValue>) -> AnyValue {
    AnyValue::List(items)
}

// ==============================================================================
// An+B
// ==============================================================================

#[test]
fn test_nth_parameters_decode() {
    let cases = vec![
        (":nth-child(2n+1)", "2n+1", Nth::new(2, 1)),
        (":nth-child( 2n + 1 )", "2n+1", Nth::new(2, 1)),
        (":NTH-CHILD(2N - 1)", "2n-1", Nth::new(2, -1)),
        (":nth-of-type(even)", "even", Nth::EVEN),
        (":nth-last-of-type(ODD)", "odd", Nth::ODD),
        (":nth-last-child(-n+3)", "-n+3", Nth::new(-1, 3)),
        (":nth-child(+n)", "+n", Nth::new(1, 0)),
        (":nth-col(n)", "n", Nth::new(1, 0)),
        (":nth-last-col(-2n)", "-2n", Nth::new(-2, 0)),
        (":nth-child(5)", "5", Nth::new(0, 5)),
        (":nth-child(-5)", "-5", Nth::new(0, -5)),
        (":nth-child(0n+0)", "0n+0", Nth::new(0, 0)),
    ];

    for (input, normalized, nth) in cases {
        let pseudo = pseudo_class(input);
        assert_eq!(pseudo.parameter, Some(text(normalized)), "input: {:?}", input);
        assert_eq!(pseudo.nth(), Some(nth), "input: {:?}", input);
    }
}

#[test]
fn test_nth_limits() {
    let pseudo = pseudo_class(":nth-child(2147483647n-2147483648)");
    assert_eq!(pseudo.nth(), Some(Nth::new(i32::MAX, i32::MIN)));
}

#[test]
fn test_nth_name_without_parentheses() {
    let pseudo = pseudo_class(":nth-child");
    assert_eq!(pseudo.parameter, None);
    assert_eq!(pseudo.nth(), None);
}

#[test]
fn test_escaped_nth_names_take_nth_parameters() {
    assert_eq!(parse(":nth-child(2n+1)"), parse(r":nth-\63hild(2n+1)"));
    assert_eq!(parse(":nth-of-type(odd)"), parse(r":\6eth-of-type(odd)"));

    let pseudo = pseudo_class(r":nth-\63hild( 2N + 1 )");
    assert_eq!(pseudo.name, "nth-child");
    assert_eq!(pseudo.parameter, Some(text("2n+1")));
    assert_eq!(pseudo.nth(), Some(Nth::new(2, 1)));

    assert_eq!(pseudo_class(r":nth-\63hild").parameter, None);
}

#[test]
fn test_escaped_nth_names_reject_other_arguments() {
    let err = parse(r":nth-\63hild(foo)").unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::UnexpectedInput);
    assert_eq!(err.location.start.offset, 13);
    assert_eq!(err.found.as_deref(), Some("f"));

    let err = parse(r":nth-\63hild(99999999999n)").unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::NumberOutOfRange);
    assert_eq!(err.location.start.offset, 13);
    assert_eq!(err.location.end.offset, 25);
}

#[test]
fn test_other_pseudo_classes_have_no_nth() {
    assert_eq!(pseudo_class(":first-child").nth(), None);
    assert_eq!(pseudo_class(":lang(2)").nth(), None);
}

// ==============================================================================
// Generic arguments
// ==============================================================================

#[test]
fn test_pseudo_without_parameter() {
    assert_eq!(pseudo_class(":hover").parameter, None);
}

#[test]
fn test_empty_parentheses() {
    assert_eq!(pseudo_class(":foo()").parameter, Some(list(vec![])));
    assert_eq!(pseudo_class(":foo( )").parameter, Some(list(vec![])));
}

#[test]
fn test_generic_argument_tokens() {
    let cases = vec![
        (
            ":not(.a, b)",
            vec![text("."), text("a"), text(","), text(" "), text("b")],
        ),
        (":lang( en )", vec![text("en")]),
        (":contains(\"x y\")", vec![text("\"x y\"")]),
        (":x(1.5em -2)", vec![text("1.5em"), text(" "), text("-2")]),
        (":x(a/* c */b)", vec![text("a"), text(" "), text("b")]),
        (":x(a\\)b)", vec![text("a\\)b")]),
        (":has(> img)", vec![text(">"), text(" "), text("img")]),
    ];

    for (input, items) in cases {
        assert_eq!(pseudo_class(input).parameter, Some(list(items)), "input: {:?}", input);
    }
}

#[test]
fn test_nested_groups_keep_their_delimiters() {
    let pseudo = pseudo_class(":is(a (b [c]))");
    let expected = list(vec![
        text("a"),
        text(" "),
        list(vec![
            text("("),
            text("b"),
            text(" "),
            list(vec![text("["), text("c"), text("]")]),
            text(")"),
        ]),
    ]);
    assert_eq!(pseudo.parameter, Some(expected.clone()));
    assert_eq!(expected.depth(), 3);
}

#[test]
fn test_nested_functional_pseudo_classes() {
    let pseudo = pseudo_class(":not(:is(.a))");
    assert_eq!(
        pseudo.parameter,
        Some(list(vec![
            text(":"),
            text("is"),
            list(vec![text("("), text("."), text("a"), text(")")]),
        ]))
    );
}

#[test]
fn test_pseudo_element_parameters() {
    let list_ = parse("::part(label)").unwrap();
    let element = list_.0[0].head.pseudo_element().unwrap().clone();
    assert_eq!(element.name, "part");
    assert_eq!(element.parameter, Some(list(vec![text("label")])));
}

// ==============================================================================
// Text entry point
// ==============================================================================

#[test]
fn test_parse_text() {
    let cases = vec![
        ("", vec![]),
        ("   ", vec![]),
        ("a, b", vec![text("a"), text(","), text(" "), text("b")]),
        ("2n+1", vec![text("2n"), text("+1")]),
        ("'s' [x]", vec![text("'s'"), text(" "), list(vec![text("["), text("x"), text("]")])]),
    ];

    for (input, items) in cases {
        assert_eq!(parse_text(input), Ok(list(items)), "input: {:?}", input);
    }
}

#[test]
fn test_parse_text_errors() {
    let err = parse_text("a)").unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::UnmatchedBracket);
    assert_eq!(err.location.start.offset, 1);

    let err = parse_text("(").unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::UnmatchedBracket);

    let err = parse_text("'open").unwrap_err();
    assert_eq!(err.kind, SyntaxErrorKind::UnterminatedString);
}

#[test]
fn test_text_and_pseudo_parameter_agree() {
    let inner = "a , (b) [c]";
    let pseudo = pseudo_class(&format!(":x({})", inner));
    assert_eq!(pseudo.parameter, parse_text(inner).ok());
}

// ==============================================================================
// Serialization
// ==============================================================================

#[cfg(feature = "serde")]
#[test]
fn test_serialized_attribute_selector() {
    use serde_json::json;

    let value = serde_json::to_value(parse("[href^='x' i]").unwrap()).unwrap();
    assert_eq!(
        value[0]["head"]["subclasses"][0]["Attribute"],
        json!({
            "name": "href",
            "match": {
                "matcher": "^=",
                "value": { "string": true, "value": "x" },
                "modifier": "i"
            }
        })
    );
    assert_eq!(value[0]["head"]["type"], json!(null));
}

#[cfg(feature = "serde")]
#[test]
fn test_serialized_parameters_are_untagged() {
    use serde_json::json;

    let value = serde_json::to_value(parse(":not(a):nth-child(odd)").unwrap()).unwrap();
    let subclasses = &value[0]["head"]["subclasses"];
    assert_eq!(subclasses[0]["PseudoClass"]["parameter"], json!(["a"]));
    assert_eq!(subclasses[1]["PseudoClass"]["parameter"], json!("odd"));
}
