use pest::{iterators::Pair, Parser};
use pest_derive::Parser;

use super::error::{rule_expectation, SyntaxError, SyntaxErrorKind};
use super::scanner::{self, BracketReport, ScanError};
use crate::ast::{
    is_nth_pseudo_class, AnyValue, AttributeMatch, AttributeMatcher, AttributeModifier,
    AttributeSelector, AttributeValue, ClassSelector, Combinator, ComplexSelector,
    CompoundSelector, IdSelector, PseudoClassSelector, PseudoElementSelector, PseudoSelector,
    SelectorList, SubclassSelector, TypeSelector,
};

#[derive(Parser)]
#[grammar = "parser/selector.pest"]
pub struct SelectorParser;

impl SelectorParser {
    /// Parse a comma-separated selector list
    pub fn parse_selector_list(input: &str, max_depth: usize) -> Result<SelectorList, SyntaxError> {
        let brackets = Self::prescan(input, max_depth)?;
        let mut pairs = Self::parse(Rule::selectors, input)
            .map_err(|e| SyntaxError::from_pest(&e, input, &brackets))?;

        let root = pairs
            .next()
            .ok_or_else(|| SyntaxError::internal(input, 0, "Grammar guarantees selectors exists"))?;

        let list = root
            .into_inner()
            .find(|pair| pair.as_rule() == Rule::selector_list)
            .ok_or_else(|| {
                SyntaxError::internal(input, 0, "Grammar guarantees selectors contains a list")
            })?;

        Self::build_selector_list(list, input)
    }

    /// Parse a bare token sequence, as found inside a functional pseudo's
    /// parentheses
    pub fn parse_text_fragment(input: &str, max_depth: usize) -> Result<AnyValue, SyntaxError> {
        let brackets = Self::prescan(input, max_depth)?;
        let mut pairs = Self::parse(Rule::text, input)
            .map_err(|e| SyntaxError::from_pest(&e, input, &brackets))?;

        let root = pairs
            .next()
            .ok_or_else(|| SyntaxError::internal(input, 0, "Grammar guarantees text exists"))?;

        let items = match root
            .into_inner()
            .find(|pair| pair.as_rule() == Rule::argument)
        {
            Some(argument) => Self::build_argument(argument, input)?,
            None => Vec::new(),
        };
        Ok(AnyValue::List(items))
    }

    fn prescan(input: &str, max_depth: usize) -> Result<BracketReport, SyntaxError> {
        scanner::scan_brackets(input, max_depth).map_err(|e| match e {
            ScanError::NestingTooDeep { offset, max_depth } => {
                SyntaxError::nesting_too_deep(input, offset, max_depth)
            }
            other => SyntaxError::from_scan(input, &other, 0),
        })
    }

    fn build_selector_list(pair: Pair<'_, Rule>, input: &str) -> Result<SelectorList, SyntaxError> {
        pair.into_inner()
            .filter(|pair| pair.as_rule() == Rule::complex_selector)
            .map(|pair| Self::build_complex(pair, input))
            .collect::<Result<Vec<_>, _>>()
            .map(SelectorList)
    }

    fn build_complex(pair: Pair<'_, Rule>, input: &str) -> Result<ComplexSelector, SyntaxError> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();

        let head = inner.next().ok_or_else(|| {
            SyntaxError::internal(input, span.start(), "Grammar guarantees a head compound")
        })?;
        let head = Self::build_compound(head, input)?;

        let mut tail = Vec::new();
        while let Some(combinator) = inner.next() {
            let combinator = Self::build_combinator(combinator, input)?;
            let compound = inner.next().ok_or_else(|| {
                SyntaxError::internal(
                    input,
                    span.end(),
                    "Grammar guarantees a compound after each combinator",
                )
            })?;
            tail.push((combinator, Self::build_compound(compound, input)?));
        }

        Ok(ComplexSelector { head, tail })
    }

    fn build_combinator(pair: Pair<'_, Rule>, input: &str) -> Result<Combinator, SyntaxError> {
        let start = pair.as_span().start();
        match pair.into_inner().next() {
            Some(symbol) if symbol.as_rule() == Rule::combinator_symbol => {
                Combinator::from_symbol(symbol.as_str()).ok_or_else(|| {
                    SyntaxError::internal(
                        input,
                        start,
                        format!("Unknown combinator symbol: {}", symbol.as_str()),
                    )
                })
            }
            Some(descendant) if descendant.as_rule() == Rule::descendant => {
                Ok(Combinator::Descendant)
            }
            other => Err(SyntaxError::internal(
                input,
                start,
                format!("Unexpected combinator content: {:?}", other.map(|p| p.as_rule())),
            )),
        }
    }

    fn build_compound(pair: Pair<'_, Rule>, input: &str) -> Result<CompoundSelector, SyntaxError> {
        let mut compound = CompoundSelector::default();
        let mut pseudo_element: Option<String> = None;

        for simple in pair.into_inner() {
            if let Some(element) = &pseudo_element {
                return Err(Self::pseudo_element_not_last(element, &simple, input));
            }

            match simple.as_rule() {
                Rule::type_selector => {
                    compound.type_selector = Some(Self::build_type(simple, input)?);
                }
                Rule::id_selector => {
                    let value = Self::prefixed_identifier(simple, input)?;
                    compound
                        .subclasses
                        .push(SubclassSelector::Id(IdSelector { value }));
                }
                Rule::class_selector => {
                    let value = Self::prefixed_identifier(simple, input)?;
                    compound
                        .subclasses
                        .push(SubclassSelector::Class(ClassSelector { value }));
                }
                Rule::attribute_selector => {
                    let attribute = Self::build_attribute(simple, input)?;
                    compound
                        .subclasses
                        .push(SubclassSelector::Attribute(attribute));
                }
                Rule::pseudo_class => {
                    let (name, parameter) = Self::build_pseudo(simple, input)?;
                    compound
                        .subclasses
                        .push(SubclassSelector::PseudoClass(PseudoClassSelector {
                            name,
                            parameter,
                        }));
                }
                Rule::pseudo_element => {
                    let (name, parameter) = Self::build_pseudo(simple, input)?;
                    pseudo_element = Some(name.clone());
                    compound
                        .pseudos
                        .push(PseudoSelector::Element(PseudoElementSelector {
                            name,
                            parameter,
                        }));
                }
                rule => {
                    return Err(SyntaxError::internal(
                        input,
                        simple.as_span().start(),
                        format!("Unexpected simple selector rule: {:?}", rule),
                    ))
                }
            }
        }

        Ok(compound)
    }

    fn pseudo_element_not_last(element: &str, simple: &Pair<'_, Rule>, input: &str) -> SyntaxError {
        let span = simple.as_span();
        let expected = vec![
            rule_expectation(Rule::comma),
            rule_expectation(Rule::combinator),
            rule_expectation(Rule::EOI),
        ];
        SyntaxError::at_span(
            input,
            SyntaxErrorKind::PseudoElementNotLast,
            span.start(),
            span.end(),
            format!(
                "pseudo-element is not last: \"::{}\" cannot be followed by \"{}\" in the same compound selector",
                element,
                span.as_str()
            ),
            expected,
        )
    }

    fn build_type(pair: Pair<'_, Rule>, input: &str) -> Result<TypeSelector, SyntaxError> {
        let start = pair.as_span().start();
        let inner = pair.into_inner().next().ok_or_else(|| {
            SyntaxError::internal(input, start, "Grammar guarantees type selector content")
        })?;
        let value = match inner.as_rule() {
            Rule::universal => "*".to_string(),
            Rule::ident => Self::identifier(&inner, input)?,
            rule => {
                return Err(SyntaxError::internal(
                    input,
                    start,
                    format!("Unexpected type selector rule: {:?}", rule),
                ))
            }
        };
        Ok(TypeSelector { value })
    }

    /// The identifier after `#` or `.`
    fn prefixed_identifier(pair: Pair<'_, Rule>, input: &str) -> Result<String, SyntaxError> {
        let start = pair.as_span().start();
        let ident = pair.into_inner().next().ok_or_else(|| {
            SyntaxError::internal(input, start, "Grammar guarantees an identifier")
        })?;
        Self::identifier(&ident, input)
    }

    fn identifier(pair: &Pair<'_, Rule>, input: &str) -> Result<String, SyntaxError> {
        scanner::decode_identifier(pair.as_str())
            .map_err(|e| SyntaxError::from_scan(input, &e, pair.as_span().start()))
    }

    fn string(pair: &Pair<'_, Rule>, input: &str) -> Result<String, SyntaxError> {
        scanner::decode_string(pair.as_str())
            .map_err(|e| SyntaxError::from_scan(input, &e, pair.as_span().start()))
    }

    fn build_attribute(pair: Pair<'_, Rule>, input: &str) -> Result<AttributeSelector, SyntaxError> {
        let start = pair.as_span().start();
        let mut inner = pair.into_inner();

        let name = inner.next().ok_or_else(|| {
            SyntaxError::internal(input, start, "Grammar guarantees an attribute name")
        })?;
        let name = Self::identifier(&name, input)?;

        let mut matcher = None;
        let mut value = None;
        let mut modifier = None;
        for part in inner {
            match part.as_rule() {
                Rule::attribute_matcher => {
                    matcher = Some(AttributeMatcher::from_symbol(part.as_str()).ok_or_else(|| {
                        SyntaxError::internal(
                            input,
                            part.as_span().start(),
                            format!("Unknown attribute matcher: {}", part.as_str()),
                        )
                    })?);
                }
                Rule::string => {
                    value = Some(AttributeValue {
                        quoted: true,
                        value: Self::string(&part, input)?,
                    });
                }
                Rule::ident => {
                    value = Some(AttributeValue {
                        quoted: false,
                        value: Self::identifier(&part, input)?,
                    });
                }
                Rule::attribute_modifier => modifier = AttributeModifier::from_flag(part.as_str()),
                Rule::bracket_close => {}
                rule => {
                    return Err(SyntaxError::internal(
                        input,
                        part.as_span().start(),
                        format!("Unexpected attribute selector rule: {:?}", rule),
                    ))
                }
            }
        }

        let value_match = match (matcher, value) {
            (Some(matcher), Some(value)) => Some(AttributeMatch {
                matcher,
                value,
                modifier,
            }),
            (None, None) => None,
            _ => {
                return Err(SyntaxError::internal(
                    input,
                    start,
                    "Grammar guarantees matcher and value appear together",
                ))
            }
        };

        Ok(AttributeSelector { name, value_match })
    }

    fn build_pseudo(
        pair: Pair<'_, Rule>,
        input: &str,
    ) -> Result<(String, Option<AnyValue>), SyntaxError> {
        let start = pair.as_span().start();
        let mut inner = pair.into_inner();

        let name = inner.next().ok_or_else(|| {
            SyntaxError::internal(input, start, "Grammar guarantees a pseudo name")
        })?;
        let name = match name.as_rule() {
            // plain ASCII, nothing to decode
            Rule::nth_name => name.as_str().to_string(),
            Rule::ident => Self::identifier(&name, input)?,
            rule => {
                return Err(SyntaxError::internal(
                    input,
                    start,
                    format!("Unexpected pseudo name rule: {:?}", rule),
                ))
            }
        };

        let parameter = match inner.next() {
            None => None,
            Some(args) => match args.as_rule() {
                Rule::nth_arguments => Some(Self::build_nth(args, input)?),
                Rule::arguments if is_nth_pseudo_class(&name) => {
                    Some(Self::build_escaped_nth(args, input)?)
                }
                Rule::arguments => Some(AnyValue::List(Self::build_arguments(args, input)?)),
                rule => {
                    return Err(SyntaxError::internal(
                        input,
                        args.as_span().start(),
                        format!("Unexpected pseudo parameter rule: {:?}", rule),
                    ))
                }
            },
        };

        Ok((name, parameter))
    }

    /// An+B text with whitespace removed and ASCII lowercased, checked to
    /// decode
    fn build_nth(pair: Pair<'_, Rule>, input: &str) -> Result<AnyValue, SyntaxError> {
        let start = pair.as_span().start();
        let value = pair
            .into_inner()
            .find(|part| part.as_rule() == Rule::nth_value)
            .ok_or_else(|| SyntaxError::internal(input, start, "Grammar guarantees an An+B value"))?;

        Self::nth_text(value.as_str(), value.as_span().start(), input)
    }

    /// Arguments of an `nth-*` name spelled with escapes, which the grammar
    /// only saw as a plain identifier. They are held to the same An+B rule.
    fn build_escaped_nth(args: Pair<'_, Rule>, input: &str) -> Result<AnyValue, SyntaxError> {
        let base = args.as_span().start();
        let text = args.as_str();

        match Self::parse(Rule::nth_arguments, text) {
            Ok(mut pairs) => {
                let value = pairs
                    .next()
                    .filter(|pair| pair.as_str().len() == text.len())
                    .and_then(|pair| {
                        pair.into_inner()
                            .find(|part| part.as_rule() == Rule::nth_value)
                    })
                    .ok_or_else(|| {
                        SyntaxError::internal(input, base, "Balanced arguments parse as one group")
                    })?;
                Self::nth_text(value.as_str(), base + value.as_span().start(), input)
            }
            Err(e) => Err(SyntaxError::from_pest_at(
                &e,
                input,
                base,
                &BracketReport::default(),
            )),
        }
    }

    /// Normalize An+B source text at `start` and check that it decodes
    fn nth_text(value: &str, start: usize, input: &str) -> Result<AnyValue, SyntaxError> {
        let text = value
            .chars()
            .filter(|c| !scanner::is_whitespace(*c))
            .collect::<String>()
            .to_ascii_lowercase();

        match scanner::read_nth(&text) {
            Ok(_) => Ok(AnyValue::Text(text)),
            Err(ScanError::NumberOutOfRange { .. }) => Err(SyntaxError::at_span(
                input,
                SyntaxErrorKind::NumberOutOfRange,
                start,
                start + value.len(),
                format!("number out of range: \"{}\" does not fit An+B", value),
                vec![rule_expectation(Rule::nth_value)],
            )),
            Err(e) => Err(SyntaxError::from_scan(input, &e, start)),
        }
    }

    fn build_arguments(pair: Pair<'_, Rule>, input: &str) -> Result<Vec<AnyValue>, SyntaxError> {
        match pair
            .into_inner()
            .find(|part| part.as_rule() == Rule::argument)
        {
            Some(argument) => Self::build_argument(argument, input),
            None => Ok(Vec::new()),
        }
    }

    fn build_argument(pair: Pair<'_, Rule>, input: &str) -> Result<Vec<AnyValue>, SyntaxError> {
        pair.into_inner()
            .map(|token| match token.as_rule() {
                Rule::string | Rule::number | Rule::ident | Rule::arg_delim => {
                    Ok(AnyValue::from(token.as_str()))
                }
                Rule::arg_space => Ok(AnyValue::from(" ")),
                Rule::arg_group => Self::build_group(token, input).map(AnyValue::List),
                rule => Err(SyntaxError::internal(
                    input,
                    token.as_span().start(),
                    format!("Unexpected argument token rule: {:?}", rule),
                )),
            })
            .collect()
    }

    /// Nested `(...)` or `[...]`, delimiters included
    fn build_group(pair: Pair<'_, Rule>, input: &str) -> Result<Vec<AnyValue>, SyntaxError> {
        let start = pair.as_span().start();
        let open = pair.as_str().get(..1).unwrap_or_default();
        let mut items = vec![AnyValue::from(open)];

        for part in pair.into_inner() {
            match part.as_rule() {
                Rule::argument => items.extend(Self::build_argument(part, input)?),
                Rule::paren_close | Rule::bracket_close => items.push(AnyValue::from(part.as_str())),
                rule => {
                    return Err(SyntaxError::internal(
                        input,
                        start,
                        format!("Unexpected argument group rule: {:?}", rule),
                    ))
                }
            }
        }

        Ok(items)
    }
}
