use std::fmt;

use itertools::Itertools;
use miette::{Diagnostic, LabeledSpan, SourceCode, SourceSpan};
use pest::error::{ErrorVariant, InputLocation};
use thiserror::Error;

use super::raw::Rule;
use super::scanner::{self, BracketReport, ScanError};

// ============================================================================
// Locations
// ============================================================================

/// A point in the input. `offset` is a 0-based byte offset; `line` and
/// `column` are 1-based, the column counted in characters.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn at(input: &str, offset: usize) -> Self {
        let offset = offset.min(input.len());
        let (line, column) = match pest::Position::new(input, offset) {
            Some(position) => position.line_col(),
            None => (1, input[..floor_char_boundary(input, offset)].chars().count() + 1),
        };
        Position {
            offset,
            line,
            column,
        }
    }
}

fn floor_char_boundary(input: &str, mut offset: usize) -> usize {
    while !input.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub start: Position,
    pub end: Position,
}

impl Location {
    fn new(input: &str, start: usize, end: usize) -> Self {
        Location {
            start: Position::at(input, start),
            end: Position::at(input, end.max(start)),
        }
    }

    /// Covers the character at `offset`, or is empty at end of input
    fn at_char(input: &str, offset: usize) -> Self {
        let width = input
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8);
        Location::new(input, offset, offset + width)
    }

    fn source_span(&self, input_len: usize) -> SourceSpan {
        let start = self.start.offset;
        let width = self.end.offset - start;
        // miette needs a non-zero width to draw the arrow
        if width > 0 {
            (start, width).into()
        } else if start >= input_len && start > 0 {
            (start - 1, 1).into()
        } else {
            (start, 0).into()
        }
    }
}

// ============================================================================
// Expectations
// ============================================================================

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpectedKind {
    Literal,
    Class,
    Any,
    End,
    Other,
}

/// One grammar alternative that was viable where parsing stopped
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expected {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: ExpectedKind,
    pub description: String,
    pub parts: Vec<String>,
    pub inverted: bool,
    pub ignore_case: bool,
}

impl Expected {
    fn new(kind: ExpectedKind, description: &str) -> Self {
        Expected {
            kind,
            description: description.to_string(),
            parts: Vec::new(),
            inverted: false,
            ignore_case: false,
        }
    }

    fn literal(text: &str) -> Self {
        Expected {
            parts: vec![text.to_string()],
            ..Expected::new(ExpectedKind::Literal, &format!("\"{}\"", text))
        }
    }

    fn class(description: &str, parts: &[&str]) -> Self {
        Expected {
            parts: parts.iter().map(|part| part.to_string()).collect(),
            ..Expected::new(ExpectedKind::Class, description)
        }
    }

    fn ignoring_case(self) -> Self {
        Expected {
            ignore_case: true,
            ..self
        }
    }

    fn inverted(self, inverted: bool) -> Self {
        Expected { inverted, ..self }
    }
}

/// User-facing description of a grammar rule
pub(crate) fn rule_expectation(rule: Rule) -> Expected {
    use ExpectedKind::*;

    match rule {
        Rule::EOI => Expected::new(End, "end of input"),
        Rule::comma => Expected::literal(","),
        Rule::universal => Expected::literal("*"),
        Rule::paren_close => Expected::literal(")"),
        Rule::bracket_close => Expected::literal("]"),
        Rule::combinator | Rule::descendant => Expected::new(Other, "combinator"),
        Rule::combinator_symbol => Expected::class("combinator", &[">", "+", "~", "||"]),
        Rule::selectors | Rule::selector_list | Rule::complex_selector | Rule::compound_selector => {
            Expected::new(Other, "selector")
        }
        Rule::type_selector => Expected::new(Other, "type selector"),
        Rule::id_selector => Expected::new(Other, "id selector"),
        Rule::class_selector => Expected::new(Other, "class selector"),
        Rule::attribute_selector => Expected::new(Other, "attribute selector"),
        Rule::attribute_matcher => {
            Expected::class("attribute matcher", &["~=", "|=", "^=", "$=", "*=", "="])
        }
        Rule::attribute_modifier => {
            Expected::class("attribute modifier", &["i", "s"]).ignoring_case()
        }
        Rule::pseudo_class => Expected::new(Other, "pseudo-class"),
        Rule::pseudo_element => Expected::new(Other, "pseudo-element"),
        Rule::nth_name => Expected::new(Other, "nth pseudo-class name").ignoring_case(),
        Rule::nth_arguments | Rule::nth_value => Expected::new(Other, "An+B expression"),
        Rule::arguments | Rule::argument | Rule::arg_group => Expected::new(Other, "argument"),
        Rule::arg_space => Expected::new(Class, "whitespace"),
        Rule::arg_delim => Expected::new(Any, "any character"),
        Rule::ident => Expected::new(Other, "identifier"),
        Rule::string => Expected::new(Other, "string"),
        Rule::number => Expected::new(Other, "number"),
        Rule::text => Expected::new(Other, "text"),
        other => Expected::new(Other, &format!("{:?}", other).replace('_', " ")),
    }
}

// ============================================================================
// Syntax errors
// ============================================================================

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// Character sequence no rule accepts
    UnexpectedInput,
    UnterminatedString,
    InvalidEscape,
    UnmatchedBracket,
    /// Simple selector after a pseudo-element in the same compound
    PseudoElementNotLast,
    /// Combinator, comma or end of a list with no selector where one is required
    EmptyCompound,
    NestingTooDeep,
    /// An+B integer outside the `i32` range
    NumberOutOfRange,
}

impl SyntaxErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            SyntaxErrorKind::UnexpectedInput => "unexpected_input",
            SyntaxErrorKind::UnterminatedString => "unterminated_string",
            SyntaxErrorKind::InvalidEscape => "invalid_escape",
            SyntaxErrorKind::UnmatchedBracket => "unmatched_bracket",
            SyntaxErrorKind::PseudoElementNotLast => "pseudo_element_not_last",
            SyntaxErrorKind::EmptyCompound => "empty_compound",
            SyntaxErrorKind::NestingTooDeep => "nesting_too_deep",
            SyntaxErrorKind::NumberOutOfRange => "number_out_of_range",
        }
    }

    fn headline(&self) -> &'static str {
        match self {
            SyntaxErrorKind::UnexpectedInput => "unexpected input",
            SyntaxErrorKind::UnterminatedString => "unterminated string",
            SyntaxErrorKind::InvalidEscape => "invalid escape sequence",
            SyntaxErrorKind::UnmatchedBracket => "unmatched bracket",
            SyntaxErrorKind::PseudoElementNotLast => "pseudo-element is not last",
            SyntaxErrorKind::EmptyCompound => "missing selector",
            SyntaxErrorKind::NestingTooDeep => "nesting too deep",
            SyntaxErrorKind::NumberOutOfRange => "number out of range",
        }
    }

    fn default_help(&self) -> Option<&'static str> {
        match self {
            SyntaxErrorKind::UnterminatedString => {
                Some("Close the string with a matching quote before the end of the line")
            }
            SyntaxErrorKind::InvalidEscape => {
                Some("A backslash must be followed by a character other than a newline")
            }
            SyntaxErrorKind::UnmatchedBracket => {
                Some("Check that every '(' and '[' has a matching ')' and ']'")
            }
            SyntaxErrorKind::PseudoElementNotLast => {
                Some("A pseudo-element such as ::before must end its compound selector")
            }
            SyntaxErrorKind::EmptyCompound => {
                Some("Combinators and commas must be followed by a selector, like: a > b")
            }
            SyntaxErrorKind::NestingTooDeep => {
                Some("Reduce the number of nested parentheses and brackets")
            }
            SyntaxErrorKind::NumberOutOfRange => {
                Some("An+B coefficients must fit in a 32-bit signed integer")
            }
            SyntaxErrorKind::UnexpectedInput => None,
        }
    }
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.headline())
    }
}

/// The single error produced by a failed parse.
///
/// Carries the source text and a labelled span, so it renders through
/// `miette::Report` without extra context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub expected: Vec<Expected>,
    /// Excerpt at the failure position, `None` at end of input
    pub found: Option<String>,
    pub location: Location,
    src: String,
    span: SourceSpan,
    label: String,
    help: Option<String>,
}

impl SyntaxError {
    /// Build the error for a grammar mismatch, classifying it with the
    /// bracket pre-scan of the same input
    pub fn from_pest(err: &pest::error::Error<Rule>, input: &str, brackets: &BracketReport) -> Self {
        SyntaxError::from_pest_at(err, input, 0, brackets)
    }

    /// Same as [`SyntaxError::from_pest`] for a parse of the slice of `input`
    /// starting at byte `base`
    pub(crate) fn from_pest_at(
        err: &pest::error::Error<Rule>,
        input: &str,
        base: usize,
        brackets: &BracketReport,
    ) -> Self {
        let offset = base
            + match err.location {
                InputLocation::Pos(pos) => pos,
                InputLocation::Span((start, _)) => start,
            };

        let (positives, negatives) = match &err.variant {
            ErrorVariant::ParsingError {
                positives,
                negatives,
            } => (positives.as_slice(), negatives.as_slice()),
            ErrorVariant::CustomError { .. } => (&[][..], &[][..]),
        };

        let mut expected = positives
            .iter()
            .map(|rule| rule_expectation(*rule))
            .chain(negatives.iter().map(|rule| rule_expectation(*rule).inverted(true)))
            .sorted_by(|a, b| (&a.description, a.inverted).cmp(&(&b.description, b.inverted)))
            .collect::<Vec<_>>();
        expected.dedup_by(|a, b| a.description == b.description && a.inverted == b.inverted);

        let found = input
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .map(String::from);
        let kind = classify(input, offset, found.as_deref(), positives, brackets);
        let location = Location::at_char(input, offset);

        let message = match kind {
            SyntaxErrorKind::UnexpectedInput => describe(&expected, found.as_deref()),
            _ => format!("{}: {}", kind, describe(&expected, found.as_deref())),
        };
        let label = match kind {
            SyntaxErrorKind::UnexpectedInput => format!("expected {}", describe_expected(&expected)),
            _ => kind.to_string(),
        };
        let help = kind
            .default_help()
            .map(str::to_string)
            .or_else(|| help_for_expected(positives, found.is_none()));

        SyntaxError {
            kind,
            message,
            expected,
            found,
            location,
            span: location.source_span(input.len()),
            src: input.to_string(),
            label,
            help,
        }
    }

    /// Error covering `start..end`, raised after the grammar accepted the input
    pub(crate) fn at_span(
        input: &str,
        kind: SyntaxErrorKind,
        start: usize,
        end: usize,
        message: String,
        expected: Vec<Expected>,
    ) -> Self {
        let location = Location::new(input, start, end);
        let found = input.get(start..location.end.offset).and_then(|excerpt| {
            if excerpt.is_empty() {
                None
            } else {
                Some(excerpt.to_string())
            }
        });
        SyntaxError {
            kind,
            message,
            expected,
            found,
            location,
            span: location.source_span(input.len()),
            src: input.to_string(),
            label: kind.to_string(),
            help: kind.default_help().map(str::to_string),
        }
    }

    pub(crate) fn nesting_too_deep(input: &str, offset: usize, max_depth: usize) -> Self {
        let location = Location::at_char(input, offset);
        SyntaxError::at_span(
            input,
            SyntaxErrorKind::NestingTooDeep,
            offset,
            location.end.offset,
            format!(
                "nesting too deep: more than {} nested brackets at offset {}",
                max_depth, offset
            ),
            Vec::new(),
        )
    }

    /// Scanner failure at `base + err.offset()` while decoding a token the
    /// grammar already matched
    pub(crate) fn from_scan(input: &str, err: &ScanError, base: usize) -> Self {
        let offset = base + err.offset();
        let kind = match err {
            ScanError::InvalidEscape { .. } => SyntaxErrorKind::InvalidEscape,
            ScanError::UnterminatedString { .. } => SyntaxErrorKind::UnterminatedString,
            ScanError::NumberOutOfRange { .. } => SyntaxErrorKind::NumberOutOfRange,
            ScanError::NestingTooDeep { offset, max_depth } => {
                return SyntaxError::nesting_too_deep(input, *offset, *max_depth)
            }
            ScanError::ExpectedIdentifier { .. } | ScanError::InvalidNth { .. } => {
                SyntaxErrorKind::UnexpectedInput
            }
        };
        let location = Location::at_char(input, offset);
        SyntaxError::at_span(
            input,
            kind,
            offset,
            location.end.offset,
            format!("{} at offset {}", err, offset),
            Vec::new(),
        )
    }

    /// Grammar and assembler disagree about the shape of a match
    pub(crate) fn internal(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let location = Location::at_char(input, offset);
        let mut err = SyntaxError::at_span(
            input,
            SyntaxErrorKind::UnexpectedInput,
            offset,
            location.end.offset,
            message.into(),
            Vec::new(),
        );
        err.help = Some("internal parser error, please report the selector".to_string());
        err
    }

    pub fn source_text(&self) -> &str {
        &self.src
    }

    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

impl Diagnostic for SyntaxError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(format!("css_selector::{}", self.kind.code())))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        Some(&self.src)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::new_with_span(
            Some(self.label.clone()),
            self.span,
        ))))
    }
}

fn classify(
    input: &str,
    offset: usize,
    found: Option<&str>,
    positives: &[Rule],
    brackets: &BracketReport,
) -> SyntaxErrorKind {
    match found {
        Some("\"" | "'") if scanner::read_string(input, offset).is_err() => {
            SyntaxErrorKind::UnterminatedString
        }
        Some("\\") if !scanner::is_valid_escape(input, offset) => SyntaxErrorKind::InvalidEscape,
        Some(")" | "]") if brackets.is_stray(offset) => SyntaxErrorKind::UnmatchedBracket,
        None if !brackets.unclosed.is_empty() => SyntaxErrorKind::UnmatchedBracket,
        _ if expects_compound(positives) && ends_compound(input, offset) => {
            SyntaxErrorKind::EmptyCompound
        }
        _ => SyntaxErrorKind::UnexpectedInput,
    }
}

fn expects_compound(positives: &[Rule]) -> bool {
    positives.iter().any(|rule| {
        matches!(
            rule,
            Rule::selector_list
                | Rule::complex_selector
                | Rule::compound_selector
                | Rule::type_selector
                | Rule::id_selector
                | Rule::class_selector
                | Rule::attribute_selector
                | Rule::pseudo_class
                | Rule::pseudo_element
        )
    })
}

/// Nothing but a separator or the end of input follows `offset`
fn ends_compound(input: &str, offset: usize) -> bool {
    let next = scanner::skip_whitespace_and_comments(input, offset);
    let rest = input.get(next..).unwrap_or_default();
    match rest.chars().next() {
        None | Some(',' | '>' | '+' | '~' | ')') => true,
        // a lone `|` is not a combinator
        Some('|') => rest.starts_with("||"),
        Some(_) => false,
    }
}

fn help_for_expected(positives: &[Rule], found_eoi: bool) -> Option<String> {
    if positives.contains(&Rule::nth_value) {
        return Some("Use an An+B expression such as 2n+1, odd, even or 3".to_string());
    }
    if positives.contains(&Rule::attribute_matcher) || positives.contains(&Rule::bracket_close) {
        return Some("Attribute selectors look like [name], [name=value] or [name^='value' i]".to_string());
    }
    if positives.contains(&Rule::ident) && !found_eoi {
        return Some("Names must start with a letter, '_', '-' or an escape".to_string());
    }
    None
}

fn describe_expected(expected: &[Expected]) -> String {
    let descriptions = expected
        .iter()
        .map(|expected| {
            if expected.inverted {
                format!("not {}", expected.description)
            } else {
                expected.description.clone()
            }
        })
        .collect::<Vec<_>>();

    match descriptions.as_slice() {
        [] => "valid input".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{} or {}", first, second),
        [init @ .., last] => format!("{}, or {}", init.iter().join(", "), last),
    }
}

fn describe_found(found: Option<&str>) -> String {
    match found {
        Some(text) => format!("\"{}\"", text.escape_debug()),
        None => "end of input".to_string(),
    }
}

fn describe(expected: &[Expected], found: Option<&str>) -> String {
    format!(
        "expected {} but {} found",
        describe_expected(expected),
        describe_found(found)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_counts_lines_and_characters() {
        let input = "a,\n  é b";
        assert_eq!(
            Position::at(input, 0),
            Position {
                offset: 0,
                line: 1,
                column: 1
            }
        );
        let b = input.find('b').unwrap();
        assert_eq!(
            Position::at(input, b),
            Position {
                offset: b,
                line: 2,
                column: 5
            }
        );
    }

    #[test]
    fn test_expected_list_wording() {
        let one = vec![Expected::literal(")")];
        let two = vec![Expected::literal(")"), Expected::new(ExpectedKind::End, "end of input")];
        let three = vec![
            Expected::literal(","),
            Expected::new(ExpectedKind::Other, "combinator"),
            Expected::new(ExpectedKind::End, "end of input"),
        ];

        assert_eq!(describe_expected(&one), "\")\"");
        assert_eq!(describe_expected(&two), "\")\" or end of input");
        assert_eq!(
            describe_expected(&three),
            "\",\", combinator, or end of input"
        );
        assert_eq!(describe(&one, None), "expected \")\" but end of input found");
        assert_eq!(describe(&one, Some("\n")), "expected \")\" but \"\\n\" found");
    }

    #[test]
    fn test_zero_width_span_points_at_last_char() {
        let input = "a >";
        let location = Location::at_char(input, 3);
        assert_eq!(location.start, location.end);
        assert_eq!(location.source_span(input.len()), SourceSpan::from((2, 1)));
    }
}
