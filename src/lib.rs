//! Parse CSS selector strings into a typed AST.
//!
//! ```
//! use css_selector_parser::{parse, Combinator};
//!
//! let list = parse("nav > a.active").unwrap();
//! let selector = &list.0[0];
//! assert_eq!(selector.tail[0].0, Combinator::Child);
//! ```
//!
//! A failed parse returns one [`SyntaxError`] describing what the grammar
//! expected at the farthest position it reached.

pub mod ast;
pub mod parser;

use std::{fmt, str::FromStr};

use slog::{debug, o, Discard, Logger};
use thiserror::Error;

pub use ast::*;
pub use parser::{Expected, ExpectedKind, Location, Position, SyntaxError, SyntaxErrorKind};

use parser::SelectorParser;

/// Bracket nesting allowed before a parse fails with `NestingTooDeep`
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Grammar entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StartRule {
    /// A comma-separated selector list (`start`)
    #[default]
    Selectors,
    /// A bare token sequence (`start_text`)
    Text,
}

impl StartRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            StartRule::Selectors => "start",
            StartRule::Text => "start_text",
        }
    }
}

impl fmt::Display for StartRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown start rule '{0}', expected 'start' or 'start_text'")]
pub struct UnknownStartRule(pub String);

impl FromStr for StartRule {
    type Err = UnknownStartRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(StartRule::Selectors),
            "start_text" => Ok(StartRule::Text),
            other => Err(UnknownStartRule(other.to_string())),
        }
    }
}

#[derive(Clone)]
pub struct ParseOptions {
    pub start_rule: StartRule,
    pub max_depth: usize,
    pub logger: Logger,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            start_rule: StartRule::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            logger: Logger::root(Discard, o!()),
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("start_rule", &self.start_rule)
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl ParseOptions {
    pub fn with_start_rule(mut self, start_rule: StartRule) -> Self {
        self.start_rule = start_rule;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }
}

/// Result of [`parse_with`], shaped by the start rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    Selectors(SelectorList),
    Text(AnyValue),
}

impl Parsed {
    pub fn into_selectors(self) -> Option<SelectorList> {
        match self {
            Parsed::Selectors(list) => Some(list),
            Parsed::Text(_) => None,
        }
    }

    pub fn into_text(self) -> Option<AnyValue> {
        match self {
            Parsed::Text(value) => Some(value),
            Parsed::Selectors(_) => None,
        }
    }
}

/// Parse a selector list with default options
pub fn parse(input: &str) -> Result<SelectorList, SyntaxError> {
    let options = ParseOptions::default();
    parse_selectors(input, &options)
}

/// Parse a bare text fragment, such as a pseudo-class argument, into a
/// token list
pub fn parse_text(input: &str) -> Result<AnyValue, SyntaxError> {
    let options = ParseOptions::default().with_start_rule(StartRule::Text);
    parse_fragment(input, &options)
}

pub fn parse_with(input: &str, options: &ParseOptions) -> Result<Parsed, SyntaxError> {
    match options.start_rule {
        StartRule::Selectors => parse_selectors(input, options).map(Parsed::Selectors),
        StartRule::Text => parse_fragment(input, options).map(Parsed::Text),
    }
}

fn parse_selectors(input: &str, options: &ParseOptions) -> Result<SelectorList, SyntaxError> {
    let logger = options.logger.new(o!("start_rule" => StartRule::Selectors.as_str()));
    debug!(logger, "parsing selectors"; "bytes" => input.len(), "max_depth" => options.max_depth);

    let result = SelectorParser::parse_selector_list(input, options.max_depth);
    match &result {
        Ok(list) => {
            debug!(logger, "parsed selectors"; "complex_selectors" => list.len());
        }
        Err(err) => log_failure(&logger, err),
    }
    result
}

fn parse_fragment(input: &str, options: &ParseOptions) -> Result<AnyValue, SyntaxError> {
    let logger = options.logger.new(o!("start_rule" => StartRule::Text.as_str()));
    debug!(logger, "parsing text"; "bytes" => input.len(), "max_depth" => options.max_depth);

    let result = SelectorParser::parse_text_fragment(input, options.max_depth);
    match &result {
        Ok(value) => {
            let tokens = value.as_list().map_or(0, <[AnyValue]>::len);
            debug!(logger, "parsed text"; "tokens" => tokens);
        }
        Err(err) => log_failure(&logger, err),
    }
    result
}

fn log_failure(logger: &Logger, err: &SyntaxError) {
    debug!(logger, "syntax error";
        "kind" => err.kind.code(),
        "offset" => err.location.start.offset,
        "line" => err.location.start.line,
        "column" => err.location.start.column
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_rule_names() {
        let cases = vec![("start", StartRule::Selectors), ("start_text", StartRule::Text)];
        for (name, rule) in cases {
            assert_eq!(name.parse::<StartRule>(), Ok(rule));
            assert_eq!(rule.as_str(), name);
        }
        assert_eq!(
            "selectors".parse::<StartRule>(),
            Err(UnknownStartRule("selectors".to_string()))
        );
    }

    #[test]
    fn test_parse_with_dispatches_on_start_rule() {
        let options = ParseOptions::default();
        assert!(matches!(parse_with("a", &options), Ok(Parsed::Selectors(_))));

        let options = options.with_start_rule(StartRule::Text);
        assert_eq!(
            parse_with("a b", &options).map(Parsed::into_text),
            Ok(Some(AnyValue::List(vec!["a".into(), " ".into(), "b".into()])))
        );
    }
}
