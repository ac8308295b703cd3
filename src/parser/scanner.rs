//! Lexical primitives shared by the grammar assembler and diagnostics
//!
//! Every function is a pure function of `(input, cursor)` returning a value
//! and the advanced cursor, or a [`ScanError`]. Cursors are byte offsets.

use thiserror::Error;

use crate::ast::Nth;

const REPLACEMENT_CHARACTER: char = '\u{FFFD}';
const MAX_HEX_DIGITS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    #[error("invalid escape sequence")]
    InvalidEscape { offset: usize },

    #[error("unterminated string")]
    UnterminatedString { offset: usize },

    #[error("expected identifier")]
    ExpectedIdentifier { offset: usize },

    #[error("invalid An+B expression")]
    InvalidNth { offset: usize },

    #[error("An+B value out of range")]
    NumberOutOfRange { offset: usize },

    #[error("nesting deeper than {max_depth} levels")]
    NestingTooDeep { offset: usize, max_depth: usize },
}

impl ScanError {
    pub fn offset(&self) -> usize {
        match self {
            ScanError::InvalidEscape { offset }
            | ScanError::UnterminatedString { offset }
            | ScanError::ExpectedIdentifier { offset }
            | ScanError::InvalidNth { offset }
            | ScanError::NumberOutOfRange { offset }
            | ScanError::NestingTooDeep { offset, .. } => *offset,
        }
    }
}

// ============================================================================
// Character classes
// ============================================================================

pub fn is_newline(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\x0C')
}

pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t') || is_newline(c)
}

/// ASCII letter, `_`, or any non-ASCII code point
pub fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

pub fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}

/// `\` not followed by a newline or end of input
pub fn is_valid_escape(input: &str, pos: usize) -> bool {
    peek(input, pos) == Some('\\') && peek(input, pos + 1).is_some_and(|c| !is_newline(c))
}

fn peek(input: &str, pos: usize) -> Option<char> {
    input.get(pos..)?.chars().next()
}

// ============================================================================
// Whitespace and comments
// ============================================================================

/// Advance past whitespace and complete `/* ... */` comments. An unterminated
/// comment is left in place.
pub fn skip_whitespace_and_comments(input: &str, pos: usize) -> usize {
    let mut cursor = pos;
    loop {
        match peek(input, cursor) {
            Some(c) if is_whitespace(c) => cursor += c.len_utf8(),
            Some('/') => match skip_comment(input, cursor) {
                Some(next) => cursor = next,
                None => return cursor,
            },
            _ => return cursor,
        }
    }
}

/// End of the comment starting at `pos`, `None` when there is no comment or
/// it never closes
fn skip_comment(input: &str, pos: usize) -> Option<usize> {
    let body = input.get(pos..)?.strip_prefix("/*")?;
    body.find("*/").map(|end| pos + 2 + end + 2)
}

// ============================================================================
// Escapes, identifiers, strings
// ============================================================================

/// Decode the escape whose backslash sits at `pos`.
///
/// Up to six hex digits name a code point and swallow one following
/// whitespace; zero, surrogates and values past U+10FFFF become U+FFFD.
/// Anything else but a newline stands for itself.
pub fn read_escape(input: &str, pos: usize) -> Result<(char, usize), ScanError> {
    let cursor = pos + 1;
    match peek(input, cursor) {
        None => Err(ScanError::InvalidEscape { offset: pos }),
        Some(c) if is_newline(c) => Err(ScanError::InvalidEscape { offset: pos }),
        Some(c) if c.is_ascii_hexdigit() => {
            let digits: String = input[cursor..]
                .chars()
                .take_while(char::is_ascii_hexdigit)
                .take(MAX_HEX_DIGITS)
                .collect();
            let mut next = cursor + digits.len();

            if input[next..].starts_with("\r\n") {
                next += 2;
            } else if let Some(ws) = peek(input, next).filter(|c| is_whitespace(*c)) {
                next += ws.len_utf8();
            }

            let decoded = u32::from_str_radix(&digits, 16)
                .ok()
                .filter(|code| *code != 0)
                .and_then(char::from_u32)
                .unwrap_or(REPLACEMENT_CHARACTER);
            Ok((decoded, next))
        }
        Some(c) => Ok((c, cursor + c.len_utf8())),
    }
}

/// Read an identifier starting at `pos`, resolving escapes
pub fn read_identifier(input: &str, pos: usize) -> Result<(String, usize), ScanError> {
    let mut value = String::new();
    let mut cursor = pos;

    if input[pos..].starts_with("--") {
        value.push_str("--");
        cursor += 2;
    } else {
        if peek(input, cursor) == Some('-') {
            value.push('-');
            cursor += 1;
        }
        match peek(input, cursor) {
            Some('\\') => {
                let (c, next) = read_escape(input, cursor)?;
                value.push(c);
                cursor = next;
            }
            Some(c) if is_ident_start(c) => {
                value.push(c);
                cursor += c.len_utf8();
            }
            _ => return Err(ScanError::ExpectedIdentifier { offset: pos }),
        }
    }

    loop {
        match peek(input, cursor) {
            Some('\\') => {
                let (c, next) = read_escape(input, cursor)?;
                value.push(c);
                cursor = next;
            }
            Some(c) if is_ident_char(c) => {
                value.push(c);
                cursor += c.len_utf8();
            }
            _ => return Ok((value, cursor)),
        }
    }
}

/// Decode a complete identifier token
pub fn decode_identifier(text: &str) -> Result<String, ScanError> {
    let (value, end) = read_identifier(text, 0)?;
    if end == text.len() {
        Ok(value)
    } else {
        Err(ScanError::ExpectedIdentifier { offset: end })
    }
}

/// Read a quoted string whose opening quote sits at `pos`. A backslash
/// before a newline continues the string onto the next line.
pub fn read_string(input: &str, pos: usize) -> Result<(String, usize), ScanError> {
    let unterminated = ScanError::UnterminatedString { offset: pos };
    let quote = match peek(input, pos) {
        Some(q @ ('"' | '\'')) => q,
        _ => return Err(unterminated),
    };

    let mut value = String::new();
    let mut cursor = pos + 1;
    loop {
        match peek(input, cursor) {
            None => return Err(unterminated),
            Some(c) if c == quote => return Ok((value, cursor + 1)),
            Some(c) if is_newline(c) => return Err(unterminated),
            Some('\\') => {
                if input[cursor + 1..].starts_with("\r\n") {
                    cursor += 3;
                    continue;
                }
                match peek(input, cursor + 1) {
                    None => return Err(unterminated),
                    Some(c) if is_newline(c) => cursor += 1 + c.len_utf8(),
                    Some(_) => {
                        let (c, next) = read_escape(input, cursor)?;
                        value.push(c);
                        cursor = next;
                    }
                }
            }
            Some(c) => {
                value.push(c);
                cursor += c.len_utf8();
            }
        }
    }
}

/// Decode a complete quoted string token
pub fn decode_string(text: &str) -> Result<String, ScanError> {
    read_string(text, 0).map(|(value, _)| value)
}

// ============================================================================
// An+B
// ============================================================================

/// Decode an An+B expression, `odd`/`even`, or a plain integer.
/// Whitespace is ignored and letters are matched case-insensitively.
pub fn read_nth(text: &str) -> Result<Nth, ScanError> {
    let compact = text
        .chars()
        .filter(|c| !is_whitespace(*c))
        .collect::<String>()
        .to_ascii_lowercase();

    match compact.as_str() {
        "odd" => Ok(Nth::ODD),
        "even" => Ok(Nth::EVEN),
        "" => Err(ScanError::InvalidNth { offset: 0 }),
        other => match other.find('n') {
            Some(n) => {
                let (coefficient, rest) = other.split_at(n);
                let offset = &rest[1..];
                let a = match coefficient {
                    "" | "+" => 1,
                    "-" => -1,
                    digits => parse_signed(digits)?,
                };
                let b = if offset.is_empty() {
                    0
                } else if offset.starts_with(&['+', '-'][..]) {
                    parse_signed(offset)?
                } else {
                    return Err(ScanError::InvalidNth { offset: 0 });
                };
                Ok(Nth::new(a, b))
            }
            None => parse_signed(other).map(|b| Nth::new(0, b)),
        },
    }
}

fn parse_signed(text: &str) -> Result<i32, ScanError> {
    let digits = text.strip_prefix(&['+', '-'][..]).unwrap_or(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScanError::InvalidNth { offset: 0 });
    }
    text.parse::<i32>()
        .map_err(|_| ScanError::NumberOutOfRange { offset: 0 })
}

// ============================================================================
// Bracket pre-scan
// ============================================================================

/// Brackets left open at end of input and closers with no matching opener
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BracketReport {
    pub unclosed: Vec<(usize, char)>,
    pub stray: Vec<(usize, char)>,
}

impl BracketReport {
    pub fn is_balanced(&self) -> bool {
        self.unclosed.is_empty() && self.stray.is_empty()
    }

    pub fn is_stray(&self, offset: usize) -> bool {
        self.stray.iter().any(|(at, _)| *at == offset)
    }
}

/// Walk `(`/`[` nesting outside strings, escapes and comments, failing as soon
/// as more than `max_depth` brackets are open. Scanning stops at an
/// unterminated string, which the grammar cannot get past either.
pub fn scan_brackets(input: &str, max_depth: usize) -> Result<BracketReport, ScanError> {
    let mut open: Vec<(usize, char)> = Vec::new();
    let mut report = BracketReport::default();
    let mut cursor = 0;

    while let Some(c) = peek(input, cursor) {
        match c {
            '\\' => {
                cursor += 1;
                if let Some(escaped) = peek(input, cursor) {
                    cursor += escaped.len_utf8();
                }
                continue;
            }
            '"' | '\'' => match read_string(input, cursor) {
                Ok((_, next)) => {
                    cursor = next;
                    continue;
                }
                Err(_) => break,
            },
            // an unclosed `/*` is plain delimiters to the grammar
            '/' => {
                if let Some(next) = skip_comment(input, cursor) {
                    cursor = next;
                    continue;
                }
            }
            '(' | '[' => {
                if open.len() >= max_depth {
                    return Err(ScanError::NestingTooDeep {
                        offset: cursor,
                        max_depth,
                    });
                }
                open.push((cursor, c));
            }
            ')' | ']' => {
                let opener = if c == ')' { '(' } else { '[' };
                match open.last() {
                    Some((_, o)) if *o == opener => {
                        open.pop();
                    }
                    _ => report.stray.push((cursor, c)),
                }
            }
            _ => {}
        }
        cursor += c.len_utf8();
    }

    report.unclosed = open;
    Ok(report)
}
