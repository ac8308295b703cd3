//! Attribute selectors and pseudo parameters

use super::selectors::SelectorKind;

/// `[name]` or `[name <matcher> value <modifier>?]`
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    pub name: String,
    /// Absent for presence tests
    #[cfg_attr(feature = "serde", serde(rename = "match", skip_serializing_if = "Option::is_none"))]
    pub value_match: Option<AttributeMatch>,
}

impl AttributeSelector {
    pub fn kind(&self) -> SelectorKind {
        SelectorKind::Attribute
    }

    pub fn is_presence_test(&self) -> bool {
        self.value_match.is_none()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    pub matcher: AttributeMatcher,
    pub value: AttributeValue,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub modifier: Option<AttributeModifier>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeMatcher {
    /// `=`
    #[cfg_attr(feature = "serde", serde(rename = "="))]
    Equals,
    /// `~=`
    #[cfg_attr(feature = "serde", serde(rename = "~="))]
    Includes,
    /// `|=`
    #[cfg_attr(feature = "serde", serde(rename = "|="))]
    DashMatch,
    /// `^=`
    #[cfg_attr(feature = "serde", serde(rename = "^="))]
    Prefix,
    /// `$=`
    #[cfg_attr(feature = "serde", serde(rename = "$="))]
    Suffix,
    /// `*=`
    #[cfg_attr(feature = "serde", serde(rename = "*="))]
    Substring,
}

impl AttributeMatcher {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeMatcher::Equals => "=",
            AttributeMatcher::Includes => "~=",
            AttributeMatcher::DashMatch => "|=",
            AttributeMatcher::Prefix => "^=",
            AttributeMatcher::Suffix => "$=",
            AttributeMatcher::Substring => "*=",
        }
    }

    pub(crate) fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(AttributeMatcher::Equals),
            "~=" => Some(AttributeMatcher::Includes),
            "|=" => Some(AttributeMatcher::DashMatch),
            "^=" => Some(AttributeMatcher::Prefix),
            "$=" => Some(AttributeMatcher::Suffix),
            "*=" => Some(AttributeMatcher::Substring),
            _ => None,
        }
    }
}

/// Attribute value with escapes decoded
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeValue {
    /// Written as a quoted string rather than an identifier
    #[cfg_attr(feature = "serde", serde(rename = "string"))]
    pub quoted: bool,
    pub value: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeModifier {
    /// `i`
    #[cfg_attr(feature = "serde", serde(rename = "i"))]
    CaseInsensitive,
    /// `s`
    #[cfg_attr(feature = "serde", serde(rename = "s"))]
    CaseSensitive,
}

impl AttributeModifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeModifier::CaseInsensitive => "i",
            AttributeModifier::CaseSensitive => "s",
        }
    }

    pub(crate) fn from_flag(flag: &str) -> Option<Self> {
        if flag.eq_ignore_ascii_case("i") {
            Some(AttributeModifier::CaseInsensitive)
        } else if flag.eq_ignore_ascii_case("s") {
            Some(AttributeModifier::CaseSensitive)
        } else {
            None
        }
    }
}

/// Shallow-structured pseudo parameter.
///
/// Generic arguments are a `List` of tokens kept as written; a nested
/// `(...)` or `[...]` group is a nested `List` bracketed by its delimiters,
/// and a run of whitespace is a single `" "` token.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnyValue {
    Text(String),
    List(Vec<AnyValue>),
}

impl AnyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnyValue::Text(text) => Some(text),
            AnyValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[AnyValue]> {
        match self {
            AnyValue::List(items) => Some(items),
            AnyValue::Text(_) => None,
        }
    }

    /// Nesting depth: 0 for text, 1 for a flat list
    pub fn depth(&self) -> usize {
        match self {
            AnyValue::Text(_) => 0,
            AnyValue::List(items) => 1 + items.iter().map(AnyValue::depth).max().unwrap_or(0),
        }
    }
}

impl From<&str> for AnyValue {
    fn from(text: &str) -> Self {
        AnyValue::Text(text.to_string())
    }
}
