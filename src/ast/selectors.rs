//! Selector structure: lists, complex and compound selectors, combinators

use super::nth::{is_nth_pseudo_class, Nth};
use super::values::{AnyValue, AttributeSelector};
use crate::parser::scanner;

// ============================================================================
// Discriminant
// ============================================================================

/// Node discriminant, one per node type in the AST
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    Complex,
    Compound,
    Type,
    Id,
    Class,
    Attribute,
    PseudoClass,
    PseudoElement,
}

// ============================================================================
// Lists and chains
// ============================================================================

/// Comma-separated alternatives, in source order. Duplicates are kept.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ComplexSelector> {
        self.0.iter()
    }

    pub fn get(&self, index: usize) -> Option<&ComplexSelector> {
        self.0.get(index)
    }

    pub fn into_vec(self) -> Vec<ComplexSelector> {
        self.0
    }
}

impl IntoIterator for SelectorList {
    type Item = ComplexSelector;
    type IntoIter = std::vec::IntoIter<ComplexSelector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SelectorList {
    type Item = &'a ComplexSelector;
    type IntoIter = std::slice::Iter<'a, ComplexSelector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Relationship between two compound selectors
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Whitespace: `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
    /// `a || b`
    Column,
}

impl Combinator {
    /// Source symbol; the descendant combinator is a single space
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => ">",
            Combinator::NextSibling => "+",
            Combinator::SubsequentSibling => "~",
            Combinator::Column => "||",
        }
    }

    pub(crate) fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            ">" => Some(Combinator::Child),
            "+" => Some(Combinator::NextSibling),
            "~" => Some(Combinator::SubsequentSibling),
            "||" => Some(Combinator::Column),
            _ => None,
        }
    }
}

/// Left-to-right chain: `a > b ~ c` is head `a` with tail
/// `[(Child, b), (SubsequentSibling, c)]`
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub head: CompoundSelector,
    pub tail: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    pub fn kind(&self) -> SelectorKind {
        SelectorKind::Complex
    }

    /// All compound selectors of the chain, head first
    pub fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        std::iter::once(&self.head).chain(self.tail.iter().map(|(_, compound)| compound))
    }

    /// The rightmost compound, i.e. the element the selector represents
    pub fn subject(&self) -> &CompoundSelector {
        self.tail
            .last()
            .map(|(_, compound)| compound)
            .unwrap_or(&self.head)
    }

    pub fn combinators(&self) -> impl Iterator<Item = Combinator> + '_ {
        self.tail.iter().map(|(combinator, _)| *combinator)
    }
}

// ============================================================================
// Compound selectors
// ============================================================================

/// Simple selectors with no combinator between them.
///
/// Invariants upheld by the parser: at least one simple selector is present,
/// and `pseudos` holds at most one pseudo-element which is then its last item.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub type_selector: Option<TypeSelector>,
    pub subclasses: Vec<SubclassSelector>,
    /// Empty or a single [`PseudoSelector::Element`]. Pseudo-classes written
    /// before it are in `subclasses`, and any after it are a syntax error.
    pub pseudos: Vec<PseudoSelector>,
}

impl CompoundSelector {
    pub fn kind(&self) -> SelectorKind {
        SelectorKind::Compound
    }

    /// True when no type selector was written; the compound then matches any
    /// element type, like `*`
    pub fn is_implicitly_universal(&self) -> bool {
        self.type_selector.is_none()
    }

    pub fn pseudo_element(&self) -> Option<&PseudoElementSelector> {
        self.pseudos.iter().find_map(|pseudo| match pseudo {
            PseudoSelector::Element(element) => Some(element),
            PseudoSelector::Class(_) => None,
        })
    }
}

/// Tag name or `*`
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSelector {
    pub value: String,
}

impl TypeSelector {
    pub fn kind(&self) -> SelectorKind {
        SelectorKind::Type
    }

    pub fn is_universal(&self) -> bool {
        self.value == "*"
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdSelector {
    pub value: String,
}

impl IdSelector {
    pub fn kind(&self) -> SelectorKind {
        SelectorKind::Id
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassSelector {
    pub value: String,
}

impl ClassSelector {
    pub fn kind(&self) -> SelectorKind {
        SelectorKind::Class
    }
}

/// Selectors allowed between the type selector and the trailing pseudos
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubclassSelector {
    Id(IdSelector),
    Class(ClassSelector),
    Attribute(AttributeSelector),
    PseudoClass(PseudoClassSelector),
}

impl SubclassSelector {
    pub fn kind(&self) -> SelectorKind {
        match self {
            SubclassSelector::Id(_) => SelectorKind::Id,
            SubclassSelector::Class(_) => SelectorKind::Class,
            SubclassSelector::Attribute(_) => SelectorKind::Attribute,
            SubclassSelector::PseudoClass(_) => SelectorKind::PseudoClass,
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoSelector {
    /// Part of the output shape only. The parser never produces it, see
    /// [`CompoundSelector::pseudos`].
    Class(PseudoClassSelector),
    Element(PseudoElementSelector),
}

impl PseudoSelector {
    pub fn kind(&self) -> SelectorKind {
        match self {
            PseudoSelector::Class(_) => SelectorKind::PseudoClass,
            PseudoSelector::Element(_) => SelectorKind::PseudoElement,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PseudoSelector::Class(class) => &class.name,
            PseudoSelector::Element(element) => &element.name,
        }
    }
}

// ============================================================================
// Pseudo selectors
// ============================================================================

/// `:name` or `:name(parameter)`
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoClassSelector {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub parameter: Option<AnyValue>,
}

impl PseudoClassSelector {
    pub fn kind(&self) -> SelectorKind {
        SelectorKind::PseudoClass
    }

    /// Decoded An+B argument of the `nth-*` family, `None` for any other
    /// pseudo-class
    pub fn nth(&self) -> Option<Nth> {
        if !is_nth_pseudo_class(&self.name) {
            return None;
        }
        match &self.parameter {
            Some(AnyValue::Text(text)) => scanner::read_nth(text).ok(),
            _ => None,
        }
    }
}

/// `::name` or `::name(parameter)`
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoElementSelector {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub parameter: Option<AnyValue>,
}

impl PseudoElementSelector {
    pub fn kind(&self) -> SelectorKind {
        SelectorKind::PseudoElement
    }
}
