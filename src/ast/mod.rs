//! Typed selector AST
//!
//! Every node is an immutable value built once by the parser:
//! - `selectors` holds the list/complex/compound structure and the simple
//!   selectors that carry only a name
//! - `values` holds attribute selectors and pseudo parameters
//! - `nth` holds the decoded An+B value of structural pseudo-classes

mod nth;
pub(crate) use nth::is_nth_pseudo_class;
pub use nth::Nth;

mod selectors;
pub use selectors::{
    ClassSelector, Combinator, ComplexSelector, CompoundSelector, IdSelector, PseudoClassSelector,
    PseudoElementSelector, PseudoSelector, SelectorKind, SelectorList, SubclassSelector,
    TypeSelector,
};

mod values;
pub use values::{AnyValue, AttributeMatch, AttributeMatcher, AttributeModifier, AttributeSelector, AttributeValue};
