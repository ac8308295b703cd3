//! Decoded An+B arguments of structural pseudo-classes

/// Pseudo-classes whose argument follows the An+B micro-grammar
pub(crate) const NTH_PSEUDO_CLASSES: &[&str] = &[
    "nth-child",
    "nth-last-child",
    "nth-of-type",
    "nth-last-of-type",
    "nth-col",
    "nth-last-col",
];

pub(crate) fn is_nth_pseudo_class(name: &str) -> bool {
    NTH_PSEUDO_CLASSES
        .iter()
        .any(|nth| nth.eq_ignore_ascii_case(name))
}

/// `a` and `b` of `An+B`. `odd` is `2n+1`, `even` is `2n`, a bare integer
/// `B` is `0n+B`.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Nth {
    pub a: i32,
    pub b: i32,
}

impl Nth {
    pub const ODD: Nth = Nth { a: 2, b: 1 };
    pub const EVEN: Nth = Nth { a: 2, b: 0 };

    pub fn new(a: i32, b: i32) -> Self {
        Nth { a, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nth_names_are_case_insensitive() {
        assert!(is_nth_pseudo_class("nth-child"));
        assert!(is_nth_pseudo_class("NTH-Last-Of-Type"));
        assert!(!is_nth_pseudo_class("nth"));
        assert!(!is_nth_pseudo_class("first-child"));
    }
}
