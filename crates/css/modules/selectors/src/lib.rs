//! Selector parsing and element matching for widget ownership queries.
//!
//! Supported grammar:
//! - Type, universal, class, id, `[attr]` and `[attr=value]` selectors
//! - Combinators: descendant, child, adjacent sibling, general sibling
//! - Comma-separated selector groups
//!
//! Unsupported syntax (pseudo-classes, namespaces, attribute operators other than
//! `=`) is rejected at parse time instead of being silently ignored.

mod matcher;
mod parser;

use core::fmt;

pub use matcher::{matches_complex, matches_compound, matches_selector_list};
pub use parser::{parse_complex_selector, parse_selector_list};

/// Read-only view over a DOM used during selector matching.
/// Implement this for your DOM layer.
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// Parent element if any. The document node is not an element.
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling element, skipping text and comment nodes.
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name in ASCII lowercase.
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Returns the attribute value if present.
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// Returns the id attribute, if any.
    fn element_id(&self, element: Self::Handle) -> Option<&str> {
        self.attr(element, "id")
    }

    /// True if the whitespace-separated class list contains `class`.
    fn has_class(&self, element: Self::Handle, class: &str) -> bool {
        self.attr(element, "class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|token| token == class))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// `div`, stored lowercase.
    Type(String),
    /// `.name`
    Class(String),
    /// `#name`
    IdSelector(String),
    /// `[name]`
    AttrExists { name: String },
    /// `[name=value]`
    AttrEquals { name: String, value: String },
    /// `*`
    Universal,
}

/// A sequence of simple selectors with no combinator between them.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// One or more compounds separated by combinators, stored left to right.
/// `rest[i].0` is the combinator that joins compound `i` to `rest[i].1`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// Compound at `index`, where `0` is `first`.
    pub(crate) fn compound(&self, index: usize) -> Option<&CompoundSelector> {
        match index.checked_sub(1) {
            None => Some(&self.first),
            Some(rest_index) => self.rest.get(rest_index).map(|pair| &pair.1),
        }
    }
}

/// A comma-separated group of selectors. Matches if any member matches.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

/// Rejected selector text, with the byte offset where parsing stopped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorError {
    pub offset: usize,
    pub reason: String,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "invalid selector at byte {}: {}", self.offset, self.reason)
    }
}

impl core::error::Error for SelectorError {}
