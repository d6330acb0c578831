//! Right-to-left selector matching.

use crate::{
    Combinator, ComplexSelector, CompoundSelector, ElementAdapter, SelectorList, SimpleSelector,
};

/// True if any selector in the list matches `element`.
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector| matches_complex(adapter, element, selector))
}

/// Match a complex selector against an element.
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    matches_at(adapter, element, sel, sel.rest.len())
}

/// Match compound `index` at `element`, then walk left through the combinators.
/// Descendant and general-sibling combinators backtrack over every candidate.
fn matches_at<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
    index: usize,
) -> bool {
    let Some(compound) = sel.compound(index) else {
        return false;
    };
    if !matches_compound(adapter, element, compound) {
        return false;
    }
    let Some(left) = index.checked_sub(1) else {
        return true;
    };
    let Some(&(combinator, _)) = sel.rest.get(left) else {
        return false;
    };
    match combinator {
        Combinator::Child => adapter
            .parent(element)
            .is_some_and(|parent| matches_at(adapter, parent, sel, left)),
        Combinator::AdjacentSibling => adapter
            .previous_sibling_element(element)
            .is_some_and(|sibling| matches_at(adapter, sibling, sel, left)),
        Combinator::Descendant => {
            let mut candidate = adapter.parent(element);
            while let Some(ancestor) = candidate {
                if matches_at(adapter, ancestor, sel, left) {
                    return true;
                }
                candidate = adapter.parent(ancestor);
            }
            false
        }
        Combinator::GeneralSibling => {
            let mut candidate = adapter.previous_sibling_element(element);
            while let Some(sibling) = candidate {
                if matches_at(adapter, sibling, sel, left) {
                    return true;
                }
                candidate = adapter.previous_sibling_element(sibling);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound.simples.iter().all(|simple| match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(tag) => adapter.tag_name(element).eq_ignore_ascii_case(tag),
        SimpleSelector::Class(class) => adapter.has_class(element, class),
        SimpleSelector::IdSelector(id) => adapter.element_id(element) == Some(id.as_str()),
        SimpleSelector::AttrExists { name } => adapter.attr(element, name).is_some(),
        SimpleSelector::AttrEquals { name, value } => {
            adapter.attr(element, name) == Some(value.as_str())
        }
    })
}
