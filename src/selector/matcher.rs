//! Selector Matching
//!
//! Matches compiled selectors right-to-left against any `DocumentAccess`
//! implementation: the subject compound is tested first, then the
//! combinators are followed leftwards, backtracking over descendant and
//! sibling candidates.

use super::parser::{AttrOp, Combinator, ComplexSelector, Compound, PseudoClass, SimpleSelector};
use crate::dom::{DocumentAccess, ElementData, NodeData, NodeId};

/// Elements that can be disabled
const FORM_CONTROLS: &[&str] = &[
    "button", "fieldset", "input", "optgroup", "option", "select", "textarea",
];

/// Whether `id` matches a complex selector
pub fn matches_complex<D: DocumentAccess>(doc: &D, selector: &ComplexSelector, id: NodeId) -> bool {
    match selector.compounds.len() {
        0 => false,
        n => matches_from(doc, selector, n - 1, id),
    }
}

fn matches_from<D: DocumentAccess>(
    doc: &D,
    selector: &ComplexSelector,
    index: usize,
    id: NodeId,
) -> bool {
    if !matches_compound(doc, &selector.compounds[index], id) {
        return false;
    }
    if index == 0 {
        return true;
    }

    let next = index - 1;
    match selector.combinators[next] {
        Combinator::Child => {
            parent_element(doc, id).is_some_and(|parent| matches_from(doc, selector, next, parent))
        }
        Combinator::Descendant => {
            let mut cursor = parent_element(doc, id);
            while let Some(ancestor) = cursor {
                if matches_from(doc, selector, next, ancestor) {
                    return true;
                }
                cursor = parent_element(doc, ancestor);
            }
            false
        }
        Combinator::NextSibling => doc
            .prev_element_sibling(id)
            .is_some_and(|sibling| matches_from(doc, selector, next, sibling)),
        Combinator::SubsequentSibling => {
            let mut cursor = doc.prev_element_sibling(id);
            while let Some(sibling) = cursor {
                if matches_from(doc, selector, next, sibling) {
                    return true;
                }
                cursor = doc.prev_element_sibling(sibling);
            }
            false
        }
    }
}

#[inline]
fn parent_element<D: DocumentAccess>(doc: &D, id: NodeId) -> Option<NodeId> {
    doc.parent_of(id).filter(|&parent| doc.element(parent).is_some())
}

/// Whether `id` is an element matching every part of a compound
pub fn matches_compound<D: DocumentAccess>(doc: &D, compound: &Compound, id: NodeId) -> bool {
    let Some(element) = doc.element(id) else {
        return false;
    };
    if compound.tag.as_ref().is_some_and(|tag| *tag != element.tag) {
        return false;
    }
    compound
        .simple
        .iter()
        .all(|simple| matches_simple(doc, simple, id, element))
}

fn matches_simple<D: DocumentAccess>(
    doc: &D,
    simple: &SimpleSelector,
    id: NodeId,
    element: &ElementData,
) -> bool {
    match simple {
        SimpleSelector::Id(wanted) => element.attr("id") == Some(wanted.as_str()),
        SimpleSelector::Class(class) => element.has_class(class),
        SimpleSelector::Attribute { name, matcher } => match (element.attr(name), matcher) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(value), Some((op, wanted))) => matches_attribute(*op, value, wanted),
        },
        SimpleSelector::Pseudo(pseudo) => matches_pseudo(doc, *pseudo, id, element),
        SimpleSelector::Not(compounds) => compounds
            .iter()
            .all(|compound| !matches_compound(doc, compound, id)),
    }
}

fn matches_attribute(op: AttrOp, value: &str, wanted: &str) -> bool {
    match op {
        AttrOp::Equals => value == wanted,
        AttrOp::Includes => {
            !wanted.is_empty()
                && !wanted.contains(char::is_whitespace)
                && value.split_ascii_whitespace().any(|token| token == wanted)
        }
        AttrOp::DashMatch => {
            value == wanted
                || value
                    .strip_prefix(wanted)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Prefix => !wanted.is_empty() && value.starts_with(wanted),
        AttrOp::Suffix => !wanted.is_empty() && value.ends_with(wanted),
        AttrOp::Substring => !wanted.is_empty() && value.contains(wanted),
    }
}

fn matches_pseudo<D: DocumentAccess>(
    doc: &D,
    pseudo: PseudoClass,
    id: NodeId,
    element: &ElementData,
) -> bool {
    match pseudo {
        PseudoClass::Root => doc.parent_of(id) == Some(doc.document_node_id()),
        PseudoClass::FirstChild => doc.prev_element_sibling(id).is_none(),
        PseudoClass::LastChild => doc.next_element_sibling(id).is_none(),
        PseudoClass::OnlyChild => {
            doc.prev_element_sibling(id).is_none() && doc.next_element_sibling(id).is_none()
        }
        PseudoClass::Empty => doc.children_vec(id).into_iter().all(|child| {
            match doc.get_node(child).map(|node| &node.data) {
                Some(NodeData::Element(_)) => false,
                Some(NodeData::Text(text)) => text.is_empty(),
                _ => true,
            }
        }),
        PseudoClass::Checked => match element.tag.as_str() {
            "input" if matches!(element.attr("type"), Some("checkbox" | "radio")) => element
                .checked
                .unwrap_or_else(|| element.attr("checked").is_some()),
            "option" => element.attr("selected").is_some(),
            _ => false,
        },
        PseudoClass::Disabled => is_form_control(element) && element.attr("disabled").is_some(),
        PseudoClass::Enabled => is_form_control(element) && element.attr("disabled").is_none(),
    }
}

#[inline]
fn is_form_control(element: &ElementData) -> bool {
    FORM_CONTROLS.contains(&element.tag.as_str())
}
