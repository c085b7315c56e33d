//! Thin helpers over the html5ever reference DOM

use std::cell::RefCell;
use std::rc::Rc;

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{Attribute, LocalName, Namespace, QualName, parse_document};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

const HTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

pub fn parse_html_document(content: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(content)
}

pub fn element_name(handle: &Handle) -> Option<&str> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn attr(handle: &Handle, name: &str) -> Option<String> {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attribute| &*attribute.name.local == name)
            .map(|attribute| attribute.value.to_string()),
        _ => None,
    }
}

pub fn has_attr(handle: &Handle, name: &str) -> bool {
    match &handle.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .any(|attribute| &*attribute.name.local == name),
        _ => false,
    }
}

pub fn has_class(handle: &Handle, class: &str) -> bool {
    attr(handle, "class")
        .is_some_and(|classes| classes.split_whitespace().any(|item| item == class))
}

/// Depth-first search for the first element named `name`.
pub fn find_element(root: &Handle, name: &str) -> Option<Handle> {
    for child in root.children.borrow().iter() {
        if element_name(child) == Some(name) {
            return Some(child.clone());
        }
        if let Some(found) = find_element(child, name) {
            return Some(found);
        }
    }
    None
}

/// Collects matching elements in document order. Matches are not descended into.
pub fn collect_elements<F>(root: &Handle, predicate: &F, out: &mut Vec<Handle>)
where
    F: Fn(&Handle) -> bool,
{
    for child in root.children.borrow().iter() {
        if element_name(child).is_some() && predicate(child) {
            out.push(child.clone());
            continue;
        }
        collect_elements(child, predicate, out);
    }
}

pub fn new_element(tag: &str, attributes: &[(&str, &str)]) -> Handle {
    let attrs = attributes
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, Namespace::from(""), LocalName::from(*name)),
            value: StrTendril::from_slice(value),
        })
        .collect();
    Node::new(NodeData::Element {
        name: QualName::new(None, Namespace::from(HTML_NAMESPACE), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take()?;
    let parent = weak.upgrade();
    node.parent.set(Some(weak));
    parent
}

/// Swaps `old` for `new` in its parent's child list. Returns false for detached nodes.
pub fn replace_node(old: &Handle, new: Handle) -> bool {
    let Some(parent) = parent_of(old) else {
        return false;
    };
    let mut children = parent.children.borrow_mut();
    let Some(position) = children.iter().position(|child| Rc::ptr_eq(child, old)) else {
        return false;
    };
    new.parent.set(Some(Rc::downgrade(&parent)));
    old.parent.set(None);
    children[position] = new;
    true
}

pub fn clear_children(handle: &Handle) {
    for child in handle.children.borrow_mut().drain(..) {
        child.parent.set(None);
    }
}

/// Equivalent of `innerHTML`.
pub fn serialize_children(handle: &Handle) -> String {
    let mut bytes = Vec::new();
    let serializable: SerializableHandle = handle.clone().into();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::ChildrenOnly(None),
        ..Default::default()
    };
    if let Err(err) = serialize(&mut bytes, &serializable, opts) {
        log::error!("failed to serialize html: {err}");
        return String::new();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Equivalent of `textContent`.
pub fn text_content(handle: &Handle) -> String {
    let mut out = String::new();
    push_text(handle, &mut out);
    out
}

fn push_text(handle: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &handle.data {
        out.push_str(&contents.borrow());
    }
    for child in handle.children.borrow().iter() {
        push_text(child, out);
    }
}
