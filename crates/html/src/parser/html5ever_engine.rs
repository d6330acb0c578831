use crate::dom::DOM;
use anyhow::{Error, anyhow};
use html5ever::tendril::TendrilSink as _;
use html5ever::{LocalName, ParseOpts, QualName, ns, parse_document, parse_fragment};
use indextree::NodeId;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// HTML5 parser engine using html5ever's reference-counted sink.
///
/// The rcdom tree only lives for the duration of one parse; `convert_*` copies it
/// into the arena-backed `DOM`.
pub struct Html5everEngine {
    rcdom: RcDom,
}

impl Html5everEngine {
    /// Run the full HTML5 tree construction algorithm over `html`.
    ///
    /// # Errors
    /// Returns an error if the input stream cannot be read.
    pub fn parse(html: &str) -> Result<Self, Error> {
        let rcdom = parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;
        Ok(Self { rcdom })
    }

    /// The html5ever document node.
    pub fn document(&self) -> &Handle {
        &self.rcdom.document
    }

    /// Run the fragment parsing algorithm over `html` as if it were the content
    /// of a `context` element.
    ///
    /// # Errors
    /// Returns an error if the input stream cannot be read.
    pub fn parse_fragment(context: &str, html: &str) -> Result<Self, Error> {
        let context = QualName::new(None, ns!(html), LocalName::from(context));
        let rcdom = parse_fragment(
            RcDom::default(),
            ParseOpts::default(),
            context,
            Vec::new(),
            false,
        )
        .from_utf8()
        .read_from(&mut html.as_bytes())?;
        Ok(Self { rcdom })
    }

    /// The `html` element html5ever puts the parsed fragment under.
    pub fn fragment_root(&self) -> Option<Handle> {
        self.rcdom
            .document
            .children
            .borrow()
            .iter()
            .find(|child| matches!(child.data, NodeData::Element { .. }))
            .map(Handle::clone)
    }

    /// Copy the children of `handle` under `parent` in `dom`.
    ///
    /// # Errors
    /// Fails if a node cannot be attached.
    pub fn convert_children(
        &self,
        handle: &Handle,
        dom: &mut DOM,
        parent: NodeId,
    ) -> Result<(), Error> {
        for child in handle.children.borrow().iter() {
            self.convert_node(child, dom, parent)?;
        }
        Ok(())
    }

    fn convert_node(&self, handle: &Handle, dom: &mut DOM, parent: NodeId) -> Result<(), Error> {
        match &handle.data {
            NodeData::Document => self.convert_children(handle, dom, parent),
            // The serializer always emits its own doctype.
            NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => Ok(()),
            NodeData::Text { contents } => {
                let node = dom.create_text(contents.borrow().to_string());
                dom.append_child(parent, node)
            }
            NodeData::Comment { contents } => {
                let node = dom.create_comment(contents.to_string());
                dom.append_child(parent, node)
            }
            NodeData::Element {
                name,
                attrs,
                template_contents,
                ..
            } => {
                let node = dom.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    dom.set_attribute(node, &attr.name.local, &attr.value)?;
                }
                dom.append_child(parent, node)?;
                // `<template>` children live in a separate fragment in html5ever.
                if let Some(contents) = template_contents.borrow().as_ref() {
                    self.convert_children(contents, dom, node)?;
                }
                self.convert_children(handle, dom, node)
            }
        }
    }
}

/// Parse a full document into a fresh `DOM`.
///
/// # Errors
/// Fails if the input cannot be read or yields no root `html` element.
pub fn parse_into_dom(html: &str) -> Result<DOM, Error> {
    let engine = Html5everEngine::parse(html)?;
    let mut dom = DOM::new();
    let root = dom.root();
    engine.convert_children(engine.document(), &mut dom, root)?;
    if dom.document_element().is_none() {
        return Err(anyhow!("parsed document has no root html element"));
    }
    Ok(dom)
}
