//! The page being composed, shared between concurrently running units.

use anyhow::{Error, anyhow};
use core::cell::RefCell;
use html::{DOM, NodeId, parse_document};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::rc::Rc;

/// Per-element scratch data filled by `pre_render` and read by the render strategy.
pub type DataRecord = Map<String, Value>;

/// Page metadata handed through to every hook untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageContext(Value);

impl PageContext {
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> &Value {
        &self.0
    }

    /// Top-level field of an object context.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Handle to the single DOM of one build.
///
/// Units run on one thread and interleave only at `.await` points, so every
/// access borrows the tree for the duration of one synchronous call. Calling back
/// into the handle from inside `with_dom`/`with_dom_mut` is reported as an error.
#[derive(Clone)]
pub struct Document {
    dom: Rc<RefCell<DOM>>,
}

impl Document {
    pub fn new(dom: DOM) -> Self {
        Self {
            dom: Rc::new(RefCell::new(dom)),
        }
    }

    /// Parse a complete HTML page.
    ///
    /// # Errors
    /// Returns the parser error.
    pub fn parse(html: &str) -> Result<Self, Error> {
        Ok(Self::new(parse_document(html)?))
    }

    /// Run `read` against the tree.
    ///
    /// # Errors
    /// Fails if the tree is currently borrowed mutably.
    pub fn with_dom<R>(&self, read: impl FnOnce(&DOM) -> R) -> Result<R, Error> {
        let dom = self
            .dom
            .try_borrow()
            .map_err(|_| anyhow!("document is being mutated"))?;
        Ok(read(&dom))
    }

    /// Run `write` against the tree.
    ///
    /// # Errors
    /// Fails if the tree is currently borrowed.
    pub fn with_dom_mut<R>(&self, write: impl FnOnce(&mut DOM) -> R) -> Result<R, Error> {
        let mut dom = self
            .dom
            .try_borrow_mut()
            .map_err(|_| anyhow!("document is already borrowed"))?;
        Ok(write(&mut dom))
    }

    /// First element matching `selector`.
    ///
    /// # Errors
    /// Fails on an invalid selector.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, Error> {
        Ok(self.query_selector_all(selector)?.first().copied())
    }

    /// Every element matching `selector`, in document order.
    ///
    /// # Errors
    /// Fails on an invalid selector.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, Error> {
        self.with_dom(|dom| dom.select(selector))?
    }

    pub fn element_by_id(&self, id: &str) -> Result<Option<NodeId>, Error> {
        self.with_dom(|dom| dom.element_by_id(id))
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Result<Option<String>, Error> {
        self.with_dom(|dom| dom.attribute(node, name).map(str::to_owned))
    }

    pub fn text_content(&self, node: NodeId) -> Result<String, Error> {
        self.with_dom(|dom| dom.text_content(node))
    }

    pub fn outer_html(&self, node: NodeId) -> Result<String, Error> {
        self.with_dom(|dom| dom.outer_html(node))
    }

    pub fn inner_html(&self, node: NodeId) -> Result<String, Error> {
        self.with_dom(|dom| dom.inner_html(node))
    }

    /// Replace the full outer markup of `node`. Returns whether anything was replaced.
    ///
    /// # Errors
    /// Fails if the markup cannot be parsed or the tree is borrowed.
    pub fn replace_with_html(&self, node: NodeId, html: &str) -> Result<bool, Error> {
        self.with_dom_mut(|dom| dom.replace_with_html(node, html))?
    }

    /// # Errors
    /// Fails if the markup cannot be parsed or the tree is borrowed.
    pub fn set_inner_html(&self, node: NodeId, html: &str) -> Result<(), Error> {
        self.with_dom_mut(|dom| dom.set_inner_html(node, html))?
    }

    /// # Errors
    /// Fails if the tree is borrowed.
    pub fn set_text_content(&self, node: NodeId, text: &str) -> Result<(), Error> {
        self.with_dom_mut(|dom| dom.set_text_content(node, text))?
    }

    /// # Errors
    /// Fails if `node` is not an element or the tree is borrowed.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), Error> {
        self.with_dom_mut(|dom| dom.set_attribute(node, name, value))?
    }

    /// Detach `node`; returns false if it was not attached.
    pub fn remove(&self, node: NodeId) -> Result<bool, Error> {
        self.with_dom_mut(|dom| dom.remove(node))
    }

    /// `<!DOCTYPE html>` plus the outer markup of the root element.
    ///
    /// # Errors
    /// Fails if the root `html` element was removed.
    pub fn to_document_string(&self) -> Result<String, Error> {
        self.with_dom(DOM::to_document_string)?
    }
}
