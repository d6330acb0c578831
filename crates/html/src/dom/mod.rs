use anyhow::{Error, anyhow};
use indextree::{Arena, NodeId};
use smallvec::SmallVec;
use std::collections::HashMap;

mod printing;
mod query;
mod updating;

#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Document,
    Element { tag: String },
    Text { text: String },
    Comment { text: String },
}

#[derive(Debug, Clone, Default)]
pub struct DOMNode {
    pub kind: NodeKind,
    pub attrs: SmallVec<(String, String), 4>,
}

impl DOMNode {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            attrs: SmallVec::new(),
        }
    }
}

/// Arena-backed document tree.
///
/// Nodes are never freed during a build: removal detaches a subtree, so a stale
/// `NodeId` held by a widget stays valid and simply reports `is_connected() == false`.
pub struct DOM {
    dom: Arena<DOMNode>,
    root: NodeId,
    /// Nodes replaced by `replace_with_nodes`, mapped to the nodes that took their place.
    forwarded: HashMap<NodeId, Vec<NodeId>>,
}

impl Default for DOM {
    fn default() -> Self {
        Self::new()
    }
}

impl DOM {
    pub fn new() -> Self {
        let mut dom = Arena::new();
        Self {
            root: dom.new_node(DOMNode::default()),
            dom,
            forwarded: HashMap::new(),
        }
    }

    /// The document node.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&DOMNode> {
        self.dom.get(id).map(indextree::Node::get)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.dom.new_node(DOMNode::element(tag))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.dom.new_node(DOMNode {
            kind: NodeKind::Text { text: text.into() },
            attrs: SmallVec::new(),
        })
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.dom.new_node(DOMNode {
            kind: NodeKind::Comment { text: text.into() },
            attrs: SmallVec::new(),
        })
    }

    /// Append `child` as the last child of `parent`, detaching it from its old position.
    ///
    /// # Errors
    /// Fails if `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), Error> {
        child.detach(&mut self.dom);
        parent
            .checked_append(child, &mut self.dom)
            .map_err(|err| anyhow!("cannot append node: {err:?}"))
    }

    /// Insert `new_node` immediately before `reference`, which must have a parent.
    ///
    /// # Errors
    /// Fails if `reference` is detached or the insertion would create a cycle.
    pub fn insert_before(&mut self, reference: NodeId, new_node: NodeId) -> Result<(), Error> {
        if self.parent(reference).is_none() {
            return Err(anyhow!("cannot insert before a node without a parent"));
        }
        new_node.detach(&mut self.dom);
        reference
            .checked_insert_before(new_node, &mut self.dom)
            .map_err(|err| anyhow!("cannot insert node: {err:?}"))
    }

    /// Detach `node` and its subtree from the tree. Returns false if it had no parent.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if self.parent(node).is_none() {
            return false;
        }
        node.detach(&mut self.dom);
        true
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.dom.get(node).and_then(indextree::Node::parent)
    }

    pub fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        node.children(&self.dom)
    }

    /// True if `node` is reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        node.ancestors(&self.dom).last() == Some(self.root)
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(
            self.node(node).map(|data| &data.kind),
            Some(NodeKind::Element { .. })
        )
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)?
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set or overwrite an attribute on an element.
    ///
    /// # Errors
    /// Fails if `node` is not an element.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), Error> {
        let data = self
            .dom
            .get_mut(node)
            .map(indextree::Node::get_mut)
            .filter(|data| matches!(data.kind, NodeKind::Element { .. }))
            .ok_or_else(|| anyhow!("cannot set attribute `{name}` on a non-element node"))?;
        let name = name.to_ascii_lowercase();
        if let Some(slot) = data.attrs.iter_mut().find(|(key, _)| *key == name) {
            value.clone_into(&mut slot.1);
        } else {
            data.attrs.push((name, value.to_owned()));
        }
        Ok(())
    }

    /// All connected elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.root
            .descendants(&self.dom)
            .filter(|id| self.is_element(*id))
    }

    /// The root `html` element.
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root)
            .find(|id| self.tag_name(*id) == Some("html"))
    }

    /// First connected element whose `id` attribute equals `id`, in document order.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .find(|node| self.attribute(*node, "id") == Some(id))
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, node: NodeId) -> String {
        node.descendants(&self.dom)
            .filter_map(|id| match &self.node(id)?.kind {
                NodeKind::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
