use super::{DOM, NodeKind};
use anyhow::Error;
use css_selectors::{ElementAdapter, SelectorList, matches_selector_list, parse_selector_list};
use indextree::NodeId;

impl ElementAdapter for DOM {
    type Handle = NodeId;

    fn parent(&self, element: NodeId) -> Option<NodeId> {
        Self::parent(self, element).filter(|parent| self.is_element(*parent))
    }

    fn previous_sibling_element(&self, element: NodeId) -> Option<NodeId> {
        let mut current = self.dom.get(element)?.previous_sibling();
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.dom.get(sibling)?.previous_sibling();
        }
        None
    }

    fn tag_name(&self, element: NodeId) -> &str {
        match self.node(element).map(|data| &data.kind) {
            Some(NodeKind::Element { tag }) => tag.as_str(),
            _ => "",
        }
    }

    fn attr(&self, element: NodeId, name: &str) -> Option<&str> {
        self.attribute(element, name)
    }
}

impl DOM {
    /// Every connected element matching `list`, in document order, evaluated
    /// against the tree as it is now.
    pub fn query_selector_all(&self, list: &SelectorList) -> Vec<NodeId> {
        self.elements()
            .filter(|element| matches_selector_list(self, *element, list))
            .collect()
    }

    /// First connected element matching `list`.
    pub fn query_selector(&self, list: &SelectorList) -> Option<NodeId> {
        self.elements()
            .find(|element| matches_selector_list(self, *element, list))
    }

    /// Parse `selector` and run `query_selector_all`.
    ///
    /// # Errors
    /// Returns the selector parse error.
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>, Error> {
        let list = parse_selector_list(selector)?;
        Ok(self.query_selector_all(&list))
    }
}
