//! HTML parsing into the arena DOM.

mod html5ever_engine;

use crate::dom::DOM;
use anyhow::{Error, anyhow};
use html5ever_engine::Html5everEngine;
use indextree::NodeId;
use log::debug;

/// Parse a complete HTML document.
///
/// # Errors
/// Fails if the input cannot be read or yields no root `html` element.
pub fn parse_document(html: &str) -> Result<DOM, Error> {
    let dom = html5ever_engine::parse_into_dom(html)?;
    debug!("parsed document with {} elements", dom.elements().count());
    Ok(dom)
}

impl DOM {
    /// Parse `html` as the content of a `context` element into new, detached
    /// nodes owned by this DOM.
    ///
    /// Returns the top-level nodes of the fragment in order. The context decides
    /// which tags survive tree construction: `<td>` is kept under `tr` and
    /// dropped under `body`.
    ///
    /// # Errors
    /// Fails if the fragment cannot be read.
    pub fn parse_fragment(&mut self, context: &str, html: &str) -> Result<Vec<NodeId>, Error> {
        let engine = Html5everEngine::parse_fragment(context, html)?;
        let fragment = engine
            .fragment_root()
            .ok_or_else(|| anyhow!("fragment parse produced no root"))?;
        let container = self.create_element(context);
        engine.convert_children(&fragment, self, container)?;
        let nodes: Vec<NodeId> = self.children(container).collect();
        for node in &nodes {
            self.remove(*node);
        }
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_structure_is_completed() {
        let dom = parse_document("<div class=\"greet\"></div>").unwrap();
        assert_eq!(
            dom.to_document_string().unwrap(),
            "<!DOCTYPE html><html><head></head><body><div class=\"greet\"></div></body></html>"
        );
    }

    #[test]
    fn fragments_stay_detached_until_inserted() {
        let mut dom = parse_document("<p></p>").unwrap();
        let nodes = dom
            .parse_fragment("body", "Hello <b>World</b><style>x{}</style>")
            .unwrap();
        assert_eq!(nodes.len(), 3);
        assert!(nodes.iter().all(|node| !dom.is_connected(*node)));
        assert_eq!(dom.tag_name(nodes[2]), Some("style"));
        assert_eq!(dom.outer_html(nodes[1]), "<b>World</b>");
    }

    #[test]
    fn fragment_context_decides_which_tags_survive() {
        let mut dom = parse_document("<p></p>").unwrap();
        let in_row = dom.parse_fragment("tr", "<td>cell</td>").unwrap();
        assert_eq!(dom.outer_html(in_row[0]), "<td>cell</td>");
        let in_body = dom.parse_fragment("body", "<td>cell</td>").unwrap();
        assert_eq!(dom.outer_html(in_body[0]), "cell");
        let in_select = dom.parse_fragment("select", "<option>a</option>").unwrap();
        assert_eq!(dom.tag_name(in_select[0]), Some("option"));
    }

    #[test]
    fn template_contents_are_kept() {
        let dom = parse_document("<template id=\"t\"><li>row</li></template>").unwrap();
        let template = dom.element_by_id("t").unwrap();
        assert_eq!(dom.inner_html(template), "<li>row</li>");
    }
}
