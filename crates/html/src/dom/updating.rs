use super::DOM;
use anyhow::{Error, anyhow};
use indextree::NodeId;
use log::debug;

impl DOM {
    /// Replace `node` (its full outer markup) with the nodes parsed from `html`.
    ///
    /// The markup is parsed in the context of the parent of the node being
    /// replaced, falling back to `body` when that parent is not an element.
    ///
    /// Returns `Ok(false)` when there is nothing left to replace; see `replace_with_nodes`.
    ///
    /// # Errors
    /// Fails if the markup cannot be parsed or `node` is the document itself.
    pub fn replace_with_html(&mut self, node: NodeId, html: &str) -> Result<bool, Error> {
        let context = self
            .live_targets(node)
            .first()
            .and_then(|target| self.parent(*target))
            .and_then(|parent| self.tag_name(parent))
            .unwrap_or("body")
            .to_owned();
        let replacements = self.parse_fragment(&context, html)?;
        self.replace_with_nodes(node, replacements)
    }

    /// Put `replacements` where `node` currently is and detach `node`.
    ///
    /// If `node` was already replaced, the nodes that took its place are replaced
    /// instead, so repeated writers resolve to last-write-wins. An empty text node
    /// stands in for an empty replacement so the position stays addressable.
    ///
    /// # Errors
    /// Fails if `node` is the document node.
    pub fn replace_with_nodes(
        &mut self,
        node: NodeId,
        mut replacements: Vec<NodeId>,
    ) -> Result<bool, Error> {
        if node == self.root {
            return Err(anyhow!("the document node cannot be replaced"));
        }
        let targets = self.live_targets(node);
        let Some(&first) = targets.first() else {
            debug!("replacement target {node:?} is no longer in the document");
            return Ok(false);
        };
        if replacements.is_empty() {
            replacements.push(self.create_text(String::new()));
        }
        for replacement in &replacements {
            self.insert_before(first, *replacement)?;
        }
        for target in &targets {
            target.detach(&mut self.dom);
            self.forwarded.insert(*target, replacements.clone());
        }
        self.forwarded.insert(node, replacements);
        Ok(true)
    }

    /// Connected nodes currently standing in for `node`.
    fn live_targets(&self, node: NodeId) -> Vec<NodeId> {
        if self.is_connected(node) {
            return vec![node];
        }
        self.forwarded
            .get(&node)
            .map(|next| {
                next.iter()
                    .flat_map(|forwarded| self.live_targets(*forwarded))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Replace all children of `node` with the nodes parsed from `html`.
    ///
    /// # Errors
    /// Fails if the markup cannot be parsed.
    pub fn set_inner_html(&mut self, node: NodeId, html: &str) -> Result<(), Error> {
        let context = self.tag_name(node).unwrap_or("body").to_owned();
        let children = self.parse_fragment(&context, html)?;
        self.clear_children(node);
        for child in children {
            self.append_child(node, child)?;
        }
        Ok(())
    }

    /// Replace all children of `node` with a single text node.
    ///
    /// # Errors
    /// Fails if `node` cannot hold children.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), Error> {
        self.clear_children(node);
        if text.is_empty() {
            return Ok(());
        }
        let text_node = self.create_text(text);
        self.append_child(node, text_node)
    }

    fn clear_children(&mut self, node: NodeId) {
        let children: Vec<NodeId> = self.children(node).collect();
        for child in children {
            child.detach(&mut self.dom);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::parse_document;

    #[test]
    fn replace_then_replace_again_forwards() {
        let mut dom = parse_document("<p><b class=\"x\">old</b></p>").unwrap();
        let target = dom.select(".x").unwrap()[0];

        assert!(dom.replace_with_html(target, "<i>first</i><i>pair</i>").unwrap());
        assert!(dom.replace_with_html(target, "<u>second</u>").unwrap());

        let body = dom.select("body").unwrap()[0];
        assert_eq!(dom.inner_html(body), "<p><u>second</u></p>");
    }

    #[test]
    fn empty_replacement_keeps_position() {
        let mut dom = parse_document("<p>a<span>b</span>c</p>").unwrap();
        let span = dom.select("span").unwrap()[0];

        assert!(dom.replace_with_html(span, "").unwrap());
        assert!(dom.replace_with_html(span, "<em>B</em>").unwrap());

        let paragraph = dom.select("p").unwrap()[0];
        assert_eq!(dom.inner_html(paragraph), "a<em>B</em>c");
    }

    #[test]
    fn table_cells_are_parsed_in_their_row() {
        let mut dom = parse_document(
            "<table><tbody><tr><td class=\"cell\">old</td><td>kept</td></tr></tbody></table>",
        )
        .unwrap();
        let cell = dom.select("td.cell").unwrap()[0];

        assert!(dom.replace_with_html(cell, "<td>new</td>").unwrap());

        let row = dom.select("tr").unwrap()[0];
        assert_eq!(dom.inner_html(row), "<td>new</td><td>kept</td>");
    }

    #[test]
    fn rows_and_options_keep_their_tags() {
        let mut dom = parse_document(
            "<table><tbody><tr id=\"r\"><td>a</td></tr></tbody></table>\
             <select><option id=\"o\">x</option></select>",
        )
        .unwrap();
        let row = dom.element_by_id("r").unwrap();
        let option = dom.element_by_id("o").unwrap();

        assert!(dom.replace_with_html(row, "<tr><td>b</td></tr><tr><td>c</td></tr>").unwrap());
        assert!(dom.replace_with_html(option, "<option>y</option><option>z</option>").unwrap());

        let body = dom.select("body").unwrap()[0];
        assert_eq!(
            dom.inner_html(body),
            "<table><tbody><tr><td>b</td></tr><tr><td>c</td></tr></tbody></table>\
             <select><option>y</option><option>z</option></select>"
        );
    }

    #[test]
    fn forwarded_replacement_uses_the_live_parent() {
        let mut dom = parse_document("<ul><li class=\"item\">a</li></ul>").unwrap();
        let item = dom.select(".item").unwrap()[0];

        assert!(dom.replace_with_html(item, "<li>b</li>").unwrap());
        assert!(dom.replace_with_html(item, "<li>c</li>").unwrap());

        let list = dom.select("ul").unwrap()[0];
        assert_eq!(dom.inner_html(list), "<li>c</li>");
    }

    #[test]
    fn detached_node_without_history_is_skipped() {
        let mut dom = parse_document("<div id=\"a\"></div>").unwrap();
        let div = dom.element_by_id("a").unwrap();
        assert!(dom.remove(div));
        assert!(!dom.replace_with_html(div, "<p>late</p>").unwrap());
        assert!(!dom.remove(div));
    }

    #[test]
    fn inner_html_and_text_content() {
        let mut dom = parse_document("<div id=\"box\"><span>gone</span></div>").unwrap();
        let div = dom.element_by_id("box").unwrap();

        dom.set_inner_html(div, "<b>bold</b> &amp; plain").unwrap();
        assert_eq!(dom.inner_html(div), "<b>bold</b> &amp; plain");
        assert_eq!(dom.text_content(div), "bold & plain");

        dom.set_text_content(div, "<raw>").unwrap();
        assert_eq!(dom.inner_html(div), "&lt;raw&gt;");
    }
}
