use core::fmt;

use super::{DOM, DOMNode, NodeKind};
use anyhow::{Error, anyhow};
use indextree::NodeId;

/// Elements that never have an end tag.
const VOID_ELEMENTS: [&str; 18] = [
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

/// Elements whose text children are written without escaping.
const RAW_TEXT_ELEMENTS: [&str; 8] = [
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

fn escape_into(out: &mut String, text: &str, attribute_mode: bool) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' if attribute_mode => out.push_str("&quot;"),
            '<' if !attribute_mode => out.push_str("&lt;"),
            '>' if !attribute_mode => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

impl DOM {
    fn serialize_node(&self, id: NodeId, out: &mut String) {
        let Some(DOMNode { kind, attrs }) = self.node(id) else {
            return;
        };
        match kind {
            NodeKind::Document => self.serialize_children(id, out),
            NodeKind::Element { tag } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs.iter() {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(out, value, true);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                self.serialize_children(id, out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            NodeKind::Text { text } => {
                let raw = self
                    .parent(id)
                    .and_then(|parent| self.tag_name(parent))
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                if raw {
                    out.push_str(text);
                } else {
                    escape_into(out, text, false);
                }
            }
            NodeKind::Comment { text } => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }

    fn serialize_children(&self, id: NodeId, out: &mut String) {
        for child in self.children(id) {
            self.serialize_node(child, out);
        }
    }

    /// Markup of `node` including its own tags.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize_node(node, &mut out);
        out
    }

    /// Markup of the children of `node`.
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize_children(node, &mut out);
        out
    }

    /// `<!DOCTYPE html>` followed by the outer markup of the root `html` element.
    ///
    /// # Errors
    /// Fails if the document has no root `html` element.
    pub fn to_document_string(&self) -> Result<String, Error> {
        let html = self
            .document_element()
            .ok_or_else(|| anyhow!("document has no root html element"))?;
        let mut out = String::from("<!DOCTYPE html>");
        self.serialize_node(html, &mut out);
        Ok(out)
    }
}

impl fmt::Debug for DOM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
            for _ in 0..depth {
                f.write_str("  ")?;
            }
            Ok(())
        }

        fn fmt_node(
            dom: &DOM,
            id: NodeId,
            f: &mut fmt::Formatter<'_>,
            depth: usize,
        ) -> fmt::Result {
            let Some(DOMNode { kind, attrs }) = dom.node(id) else {
                return Ok(());
            };
            write_indent(f, depth)?;
            match kind {
                NodeKind::Document => writeln!(f, "#document")?,
                NodeKind::Element { tag } => {
                    write!(f, "<{tag}")?;
                    for (name, value) in attrs.iter() {
                        write!(f, " {name}={value:?}")?;
                    }
                    writeln!(f, ">")?;
                }
                NodeKind::Text { text } => writeln!(f, "{text:?}")?,
                NodeKind::Comment { text } => writeln!(f, "<!--{text:?}-->")?,
            }
            for child in dom.children(id) {
                fmt_node(dom, child, f, depth + 1)?;
            }
            Ok(())
        }

        writeln!(f, "DOM")?;
        fmt_node(self, self.root, f, 0)
    }
}
