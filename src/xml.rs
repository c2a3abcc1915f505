//! XML query capability over RPC replies.
//!
//! Fact collectors never touch an XML library directly. They work against the
//! [`XmlElement`] trait, which offers exactly the queries the normalizers need:
//!
//! - `select_all` for subtree search by relative tag path (`.//route-engine`)
//! - `ancestor_select` for `ancestor::item/child` lookups, in document order
//! - `find_child` for immediate-child lookup by tag
//! - `tag` / `text` accessors
//!
//! The crate ships an adapter for [`roxmltree::Node`]. Tag comparisons use the
//! local name, so the default namespaces Junos puts on reply elements
//! (`xmlns="http://xml.juniper.net/junos/.../junos-chassis"`) do not get in
//! the way.

use roxmltree::Node;

/// Read-only view of an XML element.
pub trait XmlElement: Sized + Clone {
    /// Local tag name, without namespace.
    fn tag(&self) -> &str;

    /// Text content preceding the first child element, if any.
    fn text(&self) -> Option<&str>;

    /// Immediate child elements, in document order.
    fn child_elements(&self) -> Vec<Self>;

    /// All descendant elements (excluding `self`), in document order.
    fn descendant_elements(&self) -> Vec<Self>;

    /// Ancestor elements, nearest first (excluding `self`).
    fn ancestor_elements(&self) -> Vec<Self>;

    /// First immediate child with the given tag.
    fn find_child(&self, tag: &str) -> Option<Self> {
        self.child_elements().into_iter().find(|c| c.tag() == tag)
    }

    /// Select elements by a `/`-separated relative path.
    ///
    /// The first segment matches any descendant, each following segment an
    /// immediate child of the previous match. `"route-engine"` behaves like
    /// XPath `.//route-engine`.
    fn select_all(&self, path: &str) -> Vec<Self> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let Some(first) = segments.next() else {
            return Vec::new();
        };

        let mut matches: Vec<Self> = self
            .descendant_elements()
            .into_iter()
            .filter(|e| e.tag() == first)
            .collect();

        for segment in segments {
            matches = matches
                .iter()
                .flat_map(|m| m.child_elements())
                .filter(|c| c.tag() == segment)
                .collect();
        }

        matches
    }

    /// Equivalent of XPath `ancestor::<ancestor>/<child>`.
    ///
    /// Results are in document order, so when matching ancestors nest the
    /// outermost one's children come first.
    fn ancestor_select(&self, ancestor: &str, child: &str) -> Vec<Self> {
        self.ancestor_elements()
            .into_iter()
            .rev()
            .filter(|a| a.tag() == ancestor)
            .flat_map(|a| a.child_elements())
            .filter(|c| c.tag() == child)
            .collect()
    }
}

impl<'a, 'input: 'a> XmlElement for Node<'a, 'input> {
    fn tag(&self) -> &str {
        self.tag_name().name()
    }

    fn text(&self) -> Option<&str> {
        Node::text(self)
    }

    fn child_elements(&self) -> Vec<Self> {
        self.children().filter(Node::is_element).collect()
    }

    fn descendant_elements(&self) -> Vec<Self> {
        // roxmltree yields the node itself first
        self.descendants()
            .skip(1)
            .filter(Node::is_element)
            .collect()
    }

    fn ancestor_elements(&self) -> Vec<Self> {
        self.ancestors().skip(1).filter(Node::is_element).collect()
    }
}

/// Render an element subtree as indented XML.
///
/// Two spaces per nesting level, one element per line, trailing newline.
/// Whitespace-only text is dropped and other text is trimmed. Used to show
/// device replies inside error messages.
pub fn pretty_print(node: Node<'_, '_>) -> String {
    let mut out = String::new();
    write_pretty(node, 0, &mut out);
    out
}

fn write_pretty(node: Node<'_, '_>, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    let name = node.tag_name().name();

    out.push_str(&indent);
    out.push('<');
    out.push_str(name);
    for attr in node.attributes() {
        out.push_str(&format!(" {}=\"{}\"", attr.name(), escape_xml(attr.value())));
    }

    let children: Vec<_> = node.children().filter(Node::is_element).collect();
    let text = node
        .children()
        .filter(Node::is_text)
        .filter_map(|t| t.text())
        .map(str::trim)
        .find(|t| !t.is_empty());

    match (children.is_empty(), text) {
        (true, None) => out.push_str("/>\n"),
        (true, Some(text)) => {
            out.push_str(&format!(">{}</{}>\n", escape_xml(text), name));
        }
        (false, text) => {
            out.push_str(">\n");
            if let Some(text) = text {
                out.push_str(&format!("{}  {}\n", indent, escape_xml(text)));
            }
            for child in children {
                write_pretty(child, depth + 1, out);
            }
            out.push_str(&format!("{}</{}>\n", indent, name));
        }
    }
}

/// Escape special XML characters in text content
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
