//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena DOM.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};
use quell_dom::{Document, DomTree, ElementData, Node, NodeId};

/// HTML5 parser
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    /// Create a new HTML parser
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document
    pub fn parse(&self, html: &str) -> Document {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Document {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default()).one(html);

        let mut document = Document::empty(url);
        let root = document.tree().root();
        for child in dom.document.children.borrow().iter() {
            if let Some(id) = convert_node(child, document.tree_mut()) {
                attach(document.tree_mut(), root, id);
            }
        }
        document.finalize();

        tracing::debug!("Parsed {} nodes", document.tree().len());
        document
    }

    /// Parse `html` as body content and build detached nodes in `tree`.
    ///
    /// The returned top-level nodes are not attached anywhere; inserting them
    /// is left to the caller, exactly like assigning a parsed fragment.
    pub fn parse_fragment(&self, tree: &mut DomTree, html: &str) -> Vec<NodeId> {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        let Some(body) = find_element(&dom.document, "body") else {
            return Vec::new();
        };
        body.children
            .borrow()
            .iter()
            .filter_map(|child| convert_node(child, tree))
            .collect()
    }
}

/// Convert an RcDom node (and its subtree) into a detached arena node.
///
/// Walks with an explicit stack so deep nesting cannot exhaust the call stack.
fn convert_node(handle: &Handle, tree: &mut DomTree) -> Option<NodeId> {
    let root = create_node(handle, tree)?;
    let mut stack: Vec<(Handle, NodeId)> = vec![(handle.clone(), root)];

    while let Some((handle, id)) = stack.pop() {
        for child in handle.children.borrow().iter() {
            if let Some(child_id) = create_node(child, tree) {
                attach(tree, id, child_id);
                stack.push((child.clone(), child_id));
            }
        }
    }
    Some(root)
}

/// Create the arena counterpart of a single RcDom node, without children
fn create_node(handle: &Handle, tree: &mut DomTree) -> Option<NodeId> {
    let id = match &handle.data {
        RcNodeData::Document | RcNodeData::ProcessingInstruction { .. } => return None,
        RcNodeData::Doctype { name, .. } => tree.create_doctype(name.to_string()),
        RcNodeData::Text { contents } => tree.create_text(contents.borrow().to_string()),
        RcNodeData::Comment { contents } => tree.create_comment(contents.to_string()),
        RcNodeData::Element { name, attrs, .. } => {
            let mut elem = ElementData::new(&name.local);
            for attr in attrs.borrow().iter() {
                elem.set_attr(&attr.name.local, attr.value.to_string());
            }
            tree.create_node(Node::from_element(elem))
        }
    };
    Some(id)
}

fn attach(tree: &mut DomTree, parent: NodeId, child: NodeId) {
    if let Err(err) = tree.append_child(parent, child) {
        tracing::debug!("Dropping unattachable node {}: {}", child, err);
    }
}

/// First element named `tag`, in document order
fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    let mut stack = vec![handle.clone()];
    while let Some(current) = stack.pop() {
        if let RcNodeData::Element { name, .. } = &current.data {
            if &*name.local == tag {
                return Some(current);
            }
        }
        stack.extend(current.children.borrow().iter().rev().cloned());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Test</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html);

        assert!(doc.tree().len() > 1, "Expected more than 1 node, got {}", doc.tree().len());
        assert_eq!(doc.title(), "Test");
        assert_eq!(doc.tree().text_content(doc.body()), "Hello");
    }

    #[test]
    fn test_parse_fragment() {
        let html = "<div><span>Text</span></div>";
        let doc = HtmlParser::new().parse(html);

        // Even fragments get wrapped in html/head/body by html5ever
        assert!(doc.body().is_valid());
        assert_eq!(doc.tree().elements_by_tag(doc.body(), "span").len(), 1);
    }

    #[test]
    fn test_attributes_carried_over() {
        let doc = HtmlParser::new().parse(r#"<p class="a b" style="display:none" role="textbox">x</p>"#);
        let p = doc.tree().elements_by_tag(doc.body(), "p")[0];
        let elem = doc.tree().element(p).unwrap();
        assert!(elem.has_class("b"));
        assert!(elem.style.is_display_none());
        assert_eq!(elem.attr("role"), Some("textbox"));
    }

    #[test]
    fn test_fragment_nodes_are_detached() {
        let mut doc = HtmlParser::new().parse("<body></body>");
        let nodes = HtmlParser::new().parse_fragment(doc.tree_mut(), "<p>one</p>two");
        assert_eq!(nodes.len(), 2);
        for &node in &nodes {
            assert_eq!(doc.tree().parent(node), None);
        }
        assert_eq!(doc.tree().text_content(nodes[0]), "one");
    }
}
