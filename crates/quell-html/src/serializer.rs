//! HTML Serialization (innerHTML/outerHTML)

use quell_dom::{DomTree, NodeData, NodeId};

/// Void elements (no end tag)
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Raw text elements (no escaping for content)
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// HTML serializer
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlSerializer;

impl HtmlSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Serialize innerHTML of a node (children only)
    pub fn serialize_inner(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        for child in tree.children(node_id) {
            self.serialize_node(tree, child, &mut output);
        }
        output
    }

    /// Serialize outerHTML of a node (including the node itself)
    pub fn serialize_outer(&self, tree: &DomTree, node_id: NodeId) -> String {
        let mut output = String::new();
        self.serialize_node(tree, node_id, &mut output);
        output
    }

    fn serialize_node<'t>(&self, tree: &'t DomTree, node_id: NodeId, output: &mut String) {
        let mut stack = vec![Step::Enter(node_id)];

        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Enter(id) => id,
                Step::Close(tag) => {
                    output.push_str("</");
                    output.push_str(tag);
                    output.push('>');
                    continue;
                }
            };
            let Some(node) = tree.get(id) else {
                continue;
            };

            match &node.data {
                NodeData::Document => push_children(tree, id, &mut stack),
                NodeData::Element(elem) => {
                    let tag = elem.tag();
                    output.push('<');
                    output.push_str(tag);

                    if !elem.classes.is_empty() {
                        push_attribute(output, "class", &elem.classes.join(" "));
                    }
                    if !elem.style.is_empty() {
                        push_attribute(output, "style", &elem.style.to_css_text());
                    }
                    for attr in &elem.attrs {
                        push_attribute(output, &attr.name, &attr.value);
                    }

                    if VOID_ELEMENTS.contains(&tag) {
                        output.push_str(" />");
                        continue;
                    }
                    output.push('>');

                    stack.push(Step::Close(tag));
                    if RAW_TEXT_ELEMENTS.contains(&tag) {
                        output.push_str(&tree.text_content(id));
                    } else {
                        push_children(tree, id, &mut stack);
                    }
                }
                NodeData::Text(text) => escape_text(text, output),
                NodeData::Comment(text) => {
                    output.push_str("<!--");
                    output.push_str(text);
                    output.push_str("-->");
                }
                NodeData::Doctype { name } => {
                    output.push_str("<!DOCTYPE ");
                    output.push_str(name);
                    output.push('>');
                }
            }
        }
    }
}

/// Pending serializer work; nesting is walked with an explicit stack
enum Step<'t> {
    Enter(NodeId),
    Close(&'t str),
}

/// Queue the children of `id` so they pop in document order
fn push_children<'t>(tree: &'t DomTree, id: NodeId, stack: &mut Vec<Step<'t>>) {
    let children: Vec<NodeId> = tree.children(id).collect();
    stack.extend(children.into_iter().rev().map(Step::Enter));
}

fn push_attribute(output: &mut String, name: &str, value: &str) {
    output.push(' ');
    output.push_str(name);
    if !value.is_empty() {
        output.push_str("=\"");
        escape_attribute(value, output);
        output.push('"');
    }
}

/// Escape text content for HTML
fn escape_text(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Escape attribute value
fn escape_attribute(text: &str, output: &mut String) {
    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            _ => output.push(c),
        }
    }
}

/// Utility: Get innerHTML of a node
pub fn inner_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_inner(tree, node_id)
}

/// Utility: Get outerHTML of a node
pub fn outer_html(tree: &DomTree, node_id: NodeId) -> String {
    HtmlSerializer::new().serialize_outer(tree, node_id)
}
