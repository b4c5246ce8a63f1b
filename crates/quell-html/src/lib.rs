//! Quell HTML
//!
//! HTML5 parsing built on html5ever, converted into the Quell arena DOM, and
//! serialization back to markup.

mod parser;
mod serializer;

pub use parser::HtmlParser;
pub use serializer::{HtmlSerializer, inner_html, outer_html};

pub use quell_dom::Document;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}
