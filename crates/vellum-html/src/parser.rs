//! Tree construction from the scanner's token stream.
//!
//! [HTML § 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
//!
//! A tolerant subset of the tree construction stage: a stack of open
//! elements, implied end tags, void elements, and `<html>`/`<body>`
//! synthesis. Mis-nested end tags are dropped rather than adopted — the
//! layout pipeline needs a sane tree, not a conforming one.

use std::sync::Arc;

use vellum_common::{StringInterner, warn_once};
use vellum_dom::{AttributesMap, DomTree, NodeId, NodeType};

use crate::tokenizer::{HtmlScanner, Token};

/// [§ 13.1.2 Elements — Void elements](https://html.spec.whatwg.org/multipage/syntax.html#void-elements)
///
/// "Void elements only have a start tag; end tags must not be specified."
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Tags that implicitly terminate an open `<p>`.
///
/// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
/// "If the stack of open elements has a p element in button scope, then
/// close a p element."
const P_CLOSERS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "center",
    "details",
    "dialog",
    "dir",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "ul",
];

/// Builds a [`DomTree`] from a token stream, recovering from any input.
pub struct TreeBuilder {
    /// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    open_elements: Vec<NodeId>,
    /// The tree under construction.
    tree: DomTree,
    /// Set once a `<body>` (explicit or synthesized) exists.
    body: Option<NodeId>,
    /// Set once the `<html>` element (explicit or synthesized) exists.
    html: Option<NodeId>,
}

impl TreeBuilder {
    /// Create a builder with an empty document.
    #[must_use]
    pub fn new(interner: Arc<StringInterner>) -> Self {
        Self {
            open_elements: Vec::new(),
            tree: DomTree::new(interner),
            body: None,
            html: None,
        }
    }

    /// Consume the token stream and return the finished tree.
    ///
    /// The returned tree always has `<html>` and `<body>` elements, even
    /// for empty input.
    #[must_use]
    pub fn build(mut self, tokens: Vec<Token>) -> DomTree {
        for token in tokens {
            match token {
                Token::Doctype | Token::Eof => {}
                Token::Comment(data) => {
                    let node = self.tree.alloc(NodeType::Comment(data));
                    let parent = self.insertion_point_for_metadata();
                    self.tree.append_child(parent, node);
                }
                Token::Text(text) => self.insert_text(&text),
                Token::StartTag {
                    name,
                    self_closing,
                    attributes,
                } => self.insert_element(&name, self_closing, attributes),
                Token::EndTag { name } => self.close_element(&name),
            }
        }
        let _ = self.ensure_body();
        self.tree
    }

    /// The current open element, or the body/html/document fallback chain.
    fn current(&self) -> NodeId {
        self.open_elements
            .last()
            .copied()
            .or(self.body)
            .or(self.html)
            .unwrap_or(NodeId::ROOT)
    }

    /// Comments before any element land on the document itself.
    fn insertion_point_for_metadata(&self) -> NodeId {
        self.open_elements.last().copied().unwrap_or(NodeId::ROOT)
    }

    /// Make sure `<html>` exists; returns it.
    fn ensure_html(&mut self) -> NodeId {
        if let Some(html) = self.html {
            return html;
        }
        let html = self.tree.alloc_element("html", AttributesMap::new());
        self.tree.append_child(NodeId::ROOT, html);
        self.html = Some(html);
        html
    }

    /// Make sure `<body>` exists; returns it.
    ///
    /// [§ 13.2.6.4.6 The "after head" insertion mode]
    /// "Insert an HTML element for a 'body' start tag token with no
    /// attributes." — the anything-else branch.
    fn ensure_body(&mut self) -> NodeId {
        if let Some(body) = self.body {
            return body;
        }
        let html = self.ensure_html();
        let body = self.tree.alloc_element("body", AttributesMap::new());
        self.tree.append_child(html, body);
        self.body = Some(body);
        body
    }

    /// Tag name of an open-stack entry.
    fn open_tag(&self, index: usize) -> String {
        self.tree.tag_name(self.open_elements[index])
    }

    /// Close implied elements that cannot contain `name`.
    ///
    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#closing-elements-that-have-implied-end-tags)
    fn generate_implied_end_tags(&mut self, name: &str) {
        match name {
            "li" => self.close_implied(&["li"]),
            "dt" | "dd" => self.close_implied(&["dt", "dd"]),
            "td" | "th" => self.close_implied(&["td", "th"]),
            "tr" => {
                self.close_implied(&["td", "th"]);
                self.close_implied(&["tr"]);
            }
            "thead" | "tbody" | "tfoot" => {
                self.close_implied(&["td", "th"]);
                self.close_implied(&["tr"]);
                self.close_implied(&["thead", "tbody", "tfoot"]);
            }
            "option" => self.close_implied(&["option"]),
            n if P_CLOSERS.contains(&n) => self.close_implied(&["p"]),
            _ => {}
        }
    }

    /// Pop the stack down to (and including) the nearest open `targets`
    /// entry. Formatting elements above it are closed too — e.g. in
    /// `<li><b>text<li>` the second `<li>` closes both the `<b>` and the
    /// first `<li>`. A structural ancestor that is not itself a target
    /// stops the search: nothing is closed then.
    fn close_implied(&mut self, targets: &[&str]) {
        for i in (0..self.open_elements.len()).rev() {
            let tag = self.open_tag(i);
            if targets.contains(&tag.as_str()) {
                self.open_elements.truncate(i);
                return;
            }
            if is_structural(&tag) {
                return;
            }
        }
    }

    fn insert_element(&mut self, name: &str, self_closing: bool, attributes: Vec<crate::Attribute>) {
        // Singletons: <html> and <body> merge into the synthesized ones.
        match name {
            "html" => {
                let html = self.ensure_html();
                self.merge_attributes(html, attributes);
                return;
            }
            "body" => {
                let body = self.ensure_body();
                self.merge_attributes(body, attributes);
                self.open_elements.clear();
                self.open_elements.push(body);
                return;
            }
            "head" => {
                // A head element is kept as a normal child of html; its
                // metadata children are harmless to layout (display: none).
                let html = self.ensure_html();
                let head = self.alloc(name, attributes);
                self.tree.append_child(html, head);
                self.open_elements.push(head);
                return;
            }
            _ => {}
        }

        self.generate_implied_end_tags(name);

        // Content outside head metadata forces a body into existence.
        let parent = if self.open_elements.is_empty() {
            self.ensure_body()
        } else {
            self.current()
        };

        let node = self.alloc(name, attributes);
        self.tree.append_child(parent, node);

        let is_void = VOID_ELEMENTS.contains(&name) || self_closing;
        if !is_void {
            self.open_elements.push(node);
        }
    }

    fn alloc(&mut self, name: &str, attributes: Vec<crate::Attribute>) -> NodeId {
        let mut attrs = AttributesMap::new();
        for attr in attributes {
            let _ = attrs.entry(attr.name).or_insert(attr.value);
        }
        self.tree.alloc_element(name, attrs)
    }

    fn merge_attributes(&mut self, node: NodeId, attributes: Vec<crate::Attribute>) {
        if let Some(element) = self.tree.as_element_mut(node) {
            for attr in attributes {
                let _ = element.attrs.entry(attr.name).or_insert(attr.value);
            }
        }
    }

    /// [§ 13.2.6.4.7] End tag handling, simplified: pop to the matching
    /// open element; a stray end tag is dropped.
    fn close_element(&mut self, name: &str) {
        if VOID_ELEMENTS.contains(&name) {
            return; // </br> and friends are noise
        }
        let Some(pos) = (0..self.open_elements.len())
            .rev()
            .find(|&i| self.open_tag(i) == name)
        else {
            warn_once("HTML", &format!("dropped stray end tag </{name}>"));
            return;
        };
        self.open_elements.truncate(pos);
    }

    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        // Whitespace before any content belongs to nobody.
        if self.open_elements.is_empty() && text.trim().is_empty() {
            return;
        }
        let parent = if self.open_elements.is_empty() {
            self.ensure_body()
        } else {
            self.current()
        };
        let node = self.tree.alloc(NodeType::Text(text.to_string()));
        self.tree.append_child(parent, node);
    }
}

/// Elements that stop the implied-end-tag search: an implied close never
/// reaches past one of these.
fn is_structural(tag: &str) -> bool {
    matches!(
        tag,
        "html"
            | "body"
            | "div"
            | "section"
            | "article"
            | "table"
            | "thead"
            | "tbody"
            | "tfoot"
            | "tr"
            | "td"
            | "th"
            | "ul"
            | "ol"
            | "dl"
            | "select"
            | "blockquote"
            | "fieldset"
    )
}

/// Parse a complete HTML document into an element tree.
///
/// Never fails: any input produces a tree with at least `<html>` and
/// `<body>` present.
#[must_use]
pub fn parse_document(html: &str, interner: Arc<StringInterner>) -> DomTree {
    let mut scanner = HtmlScanner::new(html);
    scanner.run();
    TreeBuilder::new(interner).build(scanner.into_tokens())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(html: &str) -> DomTree {
        parse_document(html, Arc::new(StringInterner::new()))
    }

    fn tags(tree: &DomTree, parent: NodeId) -> Vec<String> {
        tree.children(parent)
            .iter()
            .filter(|&&c| tree.as_element(c).is_some())
            .map(|&c| tree.tag_name(c))
            .collect()
    }

    #[test]
    fn scaffolding_is_synthesized() {
        let tree = parse("hello");
        let html = tree.document_element().expect("html");
        assert_eq!(tree.tag_name(html), "html");
        let body = tree.body().expect("body");
        assert_eq!(tree.collect_text(body), "hello");
    }

    #[test]
    fn empty_input_still_has_body() {
        let tree = parse("");
        assert!(tree.body().is_some());
    }

    #[test]
    fn nested_structure() {
        let tree = parse("<div><p>a</p><p>b</p></div>");
        let body = tree.body().unwrap();
        assert_eq!(tags(&tree, body), vec!["div"]);
        let div = tree.children(body)[0];
        assert_eq!(tags(&tree, div), vec!["p", "p"]);
    }

    #[test]
    fn li_implies_close_of_open_li() {
        let tree = parse("<ul><li>one<li>two<li>three</ul>");
        let body = tree.body().unwrap();
        let ul = tree.children(body)[0];
        assert_eq!(tags(&tree, ul), vec!["li", "li", "li"]);
    }

    #[test]
    fn paragraph_closed_by_block_start() {
        let tree = parse("<p>text<div>block</div>");
        let body = tree.body().unwrap();
        assert_eq!(tags(&tree, body), vec!["p", "div"]);
    }

    #[test]
    fn table_cells_auto_close() {
        let tree = parse("<table><tr><td>A<td>B<tr><td>C</table>");
        let body = tree.body().unwrap();
        let table = tree.children(body)[0];
        assert_eq!(tags(&tree, table), vec!["tr", "tr"]);
        let first_row = tree.children(table)[0];
        assert_eq!(tags(&tree, first_row), vec!["td", "td"]);
    }

    #[test]
    fn stray_end_tags_are_dropped() {
        let tree = parse("</div><span>x</span></p>");
        let body = tree.body().unwrap();
        assert_eq!(tags(&tree, body), vec!["span"]);
    }

    #[test]
    fn void_elements_take_no_children() {
        let tree = parse("<p>a<br>b</p>");
        let body = tree.body().unwrap();
        let p = tree.children(body)[0];
        let kinds: Vec<String> = tree
            .children(p)
            .iter()
            .map(|&c| {
                tree.as_element(c)
                    .map_or_else(|| "#text".to_string(), |_| tree.tag_name(c))
            })
            .collect();
        assert_eq!(kinds, vec!["#text", "br", "#text"]);
    }

    #[test]
    fn unclosed_elements_survive_to_eof() {
        let tree = parse("<div><em>never closed");
        let body = tree.body().unwrap();
        let div = tree.children(body)[0];
        assert_eq!(tags(&tree, div), vec!["em"]);
        let em = tree.children(div)[0];
        assert_eq!(tree.collect_text(em), "never closed");
    }

    #[test]
    fn head_metadata_is_kept() {
        let tree = parse("<html><head><title>T</title></head><body>x</body></html>");
        let html = tree.document_element().unwrap();
        assert_eq!(tags(&tree, html), vec!["head", "body"]);
    }

    #[test]
    fn html_attributes_merge_into_synthesized_root() {
        let tree = parse(r#"<html lang="en"><body>x</body></html>"#);
        let html = tree.document_element().unwrap();
        assert_eq!(
            tree.as_element(html).unwrap().attr("lang"),
            Some("en")
        );
    }
}
