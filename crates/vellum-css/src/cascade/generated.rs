//! Generated content: `::before` / `::after` materialization.
//!
//! [CSS 2.2 § 12 Generated content](https://www.w3.org/TR/CSS22/generate.html)
//!
//! A pseudo-element whose cascaded `content` is set becomes a real
//! element child inserted at the leading or trailing edge of its owner
//! before render tree construction. Its content value expands into text
//! and image children; `attr()` reads the owner's attributes and
//! `counter()` the counter stack maintained in document order.

use std::collections::HashMap;

use vellum_dom::{AttributesMap, DomTree, NodeId, NodeType};

use crate::parser::ComponentValue;
use crate::selector::PseudoElement;
use crate::style::computed::PropertyMap;
use crate::tokenizer::CssToken;

/// Tag given to materialized pseudo-element wrappers. Hyphen-prefixed so
/// no author selector can accidentally target them.
pub const GENERATED_TAG: &str = "-vellum-generated";

/// Insert generated children for every `(owner, edge, map)` triple and
/// register their property maps for the compute pass.
///
/// [§ 12.1] "The :before and :after pseudo-elements interact with other
/// boxes as if they were real elements inserted just inside their
/// associated element."
pub fn materialize(
    tree: &mut DomTree,
    pseudo_maps: Vec<(NodeId, PseudoElement, PropertyMap)>,
    maps: &mut HashMap<NodeId, PropertyMap>,
) {
    let mut counters = Counters::default();

    for (owner, edge, map) in pseudo_maps {
        let Some(content) = map.get("content").map(<[ComponentValue]>::to_vec) else {
            continue;
        };
        // "content: none" / "content: normal" generate nothing.
        let is_none = content
            .iter()
            .filter(|v| !v.is_whitespace())
            .all(|v| {
                v.as_ident()
                    .is_some_and(|i| i.eq_ignore_ascii_case("none") || i.eq_ignore_ascii_case("normal"))
            });
        if is_none {
            continue;
        }

        counters.advance_to(tree, owner, &map);

        // Re-running the cascade (hover, media change) must not stack a
        // second wrapper: an existing one at the right edge is reused
        // with its map refreshed.
        let existing = match edge {
            PseudoElement::Before => tree.children(owner).first().copied(),
            PseudoElement::After => tree.children(owner).last().copied(),
        }
        .filter(|&child| tree.is_tag(child, GENERATED_TAG));
        if let Some(wrapper) = existing {
            let _ = maps.insert(wrapper, map);
            continue;
        }

        let wrapper = tree.alloc_element(GENERATED_TAG, AttributesMap::new());
        let children = expand_content(tree, owner, &content, &counters);
        for child in &children {
            tree.append_child(wrapper, *child);
        }
        match edge {
            PseudoElement::Before => tree.prepend_child(owner, wrapper),
            PseudoElement::After => tree.append_child(owner, wrapper),
        }
        let _ = maps.insert(wrapper, map);
    }
}

/// Expand a `content` value into child nodes (allocated, unattached).
fn expand_content(
    tree: &mut DomTree,
    owner: NodeId,
    content: &[ComponentValue],
    counters: &Counters,
) -> Vec<NodeId> {
    let mut children = Vec::new();
    let mut text = String::new();

    for piece in content {
        match piece {
            ComponentValue::Token(CssToken::String(s)) => text.push_str(s),
            ComponentValue::Token(CssToken::Url(url)) => {
                flush_text(tree, &mut text, &mut children);
                let mut attrs = AttributesMap::new();
                let _ = attrs.insert("src".to_string(), url.clone());
                children.push(tree.alloc_element("img", attrs));
            }
            ComponentValue::Function { name, args } => {
                match name.to_ascii_lowercase().as_str() {
                    "url" => {
                        if let Some(ComponentValue::Token(CssToken::String(url))) =
                            args.iter().find(|a| !a.is_whitespace())
                        {
                            flush_text(tree, &mut text, &mut children);
                            let mut attrs = AttributesMap::new();
                            let _ = attrs.insert("src".to_string(), url.clone());
                            children.push(tree.alloc_element("img", attrs));
                        }
                    }
                    // [§ 12.2] "attr(X): this function returns as a string
                    // the value of attribute X for the subject of the
                    // selector."
                    "attr" => {
                        let attr_name = args
                            .iter()
                            .find_map(|a| a.as_ident())
                            .map(str::to_ascii_lowercase);
                        if let Some(attr_name) = attr_name {
                            if let Some(value) = attribute_on_ancestors(tree, owner, &attr_name) {
                                text.push_str(&value);
                            }
                        }
                    }
                    // [§ 12.4 Counters]
                    "counter" => {
                        let counter_name = args.iter().find_map(|a| a.as_ident());
                        if let Some(counter_name) = counter_name {
                            text.push_str(&counters.value(counter_name).to_string());
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    flush_text(tree, &mut text, &mut children);
    children
}

fn flush_text(tree: &mut DomTree, text: &mut String, children: &mut Vec<NodeId>) {
    if !text.is_empty() {
        children.push(tree.alloc(NodeType::Text(std::mem::take(text))));
    }
}

/// `attr()` resolves against the owner, falling back to the nearest
/// ancestor carrying the attribute.
fn attribute_on_ancestors(tree: &DomTree, owner: NodeId, name: &str) -> Option<String> {
    if let Some(value) = tree.as_element(owner).and_then(|e| e.attr(name)) {
        return Some(value.to_string());
    }
    tree.ancestors(owner)
        .find_map(|ancestor| tree.as_element(ancestor)?.attr(name).map(str::to_string))
}

/// A minimal counter stack: `counter-reset` pushes, `counter-increment`
/// bumps the innermost scope.
///
/// [CSS 2.2 § 12.4.1 Nested counters and scope](https://www.w3.org/TR/CSS22/generate.html#scope)
#[derive(Debug, Default)]
struct Counters {
    stacks: HashMap<String, Vec<i32>>,
}

impl Counters {
    /// Apply the owner's `counter-reset`/`counter-increment` declarations
    /// before its generated content is expanded. Materialization visits
    /// owners in document order, so scopes behave like a stack.
    fn advance_to(&mut self, _tree: &DomTree, _owner: NodeId, map: &PropertyMap) {
        if let Some(value) = map.get("counter-reset") {
            for (name, initial) in parse_counter_list(value, 0) {
                self.stacks.entry(name).or_default().push(initial);
            }
        }
        if let Some(value) = map.get("counter-increment") {
            for (name, delta) in parse_counter_list(value, 1) {
                let stack = self.stacks.entry(name).or_default();
                if let Some(top) = stack.last_mut() {
                    *top += delta;
                } else {
                    stack.push(delta);
                }
            }
        }
    }

    fn value(&self, name: &str) -> i32 {
        self.stacks
            .get(name)
            .and_then(|stack| stack.last())
            .copied()
            .unwrap_or(0)
    }
}

/// `name [int] name [int] ...` pairs.
fn parse_counter_list(value: &[ComponentValue], default: i32) -> Vec<(String, i32)> {
    let mut out: Vec<(String, i32)> = Vec::new();
    for piece in value.iter().filter(|v| !v.is_whitespace()) {
        if let Some(ident) = piece.as_ident() {
            out.push((ident.to_string(), default));
        } else if let Some(number) = piece.as_number() {
            if let Some(last) = out.last_mut() {
                last.1 = number as i32;
            }
        }
    }
    out
}
