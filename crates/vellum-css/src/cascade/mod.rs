//! Applying stylesheets to the element tree.
//!
//! [CSS Cascading and Inheritance Level 4 § 6](https://www.w3.org/TR/css-cascade-4/#cascading)
//!
//! The cascade walks every element, collects the rules whose selector
//! matches, merges their declarations in cascade order, folds in the
//! `style` attribute, and computes the final [`CssProperties`] with
//! inheritance from the parent. Each element also keeps the list of
//! rules that matched it; entries whose match involved a dynamic
//! pseudo-class are re-evaluated after input events to drive
//! hover/active redraws.

pub mod generated;

use std::collections::HashMap;

use vellum_dom::{DomTree, NodeId, NodeType};

use crate::media::MediaFeatures;
use crate::parser::{CssParser, Stylesheet, parser::parse_declaration_list};
use crate::selector::{MatchContext, MatchResult, PseudoElement};
use crate::style::computed::{CssProperties, PropertyMap};
use crate::style::font::FontSource;
use crate::tokenizer::CssTokenizer;

/// One rule recorded on an element after matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchedRule {
    /// Index into the sorted rule vector of the stylesheet.
    pub rule_index: usize,
    /// The match involved a dynamic pseudo-class (`:hover` etc.).
    pub dynamic: bool,
    /// Whether the rule applied at the last evaluation against the
    /// element's actual pseudo state.
    pub applied: bool,
}

/// Computed style per element.
pub type StyleMap = HashMap<NodeId, CssProperties>;

/// Matched-rule records per element, for dynamic re-evaluation.
pub type MatchedMap = HashMap<NodeId, Vec<MatchedRule>>;

/// The output of one cascade pass.
#[derive(Debug, Default)]
pub struct ElementStyles {
    /// Computed properties for every element (including materialized
    /// pseudo-element children).
    pub computed: StyleMap,
    /// Per-element matched rules for hover-dirty detection.
    pub matched: MatchedMap,
}

/// Apply a sorted stylesheet to the whole tree.
///
/// Materializes `::before`/`::after` children (the tree is mutated),
/// then computes properties top-down. `lang` feeds `:lang()` matching.
///
/// The sheet must already be sorted ([`Stylesheet::sort`]).
pub fn apply_stylesheet(
    tree: &mut DomTree,
    sheet: &Stylesheet,
    features: &MediaFeatures,
    lang: &str,
    font_source: &mut dyn FontSource,
) -> ElementStyles {
    let mut styles = ElementStyles::default();
    let mut maps: HashMap<NodeId, PropertyMap> = HashMap::new();

    // Pass 1: match rules and build property maps for the elements that
    // exist in the source document.
    let element_ids: Vec<NodeId> = document_elements(tree);
    let mut pseudo_maps: Vec<(NodeId, PseudoElement, PropertyMap)> = Vec::new();

    for &id in &element_ids {
        let (own, before, after, matched) = match_element(tree, sheet, features, lang, id);
        let _ = maps.insert(id, own);
        if !matched.is_empty() {
            let _ = styles.matched.insert(id, matched);
        }
        if before.get("content").is_some() {
            pseudo_maps.push((id, PseudoElement::Before, before));
        }
        if after.get("content").is_some() {
            pseudo_maps.push((id, PseudoElement::After, after));
        }
    }

    // Pass 2: materialize generated content into real children.
    generated::materialize(tree, pseudo_maps, &mut maps);

    // Pass 3: compute properties top-down so parents are ready before
    // their children inherit.
    let root = tree.document_element();
    let ordered: Vec<NodeId> = document_elements(tree);
    for id in ordered {
        let map = maps.remove(&id).unwrap_or_default();
        let parent_props = tree
            .parent(id)
            .and_then(|parent| styles.computed.get(&parent));
        let mut props = CssProperties::compute(&map, parent_props, font_source);

        let parent_is_flex = parent_props.is_some_and(|p| {
            matches!(
                p.display,
                crate::style::keywords::Display::Flex | crate::style::keywords::Display::InlineFlex
            )
        });
        props.apply_display_fixups(Some(id) == root, parent_is_flex);

        let _ = styles.computed.insert(id, props);
    }

    styles
}

/// Match every rule against one element, returning the element's own
/// property map, the `::before`/`::after` maps, and the matched records.
fn match_element(
    tree: &DomTree,
    sheet: &Stylesheet,
    features: &MediaFeatures,
    lang: &str,
    id: NodeId,
) -> (PropertyMap, PropertyMap, PropertyMap, Vec<MatchedRule>) {
    let mut own = PropertyMap::new();
    let mut before = PropertyMap::new();
    let mut after = PropertyMap::new();
    let mut matched = Vec::new();

    let discover = MatchContext {
        apply_pseudo: false,
        lang: lang.to_string(),
    };
    let actual = MatchContext {
        apply_pseudo: true,
        lang: lang.to_string(),
    };

    for (rule_index, rule) in sheet.rules.iter().enumerate() {
        if !sheet.rule_applies(rule, features) {
            continue;
        }
        let result = rule.selector.select(tree, id, &discover);
        if !result.is_match() {
            continue;
        }
        let dynamic = result == MatchResult::MatchPseudoClass;
        let applied = if dynamic {
            rule.selector.select(tree, id, &actual).is_match()
        } else {
            true
        };
        matched.push(MatchedRule {
            rule_index,
            dynamic,
            applied,
        });
        if !applied {
            continue;
        }

        let target = match rule.selector.pseudo_element() {
            None => &mut own,
            Some(PseudoElement::Before) => &mut before,
            Some(PseudoElement::After) => &mut after,
        };
        for declaration in &rule.declarations {
            target.add_declaration(declaration);
        }
    }

    // [Cascading § 6.4.1] The style attribute outranks every sheet rule
    // of the same importance; merging it last gets exactly that.
    if let Some(style_attr) = tree.as_element(id).and_then(|e| e.attr("style")) {
        for declaration in parse_inline_style(style_attr) {
            own.add_declaration(&declaration);
        }
    }

    (own, before, after, matched)
}

/// Parse a `style="..."` attribute body into declarations.
#[must_use]
pub fn parse_inline_style(text: &str) -> Vec<crate::parser::Declaration> {
    let mut tokenizer = CssTokenizer::new(text);
    tokenizer.run();
    let mut parser = CssParser::new(tokenizer.into_tokens());
    let mut body = Vec::new();
    while let Some(value) = parser.consume_component_value() {
        if matches!(
            value,
            crate::parser::ComponentValue::Token(crate::tokenizer::CssToken::Eof)
        ) {
            break;
        }
        body.push(value);
    }
    parse_declaration_list(&body)
}

/// Re-evaluate the dynamic rules after a pseudo-state change.
///
/// Returns the elements whose set of applied rules changed (the caller
/// re-runs the cascade and collects their boxes for redraw), updating
/// each record's `applied` flag in place.
pub fn refresh_dynamic(
    tree: &DomTree,
    sheet: &Stylesheet,
    matched: &mut MatchedMap,
    lang: &str,
) -> Vec<NodeId> {
    let actual = MatchContext {
        apply_pseudo: true,
        lang: lang.to_string(),
    };
    let mut dirty = Vec::new();

    for (&id, records) in matched.iter_mut() {
        let mut changed = false;
        for record in records.iter_mut().filter(|r| r.dynamic) {
            let Some(rule) = sheet.rules.get(record.rule_index) else {
                continue;
            };
            let applies = rule.selector.select(tree, id, &actual).is_match();
            if applies != record.applied {
                record.applied = applies;
                changed = true;
            }
        }
        if changed {
            dirty.push(id);
        }
    }

    dirty.sort_by_key(|id| id.0);
    dirty
}

/// All element node ids in document order.
fn document_elements(tree: &DomTree) -> Vec<NodeId> {
    let mut ids = Vec::new();
    for id in tree.descendants(tree.root()) {
        if let Some(node) = tree.get(id) {
            if matches!(node.node_type, NodeType::Element(_)) {
                ids.push(id);
            }
        }
    }
    ids
}
