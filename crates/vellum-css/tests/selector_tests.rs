//! Selector matching against real parsed documents.

use std::sync::Arc;

use vellum_common::StringInterner;
use vellum_css::selector::{MatchContext, MatchResult, Selector, Specificity};
use vellum_dom::{DomTree, NodeId, PseudoClassSet};
use vellum_html::parse_document;

fn parse(html: &str) -> DomTree {
    parse_document(html, Arc::new(StringInterner::new()))
}

fn find(tree: &DomTree, tag: &str) -> NodeId {
    tree.descendants(tree.root())
        .find(|&id| tree.is_tag(id, tag))
        .unwrap_or_else(|| panic!("no <{tag}> in document"))
}

fn select(tree: &DomTree, selector: &str, node: NodeId) -> MatchResult {
    let selector = Selector::parse(selector).expect("selector parses");
    selector.select(tree, node, &MatchContext::default())
}

#[test]
fn tag_class_and_id() {
    let tree = parse(r#"<div class="note box" id="main"><p>x</p></div>"#);
    let div = find(&tree, "div");
    assert_eq!(select(&tree, "div", div), MatchResult::Match);
    assert_eq!(select(&tree, ".note", div), MatchResult::Match);
    assert_eq!(select(&tree, "#main.box", div), MatchResult::Match);
    assert_eq!(select(&tree, "span", div), MatchResult::NoMatch);
    assert_eq!(select(&tree, ".missing", div), MatchResult::NoMatch);
}

#[test]
fn combinators() {
    let tree = parse("<div><ul><li>one</li><li class=x>two</li></ul><p>after</p></div>");
    let li2 = {
        let ul = find(&tree, "ul");
        tree.children(ul)[1]
    };
    assert_eq!(select(&tree, "ul > li", li2), MatchResult::Match);
    assert_eq!(select(&tree, "div li", li2), MatchResult::Match);
    assert_eq!(select(&tree, "li + li", li2), MatchResult::Match);
    assert_eq!(select(&tree, "li ~ li", li2), MatchResult::Match);
    // The first li has no preceding sibling.
    let li1 = {
        let ul = find(&tree, "ul");
        tree.children(ul)[0]
    };
    assert_eq!(select(&tree, "li + li", li1), MatchResult::NoMatch);
    // p follows ul.
    let p = find(&tree, "p");
    assert_eq!(select(&tree, "ul + p", p), MatchResult::Match);
    assert_eq!(select(&tree, "li + p", p), MatchResult::NoMatch);
}

#[test]
fn descendant_combinator_backtracks() {
    // The nearest <b> ancestor has no <em> parent, but a farther one
    // does; greedy nearest-first matching would fail here.
    let tree = parse("<em><b><span><b><i>x</i></b></span></b></em>");
    let i = find(&tree, "i");
    assert_eq!(select(&tree, "em > b i", i), MatchResult::Match);
}

#[test]
fn nth_child_forms() {
    let tree = parse("<ul><li>1</li><li>2</li><li>3</li><li>4</li><li>5</li></ul>");
    let ul = find(&tree, "ul");
    let items = tree.children(ul);
    let matching = |selector: &str| -> Vec<usize> {
        items
            .iter()
            .enumerate()
            .filter(|&(_, &li)| select(&tree, selector, li).is_match())
            .map(|(index, _)| index)
            .collect()
    };
    assert_eq!(matching("li:nth-child(odd)"), vec![0, 2, 4]);
    assert_eq!(matching("li:nth-child(2n)"), vec![1, 3]);
    assert_eq!(matching("li:nth-child(3)"), vec![2]);
    assert_eq!(matching("li:nth-child(-n+2)"), vec![0, 1]);
    assert_eq!(matching("li:nth-last-child(1)"), vec![4]);
    assert_eq!(matching("li:first-child"), vec![0]);
    assert_eq!(matching("li:last-child"), vec![4]);
}

#[test]
fn of_type_variants_skip_other_tags() {
    let tree = parse("<div><span>a</span><p>b</p><span>c</span></div>");
    let div = find(&tree, "div");
    let children = tree.children(div);
    assert!(select(&tree, "p:first-of-type", children[1]).is_match());
    assert!(select(&tree, "p:only-of-type", children[1]).is_match());
    assert!(select(&tree, "span:last-of-type", children[2]).is_match());
    assert!(!select(&tree, "span:only-of-type", children[0]).is_match());
}

#[test]
fn attribute_operators() {
    let tree = parse(r#"<a href="https://example.com/page.html" data-kind="x y z" lang="en-US">t</a>"#);
    let a = find(&tree, "a");
    for selector in [
        "[href]",
        "[href^=https]",
        "[href$='.html']",
        "[href*=example]",
        "[data-kind~=y]",
        "[lang|=en]",
    ] {
        assert!(select(&tree, selector, a).is_match(), "{selector}");
    }
    assert!(!select(&tree, "[href^=ftp]", a).is_match());
    assert!(!select(&tree, "[lang|=e]", a).is_match());
}

#[test]
fn not_negates_a_compound() {
    let tree = parse("<p class=a>1</p>");
    let p = find(&tree, "p");
    assert!(select(&tree, "p:not(.b)", p).is_match());
    assert!(!select(&tree, "p:not(.a)", p).is_match());
}

#[test]
fn dynamic_pseudo_classes_flag_the_match() {
    let mut tree = parse(r##"<a href="#">x</a>"##);
    let a = find(&tree, "a");

    // Discovery pass: the rule could apply, flagged as state-dependent.
    assert_eq!(select(&tree, "a:hover", a), MatchResult::MatchPseudoClass);

    // With the actual state consulted, it fails until hover is set.
    let selector = Selector::parse("a:hover").expect("parse");
    let actual = MatchContext {
        apply_pseudo: true,
        lang: String::new(),
    };
    assert_eq!(selector.select(&tree, a, &actual), MatchResult::NoMatch);

    tree.as_element_mut(a)
        .expect("element")
        .pseudo_states
        .insert(PseudoClassSet::HOVER);
    assert_eq!(
        selector.select(&tree, a, &actual),
        MatchResult::MatchPseudoClass
    );
}

#[test]
fn lang_prefix_matches_container_language() {
    let tree = parse("<p>x</p>");
    let p = find(&tree, "p");
    let selector = Selector::parse("p:lang(en)").expect("parse");
    let en_us = MatchContext {
        apply_pseudo: false,
        lang: "en-US".to_string(),
    };
    assert!(selector.select(&tree, p, &en_us).is_match());
    let de = MatchContext {
        apply_pseudo: false,
        lang: "de".to_string(),
    };
    assert!(!selector.select(&tree, p, &de).is_match());
}

#[test]
fn specificity_orders_lexicographically() {
    let specificity = |text: &str| Selector::parse(text).expect("parse").specificity();
    assert!(specificity("#a") > specificity(".a.b.c.d.e"));
    assert!(specificity(".a") > specificity("div span p a b i"));
    assert_eq!(specificity("div.x#y:hover"), Specificity::new(0, 1, 2, 1));
}
