//! Cascade tests: matching, ordering, inheritance, media scoping, and
//! generated content, over real parsed documents.

use std::sync::Arc;

use vellum_common::StringInterner;
use vellum_css::cascade::{ElementStyles, apply_stylesheet, refresh_dynamic};
use vellum_css::media::{MediaFeatures, MediaType};
use vellum_css::parser::{CssParser, Stylesheet};
use vellum_css::style::font::FixedFontSource;
use vellum_css::style::keywords::Display;
use vellum_css::style::values::Color;
use vellum_css::tokenizer::CssTokenizer;
use vellum_dom::{DomTree, NodeId, PseudoClassSet};
use vellum_html::parse_document;

fn sheet_of(css: &str) -> Stylesheet {
    let mut tokenizer = CssTokenizer::new(css);
    tokenizer.run();
    let mut sheet = CssParser::new(tokenizer.into_tokens()).parse_stylesheet();
    sheet.sort();
    sheet
}

fn screen() -> MediaFeatures {
    MediaFeatures {
        media_type: MediaType::Screen,
        width: 800,
        height: 600,
        color: 8,
        ..MediaFeatures::default()
    }
}

fn styled(html: &str, css: &str) -> (DomTree, ElementStyles, Stylesheet) {
    let mut tree = parse_document(html, Arc::new(StringInterner::new()));
    let sheet = sheet_of(css);
    let mut fonts = FixedFontSource::default();
    let styles = apply_stylesheet(&mut tree, &sheet, &screen(), "en", &mut fonts);
    (tree, styles, sheet)
}

fn find(tree: &DomTree, tag: &str) -> NodeId {
    tree.descendants(tree.root())
        .find(|&id| tree.is_tag(id, tag))
        .unwrap_or_else(|| panic!("no <{tag}>"))
}

#[test]
fn higher_specificity_wins_regardless_of_order() {
    let (tree, styles, _) = styled(
        r#"<p class="x" id="y">t</p>"#,
        "#y { color: #010101 } .x { color: #020202 } p { color: #030303 }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles.computed[&p].color, Color::rgb(1, 1, 1));
}

#[test]
fn source_order_breaks_specificity_ties() {
    let (tree, styles, _) = styled(
        "<p>t</p>",
        "p { color: #010101 } p { color: #020202 }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles.computed[&p].color, Color::rgb(2, 2, 2));
}

#[test]
fn important_defeats_later_and_more_specific() {
    let (tree, styles, _) = styled(
        r#"<p id="y">t</p>"#,
        "p { color: #010101 !important } #y { color: #020202 }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles.computed[&p].color, Color::rgb(1, 1, 1));
}

#[test]
fn style_attribute_outranks_sheet_rules() {
    let (tree, styles, _) = styled(
        r#"<p id="y" style="color: #0a0b0c">t</p>"#,
        "#y { color: #020202 }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles.computed[&p].color, Color::rgb(0x0a, 0x0b, 0x0c));
}

#[test]
fn inherited_and_non_inherited_properties() {
    let (tree, styles, _) = styled(
        "<div><p>t</p></div>",
        "div { color: #040404; border: 1px solid #050505; display: block } p { display: block }",
    );
    let p = find(&tree, "p");
    let props = &styles.computed[&p];
    // color inherits; borders do not.
    assert_eq!(props.color, Color::rgb(4, 4, 4));
    assert!(!props.borders.sides.top.style.is_visible());
}

#[test]
fn explicit_inherit_keyword() {
    let (tree, styles, _) = styled(
        "<div><p>t</p></div>",
        "div { color: #060606 } p { color: inherit }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles.computed[&p].color, Color::rgb(6, 6, 6));
}

#[test]
fn media_query_scopes_rules() {
    let (tree, styles, _) = styled(
        "<p>t</p>",
        "@media print { p { color: #010101 } } \
         @media screen and (min-width: 500px) { p { color: #020202 } }",
    );
    let p = find(&tree, "p");
    assert_eq!(styles.computed[&p].color, Color::rgb(2, 2, 2));
}

#[test]
fn display_fixups_after_cascade() {
    let (tree, styles, _) = styled(
        "<div><span>f</span></div>",
        "div { display: block } span { float: left }",
    );
    let span = find(&tree, "span");
    // A floated inline blockifies.
    assert_eq!(styles.computed[&span].display, Display::Block);
}

#[test]
fn root_element_blockifies() {
    let (tree, styles, _) = styled("<p>t</p>", "html { display: inline }");
    let html = tree.document_element().expect("html");
    assert_eq!(styles.computed[&html].display, Display::Block);
}

#[test]
fn before_content_materializes_an_element() {
    let (tree, styles, _) = styled(
        "<p>world</p>",
        "p { display: block } p::before { content: \"hello \" }",
    );
    let p = find(&tree, "p");
    let first = tree.children(p)[0];
    // The generated wrapper is a real element child with its own style.
    assert!(tree.as_element(first).is_some());
    assert!(styles.computed.contains_key(&first));
    assert_eq!(tree.collect_text(first), "hello ");
    // And it sits before the original text.
    assert_eq!(tree.collect_text(p), "hello world");
}

#[test]
fn attr_function_reads_the_owner() {
    let (tree, _, _) = styled(
        r#"<a href="/docs">link</a>"#,
        "a::after { content: \" (\" attr(href) \")\" }",
    );
    let a = find(&tree, "a");
    assert_eq!(tree.collect_text(a), "link (/docs)");
}

#[test]
fn hover_rules_are_tracked_and_refreshed() {
    let html = r##"<a href="#">x</a>"##;
    let css = "a { color: #010101 } a:hover { color: #020202 }";
    let mut tree = parse_document(html, Arc::new(StringInterner::new()));
    let sheet = sheet_of(css);
    let mut fonts = FixedFontSource::default();
    let mut styles = apply_stylesheet(&mut tree, &sheet, &screen(), "en", &mut fonts);

    let a = find(&tree, "a");
    assert_eq!(styles.computed[&a].color, Color::rgb(1, 1, 1));
    // The hover rule is recorded as dynamic and currently inapplicable.
    let records = &styles.matched[&a];
    assert!(records.iter().any(|r| r.dynamic && !r.applied));

    // Flip the state: refresh reports the element dirty exactly once.
    tree.as_element_mut(a)
        .expect("element")
        .pseudo_states
        .insert(PseudoClassSet::HOVER);
    let dirty = refresh_dynamic(&tree, &sheet, &mut styles.matched, "en");
    assert_eq!(dirty, vec![a]);
    let again = refresh_dynamic(&tree, &sheet, &mut styles.matched, "en");
    assert!(again.is_empty());

    // Re-running the cascade now applies the hover color.
    let styles = apply_stylesheet(&mut tree, &sheet, &screen(), "en", &mut fonts);
    assert_eq!(styles.computed[&a].color, Color::rgb(2, 2, 2));
}

#[test]
fn recascade_does_not_duplicate_generated_content() {
    let html = "<p>x</p>";
    let css = "p::before { content: \"!\" }";
    let mut tree = parse_document(html, Arc::new(StringInterner::new()));
    let sheet = sheet_of(css);
    let mut fonts = FixedFontSource::default();
    let _ = apply_stylesheet(&mut tree, &sheet, &screen(), "en", &mut fonts);
    let _ = apply_stylesheet(&mut tree, &sheet, &screen(), "en", &mut fonts);
    let p = find(&tree, "p");
    assert_eq!(tree.collect_text(p), "!x");
}
