//! Whole-pipeline tests: HTML string in, geometry and paint calls out,
//! through a deterministic test container.

use std::cell::RefCell;
use std::rc::Rc;

use vellum_engine::{
    Color, Container, Context, Document, DrawHandle, FontDescription, FontHandle, FontMetrics,
    MediaFeatures, MediaType, Rect, RenderType,
};
use vellum_css::layout::stacking;
use vellum_css::paint::{BorderPaint, LinearGradientPaint, ListMarker, PaintLayer};
use vellum_dom::NodeId;

/// What the test container records for assertions.
#[derive(Debug, Default)]
struct Log {
    text_runs: Vec<(String, Color)>,
    captions: Vec<String>,
    clicked: Vec<String>,
    cursors: Vec<String>,
    fonts_created: usize,
    fonts_deleted: usize,
}

/// Fixed-metrics container: every glyph is `size/2` wide, so layout is
/// exactly predictable.
struct TestContainer {
    log: Rc<RefCell<Log>>,
    viewport: (i32, i32),
}

impl TestContainer {
    fn new(viewport: (i32, i32)) -> (Box<dyn Container>, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        (
            Box::new(Self {
                log: Rc::clone(&log),
                viewport,
            }),
            log,
        )
    }
}

impl Container for TestContainer {
    fn create_font(&mut self, description: &FontDescription) -> (FontHandle, FontMetrics) {
        self.log.borrow_mut().fonts_created += 1;
        let size = description.size.max(1);
        (
            size as FontHandle,
            FontMetrics {
                height: size + size / 5,
                ascent: size * 4 / 5,
                descent: size / 5,
                x_height: size / 2,
            },
        )
    }

    fn delete_font(&mut self, _font: FontHandle) {
        self.log.borrow_mut().fonts_deleted += 1;
    }

    fn text_width(&self, text: &str, font: FontHandle) -> i32 {
        (font as i32 / 2) * text.chars().count() as i32
    }

    fn draw_text(
        &mut self,
        _ctx: DrawHandle,
        text: &str,
        _font: FontHandle,
        color: Color,
        _pos: Rect,
        _baseline: i32,
    ) {
        self.log.borrow_mut().text_runs.push((text.to_string(), color));
    }

    fn default_font_size(&self) -> i32 {
        16
    }

    fn default_font_name(&self) -> String {
        "serif".to_string()
    }

    fn media_features(&self) -> MediaFeatures {
        MediaFeatures {
            media_type: MediaType::Screen,
            width: self.viewport.0,
            height: self.viewport.1,
            device_width: self.viewport.0,
            device_height: self.viewport.1,
            color: 8,
            ..MediaFeatures::default()
        }
    }

    fn set_caption(&mut self, caption: &str) {
        self.log.borrow_mut().captions.push(caption.to_string());
    }

    fn on_anchor_click(&mut self, url: &str, _element: NodeId) {
        self.log.borrow_mut().clicked.push(url.to_string());
    }

    fn set_cursor(&mut self, cursor: &str) {
        self.log.borrow_mut().cursors.push(cursor.to_string());
    }

    fn draw_solid_fill(&mut self, _ctx: DrawHandle, _layer: &PaintLayer, _color: Color) {}
    fn draw_image(&mut self, _ctx: DrawHandle, _layer: &PaintLayer, _src: &str, _base: &str) {}
    fn draw_linear_gradient(
        &mut self,
        _ctx: DrawHandle,
        _layer: &PaintLayer,
        _gradient: &LinearGradientPaint,
    ) {
    }
    fn draw_borders(&mut self, _ctx: DrawHandle, _borders: &BorderPaint, _pos: Rect, _root: bool) {}
    fn draw_list_marker(&mut self, _ctx: DrawHandle, _marker: &ListMarker) {}
}

/// Display-only master so geometry asserts exactly (no default margins).
fn bare_context() -> Context {
    Context::with_master_stylesheet(
        "html, body, div, p { display: block } a, span { display: inline }",
    )
}

fn document(html: &str, context: &Context) -> (Document, Rc<RefCell<Log>>) {
    let (container, log) = TestContainer::new((800, 600));
    let document = Document::create_from_string(html, container, context, None)
        .expect("valid container");
    (document, log)
}

fn element_box(document: &Document, tag: &str) -> Rect {
    let node = document
        .dom()
        .descendants(document.dom().root())
        .find(|&id| document.dom().is_tag(id, tag))
        .unwrap_or_else(|| panic!("no <{tag}>"));
    stacking::element_boxes(document.render_tree().expect("rendered"), node)
        .first()
        .copied()
        .unwrap_or_else(|| panic!("<{tag}> produced no boxes"))
}

#[test]
fn empty_body_renders_full_width_zero_height() {
    let context = bare_context();
    let (mut document, _) = document("<!doctype html><html><body></body></html>", &context);
    let width = document.render(800, RenderType::All);
    assert_eq!(width, 800);
    assert_eq!(document.width(), 800);
    assert_eq!(document.height(), 0);
}

#[test]
fn default_master_sheet_gives_body_margins() {
    let context = Context::new();
    let (mut document, _) = document("<html><body></body></html>", &context);
    let _ = document.render(800, RenderType::All);
    // The empty body's 8px margins collapse through: 8 above + 8 below.
    assert_eq!(document.height(), 16);
}

#[test]
fn centered_block() {
    let context = bare_context();
    let (mut document, _) =
        document(r#"<div style="width:100px;margin:auto">x</div>"#, &context);
    let _ = document.render(500, RenderType::All);
    let rect = element_box(&document, "div");
    assert_eq!(rect.x, 200);
    assert_eq!(rect.width, 100);
}

#[test]
fn floats_pack_side_by_side() {
    let context = bare_context();
    let html = r#"<div style="float:left;width:50px;height:50px"></div>
                  <div style="float:left;width:50px;height:50px"></div>"#;
    let (mut document, _) = document(html, &context);
    let _ = document.render(200, RenderType::All);

    let divs: Vec<NodeId> = document
        .dom()
        .descendants(document.dom().root())
        .filter(|&id| document.dom().is_tag(id, "div"))
        .collect();
    let tree = document.render_tree().expect("rendered");
    let first = stacking::element_boxes(tree, divs[0])[0];
    let second = stacking::element_boxes(tree, divs[1])[0];
    assert_eq!((first.x, first.y), (0, 0));
    assert_eq!((second.x, second.y), (50, 0));
}

#[test]
fn flex_grow_distribution() {
    let context = bare_context();
    let html = r#"<div style="display:flex;width:300px">
                    <div style="flex:1 1 0"></div>
                    <div style="flex:2 1 0"></div>
                  </div>"#;
    let (mut document, _) = document(html, &context);
    let _ = document.render(500, RenderType::All);

    let divs: Vec<NodeId> = document
        .dom()
        .descendants(document.dom().root())
        .filter(|&id| document.dom().is_tag(id, "div"))
        .collect();
    let tree = document.render_tree().expect("rendered");
    assert_eq!(stacking::element_boxes(tree, divs[1])[0].width, 100);
    assert_eq!(stacking::element_boxes(tree, divs[2])[0].width, 200);
}

#[test]
fn table_colspan_spans_both_columns() {
    // The real master sheet supplies the table display values.
    let context = Context::new();
    let html = "<table><tr><td colspan=2>A</td></tr><tr><td>B</td><td>C</td></tr></table>";
    let (mut document, _) = document(html, &context);
    let _ = document.render(800, RenderType::All);

    let tds: Vec<NodeId> = document
        .dom()
        .descendants(document.dom().root())
        .filter(|&id| document.dom().is_tag(id, "td"))
        .collect();
    assert_eq!(tds.len(), 3);
    let tree = document.render_tree().expect("rendered");
    let a = stacking::element_boxes(tree, tds[0])[0];
    let b = stacking::element_boxes(tree, tds[1])[0];
    let c = stacking::element_boxes(tree, tds[2])[0];
    // Column count is 2: B and C split the width A spans (plus the
    // default 2px border-spacing between them).
    assert!(c.x > b.x);
    assert_eq!(a.width, b.width + c.width + 2);
}

#[test]
fn render_twice_is_identical() {
    let context = Context::new();
    let html = r#"<h1>Title</h1><p>some wrapped paragraph text for the layout</p>
                  <div style="float:left;width:40px;height:40px"></div><p>after</p>"#;
    let (mut document, _) = document(html, &context);
    let _ = document.render(300, RenderType::All);
    let first: Vec<Rect> = collect_boxes(&document);
    let _ = document.render(300, RenderType::All);
    let second: Vec<Rect> = collect_boxes(&document);
    assert_eq!(first, second);
}

fn collect_boxes(document: &Document) -> Vec<Rect> {
    let tree = document.render_tree().expect("rendered");
    document
        .dom()
        .descendants(document.dom().root())
        .filter(|&id| document.dom().as_element(id).is_some())
        .flat_map(|id| stacking::element_boxes(tree, id))
        .collect()
}

#[test]
fn title_reaches_the_container() {
    let context = Context::new();
    let (document, log) = document("<head><title>  Hello  </title></head><body></body>", &context);
    drop(document);
    assert_eq!(log.borrow().captions, vec!["Hello".to_string()]);
}

#[test]
fn hover_triggers_redraw_and_recolor() {
    let context = Context::new();
    let html = r##"<style>a { color: #010101 } a:hover { color: #ff0000 }</style>
                  <a href="#x">x</a>"##;
    let (mut document, log) = document(html, &context);
    let _ = document.render(800, RenderType::All);

    // Paint before hover: default color.
    document.draw(0, 0, 0, Rect::new(0, 0, 800, 600));
    assert!(
        log.borrow()
            .text_runs
            .iter()
            .any(|(text, color)| text == "x" && *color == Color::rgb(1, 1, 1)),
        "expected pre-hover color, got {:?}",
        log.borrow().text_runs
    );

    // Hover over the anchor's box.
    let anchor_box = element_box(&document, "a");
    let mut redraw = Vec::new();
    let changed = document.on_mouse_over(
        anchor_box.x + 1,
        anchor_box.y + 1,
        anchor_box.x + 1,
        anchor_box.y + 1,
        &mut redraw,
    );
    assert!(changed, "hover must dirty the anchor");
    assert!(!redraw.is_empty(), "redraw boxes must cover the anchor");
    assert!(
        redraw
            .iter()
            .any(|rect| rect.intersects(&anchor_box) || *rect == anchor_box),
        "redraw {redraw:?} does not cover {anchor_box:?}"
    );

    // Paint after hover: red.
    log.borrow_mut().text_runs.clear();
    document.draw(0, 0, 0, Rect::new(0, 0, 800, 600));
    assert!(
        log.borrow()
            .text_runs
            .iter()
            .any(|(text, color)| text == "x" && *color == Color::rgb(255, 0, 0))
    );

    // And the pointer cursor was reported.
    assert!(log.borrow().cursors.iter().any(|c| c == "pointer"));

    // Leaving restores the original color.
    let mut redraw = Vec::new();
    assert!(document.on_mouse_leave(&mut redraw));
    log.borrow_mut().text_runs.clear();
    document.draw(0, 0, 0, Rect::new(0, 0, 800, 600));
    assert!(
        log.borrow()
            .text_runs
            .iter()
            .any(|(text, color)| text == "x" && *color == Color::rgb(1, 1, 1))
    );
}

#[test]
fn click_completes_on_the_anchor() {
    let context = Context::new();
    let html = r#"<a href="/target">go</a>"#;
    let (mut document, log) = document(html, &context);
    let _ = document.render(800, RenderType::All);
    let anchor_box = element_box(&document, "a");

    let mut redraw = Vec::new();
    let _ = document.on_lbutton_down(
        anchor_box.x + 1,
        anchor_box.y + 1,
        0,
        0,
        &mut redraw,
    );
    let _ = document.on_lbutton_up(anchor_box.x + 1, anchor_box.y + 1, 0, 0, &mut redraw);
    assert_eq!(log.borrow().clicked, vec!["/target".to_string()]);

    // Press and release on different elements is not a click.
    let _ = document.on_lbutton_down(anchor_box.x + 1, anchor_box.y + 1, 0, 0, &mut redraw);
    let _ = document.on_lbutton_up(700, 500, 0, 0, &mut redraw);
    assert_eq!(log.borrow().clicked.len(), 1);
}

#[test]
fn media_change_reevaluates_queries() {
    let context = Context::new();
    let html = r#"<style>
                    p { width: 100px }
                    @media (max-width: 400px) { p { width: 50px } }
                  </style><p>x</p>"#;
    let (container, _log) = TestContainer::new((800, 600));
    let mut document =
        Document::create_from_string(html, container, &context, None).expect("container");
    let _ = document.render(800, RenderType::All);
    assert_eq!(element_box(&document, "p").width, 100);

    // Same features → no change reported.
    assert!(!document.media_changed());
}

#[test]
fn fonts_are_released_on_drop() {
    let context = Context::new();
    let html = "<p>a<b>b</b><i>c</i></p>";
    let (document, log) = document(html, &context);
    drop(document);
    let log = log.borrow();
    assert!(log.fonts_created > 0);
    assert_eq!(log.fonts_created, log.fonts_deleted);
}

#[test]
fn user_stylesheet_overrides_master() {
    let context = Context::new();
    let (container, _log) = TestContainer::new((800, 600));
    let mut document = Document::create_from_string(
        "<body><p>x</p></body>",
        container,
        &context,
        Some("body { margin: 0 } p { margin: 0 }"),
    )
    .expect("container");
    let _ = document.render(800, RenderType::All);
    // With margins zeroed by the user sheet, the paragraph starts at 0.
    let rect = element_box(&document, "p");
    assert_eq!((rect.x, rect.y), (0, 0));
}

#[test]
fn negative_render_width_is_clamped() {
    let context = bare_context();
    let (mut document, _) = document("<p>x</p>", &context);
    let width = document.render(-5, RenderType::All);
    assert_eq!(width, 0);
}
