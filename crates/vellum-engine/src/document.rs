//! The document: parse → cascade → layout → paint, plus input events.
//!
//! A `Document` owns its container, its element tree, the ingested
//! stylesheet, the computed styles, and the geometry tree from the last
//! `render`. All entry points assume exclusive access; the engine never
//! spawns threads and performs no I/O of its own.

use std::collections::HashMap;

use thiserror::Error;

use vellum_common::clear_warnings;
use vellum_css::cascade::{self, ElementStyles};
use vellum_css::layout::box_model::Rect;
use vellum_css::layout::formatting_context::FormattingContext;
use vellum_css::layout::positioned::{self, PositionFilter};
use vellum_css::layout::render_tree::{RenderItemId, RenderKind, RenderTree};
use vellum_css::layout::{LayoutEnv, block, stacking};
use vellum_css::media::MediaFeatures;
use vellum_css::paint::{self, BorderPaint, LinearGradientPaint, ListMarker, PaintLayer, Painter};
use vellum_css::parser::{CssParser, Stylesheet};
use vellum_css::style::borders::ResolvedRadii;
use vellum_css::style::font::{FontDescription, FontHandle, FontMetrics, FontSource};
use vellum_css::style::keywords::TextTransform;
use vellum_css::style::values::Color;
use vellum_css::tokenizer::CssTokenizer;
use vellum_dom::{DomTree, NodeId, PseudoClassSet};
use vellum_html::parse_document;

use crate::container::{Container, DrawHandle};
use crate::context::Context;

/// How much of the tree a [`Document::render`] call refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderType {
    /// Full layout.
    #[default]
    All,
    /// Full layout, leaving `position: fixed` boxes untouched.
    NoFixed,
    /// Reposition only `position: fixed` boxes (viewport scrolled or
    /// resized without content changes).
    FixedOnly,
}

/// Construction failures. Parsing never fails — these cover programmer
/// errors only.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The container reported an unusable environment (non-positive
    /// default font size or viewport).
    #[error("container reported an unusable environment: {0}")]
    InvalidContainer(String),
}

/// Imports may nest; past this depth the engine stops following them.
const MAX_IMPORT_DEPTH: usize = 8;

/// A parsed, styled document ready to lay out and paint.
pub struct Document {
    container: Box<dyn Container>,
    context: Context,
    dom: DomTree,
    sheet: Stylesheet,
    styles: ElementStyles,
    render_tree: Option<RenderTree>,
    font_cache: HashMap<FontDescription, (FontHandle, FontMetrics)>,
    image_sizes: HashMap<String, (i32, i32)>,
    base_url: String,
    lang: String,
    features: MediaFeatures,
    last_max_width: i32,
    size: (i32, i32),
    hovered: Vec<NodeId>,
    pressed: Option<NodeId>,
}

impl Document {
    /// Parse an HTML string into a styled document.
    ///
    /// The container supplies fonts and media features immediately;
    /// stylesheet imports and `<link rel=stylesheet>` are resolved
    /// through it during construction.
    ///
    /// # Errors
    /// [`DocumentError::InvalidContainer`] when the container's
    /// environment answers are unusable. Malformed HTML or CSS is never
    /// an error.
    pub fn create_from_string(
        html: &str,
        container: Box<dyn Container>,
        context: &Context,
        user_stylesheet: Option<&str>,
    ) -> Result<Self, DocumentError> {
        if container.default_font_size() <= 0 {
            return Err(DocumentError::InvalidContainer(
                "default font size must be positive".to_string(),
            ));
        }
        clear_warnings();

        let mut document = Self {
            container,
            context: context.clone(),
            dom: parse_document(html, std::sync::Arc::clone(context.interner())),
            sheet: Stylesheet::new(),
            styles: ElementStyles::default(),
            render_tree: None,
            font_cache: HashMap::new(),
            image_sizes: HashMap::new(),
            base_url: String::new(),
            lang: String::new(),
            features: MediaFeatures::default(),
            last_max_width: 0,
            size: (0, 0),
            hovered: Vec::new(),
            pressed: None,
        };

        document.features = document.container.media_features();
        document.lang = document.container.language().0;

        document.process_head();
        document.mark_links();
        document.build_stylesheet(user_stylesheet);
        document.apply_styles();

        Ok(document)
    }

    /// Give the container back (releasing cached fonts first).
    #[must_use]
    pub fn into_container(mut self) -> Box<dyn Container> {
        for (_, (handle, _)) in self.font_cache.drain() {
            self.container.delete_font(handle);
        }
        // Drop must not double-free what we just released.
        self.font_cache = HashMap::new();
        let container = std::mem::replace(&mut self.container, Box::new(NullContainer));
        drop(self);
        container
    }

    // ── Construction steps ────────────────────────────────────────────

    /// `<title>`, `<base>`, and `<link>` notifications.
    fn process_head(&mut self) {
        let ids: Vec<NodeId> = self.dom.descendants(self.dom.root()).collect();
        for id in ids {
            if self.dom.is_tag(id, "title") {
                let caption = self.dom.collect_text(id);
                self.container.set_caption(caption.trim());
            } else if self.dom.is_tag(id, "base") {
                if let Some(href) = self.dom.as_element(id).and_then(|e| e.attr("href")) {
                    self.base_url = href.to_string();
                    let href = href.to_string();
                    self.container.set_base_url(&href);
                }
            } else if self.dom.is_tag(id, "link") {
                let (href, rel) = self
                    .dom
                    .as_element(id)
                    .map(|e| {
                        (
                            e.attr("href").unwrap_or_default().to_string(),
                            e.attr("rel").unwrap_or_default().to_ascii_lowercase(),
                        )
                    })
                    .unwrap_or_default();
                if !href.is_empty() {
                    self.container.link(&href, &rel);
                }
            }
        }
    }

    /// `:link` state for anchors with an href.
    fn mark_links(&mut self) {
        let ids: Vec<NodeId> = self.dom.descendants(self.dom.root()).collect();
        for id in ids {
            let is_link = (self.dom.is_tag(id, "a") || self.dom.is_tag(id, "area"))
                && self.dom.as_element(id).is_some_and(|e| e.attr("href").is_some());
            if is_link {
                if let Some(element) = self.dom.as_element_mut(id) {
                    element.pseudo_states.insert(PseudoClassSet::LINK);
                }
            }
        }
    }

    /// Master sheet, user sheet, then in-document sheets in tree order;
    /// imports resolved through the container as they are discovered.
    fn build_stylesheet(&mut self, user_stylesheet: Option<&str>) {
        let master = self.context.master_css().to_string();
        ingest_css(&mut self.sheet, &master, None);
        if let Some(user) = user_stylesheet {
            ingest_css(&mut self.sheet, user, None);
        }

        let ids: Vec<NodeId> = self.dom.descendants(self.dom.root()).collect();
        for id in ids {
            if self.dom.is_tag(id, "style") {
                let css = self.dom.collect_text(id);
                ingest_css(&mut self.sheet, &css, None);
            } else if self.dom.is_tag(id, "link") {
                let (href, rel) = self
                    .dom
                    .as_element(id)
                    .map(|e| {
                        (
                            e.attr("href").unwrap_or_default().to_string(),
                            e.attr("rel").unwrap_or_default().to_ascii_lowercase(),
                        )
                    })
                    .unwrap_or_default();
                if rel == "stylesheet" && !href.is_empty() {
                    if let Some((css, new_base)) =
                        self.container.import_css(&href, &self.base_url)
                    {
                        let _ = new_base;
                        ingest_css(&mut self.sheet, &css, None);
                    }
                }
            }
        }

        // [@import] The imported sheet inherits the importing context's
        // base url and media scope; nested imports bound by depth.
        let mut resolved = 0;
        for _ in 0..MAX_IMPORT_DEPTH {
            let pending: Vec<_> = self.sheet.imports[resolved..].to_vec();
            if pending.is_empty() {
                break;
            }
            resolved = self.sheet.imports.len();
            for import in pending {
                if let Some((css, _base)) =
                    self.container.import_css(&import.url, &self.base_url)
                {
                    let media = self.sheet.media_scope_of_import(&import);
                    ingest_css(&mut self.sheet, &css, media);
                }
            }
        }

        self.sheet.sort();
    }

    /// Run the cascade over the whole tree.
    fn apply_styles(&mut self) {
        let mut fonts = CachedFonts {
            container: self.container.as_mut(),
            cache: &mut self.font_cache,
        };
        self.styles = cascade::apply_stylesheet(
            &mut self.dom,
            &self.sheet,
            &self.features,
            &self.lang,
            &mut fonts,
        );
        self.render_tree = None;
    }

    // ── Layout ────────────────────────────────────────────────────────

    /// Lay the document out at `max_width`. Returns the document width.
    ///
    /// Negative widths are clamped to zero (and warned about); layout
    /// itself always runs to completion.
    pub fn render(&mut self, max_width: i32, render_type: RenderType) -> i32 {
        if max_width < 0 {
            vellum_common::warn_once("engine", "render() called with a negative max_width");
        }
        let max_width = max_width.max(0);
        self.last_max_width = max_width;

        if render_type == RenderType::FixedOnly && self.render_tree.is_some() {
            self.reposition(PositionFilter::FixedOnly);
            return self.size.0;
        }

        // Fresh geometry tree from the styled DOM.
        let Some(mut tree) = RenderTree::build(&self.dom, &self.styles.computed) else {
            self.size = (0, 0);
            return 0;
        };
        self.apply_text_transforms(&mut tree);
        self.collect_image_sizes(&tree);

        let viewport = (self.features.width, self.features.height);
        let fonts = MeasuringFonts {
            container: self.container.as_ref(),
        };
        let env = LayoutEnv {
            fonts: &fonts,
            viewport,
            image_sizes: &self.image_sizes,
        };

        let mut fc = FormattingContext::new();
        let root = tree.root();
        let _ = block::render(
            &mut tree,
            root,
            &env,
            0,
            0,
            max_width,
            block::Containing {
                width: max_width,
                height: Some(viewport.1),
            },
            &mut fc,
            (0, 0),
            false,
        );

        let filter = match render_type {
            RenderType::NoFixed => PositionFilter::SkipFixed,
            RenderType::All | RenderType::FixedOnly => PositionFilter::All,
        };
        positioned::apply_positioning(
            &mut tree,
            &env,
            Rect::new(0, 0, viewport.0, viewport.1),
            filter,
        );

        let root_item = tree.get(root);
        self.size = (root_item.width(), root_item.height());
        self.render_tree = Some(tree);
        self.size.0
    }

    fn reposition(&mut self, filter: PositionFilter) {
        let viewport = (self.features.width, self.features.height);
        let fonts = MeasuringFonts {
            container: self.container.as_ref(),
        };
        let env = LayoutEnv {
            fonts: &fonts,
            viewport,
            image_sizes: &self.image_sizes,
        };
        if let Some(tree) = self.render_tree.as_mut() {
            positioned::apply_positioning(
                tree,
                &env,
                Rect::new(0, 0, viewport.0, viewport.1),
                filter,
            );
        }
    }

    /// Route text runs through the container's `transform_text`.
    fn apply_text_transforms(&mut self, tree: &mut RenderTree) {
        for index in 0..tree.len() {
            let id = RenderItemId(index);
            let transform = tree.get(id).props.text_transform;
            if transform == TextTransform::None {
                continue;
            }
            if let Some(text) = tree.get(id).text.clone() {
                let transformed = self.container.transform_text(&text, transform);
                tree.get_mut(id).text = Some(transformed);
            }
        }
    }

    /// Ask the container for every image's intrinsic size and start its
    /// load.
    fn collect_image_sizes(&mut self, tree: &RenderTree) {
        for index in 0..tree.len() {
            let item = tree.get(RenderItemId(index));
            if item.kind != RenderKind::Image {
                continue;
            }
            let Some(src) = item.image_src.clone() else {
                continue;
            };
            if self.image_sizes.contains_key(&src) {
                continue;
            }
            self.container.load_image(&src, &self.base_url, true);
            let size = self.container.image_size(&src, &self.base_url);
            let _ = self.image_sizes.insert(src, size);
        }
    }

    /// The element tree (for embedder introspection).
    #[must_use]
    pub fn dom(&self) -> &DomTree {
        &self.dom
    }

    /// The geometry tree from the last `render`, if any.
    #[must_use]
    pub fn render_tree(&self) -> Option<&RenderTree> {
        self.render_tree.as_ref()
    }

    /// Rendered document width.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.size.0
    }

    /// Rendered document height.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.size.1
    }

    // ── Painting ──────────────────────────────────────────────────────

    /// Paint the document at `(x, y)` on the surface behind `ctx`,
    /// clipped to `clip`.
    pub fn draw(&mut self, ctx: DrawHandle, x: i32, y: i32, clip: Rect) {
        let Some(tree) = self.render_tree.as_ref() else {
            return;
        };
        let mut painter = ContainerPainter {
            container: self.container.as_mut(),
            ctx,
            base_url: &self.base_url,
        };
        paint::draw(tree, &mut painter, x, y, clip);
    }

    // ── Input events ──────────────────────────────────────────────────

    /// Pointer moved to `(x, y)` in document coordinates. Returns true
    /// when something needs repainting; the changed boxes are appended
    /// to `redraw_boxes`.
    pub fn on_mouse_over(
        &mut self,
        x: i32,
        y: i32,
        _client_x: i32,
        _client_y: i32,
        redraw_boxes: &mut Vec<Rect>,
    ) -> bool {
        let target = self.hit_element(x, y);
        let chain = self.element_chain(target);
        if chain == self.hovered {
            return false;
        }

        for &id in &self.hovered {
            if let Some(element) = self.dom.as_element_mut(id) {
                element.pseudo_states.remove(PseudoClassSet::HOVER);
            }
        }
        for &id in &chain {
            if let Some(element) = self.dom.as_element_mut(id) {
                element.pseudo_states.insert(PseudoClassSet::HOVER);
            }
        }
        self.hovered = chain;

        // Cursor from the innermost hovered element.
        let cursor = self
            .hovered
            .first()
            .and_then(|id| self.styles.computed.get(id))
            .map_or_else(|| "auto".to_string(), |props| props.cursor.as_str().to_string());
        self.container.set_cursor(&cursor);

        self.refresh_after_state_change(redraw_boxes)
    }

    /// Pointer left the document.
    pub fn on_mouse_leave(&mut self, redraw_boxes: &mut Vec<Rect>) -> bool {
        if self.hovered.is_empty() && self.pressed.is_none() {
            return false;
        }
        for &id in &self.hovered {
            if let Some(element) = self.dom.as_element_mut(id) {
                element.pseudo_states.remove(PseudoClassSet::HOVER);
                element.pseudo_states.remove(PseudoClassSet::ACTIVE);
            }
        }
        self.hovered.clear();
        self.pressed = None;
        self.refresh_after_state_change(redraw_boxes)
    }

    /// Primary button pressed.
    pub fn on_lbutton_down(
        &mut self,
        x: i32,
        y: i32,
        _client_x: i32,
        _client_y: i32,
        redraw_boxes: &mut Vec<Rect>,
    ) -> bool {
        let target = self.hit_element(x, y);
        self.pressed = target;
        let chain = self.element_chain(target);
        for &id in &chain {
            if let Some(element) = self.dom.as_element_mut(id) {
                element.pseudo_states.insert(PseudoClassSet::ACTIVE);
            }
        }
        self.refresh_after_state_change(redraw_boxes)
    }

    /// Primary button released; completes anchor clicks.
    pub fn on_lbutton_up(
        &mut self,
        x: i32,
        y: i32,
        _client_x: i32,
        _client_y: i32,
        redraw_boxes: &mut Vec<Rect>,
    ) -> bool {
        let target = self.hit_element(x, y);

        // A click is a press and release over the same element.
        if let (Some(pressed), Some(released)) = (self.pressed, target) {
            if pressed == released {
                if let Some((anchor, href)) = self.anchor_of(released) {
                    self.container.on_anchor_click(&href, anchor);
                }
            }
        }
        self.pressed = None;

        let ids: Vec<NodeId> = self.dom.descendants(self.dom.root()).collect();
        for id in ids {
            if let Some(element) = self.dom.as_element_mut(id) {
                element.pseudo_states.remove(PseudoClassSet::ACTIVE);
            }
        }
        self.refresh_after_state_change(redraw_boxes)
    }

    /// The media features changed (resize, print, dark mode). Returns
    /// true when styles changed and the document was re-rendered.
    pub fn media_changed(&mut self) -> bool {
        let fresh = self.container.media_features();
        if fresh == self.features {
            return false;
        }
        self.features = fresh;
        self.apply_styles();
        let _ = self.render(self.last_max_width, RenderType::All);
        true
    }

    /// The document language changed.
    pub fn lang_changed(&mut self) -> bool {
        let fresh = self.container.language().0;
        if fresh == self.lang {
            return false;
        }
        self.lang = fresh;
        self.apply_styles();
        let _ = self.render(self.last_max_width, RenderType::All);
        true
    }

    // ── Internals ─────────────────────────────────────────────────────

    /// Re-evaluate state-dependent rules; when any element's applied set
    /// changed, collect its boxes, re-cascade, re-layout, and collect
    /// the new boxes too.
    fn refresh_after_state_change(&mut self, redraw_boxes: &mut Vec<Rect>) -> bool {
        let dirty = cascade::refresh_dynamic(
            &self.dom,
            &self.sheet,
            &mut self.styles.matched,
            &self.lang,
        );
        if dirty.is_empty() {
            return false;
        }

        if let Some(tree) = self.render_tree.as_ref() {
            for &id in &dirty {
                redraw_boxes.extend(stacking::element_boxes(tree, id));
            }
        }

        self.apply_styles();
        let _ = self.render(self.last_max_width, RenderType::All);

        if let Some(tree) = self.render_tree.as_ref() {
            for &id in &dirty {
                redraw_boxes.extend(stacking::element_boxes(tree, id));
            }
        }
        true
    }

    /// The element under a document-space point.
    fn hit_element(&self, x: i32, y: i32) -> Option<NodeId> {
        let tree = self.render_tree.as_ref()?;
        let item = stacking::hit_test(tree, x, y)?;
        tree.get(item).element()
    }

    /// The element plus its element ancestors, innermost first.
    fn element_chain(&self, target: Option<NodeId>) -> Vec<NodeId> {
        let Some(target) = target else {
            return Vec::new();
        };
        let mut chain = vec![target];
        chain.extend(
            self.dom
                .ancestors(target)
                .filter(|&id| self.dom.as_element(id).is_some()),
        );
        chain
    }

    /// The nearest enclosing anchor with an href.
    fn anchor_of(&self, target: NodeId) -> Option<(NodeId, String)> {
        std::iter::once(target)
            .chain(self.dom.ancestors(target))
            .find_map(|id| {
                if !self.dom.is_tag(id, "a") {
                    return None;
                }
                let href = self.dom.as_element(id)?.attr("href")?.to_string();
                Some((id, href))
            })
    }
}

impl Drop for Document {
    fn drop(&mut self) {
        // Every cached font goes back to the container.
        for (_, (handle, _)) in self.font_cache.drain() {
            self.container.delete_font(handle);
        }
    }
}

/// Tokenize-and-parse one CSS chunk into the sheet under a media scope.
fn ingest_css(sheet: &mut Stylesheet, css: &str, media: Option<usize>) {
    if css.trim().is_empty() {
        return;
    }
    let mut tokenizer = CssTokenizer::new(css);
    tokenizer.run();
    CssParser::new(tokenizer.into_tokens()).parse_into(sheet, media);
}

/// Cascade-time font source: creates through the container, caching per
/// description so a document never requests the same face twice.
struct CachedFonts<'a> {
    container: &'a mut dyn Container,
    cache: &'a mut HashMap<FontDescription, (FontHandle, FontMetrics)>,
}

impl FontSource for CachedFonts<'_> {
    fn font(&mut self, description: &FontDescription) -> (FontHandle, FontMetrics) {
        if let Some(&cached) = self.cache.get(description) {
            return cached;
        }
        let created = self.container.create_font(description);
        let _ = self.cache.insert(description.clone(), created);
        created
    }

    fn text_width(&self, text: &str, font: FontHandle) -> i32 {
        self.container.text_width(text, font)
    }

    fn default_font_size(&self) -> i32 {
        self.container.default_font_size()
    }

    fn default_font_family(&self) -> String {
        self.container.default_font_name()
    }
}

/// Layout-time font source: measurement only; every font already exists
/// from the cascade.
struct MeasuringFonts<'a> {
    container: &'a dyn Container,
}

impl FontSource for MeasuringFonts<'_> {
    fn font(&mut self, description: &FontDescription) -> (FontHandle, FontMetrics) {
        // Layout never creates fonts; the cascade did. Answer with a
        // size-derived stand-in rather than touching the container.
        vellum_common::warn_once("engine", "font requested during layout");
        let size = description.size.max(1);
        (
            0,
            FontMetrics {
                height: size + size / 5,
                ascent: size * 4 / 5,
                descent: size / 5,
                x_height: size / 2,
            },
        )
    }

    fn text_width(&self, text: &str, font: FontHandle) -> i32 {
        self.container.text_width(text, font)
    }

    fn default_font_size(&self) -> i32 {
        self.container.default_font_size()
    }

    fn default_font_family(&self) -> String {
        self.container.default_font_name()
    }
}

/// Painter over the container's drawing callbacks.
struct ContainerPainter<'a> {
    container: &'a mut dyn Container,
    ctx: DrawHandle,
    base_url: &'a str,
}

impl Painter for ContainerPainter<'_> {
    fn draw_solid_fill(&mut self, layer: &PaintLayer, color: Color) {
        self.container.draw_solid_fill(self.ctx, layer, color);
    }

    fn draw_image(&mut self, layer: &PaintLayer, src: &str) {
        self.container.draw_image(self.ctx, layer, src, self.base_url);
    }

    fn draw_linear_gradient(&mut self, layer: &PaintLayer, gradient: &LinearGradientPaint) {
        self.container.draw_linear_gradient(self.ctx, layer, gradient);
    }

    fn draw_borders(&mut self, borders: &BorderPaint, border_box: Rect) {
        self.container.draw_borders(self.ctx, borders, border_box, false);
    }

    fn draw_text(&mut self, text: &str, font: FontHandle, color: Color, pos: Rect, baseline: i32) {
        self.container.draw_text(self.ctx, text, font, color, pos, baseline);
    }

    fn draw_list_marker(&mut self, marker: &ListMarker) {
        self.container.draw_list_marker(self.ctx, marker);
    }

    fn set_clip(&mut self, pos: Rect, radii: ResolvedRadii) {
        self.container.set_clip(self.ctx, pos, radii);
    }

    fn del_clip(&mut self) {
        self.container.del_clip(self.ctx);
    }
}

/// Stand-in container used only while tearing a document down in
/// [`Document::into_container`].
struct NullContainer;

impl Container for NullContainer {
    fn create_font(&mut self, description: &FontDescription) -> (FontHandle, FontMetrics) {
        let _ = description;
        (0, FontMetrics::default())
    }
    fn delete_font(&mut self, _font: FontHandle) {}
    fn text_width(&self, _text: &str, _font: FontHandle) -> i32 {
        0
    }
    fn draw_text(
        &mut self,
        _ctx: DrawHandle,
        _text: &str,
        _font: FontHandle,
        _color: Color,
        _pos: Rect,
        _baseline: i32,
    ) {
    }
    fn default_font_size(&self) -> i32 {
        16
    }
    fn default_font_name(&self) -> String {
        String::new()
    }
    fn media_features(&self) -> MediaFeatures {
        MediaFeatures::default()
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
