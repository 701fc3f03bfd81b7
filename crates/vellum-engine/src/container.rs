//! The embedder callback surface.
//!
//! The engine vectors every platform service through this trait: glyph
//! measurement, drawing primitives, image and stylesheet access,
//! navigation hooks, and environment queries. The engine treats every
//! call as synchronous; a container is free to block inside one.
//!
//! Methods that are pure notifications carry no-op defaults so a
//! minimal (e.g. headless measuring) container stays small.

use vellum_css::layout::box_model::Rect;
use vellum_css::media::MediaFeatures;
use vellum_css::paint::{BorderPaint, LinearGradientPaint, ListMarker, PaintLayer};
use vellum_css::style::borders::ResolvedRadii;
use vellum_css::style::font::{FontDescription, FontHandle, FontMetrics};
use vellum_css::style::keywords::TextTransform;
use vellum_css::style::values::Color;
use vellum_dom::NodeId;

/// Opaque drawing-surface handle, passed through from
/// [`crate::Document::draw`] to every drawing callback.
pub type DrawHandle = usize;

/// Everything the engine needs from its host.
pub trait Container {
    // ── Fonts ─────────────────────────────────────────────────────────

    /// Create a font for the description, reporting its metrics. The
    /// handle is opaque to the engine and cached per document.
    fn create_font(&mut self, description: &FontDescription) -> (FontHandle, FontMetrics);

    /// Release a handle returned from [`Container::create_font`].
    fn delete_font(&mut self, font: FontHandle);

    /// Measure a text run in a created font.
    fn text_width(&self, text: &str, font: FontHandle) -> i32;

    /// Draw one text run. `pos` is the run's box in surface
    /// coordinates; `baseline` is offset from its top.
    fn draw_text(
        &mut self,
        ctx: DrawHandle,
        text: &str,
        font: FontHandle,
        color: Color,
        pos: Rect,
        baseline: i32,
    );

    // ── Units & environment ───────────────────────────────────────────

    /// Point-to-pixel conversion for the output medium.
    fn pt_to_px(&self, pt: f32) -> i32 {
        (pt * 96.0 / 72.0).round() as i32
    }

    /// Default font size in px (the `medium` anchor).
    fn default_font_size(&self) -> i32;

    /// Default font family.
    fn default_font_name(&self) -> String;

    /// The current media features snapshot (viewport, screen, color).
    fn media_features(&self) -> MediaFeatures;

    /// The document language and culture, e.g. `("en", "en-US")`.
    fn language(&self) -> (String, String) {
        (String::from("en"), String::new())
    }

    /// The visible client rectangle, for fixed positioning.
    fn client_rect(&self) -> Rect {
        let features = self.media_features();
        Rect::new(0, 0, features.width, features.height)
    }

    // ── Drawing primitives ────────────────────────────────────────────

    /// Fill a background layer with a solid color.
    fn draw_solid_fill(&mut self, ctx: DrawHandle, layer: &PaintLayer, color: Color);

    /// Draw an image background layer.
    fn draw_image(&mut self, ctx: DrawHandle, layer: &PaintLayer, src: &str, base_url: &str);

    /// Draw a linear-gradient background layer.
    fn draw_linear_gradient(
        &mut self,
        ctx: DrawHandle,
        layer: &PaintLayer,
        gradient: &LinearGradientPaint,
    );

    /// Stroke a box's borders.
    fn draw_borders(&mut self, ctx: DrawHandle, borders: &BorderPaint, pos: Rect, root: bool);

    /// Draw a list marker.
    fn draw_list_marker(&mut self, ctx: DrawHandle, marker: &ListMarker);

    /// Push a clip rectangle (with corner radii) for subsequent drawing.
    fn set_clip(&mut self, ctx: DrawHandle, pos: Rect, radii: ResolvedRadii) {
        let _ = (ctx, pos, radii);
    }

    /// Pop the innermost clip.
    fn del_clip(&mut self, ctx: DrawHandle) {
        let _ = ctx;
    }

    // ── Resources ─────────────────────────────────────────────────────

    /// Start loading an image; when `redraw_on_ready`, the embedder
    /// should repaint once it arrives.
    fn load_image(&mut self, src: &str, base_url: &str, redraw_on_ready: bool) {
        let _ = (src, base_url, redraw_on_ready);
    }

    /// Intrinsic size of an image, `(0, 0)` when unknown.
    fn image_size(&self, src: &str, base_url: &str) -> (i32, i32) {
        let _ = (src, base_url);
        (0, 0)
    }

    /// Fetch an imported stylesheet. Returns the CSS text and the base
    /// url the imported sheet's own urls resolve against.
    fn import_css(&mut self, url: &str, base_url: &str) -> Option<(String, String)> {
        let _ = (url, base_url);
        None
    }

    // ── Navigation & notifications ────────────────────────────────────

    /// `<title>` text.
    fn set_caption(&mut self, caption: &str) {
        let _ = caption;
    }

    /// `<base href>` value.
    fn set_base_url(&mut self, url: &str) {
        let _ = url;
    }

    /// A `<link>` element was seen (any rel).
    fn link(&mut self, href: &str, rel: &str) {
        let _ = (href, rel);
    }

    /// The user completed a click on an anchor.
    fn on_anchor_click(&mut self, url: &str, element: NodeId) {
        let _ = (url, element);
    }

    /// The hovered element's cursor keyword changed.
    fn set_cursor(&mut self, cursor: &str) {
        let _ = cursor;
    }

    // ── Text services ─────────────────────────────────────────────────

    /// Apply `text-transform`. The default covers ASCII; embedders with
    /// real locale tables override.
    fn transform_text(&mut self, text: &str, transform: TextTransform) -> String {
        match transform {
            TextTransform::None => text.to_string(),
            TextTransform::Uppercase => text.to_uppercase(),
            TextTransform::Lowercase => text.to_lowercase(),
            TextTransform::Capitalize => {
                let mut out = String::with_capacity(text.len());
                let mut at_word_start = true;
                for c in text.chars() {
                    if c.is_whitespace() {
                        at_word_start = true;
                        out.push(c);
                    } else if at_word_start {
                        at_word_start = false;
                        out.extend(c.to_uppercase());
                    } else {
                        out.push(c);
                    }
                }
                out
            }
        }
    }
}
