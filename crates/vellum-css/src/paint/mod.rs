//! Painting: the paint-order walk over the laid-out render tree.
//!
//! [CSS 2.2 Appendix E.2 Painting order](https://www.w3.org/TR/CSS22/zindex.html#painting-order)
//!
//! The engine rasterizes nothing. The walk emits calls on a [`Painter`]
//! — backgrounds, borders, text runs, list markers, clip pushes — in
//! back-to-front order; the embedder turns them into pixels.

use vellum_common::warn_once;

use crate::style::background::{BackgroundLayer, ImageSource};
use crate::style::borders::ResolvedRadii;
use crate::style::font::FontHandle;
use crate::style::gradient::{Gradient, resolve_stop_positions};
use crate::style::keywords::{
    BackgroundBox, Display, Float, ListStylePosition, ListStyleType, Visibility,
};
use crate::style::values::{Color, Length, ResolveCtx};

use crate::layout::box_model::Rect;
use crate::layout::inline::FragmentContent;
use crate::layout::render_tree::{RenderItemId, RenderKind, RenderTree};
use crate::layout::stacking::collect_stacking_context;

/// A background paint instruction: the resolved boxes for one layer.
#[derive(Debug, Clone)]
pub struct PaintLayer {
    /// Where the layer may paint (already intersected with the clip
    /// rectangle by the walk).
    pub clip_box: Rect,
    /// The positioning area.
    pub origin_box: Rect,
    /// Border box, for rounded clipping.
    pub border_box: Rect,
    /// Resolved corner radii of the border box.
    pub radii: ResolvedRadii,
    /// The layer's source description.
    pub layer: BackgroundLayer,
}

/// A resolved linear gradient.
#[derive(Debug, Clone)]
pub struct LinearGradientPaint {
    /// Degrees, 0 = up, 90 = right, normalized to `[0, 360)`.
    pub angle: f32,
    /// `(color, position)` pairs, positions in `0..=1` along the line.
    pub stops: Vec<(Color, f32)>,
    /// Repeating variant flag.
    pub repeating: bool,
}

/// Border drawing instruction.
#[derive(Debug, Clone)]
pub struct BorderPaint {
    /// The sides (width/style/color) with used pixel widths.
    pub borders: crate::style::borders::Borders,
    /// Used widths per side.
    pub widths: crate::style::values::Quad<i32>,
    /// Resolved radii.
    pub radii: ResolvedRadii,
}

/// List marker instruction.
#[derive(Debug, Clone)]
pub struct ListMarker {
    /// Marker glyph/number style.
    pub kind: ListStyleType,
    /// Marker image url, when `list-style-image` is set.
    pub image: Option<String>,
    /// Marker box in document coordinates.
    pub pos: Rect,
    /// Marker color (the item's text color).
    pub color: Color,
    /// 1-based index for numbered markers.
    pub index: i32,
}

/// The embedder's drawing surface.
///
/// Calls arrive in painting order (back to front). `set_clip` pushes a
/// clip rectangle (with radii) that applies until the matching
/// `del_clip`.
pub trait Painter {
    /// Fill the layer's clip box with a solid color.
    fn draw_solid_fill(&mut self, layer: &PaintLayer, color: Color);
    /// Tile/draw an image layer.
    fn draw_image(&mut self, layer: &PaintLayer, src: &str);
    /// Draw a linear gradient layer.
    fn draw_linear_gradient(&mut self, layer: &PaintLayer, gradient: &LinearGradientPaint);
    /// Stroke the borders around `border_box`.
    fn draw_borders(&mut self, borders: &BorderPaint, border_box: Rect);
    /// Draw one text run; `pos` is the run's box, `baseline` the offset
    /// from its top.
    fn draw_text(&mut self, text: &str, font: FontHandle, color: Color, pos: Rect, baseline: i32);
    /// Draw a list marker.
    fn draw_list_marker(&mut self, marker: &ListMarker);
    /// Push a clip rectangle.
    fn set_clip(&mut self, pos: Rect, radii: ResolvedRadii);
    /// Pop the innermost clip.
    fn del_clip(&mut self);
}

/// Paint the whole tree at a document offset, clipped to `clip`.
pub fn draw(tree: &RenderTree, painter: &mut dyn Painter, x: i32, y: i32, clip: Rect) {
    draw_context(tree, tree.root(), painter, x, y, clip);
}

/// One stacking context in Appendix E order.
fn draw_context(
    tree: &RenderTree,
    root: RenderItemId,
    painter: &mut dyn Painter,
    x: i32,
    y: i32,
    clip: Rect,
) {
    let context = collect_stacking_context(tree, root);

    // 1. Background and borders of the context root.
    draw_box_chrome(tree, root, painter, x, y, clip);

    // 2. Negative z-index contexts.
    for &id in &context.negative {
        draw_context(tree, id, painter, x, y, clip);
    }

    // 3–5. In-flow content: blocks, then floats, then inline content.
    let clipping = push_overflow_clip(tree, root, painter, x, y);
    draw_flow(tree, root, painter, x, y, clip);
    if clipping {
        painter.del_clip();
    }

    // 6. Zero, then positive z-index contexts.
    for &id in &context.zero {
        draw_context(tree, id, painter, x, y, clip);
    }
    for &id in &context.positive {
        draw_context(tree, id, painter, x, y, clip);
    }
}

/// Steps 3–5 for one element's subtree (non-positioned descendants
/// only).
fn draw_flow(
    tree: &RenderTree,
    parent: RenderItemId,
    painter: &mut dyn Painter,
    x: i32,
    y: i32,
    clip: Rect,
) {
    let children = tree.children(parent);

    // 3. Non-positioned block-level descendants.
    for &child in &children {
        let item = tree.get(child);
        if item.skip
            || item.props.position.is_positioned()
            || item.props.float != Float::None
            || matches!(item.kind, RenderKind::Inline)
        {
            continue;
        }
        draw_box_chrome(tree, child, painter, x, y, clip);
        let clipping = push_overflow_clip(tree, child, painter, x, y);
        draw_flow(tree, child, painter, x, y, clip);
        if clipping {
            painter.del_clip();
        }
    }

    // 4. Non-positioned floats.
    for &child in &children {
        let item = tree.get(child);
        if item.skip || item.props.position.is_positioned() || item.props.float == Float::None {
            continue;
        }
        draw_box_chrome(tree, child, painter, x, y, clip);
        draw_flow(tree, child, painter, x, y, clip);
    }

    // 5. Inline content: the element's own line boxes, plus the chrome
    // of inline element boxes (split halves paint their own edges).
    draw_lines(tree, parent, painter, x, y, clip);
    for &child in &children {
        let item = tree.get(child);
        if item.skip
            || item.props.position.is_positioned()
            || !matches!(item.kind, RenderKind::Inline)
            || item.element().is_none()
        {
            continue;
        }
        draw_box_chrome(tree, child, painter, x, y, clip);
        draw_flow(tree, child, painter, x, y, clip);
    }
}

/// Background layers, borders, and the list marker of one box.
fn draw_box_chrome(
    tree: &RenderTree,
    id: RenderItemId,
    painter: &mut dyn Painter,
    x: i32,
    y: i32,
    clip: Rect,
) {
    let item = tree.get(id);
    if item.skip || item.props.visibility != Visibility::Visible {
        return;
    }
    let props = &item.props;

    let placement = tree.placement(id).translated(x, y);
    let border_box = tree.border_box(id).translated(x, y);
    if clip.width > 0 && !border_box.intersects(&clip) && !placement.intersects(&clip) {
        return;
    }
    let padding_box = Rect::new(
        placement.x - item.paddings.left,
        placement.y - item.paddings.top,
        placement.width + item.paddings.left + item.paddings.right,
        placement.height + item.paddings.top + item.paddings.bottom,
    );
    let radii = props
        .borders
        .radii
        .calc_percents(border_box.width, border_box.height, props.font_size);

    // Backgrounds: the base color first, then image layers bottom-up
    // (CSS lists the topmost layer first).
    let background = &props.background;
    if !background.is_empty() {
        let boxed = |which: BackgroundBox| match which {
            BackgroundBox::BorderBox => border_box,
            BackgroundBox::PaddingBox => padding_box,
            BackgroundBox::ContentBox => placement,
        };
        // Base color layer: index == images.len().
        if !background.color.is_transparent() {
            if let Some(layer) = background.layer(background.images.len()) {
                let paint = PaintLayer {
                    clip_box: boxed(layer.clip),
                    origin_box: boxed(layer.origin),
                    border_box,
                    radii,
                    layer,
                };
                painter.draw_solid_fill(&paint, background.color);
            }
        }
        for index in (0..background.images.len()).rev() {
            let Some(layer) = background.layer(index) else {
                continue;
            };
            let paint = PaintLayer {
                clip_box: boxed(layer.clip),
                origin_box: boxed(layer.origin),
                border_box,
                radii,
                layer: layer.clone(),
            };
            match &layer.image {
                Some(ImageSource::Url(src)) => painter.draw_image(&paint, src),
                Some(ImageSource::Gradient(Gradient::Linear {
                    direction,
                    stops,
                    repeating,
                })) => {
                    let angle =
                        Gradient::linear_angle(*direction, paint.origin_box.width, paint.origin_box.height);
                    let line_len = gradient_line_length(angle, &paint.origin_box);
                    let positions = resolve_stop_positions(stops, line_len, props.font_size);
                    let resolved = LinearGradientPaint {
                        angle,
                        stops: stops
                            .iter()
                            .zip(positions)
                            .filter(|(stop, _)| !stop.is_hint)
                            .map(|(stop, position)| (stop.color, position))
                            .collect(),
                        repeating: *repeating,
                    };
                    painter.draw_linear_gradient(&paint, &resolved);
                }
                Some(ImageSource::Gradient(Gradient::Radial { .. })) => {
                    // Radial painting is delegated as an image-less fill
                    // of the first stop until the embedder grows a radial
                    // primitive.
                    warn_once("paint", "radial gradients painted as solid first stop");
                    if let Some(ImageSource::Gradient(Gradient::Radial { stops, .. })) =
                        &layer.image
                    {
                        if let Some(first) = stops.first() {
                            painter.draw_solid_fill(&paint, first.color);
                        }
                    }
                }
                None => {}
            }
        }
    }

    // Borders.
    let widths = item.borders;
    if widths.top > 0 || widths.right > 0 || widths.bottom > 0 || widths.left > 0 {
        painter.draw_borders(
            &BorderPaint {
                borders: props.borders,
                widths,
                radii,
            },
            border_box,
        );
    }

    // List marker.
    if props.display == Display::ListItem && props.list_style_type != ListStyleType::None {
        draw_marker(tree, id, painter, placement);
    }
}

/// Text runs and atomic placeholders from the element's line boxes.
fn draw_lines(
    tree: &RenderTree,
    id: RenderItemId,
    painter: &mut dyn Painter,
    x: i32,
    y: i32,
    clip: Rect,
) {
    let item = tree.get(id);
    if item.lines.is_empty() {
        return;
    }
    let placement = tree.placement(id).translated(x, y);

    for line in &item.lines {
        for fragment in &line.fragments {
            let FragmentContent::Text(text) = &fragment.content else {
                continue;
            };
            let owner = tree.get(RenderItemId(fragment.item));
            if owner.skip || owner.props.visibility != Visibility::Visible {
                continue;
            }
            let rect = fragment.rect.translated(placement.x, placement.y);
            if clip.width > 0 && !rect.intersects(&clip) {
                continue;
            }
            painter.draw_text(
                text,
                owner.props.font,
                owner.props.color,
                rect,
                fragment.baseline,
            );
        }
    }
}

/// A list item's marker box, outside or inside the principal box.
///
/// [CSS 2.2 § 12.5.1] Marker size scales with the font; outside markers
/// sit in the start-side margin/padding area.
fn draw_marker(tree: &RenderTree, id: RenderItemId, painter: &mut dyn Painter, placement: Rect) {
    let props = &tree.get(id).props;
    let size = (props.font_size * 2 / 5).max(3);
    let line_center = props.line_height_px.max(props.font_metrics.height) / 2;

    let x = match props.list_style_position {
        ListStylePosition::Outside => placement.x - size * 2,
        ListStylePosition::Inside => placement.x,
    };
    let marker = ListMarker {
        kind: props.list_style_type,
        image: props.list_style_image.clone(),
        pos: Rect::new(x, placement.y + line_center - size / 2, size, size),
        color: props.color,
        index: marker_index(tree, id),
    };
    painter.draw_list_marker(&marker);
}

/// 1-based position among list-item siblings, offset by the container's
/// `start` attribute for `<ol start=N>`.
fn marker_index(tree: &RenderTree, id: RenderItemId) -> i32 {
    let Some(parent) = tree.get(id).parent else {
        return 1;
    };
    let mut index = 0;
    for sibling in tree.children(parent) {
        if tree.get(sibling).props.display == Display::ListItem {
            index += 1;
        }
        if sibling == id {
            break;
        }
    }
    let start = tree.get(parent).list_start.unwrap_or(1);
    (index.max(1) - 1) + start
}

/// Push an overflow clip when the element clips its descendants.
fn push_overflow_clip(
    tree: &RenderTree,
    id: RenderItemId,
    painter: &mut dyn Painter,
    x: i32,
    y: i32,
) -> bool {
    let item = tree.get(id);
    if !item.props.overflow.clips() {
        return false;
    }
    let border_box = tree.border_box(id).translated(x, y);
    let radii = item.props.borders.radii.calc_percents(
        border_box.width,
        border_box.height,
        item.props.font_size,
    );
    painter.set_clip(border_box, radii);
    true
}

/// Length of the gradient line across a box at the given angle.
///
/// [CSS Images § 3.1] `abs(W·sin A) + abs(H·cos A)`.
fn gradient_line_length(angle: f32, origin: &Rect) -> i32 {
    let radians = angle.to_radians();
    let length = (origin.width as f32 * radians.sin()).abs()
        + (origin.height as f32 * radians.cos()).abs();
    length.round() as i32
}

/// Resolve a background layer's position against its origin box (used
/// by embedders that want the engine's interpretation of percentages).
#[must_use]
pub fn layer_position(layer: &BackgroundLayer, origin: Rect, font_size: i32) -> (i32, i32) {
    let resolve = |length: &Length, base: i32| {
        length.to_px(&ResolveCtx::with_font_size(font_size).percent_against(base))
    };
    (
        origin.x + resolve(&layer.position_x, origin.width),
        origin.y + resolve(&layer.position_y, origin.height),
    )
}
