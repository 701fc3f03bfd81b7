//! Block layout: the recursive two-pass `render` algorithm.
//!
//! [CSS 2.2 § 10.3.3 Block-level, non-replaced elements in normal flow](https://www.w3.org/TR/CSS22/visudet.html#blockwidth)
//!
//! `render` positions one item's margin box at `(x, y)` relative to its
//! parent's content box, resolves its width, lays out its children
//! (dispatching per render kind), and reports the content width the item
//! actually needed — the measure the shrink-to-fit callers feed back in
//! as the second-pass available width.

use crate::style::computed::CssProperties;
use crate::style::keywords::{BoxSizing, Clear, Display, Float};
use crate::style::values::{Length, Quad, ResolveCtx};

use super::LayoutEnv;
use super::box_model::{Rect, horizontal, vertical};
use super::flex;
use super::formatting_context::FormattingContext;
use super::inline::InlineLayout;
use super::render_tree::{RenderItemId, RenderKind, RenderSource, RenderTree};
use super::table;

/// The containing block a child resolves percentages against.
#[derive(Debug, Clone, Copy)]
pub struct Containing {
    /// Content width of the containing block.
    pub width: i32,
    /// Content height, when definite (percent heights need it).
    pub height: Option<i32>,
}

/// Lay out one item.
///
/// `(x, y)` is the margin-box origin relative to the parent's content
/// box; `max_width` is the width available to the margin box. Returns
/// the content width the item needed (its shrink-to-fit measure).
pub fn render(
    tree: &mut RenderTree,
    id: RenderItemId,
    env: &LayoutEnv,
    x: i32,
    y: i32,
    max_width: i32,
    containing: Containing,
    fc: &mut FormattingContext,
    fc_origin: (i32, i32),
    second_pass: bool,
) -> i32 {
    match tree.get(id).kind {
        RenderKind::Image => render_image(tree, id, env, x, y, containing),
        RenderKind::Table => {
            table::render_table(tree, id, env, x, y, max_width, containing, second_pass)
        }
        RenderKind::Flex => {
            flex::render_flex(tree, id, env, x, y, max_width, containing, second_pass)
        }
        _ => render_block(
            tree,
            id,
            env,
            x,
            y,
            max_width,
            containing,
            fc,
            fc_origin,
            second_pass,
        ),
    }
}

/// Resolve the margin/padding/border quads of an item against its
/// containing width. Auto margins resolve to zero here; width resolution
/// distributes them afterwards.
pub fn resolve_edges(props: &CssProperties, containing_width: i32, env: &LayoutEnv) -> EdgeSet {
    let ctx = resolve_ctx(props, containing_width, env);
    let margin = |length: &Length| if length.is_auto() { 0 } else { length.to_px(&ctx) };
    EdgeSet {
        margins: Quad {
            top: margin(&props.margins.top),
            right: margin(&props.margins.right),
            bottom: margin(&props.margins.bottom),
            left: margin(&props.margins.left),
        },
        paddings: Quad {
            top: props.paddings.top.to_px(&ctx).max(0),
            right: props.paddings.right.to_px(&ctx).max(0),
            bottom: props.paddings.bottom.to_px(&ctx).max(0),
            left: props.paddings.left.to_px(&ctx).max(0),
        },
        borders: props.borders.used_widths(&ctx),
    }
}

/// The three resolved edge quads.
#[derive(Debug, Clone, Copy)]
pub struct EdgeSet {
    /// Resolved margins (auto → 0).
    pub margins: Quad<i32>,
    /// Resolved paddings.
    pub paddings: Quad<i32>,
    /// Resolved border widths.
    pub borders: Quad<i32>,
}

/// Length-resolution context for an element against a percent base.
pub fn resolve_ctx(props: &CssProperties, percent_base: i32, env: &LayoutEnv) -> ResolveCtx {
    ResolveCtx {
        font_size: props.font_size,
        x_height: props.font_metrics.x_height.max(1),
        percent_base,
        viewport_width: env.viewport.0,
        viewport_height: env.viewport.1,
    }
}

/// [§ 10.4] Clamp a tentative content width to min/max-width.
pub fn clamp_width(props: &CssProperties, width: i32, containing_width: i32, env: &LayoutEnv) -> i32 {
    let ctx = resolve_ctx(props, containing_width, env);
    let mut width = width;
    if !props.max_width.is_none() && !props.max_width.is_auto() {
        width = width.min(props.max_width.to_px(&ctx));
    }
    let min = props.min_width.to_px(&ctx);
    if min > 0 {
        width = width.max(min);
    }
    width.max(0)
}

/// [§ 10.7] Clamp a content height to min/max-height.
fn clamp_height(props: &CssProperties, height: i32, containing_height: Option<i32>, env: &LayoutEnv) -> i32 {
    let base = containing_height.unwrap_or(0);
    let ctx = resolve_ctx(props, base, env);
    let mut height = height;
    if !props.max_height.is_none() && !props.max_height.is_auto() {
        let definite = containing_height.is_some() || !props.max_height.is_percent();
        if definite {
            height = height.min(props.max_height.to_px(&ctx));
        }
    }
    let definite_min = containing_height.is_some() || !props.min_height.is_percent();
    if definite_min {
        height = height.max(props.min_height.to_px(&ctx));
    }
    height.max(0)
}

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS22/box.html#collapsing-margins)
///
/// "The resulting margin width is the maximum of the collapsing margins'
/// widths"; mixed signs add, both negative take the most negative.
pub const fn collapse_margins(a: i32, b: i32) -> i32 {
    if a >= 0 && b >= 0 {
        if a > b { a } else { b }
    } else if a < 0 && b < 0 {
        if a < b { a } else { b }
    } else {
        a + b
    }
}

/// Block and inline-context layout.
#[allow(clippy::too_many_arguments)]
fn render_block(
    tree: &mut RenderTree,
    id: RenderItemId,
    env: &LayoutEnv,
    x: i32,
    y: i32,
    max_width: i32,
    containing: Containing,
    fc: &mut FormattingContext,
    fc_origin: (i32, i32),
    second_pass: bool,
) -> i32 {
    let props = tree.get(id).props.clone();
    let mut edges = resolve_edges(&props, containing.width, env);
    let ctx = resolve_ctx(&props, containing.width, env);

    // ── Width. ────────────────────────────────────────────────────────
    let predefined_width = !props.width.is_auto();
    let mut content_width = if predefined_width {
        let mut width = props.width.to_px(&ctx);
        if props.box_sizing == BoxSizing::BorderBox {
            width -= horizontal(&edges.paddings) + horizontal(&edges.borders);
        }
        width.max(0)
    } else {
        max_width
            - horizontal(&edges.margins)
            - horizontal(&edges.paddings)
            - horizontal(&edges.borders)
    };
    content_width = clamp_width(&props, content_width, containing.width, env);

    // ── Auto margins. ─────────────────────────────────────────────────
    // [§ 10.3.3] "If both margin-left and margin-right are auto, their
    // used values are equal", centering the box; a single auto side
    // absorbs the whole remainder.
    if predefined_width && props.float == Float::None && !props.position.is_out_of_flow() {
        let free = max_width
            - content_width
            - horizontal(&edges.paddings)
            - horizontal(&edges.borders);
        let left_auto = props.margins.left.is_auto();
        let right_auto = props.margins.right.is_auto();
        if left_auto && right_auto {
            edges.margins.left = (free / 2).max(0);
            edges.margins.right = (free - free / 2).max(0);
        } else if left_auto {
            edges.margins.left = (free - edges.margins.right).max(0);
        } else if right_auto {
            edges.margins.right = (free - edges.margins.left).max(0);
        }
    }

    // ── Record geometry; children are placed inside it. ───────────────
    let content_x = x + edges.margins.left + edges.borders.left + edges.paddings.left;
    let content_y = y + edges.margins.top + edges.borders.top + edges.paddings.top;
    {
        let item = tree.get_mut(id);
        item.margins = edges.margins;
        item.paddings = edges.paddings;
        item.borders = edges.borders;
        item.pos = Rect::new(content_x, content_y, content_width, 0);
        item.lines.clear();
        item.first_baseline = None;
        item.last_baseline = None;
        item.skip = false;
    }

    // A floats holder owns a fresh context; everyone else shares the
    // parent's, with the origin advanced to this content box.
    let is_holder = tree.get(id).is_floats_holder();
    let mut own_fc = FormattingContext::new();
    let (fc_ref, child_origin): (&mut FormattingContext, (i32, i32)) = if is_holder {
        (&mut own_fc, (0, 0))
    } else {
        (
            fc,
            (fc_origin.0 + content_x, fc_origin.1 + content_y),
        )
    };

    let kind = tree.get(id).kind;
    let (content_height, ret_width) = match kind {
        RenderKind::InlineContext | RenderKind::Inline => layout_inline_children(
            tree,
            id,
            env,
            content_width,
            containing,
            fc_ref,
            child_origin,
        ),
        _ => layout_block_children(
            tree,
            id,
            env,
            content_width,
            containing,
            fc_ref,
            child_origin,
            second_pass,
        ),
    };

    // ── Height. ───────────────────────────────────────────────────────
    let mut height = content_height;
    if is_holder {
        // A block formatting context grows to contain its floats.
        height = height.max(own_fc.floats_height());
    }
    if !props.height.is_auto() {
        let definite = containing.height.is_some() || !props.height.is_percent();
        if definite {
            let hctx = resolve_ctx(&props, containing.height.unwrap_or(0), env);
            let mut set = props.height.to_px(&hctx);
            if props.box_sizing == BoxSizing::BorderBox {
                set -= vertical(&edges.paddings) + vertical(&edges.borders);
            }
            height = set.max(0);
        }
    }
    height = clamp_height(&props, height, containing.height, env);
    tree.get_mut(id).pos.height = height;

    ret_width
}

/// Lay out block-level children: margin collapsing, clearance, floats,
/// and deferral of out-of-flow boxes.
#[allow(clippy::too_many_arguments)]
fn layout_block_children(
    tree: &mut RenderTree,
    id: RenderItemId,
    env: &LayoutEnv,
    content_width: i32,
    containing: Containing,
    fc: &mut FormattingContext,
    fc_origin: (i32, i32),
    second_pass: bool,
) -> (i32, i32) {
    let children = tree.children(id);
    let child_containing = Containing {
        width: content_width,
        height: definite_child_height(tree, id, containing),
    };

    let mut cur_top = 0;
    let mut pending_margin: Option<i32> = None;
    let mut ret_width = 0;
    let parent_blocks_collapse = tree.get(id).borders.top > 0
        || tree.get(id).paddings.top > 0
        || tree.get(id).is_floats_holder();
    let mut first_in_flow = true;

    for child in children {
        let child_props = tree.get(child).props.clone();
        if child_props.display == Display::None {
            continue;
        }

        // Out-of-flow children wait for the positioned pass; the current
        // cursor is their static-position hint.
        if child_props.position.is_out_of_flow() {
            let item = tree.get_mut(child);
            item.skip = false;
            item.pos = Rect::new(0, cur_top, 0, 0);
            continue;
        }

        // [§ 9.5.2] Clearance drops the box below the relevant floats.
        if child_props.clear != Clear::None {
            let cleared = fc.clear_position(child_props.clear, cur_top + fc_origin.1);
            cur_top = cur_top.max(cleared - fc_origin.1);
            pending_margin = Some(0);
        }

        // ── Floats. ───────────────────────────────────────────────────
        if child_props.float != Float::None {
            let used = render_autofit(
                tree,
                child,
                env,
                content_width,
                child_containing,
                second_pass,
            );
            let child_item = tree.get(child);
            let margin_w = child_item.width();
            let margin_h = child_item.height();
            let _ = used;

            let placed = fc.place_float(
                child_props.float,
                margin_w,
                margin_h,
                cur_top + fc_origin.1,
                content_width + fc_origin.0,
            );
            fc.add_float(child_props.float, placed, child.0);

            // Back into parent-content coordinates; re-render at the
            // final spot so descendants' fc origins line up.
            let local_x = placed.x - fc_origin.0;
            let local_y = placed.y - fc_origin.1;
            position_margin_box(tree, child, local_x, local_y);
            ret_width = ret_width.max(local_x + margin_w);
            continue;
        }

        // ── Normal flow. ──────────────────────────────────────────────
        // First estimate with the declared margin so the child's lines
        // query floats near their final band, then settle the collapsed
        // position with the effective margin (which may have grown by a
        // hoisted descendant margin).
        let declared_top =
            resolve_margin(&child_props.margins.top, content_width, &child_props, env);
        let estimated_advance = pending_margin
            .map_or(declared_top, |previous| collapse_margins(previous, declared_top));
        let estimated_y = cur_top + estimated_advance - declared_top;

        let used = render(
            tree,
            child,
            env,
            0,
            estimated_y,
            content_width,
            child_containing,
            fc,
            fc_origin,
            second_pass,
        );

        let effective_top = tree.get(child).margins.top;
        let advance = match pending_margin {
            // [§ 8.3.1] Adjoining sibling margins collapse.
            Some(previous) => collapse_margins(previous, effective_top),
            None => {
                if first_in_flow && !parent_blocks_collapse {
                    // The first child's top margin collapses with the
                    // parent's own top margin: it escapes upward instead
                    // of pushing the child down.
                    let parent_margin = tree.get(id).margins.top;
                    tree.get_mut(id).margins.top =
                        collapse_margins(parent_margin, effective_top);
                    0
                } else {
                    effective_top
                }
            }
        };

        // Settle: the child's border box starts at cur_top + advance.
        let final_y = cur_top + advance - effective_top;
        let delta = final_y - estimated_y;
        if delta != 0 {
            tree.get_mut(child).pos.y += delta;
        }

        let child_item = tree.get(child);
        let margin_h = child_item.height();
        let bottom_margin = child_item.margins.bottom;
        let need = if child_item.props.width.is_auto() {
            used
                + horizontal(&child_item.paddings)
                + horizontal(&child_item.borders)
                + horizontal(&child_item.margins)
        } else {
            child_item.width()
        };
        ret_width = ret_width.max(need);

        cur_top += advance + (margin_h - effective_top - bottom_margin);
        pending_margin = Some(bottom_margin);
        first_in_flow = false;
    }

    // The last pending margin: collapse through the parent's bottom edge
    // when nothing separates them and the height is auto.
    let mut content_height = cur_top;
    if let Some(margin) = pending_margin {
        let parent = tree.get(id);
        let bottom_open = parent.borders.bottom == 0
            && parent.paddings.bottom == 0
            && parent.props.height.is_auto()
            && !parent.is_floats_holder();
        if bottom_open {
            let collapsed = collapse_margins(parent.margins.bottom, margin);
            tree.get_mut(id).margins.bottom = collapsed;
        } else {
            content_height += margin.max(0);
        }
    }

    // Baselines propagate from the first and last in-flow children.
    propagate_baselines(tree, id);

    (content_height.max(0), ret_width)
}

/// Place a child's margin box at `(x, y)` in parent-content coordinates
/// by shifting its already-computed position.
fn position_margin_box(tree: &mut RenderTree, id: RenderItemId, x: i32, y: i32) {
    let item = tree.get(id);
    let content_x = x + item.margins.left + item.borders.left + item.paddings.left;
    let content_y = y + item.margins.top + item.borders.top + item.paddings.top;
    let item = tree.get_mut(id);
    item.pos.x = content_x;
    item.pos.y = content_y;
}

fn resolve_margin(length: &Length, containing_width: i32, props: &CssProperties, env: &LayoutEnv) -> i32 {
    if length.is_auto() {
        0
    } else {
        length.to_px(&resolve_ctx(props, containing_width, env))
    }
}

/// Percent heights of children resolve only when this box's height is
/// definite.
fn definite_child_height(
    tree: &RenderTree,
    id: RenderItemId,
    containing: Containing,
) -> Option<i32> {
    let props = &tree.get(id).props;
    if props.height.is_auto() {
        return None;
    }
    if props.height.is_percent() {
        let base = containing.height?;
        let ctx = ResolveCtx::with_font_size(props.font_size).percent_against(base);
        return Some(props.height.to_px(&ctx));
    }
    let ctx = ResolveCtx::with_font_size(props.font_size);
    Some(props.height.to_px(&ctx))
}

/// Lay out inline-level children into line boxes.
#[allow(clippy::too_many_arguments)]
fn layout_inline_children(
    tree: &mut RenderTree,
    id: RenderItemId,
    env: &LayoutEnv,
    content_width: i32,
    containing: Containing,
    fc: &mut FormattingContext,
    fc_origin: (i32, i32),
) -> (i32, i32) {
    let props = tree.get(id).props.clone();

    // Atomic inline-level children (inline-block, images, inline
    // tables/flex) are laid out first so the line builder knows their
    // margin boxes.
    layout_atomic_children(tree, id, env, content_width, containing);

    let mut layout = InlineLayout::new(fc, fc_origin, content_width, 0, &props);
    add_inline_items(tree, id, env, &mut layout);
    let (lines, height, widest) = layout.finish(0);

    // Inline element boxes get their pos from the union of their
    // fragments (hover boxes, backgrounds).
    update_inline_bounds(tree, id, &lines);

    let item = tree.get_mut(id);
    item.first_baseline = lines.first().map(|line| line.top + line.baseline);
    item.last_baseline = lines.last().map(|line| line.top + line.baseline);
    item.lines = lines;

    (height, widest)
}

/// Recursively feed an item's inline descendants into the line builder.
fn add_inline_items(
    tree: &mut RenderTree,
    id: RenderItemId,
    env: &LayoutEnv,
    layout: &mut InlineLayout<'_>,
) {
    for child in tree.children(id) {
        let child_item = tree.get(child);
        let props = child_item.props.clone();
        if props.display == Display::None || props.position.is_out_of_flow() {
            continue;
        }
        match (child_item.kind, child_item.source) {
            (RenderKind::Inline, RenderSource::Text(_)) => {
                let text = text_of(tree, child);
                if text.is_empty() {
                    continue;
                }
                let font = props.font;
                let fonts = env.fonts;
                tree.get_mut(child).skip = false;
                layout.add_text(child, &text, &props, &|s| fonts.text_width(s, font));
            }
            (RenderKind::Inline, _) => {
                // <br> forces a break; other inline elements recurse.
                if tree.get(child).forces_line_break {
                    layout.force_break(child);
                } else {
                    add_inline_items(tree, child, env, layout);
                }
            }
            _ => {
                // Atomic inline-level box, already laid out.
                let item = tree.get(child);
                let width = item.width();
                let height = item.height();
                let baseline = item
                    .last_baseline
                    .map_or(height, |b| {
                        b + item.margins.top + item.borders.top + item.paddings.top
                    });
                layout.add_atomic(
                    child,
                    width,
                    height,
                    baseline,
                    props.vertical_align,
                    !props.white_space.allows_wrapping(),
                );
            }
        }
    }
}

/// Pre-layout every atomic inline-level descendant reachable through
/// inline chains.
fn layout_atomic_children(
    tree: &mut RenderTree,
    id: RenderItemId,
    env: &LayoutEnv,
    content_width: i32,
    containing: Containing,
) {
    for child in tree.children(id) {
        let item = tree.get(child);
        if item.props.display == Display::None || item.props.position.is_out_of_flow() {
            continue;
        }
        match item.kind {
            RenderKind::Inline if item.element().is_some() => {
                layout_atomic_children(tree, child, env, content_width, containing);
            }
            RenderKind::Inline => {}
            _ => {
                let _ = render_autofit(tree, child, env, content_width, containing, false);
            }
        }
    }
}

/// After line building, give every inline element box the union of its
/// descendants' fragments.
fn update_inline_bounds(tree: &mut RenderTree, id: RenderItemId, lines: &[super::inline::LineBox]) {
    // Collect fragment bounds per direct item id.
    let mut bounds: std::collections::HashMap<usize, Rect> = std::collections::HashMap::new();
    for line in lines {
        for fragment in &line.fragments {
            let entry = bounds.entry(fragment.item).or_insert(fragment.rect);
            *entry = entry.union(&fragment.rect);
        }
    }
    // Walk inline descendants: an element's rect is the union of its
    // children's rects.
    fn place_atomic(tree: &mut RenderTree, child: RenderItemId, margin_box: Rect) {
        let item = tree.get(child);
        let content_x = margin_box.x + item.margins.left + item.borders.left + item.paddings.left;
        let content_y = margin_box.y + item.margins.top + item.borders.top + item.paddings.top;
        let item = tree.get_mut(child);
        item.pos.x = content_x;
        item.pos.y = content_y;
    }

    fn union_of(
        tree: &mut RenderTree,
        id: RenderItemId,
        bounds: &std::collections::HashMap<usize, Rect>,
    ) -> Rect {
        let mut rect = bounds.get(&id.0).copied().unwrap_or_default();
        for child in tree.children(id) {
            if tree.get(child).kind == RenderKind::Inline {
                let child_rect = union_of(tree, child, bounds);
                rect = rect.union(&child_rect);
                tree.get_mut(child).pos = child_rect;
            } else if let Some(&child_rect) = bounds.get(&child.0) {
                rect = rect.union(&child_rect);
                place_atomic(tree, child, child_rect);
            }
        }
        rect
    }
    for child in tree.children(id) {
        if tree.get(child).kind == RenderKind::Inline && tree.get(child).element().is_some() {
            let rect = union_of(tree, child, &bounds);
            tree.get_mut(child).pos = rect;
        } else if let Some(&rect) = bounds.get(&child.0) {
            // Atomic children: the fragment rect is the margin box.
            place_atomic(tree, child, rect);
        }
    }
}

/// [§ 10.3.5 / § 10.3.7 Shrink-to-fit](https://www.w3.org/TR/CSS22/visudet.html#float-width)
///
/// "Calculation of the shrink-to-fit width is similar to calculating the
/// width of a table cell: fit the content, bounded by the available
/// width." First pass renders at the full available width and measures;
/// when the content needed less and a second pass is allowed, the item
/// is re-rendered at the measured width.
pub fn render_autofit(
    tree: &mut RenderTree,
    id: RenderItemId,
    env: &LayoutEnv,
    available: i32,
    containing: Containing,
    second_pass: bool,
) -> i32 {
    let props = tree.get(id).props.clone();
    let mut own_fc = FormattingContext::new();
    let used = render(
        tree,
        id,
        env,
        0,
        0,
        available,
        containing,
        &mut own_fc,
        (0, 0),
        second_pass,
    );

    if second_pass || !props.width.is_auto() {
        return used;
    }
    let current = tree.get(id).pos.width;
    let wanted = clamp_width(&props, used, containing.width, env);
    if wanted < current {
        let item = tree.get(id);
        let extra = horizontal(&item.margins) + horizontal(&item.paddings) + horizontal(&item.borders);
        let mut second_fc = FormattingContext::new();
        let _ = render(
            tree,
            id,
            env,
            0,
            0,
            wanted + extra,
            containing,
            &mut second_fc,
            (0, 0),
            true,
        );
    }
    used
}

/// Replaced image layout.
///
/// [§ 10.3.2 Inline, replaced elements](https://www.w3.org/TR/CSS22/visudet.html#inline-replaced-width)
///
/// "If width has a computed value of auto and the element has an
/// intrinsic width, then that intrinsic width is the used value"; a
/// single specified axis scales the other by the intrinsic ratio.
fn render_image(
    tree: &mut RenderTree,
    id: RenderItemId,
    env: &LayoutEnv,
    x: i32,
    y: i32,
    containing: Containing,
) -> i32 {
    let props = tree.get(id).props.clone();
    let edges = resolve_edges(&props, containing.width, env);
    let ctx = resolve_ctx(&props, containing.width, env);

    let src = tree.get(id).image_src.clone().unwrap_or_default();
    let (mut intrinsic_w, mut intrinsic_h) = env.image_size(&src);
    // width/height attributes act as the intrinsic size fallback.
    let (attr_w, attr_h) = tree.get(id).attr_size;
    if intrinsic_w == 0 {
        intrinsic_w = attr_w.unwrap_or(0);
    }
    if intrinsic_h == 0 {
        intrinsic_h = attr_h.unwrap_or(0);
    }

    let css_w = (!props.width.is_auto()).then(|| props.width.to_px(&ctx).max(0));
    let hctx = resolve_ctx(&props, containing.height.unwrap_or(0), env);
    let definite_h = !props.height.is_auto()
        && (containing.height.is_some() || !props.height.is_percent());
    let css_h = definite_h.then(|| props.height.to_px(&hctx).max(0));

    let (width, height) = match (css_w, css_h) {
        (Some(w), Some(h)) => (w, h),
        (Some(w), None) => {
            let h = if intrinsic_w > 0 {
                (i64::from(w) * i64::from(intrinsic_h) / i64::from(intrinsic_w)) as i32
            } else {
                intrinsic_h
            };
            (w, h)
        }
        (None, Some(h)) => {
            let w = if intrinsic_h > 0 {
                (i64::from(h) * i64::from(intrinsic_w) / i64::from(intrinsic_h)) as i32
            } else {
                intrinsic_w
            };
            (w, h)
        }
        (None, None) => (intrinsic_w, intrinsic_h),
    };
    let width = clamp_width(&props, width, containing.width, env);

    let item = tree.get_mut(id);
    item.margins = edges.margins;
    item.paddings = edges.paddings;
    item.borders = edges.borders;
    item.pos = Rect::new(
        x + edges.margins.left + edges.borders.left + edges.paddings.left,
        y + edges.margins.top + edges.borders.top + edges.paddings.top,
        width,
        height,
    );
    item.first_baseline = None;
    item.last_baseline = None;
    width
}

fn text_of(tree: &RenderTree, id: RenderItemId) -> String {
    tree.get(id).text.clone().unwrap_or_default()
}

/// Propagate first/last baselines from in-flow children of a block
/// container.
fn propagate_baselines(tree: &mut RenderTree, id: RenderItemId) {
    let children = tree.children(id);
    let mut first = None;
    let mut last = None;
    for child in children {
        let item = tree.get(child);
        if !item.in_flow() {
            continue;
        }
        if let Some(baseline) = item.first_baseline {
            let absolute = item.pos.y + baseline;
            if first.is_none() {
                first = Some(absolute);
            }
        }
        if let Some(baseline) = item.last_baseline {
            last = Some(item.pos.y + baseline);
        }
    }
    let item = tree.get_mut(id);
    item.first_baseline = first;
    item.last_baseline = last;
}
