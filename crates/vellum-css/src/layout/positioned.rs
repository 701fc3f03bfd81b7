//! Positioned boxes: relative shifts and absolute/fixed placement.
//!
//! [CSS 2.2 § 9.3 Positioning schemes](https://www.w3.org/TR/CSS22/visuren.html#positioning-scheme)
//!
//! Runs after normal flow. Relative boxes are shifted from their flow
//! position; absolute boxes resolve against the padding box of the
//! nearest positioned ancestor; fixed boxes against the viewport.
//! Offset resolution follows § 10.3.7/10.6.4: both opposing offsets with
//! an auto size span the gap, one offset anchors that side, no offsets
//! leave the box at its static position.

use crate::style::keywords::Position;

use super::LayoutEnv;
use super::block::{Containing, render_autofit, resolve_ctx};
use super::box_model::Rect;
use super::render_tree::{RenderItemId, RenderTree};

/// Which positioned boxes a pass touches — the render entry points can
/// run the flow layout once and refresh only the viewport-anchored
/// boxes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFilter {
    /// Everything.
    All,
    /// Skip `position: fixed` boxes.
    SkipFixed,
    /// Only `position: fixed` boxes.
    FixedOnly,
}

/// Place every positioned descendant. `viewport` is the fixed-position
/// containing block in document coordinates.
pub fn apply_positioning(
    tree: &mut RenderTree,
    env: &LayoutEnv,
    viewport: Rect,
    filter: PositionFilter,
) {
    let count = tree.len();
    for index in 0..count {
        let id = RenderItemId(index);
        let position = tree.get(id).props.position;
        let wanted = match position {
            Position::Fixed => filter != PositionFilter::SkipFixed,
            Position::Relative | Position::Absolute => filter != PositionFilter::FixedOnly,
            Position::Static => false,
        };
        if !wanted {
            continue;
        }
        match position {
            Position::Relative => shift_relative(tree, id, env),
            Position::Absolute | Position::Fixed => place_out_of_flow(tree, id, env, viewport),
            Position::Static => {}
        }
    }
}

/// [§ 9.4.3 Relative positioning](https://www.w3.org/TR/CSS22/visuren.html#relative-positioning)
///
/// "Once a box has been laid out according to the normal flow, it may be
/// shifted relative to this position." Left wins over right, top over
/// bottom; the shift moves nothing else.
fn shift_relative(tree: &mut RenderTree, id: RenderItemId, env: &LayoutEnv) {
    let props = tree.get(id).props.clone();
    let base_width = tree
        .get(id)
        .parent
        .map_or(0, |parent| tree.get(parent).pos.width);
    let ctx = resolve_ctx(&props, base_width, env);

    let dx = if !props.offsets.left.is_auto() {
        props.offsets.left.to_px(&ctx)
    } else if !props.offsets.right.is_auto() {
        -props.offsets.right.to_px(&ctx)
    } else {
        0
    };
    let dy = if !props.offsets.top.is_auto() {
        props.offsets.top.to_px(&ctx)
    } else if !props.offsets.bottom.is_auto() {
        -props.offsets.bottom.to_px(&ctx)
    } else {
        0
    };

    let item = tree.get_mut(id);
    item.pos.x += dx;
    item.pos.y += dy;
}

/// [§ 10.3.7 Absolutely positioned, non-replaced elements](https://www.w3.org/TR/CSS22/visudet.html#abs-non-replaced-width)
fn place_out_of_flow(tree: &mut RenderTree, id: RenderItemId, env: &LayoutEnv, viewport: Rect) {
    let props = tree.get(id).props.clone();

    // The static position hint was recorded while the parent laid out
    // its in-flow children.
    let static_hint = tree.get(id).pos;

    // Containing block in document coordinates.
    let cb = if props.position == Position::Fixed {
        viewport
    } else {
        containing_block_of(tree, id, viewport)
    };

    let wctx = resolve_ctx(&props, cb.width, env);
    let hctx = resolve_ctx(&props, cb.height, env);
    let left = (!props.offsets.left.is_auto()).then(|| props.offsets.left.to_px(&wctx));
    let right = (!props.offsets.right.is_auto()).then(|| props.offsets.right.to_px(&wctx));
    let top = (!props.offsets.top.is_auto()).then(|| props.offsets.top.to_px(&hctx));
    let bottom = (!props.offsets.bottom.is_auto()).then(|| props.offsets.bottom.to_px(&hctx));

    // First layout: shrink-to-fit inside the containing block, unless
    // both horizontal offsets pin the width.
    let containing = Containing {
        width: cb.width,
        height: Some(cb.height),
    };
    let pinned_width = props.width.is_auto() && left.is_some() && right.is_some();
    if pinned_width {
        // [§ 10.3.7] "left + margins + borders + paddings + width +
        // ... + right = width of containing block" — solve for width.
        let available = cb.width - left.unwrap_or(0) - right.unwrap_or(0);
        let mut fc = super::formatting_context::FormattingContext::new();
        let _ = super::block::render(
            tree,
            id,
            env,
            0,
            0,
            available.max(0),
            containing,
            &mut fc,
            (0, 0),
            true,
        );
        // Stretch to fill the span exactly.
        let item = tree.get(id);
        let chrome = item.margins.left
            + item.margins.right
            + item.borders.left
            + item.borders.right
            + item.paddings.left
            + item.paddings.right;
        tree.get_mut(id).pos.width = (available - chrome).max(0);
    } else {
        let _ = render_autofit(tree, id, env, cb.width, containing, false);
    }

    // Vertical span: both offsets with auto height stretch the box.
    if props.height.is_auto() && top.is_some() && bottom.is_some() {
        let item = tree.get(id);
        let chrome = item.margins.top
            + item.margins.bottom
            + item.borders.top
            + item.borders.bottom
            + item.paddings.top
            + item.paddings.bottom;
        let span = cb.height - top.unwrap_or(0) - bottom.unwrap_or(0) - chrome;
        let natural = tree.get(id).pos.height;
        tree.get_mut(id).pos.height = span.max(natural).max(0);
    }

    // Resolve the margin-box document position.
    let item = tree.get(id);
    let margin_w = item.width();
    let margin_h = item.height();
    let parent_origin = item
        .parent
        .map_or(Rect::default(), |parent| tree.placement(parent));

    let doc_x = match (left, right) {
        (Some(left), _) => cb.x + left,
        (None, Some(right)) => cb.right() - right - margin_w,
        // [§ 10.3.7] No horizontal offsets: the static position.
        (None, None) => parent_origin.x + static_hint.x,
    };
    let doc_y = match (top, bottom) {
        (Some(top), _) => cb.y + top,
        (None, Some(bottom)) => cb.bottom() - bottom - margin_h,
        (None, None) => parent_origin.y + static_hint.y,
    };

    // Back to parent-relative coordinates.
    let item = tree.get(id);
    let content_dx = item.margins.left + item.borders.left + item.paddings.left;
    let content_dy = item.margins.top + item.borders.top + item.paddings.top;
    let item = tree.get_mut(id);
    item.pos.x = doc_x - parent_origin.x + content_dx;
    item.pos.y = doc_y - parent_origin.y + content_dy;
}

/// The padding box of the nearest positioned ancestor, else the
/// viewport.
///
/// [§ 10.1] "If the element has 'position: absolute', the containing
/// block is established by the nearest ancestor with a 'position' of
/// 'absolute', 'relative' or 'fixed' ... formed by the padding edge."
fn containing_block_of(tree: &RenderTree, id: RenderItemId, viewport: Rect) -> Rect {
    let mut current = tree.get(id).parent;
    while let Some(ancestor) = current {
        if tree.get(ancestor).props.position.is_positioned() {
            let placement = tree.placement(ancestor);
            let item = tree.get(ancestor);
            return Rect::new(
                placement.x - item.paddings.left,
                placement.y - item.paddings.top,
                placement.width + item.paddings.left + item.paddings.right,
                placement.height + item.paddings.top + item.paddings.bottom,
            );
        }
        current = tree.get(ancestor).parent;
    }
    viewport
}
