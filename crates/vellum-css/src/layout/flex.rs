//! Flex layout.
//!
//! [CSS Flexbox § 9 Flex Layout Algorithm](https://www.w3.org/TR/css-flexbox-1/#layout-algorithm)
//!
//! Row and column directions share one implementation through main/cross
//! accessors. The flexible-lengths resolution is the spec's freeze loop:
//! distribute free space proportionally to the grow factors (or the
//! scaled shrink factors), clamp to min/max, freeze violators, repeat
//! until everything is frozen.

use crate::style::keywords::{
    AlignContent, AlignItems, AlignSelf, BoxSizing, Display, FlexWrap, JustifyContent,
};
use crate::style::values::Length;

use super::LayoutEnv;
use super::block::{Containing, clamp_width, render, resolve_ctx, resolve_edges};
use super::box_model::{Rect, horizontal, vertical};
use super::formatting_context::FormattingContext;
use super::render_tree::{RenderItemId, RenderTree};

/// Scratch state per flex item.
struct FlexItem {
    id: RenderItemId,
    /// [§ 9.2 step 3] The flex base size (content-box main size).
    base_size: i32,
    /// Base clamped to min/max: the hypothetical main size.
    hypothetical: i32,
    /// Minimum main size.
    min: i32,
    /// Maximum main size (`i32::MAX` when unconstrained).
    max: i32,
    grow: f32,
    shrink: f32,
    /// Resolved target main size.
    target: i32,
    frozen: bool,
    /// Margins+borders+paddings along the main axis.
    outer_main: i32,
    /// Count of `auto` main-axis margins (0..=2).
    auto_margins: u8,
    /// Final main-axis position of the margin box.
    main_pos: i32,
    /// Cross size of the margin box after layout.
    cross_size: i32,
    /// First-baseline offset from the margin-box top, when known.
    baseline: Option<i32>,
    align: AlignItems,
}

/// Lay out a flex container. Mirrors the [`render`] contract: `(x, y)`
/// is the margin-box origin in parent content coordinates; returns the
/// content width the container needed.
#[allow(clippy::too_many_arguments)]
pub fn render_flex(
    tree: &mut RenderTree,
    id: RenderItemId,
    env: &LayoutEnv,
    x: i32,
    y: i32,
    max_width: i32,
    containing: Containing,
    second_pass: bool,
) -> i32 {
    let props = tree.get(id).props.clone();
    let edges = resolve_edges(&props, containing.width, env);
    let ctx = resolve_ctx(&props, containing.width, env);
    let column = props.flex_direction.is_column();

    // ── Container main/cross extents. ─────────────────────────────────
    let mut content_width = if props.width.is_auto() {
        max_width
            - horizontal(&edges.margins)
            - horizontal(&edges.paddings)
            - horizontal(&edges.borders)
    } else {
        let mut width = props.width.to_px(&ctx);
        if props.box_sizing == BoxSizing::BorderBox {
            width -= horizontal(&edges.paddings) + horizontal(&edges.borders);
        }
        width
    };
    content_width = clamp_width(&props, content_width, containing.width, env).max(0);

    let definite_height = definite_height(tree, id, containing, env);
    let container_main = if column {
        definite_height.unwrap_or(i32::MAX)
    } else {
        content_width
    };

    {
        let item = tree.get_mut(id);
        item.margins = edges.margins;
        item.paddings = edges.paddings;
        item.borders = edges.borders;
        item.pos = Rect::new(
            x + edges.margins.left + edges.borders.left + edges.paddings.left,
            y + edges.margins.top + edges.borders.top + edges.paddings.top,
            content_width,
            0,
        );
    }

    // ── Collect items with base sizes. ────────────────────────────────
    let child_containing = Containing {
        width: content_width,
        height: definite_height,
    };
    let mut items: Vec<FlexItem> = Vec::new();

    for child in tree.children(id) {
        let child_props = tree.get(child).props.clone();
        if child_props.display == Display::None || child_props.position.is_out_of_flow() {
            continue;
        }
        let child_edges = resolve_edges(&child_props, content_width, env);
        let child_ctx = resolve_ctx(&child_props, container_main_base(column, content_width, definite_height), env);

        let outer_main = if column {
            vertical(&child_edges.margins)
                + vertical(&child_edges.paddings)
                + vertical(&child_edges.borders)
        } else {
            horizontal(&child_edges.margins)
                + horizontal(&child_edges.paddings)
                + horizontal(&child_edges.borders)
        };
        let auto_margins = if column {
            u8::from(child_props.margins.top.is_auto()) + u8::from(child_props.margins.bottom.is_auto())
        } else {
            u8::from(child_props.margins.left.is_auto()) + u8::from(child_props.margins.right.is_auto())
        };

        // [§ 9.2 step 3] flex-basis, else the main size property, else
        // the max-content size.
        let explicit_main = if column {
            (!child_props.height.is_auto()).then(|| child_props.height.to_px(&child_ctx))
        } else {
            (!child_props.width.is_auto()).then(|| child_props.width.to_px(&child_ctx))
        };
        let base_size = if !child_props.flex_basis.is_auto() {
            let mut basis = child_props.flex_basis.to_px(
                &resolve_ctx(&child_props, container_main_if_definite(column, content_width, definite_height), env),
            );
            if child_props.box_sizing == BoxSizing::BorderBox {
                basis -= if column {
                    vertical(&child_edges.paddings) + vertical(&child_edges.borders)
                } else {
                    horizontal(&child_edges.paddings) + horizontal(&child_edges.borders)
                };
            }
            basis.max(0)
        } else if let Some(main) = explicit_main {
            main.max(0)
        } else {
            measure_content_main(tree, child, env, content_width, child_containing, column)
        };

        let (min, max) = main_limits(&child_props, column, content_width, env);
        let hypothetical = base_size.clamp(min, max);

        items.push(FlexItem {
            id: child,
            base_size,
            hypothetical,
            min,
            max,
            grow: child_props.flex_grow,
            shrink: child_props.flex_shrink,
            target: 0,
            frozen: false,
            outer_main,
            auto_margins,
            main_pos: 0,
            cross_size: 0,
            baseline: None,
            align: resolve_align(&props, &child_props),
        });
    }

    // ── Flex lines. ───────────────────────────────────────────────────
    // [§ 9.3 step 5] "Collect flex items into flex lines": a single line
    // under nowrap, otherwise break whenever the next item would
    // overflow the main size.
    let mut lines: Vec<Vec<usize>> = Vec::new();
    if props.flex_wrap == FlexWrap::Nowrap || container_main == i32::MAX {
        lines.push((0..items.len()).collect());
    } else {
        let mut line: Vec<usize> = Vec::new();
        let mut line_main = 0;
        for (index, item) in items.iter().enumerate() {
            let outer = item.hypothetical + item.outer_main;
            if !line.is_empty() && line_main + outer > container_main {
                lines.push(std::mem::take(&mut line));
                line_main = 0;
            }
            line.push(index);
            line_main += outer;
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }

    // ── Per line: resolve lengths, lay out, place. ────────────────────
    // An indefinite main size behaves as max-content: no free space, so
    // nothing grows or shrinks.
    let strut_main = if container_main == i32::MAX {
        items
            .iter()
            .map(|item| item.hypothetical + item.outer_main)
            .sum()
    } else {
        container_main
    };
    let mut line_cross_sizes: Vec<i32> = Vec::new();
    let mut needed_main = 0;

    for line in &lines {
        resolve_flexible_lengths(&mut items, line, strut_main);

        // Lay each item out at its target main size.
        let mut line_cross = 0;
        let mut max_baseline = 0;
        for &index in line {
            let item_id = items[index].id;
            let target = items[index].target;
            force_main_size(tree, item_id, target, column);

            let mut fc = FormattingContext::new();
            let avail = if column {
                content_width
            } else {
                target + items[index].outer_main
            };
            let _ = render(
                tree,
                item_id,
                env,
                0,
                0,
                avail,
                child_containing,
                &mut fc,
                (0, 0),
                second_pass,
            );

            let rendered = tree.get(item_id);
            let cross = if column {
                rendered.width()
            } else {
                rendered.height()
            };
            items[index].cross_size = cross;
            items[index].baseline = rendered.first_baseline.map(|b| {
                b + rendered.margins.top + rendered.borders.top + rendered.paddings.top
            });
            line_cross = line_cross.max(cross);
            if matches!(items[index].align, AlignItems::Baseline) {
                if let Some(baseline) = items[index].baseline {
                    max_baseline = max_baseline.max(baseline);
                }
            }
        }

        // [§ 8.1] Main-axis auto margins absorb all free space before
        // justify-content gets any.
        let used_main: i32 = line
            .iter()
            .map(|&i| items[i].target + items[i].outer_main)
            .sum();
        let free = (strut_main - used_main).max(0);
        let auto_count: i32 = line.iter().map(|&i| i32::from(items[i].auto_margins)).sum();

        let (mut cursor, gap) = if auto_count > 0 && free > 0 {
            // Auto margins absorb everything; justify-content sees no
            // free space.
            (0, 0)
        } else {
            justify_offsets(props.justify_content, free, line.len())
        };
        let share = if auto_count > 0 { free / auto_count } else { 0 };

        // Placement order honors the reverse flag.
        let order: Vec<usize> = if props.flex_direction.is_reverse() {
            line.iter().rev().copied().collect()
        } else {
            line.clone()
        };
        for &index in &order {
            let (lead_auto, trail_auto) = margin_autos(tree, items[index].id, column);
            if lead_auto {
                cursor += share;
            }
            items[index].main_pos = cursor;
            cursor += items[index].target + items[index].outer_main;
            if trail_auto {
                cursor += share;
            }
            cursor += gap;
        }
        needed_main = needed_main.max(used_main);

        line_cross_sizes.push(line_cross);
        let _ = max_baseline;
    }

    // ── Cross axis. ───────────────────────────────────────────────────
    let total_cross: i32 = line_cross_sizes.iter().sum();
    let container_cross = if column {
        content_width
    } else {
        definite_height.unwrap_or(total_cross)
    };

    // [§ 9.6 step 15 / § 8.4 align-content] Pack the lines.
    let cross_free = (container_cross - total_cross).max(0);
    let (mut line_cursor, line_gap, line_grow) = match props.align_content {
        AlignContent::FlexStart => (0, 0, 0),
        AlignContent::FlexEnd => (cross_free, 0, 0),
        AlignContent::Center => (cross_free / 2, 0, 0),
        AlignContent::SpaceBetween => {
            if lines.len() > 1 {
                (0, cross_free / (lines.len() as i32 - 1), 0)
            } else {
                (0, 0, 0)
            }
        }
        AlignContent::SpaceAround => {
            let gap = cross_free / lines.len().max(1) as i32;
            (gap / 2, gap, 0)
        }
        AlignContent::Stretch => (0, 0, cross_free / lines.len().max(1) as i32),
    };

    for (line_index, line) in lines.iter().enumerate() {
        let line_cross = line_cross_sizes[line_index] + line_grow;
        // Baselines align to the line's deepest first baseline.
        let line_baseline = line
            .iter()
            .filter(|&&i| matches!(items[i].align, AlignItems::Baseline))
            .filter_map(|&i| items[i].baseline)
            .max()
            .unwrap_or(0);

        for &index in line {
            let item = &items[index];
            let cross_offset = match item.align {
                AlignItems::FlexStart => 0,
                AlignItems::FlexEnd => line_cross - item.cross_size,
                AlignItems::Center => (line_cross - item.cross_size) / 2,
                AlignItems::Baseline => item
                    .baseline
                    .map_or(0, |baseline| line_baseline - baseline),
                AlignItems::LastBaseline => {
                    let last = last_baseline_of(tree, item.id);
                    let line_last = line
                        .iter()
                        .filter_map(|&i| last_baseline_of(tree, items[i].id))
                        .max()
                        .unwrap_or(0);
                    last.map_or(0, |baseline| line_last - baseline)
                }
                AlignItems::Stretch => {
                    stretch_cross(tree, items[index].id, line_cross, column, env, content_width);
                    0
                }
            };
            place_flex_item(
                tree,
                item.id,
                item.main_pos,
                line_cursor + cross_offset,
                column,
            );
        }
        line_cursor += line_cross + line_gap;
    }

    // ── Container height. ─────────────────────────────────────────────
    let content_height = if column {
        definite_height.unwrap_or(needed_main)
    } else {
        definite_height.unwrap_or(line_cursor.max(total_cross))
    };
    tree.get_mut(id).pos.height = content_height.max(0);

    // Baselines: a flex container's baseline is its first item's.
    let first_baseline = items.first().and_then(|item| {
        let rendered = tree.get(item.id);
        rendered.first_baseline.map(|b| rendered.pos.y + b)
    });
    {
        let item = tree.get_mut(id);
        item.first_baseline = first_baseline;
        item.last_baseline = first_baseline;
    }

    // Shrink-to-fit measure: the max-content main size for rows, the
    // container width for columns.
    if column {
        content_width
    } else {
        items
            .iter()
            .map(|item| item.hypothetical + item.outer_main)
            .sum::<i32>()
            .max(needed_main)
    }
}

/// [§ 9.7 Resolving Flexible Lengths](https://www.w3.org/TR/css-flexbox-1/#resolve-flexible-lengths)
fn resolve_flexible_lengths(items: &mut [FlexItem], line: &[usize], container_main: i32) {
    if line.is_empty() {
        return;
    }

    // Step 1: pick the used factor.
    let sum_hypothetical: i32 = line
        .iter()
        .map(|&i| items[i].hypothetical + items[i].outer_main)
        .sum();
    let growing = sum_hypothetical < container_main;

    // Step 2: freeze inflexible items at their hypothetical size.
    for &index in line {
        let item = &mut items[index];
        let factor = if growing { item.grow } else { item.shrink };
        let inflexible = factor == 0.0
            || (growing && item.base_size > item.hypothetical)
            || (!growing && item.base_size < item.hypothetical);
        if inflexible {
            item.frozen = true;
            item.target = item.hypothetical;
        } else {
            item.frozen = false;
            item.target = item.base_size;
        }
    }

    // Step 3: initial free space against base sizes of unfrozen items.
    let free_space_with = |items: &[FlexItem]| {
        container_main
            - line
                .iter()
                .map(|&i| {
                    let item = &items[i];
                    (if item.frozen { item.target } else { item.base_size }) + item.outer_main
                })
                .sum::<i32>()
    };
    let initial_free = free_space_with(items);

    // Step 4: the freeze loop. Bounded by the line length — every
    // iteration freezes at least one item.
    for _ in 0..=line.len() {
        if line.iter().all(|&i| items[i].frozen) {
            break;
        }
        let remaining_free = free_space_with(items);

        // 4c: a fractional factor sum scales the free space down.
        let unfrozen_sum: f32 = line
            .iter()
            .filter(|&&i| !items[i].frozen)
            .map(|&i| if growing { items[i].grow } else { items[i].shrink })
            .sum();
        let free = if unfrozen_sum < 1.0 && unfrozen_sum > 0.0 {
            let scaled = (initial_free as f32 * unfrozen_sum) as i32;
            if scaled.abs() < remaining_free.abs() {
                scaled
            } else {
                remaining_free
            }
        } else {
            remaining_free
        };

        // 4d: distribute.
        if growing {
            let grow_sum: f32 = line
                .iter()
                .filter(|&&i| !items[i].frozen)
                .map(|&i| items[i].grow)
                .sum();
            if grow_sum > 0.0 {
                for &index in line {
                    if items[index].frozen {
                        continue;
                    }
                    let ratio = items[index].grow / grow_sum;
                    items[index].target =
                        items[index].base_size + (free as f32 * ratio).round() as i32;
                }
            }
        } else {
            // Shrink distributes by the scaled shrink factor. A zero sum
            // can only happen when every unfrozen base size is zero; in
            // that case there is nothing to take away, so freeze and
            // stop rather than divide.
            let scaled_sum: f32 = line
                .iter()
                .filter(|&&i| !items[i].frozen)
                .map(|&i| items[i].shrink * items[i].base_size as f32)
                .sum();
            if scaled_sum <= 0.0 {
                for &index in line {
                    items[index].frozen = true;
                }
                break;
            }
            for &index in line {
                if items[index].frozen {
                    continue;
                }
                let scaled = items[index].shrink * items[index].base_size as f32;
                let ratio = scaled / scaled_sum;
                items[index].target =
                    items[index].base_size - (free.abs() as f32 * ratio).round() as i32;
            }
        }

        // 4e: clamp and total the violations.
        let mut total_violation = 0;
        for &index in line {
            if items[index].frozen {
                continue;
            }
            let clamped = items[index].target.clamp(items[index].min, items[index].max);
            total_violation += clamped - items[index].target;
            items[index].target = clamped;
        }

        // 4f: freeze by violation sign.
        if total_violation == 0 {
            for &index in line {
                items[index].frozen = true;
            }
        } else if total_violation > 0 {
            // Min violations froze at their floor.
            for &index in line {
                if !items[index].frozen && items[index].target == items[index].min {
                    items[index].frozen = true;
                }
            }
        } else {
            for &index in line {
                if !items[index].frozen && items[index].target == items[index].max {
                    items[index].frozen = true;
                }
            }
        }
    }
}

/// [§ 8.2 justify-content] `(initial_offset, gap)` with the documented
/// degenerate fallbacks.
fn justify_offsets(justify: JustifyContent, free: i32, count: usize) -> (i32, i32) {
    if count == 0 {
        return (0, 0);
    }
    let count = count as i32;
    match justify {
        JustifyContent::FlexStart => (0, 0),
        JustifyContent::FlexEnd => (free, 0),
        JustifyContent::Center => (free / 2, 0),
        // "If ... there is only a single flex item, this value is
        // identical to flex-start."
        JustifyContent::SpaceBetween => {
            if count <= 1 || free <= 0 {
                (0, 0)
            } else {
                (0, free / (count - 1))
            }
        }
        // "...identical to center" for the degenerate cases.
        JustifyContent::SpaceAround => {
            if free <= 0 {
                (free / 2, 0)
            } else {
                let gap = free / count;
                (gap / 2, gap)
            }
        }
        JustifyContent::SpaceEvenly => {
            if free <= 0 {
                (free / 2, 0)
            } else {
                let gap = free / (count + 1);
                (gap, gap)
            }
        }
    }
}

fn resolve_align(
    container: &crate::style::computed::CssProperties,
    child: &crate::style::computed::CssProperties,
) -> AlignItems {
    match child.align_self {
        AlignSelf::Auto => container.align_items,
        AlignSelf::Stretch => AlignItems::Stretch,
        AlignSelf::FlexStart => AlignItems::FlexStart,
        AlignSelf::FlexEnd => AlignItems::FlexEnd,
        AlignSelf::Center => AlignItems::Center,
        AlignSelf::Baseline => AlignItems::Baseline,
        AlignSelf::LastBaseline => AlignItems::LastBaseline,
    }
}

/// Max-content measurement along the main axis.
fn measure_content_main(
    tree: &mut RenderTree,
    id: RenderItemId,
    env: &LayoutEnv,
    content_width: i32,
    containing: Containing,
    column: bool,
) -> i32 {
    let mut fc = FormattingContext::new();
    let used = render(
        tree,
        id,
        env,
        0,
        0,
        content_width,
        containing,
        &mut fc,
        (0, 0),
        true,
    );
    if column {
        tree.get(id).pos.height
    } else {
        used
    }
}

/// Main-axis min/max constraints.
fn main_limits(
    props: &crate::style::computed::CssProperties,
    column: bool,
    containing_width: i32,
    env: &LayoutEnv,
) -> (i32, i32) {
    let ctx = resolve_ctx(props, containing_width, env);
    let (min_prop, max_prop) = if column {
        (&props.min_height, &props.max_height)
    } else {
        (&props.min_width, &props.max_width)
    };
    let min = min_prop.to_px(&ctx).max(0);
    let max = if max_prop.is_none() || max_prop.is_auto() {
        i32::MAX
    } else {
        max_prop.to_px(&ctx).max(min)
    };
    (min, max)
}

/// Override the child's main size property with the resolved target so
/// its own layout uses it as definite.
fn force_main_size(tree: &mut RenderTree, id: RenderItemId, target: i32, column: bool) {
    let item = tree.get_mut(id);
    let mut px = target;
    if item.props.box_sizing == BoxSizing::BorderBox {
        // The stored edges belong to the previous pass; recompute from
        // the resolved quads on the item after render. Setting the
        // content-box size directly is simpler: switch the override to
        // content-box semantics.
        item.props.box_sizing = BoxSizing::ContentBox;
    }
    px = px.max(0);
    if column {
        item.props.height = Length::px(px as f32);
    } else {
        item.props.width = Length::px(px as f32);
    }
}

/// Whether the leading/trailing main-axis margins are auto.
fn margin_autos(tree: &RenderTree, id: RenderItemId, column: bool) -> (bool, bool) {
    let props = &tree.get(id).props;
    if column {
        (props.margins.top.is_auto(), props.margins.bottom.is_auto())
    } else {
        (props.margins.left.is_auto(), props.margins.right.is_auto())
    }
}

/// [§ 8.3 align-items: stretch] Fill the line's cross size when the
/// cross size property is auto.
fn stretch_cross(
    tree: &mut RenderTree,
    id: RenderItemId,
    line_cross: i32,
    column: bool,
    env: &LayoutEnv,
    containing_width: i32,
) {
    let item = tree.get(id);
    let cross_auto = if column {
        item.props.width.is_auto()
    } else {
        item.props.height.is_auto()
    };
    if !cross_auto {
        return;
    }
    let edges = resolve_edges(&item.props.clone(), containing_width, env);
    if column {
        let fill = line_cross
            - horizontal(&edges.margins)
            - horizontal(&edges.paddings)
            - horizontal(&edges.borders);
        tree.get_mut(id).pos.width = fill.max(0);
    } else {
        let fill = line_cross
            - vertical(&edges.margins)
            - vertical(&edges.paddings)
            - vertical(&edges.borders);
        tree.get_mut(id).pos.height = fill.max(0);
    }
}

/// Place an item's margin box at `(main, cross)` in container content
/// coordinates.
fn place_flex_item(tree: &mut RenderTree, id: RenderItemId, main: i32, cross: i32, column: bool) {
    let (x, y) = if column { (cross, main) } else { (main, cross) };
    let item = tree.get(id);
    let content_x = x + item.margins.left + item.borders.left + item.paddings.left;
    let content_y = y + item.margins.top + item.borders.top + item.paddings.top;
    let item = tree.get_mut(id);
    item.pos.x = content_x;
    item.pos.y = content_y;
}

fn last_baseline_of(tree: &RenderTree, id: RenderItemId) -> Option<i32> {
    let item = tree.get(id);
    item.last_baseline
        .map(|b| b + item.margins.top + item.borders.top + item.paddings.top)
}

/// The container's definite content height, if any.
fn definite_height(
    tree: &RenderTree,
    id: RenderItemId,
    containing: Containing,
    env: &LayoutEnv,
) -> Option<i32> {
    let props = &tree.get(id).props;
    if props.height.is_auto() {
        return None;
    }
    if props.height.is_percent() && containing.height.is_none() {
        return None;
    }
    let ctx = resolve_ctx(props, containing.height.unwrap_or(0), env);
    let mut height = props.height.to_px(&ctx);
    if props.box_sizing == BoxSizing::BorderBox {
        let edges = resolve_edges(props, containing.width, env);
        height -= vertical(&edges.paddings) + vertical(&edges.borders);
    }
    Some(height.max(0))
}

/// The base the flex-basis percentage resolves against.
const fn container_main_if_definite(
    column: bool,
    content_width: i32,
    definite_height: Option<i32>,
) -> i32 {
    if column {
        match definite_height {
            Some(height) => height,
            None => 0,
        }
    } else {
        content_width
    }
}

/// Percent base for the child's own main-size property.
const fn container_main_base(
    column: bool,
    content_width: i32,
    definite_height: Option<i32>,
) -> i32 {
    container_main_if_definite(column, content_width, definite_height)
}
