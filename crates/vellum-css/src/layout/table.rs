//! Table layout.
//!
//! [CSS 2.2 § 17 Tables](https://www.w3.org/TR/CSS22/tables.html)
//!
//! Five passes: build the cell grid (honoring colspan/rowspan), measure
//! per-column content widths, solve column widths (percentages anchor,
//! auto columns share, minimum violations widen and restart), solve row
//! heights (rowspans grow their last spanned row), then place cells and
//! apply their vertical alignment.

use crate::style::keywords::{BorderCollapse, BoxSizing, Display, VerticalAlign};
use crate::style::values::Length;

use super::LayoutEnv;
use super::block::{Containing, render, resolve_ctx, resolve_edges};
use super::box_model::{Rect, horizontal, vertical};
use super::formatting_context::FormattingContext;
use super::render_tree::{RenderItemId, RenderKind, RenderTree, TableRole};

/// One grid slot: the owning cell plus whether this slot is the cell's
/// origin (spanned slots reference the origin cell).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Empty,
    Origin(RenderItemId),
    Spanned(RenderItemId),
}

/// Per-column solver state.
#[derive(Debug, Clone, Copy, Default)]
struct Column {
    min: i32,
    max: i32,
    /// An anchored percentage width (of the table content box).
    percent: Option<f32>,
    /// A fixed pixel width from a cell's width property.
    fixed: Option<i32>,
    width: i32,
}

/// Lay out a table. Contract matches [`render`]: `(x, y)` margin-box
/// origin in parent content coordinates; returns the table's content
/// width.
#[allow(clippy::too_many_arguments)]
pub fn render_table(
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

    let (spacing_x, spacing_y) = if props.border_collapse == BorderCollapse::Collapse {
        (0, 0)
    } else {
        (
            props.border_spacing_x.to_px(&ctx).max(0),
            props.border_spacing_y.to_px(&ctx).max(0),
        )
    };

    // ── Pass 1: the grid. ─────────────────────────────────────────────
    let rows = collect_rows(tree, id);
    let (grid, column_count) = build_grid(tree, &rows);
    if column_count == 0 {
        let item = tree.get_mut(id);
        item.margins = edges.margins;
        item.paddings = edges.paddings;
        item.borders = edges.borders;
        item.pos = Rect::new(
            x + edges.margins.left + edges.borders.left + edges.paddings.left,
            y + edges.margins.top + edges.borders.top + edges.paddings.top,
            0,
            0,
        );
        return 0;
    }

    let available = (max_width
        - horizontal(&edges.margins)
        - horizontal(&edges.paddings)
        - horizontal(&edges.borders))
    .max(0);

    // ── Pass 2: per-column content measurement. ───────────────────────
    let mut columns = vec![Column::default(); column_count];
    let cell_containing = Containing {
        width: available,
        height: None,
    };
    for (row_index, row_slots) in grid.iter().enumerate() {
        for (col_index, slot) in row_slots.iter().enumerate() {
            let Slot::Origin(cell) = *slot else { continue };
            let colspan = tree.get(cell).colspan.max(1) as usize;
            let cell_props = tree.get(cell).props.clone();
            let cell_ctx = resolve_ctx(&cell_props, available, env);

            let (min_content, max_content) = measure_cell(tree, cell, env, cell_containing);

            if colspan == 1 {
                let column = &mut columns[col_index];
                column.min = column.min.max(min_content);
                column.max = column.max.max(max_content);
                if cell_props.width.is_percent() {
                    let pct = cell_props.width.raw();
                    column.percent =
                        Some(column.percent.map_or(pct, |existing| existing.max(pct)));
                } else if !cell_props.width.is_auto() {
                    let fixed = cell_props.width.to_px(&cell_ctx)
                        + cell_edge_extra(tree, cell, available, env);
                    column.fixed =
                        Some(column.fixed.map_or(fixed, |existing| existing.max(fixed)));
                }
            } else {
                // Spanning cells only guarantee their minimum across the
                // span; pass 4's violation loop enforces it.
                let per = min_content / colspan as i32;
                for column in columns.iter_mut().skip(col_index).take(colspan) {
                    column.min = column.min.max(per);
                }
            }
            let _ = row_index;
        }
    }

    // ── Pass 3: the width solver. ─────────────────────────────────────
    let table_width_prop = (!props.width.is_auto()).then(|| {
        let mut width = props.width.to_px(&ctx);
        if props.box_sizing == BoxSizing::BorderBox {
            width -= horizontal(&edges.paddings) + horizontal(&edges.borders);
        }
        width.max(0)
    });
    let total_spacing = spacing_x * (column_count as i32 + 1);

    let natural: i32 = columns.iter().map(|c| c.fixed.unwrap_or(c.max)).sum::<i32>() + total_spacing;
    let table_content_width = table_width_prop
        .unwrap_or_else(|| natural.min(available))
        .min(available.max(0))
        .max(0);
    let columns_budget = (table_content_width - total_spacing).max(0);

    distribute_columns(&mut columns, columns_budget);

    // Pass 3b: minimum-violation loop. Each iteration strictly widens at
    // least one column toward the fixed point, so `column_count + 1`
    // rounds always suffice; the cap is a hard stop, not a tuning knob.
    for _ in 0..=column_count {
        let mut widened = false;
        for row_slots in &grid {
            for (col_index, slot) in row_slots.iter().enumerate() {
                let Slot::Origin(cell) = *slot else { continue };
                let colspan = tree.get(cell).colspan.max(1) as usize;
                let span_width: i32 = columns[col_index..(col_index + colspan).min(column_count)]
                    .iter()
                    .map(|c| c.width)
                    .sum::<i32>()
                    + spacing_x * (colspan as i32 - 1);
                let (min_content, _) = measure_cell(tree, cell, env, cell_containing);
                if min_content > span_width {
                    widen_span(
                        &mut columns,
                        col_index,
                        colspan.min(column_count - col_index),
                        min_content - span_width,
                    );
                    widened = true;
                }
            }
        }
        if !widened {
            break;
        }
    }
    let final_width: i32 = columns.iter().map(|c| c.width).sum::<i32>() + total_spacing;

    // ── Pass 4: render cells and solve row heights. ───────────────────
    let mut row_heights = vec![0_i32; rows.len()];
    for (row_index, row_slots) in grid.iter().enumerate() {
        for (col_index, slot) in row_slots.iter().enumerate() {
            let Slot::Origin(cell) = *slot else { continue };
            let colspan = tree.get(cell).colspan.max(1) as usize;
            let rowspan = tree.get(cell).rowspan.max(1) as usize;
            let span_width: i32 = columns[col_index..(col_index + colspan).min(column_count)]
                .iter()
                .map(|c| c.width)
                .sum::<i32>()
                + spacing_x * (colspan as i32 - 1);

            render_cell_at_width(tree, cell, env, span_width, cell_containing, second_pass);

            if rowspan == 1 {
                row_heights[row_index] = row_heights[row_index].max(tree.get(cell).height());
            }
        }
    }
    // Rowspan cells that are taller than their spanned rows grow the
    // last spanned row.
    for (row_index, row_slots) in grid.iter().enumerate() {
        for slot in row_slots {
            let Slot::Origin(cell) = *slot else { continue };
            let rowspan = tree.get(cell).rowspan.max(1) as usize;
            if rowspan <= 1 {
                continue;
            }
            let end = (row_index + rowspan).min(row_heights.len());
            let spanned: i32 = row_heights[row_index..end].iter().sum::<i32>()
                + spacing_y * (end - row_index - 1).max(0) as i32;
            let cell_height = tree.get(cell).height();
            if cell_height > spanned {
                row_heights[end - 1] += cell_height - spanned;
            }
        }
    }

    // ── Pass 5: placement and vertical alignment. ─────────────────────
    let mut col_x = vec![0_i32; column_count];
    let mut cursor = spacing_x;
    for (index, column) in columns.iter().enumerate() {
        col_x[index] = cursor;
        cursor += column.width + spacing_x;
    }
    let mut row_y = vec![0_i32; rows.len()];
    let mut cursor = spacing_y;
    for (index, height) in row_heights.iter().enumerate() {
        row_y[index] = cursor;
        cursor += height + spacing_y;
    }
    let table_height = cursor.max(spacing_y);

    for (row_index, row_slots) in grid.iter().enumerate() {
        for (col_index, slot) in row_slots.iter().enumerate() {
            let Slot::Origin(cell) = *slot else { continue };
            let rowspan = tree.get(cell).rowspan.max(1) as usize;
            let end = (row_index + rowspan).min(row_heights.len());
            let cell_rows_height: i32 = row_heights[row_index..end].iter().sum::<i32>()
                + spacing_y * (end - row_index - 1).max(0) as i32;

            // Cells position relative to their row box, whose origin sits
            // at (spacing_x, row_y) in table content coordinates.
            place_cell(tree, cell, col_x[col_index] - spacing_x, 0, cell_rows_height);
        }
        // Row boxes cover their strip (backgrounds, hit testing).
        let row = rows[row_index];
        let item = tree.get_mut(row);
        item.pos = Rect::new(
            spacing_x,
            row_y[row_index],
            (final_width - 2 * spacing_x).max(0),
            row_heights[row_index],
        );
    }
    position_row_groups(tree, id);

    // ── Table geometry. ───────────────────────────────────────────────
    let content_height = match table_width_prop {
        _ if !props.height.is_auto() && !props.height.is_percent() => {
            let hctx = resolve_ctx(&props, 0, env);
            table_height.max(props.height.to_px(&hctx))
        }
        _ => table_height,
    };
    let item = tree.get_mut(id);
    item.margins = edges.margins;
    item.paddings = edges.paddings;
    item.borders = edges.borders;
    item.pos = Rect::new(
        x + edges.margins.left + edges.borders.left + edges.paddings.left,
        y + edges.margins.top + edges.borders.top + edges.paddings.top,
        final_width,
        content_height,
    );
    item.first_baseline = None;
    item.last_baseline = None;

    final_width
}

/// Collect row items in order: direct rows plus rows inside header,
/// body, and footer groups (header first, footer last).
fn collect_rows(tree: &RenderTree, table: RenderItemId) -> Vec<RenderItemId> {
    let mut header = Vec::new();
    let mut body = Vec::new();
    let mut footer = Vec::new();

    for child in tree.children(table) {
        match tree.get(child).kind {
            RenderKind::TablePart(TableRole::Row) => body.push(child),
            RenderKind::TablePart(TableRole::RowGroup) => {
                body.extend(rows_of_group(tree, child));
            }
            RenderKind::TablePart(TableRole::HeaderGroup) => {
                header.extend(rows_of_group(tree, child));
            }
            RenderKind::TablePart(TableRole::FooterGroup) => {
                footer.extend(rows_of_group(tree, child));
            }
            _ => {}
        }
    }
    header.into_iter().chain(body).chain(footer).collect()
}

fn rows_of_group(tree: &RenderTree, group: RenderItemId) -> Vec<RenderItemId> {
    tree.children(group)
        .into_iter()
        .filter(|&child| matches!(tree.get(child).kind, RenderKind::TablePart(TableRole::Row)))
        .collect()
}

/// Pass 1: build the occupancy grid.
///
/// [§ 17.5] The grid tracks slots taken by earlier rowspans so each
/// cell lands in the first free column of its row.
fn build_grid(tree: &RenderTree, rows: &[RenderItemId]) -> (Vec<Vec<Slot>>, usize) {
    let mut grid: Vec<Vec<Slot>> = vec![Vec::new(); rows.len()];
    let mut column_count = 0;

    for (row_index, &row) in rows.iter().enumerate() {
        let cells: Vec<RenderItemId> = tree
            .children(row)
            .into_iter()
            .filter(|&child| tree.get(child).props.display == Display::TableCell)
            .collect();

        let mut col = 0;
        for cell in cells {
            // Skip slots occupied by earlier rowspans.
            while grid[row_index].get(col).is_some_and(|s| *s != Slot::Empty) {
                col += 1;
            }
            let colspan = tree.get(cell).colspan.max(1) as usize;
            let rowspan = tree.get(cell).rowspan.max(1) as usize;

            for r in row_index..(row_index + rowspan).min(rows.len()) {
                for c in col..col + colspan {
                    if grid[r].len() <= c {
                        grid[r].resize(c + 1, Slot::Empty);
                    }
                    grid[r][c] = if r == row_index && c == col {
                        Slot::Origin(cell)
                    } else {
                        Slot::Spanned(cell)
                    };
                }
            }
            col += colspan;
            column_count = column_count.max(col);
        }
    }

    for row in &mut grid {
        row.resize(column_count, Slot::Empty);
    }
    (grid, column_count)
}

/// Min-content and max-content border-box widths of a cell.
fn measure_cell(
    tree: &mut RenderTree,
    cell: RenderItemId,
    env: &LayoutEnv,
    containing: Containing,
) -> (i32, i32) {
    let extra = cell_edge_extra(tree, cell, containing.width, env);

    // Max-content: lay out with effectively unbounded width.
    let mut fc = FormattingContext::new();
    let max = render(
        tree, cell, env, 0, 0, 1_000_000, containing, &mut fc, (0, 0), true,
    );
    // Min-content: a zero-width pass makes every word its own line; the
    // widest line is the longest unbreakable unit.
    let mut fc = FormattingContext::new();
    let min = render(tree, cell, env, 0, 0, 0, containing, &mut fc, (0, 0), true);

    (min + extra, max + extra)
}

/// Padding plus border of a cell (the part of its border-box width that
/// is not content).
fn cell_edge_extra(
    tree: &RenderTree,
    cell: RenderItemId,
    containing_width: i32,
    env: &LayoutEnv,
) -> i32 {
    let props = &tree.get(cell).props;
    let edges = resolve_edges(props, containing_width, env);
    horizontal(&edges.paddings) + horizontal(&edges.borders)
}

/// Pass 3 core: assign widths from anchors and distribute the remainder.
fn distribute_columns(columns: &mut [Column], budget: i32) {
    let mut remaining = budget;

    // Percent columns take their share of the table width.
    for column in columns.iter_mut() {
        if let Some(pct) = column.percent {
            column.width = ((budget as f32) * pct / 100.0).round() as i32;
            column.width = column.width.max(column.min);
            remaining -= column.width;
        }
    }
    // Fixed columns take their set width.
    for column in columns.iter_mut() {
        if column.percent.is_none() {
            if let Some(fixed) = column.fixed {
                column.width = fixed.max(column.min);
                remaining -= column.width;
            }
        }
    }
    // Auto columns split the remainder proportionally to their
    // min-content widths (equal split when every minimum is zero).
    let auto: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.percent.is_none() && c.fixed.is_none())
        .map(|(i, _)| i)
        .collect();
    if auto.is_empty() {
        return;
    }
    let remaining = remaining.max(0);
    let min_sum: i32 = auto.iter().map(|&i| columns[i].min).sum();
    let max_sum: i32 = auto.iter().map(|&i| columns[i].max).sum();

    if max_sum <= remaining {
        // Everyone gets max-content; leftover splits by min weights.
        let leftover = remaining - max_sum;
        for (position, &index) in auto.iter().enumerate() {
            let weight = share(leftover, position, auto.len(), columns[index].min, min_sum);
            columns[index].width = columns[index].max + weight;
        }
    } else {
        for (position, &index) in auto.iter().enumerate() {
            let column = &columns[index];
            let extra = remaining - min_sum;
            let weight = if extra > 0 {
                share(extra, position, auto.len(), column.max - column.min, (max_sum - min_sum).max(0))
            } else {
                0
            };
            columns[index].width = (column.min + weight).max(column.min);
        }
    }
}

/// `total * weight / weight_sum`, with an equal split fallback and the
/// remainder going to the last participant.
fn share(total: i32, position: usize, count: usize, weight: i32, weight_sum: i32) -> i32 {
    if total <= 0 {
        return 0;
    }
    if weight_sum <= 0 {
        let base = total / count as i32;
        if position + 1 == count {
            return total - base * (count as i32 - 1);
        }
        return base;
    }
    (i64::from(total) * i64::from(weight) / i64::from(weight_sum)) as i32
}

/// Widen the columns a too-narrow cell spans: auto columns in the span
/// take the deficit (equally), otherwise the last spanned column does.
fn widen_span(columns: &mut [Column], start: usize, span: usize, deficit: i32) {
    let span_range = start..start + span;
    let auto: Vec<usize> = span_range
        .clone()
        .filter(|&i| columns[i].percent.is_none() && columns[i].fixed.is_none())
        .collect();
    if auto.is_empty() {
        columns[start + span - 1].width += deficit;
        return;
    }
    let per = deficit / auto.len() as i32;
    let mut handed = 0;
    for (position, &index) in auto.iter().enumerate() {
        let amount = if position + 1 == auto.len() {
            deficit - handed
        } else {
            per
        };
        columns[index].width += amount;
        handed += amount;
    }
}

/// Render a cell at an exact border-box width.
fn render_cell_at_width(
    tree: &mut RenderTree,
    cell: RenderItemId,
    env: &LayoutEnv,
    border_box_width: i32,
    containing: Containing,
    second_pass: bool,
) {
    let extra = cell_edge_extra(tree, cell, containing.width, env);
    let content = (border_box_width - extra).max(0);
    {
        let item = tree.get_mut(cell);
        item.props.box_sizing = BoxSizing::ContentBox;
        item.props.width = Length::px(content as f32);
        // Cells never carry margins in the grid model.
        item.props.margins = crate::style::values::Quad::uniform(Length::zero());
    }
    let mut fc = FormattingContext::new();
    let _ = render(
        tree,
        cell,
        env,
        0,
        0,
        border_box_width,
        containing,
        &mut fc,
        (0, 0),
        second_pass,
    );
}

/// Place a cell at its slot and stretch it to the row height, shifting
/// its content per `vertical-align`.
///
/// [§ 17.5.3] "The height of a 'table-row' element's box is the maximum
/// of ... the cells' heights"; cell content aligns within via baseline /
/// top / middle / bottom.
fn place_cell(
    tree: &mut RenderTree,
    cell: RenderItemId,
    x: i32,
    y: i32,
    row_height: i32,
) {
    let item = tree.get(cell);
    let chrome = vertical(&item.paddings) + vertical(&item.borders);
    let natural = item.pos.height;
    let target = (row_height - chrome).max(natural);
    let offset = match item.props.vertical_align {
        VerticalAlign::Bottom | VerticalAlign::TextBottom => target - natural,
        VerticalAlign::Middle => (target - natural) / 2,
        _ => 0, // baseline and top behave as top in the grid model
    };

    let item = tree.get_mut(cell);
    item.pos.x = x + item.margins.left + item.borders.left + item.paddings.left;
    item.pos.y = y + item.margins.top + item.borders.top + item.paddings.top;
    item.pos.height = target;

    if offset > 0 {
        for child in tree.children(cell) {
            tree.get_mut(child).pos.y += offset;
        }
        let lines = &mut tree.get_mut(cell).lines;
        for line in lines.iter_mut() {
            line.top += offset;
            for fragment in &mut line.fragments {
                fragment.rect.y += offset;
            }
        }
    }
}

/// Give row groups a box covering their rows, then re-express the rows
/// relative to the group (positions are always parent-relative).
fn position_row_groups(tree: &mut RenderTree, table: RenderItemId) {
    for child in tree.children(table) {
        if !matches!(
            tree.get(child).kind,
            RenderKind::TablePart(
                TableRole::RowGroup | TableRole::HeaderGroup | TableRole::FooterGroup
            )
        ) {
            continue;
        }
        let mut bounds = Rect::default();
        for row in tree.children(child) {
            bounds = bounds.union(&tree.get(row).pos);
        }
        tree.get_mut(child).pos = bounds;
        for row in tree.children(child) {
            let item = tree.get_mut(row);
            item.pos.x -= bounds.x;
            item.pos.y -= bounds.y;
        }
    }
}
