//! Stacking contexts, paint order, and hit testing.
//!
//! [CSS 2.2 Appendix E — Elaborate description of Stacking Contexts](https://www.w3.org/TR/CSS22/zindex.html)
//!
//! Every positioned box is treated as a stacking context rooted at its
//! nearest positioned ancestor (or the tree root). Within a context the
//! painting order is: negative z-index contexts, the element's own
//! background and borders, block descendants, floats, inline content,
//! then zero and positive z-index contexts. Hit testing mirrors the
//! order in reverse.

use super::box_model::Rect;
use super::inline::FragmentContent;
use super::render_tree::{RenderItemId, RenderKind, RenderTree};

/// The positioned descendants grouped under one stacking context root.
#[derive(Debug, Default)]
pub struct StackingContext {
    /// Negative z-index descendants, most negative first.
    pub negative: Vec<RenderItemId>,
    /// Zero / auto z-index descendants in tree order.
    pub zero: Vec<RenderItemId>,
    /// Positive z-index descendants, least positive first.
    pub positive: Vec<RenderItemId>,
}

/// Collect the positioned descendants belonging to `root`'s stacking
/// context. Descent stops at positioned boxes — their own positioned
/// descendants belong to *their* context.
#[must_use]
pub fn collect_stacking_context(tree: &RenderTree, root: RenderItemId) -> StackingContext {
    let mut context = StackingContext::default();
    collect_into(tree, root, &mut context);

    // Stable sorts keep tree order between equal z values.
    context.negative.sort_by_key(|&id| z_of(tree, id));
    context.positive.sort_by_key(|&id| z_of(tree, id));
    context
}

fn collect_into(tree: &RenderTree, parent: RenderItemId, context: &mut StackingContext) {
    for child in tree.children(parent) {
        let item = tree.get(child);
        if item.props.position.is_positioned() {
            match item.props.z_index {
                Some(z) if z < 0 => context.negative.push(child),
                Some(z) if z > 0 => context.positive.push(child),
                _ => context.zero.push(child),
            }
            // The positioned child roots its own context.
            continue;
        }
        collect_into(tree, child, context);
    }
}

fn z_of(tree: &RenderTree, id: RenderItemId) -> i32 {
    tree.get(id).props.z_index.unwrap_or(0)
}

/// Hit test the whole tree: returns the topmost item whose border box
/// contains the document-space point.
///
/// Paint order reversed: positive z first, then inline content, floats,
/// blocks, negative z, finally the element itself.
#[must_use]
pub fn hit_test(tree: &RenderTree, x: i32, y: i32) -> Option<RenderItemId> {
    hit_test_context(tree, tree.root(), x, y)
}

fn hit_test_context(tree: &RenderTree, root: RenderItemId, x: i32, y: i32) -> Option<RenderItemId> {
    let context = collect_stacking_context(tree, root);

    for &id in context.positive.iter().rev() {
        if let Some(hit) = hit_test_context(tree, id, x, y) {
            return Some(hit);
        }
    }
    for &id in context.zero.iter().rev() {
        if let Some(hit) = hit_test_context(tree, id, x, y) {
            return Some(hit);
        }
    }
    if let Some(hit) = hit_test_flow(tree, root, x, y) {
        return Some(hit);
    }
    for &id in context.negative.iter() {
        if let Some(hit) = hit_test_context(tree, id, x, y) {
            return Some(hit);
        }
    }

    let item = tree.get(root);
    if !item.skip && tree.border_box(root).contains(x, y) {
        return Some(root);
    }
    None
}

/// In-flow content of one element: inline fragments, then floats, then
/// blocks, each in reverse tree order.
fn hit_test_flow(tree: &RenderTree, parent: RenderItemId, x: i32, y: i32) -> Option<RenderItemId> {
    // Inline fragments sit on top of sibling blocks.
    let placement = tree.placement(parent);
    for line in tree.get(parent).lines.iter().rev() {
        for fragment in line.fragments.iter().rev() {
            let rect = fragment.rect.translated(placement.x, placement.y);
            if rect.contains(x, y) && !matches!(fragment.content, FragmentContent::LineBreak) {
                let owner = RenderItemId(fragment.item);
                // Attribute the hit to the nearest element item.
                return Some(nearest_element(tree, owner));
            }
        }
    }

    let children = tree.children(parent);
    // Floats above normal blocks.
    for &child in children.iter().rev() {
        let item = tree.get(child);
        if item.props.position.is_positioned() || item.skip {
            continue;
        }
        if item.props.float == crate::style::keywords::Float::None {
            continue;
        }
        if let Some(hit) = hit_test_flow(tree, child, x, y) {
            return Some(hit);
        }
        if tree.border_box(child).contains(x, y) {
            return Some(child);
        }
    }
    for &child in children.iter().rev() {
        let item = tree.get(child);
        if item.props.position.is_positioned()
            || item.skip
            || item.props.float != crate::style::keywords::Float::None
        {
            continue;
        }
        if matches!(item.kind, RenderKind::Inline) {
            continue; // reached through fragments
        }
        if let Some(hit) = hit_test_flow(tree, child, x, y) {
            return Some(hit);
        }
        if tree.border_box(child).contains(x, y) {
            return Some(child);
        }
    }
    None
}

/// Walk up from a text/anonymous item to the closest element-backed one.
fn nearest_element(tree: &RenderTree, id: RenderItemId) -> RenderItemId {
    let mut current = id;
    loop {
        if tree.get(current).element().is_some() {
            return current;
        }
        match tree.get(current).parent {
            Some(parent) => current = parent,
            None => return id,
        }
    }
}

/// Border boxes of every render item generated by a source element
/// (split inlines may own several).
#[must_use]
pub fn element_boxes(tree: &RenderTree, node: vellum_dom::NodeId) -> Vec<Rect> {
    let mut boxes = Vec::new();
    for index in 0..tree.len() {
        let id = RenderItemId(index);
        let item = tree.get(id);
        if item.element() == Some(node) && !item.skip {
            let rect = tree.border_box(id);
            if rect.width > 0 && rect.height > 0 {
                boxes.push(rect);
            }
        }
    }
    boxes
}
