//! The render-item tree.
//!
//! A parallel tree mirroring visible flow. Each item exclusively owns its
//! children (arena indices) and points back at its source node; one
//! element may be referenced by several items when an inline had to be
//! split around a block child. Construction performs the classic
//! fixups:
//!
//! 1. Contiguous runs of inline-level children under a block-context
//!    parent are wrapped in anonymous block items; trailing
//!    whitespace-only runs are discarded.
//! 2. An inline element containing a block-level descendant is split:
//!    cloned left and right of the hoisted block, outer edges kept on
//!    the outermost halves only.
//!
//! `::before`/`::after` content was already materialized into real
//! elements during the cascade, so the builder sees it as ordinary
//! children.

use vellum_dom::{DomTree, NodeId, NodeType};

use crate::cascade::StyleMap;
use crate::style::computed::CssProperties;
use crate::style::keywords::{Display, Float, Overflow, Position};
use crate::style::values::Quad;

use super::box_model::Rect;
use super::inline::LineBox;

/// Index of a render item in its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderItemId(pub usize);

/// What a render item was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSource {
    /// A source element.
    Element(NodeId),
    /// A text node (always inline-level).
    Text(NodeId),
    /// Synthesized, no source node (anonymous blocks).
    Anonymous,
}

/// Table structural roles for `TablePart` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRole {
    /// `table-row`
    Row,
    /// `table-row-group`
    RowGroup,
    /// `table-header-group`
    HeaderGroup,
    /// `table-footer-group`
    FooterGroup,
    /// `table-column`
    Column,
    /// `table-column-group`
    ColumnGroup,
}

/// The layout strategy an item dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderKind {
    /// Inline box or text run; placed into line boxes by its parent.
    Inline,
    /// Block container whose contents have not been classified yet
    /// (transient during construction) or an atomic block (image-less
    /// replaced content, cells before table layout).
    Block,
    /// Block container with block-level children.
    BlockContext,
    /// Block container with only inline-level children; owns line boxes.
    InlineContext,
    /// Flex container.
    Flex,
    /// Table wrapper.
    Table,
    /// Row/row-group/column structure inside a table.
    TablePart(TableRole),
    /// Replaced image box.
    Image,
}

/// One node of the render tree.
#[derive(Debug, Clone)]
pub struct RenderItem {
    /// Source node.
    pub source: RenderSource,
    /// Layout strategy.
    pub kind: RenderKind,
    /// Computed style snapshot (cloned per item; split-inline halves
    /// carry edited edge values).
    pub props: CssProperties,
    /// Content box, relative to the parent item's content box origin.
    pub pos: Rect,
    /// Resolved margins in px (margin-box = pos expanded by
    /// borders+paddings+margins).
    pub margins: Quad<i32>,
    /// Resolved paddings in px.
    pub paddings: Quad<i32>,
    /// Resolved border widths in px.
    pub borders: Quad<i32>,
    /// True when the item was collapsed away (e.g. leading whitespace on
    /// a line) and must be ignored by paint and hit testing.
    pub skip: bool,
    /// Text content for text-run items (a copy; the DOM stays canonical).
    pub text: Option<String>,
    /// `src` attribute for image items.
    pub image_src: Option<String>,
    /// width/height presentation attributes for image items.
    pub attr_size: (Option<i32>, Option<i32>),
    /// True for `<br>` — forces a line break instead of flowing inline.
    pub forces_line_break: bool,
    /// Table cell column span (from the `colspan` attribute, min 1).
    pub colspan: i32,
    /// Table cell row span (from the `rowspan` attribute, min 1).
    pub rowspan: i32,
    /// `<ol start>` value on list containers; offsets marker numbering.
    pub list_start: Option<i32>,
    /// Parent item.
    pub parent: Option<RenderItemId>,
    /// Children in flow order.
    pub children: Vec<RenderItemId>,
    /// Line boxes (InlineContext items only, filled during layout).
    pub lines: Vec<LineBox>,
    /// Baseline of the first line/content, offset from the content top.
    pub first_baseline: Option<i32>,
    /// Baseline of the last line/content.
    pub last_baseline: Option<i32>,
}

impl RenderItem {
    fn new(source: RenderSource, kind: RenderKind, props: CssProperties) -> Self {
        Self {
            source,
            kind,
            props,
            pos: Rect::default(),
            margins: Quad::uniform(0),
            paddings: Quad::uniform(0),
            borders: Quad::uniform(0),
            skip: false,
            text: None,
            image_src: None,
            attr_size: (None, None),
            forces_line_break: false,
            colspan: 1,
            rowspan: 1,
            list_start: None,
            parent: None,
            children: Vec::new(),
            lines: Vec::new(),
            first_baseline: None,
            last_baseline: None,
        }
    }

    /// Margin-box width: `pos.width` plus paddings, borders, and margins.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.pos.width
            + self.paddings.left
            + self.paddings.right
            + self.borders.left
            + self.borders.right
            + self.margins.left
            + self.margins.right
    }

    /// Margin-box height.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.pos.height
            + self.paddings.top
            + self.paddings.bottom
            + self.borders.top
            + self.borders.bottom
            + self.margins.top
            + self.margins.bottom
    }

    /// The source element's node id, if any.
    #[must_use]
    pub const fn element(&self) -> Option<NodeId> {
        match self.source {
            RenderSource::Element(id) => Some(id),
            _ => None,
        }
    }

    /// [CSS 2.2 § 9.4.1] True when this item establishes the block
    /// formatting context that owns descendant floats: the root, floats
    /// themselves, inline-blocks, table cells, positioned boxes, and
    /// non-visible overflow.
    #[must_use]
    pub fn is_floats_holder(&self) -> bool {
        self.parent.is_none()
            || self.props.float != Float::None
            || self.props.position.is_out_of_flow()
            || self.props.overflow != Overflow::Visible
            || matches!(
                self.props.display,
                Display::InlineBlock | Display::TableCell | Display::InlineFlex | Display::Flex
            )
            || matches!(self.kind, RenderKind::Table | RenderKind::Image)
    }

    /// True for content placed into line boxes rather than stacked
    /// vertically.
    #[must_use]
    pub fn is_inline_level(&self) -> bool {
        match self.source {
            RenderSource::Text(_) => true,
            RenderSource::Anonymous => false,
            RenderSource::Element(_) => {
                if self.props.float != Float::None || self.props.position.is_out_of_flow() {
                    return false;
                }
                self.props.display.is_inline_level()
            }
        }
    }

    /// In-flow check: floats and absolute/fixed boxes are out of flow.
    #[must_use]
    pub fn in_flow(&self) -> bool {
        self.props.float == Float::None
            && !self.props.position.is_out_of_flow()
            && self.props.display != Display::None
    }
}

/// The arena of render items.
#[derive(Debug, Default)]
pub struct RenderTree {
    items: Vec<RenderItem>,
    root: Option<RenderItemId>,
}

impl RenderTree {
    /// Build the render tree for a styled document.
    ///
    /// Returns `None` when the document element is missing or
    /// `display: none`.
    #[must_use]
    pub fn build(dom: &DomTree, styles: &StyleMap) -> Option<Self> {
        let mut tree = Self::default();
        let root_element = dom.document_element()?;
        let root = tree.build_node(dom, styles, root_element, None)?;
        tree.root = Some(root);
        tree.mark_blank_text(dom);
        tree.init_containers(root);
        Some(tree)
    }

    /// The root render item (the document element's box).
    #[must_use]
    pub fn root(&self) -> RenderItemId {
        self.root.unwrap_or(RenderItemId(0))
    }

    /// Borrow an item.
    #[must_use]
    pub fn get(&self, id: RenderItemId) -> &RenderItem {
        &self.items[id.0]
    }

    /// Borrow an item mutably.
    pub fn get_mut(&mut self, id: RenderItemId) -> &mut RenderItem {
        &mut self.items[id.0]
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the tree has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Children of an item, cloned (layout mutates while iterating).
    #[must_use]
    pub fn children(&self, id: RenderItemId) -> Vec<RenderItemId> {
        self.items[id.0].children.clone()
    }

    /// Content-box position in document coordinates: the sum of ancestor
    /// offsets plus the item's own `pos`.
    #[must_use]
    pub fn placement(&self, id: RenderItemId) -> Rect {
        let mut rect = self.items[id.0].pos;
        let mut current = self.items[id.0].parent;
        while let Some(parent) = current {
            let item = &self.items[parent.0];
            rect.x += item.pos.x;
            rect.y += item.pos.y;
            current = item.parent;
        }
        rect
    }

    /// Border-box rectangle in document coordinates.
    #[must_use]
    pub fn border_box(&self, id: RenderItemId) -> Rect {
        let item = &self.items[id.0];
        let padding_then_border = Quad {
            top: item.paddings.top + item.borders.top,
            right: item.paddings.right + item.borders.right,
            bottom: item.paddings.bottom + item.borders.bottom,
            left: item.paddings.left + item.borders.left,
        };
        self.placement(id).expanded(&padding_then_border)
    }

    /// Margin-box rectangle in document coordinates.
    #[must_use]
    pub fn margin_box(&self, id: RenderItemId) -> Rect {
        let item = &self.items[id.0];
        let all = Quad {
            top: item.paddings.top + item.borders.top + item.margins.top,
            right: item.paddings.right + item.borders.right + item.margins.right,
            bottom: item.paddings.bottom + item.borders.bottom + item.margins.bottom,
            left: item.paddings.left + item.borders.left + item.margins.left,
        };
        self.placement(id).expanded(&all)
    }

    /// Allocate an item without attaching it.
    pub fn alloc(&mut self, item: RenderItem) -> RenderItemId {
        let id = RenderItemId(self.items.len());
        self.items.push(item);
        id
    }

    fn attach(&mut self, parent: RenderItemId, child: RenderItemId) {
        self.items[child.0].parent = Some(parent);
        self.items[parent.0].children.push(child);
    }

    // ── Construction ──────────────────────────────────────────────────

    fn build_node(
        &mut self,
        dom: &DomTree,
        styles: &StyleMap,
        node: NodeId,
        parent_props: Option<&CssProperties>,
    ) -> Option<RenderItemId> {
        match &dom.get(node)?.node_type {
            NodeType::Element(_) => {
                let props = styles.get(&node)?.clone();
                if props.display == Display::None {
                    return None;
                }
                let kind = kind_for(dom, node, &props);
                let id = self.alloc(RenderItem::new(RenderSource::Element(node), kind, props));
                {
                    let element = dom.as_element(node);
                    let item = &mut self.items[id.0];
                    item.forces_line_break = dom.is_tag(node, "br");
                    item.list_start = element
                        .and_then(|e| e.attr("start")?.trim().parse::<i32>().ok());
                    if item.props.display == Display::TableCell {
                        let span = |name: &str| {
                            element
                                .and_then(|e| e.attr(name)?.trim().parse::<i32>().ok())
                                .map_or(1, |v| v.max(1))
                        };
                        item.colspan = span("colspan");
                        item.rowspan = span("rowspan");
                    }
                    if kind == RenderKind::Image {
                        item.image_src = element
                            .and_then(|e| e.attr("src"))
                            .map(str::to_string);
                        item.attr_size = (
                            element.and_then(|e| e.attr("width")?.trim().parse().ok()),
                            element.and_then(|e| e.attr("height")?.trim().parse().ok()),
                        );
                    }
                }
                let children: Vec<NodeId> = dom.children(node).to_vec();
                let props_snapshot = self.items[id.0].props.clone();
                for child in children {
                    if let Some(child_item) =
                        self.build_node(dom, styles, child, Some(&props_snapshot))
                    {
                        self.attach(id, child_item);
                    }
                }
                Some(id)
            }
            NodeType::Text(text) => {
                // Whitespace-only text between block boxes disappears
                // entirely; real whitespace inside inline content is
                // handled by line layout.
                let props = parent_props.cloned().unwrap_or_default();
                if text.trim().is_empty() && !props.white_space.preserves_newlines() {
                    let parent_display = parent_props.map(|p| p.display);
                    if matches!(
                        parent_display,
                        Some(
                            Display::Table
                                | Display::TableRow
                                | Display::TableRowGroup
                                | Display::TableHeaderGroup
                                | Display::TableFooterGroup
                                | Display::Flex
                                | Display::InlineFlex
                        )
                    ) {
                        return None;
                    }
                }
                let text_props = text_run_props(&props);
                let id = self.alloc(RenderItem::new(
                    RenderSource::Text(node),
                    RenderKind::Inline,
                    text_props,
                ));
                self.items[id.0].text = Some(text.clone());
                Some(id)
            }
            NodeType::Document | NodeType::Comment(_) => None,
        }
    }

    /// Post-construction pass: split inlines, wrap anonymous blocks, and
    /// settle each container's final kind.
    fn init_containers(&mut self, id: RenderItemId) {
        let kind = self.items[id.0].kind;
        match kind {
            RenderKind::Block | RenderKind::Flex => {
                // Splitting may lift blocks out of inline children.
                let original = self.children(id);
                let mut flattened: Vec<RenderItemId> = Vec::new();
                for child in original {
                    flattened.extend(self.flatten_inline(child));
                }
                for &child in &flattened {
                    self.items[child.0].parent = Some(id);
                }
                self.items[id.0].children = flattened;

                if kind == RenderKind::Flex {
                    self.wrap_flex_items(id);
                } else {
                    self.classify_block(id);
                }
            }
            RenderKind::Table | RenderKind::TablePart(_) => {
                // Structure items keep element children only; stray text
                // between rows/cells does not generate boxes.
                let children = self.children(id);
                let kept: Vec<RenderItemId> = children
                    .into_iter()
                    .filter(|&child| !matches!(self.items[child.0].source, RenderSource::Text(_)))
                    .collect();
                self.items[id.0].children = kept;
            }
            _ => {}
        }

        for child in self.children(id) {
            self.init_containers(child);
        }
    }

    /// Decide Block vs BlockContext vs InlineContext and wrap anonymous
    /// blocks.
    ///
    /// [CSS 2.2 § 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS22/visuren.html#anonymous-block-level)
    fn classify_block(&mut self, id: RenderItemId) {
        let children = self.children(id);
        let has_block = children.iter().any(|&c| !self.items[c.0].is_inline_level());
        let has_inline = children.iter().any(|&c| self.items[c.0].is_inline_level());

        if !has_block {
            // All inline (or empty): this box builds line boxes itself.
            self.items[id.0].kind = RenderKind::InlineContext;
            return;
        }
        self.items[id.0].kind = RenderKind::BlockContext;
        if !has_inline {
            return;
        }

        // Mixed: wrap each inline run in an anonymous block. Runs that
        // are whitespace-only text generate nothing.
        let mut rebuilt: Vec<RenderItemId> = Vec::new();
        let mut run: Vec<RenderItemId> = Vec::new();
        let parent_props = self.items[id.0].props.clone();

        let mut flush =
            |tree: &mut Self, run: &mut Vec<RenderItemId>, rebuilt: &mut Vec<RenderItemId>| {
                if run.is_empty() {
                    return;
                }
                let only_whitespace = run.iter().all(|&c| tree.is_whitespace_text(c));
                if only_whitespace {
                    run.clear();
                    return;
                }
                let anon = tree.alloc(RenderItem::new(
                    RenderSource::Anonymous,
                    RenderKind::InlineContext,
                    anonymous_block_props(&parent_props),
                ));
                for &child in run.iter() {
                    tree.items[child.0].parent = Some(anon);
                }
                tree.items[anon.0].children = std::mem::take(run);
                rebuilt.push(anon);
            };

        for child in children {
            if self.items[child.0].is_inline_level() {
                run.push(child);
            } else {
                flush(self, &mut run, &mut rebuilt);
                rebuilt.push(child);
            }
        }
        flush(self, &mut run, &mut rebuilt);

        for &child in &rebuilt {
            self.items[child.0].parent = Some(id);
        }
        self.items[id.0].children = rebuilt;
    }

    /// [Flexbox § 4] "Each contiguous sequence of child text runs is
    /// wrapped in an anonymous block container flex item."
    fn wrap_flex_items(&mut self, id: RenderItemId) {
        let children = self.children(id);
        let mut rebuilt: Vec<RenderItemId> = Vec::new();
        let mut run: Vec<RenderItemId> = Vec::new();
        let parent_props = self.items[id.0].props.clone();

        for child in children {
            if self.items[child.0].is_inline_level() {
                if !self.is_whitespace_text(child) {
                    run.push(child);
                }
            } else {
                if !run.is_empty() {
                    rebuilt.push(self.wrap_run(&mut run, &parent_props));
                }
                rebuilt.push(child);
            }
        }
        if !run.is_empty() {
            rebuilt.push(self.wrap_run(&mut run, &parent_props));
        }

        for &child in &rebuilt {
            self.items[child.0].parent = Some(id);
        }
        self.items[id.0].children = rebuilt;
    }

    fn wrap_run(
        &mut self,
        run: &mut Vec<RenderItemId>,
        parent_props: &CssProperties,
    ) -> RenderItemId {
        let anon = self.alloc(RenderItem::new(
            RenderSource::Anonymous,
            RenderKind::InlineContext,
            anonymous_block_props(parent_props),
        ));
        for &child in run.iter() {
            self.items[child.0].parent = Some(anon);
        }
        self.items[anon.0].children = std::mem::take(run);
        anon
    }

    /// [CSS 2.2 § 9.2.1.1] "When an inline box contains an in-flow
    /// block-level box, the inline box (and its inline ancestors within
    /// the same line box) are broken around the block-level box."
    ///
    /// Returns the flattened replacement sequence for `id`: either just
    /// `[id]`, or `[left-half, blocks..., right-half]` with the halves
    /// carrying only their outer edges.
    fn flatten_inline(&mut self, id: RenderItemId) -> Vec<RenderItemId> {
        if self.items[id.0].kind != RenderKind::Inline
            || matches!(self.items[id.0].source, RenderSource::Text(_))
        {
            return vec![id];
        }
        let children = self.children(id);
        let contains_block = children.iter().any(|&c| {
            !self.items[c.0].is_inline_level()
                || self
                    .flattenable_block_inside(c)
        });
        if !contains_block {
            return vec![id];
        }

        let source = self.items[id.0].source;
        let props = self.items[id.0].props.clone();

        let mut out: Vec<RenderItemId> = Vec::new();
        let mut segment_children: Vec<RenderItemId> = Vec::new();
        let mut segments: Vec<Vec<RenderItemId>> = Vec::new();
        let mut blocks_after_segment: Vec<Vec<RenderItemId>> = Vec::new();

        for child in children {
            for part in self.flatten_inline(child) {
                if self.items[part.0].is_inline_level() {
                    segment_children.push(part);
                } else {
                    segments.push(std::mem::take(&mut segment_children));
                    blocks_after_segment.push(vec![part]);
                }
            }
        }
        segments.push(segment_children);

        let last_segment = segments.len() - 1;
        for (index, segment) in segments.into_iter().enumerate() {
            let mut half_props = props.clone();
            strip_inline_edges(&mut half_props, index == 0, index == last_segment);
            let half = self.alloc(RenderItem::new(source, RenderKind::Inline, half_props));
            for &child in &segment {
                self.items[child.0].parent = Some(half);
            }
            self.items[half.0].children = segment;
            out.push(half);
            if index < last_segment {
                out.extend(blocks_after_segment[index].iter().copied());
            }
        }

        out
    }

    /// True when an inline child transitively holds a block-level box
    /// (through inline descendants only).
    fn flattenable_block_inside(&self, id: RenderItemId) -> bool {
        if self.items[id.0].kind != RenderKind::Inline {
            return false;
        }
        self.items[id.0].children.iter().any(|&c| {
            !self.items[c.0].is_inline_level() || self.flattenable_block_inside(c)
        })
    }

    /// True for a text item consisting purely of whitespace.
    fn is_whitespace_text(&self, id: RenderItemId) -> bool {
        matches!(self.items[id.0].source, RenderSource::Text(_)) && self.items[id.0].children.is_empty()
            && self.items[id.0].props.white_space.collapses_whitespace()
            && self.text_is_blank(id)
    }

    /// Whether the backing text node is blank; the tree does not store
    /// text, so this is filled in by the caller via `set_blank` marks.
    fn text_is_blank(&self, id: RenderItemId) -> bool {
        self.items[id.0].skip
    }

    /// Mark whitespace-only text items before container classification.
    ///
    /// Layout later clears the flag on items that do get placed.
    pub fn mark_blank_text(&mut self, dom: &DomTree) {
        for item in &mut self.items {
            if let RenderSource::Text(node) = item.source {
                if dom
                    .as_text(node)
                    .is_some_and(|text| text.trim().is_empty())
                {
                    item.skip = true;
                }
            }
        }
    }
}

/// [spec table] display → render kind.
fn kind_for(dom: &DomTree, node: NodeId, props: &CssProperties) -> RenderKind {
    if dom.is_tag(node, "img") {
        return RenderKind::Image;
    }
    match props.display {
        Display::Block
        | Display::ListItem
        | Display::InlineBlock
        | Display::TableCell
        | Display::TableCaption => RenderKind::Block,
        Display::Table | Display::InlineTable => RenderKind::Table,
        Display::TableRow => RenderKind::TablePart(TableRole::Row),
        Display::TableRowGroup => RenderKind::TablePart(TableRole::RowGroup),
        Display::TableHeaderGroup => RenderKind::TablePart(TableRole::HeaderGroup),
        Display::TableFooterGroup => RenderKind::TablePart(TableRole::FooterGroup),
        Display::TableColumn => RenderKind::TablePart(TableRole::Column),
        Display::TableColumnGroup => RenderKind::TablePart(TableRole::ColumnGroup),
        Display::Flex | Display::InlineFlex => RenderKind::Flex,
        Display::Inline | Display::None => RenderKind::Inline,
    }
}

/// Text runs inherit the parent's text styling and nothing else.
fn text_run_props(parent: &CssProperties) -> CssProperties {
    CssProperties {
        display: Display::Inline,
        ..parent.clone()
    }
}

/// An anonymous block inherits inherited properties from its parent but
/// carries no box styling of its own.
fn anonymous_block_props(parent: &CssProperties) -> CssProperties {
    let mut props = parent.clone();
    props.display = Display::Block;
    props.position = Position::Static;
    props.float = Float::None;
    props.margins = Quad::uniform(crate::style::values::Length::zero());
    props.paddings = Quad::uniform(crate::style::values::Length::zero());
    props.borders = crate::style::borders::Borders::default();
    props.width = crate::style::values::Length::auto();
    props.height = crate::style::values::Length::auto();
    props.background = crate::style::background::Background::default();
    props.z_index = None;
    props
}

/// Zero the inner edges on a split-inline half: the left half keeps only
/// its left margin/border/padding, the right half only its right, middle
/// segments neither.
fn strip_inline_edges(props: &mut CssProperties, keep_left: bool, keep_right: bool) {
    use crate::style::values::Length;
    if !keep_left {
        props.margins.left = Length::zero();
        props.paddings.left = Length::zero();
        props.borders.sides.left.style = crate::style::keywords::BorderStyle::None;
    }
    if !keep_right {
        props.margins.right = Length::zero();
        props.paddings.right = Length::zero();
        props.borders.sides.right.style = crate::style::keywords::BorderStyle::None;
    }
}
