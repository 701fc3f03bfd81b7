//! Keyword property enums.
//!
//! Each enum mirrors one property's keyword set with a `from_ident`
//! constructor (lowercased input) and the property's initial value as
//! `Default`. Unknown idents return `None` and the declaration keeps its
//! previous value — unsupported keywords are never an error.

use serde::Serialize;

/// [CSS Display § 2 The display property](https://www.w3.org/TR/css-display-3/#the-display-properties)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Display {
    /// `display: none` — no box is generated.
    None,
    /// Block-level block container.
    Block,
    /// Inline-level content.
    #[default]
    Inline,
    /// Inline-level block container.
    InlineBlock,
    /// `list-item` — a block box with a marker.
    ListItem,
    /// Table wrapper box.
    Table,
    /// `inline-table`
    InlineTable,
    /// `table-row`
    TableRow,
    /// `table-row-group`
    TableRowGroup,
    /// `table-header-group`
    TableHeaderGroup,
    /// `table-footer-group`
    TableFooterGroup,
    /// `table-column`
    TableColumn,
    /// `table-column-group`
    TableColumnGroup,
    /// `table-cell`
    TableCell,
    /// `table-caption`
    TableCaption,
    /// Flex container.
    Flex,
    /// Inline-level flex container.
    InlineFlex,
}

impl Display {
    /// Parse a display keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "none" => Some(Self::None),
            "block" => Some(Self::Block),
            "inline" => Some(Self::Inline),
            "inline-block" => Some(Self::InlineBlock),
            "list-item" => Some(Self::ListItem),
            "table" => Some(Self::Table),
            "inline-table" => Some(Self::InlineTable),
            "table-row" => Some(Self::TableRow),
            "table-row-group" => Some(Self::TableRowGroup),
            "table-header-group" => Some(Self::TableHeaderGroup),
            "table-footer-group" => Some(Self::TableFooterGroup),
            "table-column" => Some(Self::TableColumn),
            "table-column-group" => Some(Self::TableColumnGroup),
            "table-cell" => Some(Self::TableCell),
            "table-caption" => Some(Self::TableCaption),
            "flex" => Some(Self::Flex),
            "inline-flex" => Some(Self::InlineFlex),
            _ => None,
        }
    }

    /// True for inline-level display values.
    #[must_use]
    pub const fn is_inline_level(self) -> bool {
        matches!(
            self,
            Self::Inline | Self::InlineBlock | Self::InlineTable | Self::InlineFlex
        )
    }

    /// [CSS 2.2 § 9.7] The blockification table applied to floated,
    /// absolutely positioned, and root elements.
    #[must_use]
    pub const fn blockified(self) -> Self {
        match self {
            Self::Inline | Self::InlineBlock => Self::Block,
            Self::InlineTable => Self::Table,
            Self::InlineFlex => Self::Flex,
            Self::TableRow
            | Self::TableRowGroup
            | Self::TableHeaderGroup
            | Self::TableFooterGroup
            | Self::TableColumn
            | Self::TableColumnGroup
            | Self::TableCell
            | Self::TableCaption => Self::Block,
            other => other,
        }
    }
}

/// [CSS 2.2 § 9.3.1 Choosing a positioning scheme](https://www.w3.org/TR/CSS22/visuren.html#choose-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Position {
    /// Normal flow.
    #[default]
    Static,
    /// Normal flow, then offset.
    Relative,
    /// Out of flow, positioned against the nearest positioned ancestor.
    Absolute,
    /// Out of flow, positioned against the viewport.
    Fixed,
}

impl Position {
    /// Parse a position keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "static" => Some(Self::Static),
            "relative" => Some(Self::Relative),
            "absolute" => Some(Self::Absolute),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }

    /// True when the element establishes a containing block for
    /// absolutely positioned descendants.
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }

    /// Out-of-flow variants.
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// [CSS 2.2 § 9.5.1 The float property](https://www.w3.org/TR/CSS22/visuren.html#float-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Float {
    /// Not floated.
    #[default]
    None,
    /// Floated to the left.
    Left,
    /// Floated to the right.
    Right,
}

impl Float {
    /// Parse a float keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "none" => Some(Self::None),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// [CSS 2.2 § 9.5.2 The clear property](https://www.w3.org/TR/CSS22/visuren.html#flow-control)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Clear {
    /// No clearance constraint.
    #[default]
    None,
    /// Below all earlier left floats.
    Left,
    /// Below all earlier right floats.
    Right,
    /// Below all earlier floats.
    Both,
}

impl Clear {
    /// Parse a clear keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "none" => Some(Self::None),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// [CSS 2.2 § 11.1.1 Overflow](https://www.w3.org/TR/CSS22/visufx.html#overflow)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Overflow {
    /// Content is not clipped.
    #[default]
    Visible,
    /// Content is clipped, no scrolling UI.
    Hidden,
    /// Content is clipped; the embedder may scroll.
    Scroll,
    /// Clipping at the embedder's discretion.
    Auto,
}

impl Overflow {
    /// Parse an overflow keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "visible" => Some(Self::Visible),
            "hidden" => Some(Self::Hidden),
            "scroll" => Some(Self::Scroll),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    /// Non-visible overflow starts a new block formatting context and
    /// clips descendants.
    #[must_use]
    pub const fn clips(self) -> bool {
        !matches!(self, Self::Visible)
    }
}

/// [CSS 2.2 § 11.2 Visibility](https://www.w3.org/TR/CSS22/visufx.html#visibility)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Visibility {
    /// Painted normally.
    #[default]
    Visible,
    /// Invisible but still laid out.
    Hidden,
    /// Table-row/column collapse; treated as hidden.
    Collapse,
}

impl Visibility {
    /// Parse a visibility keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "visible" => Some(Self::Visible),
            "hidden" => Some(Self::Hidden),
            "collapse" => Some(Self::Collapse),
            _ => None,
        }
    }
}

/// [CSS Text § 7.1 text-align](https://www.w3.org/TR/css-text-3/#text-align-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TextAlign {
    /// Lines are left-aligned.
    #[default]
    Left,
    /// Lines are right-aligned.
    Right,
    /// Lines are centered.
    Center,
    /// Justified (rendered as left).
    Justify,
}

impl TextAlign {
    /// Parse a text-align keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "left" | "start" => Some(Self::Left),
            "right" | "end" => Some(Self::Right),
            "center" => Some(Self::Center),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }
}

/// [CSS 2.2 § 10.8.1 vertical-align](https://www.w3.org/TR/CSS22/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum VerticalAlign {
    /// Align the box's baseline with the parent's baseline.
    #[default]
    Baseline,
    /// Subscript position.
    Sub,
    /// Superscript position.
    Super,
    /// Top of the line box.
    Top,
    /// Align with the top of the parent's text.
    TextTop,
    /// Center of the box with the parent's baseline plus half x-height.
    Middle,
    /// Bottom of the line box.
    Bottom,
    /// Align with the bottom of the parent's text.
    TextBottom,
}

impl VerticalAlign {
    /// Parse a vertical-align keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "baseline" => Some(Self::Baseline),
            "sub" => Some(Self::Sub),
            "super" => Some(Self::Super),
            "top" => Some(Self::Top),
            "text-top" => Some(Self::TextTop),
            "middle" => Some(Self::Middle),
            "bottom" => Some(Self::Bottom),
            "text-bottom" => Some(Self::TextBottom),
            _ => None,
        }
    }
}

/// [CSS Text § 3 White Space Processing](https://www.w3.org/TR/css-text-3/#white-space-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WhiteSpace {
    /// Collapse whitespace, wrap lines.
    #[default]
    Normal,
    /// Collapse whitespace, never wrap.
    Nowrap,
    /// Preserve whitespace, never wrap.
    Pre,
    /// Preserve newlines, collapse other whitespace, wrap.
    PreLine,
    /// Preserve whitespace, wrap.
    PreWrap,
}

impl WhiteSpace {
    /// Parse a white-space keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "normal" => Some(Self::Normal),
            "nowrap" => Some(Self::Nowrap),
            "pre" => Some(Self::Pre),
            "pre-line" => Some(Self::PreLine),
            "pre-wrap" => Some(Self::PreWrap),
            _ => None,
        }
    }

    /// True when consecutive whitespace collapses to one space.
    #[must_use]
    pub const fn collapses_whitespace(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// True when line boxes may break.
    #[must_use]
    pub const fn allows_wrapping(self) -> bool {
        matches!(self, Self::Normal | Self::PreLine | Self::PreWrap)
    }

    /// True when `\n` forces a line break.
    #[must_use]
    pub const fn preserves_newlines(self) -> bool {
        matches!(self, Self::Pre | Self::PreLine | Self::PreWrap)
    }
}

/// [CSS Text § 2.1 text-transform](https://www.w3.org/TR/css-text-3/#text-transform)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum TextTransform {
    /// No transformation.
    #[default]
    None,
    /// First letter of each word uppercased.
    Capitalize,
    /// All uppercase.
    Uppercase,
    /// All lowercase.
    Lowercase,
}

impl TextTransform {
    /// Parse a text-transform keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "none" => Some(Self::None),
            "capitalize" => Some(Self::Capitalize),
            "uppercase" => Some(Self::Uppercase),
            "lowercase" => Some(Self::Lowercase),
            _ => None,
        }
    }
}

/// [CSS Box Sizing § 4.4 box-sizing](https://www.w3.org/TR/css-sizing-3/#box-sizing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BoxSizing {
    /// width/height set the content box.
    #[default]
    ContentBox,
    /// width/height set the border box.
    BorderBox,
}

impl BoxSizing {
    /// Parse a box-sizing keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "content-box" => Some(Self::ContentBox),
            "border-box" => Some(Self::BorderBox),
            _ => None,
        }
    }
}

/// [CSS 2.2 § 12.5.1 list-style-type](https://www.w3.org/TR/CSS22/generate.html#propdef-list-style-type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ListStyleType {
    /// No marker.
    None,
    /// Filled circle.
    #[default]
    Disc,
    /// Hollow circle.
    Circle,
    /// Filled square.
    Square,
    /// `1. 2. 3.`
    Decimal,
    /// `a. b. c.`
    LowerAlpha,
    /// `A. B. C.`
    UpperAlpha,
    /// `i. ii. iii.`
    LowerRoman,
    /// `I. II. III.`
    UpperRoman,
}

impl ListStyleType {
    /// Parse a list-style-type keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "none" => Some(Self::None),
            "disc" => Some(Self::Disc),
            "circle" => Some(Self::Circle),
            "square" => Some(Self::Square),
            "decimal" => Some(Self::Decimal),
            "lower-alpha" | "lower-latin" => Some(Self::LowerAlpha),
            "upper-alpha" | "upper-latin" => Some(Self::UpperAlpha),
            "lower-roman" => Some(Self::LowerRoman),
            "upper-roman" => Some(Self::UpperRoman),
            _ => None,
        }
    }

    /// True for the numbered variants.
    #[must_use]
    pub const fn is_numbered(self) -> bool {
        matches!(
            self,
            Self::Decimal
                | Self::LowerAlpha
                | Self::UpperAlpha
                | Self::LowerRoman
                | Self::UpperRoman
        )
    }
}

/// [CSS 2.2 § 12.5.1 list-style-position](https://www.w3.org/TR/CSS22/generate.html#propdef-list-style-position)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ListStylePosition {
    /// Marker outside the principal box.
    #[default]
    Outside,
    /// Marker as the first inline box.
    Inside,
}

impl ListStylePosition {
    /// Parse a list-style-position keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "outside" => Some(Self::Outside),
            "inside" => Some(Self::Inside),
            _ => None,
        }
    }
}

/// [CSS Flexbox § 5.1 flex-direction](https://www.w3.org/TR/css-flexbox-1/#flex-direction-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FlexDirection {
    /// Main axis is horizontal, left to right.
    #[default]
    Row,
    /// Horizontal, reversed placement.
    RowReverse,
    /// Main axis is vertical.
    Column,
    /// Vertical, reversed placement.
    ColumnReverse,
}

impl FlexDirection {
    /// Parse a flex-direction keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "row" => Some(Self::Row),
            "row-reverse" => Some(Self::RowReverse),
            "column" => Some(Self::Column),
            "column-reverse" => Some(Self::ColumnReverse),
            _ => None,
        }
    }

    /// True for the column variants (main axis vertical).
    #[must_use]
    pub const fn is_column(self) -> bool {
        matches!(self, Self::Column | Self::ColumnReverse)
    }

    /// True for the reversed variants.
    #[must_use]
    pub const fn is_reverse(self) -> bool {
        matches!(self, Self::RowReverse | Self::ColumnReverse)
    }
}

/// [CSS Flexbox § 5.2 flex-wrap](https://www.w3.org/TR/css-flexbox-1/#flex-wrap-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FlexWrap {
    /// Single line.
    #[default]
    Nowrap,
    /// Multi-line.
    Wrap,
    /// Multi-line, cross axis reversed.
    WrapReverse,
}

impl FlexWrap {
    /// Parse a flex-wrap keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "nowrap" => Some(Self::Nowrap),
            "wrap" => Some(Self::Wrap),
            "wrap-reverse" => Some(Self::WrapReverse),
            _ => None,
        }
    }
}

/// [CSS Flexbox § 8.2 justify-content](https://www.w3.org/TR/css-flexbox-1/#justify-content-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum JustifyContent {
    /// Packed at main-start.
    #[default]
    FlexStart,
    /// Packed at main-end.
    FlexEnd,
    /// Centered.
    Center,
    /// First and last flush, equal gaps between.
    SpaceBetween,
    /// Equal space around each item.
    SpaceAround,
    /// Equal space between and around.
    SpaceEvenly,
}

impl JustifyContent {
    /// Parse a justify-content keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "flex-start" | "start" => Some(Self::FlexStart),
            "flex-end" | "end" => Some(Self::FlexEnd),
            "center" => Some(Self::Center),
            "space-between" => Some(Self::SpaceBetween),
            "space-around" => Some(Self::SpaceAround),
            "space-evenly" => Some(Self::SpaceEvenly),
            _ => None,
        }
    }
}

/// [CSS Flexbox § 8.3 align-items](https://www.w3.org/TR/css-flexbox-1/#align-items-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AlignItems {
    /// Fill the line's cross size.
    #[default]
    Stretch,
    /// Cross-start edge.
    FlexStart,
    /// Cross-end edge.
    FlexEnd,
    /// Centered on the cross axis.
    Center,
    /// First baselines aligned.
    Baseline,
    /// Last baselines aligned.
    LastBaseline,
}

impl AlignItems {
    /// Parse an align-items keyword (`last baseline` arrives as two
    /// idents and is handled by the caller).
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "stretch" => Some(Self::Stretch),
            "flex-start" | "start" | "self-start" => Some(Self::FlexStart),
            "flex-end" | "end" | "self-end" => Some(Self::FlexEnd),
            "center" => Some(Self::Center),
            "baseline" => Some(Self::Baseline),
            _ => None,
        }
    }
}

/// [CSS Flexbox § 8.4 align-self](https://www.w3.org/TR/css-flexbox-1/#align-self-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AlignSelf {
    /// Defer to the container's `align-items`.
    #[default]
    Auto,
    /// Fill the line's cross size.
    Stretch,
    /// Cross-start edge.
    FlexStart,
    /// Cross-end edge.
    FlexEnd,
    /// Centered.
    Center,
    /// First baselines aligned.
    Baseline,
    /// Last baselines aligned.
    LastBaseline,
}

impl AlignSelf {
    /// Parse an align-self keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "auto" => Some(Self::Auto),
            "stretch" => Some(Self::Stretch),
            "flex-start" | "start" | "self-start" => Some(Self::FlexStart),
            "flex-end" | "end" | "self-end" => Some(Self::FlexEnd),
            "center" => Some(Self::Center),
            "baseline" => Some(Self::Baseline),
            _ => None,
        }
    }
}

/// [CSS Flexbox § 8.5 align-content](https://www.w3.org/TR/css-flexbox-1/#align-content-property)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AlignContent {
    /// Lines stretch to fill the cross axis.
    #[default]
    Stretch,
    /// Lines packed at cross-start.
    FlexStart,
    /// Lines packed at cross-end.
    FlexEnd,
    /// Lines centered.
    Center,
    /// Equal gaps between lines.
    SpaceBetween,
    /// Equal space around lines.
    SpaceAround,
}

impl AlignContent {
    /// Parse an align-content keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "stretch" => Some(Self::Stretch),
            "flex-start" | "start" => Some(Self::FlexStart),
            "flex-end" | "end" => Some(Self::FlexEnd),
            "center" => Some(Self::Center),
            "space-between" => Some(Self::SpaceBetween),
            "space-around" => Some(Self::SpaceAround),
            _ => None,
        }
    }
}

/// [CSS Backgrounds § 3.2 border-style](https://www.w3.org/TR/css-backgrounds-3/#border-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BorderStyle {
    /// No border.
    #[default]
    None,
    /// Like none, but wins border-collapse resolution.
    Hidden,
    /// Dotted line.
    Dotted,
    /// Dashed line.
    Dashed,
    /// Solid line.
    Solid,
    /// Two solid lines.
    Double,
    /// Carved appearance.
    Groove,
    /// Embossed appearance.
    Ridge,
    /// Inset appearance.
    Inset,
    /// Outset appearance.
    Outset,
}

impl BorderStyle {
    /// Parse a border-style keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "none" => Some(Self::None),
            "hidden" => Some(Self::Hidden),
            "dotted" => Some(Self::Dotted),
            "dashed" => Some(Self::Dashed),
            "solid" => Some(Self::Solid),
            "double" => Some(Self::Double),
            "groove" => Some(Self::Groove),
            "ridge" => Some(Self::Ridge),
            "inset" => Some(Self::Inset),
            "outset" => Some(Self::Outset),
            _ => None,
        }
    }

    /// Styles that draw nothing contribute zero width.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }
}

/// [CSS 2.2 § 17.6 Borders in tables](https://www.w3.org/TR/CSS22/tables.html#borders)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BorderCollapse {
    /// Separated borders model.
    #[default]
    Separate,
    /// Collapsed borders model.
    Collapse,
}

impl BorderCollapse {
    /// Parse a border-collapse keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "separate" => Some(Self::Separate),
            "collapse" => Some(Self::Collapse),
            _ => None,
        }
    }
}

/// [CSS Backgrounds § 3.4 background-repeat](https://www.w3.org/TR/css-backgrounds-3/#the-background-repeat)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BackgroundRepeat {
    /// Tile both axes.
    #[default]
    Repeat,
    /// Tile horizontally.
    RepeatX,
    /// Tile vertically.
    RepeatY,
    /// Paint once.
    NoRepeat,
}

impl BackgroundRepeat {
    /// Parse a background-repeat keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "repeat" => Some(Self::Repeat),
            "repeat-x" => Some(Self::RepeatX),
            "repeat-y" => Some(Self::RepeatY),
            "no-repeat" => Some(Self::NoRepeat),
            _ => None,
        }
    }
}

/// [CSS Backgrounds § 3.5 background-attachment](https://www.w3.org/TR/css-backgrounds-3/#the-background-attachment)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BackgroundAttachment {
    /// Scrolls with the element.
    #[default]
    Scroll,
    /// Fixed to the viewport.
    Fixed,
}

impl BackgroundAttachment {
    /// Parse a background-attachment keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "scroll" => Some(Self::Scroll),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

/// Background painting area / positioning area boxes.
///
/// [CSS Backgrounds § 3.7 background-clip, § 3.8 background-origin](https://www.w3.org/TR/css-backgrounds-3/#the-background-clip)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BackgroundBox {
    /// The border box.
    BorderBox,
    /// The padding box.
    PaddingBox,
    /// The content box.
    ContentBox,
}

impl BackgroundBox {
    /// Parse a box keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "border-box" => Some(Self::BorderBox),
            "padding-box" => Some(Self::PaddingBox),
            "content-box" => Some(Self::ContentBox),
            _ => None,
        }
    }
}

/// [CSS UI § 8.1 cursor](https://www.w3.org/TR/css-ui-3/#cursor)
///
/// Delivered verbatim to the embedder through `set_cursor`; the engine
/// only needs to know the keyword survives the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum Cursor {
    /// Let the embedder pick.
    #[default]
    Auto,
    /// A named cursor (`pointer`, `text`, `default`, ...).
    Named(String),
}

impl Cursor {
    /// The name delivered to the embedder.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::Named(name) => name,
        }
    }
}
