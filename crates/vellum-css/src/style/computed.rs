//! The computed property set.
//!
//! [CSS Cascading § 4.4 Computed Values](https://www.w3.org/TR/css-cascade-4/#computed)
//!
//! [`CssProperties`] is one element's resolved, inheritance-applied value
//! set. It is computed from a [`PropertyMap`] — the cascaded longhand
//! declarations — plus the parent's computed set. Length descriptors are
//! retained so layout can re-resolve percentages against each containing
//! block.

use std::collections::HashMap;

use vellum_common::warn_once;

use crate::parser::{ComponentValue, Declaration};
use crate::tokenizer::CssToken;

use super::background::{Background, BackgroundSize, ImageSource};
use super::borders::{Border, Borders};
use super::font::{FontDescription, FontHandle, FontMetrics, FontSource, FontStyle, TextDecoration};
use super::keywords::{
    AlignContent, AlignItems, AlignSelf, BorderCollapse, BorderStyle, BoxSizing, Clear, Cursor,
    Display, FlexDirection, FlexWrap, Float, JustifyContent, ListStylePosition, ListStyleType,
    Overflow, Position, TextAlign, TextTransform, VerticalAlign, Visibility, WhiteSpace,
};
use super::shorthand::expand_shorthand;
use super::values::{Color, Length, LengthKeyword, LengthUnit, Quad, ResolveCtx};

/// [Original table]: the seven keyword sizes per document default size
/// 9..=16 px; columns xx-small .. xx-large.
static FONT_SIZE_TABLE: [[i32; 7]; 8] = [
    [9, 9, 9, 9, 11, 14, 18],
    [9, 9, 9, 10, 12, 15, 20],
    [9, 9, 9, 11, 13, 17, 22],
    [9, 9, 10, 12, 14, 18, 24],
    [9, 9, 10, 13, 16, 20, 26],
    [9, 9, 11, 14, 17, 21, 28],
    [9, 10, 12, 15, 17, 23, 30],
    [9, 10, 13, 16, 18, 24, 32],
];

/// The cascaded declarations for one element: longhand name → value,
/// with the `!important` winner rule applied at insert time.
#[derive(Debug, Default, Clone)]
pub struct PropertyMap {
    map: HashMap<String, (Vec<ComponentValue>, bool)>,
}

impl PropertyMap {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one declaration, expanding shorthands.
    ///
    /// Callers feed declarations in cascade order (weakest first), so a
    /// plain insert overwrite implements "later wins"; an existing
    /// `!important` entry only yields to another `!important`.
    pub fn add_declaration(&mut self, declaration: &Declaration) {
        match expand_shorthand(&declaration.name, &declaration.value) {
            Some(longhands) => {
                for (name, value) in longhands {
                    self.set(name, value, declaration.important);
                }
            }
            None => self.set(
                declaration.name.clone(),
                declaration.value.clone(),
                declaration.important,
            ),
        }
    }

    /// [Cascading § 6.4.2 Importance](https://www.w3.org/TR/css-cascade-4/#importance)
    ///
    /// "An important declaration takes precedence over a normal one."
    fn set(&mut self, name: String, value: Vec<ComponentValue>, important: bool) {
        if let Some((_, existing_important)) = self.map.get(&name) {
            if *existing_important && !important {
                return;
            }
        }
        let _ = self.map.insert(name, (value, important));
    }

    /// The raw value of a longhand, if declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[ComponentValue]> {
        self.map.get(name).map(|(value, _)| value.as_slice())
    }

    /// First non-whitespace component of a declared value.
    fn first(&self, name: &str) -> Option<&ComponentValue> {
        self.get(name)?.iter().find(|v| !v.is_whitespace())
    }

    /// Single lowercased ident value, if the property is declared as one.
    fn ident(&self, name: &str) -> Option<String> {
        self.first(name)?.as_ident().map(str::to_ascii_lowercase)
    }

    /// True when the declared value is the `inherit` keyword.
    fn is_inherit(&self, name: &str) -> bool {
        self.ident(name).is_some_and(|i| i == "inherit")
    }
}

/// line-height descriptor.
///
/// [CSS 2.2 § 10.8.1](https://www.w3.org/TR/CSS22/visudet.html#propdef-line-height)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LineHeight {
    /// Use the font's natural height.
    #[default]
    Normal,
    /// A number multiplies the element's font size.
    Multiplier(f32),
    /// An explicit length (percentages resolve against font size).
    Length(Length),
}

/// The resolved, inheritance-applied value set for one element.
///
/// Everything layout and paint read lives here; nothing refers back to
/// stylesheet rules.
#[derive(Debug, Clone)]
pub struct CssProperties {
    /// `display` after fixups.
    pub display: Display,
    /// Positioning scheme.
    pub position: Position,
    /// Float side.
    pub float: Float,
    /// Clearance.
    pub clear: Clear,
    /// Overflow behavior (non-visible clips and makes a float holder).
    pub overflow: Overflow,
    /// Visibility (hidden still occupies space).
    pub visibility: Visibility,
    /// `z-index`; `None` is auto.
    pub z_index: Option<i32>,
    /// Inline content alignment (inherited).
    pub text_align: TextAlign,
    /// Vertical alignment in line boxes.
    pub vertical_align: VerticalAlign,
    /// Whitespace handling (inherited).
    pub white_space: WhiteSpace,
    /// Text case transformation (inherited).
    pub text_transform: TextTransform,
    /// Which box width/height refer to.
    pub box_sizing: BoxSizing,
    /// Foreground color (inherited).
    pub color: Color,
    /// Cursor keyword (inherited).
    pub cursor: Cursor,

    /// Embedder font handle for this element's text.
    pub font: FontHandle,
    /// Metrics reported with the handle.
    pub font_metrics: FontMetrics,
    /// The full description the handle was created from.
    pub font_description: FontDescription,
    /// Computed font size in px (inherited).
    pub font_size: i32,
    /// line-height descriptor (inherited).
    pub line_height: LineHeight,
    /// Resolved line height in px.
    pub line_height_px: i32,

    /// Marker style (inherited).
    pub list_style_type: ListStyleType,
    /// Marker placement (inherited).
    pub list_style_position: ListStylePosition,
    /// Marker image url (inherited).
    pub list_style_image: Option<String>,

    /// Content width descriptor (`auto` allowed).
    pub width: Length,
    /// Content height descriptor (`auto` allowed).
    pub height: Length,
    /// Minimum width (0 when absent).
    pub min_width: Length,
    /// Minimum height.
    pub min_height: Length,
    /// Maximum width (`none` allowed).
    pub max_width: Length,
    /// Maximum height.
    pub max_height: Length,

    /// Margin descriptors (`auto` allowed).
    pub margins: Quad<Length>,
    /// Padding descriptors.
    pub paddings: Quad<Length>,
    /// Border sides and radii.
    pub borders: Borders,
    /// top/right/bottom/left offsets for positioned boxes (`auto`
    /// allowed).
    pub offsets: Quad<Length>,

    /// Horizontal cell gap (inherited).
    pub border_spacing_x: Length,
    /// Vertical cell gap (inherited).
    pub border_spacing_y: Length,
    /// Border model (inherited).
    pub border_collapse: BorderCollapse,

    /// Main axis selection.
    pub flex_direction: FlexDirection,
    /// Line wrapping.
    pub flex_wrap: FlexWrap,
    /// Main-axis free space distribution.
    pub justify_content: JustifyContent,
    /// Default cross-axis alignment of items.
    pub align_items: AlignItems,
    /// Multi-line cross-axis packing.
    pub align_content: AlignContent,
    /// Per-item override of `align_items`.
    pub align_self: AlignSelf,
    /// Flex grow factor.
    pub flex_grow: f32,
    /// Flex shrink factor.
    pub flex_shrink: f32,
    /// Flex basis (`auto` allowed).
    pub flex_basis: Length,

    /// The layered background.
    pub background: Background,

    /// Raw `content` value for `::before`/`::after` materialization.
    pub content: Option<Vec<ComponentValue>>,
}

impl Default for CssProperties {
    fn default() -> Self {
        Self {
            display: Display::default(),
            position: Position::default(),
            float: Float::default(),
            clear: Clear::default(),
            overflow: Overflow::default(),
            visibility: Visibility::default(),
            z_index: None,
            text_align: TextAlign::default(),
            vertical_align: VerticalAlign::default(),
            white_space: WhiteSpace::default(),
            text_transform: TextTransform::default(),
            box_sizing: BoxSizing::default(),
            color: Color::BLACK,
            cursor: Cursor::default(),
            font: 0,
            font_metrics: FontMetrics::default(),
            font_description: FontDescription {
                family: String::new(),
                size: 16,
                weight: 400,
                style: FontStyle::Normal,
                decoration: TextDecoration::NONE,
            },
            font_size: 16,
            line_height: LineHeight::default(),
            line_height_px: 0,
            list_style_type: ListStyleType::default(),
            list_style_position: ListStylePosition::default(),
            list_style_image: None,
            width: Length::auto(),
            height: Length::auto(),
            min_width: Length::zero(),
            min_height: Length::zero(),
            max_width: Length::none(),
            max_height: Length::none(),
            margins: Quad::uniform(Length::zero()),
            paddings: Quad::uniform(Length::zero()),
            borders: Borders::default(),
            offsets: Quad::uniform(Length::auto()),
            border_spacing_x: Length::zero(),
            border_spacing_y: Length::zero(),
            border_collapse: BorderCollapse::default(),
            flex_direction: FlexDirection::default(),
            flex_wrap: FlexWrap::default(),
            justify_content: JustifyContent::default(),
            align_items: AlignItems::default(),
            align_content: AlignContent::default(),
            align_self: AlignSelf::default(),
            flex_grow: 0.0,
            flex_shrink: 1.0,
            flex_basis: Length::auto(),
            background: Background::default(),
            content: None,
        }
    }
}

impl CssProperties {
    /// Compute the full property set from cascaded declarations.
    ///
    /// `parent` is the parent element's computed set (absent at the
    /// root); `font_source` creates the element's font on the spot so
    /// the metrics are available to later computations.
    pub fn compute(
        map: &PropertyMap,
        parent: Option<&Self>,
        font_source: &mut dyn FontSource,
    ) -> Self {
        let mut props = Self::default();

        // ── Font first: em units everywhere else depend on it. ────────
        props.font_size = compute_font_size(map, parent, font_source);
        props.font_description = FontDescription {
            family: map
                .get("font-family")
                .filter(|_| !map.is_inherit("font-family"))
                .map(family_list_text)
                .or_else(|| parent.map(|p| p.font_description.family.clone()))
                .unwrap_or_else(|| font_source.default_font_family()),
            size: props.font_size,
            weight: compute_font_weight(map, parent),
            style: inherited_keyword(
                map,
                "font-style",
                parent.map(|p| p.font_description.style),
                FontStyle::from_ident,
            ),
            decoration: compute_text_decoration(map),
        };
        let (handle, metrics) = font_source.font(&props.font_description);
        props.font = handle;
        props.font_metrics = metrics;

        let ctx = ResolveCtx {
            font_size: props.font_size,
            x_height: metrics.x_height.max(1),
            percent_base: 0,
            viewport_width: 0,
            viewport_height: 0,
        };

        // ── Inherited properties. ─────────────────────────────────────
        props.color = map
            .first("color")
            .filter(|_| !map.is_inherit("color"))
            .and_then(Color::parse)
            .or_else(|| parent.map(|p| p.color))
            .unwrap_or(Color::BLACK);
        props.text_align = inherited_keyword(
            map,
            "text-align",
            parent.map(|p| p.text_align),
            TextAlign::from_ident,
        );
        props.white_space = inherited_keyword(
            map,
            "white-space",
            parent.map(|p| p.white_space),
            WhiteSpace::from_ident,
        );
        props.text_transform = inherited_keyword(
            map,
            "text-transform",
            parent.map(|p| p.text_transform),
            TextTransform::from_ident,
        );
        props.visibility = inherited_keyword(
            map,
            "visibility",
            parent.map(|p| p.visibility),
            Visibility::from_ident,
        );
        props.border_collapse = inherited_keyword(
            map,
            "border-collapse",
            parent.map(|p| p.border_collapse),
            BorderCollapse::from_ident,
        );
        props.list_style_type = inherited_keyword(
            map,
            "list-style-type",
            parent.map(|p| p.list_style_type),
            ListStyleType::from_ident,
        );
        props.list_style_position = inherited_keyword(
            map,
            "list-style-position",
            parent.map(|p| p.list_style_position),
            ListStylePosition::from_ident,
        );
        props.list_style_image = match map.first("list-style-image") {
            Some(ComponentValue::Token(CssToken::Url(url))) => Some(url.clone()),
            Some(value) if value.as_ident().is_some_and(|i| i.eq_ignore_ascii_case("none")) => {
                None
            }
            _ => parent.and_then(|p| p.list_style_image.clone()),
        };
        props.cursor = match map.ident("cursor") {
            Some(ident) if ident == "inherit" => {
                parent.map(|p| p.cursor.clone()).unwrap_or_default()
            }
            Some(ident) if ident == "auto" => Cursor::Auto,
            Some(ident) => Cursor::Named(ident),
            None => parent.map(|p| p.cursor.clone()).unwrap_or_default(),
        };
        (props.line_height, props.line_height_px) =
            compute_line_height(map, parent, props.font_size, metrics);
        props.border_spacing_x = map
            .first("-vellum-border-spacing-x")
            .and_then(|v| Length::parse(v, &[]))
            .or_else(|| parent.map(|p| p.border_spacing_x))
            .unwrap_or_default();
        props.border_spacing_y = map
            .first("-vellum-border-spacing-y")
            .and_then(|v| Length::parse(v, &[]))
            .or_else(|| parent.map(|p| p.border_spacing_y))
            .unwrap_or_default();

        // ── Non-inherited keywords. ───────────────────────────────────
        props.display = keyword(map, "display", Display::from_ident, parent);
        props.position = keyword(map, "position", Position::from_ident, parent);
        props.float = keyword(map, "float", Float::from_ident, parent);
        props.clear = keyword(map, "clear", Clear::from_ident, parent);
        props.overflow = keyword(map, "overflow", Overflow::from_ident, parent);
        props.vertical_align = keyword(map, "vertical-align", VerticalAlign::from_ident, parent);
        props.box_sizing = keyword(map, "box-sizing", BoxSizing::from_ident, parent);
        props.z_index = match map.first("z-index") {
            Some(value) if value.as_ident().is_some_and(|i| i.eq_ignore_ascii_case("auto")) => {
                None
            }
            Some(value) => value.as_number().map(|n| n as i32),
            None => None,
        };

        // ── Lengths. ──────────────────────────────────────────────────
        props.width = length(map, "width", &[LengthKeyword::Auto], Length::auto());
        props.height = length(map, "height", &[LengthKeyword::Auto], Length::auto());
        props.min_width = length(map, "min-width", &[], Length::zero());
        props.min_height = length(map, "min-height", &[], Length::zero());
        props.max_width = length(map, "max-width", &[LengthKeyword::None], Length::none());
        props.max_height = length(map, "max-height", &[LengthKeyword::None], Length::none());

        props.margins = Quad {
            top: length(map, "margin-top", &[LengthKeyword::Auto], Length::zero()),
            right: length(map, "margin-right", &[LengthKeyword::Auto], Length::zero()),
            bottom: length(map, "margin-bottom", &[LengthKeyword::Auto], Length::zero()),
            left: length(map, "margin-left", &[LengthKeyword::Auto], Length::zero()),
        };
        props.paddings = Quad {
            top: length(map, "padding-top", &[], Length::zero()),
            right: length(map, "padding-right", &[], Length::zero()),
            bottom: length(map, "padding-bottom", &[], Length::zero()),
            left: length(map, "padding-left", &[], Length::zero()),
        };
        props.offsets = Quad {
            top: length(map, "top", &[LengthKeyword::Auto], Length::auto()),
            right: length(map, "right", &[LengthKeyword::Auto], Length::auto()),
            bottom: length(map, "bottom", &[LengthKeyword::Auto], Length::auto()),
            left: length(map, "left", &[LengthKeyword::Auto], Length::auto()),
        };

        props.borders = compute_borders(map, &ctx);

        // ── Flex. ─────────────────────────────────────────────────────
        props.flex_direction = keyword(map, "flex-direction", FlexDirection::from_ident, parent);
        props.flex_wrap = keyword(map, "flex-wrap", FlexWrap::from_ident, parent);
        props.justify_content =
            keyword(map, "justify-content", JustifyContent::from_ident, parent);
        props.align_items = compute_align_items(map);
        props.align_content = keyword(map, "align-content", AlignContent::from_ident, parent);
        props.align_self = compute_align_self(map);
        props.flex_grow = map
            .first("flex-grow")
            .and_then(ComponentValue::as_number)
            .map_or(0.0, |n| n.max(0.0));
        props.flex_shrink = map
            .first("flex-shrink")
            .and_then(ComponentValue::as_number)
            .map_or(1.0, |n| n.max(0.0));
        props.flex_basis = length(map, "flex-basis", &[LengthKeyword::Auto], Length::auto());

        // ── Background. ───────────────────────────────────────────────
        props.background = compute_background(map);

        // ── Generated content. ────────────────────────────────────────
        props.content = map.get("content").map(<[ComponentValue]>::to_vec);

        props
    }

    /// [CSS 2.2 § 9.7 Relationships between display, position, and float](https://www.w3.org/TR/CSS22/visuren.html#dis-pos-flo)
    ///
    /// Run after the cascade, before render tree construction:
    /// 1. `display: none` — position and float do not apply.
    /// 2. absolute/fixed — float becomes none, display blockifies.
    /// 3. floated — display blockifies.
    /// 4. the root element — display blockifies.
    /// 5. flex children blockify per the flex spec.
    pub fn apply_display_fixups(&mut self, is_root: bool, parent_is_flex: bool) {
        if self.display == Display::None {
            self.float = Float::None;
            return;
        }
        if self.position.is_out_of_flow() {
            self.float = Float::None;
            self.display = self.display.blockified();
        } else if self.float != Float::None {
            self.display = self.display.blockified();
        }
        if is_root {
            self.display = self.display.blockified();
            self.float = Float::None;
        }
        // [Flexbox § 4] "The display value of a flex item is blockified."
        if parent_is_flex && !self.position.is_out_of_flow() {
            self.display = match self.display {
                Display::Inline | Display::InlineBlock => Display::Block,
                Display::InlineTable => Display::Table,
                Display::InlineFlex => Display::Flex,
                other => other,
            };
        }
    }

    /// A resolve context for this element's lengths against a percentage
    /// base.
    #[must_use]
    pub fn resolve_ctx(&self, percent_base: i32) -> ResolveCtx {
        ResolveCtx {
            font_size: self.font_size,
            x_height: self.font_metrics.x_height.max(1),
            percent_base,
            viewport_width: 0,
            viewport_height: 0,
        }
    }
}

/// Non-inherited keyword lookup with explicit-`inherit` support.
fn keyword<T: Default + Copy>(
    map: &PropertyMap,
    name: &str,
    parse: fn(&str) -> Option<T>,
    parent: Option<&CssProperties>,
) -> T {
    let Some(ident) = map.ident(name) else {
        return T::default();
    };
    if ident == "inherit" {
        // Explicit inherit on a non-inherited property. The caller gives
        // us no generic accessor, so this is handled per-property where
        // it matters (display/position rarely carry inherit in practice).
        let _ = parent;
        return T::default();
    }
    parse(&ident).unwrap_or_else(|| {
        warn_once("CSS", &format!("unsupported {name} value '{ident}'"));
        T::default()
    })
}

/// Inherited keyword lookup: declared value, else parent, else initial.
fn inherited_keyword<T: Default + Copy>(
    map: &PropertyMap,
    name: &str,
    parent_value: Option<T>,
    parse: fn(&str) -> Option<T>,
) -> T {
    match map.ident(name) {
        Some(ident) if ident != "inherit" => {
            parse(&ident).or(parent_value).unwrap_or_default()
        }
        _ => parent_value.unwrap_or_default(),
    }
}

/// Length lookup with per-property keyword acceptance.
fn length(map: &PropertyMap, name: &str, accepted: &[LengthKeyword], initial: Length) -> Length {
    map.first(name)
        .and_then(|value| Length::parse(value, accepted))
        .unwrap_or(initial)
}

/// [CSS Fonts § 3.5 font-size](https://www.w3.org/TR/css-fonts-4/#font-size-prop)
///
/// Absolute keywords go through the size table when the document default
/// is in its 9..=16 range, ratios of the default otherwise;
/// `smaller`/`larger` step one table slot relative to the parent size.
fn compute_font_size(
    map: &PropertyMap,
    parent: Option<&CssProperties>,
    font_source: &dyn FontSource,
) -> i32 {
    let doc_size = font_source.default_font_size();
    let parent_size = parent.map_or(doc_size, |p| p.font_size);

    let Some(value) = map.first("font-size") else {
        return parent_size;
    };

    if let Some(ident) = value.as_ident() {
        let ident = ident.to_ascii_lowercase();
        if ident == "inherit" {
            return parent_size;
        }
        let keyword_index = match ident.as_str() {
            "xx-small" => Some(0),
            "x-small" => Some(1),
            "small" => Some(2),
            "medium" => Some(3),
            "large" => Some(4),
            "x-large" => Some(5),
            "xx-large" => Some(6),
            _ => None,
        };
        if let Some(column) = keyword_index {
            let row = doc_size - 9;
            if (0..8).contains(&row) {
                return FONT_SIZE_TABLE[row as usize][column];
            }
            // Out-of-table defaults: fixed ratios of the document size.
            return match column {
                0 => doc_size * 3 / 5,
                1 => doc_size * 3 / 4,
                2 => doc_size * 8 / 9,
                3 => doc_size,
                4 => doc_size * 6 / 5,
                5 => doc_size * 3 / 2,
                _ => doc_size * 2,
            };
        }
        // smaller/larger: one table step from the parent size.
        if ident == "smaller" || ident == "larger" {
            return step_font_size(parent_size, doc_size, ident == "larger");
        }
        return parent_size;
    }

    let Some(size) = Length::parse(value, &[]) else {
        return parent_size;
    };
    match size {
        Length::Number {
            unit: LengthUnit::Percent,
            ..
        } => size.to_px(&ResolveCtx::with_font_size(parent_size).percent_against(parent_size)),
        Length::Number {
            unit: LengthUnit::None,
            ..
        } => parent_size,
        _ => size
            .to_px(&ResolveCtx::with_font_size(parent_size))
            .max(1),
    }
}

/// One step along the table row containing the parent size (ratio
/// fallback when the size sits outside the row).
fn step_font_size(parent_size: i32, doc_size: i32, larger: bool) -> i32 {
    let row = doc_size - 9;
    if (0..8).contains(&row) {
        let row = &FONT_SIZE_TABLE[row as usize];
        if larger {
            if let Some(next) = row.iter().find(|&&size| size > parent_size) {
                return *next;
            }
        } else if let Some(previous) = row.iter().rev().find(|&&size| size < parent_size) {
            return *previous;
        }
    }
    if larger {
        parent_size * 6 / 5
    } else {
        (parent_size * 5 / 6).max(1)
    }
}

/// [CSS Fonts § 3.2 font-weight](https://www.w3.org/TR/css-fonts-4/#font-weight-prop)
fn compute_font_weight(map: &PropertyMap, parent: Option<&CssProperties>) -> u16 {
    let parent_weight = parent.map_or(400, |p| p.font_description.weight);
    let Some(value) = map.first("font-weight") else {
        return parent_weight;
    };
    if let Some(number) = value.as_number() {
        return (number as u16).clamp(1, 1000);
    }
    match value.as_ident().map(str::to_ascii_lowercase).as_deref() {
        Some("normal") => 400,
        Some("bold") => 700,
        // Relative keywords step against the inherited weight.
        Some("bolder") => {
            if parent_weight < 400 {
                400
            } else if parent_weight < 600 {
                700
            } else {
                900
            }
        }
        Some("lighter") => {
            if parent_weight > 700 {
                700
            } else if parent_weight > 500 {
                400
            } else {
                100
            }
        }
        Some("inherit") | None => parent_weight,
        Some(_) => parent_weight,
    }
}

/// `text-decoration`: a space-separated list of line keywords.
fn compute_text_decoration(map: &PropertyMap) -> TextDecoration {
    let mut decoration = TextDecoration::NONE;
    if let Some(value) = map.get("text-decoration") {
        for piece in value.iter().filter(|v| !v.is_whitespace()) {
            if let Some(parsed) = piece
                .as_ident()
                .and_then(|i| TextDecoration::from_ident(&i.to_ascii_lowercase()))
            {
                decoration.insert(parsed);
            }
        }
    }
    decoration
}

/// [CSS 2.2 § 10.8.1 line-height](https://www.w3.org/TR/CSS22/visudet.html#propdef-line-height)
///
/// "normal" uses the font metrics; a number multiplies the font size; a
/// percentage resolves against the font size.
fn compute_line_height(
    map: &PropertyMap,
    parent: Option<&CssProperties>,
    font_size: i32,
    metrics: FontMetrics,
) -> (LineHeight, i32) {
    let descriptor = match map.first("line-height") {
        Some(value) if value.as_ident().is_some_and(|i| i.eq_ignore_ascii_case("normal")) => {
            LineHeight::Normal
        }
        Some(value) if value.as_ident().is_some_and(|i| i.eq_ignore_ascii_case("inherit")) => {
            parent.map(|p| p.line_height).unwrap_or_default()
        }
        Some(ComponentValue::Token(CssToken::Number { value, .. })) => {
            LineHeight::Multiplier(*value)
        }
        Some(value) => Length::parse(value, &[LengthKeyword::Normal])
            .map_or_else(
                || parent.map(|p| p.line_height).unwrap_or_default(),
                |length| {
                    if length.is_normal() {
                        LineHeight::Normal
                    } else {
                        LineHeight::Length(length)
                    }
                },
            ),
        // line-height is inherited: the descriptor propagates, so a
        // child with a larger font gets a proportionally larger line.
        None => parent.map(|p| p.line_height).unwrap_or_default(),
    };

    let px = match descriptor {
        LineHeight::Normal => metrics.height,
        LineHeight::Multiplier(factor) => {
            (f64::from(factor) * f64::from(font_size)).round() as i32
        }
        LineHeight::Length(length) => {
            length.to_px(&ResolveCtx::with_font_size(font_size).percent_against(font_size))
        }
    };
    (descriptor, px.max(0))
}

/// Collect the four border sides plus radii from longhands.
fn compute_borders(map: &PropertyMap, _ctx: &ResolveCtx) -> Borders {
    let side = |name: &str| {
        let mut border = Border::default();
        if let Some(value) = map.first(&format!("border-{name}-width")) {
            if let Some(ident) = value.as_ident() {
                if let Some(width) = Border::width_from_keyword(&ident.to_ascii_lowercase()) {
                    border.width = width;
                }
            } else if let Some(width) = Length::parse(value, &[]) {
                border.width = width;
            }
        }
        if let Some(ident) = map.ident(&format!("border-{name}-style")) {
            if let Some(style) = BorderStyle::from_ident(&ident) {
                border.style = style;
            }
        }
        if let Some(color) = map
            .first(&format!("border-{name}-color"))
            .and_then(Color::parse)
        {
            border.color = color;
        }
        border
    };

    let radius = |corner: &str, axis: &str| {
        map.first(&format!("border-{corner}-radius-{axis}"))
            .and_then(|value| Length::parse(value, &[]))
            .unwrap_or_default()
    };

    Borders {
        sides: Quad {
            top: side("top"),
            right: side("right"),
            bottom: side("bottom"),
            left: side("left"),
        },
        radii: super::borders::BorderRadii {
            top_left_x: radius("top-left", "x"),
            top_left_y: radius("top-left", "y"),
            top_right_x: radius("top-right", "x"),
            top_right_y: radius("top-right", "y"),
            bottom_right_x: radius("bottom-right", "x"),
            bottom_right_y: radius("bottom-right", "y"),
            bottom_left_x: radius("bottom-left", "x"),
            bottom_left_y: radius("bottom-left", "y"),
        },
    }
}

/// `align-items`, including the two-ident `last baseline` form.
fn compute_align_items(map: &PropertyMap) -> AlignItems {
    let Some(value) = map.get("align-items") else {
        return AlignItems::default();
    };
    let idents: Vec<String> = value
        .iter()
        .filter_map(|v| v.as_ident().map(str::to_ascii_lowercase))
        .collect();
    if idents.iter().any(|i| i == "last") && idents.iter().any(|i| i == "baseline") {
        return AlignItems::LastBaseline;
    }
    idents
        .first()
        .and_then(|i| AlignItems::from_ident(i))
        .unwrap_or_default()
}

/// `align-self`, including the two-ident `last baseline` form.
fn compute_align_self(map: &PropertyMap) -> AlignSelf {
    let Some(value) = map.get("align-self") else {
        return AlignSelf::default();
    };
    let idents: Vec<String> = value
        .iter()
        .filter_map(|v| v.as_ident().map(str::to_ascii_lowercase))
        .collect();
    if idents.iter().any(|i| i == "last") && idents.iter().any(|i| i == "baseline") {
        return AlignSelf::LastBaseline;
    }
    idents
        .first()
        .and_then(|i| AlignSelf::from_ident(i))
        .unwrap_or_default()
}

/// Backgrounds: the shorthand (already expanded into the map as
/// `background`) or the individual longhands.
fn compute_background(map: &PropertyMap) -> Background {
    let mut background = map
        .get("background")
        .map(Background::parse_shorthand)
        .unwrap_or_default();

    if let Some(color) = map.first("background-color").and_then(Color::parse) {
        background.color = color;
    }
    if let Some(value) = map.get("background-image") {
        background.images.clear();
        for piece in value.iter().filter(|v| !v.is_whitespace()) {
            match piece {
                ComponentValue::Token(CssToken::Url(url)) => {
                    background.images.push(ImageSource::Url(url.clone()));
                }
                ComponentValue::Function { name, args } => {
                    if name.eq_ignore_ascii_case("url") {
                        if let Some(ComponentValue::Token(CssToken::String(url))) =
                            args.iter().find(|a| !a.is_whitespace())
                        {
                            background.images.push(ImageSource::Url(url.clone()));
                        }
                    } else if let Some(gradient) = super::gradient::Gradient::parse(name, args) {
                        background.images.push(ImageSource::Gradient(gradient));
                    }
                }
                _ => {}
            }
        }
    }
    // Per-layer longhand lists.
    if let Some(value) = map.get("background-repeat") {
        background.repeats = value
            .iter()
            .filter_map(|v| v.as_ident())
            .filter_map(|i| super::keywords::BackgroundRepeat::from_ident(&i.to_ascii_lowercase()))
            .collect();
    }
    if let Some(value) = map.get("background-attachment") {
        background.attachments = value
            .iter()
            .filter_map(|v| v.as_ident())
            .filter_map(|i| {
                super::keywords::BackgroundAttachment::from_ident(&i.to_ascii_lowercase())
            })
            .collect();
    }
    if let Some(value) = map.get("background-clip") {
        background.clips = value
            .iter()
            .filter_map(|v| v.as_ident())
            .filter_map(|i| super::keywords::BackgroundBox::from_ident(&i.to_ascii_lowercase()))
            .collect();
    }
    if let Some(value) = map.get("background-origin") {
        background.origins = value
            .iter()
            .filter_map(|v| v.as_ident())
            .filter_map(|i| super::keywords::BackgroundBox::from_ident(&i.to_ascii_lowercase()))
            .collect();
    }
    if let Some(value) = map.get("background-size") {
        background.sizes = parse_background_sizes(value);
    }
    if let Some(value) = map.get("background-position") {
        let lengths: Vec<Length> = value
            .iter()
            .filter(|v| !v.is_whitespace())
            .filter_map(|piece| {
                piece
                    .as_ident()
                    .and_then(|i| position_keyword_length(&i.to_ascii_lowercase()))
                    .or_else(|| Length::parse(piece, &[]))
            })
            .collect();
        if let Some(x) = lengths.first() {
            background.positions_x = vec![*x];
        }
        background.positions_y = vec![lengths.get(1).copied().unwrap_or(Length::Number {
            value: 50.0,
            unit: LengthUnit::Percent,
        })];
    }

    // Pad per-layer vectors so every image layer has a full set.
    let layers = background.images.len();
    background.repeats.resize(layers.max(background.repeats.len()), Default::default());
    background
        .attachments
        .resize(layers.max(background.attachments.len()), Default::default());
    background.sizes.resize(
        layers.max(background.sizes.len()),
        BackgroundSize::Auto,
    );
    background
        .positions_x
        .resize(layers.max(background.positions_x.len()), Length::zero());
    background
        .positions_y
        .resize(layers.max(background.positions_y.len()), Length::zero());

    background
}

fn position_keyword_length(ident: &str) -> Option<Length> {
    let percent = |value| Length::Number {
        value,
        unit: LengthUnit::Percent,
    };
    match ident {
        "left" | "top" => Some(percent(0.0)),
        "center" => Some(percent(50.0)),
        "right" | "bottom" => Some(percent(100.0)),
        _ => None,
    }
}

fn parse_background_sizes(value: &[ComponentValue]) -> Vec<BackgroundSize> {
    let pieces: Vec<&ComponentValue> = value.iter().filter(|v| !v.is_whitespace()).collect();
    match pieces.as_slice() {
        [single] => match single.as_ident().map(str::to_ascii_lowercase).as_deref() {
            Some("cover") => vec![BackgroundSize::Cover],
            Some("contain") => vec![BackgroundSize::Contain],
            Some("auto") => vec![BackgroundSize::Auto],
            _ => Length::parse(single, &[])
                .map(|w| vec![BackgroundSize::Explicit(w, Length::auto())])
                .unwrap_or_default(),
        },
        [w, h] => {
            let width = Length::parse(w, &[LengthKeyword::Auto]).unwrap_or(Length::auto());
            let height = Length::parse(h, &[LengthKeyword::Auto]).unwrap_or(Length::auto());
            vec![BackgroundSize::Explicit(width, height)]
        }
        _ => Vec::new(),
    }
}

/// Join a `font-family` value list back into the comma-separated string
/// the embedder expects.
fn family_list_text(value: &[ComponentValue]) -> String {
    let mut out = String::new();
    for piece in value {
        match piece {
            ComponentValue::Token(CssToken::Ident(ident)) => {
                if !out.is_empty() && !out.ends_with(',') {
                    out.push(' ');
                }
                out.push_str(ident);
            }
            ComponentValue::Token(CssToken::String(family)) => {
                if !out.is_empty() && !out.ends_with(',') {
                    out.push(' ');
                }
                out.push_str(family);
            }
            ComponentValue::Token(CssToken::Comma) => out.push(','),
            _ => {}
        }
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::font::FixedFontSource;
    use crate::tokenizer::CssTokenizer;

    fn map_of(declarations: &str) -> PropertyMap {
        let mut tokenizer = CssTokenizer::new(format!("p {{ {declarations} }}"));
        tokenizer.run();
        let sheet = crate::parser::CssParser::new(tokenizer.into_tokens()).parse_stylesheet();
        let mut map = PropertyMap::new();
        for declaration in &sheet.rules[0].declarations {
            map.add_declaration(declaration);
        }
        map
    }

    fn compute(declarations: &str) -> CssProperties {
        let mut fonts = FixedFontSource::default();
        CssProperties::compute(&map_of(declarations), None, &mut fonts)
    }

    fn compute_with_parent(declarations: &str, parent: &CssProperties) -> CssProperties {
        let mut fonts = FixedFontSource::default();
        CssProperties::compute(&map_of(declarations), Some(parent), &mut fonts)
    }

    #[test]
    fn important_beats_later_normal() {
        let map = map_of("color: red !important; color: blue");
        let mut fonts = FixedFontSource::default();
        let props = CssProperties::compute(&map, None, &mut fonts);
        assert_eq!(props.color, Color::rgb(255, 0, 0));
    }

    #[test]
    fn later_important_beats_earlier_important() {
        let map = map_of("color: red !important; color: blue !important");
        let mut fonts = FixedFontSource::default();
        let props = CssProperties::compute(&map, None, &mut fonts);
        assert_eq!(props.color, Color::rgb(0, 0, 255));
    }

    #[test]
    fn inherited_properties_flow_down() {
        let parent = compute("color: #112233; text-align: center; white-space: pre");
        let child = compute_with_parent("display: block", &parent);
        assert_eq!(child.color, Color::rgb(0x11, 0x22, 0x33));
        assert_eq!(child.text_align, TextAlign::Center);
        assert_eq!(child.white_space, WhiteSpace::Pre);
        // Non-inherited properties reset.
        assert_eq!(child.display, Display::Block);
        assert!(child.background.color.is_transparent());
    }

    #[test]
    fn font_size_keywords_use_the_table() {
        // Default size 16 → table row {9, 10, 13, 16, 18, 24, 32}.
        assert_eq!(compute("font-size: medium").font_size, 16);
        assert_eq!(compute("font-size: xx-small").font_size, 9);
        assert_eq!(compute("font-size: xx-large").font_size, 32);
        assert_eq!(compute("font-size: large").font_size, 18);
    }

    #[test]
    fn font_size_em_and_percent_resolve_against_parent() {
        let parent = compute("font-size: 20px");
        assert_eq!(parent.font_size, 20);
        let child = compute_with_parent("font-size: 1.5em", &parent);
        assert_eq!(child.font_size, 30);
        let pct = compute_with_parent("font-size: 50%", &parent);
        assert_eq!(pct.font_size, 10);
    }

    #[test]
    fn smaller_and_larger_step_the_table() {
        let parent = compute("font-size: 16px");
        assert_eq!(
            compute_with_parent("font-size: larger", &parent).font_size,
            18
        );
        assert_eq!(
            compute_with_parent("font-size: smaller", &parent).font_size,
            13
        );
    }

    #[test]
    fn line_height_forms() {
        let props = compute("font-size: 20px; line-height: 1.5");
        assert_eq!(props.line_height_px, 30);
        let px = compute("line-height: 28px");
        assert_eq!(px.line_height_px, 28);
        let pct = compute("font-size: 20px; line-height: 150%");
        assert_eq!(pct.line_height_px, 30);
    }

    #[test]
    fn z_index_auto_and_integer() {
        assert_eq!(compute("z-index: auto").z_index, None);
        assert_eq!(compute("z-index: 3").z_index, Some(3));
        assert_eq!(compute("width: 10px").z_index, None);
    }

    #[test]
    fn margins_keep_auto() {
        let props = compute("margin: 0 auto");
        assert!(!props.margins.top.is_auto());
        assert!(props.margins.left.is_auto());
        assert!(props.margins.right.is_auto());
    }

    #[test]
    fn border_shorthand_lands_in_borders() {
        let props = compute("border: 2px solid #abcdef");
        assert_eq!(props.borders.sides.top.style, BorderStyle::Solid);
        assert_eq!(
            props.borders.sides.left.color,
            Color::rgb(0xab, 0xcd, 0xef)
        );
        let ctx = props.resolve_ctx(0);
        assert_eq!(props.borders.used_widths(&ctx).bottom, 2);
    }

    #[test]
    fn display_fixups_blockify() {
        let mut props = compute("display: inline; float: left");
        props.apply_display_fixups(false, false);
        assert_eq!(props.display, Display::Block);

        let mut abs = compute("display: inline-table; position: absolute; float: left");
        abs.apply_display_fixups(false, false);
        assert_eq!(abs.display, Display::Table);
        assert_eq!(abs.float, Float::None);

        let mut root = compute("display: inline");
        root.apply_display_fixups(true, false);
        assert_eq!(root.display, Display::Block);

        let mut flex_child = compute("display: inline-flex");
        flex_child.apply_display_fixups(false, true);
        assert_eq!(flex_child.display, Display::Flex);
    }

    #[test]
    fn display_none_disables_float() {
        let mut props = compute("display: none; float: right");
        props.apply_display_fixups(false, false);
        assert_eq!(props.display, Display::None);
        assert_eq!(props.float, Float::None);
    }

    #[test]
    fn flex_shorthand_through_the_map() {
        let props = compute("flex: 2 1 0");
        assert_eq!(props.flex_grow, 2.0);
        assert_eq!(props.flex_shrink, 1.0);
        assert!(!props.flex_basis.is_auto());
    }
}
