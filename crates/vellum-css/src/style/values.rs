//! Lengths, colors, and their parsing.
//!
//! - [CSS Values and Units Level 4](https://www.w3.org/TR/css-values-4/)
//! - [CSS Color Level 4](https://www.w3.org/TR/css-color-4/)
//!
//! A [`Length`] keeps its original descriptor — unit and raw value — and
//! resolves to an integer pixel count on demand against a [`ResolveCtx`].
//! Retaining the descriptor means a font-size or viewport change only
//! needs a re-resolution, not a re-parse.

use serde::Serialize;

use vellum_common::warn_once;

use crate::parser::ComponentValue;
use crate::tokenizer::CssToken;

use super::color_names::named_color;

/// [§ 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LengthUnit {
    /// A bare number. Treated as pixels where a length is expected.
    #[default]
    None,
    /// A percentage of the property-specific base.
    Percent,
    /// Inches; `1in = 96px`.
    In,
    /// Centimeters.
    Cm,
    /// Millimeters.
    Mm,
    /// Font-size-relative.
    Em,
    /// x-height-relative.
    Ex,
    /// Points; `1pt = 1/72in`.
    Pt,
    /// Picas; `1pc = 12pt`.
    Pc,
    /// Pixels.
    Px,
    /// Dots per inch (media queries only).
    Dpi,
    /// Dots per centimeter (media queries only).
    Dpcm,
    /// 1% of viewport width.
    Vw,
    /// 1% of viewport height.
    Vh,
    /// 1% of the smaller viewport dimension.
    Vmin,
    /// 1% of the larger viewport dimension.
    Vmax,
}

impl LengthUnit {
    /// Map a dimension token's unit suffix.
    #[must_use]
    pub fn from_ident(unit: &str) -> Option<Self> {
        match unit.to_ascii_lowercase().as_str() {
            "in" => Some(Self::In),
            "cm" => Some(Self::Cm),
            "mm" => Some(Self::Mm),
            "em" => Some(Self::Em),
            "ex" => Some(Self::Ex),
            "pt" => Some(Self::Pt),
            "pc" => Some(Self::Pc),
            "px" => Some(Self::Px),
            "dpi" => Some(Self::Dpi),
            "dpcm" => Some(Self::Dpcm),
            "vw" => Some(Self::Vw),
            "vh" => Some(Self::Vh),
            "vmin" => Some(Self::Vmin),
            "vmax" => Some(Self::Vmax),
            _ => None,
        }
    }
}

/// Keywords a length-valued property may carry instead of a number.
///
/// Which keywords are legal depends on the property; the parser is told
/// which one(s) to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LengthKeyword {
    /// `auto` — resolved by the layout algorithm.
    Auto,
    /// `none` — no constraint (max-width/max-height).
    None,
    /// `normal` — the property's natural value (line-height).
    Normal,
}

/// A CSS length: a predefined keyword or a number with a unit.
///
/// [§ 4.1 Lengths](https://www.w3.org/TR/css-values-4/#lengths)
///
/// Once resolved against a [`ResolveCtx`] a length is an integer pixel
/// count; the descriptor itself is immutable and survives re-resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Length {
    /// A property-specific keyword (`auto`, `none`, `normal`).
    Keyword(LengthKeyword),
    /// A numeric value with its unit.
    Number {
        /// The raw value as written.
        value: f32,
        /// The unit suffix.
        unit: LengthUnit,
    },
}

impl Default for Length {
    fn default() -> Self {
        Self::zero()
    }
}

/// Everything needed to turn a length descriptor into used pixels.
#[derive(Debug, Clone, Copy)]
pub struct ResolveCtx {
    /// The element's computed font size, for `em`.
    pub font_size: i32,
    /// The font's x-height, for `ex`.
    pub x_height: i32,
    /// The base for percentages (property-specific).
    pub percent_base: i32,
    /// Viewport width in px.
    pub viewport_width: i32,
    /// Viewport height in px.
    pub viewport_height: i32,
}

impl ResolveCtx {
    /// A context with every base zeroed except font size; enough for
    /// resolving absolute units.
    #[must_use]
    pub const fn with_font_size(font_size: i32) -> Self {
        Self {
            font_size,
            x_height: font_size / 2,
            percent_base: 0,
            viewport_width: 0,
            viewport_height: 0,
        }
    }

    /// The same context with a different percentage base.
    #[must_use]
    pub const fn percent_against(mut self, base: i32) -> Self {
        self.percent_base = base;
        self
    }
}

impl Length {
    /// A zero-pixel length.
    #[must_use]
    pub const fn zero() -> Self {
        Self::Number {
            value: 0.0,
            unit: LengthUnit::Px,
        }
    }

    /// A pixel length.
    #[must_use]
    pub const fn px(value: f32) -> Self {
        Self::Number {
            value,
            unit: LengthUnit::Px,
        }
    }

    /// The `auto` keyword.
    #[must_use]
    pub const fn auto() -> Self {
        Self::Keyword(LengthKeyword::Auto)
    }

    /// The `none` keyword.
    #[must_use]
    pub const fn none() -> Self {
        Self::Keyword(LengthKeyword::None)
    }

    /// The `normal` keyword.
    #[must_use]
    pub const fn normal() -> Self {
        Self::Keyword(LengthKeyword::Normal)
    }

    /// True for any keyword value.
    #[must_use]
    pub const fn is_predefined(&self) -> bool {
        matches!(self, Self::Keyword(_))
    }

    /// True for `auto`.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Keyword(LengthKeyword::Auto))
    }

    /// True for `none`.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::Keyword(LengthKeyword::None))
    }

    /// True for `normal`.
    #[must_use]
    pub const fn is_normal(&self) -> bool {
        matches!(self, Self::Keyword(LengthKeyword::Normal))
    }

    /// True for a percentage value.
    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(
            self,
            Self::Number {
                unit: LengthUnit::Percent,
                ..
            }
        )
    }

    /// The raw numeric value (0 for keywords).
    #[must_use]
    pub const fn raw(&self) -> f32 {
        match self {
            Self::Keyword(_) => 0.0,
            Self::Number { value, .. } => *value,
        }
    }

    /// Resolve to used pixels.
    ///
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in", `1pt = 1/72in`, `1pc = 12pt`.
    ///
    /// Keywords resolve to 0 — callers test `is_auto()`/`is_none()` first.
    #[must_use]
    pub fn to_px(&self, ctx: &ResolveCtx) -> i32 {
        let Self::Number { value, unit } = self else {
            return 0;
        };
        let value = f64::from(*value);
        let px = match unit {
            LengthUnit::None | LengthUnit::Px => value,
            LengthUnit::Percent => value * f64::from(ctx.percent_base) / 100.0,
            LengthUnit::In => value * 96.0,
            LengthUnit::Cm => value * 96.0 / 2.54,
            LengthUnit::Mm => value * 96.0 / 25.4,
            LengthUnit::Em => value * f64::from(ctx.font_size),
            LengthUnit::Ex => value * f64::from(ctx.x_height),
            LengthUnit::Pt => value * 96.0 / 72.0,
            LengthUnit::Pc => value * 16.0,
            // Resolution units are only meaningful to media queries.
            LengthUnit::Dpi | LengthUnit::Dpcm => value,
            LengthUnit::Vw => value * f64::from(ctx.viewport_width) / 100.0,
            LengthUnit::Vh => value * f64::from(ctx.viewport_height) / 100.0,
            LengthUnit::Vmin => {
                value * f64::from(ctx.viewport_width.min(ctx.viewport_height)) / 100.0
            }
            LengthUnit::Vmax => {
                value * f64::from(ctx.viewport_width.max(ctx.viewport_height)) / 100.0
            }
        };
        px.round() as i32
    }

    /// Parse a length from one component value.
    ///
    /// `accepted` lists the keywords legal for the property; any other
    /// ident fails the parse.
    #[must_use]
    pub fn parse(value: &ComponentValue, accepted: &[LengthKeyword]) -> Option<Self> {
        match value {
            ComponentValue::Token(CssToken::Dimension { value, unit, .. }) => {
                LengthUnit::from_ident(unit).map(|unit| Self::Number {
                    value: *value,
                    unit,
                })
            }
            ComponentValue::Token(CssToken::Percentage { value }) => Some(Self::Number {
                value: *value,
                unit: LengthUnit::Percent,
            }),
            ComponentValue::Token(CssToken::Number { value, .. }) => Some(Self::Number {
                value: *value,
                unit: LengthUnit::None,
            }),
            ComponentValue::Token(CssToken::Ident(ident)) => {
                let keyword = match ident.to_ascii_lowercase().as_str() {
                    "auto" => LengthKeyword::Auto,
                    "none" => LengthKeyword::None,
                    "normal" => LengthKeyword::Normal,
                    _ => return None,
                };
                accepted.contains(&keyword).then_some(Self::Keyword(keyword))
            }
            _ => None,
        }
    }
}

/// Four independent per-side values (top/right/bottom/left).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Quad<T> {
    /// Top side.
    pub top: T,
    /// Right side.
    pub right: T,
    /// Bottom side.
    pub bottom: T,
    /// Left side.
    pub left: T,
}

impl<T: Copy> Quad<T> {
    /// All four sides the same value.
    pub fn uniform(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

/// sRGB color with alpha.
///
/// [CSS Color § 4 Color syntax](https://www.w3.org/TR/css-color-4/#color-syntax)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
    /// Alpha channel (0-255, 255 = opaque).
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// An opaque color from components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// True when fully transparent.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// [§ 4.2 The RGB hexadecimal notations](https://www.w3.org/TR/css-color-4/#hex-notation)
    ///
    /// "The syntax of a <hex-color> is a <hash-token> whose value consists
    /// of 3, 4, 6, or 8 hexadecimal digits." Three/four-digit forms expand
    /// "by replicating digits, not by adding zeros."
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let digit = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        let doubled = |index: usize| {
            let d = u8::from_str_radix(hex.get(index..index + 1)?, 16).ok()?;
            Some(d * 16 + d)
        };
        match hex.len() {
            3 => Some(Self {
                r: doubled(0)?,
                g: doubled(1)?,
                b: doubled(2)?,
                a: 255,
            }),
            4 => Some(Self {
                r: doubled(0)?,
                g: doubled(1)?,
                b: doubled(2)?,
                a: doubled(3)?,
            }),
            6 => Some(Self {
                r: digit(0..2)?,
                g: digit(2..4)?,
                b: digit(4..6)?,
                a: 255,
            }),
            8 => Some(Self {
                r: digit(0..2)?,
                g: digit(2..4)?,
                b: digit(4..6)?,
                a: digit(6..8)?,
            }),
            _ => None,
        }
    }

    /// Parse a color from text: hex, named, `transparent`, or
    /// `rgb()`/`rgba()` textual forms.
    ///
    /// The parser is tolerant: anything unrecognized yields black, with
    /// a warning.
    #[must_use]
    pub fn from_string(text: &str) -> Self {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return Self::from_hex(hex).unwrap_or_else(|| {
                warn_once("CSS", &format!("invalid hex color '#{hex}'"));
                Self::BLACK
            });
        }
        let lower = text.to_ascii_lowercase();
        if lower == "transparent" {
            return Self::TRANSPARENT;
        }
        if lower.starts_with("rgb") {
            if let Some(color) = parse_rgb_text(&lower) {
                return color;
            }
        }
        named_color(&lower).unwrap_or_else(|| {
            warn_once("CSS", &format!("unknown color '{text}'"));
            Self::BLACK
        })
    }

    /// Parse a color from component values (`#hex`, named ident,
    /// `rgb(...)`, `rgba(...)`).
    #[must_use]
    pub fn parse(value: &ComponentValue) -> Option<Self> {
        match value {
            ComponentValue::Token(CssToken::Hash { value, .. }) => Self::from_hex(value),
            ComponentValue::Token(CssToken::Ident(ident)) => {
                let lower = ident.to_ascii_lowercase();
                if lower == "transparent" {
                    Some(Self::TRANSPARENT)
                } else {
                    named_color(&lower)
                }
            }
            ComponentValue::Function { name, args }
                if name.eq_ignore_ascii_case("rgb") || name.eq_ignore_ascii_case("rgba") =>
            {
                parse_rgb_args(args)
            }
            _ => None,
        }
    }
}

/// `rgb(R, G, B)` / `rgba(R, G, B, A)` from component-value arguments.
/// Channels may be numbers or percentages; alpha is 0..1 or a percentage.
fn parse_rgb_args(args: &[ComponentValue]) -> Option<Color> {
    let mut channels: Vec<f32> = Vec::new();
    for arg in args {
        match arg {
            ComponentValue::Token(CssToken::Number { value, .. }) => channels.push(*value),
            ComponentValue::Token(CssToken::Percentage { value }) => {
                // Alpha percentage is scaled later; channel percentage is
                // of 255.
                channels.push(value * 255.0 / 100.0);
            }
            ComponentValue::Token(
                CssToken::Comma | CssToken::Whitespace | CssToken::Delim('/'),
            ) => {}
            _ => return None,
        }
    }
    if channels.len() < 3 {
        return None;
    }
    let clamp = |v: f32| v.clamp(0.0, 255.0).round() as u8;
    let alpha = channels.get(3).map_or(255, |a| {
        // An alpha channel written as a percentage arrived scaled by
        // 255/100; both forms land in 0..=255 after this.
        if *a <= 1.0 {
            (a * 255.0).clamp(0.0, 255.0).round() as u8
        } else {
            clamp(*a)
        }
    });
    Some(Color {
        r: clamp(channels[0]),
        g: clamp(channels[1]),
        b: clamp(channels[2]),
        a: alpha,
    })
}

/// `rgb(1, 2, 3)` from raw text (used by attribute-sourced colors).
fn parse_rgb_text(text: &str) -> Option<Color> {
    let open = text.find('(')?;
    let close = text.rfind(')')?;
    let inner = &text[open + 1..close];
    let parts: Vec<&str> = inner
        .split([',', ' ', '/'])
        .filter(|p| !p.trim().is_empty())
        .collect();
    if parts.len() < 3 {
        return None;
    }
    let channel = |p: &str| -> Option<f32> {
        p.trim().strip_suffix('%').map_or_else(
            || p.trim().parse::<f32>().ok(),
            |pct| pct.trim().parse::<f32>().ok().map(|v| v * 255.0 / 100.0),
        )
    };
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(p) => {
            let v = channel(p)?;
            if v <= 1.0 { v * 255.0 } else { v }
        }
        None => 255.0,
    };
    let clamp = |v: f32| v.clamp(0.0, 255.0).round() as u8;
    Some(Color {
        r: clamp(r),
        g: clamp(g),
        b: clamp(b),
        a: clamp(a),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_units_resolve_to_integer_px() {
        let ctx = ResolveCtx::with_font_size(16);
        assert_eq!(Length::px(10.0).to_px(&ctx), 10);
        assert_eq!(
            Length::Number {
                value: 1.0,
                unit: LengthUnit::In
            }
            .to_px(&ctx),
            96
        );
        assert_eq!(
            Length::Number {
                value: 12.0,
                unit: LengthUnit::Pt
            }
            .to_px(&ctx),
            16
        );
        assert_eq!(
            Length::Number {
                value: 1.5,
                unit: LengthUnit::Em
            }
            .to_px(&ctx),
            24
        );
    }

    #[test]
    fn percent_needs_a_base() {
        let ctx = ResolveCtx::with_font_size(16).percent_against(400);
        assert_eq!(
            Length::Number {
                value: 50.0,
                unit: LengthUnit::Percent
            }
            .to_px(&ctx),
            200
        );
    }

    #[test]
    fn viewport_units() {
        let mut ctx = ResolveCtx::with_font_size(16);
        ctx.viewport_width = 1000;
        ctx.viewport_height = 500;
        let len = |value, unit| Length::Number { value, unit };
        assert_eq!(len(10.0, LengthUnit::Vw).to_px(&ctx), 100);
        assert_eq!(len(10.0, LengthUnit::Vh).to_px(&ctx), 50);
        assert_eq!(len(10.0, LengthUnit::Vmin).to_px(&ctx), 50);
        assert_eq!(len(10.0, LengthUnit::Vmax).to_px(&ctx), 100);
    }

    #[test]
    fn keyword_acceptance_is_per_property() {
        let auto = ComponentValue::Token(CssToken::Ident("auto".into()));
        assert_eq!(
            Length::parse(&auto, &[LengthKeyword::Auto]),
            Some(Length::auto())
        );
        // "auto" is not a valid max-width.
        assert_eq!(Length::parse(&auto, &[LengthKeyword::None]), None);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(Color::from_hex("fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#000000"), Some(Color::BLACK));
        assert_eq!(
            Color::from_hex("11223344"),
            Some(Color {
                r: 0x11,
                g: 0x22,
                b: 0x33,
                a: 0x44
            })
        );
        assert_eq!(Color::from_hex("12345"), None);
    }

    #[test]
    fn named_equals_hex() {
        // from_string(named) == from_string(hex of that color)
        assert_eq!(Color::from_string("red"), Color::from_string("#ff0000"));
        assert_eq!(Color::from_string("teal"), Color::from_string("#008080"));
        assert_eq!(
            Color::from_string("rebeccapurple"),
            Color::from_string("#663399")
        );
    }

    #[test]
    fn rgb_text_forms() {
        assert_eq!(
            Color::from_string("rgb(255, 0, 0)"),
            Color::rgb(255, 0, 0)
        );
        assert_eq!(
            Color::from_string("rgba(0, 0, 255, 0.5)"),
            Color {
                r: 0,
                g: 0,
                b: 255,
                a: 128
            }
        );
        assert_eq!(
            Color::from_string("rgb(100%, 0%, 0%)"),
            Color::rgb(255, 0, 0)
        );
    }

    #[test]
    fn invalid_color_is_black() {
        assert_eq!(Color::from_string("no-such-color"), Color::BLACK);
        assert_eq!(Color::from_string("#zzz"), Color::BLACK);
    }

    #[test]
    fn transparent_keyword() {
        assert_eq!(Color::from_string("transparent"), Color::TRANSPARENT);
        assert!(Color::TRANSPARENT.is_transparent());
    }
}
