//! Border sides, quads, and radii.
//!
//! [CSS Backgrounds and Borders Level 3 § 3](https://www.w3.org/TR/css-backgrounds-3/#borders)

use serde::Serialize;

use super::keywords::BorderStyle;
use super::values::{Color, Length, Quad, ResolveCtx};

/// One border side: width, style, and color together.
///
/// [§ 3.3 border shorthands](https://www.w3.org/TR/css-backgrounds-3/#the-border-shorthands)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Border {
    /// Border width descriptor.
    pub width: Length,
    /// Line style; `none` suppresses the width.
    pub style: BorderStyle,
    /// Line color.
    pub color: Color,
}

impl Default for Border {
    fn default() -> Self {
        Self {
            // "medium" initial width; only drawn when a style is set.
            width: Length::px(3.0),
            style: BorderStyle::None,
            color: Color::BLACK,
        }
    }
}

impl Border {
    /// Used width in px: zero unless the style draws.
    ///
    /// [§ 3.2] "If the computed border style is none or hidden, the
    /// computed border width is zero."
    #[must_use]
    pub fn used_width(&self, ctx: &ResolveCtx) -> i32 {
        if self.style.is_visible() {
            self.width.to_px(ctx).max(0)
        } else {
            0
        }
    }

    /// Keyword widths per [§ 3.1]: thin 1px, medium 3px, thick 5px.
    #[must_use]
    pub fn width_from_keyword(ident: &str) -> Option<Length> {
        match ident {
            "thin" => Some(Length::px(1.0)),
            "medium" => Some(Length::px(3.0)),
            "thick" => Some(Length::px(5.0)),
            _ => None,
        }
    }
}

/// Corner radii: x and y per corner, eight independent lengths.
///
/// [§ 5.1 border-radius](https://www.w3.org/TR/css-backgrounds-3/#border-radius)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct BorderRadii {
    /// Top-left horizontal radius.
    pub top_left_x: Length,
    /// Top-left vertical radius.
    pub top_left_y: Length,
    /// Top-right horizontal radius.
    pub top_right_x: Length,
    /// Top-right vertical radius.
    pub top_right_y: Length,
    /// Bottom-right horizontal radius.
    pub bottom_right_x: Length,
    /// Bottom-right vertical radius.
    pub bottom_right_y: Length,
    /// Bottom-left horizontal radius.
    pub bottom_left_x: Length,
    /// Bottom-left vertical radius.
    pub bottom_left_y: Length,
}

/// Resolved corner radii in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ResolvedRadii {
    /// Top-left (x, y).
    pub top_left: (i32, i32),
    /// Top-right (x, y).
    pub top_right: (i32, i32),
    /// Bottom-right (x, y).
    pub bottom_right: (i32, i32),
    /// Bottom-left (x, y).
    pub bottom_left: (i32, i32),
}

impl ResolvedRadii {
    /// True if every radius is zero (square corners).
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.top_left.0 == 0
            && self.top_left.1 == 0
            && self.top_right.0 == 0
            && self.top_right.1 == 0
            && self.bottom_right.0 == 0
            && self.bottom_right.1 == 0
            && self.bottom_left.0 == 0
            && self.bottom_left.1 == 0
    }
}

impl BorderRadii {
    /// Resolve percentages against the border box: horizontal radii
    /// against `width`, vertical radii against `height`.
    ///
    /// [§ 5.1] "Percentages: Refer to corresponding dimension of the
    /// border box."
    #[must_use]
    pub fn calc_percents(&self, width: i32, height: i32, font_size: i32) -> ResolvedRadii {
        let x_ctx = ResolveCtx::with_font_size(font_size).percent_against(width);
        let y_ctx = ResolveCtx::with_font_size(font_size).percent_against(height);
        ResolvedRadii {
            top_left: (self.top_left_x.to_px(&x_ctx), self.top_left_y.to_px(&y_ctx)),
            top_right: (
                self.top_right_x.to_px(&x_ctx),
                self.top_right_y.to_px(&y_ctx),
            ),
            bottom_right: (
                self.bottom_right_x.to_px(&x_ctx),
                self.bottom_right_y.to_px(&y_ctx),
            ),
            bottom_left: (
                self.bottom_left_x.to_px(&x_ctx),
                self.bottom_left_y.to_px(&y_ctx),
            ),
        }
    }
}

/// The four border sides plus the corner radii.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Borders {
    /// Per-side width/style/color.
    pub sides: Quad<Border>,
    /// The eight corner radii.
    pub radii: BorderRadii,
}

impl Borders {
    /// Used widths of all four sides.
    #[must_use]
    pub fn used_widths(&self, ctx: &ResolveCtx) -> Quad<i32> {
        Quad {
            top: self.sides.top.used_width(ctx),
            right: self.sides.right.used_width(ctx),
            bottom: self.sides.bottom.used_width(ctx),
            left: self.sides.left.used_width(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::values::LengthUnit;

    #[test]
    fn styleless_border_has_zero_width() {
        let border = Border {
            width: Length::px(4.0),
            style: BorderStyle::None,
            color: Color::BLACK,
        };
        let ctx = ResolveCtx::with_font_size(16);
        assert_eq!(border.used_width(&ctx), 0);
        let solid = Border {
            style: BorderStyle::Solid,
            ..border
        };
        assert_eq!(solid.used_width(&ctx), 4);
    }

    #[test]
    fn radii_resolve_against_both_axes() {
        let radii = BorderRadii {
            top_left_x: Length::Number {
                value: 50.0,
                unit: LengthUnit::Percent,
            },
            top_left_y: Length::Number {
                value: 50.0,
                unit: LengthUnit::Percent,
            },
            ..BorderRadii::default()
        };
        let resolved = radii.calc_percents(200, 100, 16);
        assert_eq!(resolved.top_left, (100, 50));
        assert!(resolved.bottom_right == (0, 0));
    }
}
