//! Shorthand-to-longhand expansion.
//!
//! [CSS Cascading § 5.2 Shorthand Properties](https://www.w3.org/TR/css-cascade-4/#shorthand)
//!
//! Expansion happens when a declaration is merged, so the cascaded
//! property map only ever holds longhands. Every expanded longhand
//! inherits the shorthand's `!important` flag.

use crate::parser::ComponentValue;
use crate::tokenizer::CssToken;

use super::borders::Border;
use super::font::FontStyle;
use super::keywords::BorderStyle;
use super::values::{Color, Length, LengthKeyword};

/// An expanded longhand: name plus its value slice.
pub type Longhand = (String, Vec<ComponentValue>);

/// Expand a shorthand declaration. Returns `None` when `name` is not a
/// shorthand (the declaration is stored as-is).
#[must_use]
pub fn expand_shorthand(name: &str, value: &[ComponentValue]) -> Option<Vec<Longhand>> {
    let pieces: Vec<&ComponentValue> = value.iter().filter(|v| !v.is_whitespace()).collect();
    match name {
        "margin" => Some(expand_box(&pieces, "margin-{}")),
        "padding" => Some(expand_box(&pieces, "padding-{}")),
        "border-width" => Some(expand_box(&pieces, "border-{}-width")),
        "border-style" => Some(expand_box(&pieces, "border-{}-style")),
        "border-color" => Some(expand_box(&pieces, "border-{}-color")),
        "border" => Some(expand_border(&pieces, None)),
        "border-top" => Some(expand_border(&pieces, Some("top"))),
        "border-right" => Some(expand_border(&pieces, Some("right"))),
        "border-bottom" => Some(expand_border(&pieces, Some("bottom"))),
        "border-left" => Some(expand_border(&pieces, Some("left"))),
        "border-radius" => Some(expand_border_radius(value)),
        "border-radius-x" => Some(expand_radius_axis(&pieces, "x")),
        "border-radius-y" => Some(expand_radius_axis(&pieces, "y")),
        "border-top-left-radius" => Some(expand_radius_corner(&pieces, "top-left")),
        "border-top-right-radius" => Some(expand_radius_corner(&pieces, "top-right")),
        "border-bottom-right-radius" => Some(expand_radius_corner(&pieces, "bottom-right")),
        "border-bottom-left-radius" => Some(expand_radius_corner(&pieces, "bottom-left")),
        "border-spacing" => Some(expand_border_spacing(&pieces)),
        "list-style" => Some(expand_list_style(&pieces)),
        "font" => expand_font(&pieces),
        "flex" => Some(expand_flex(&pieces)),
        _ => None,
    }
}

/// The 1/2/3/4-value box pattern.
///
/// [CSS 2.2 § 8.3] "If there is only one component value, it applies to
/// all sides. If there are two values, the top and bottom are set to the
/// first value and the right and left to the second. If there are three,
/// the top is set to the first, the left and right to the second, and the
/// bottom to the third. If there are four, they apply to the top, right,
/// bottom, and left, respectively."
fn expand_box(pieces: &[&ComponentValue], pattern: &str) -> Vec<Longhand> {
    let (top, right, bottom, left) = match pieces {
        [all] => (*all, *all, *all, *all),
        [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
        [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
        [top, right, bottom, left, ..] => (*top, *right, *bottom, *left),
        [] => return Vec::new(),
    };
    [
        ("top", top),
        ("right", right),
        ("bottom", bottom),
        ("left", left),
    ]
    .into_iter()
    .map(|(side, piece)| (pattern.replace("{}", side), vec![piece.clone()]))
    .collect()
}

/// `border` / `border-<side>`: any order of width, style, color.
fn expand_border(pieces: &[&ComponentValue], side: Option<&str>) -> Vec<Longhand> {
    let mut width = None;
    let mut style = None;
    let mut color = None;

    for piece in pieces {
        if let Some(ident) = piece.as_ident() {
            let ident = ident.to_ascii_lowercase();
            if BorderStyle::from_ident(&ident).is_some() {
                style = Some((*piece).clone());
                continue;
            }
            if Border::width_from_keyword(&ident).is_some() {
                width = Some((*piece).clone());
                continue;
            }
        }
        if Length::parse(piece, &[]).is_some() && width.is_none() && Color::parse(piece).is_none()
        {
            width = Some((*piece).clone());
            continue;
        }
        if Color::parse(piece).is_some() {
            color = Some((*piece).clone());
        }
    }

    let sides: &[&str] = match side {
        Some(side) => &[side],
        None => &["top", "right", "bottom", "left"],
    };
    let mut out = Vec::new();
    for side in sides {
        if let Some(width) = &width {
            out.push((format!("border-{side}-width"), vec![width.clone()]));
        }
        if let Some(style) = &style {
            out.push((format!("border-{side}-style"), vec![style.clone()]));
        }
        if let Some(color) = &color {
            out.push((format!("border-{side}-color"), vec![color.clone()]));
        }
    }
    // A bare "border: solid" still resets the unmentioned legs to their
    // initial values on every side.
    if width.is_none() && style.is_none() && color.is_none() {
        return Vec::new();
    }
    out
}

/// `border-radius`: horizontal radii, optionally `/ vertical radii`.
///
/// [CSS Backgrounds § 5.1] "If values are given before and after the
/// slash, then the values before the slash set the horizontal radius and
/// the values after the slash set the vertical radius. If there is no
/// slash, then the values set both radii equally."
fn expand_border_radius(value: &[ComponentValue]) -> Vec<Longhand> {
    let mut x_part: Vec<&ComponentValue> = Vec::new();
    let mut y_part: Vec<&ComponentValue> = Vec::new();
    let mut after_slash = false;
    for piece in value {
        if matches!(piece, ComponentValue::Token(CssToken::Delim('/'))) {
            after_slash = true;
            continue;
        }
        if piece.is_whitespace() {
            continue;
        }
        if after_slash {
            y_part.push(piece);
        } else {
            x_part.push(piece);
        }
    }
    if !after_slash {
        y_part.clone_from(&x_part);
    }
    let mut out = expand_radius_axis(&x_part, "x");
    out.extend(expand_radius_axis(&y_part, "y"));
    out
}

/// One axis of radii with the corner 1/2/3/4 pattern
/// (top-left, top-right+bottom-left, bottom-right).
fn expand_radius_axis(pieces: &[&ComponentValue], axis: &str) -> Vec<Longhand> {
    let (tl, tr, br, bl) = match pieces {
        [all] => (*all, *all, *all, *all),
        [tl_br, tr_bl] => (*tl_br, *tr_bl, *tl_br, *tr_bl),
        [tl, tr_bl, br] => (*tl, *tr_bl, *br, *tr_bl),
        [tl, tr, br, bl, ..] => (*tl, *tr, *br, *bl),
        [] => return Vec::new(),
    };
    [
        ("top-left", tl),
        ("top-right", tr),
        ("bottom-right", br),
        ("bottom-left", bl),
    ]
    .into_iter()
    .map(|(corner, piece)| {
        (
            format!("border-{corner}-radius-{axis}"),
            vec![piece.clone()],
        )
    })
    .collect()
}

/// `border-top-left-radius: x [y]` — one or two values.
fn expand_radius_corner(pieces: &[&ComponentValue], corner: &str) -> Vec<Longhand> {
    let x = pieces.first();
    let y = pieces.get(1).or(x);
    let mut out = Vec::new();
    if let Some(x) = x {
        out.push((
            format!("border-{corner}-radius-x"),
            vec![(*x).clone()],
        ));
    }
    if let Some(y) = y {
        out.push((
            format!("border-{corner}-radius-y"),
            vec![(*y).clone()],
        ));
    }
    out
}

/// `border-spacing: h [v]`.
fn expand_border_spacing(pieces: &[&ComponentValue]) -> Vec<Longhand> {
    let horizontal = pieces.first();
    let vertical = pieces.get(1).or(horizontal);
    let mut out = Vec::new();
    if let Some(h) = horizontal {
        out.push(("-vellum-border-spacing-x".to_string(), vec![(*h).clone()]));
    }
    if let Some(v) = vertical {
        out.push(("-vellum-border-spacing-y".to_string(), vec![(*v).clone()]));
    }
    out
}

/// `list-style: [type] [position] [image]` in any order.
fn expand_list_style(pieces: &[&ComponentValue]) -> Vec<Longhand> {
    let mut out = Vec::new();
    for piece in pieces {
        match piece {
            ComponentValue::Token(CssToken::Url(_)) => {
                out.push(("list-style-image".to_string(), vec![(*piece).clone()]));
            }
            value => {
                let Some(ident) = value.as_ident() else {
                    continue;
                };
                match ident.to_ascii_lowercase().as_str() {
                    "inside" | "outside" => {
                        out.push(("list-style-position".to_string(), vec![(*piece).clone()]));
                    }
                    _ => out.push(("list-style-type".to_string(), vec![(*piece).clone()])),
                }
            }
        }
    }
    out
}

/// `font: [style weight]? size[/line-height] family+`.
///
/// [CSS Fonts § 3.9 font](https://www.w3.org/TR/css-fonts-4/#font-prop)
///
/// The size is the pivot: everything before it is style/weight/variant,
/// everything after is the family list. System-font keywords are not
/// supported — `None` drops the declaration.
fn expand_font(pieces: &[&ComponentValue]) -> Option<Vec<Longhand>> {
    let mut out = Vec::new();
    let mut size_index = None;

    for (index, piece) in pieces.iter().enumerate() {
        let looks_like_size = matches!(
            piece,
            ComponentValue::Token(
                CssToken::Dimension { .. } | CssToken::Percentage { .. }
            )
        ) || piece
            .as_ident()
            .is_some_and(|i| is_font_size_keyword(&i.to_ascii_lowercase()));
        if looks_like_size {
            size_index = Some(index);
            break;
        }
    }
    let size_index = size_index?;

    // Prefix: style and weight keywords ("normal" is ambiguous and
    // harmless either way).
    for piece in &pieces[..size_index] {
        let Some(ident) = piece.as_ident() else {
            continue;
        };
        let ident = ident.to_ascii_lowercase();
        if FontStyle::from_ident(&ident).is_some() && ident != "normal" {
            out.push(("font-style".to_string(), vec![(*piece).clone()]));
        } else if matches!(ident.as_str(), "bold" | "bolder" | "lighter")
            || ident.parse::<u16>().is_ok()
        {
            out.push(("font-weight".to_string(), vec![(*piece).clone()]));
        }
    }

    out.push((
        "font-size".to_string(),
        vec![(*pieces.get(size_index)?).clone()],
    ));

    // Optional "/ line-height" immediately after the size.
    let mut family_start = size_index + 1;
    if matches!(
        pieces.get(family_start),
        Some(ComponentValue::Token(CssToken::Delim('/')))
    ) {
        if let Some(line_height) = pieces.get(family_start + 1) {
            out.push(("line-height".to_string(), vec![(*line_height).clone()]));
        }
        family_start += 2;
    }

    // The rest is the family list, joined back into one value.
    if family_start < pieces.len() {
        let family: Vec<ComponentValue> = pieces[family_start..]
            .iter()
            .map(|p| (*p).clone())
            .collect();
        out.push(("font-family".to_string(), family));
    }

    Some(out)
}

fn is_font_size_keyword(ident: &str) -> bool {
    matches!(
        ident,
        "xx-small" | "x-small" | "small" | "medium" | "large" | "x-large" | "xx-large"
            | "smaller" | "larger"
    )
}

/// `flex: none | [grow shrink? basis?]`.
///
/// [CSS Flexbox § 7.1.1 Basic Values of flex](https://www.w3.org/TR/css-flexbox-1/#flex-common)
fn expand_flex(pieces: &[&ComponentValue]) -> Vec<Longhand> {
    let number = |value: f32| {
        ComponentValue::Token(CssToken::Number {
            value,
            numeric_type: crate::tokenizer::NumericType::Number,
        })
    };

    // "flex: none" == "0 0 auto"; "flex: auto" == "1 1 auto";
    // "flex: initial" == "0 1 auto".
    if pieces.len() == 1 {
        if let Some(ident) = pieces[0].as_ident() {
            let (grow, shrink, basis) = match ident.to_ascii_lowercase().as_str() {
                "none" => (0.0, 0.0, "auto"),
                "auto" => (1.0, 1.0, "auto"),
                "initial" => (0.0, 1.0, "auto"),
                _ => return Vec::new(),
            };
            return vec![
                ("flex-grow".to_string(), vec![number(grow)]),
                ("flex-shrink".to_string(), vec![number(shrink)]),
                (
                    "flex-basis".to_string(),
                    vec![ComponentValue::Token(CssToken::Ident(basis.to_string()))],
                ),
            ];
        }
    }

    let mut numbers: Vec<f32> = Vec::new();
    let mut basis: Option<ComponentValue> = None;
    for piece in pieces {
        if let Some(value) = piece.as_number() {
            if numbers.len() < 2 {
                numbers.push(value);
                continue;
            }
        }
        if Length::parse(piece, &[LengthKeyword::Auto]).is_some() {
            basis = Some((*piece).clone());
        }
    }

    let mut out = Vec::new();
    if let Some(grow) = numbers.first() {
        out.push(("flex-grow".to_string(), vec![number(*grow)]));
        // "When omitted from the flex shorthand, [flex-shrink's] specified
        // value is 1" and "flex-basis... when omitted... is 0".
        out.push((
            "flex-shrink".to_string(),
            vec![number(numbers.get(1).copied().unwrap_or(1.0))],
        ));
        out.push((
            "flex-basis".to_string(),
            vec![basis.unwrap_or_else(|| {
                ComponentValue::Token(CssToken::Dimension {
                    value: 0.0,
                    numeric_type: crate::tokenizer::NumericType::Integer,
                    unit: "px".to_string(),
                })
            })],
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CssParser;
    use crate::tokenizer::CssTokenizer;

    fn expand(name: &str, css_value: &str) -> Vec<Longhand> {
        let mut tokenizer = CssTokenizer::new(format!("p {{ {name}: {css_value} }}"));
        tokenizer.run();
        let sheet = CssParser::new(tokenizer.into_tokens()).parse_stylesheet();
        let declaration = &sheet.rules[0].declarations[0];
        expand_shorthand(&declaration.name, &declaration.value).unwrap_or_default()
    }

    fn names(longhands: &[Longhand]) -> Vec<&str> {
        longhands.iter().map(|(n, _)| n.as_str()).collect()
    }

    #[test]
    fn margin_value_counts() {
        assert_eq!(
            names(&expand("margin", "1px")),
            vec!["margin-top", "margin-right", "margin-bottom", "margin-left"]
        );
        // Two values: vertical then horizontal.
        let two = expand("margin", "1px 2px");
        assert_eq!(two[0].1, two[2].1); // top == bottom
        assert_eq!(two[1].1, two[3].1); // right == left
        // Three values: top, sides, bottom.
        let three = expand("margin", "1px 2px 3px");
        assert_eq!(three[1].1, three[3].1);
        assert_ne!(three[0].1, three[2].1);
    }

    #[test]
    fn border_sets_all_sides() {
        let longhands = expand("border", "1px solid #ddd");
        assert_eq!(longhands.len(), 12);
        assert!(names(&longhands).contains(&"border-left-color"));
    }

    #[test]
    fn border_side_only_touches_that_side() {
        let longhands = expand("border-top", "2px dashed red");
        assert_eq!(
            names(&longhands),
            vec!["border-top-width", "border-top-style", "border-top-color"]
        );
    }

    #[test]
    fn border_radius_slash_splits_axes() {
        let longhands = expand("border-radius", "10px / 20px");
        assert_eq!(longhands.len(), 8);
        assert!(names(&longhands).contains(&"border-top-left-radius-x"));
        assert!(names(&longhands).contains(&"border-bottom-left-radius-y"));
    }

    #[test]
    fn font_shorthand() {
        let longhands = expand("font", "italic bold 12px/1.5 Georgia, serif");
        let names = names(&longhands);
        assert!(names.contains(&"font-style"));
        assert!(names.contains(&"font-weight"));
        assert!(names.contains(&"font-size"));
        assert!(names.contains(&"line-height"));
        assert!(names.contains(&"font-family"));
    }

    #[test]
    fn flex_single_number() {
        let longhands = expand("flex", "2");
        assert_eq!(
            names(&longhands),
            vec!["flex-grow", "flex-shrink", "flex-basis"]
        );
        // grow 2, shrink defaults to 1, basis to 0px.
        assert_eq!(longhands[0].1[0].as_number(), Some(2.0));
        assert_eq!(longhands[1].1[0].as_number(), Some(1.0));
    }

    #[test]
    fn flex_keywords() {
        let none = expand("flex", "none");
        assert_eq!(none[0].1[0].as_number(), Some(0.0));
        assert_eq!(none[1].1[0].as_number(), Some(0.0));
        let auto = expand("flex", "auto");
        assert_eq!(auto[0].1[0].as_number(), Some(1.0));
    }

    #[test]
    fn list_style_any_order() {
        let longhands = expand("list-style", "inside square");
        assert!(names(&longhands).contains(&"list-style-position"));
        assert!(names(&longhands).contains(&"list-style-type"));
    }

    #[test]
    fn non_shorthand_returns_none() {
        assert!(expand_shorthand("color", &[]).is_none());
    }
}
