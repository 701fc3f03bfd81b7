//! Gradient descriptors.
//!
//! [CSS Images § 3 Gradients](https://www.w3.org/TR/css-images-3/#gradients)
//!
//! The engine stores gradients symbolically; the embedder receives the
//! resolved descriptor (angle in degrees, pixel-resolved stops) at paint
//! time through `draw_linear_gradient`.

use serde::Serialize;

use crate::parser::ComponentValue;
use crate::tokenizer::CssToken;

use super::values::{Color, Length, LengthUnit};

/// One entry in a gradient's color stop list.
///
/// [§ 3.4.1 Color Stop Lists](https://www.w3.org/TR/css-images-3/#color-stop-syntax)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStop {
    /// The stop color (meaningless for a hint).
    pub color: Color,
    /// The stop position along the gradient line, if given.
    pub position: Option<Length>,
    /// "A color interpolation hint": a bare position between two stops.
    pub is_hint: bool,
}

/// Direction of a linear gradient before box-size resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum LinearDirection {
    /// An explicit angle in degrees (0 = up, 90 = right).
    Angle(f32),
    /// `to <side-or-corner>`: horizontal (-1 left, 0 none, 1 right) and
    /// vertical (-1 top, 0 none, 1 bottom) components.
    ToSide {
        /// Horizontal component.
        x: i8,
        /// Vertical component.
        y: i8,
    },
}

/// Radial shape keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RadialShape {
    /// Scaled to the box.
    #[default]
    Ellipse,
    /// Equal radii.
    Circle,
}

/// A parsed gradient.
///
/// [§ 3.1 linear-gradient()](https://www.w3.org/TR/css-images-3/#linear-gradients),
/// [§ 3.2 radial-gradient()](https://www.w3.org/TR/css-images-3/#radial-gradients)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Gradient {
    /// `linear-gradient(...)` / `repeating-linear-gradient(...)`
    Linear {
        /// Direction (angle or side keyword).
        direction: LinearDirection,
        /// The stop list in order.
        stops: Vec<ColorStop>,
        /// The repeating variant.
        repeating: bool,
    },
    /// `radial-gradient(...)` / `repeating-radial-gradient(...)`
    Radial {
        /// Circle or ellipse.
        shape: RadialShape,
        /// The stop list in order.
        stops: Vec<ColorStop>,
        /// The repeating variant.
        repeating: bool,
    },
}

impl Gradient {
    /// Parse a gradient function, dispatching on its name.
    #[must_use]
    pub fn parse(name: &str, args: &[ComponentValue]) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        match name.as_str() {
            "linear-gradient" => parse_linear(args, false),
            "repeating-linear-gradient" => parse_linear(args, true),
            "radial-gradient" => parse_radial(args, false),
            "repeating-radial-gradient" => parse_radial(args, true),
            _ => None,
        }
    }

    /// Resolve the direction to a degree angle for a given origin box,
    /// normalized to `[0, 360)`.
    ///
    /// [§ 3.1.1] "to <side-or-corner>" points the gradient line at the
    /// named corner of the box: the angle is
    /// `90° − atan2(run, rise)·180/π` with the run and rise scaled by
    /// the box dimensions. The four axis cases are special-cased so they
    /// resolve exactly.
    #[must_use]
    pub fn linear_angle(direction: LinearDirection, width: i32, height: i32) -> f32 {
        match direction {
            LinearDirection::Angle(angle) => angle.rem_euclid(360.0),
            LinearDirection::ToSide { x, y } => match (x, y) {
                // Axis cases resolve exactly, no trigonometry involved.
                (x2, 0) if x2 > 0 => 90.0,
                (x2, 0) if x2 < 0 => 270.0,
                (0, y2) if y2 > 0 => 180.0,
                (_, y2) if y2 < 0 && x == 0 => 0.0,
                (x2, y2) => {
                    let run = f64::from(i32::from(x2) * width.max(1));
                    let rise = f64::from(i32::from(-y2) * height.max(1));
                    let degrees = 90.0 - run.atan2(rise).to_degrees();
                    (degrees as f32).rem_euclid(360.0)
                }
            },
        }
    }
}

/// Split function args on top-level commas.
fn split_args(args: &[ComponentValue]) -> Vec<Vec<&ComponentValue>> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    for arg in args {
        if matches!(arg, ComponentValue::Token(CssToken::Comma)) {
            groups.push(std::mem::take(&mut current));
        } else if !arg.is_whitespace() {
            current.push(arg);
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

fn parse_linear(args: &[ComponentValue], repeating: bool) -> Option<Gradient> {
    let groups = split_args(args);
    let mut stops_start = 0;
    let mut direction = LinearDirection::Angle(180.0); // "to bottom" default

    if let Some(first) = groups.first() {
        if let Some(parsed) = parse_direction(first) {
            direction = parsed;
            stops_start = 1;
        }
    }

    let stops = parse_stops(&groups[stops_start..])?;
    Some(Gradient::Linear {
        direction,
        stops,
        repeating,
    })
}

fn parse_radial(args: &[ComponentValue], repeating: bool) -> Option<Gradient> {
    let groups = split_args(args);
    let mut stops_start = 0;
    let mut shape = RadialShape::Ellipse;

    // A leading shape/position group is recognized but only the shape
    // keyword is kept; extents and explicit centers paint as defaults.
    if let Some(first) = groups.first() {
        let idents: Vec<String> = first
            .iter()
            .filter_map(|v| v.as_ident().map(str::to_ascii_lowercase))
            .collect();
        if !idents.is_empty() && first.iter().all(|v| v.as_ident().is_some()) {
            let known = idents.iter().any(|i| {
                matches!(
                    i.as_str(),
                    "circle"
                        | "ellipse"
                        | "closest-side"
                        | "closest-corner"
                        | "farthest-side"
                        | "farthest-corner"
                        | "at"
                        | "center"
                        | "top"
                        | "bottom"
                        | "left"
                        | "right"
                )
            });
            if known {
                if idents.iter().any(|i| i == "circle") {
                    shape = RadialShape::Circle;
                }
                stops_start = 1;
            }
        }
    }

    let stops = parse_stops(&groups[stops_start..])?;
    Some(Gradient::Radial {
        shape,
        stops,
        repeating,
    })
}

/// A direction group: `45deg`, `0.5turn`, or `to left top`.
fn parse_direction(group: &[&ComponentValue]) -> Option<LinearDirection> {
    match group.first()? {
        ComponentValue::Token(CssToken::Dimension { value, unit, .. }) => {
            let degrees = match unit.to_ascii_lowercase().as_str() {
                "deg" => *value,
                "grad" => value * 360.0 / 400.0,
                "rad" => value.to_degrees(),
                "turn" => value * 360.0,
                _ => return None,
            };
            Some(LinearDirection::Angle(degrees.rem_euclid(360.0)))
        }
        value if value.as_ident().is_some_and(|i| i.eq_ignore_ascii_case("to")) => {
            let mut x = 0_i8;
            let mut y = 0_i8;
            for side in &group[1..] {
                match side.as_ident()?.to_ascii_lowercase().as_str() {
                    "left" => x = -1,
                    "right" => x = 1,
                    "top" => y = -1,
                    "bottom" => y = 1,
                    _ => return None,
                }
            }
            if x == 0 && y == 0 {
                return None;
            }
            Some(LinearDirection::ToSide { x, y })
        }
        _ => None,
    }
}

/// Stop groups: `color`, `color position`, or a bare `position` hint.
fn parse_stops(groups: &[Vec<&ComponentValue>]) -> Option<Vec<ColorStop>> {
    let mut stops = Vec::new();
    for group in groups {
        match group.as_slice() {
            [single] => {
                if let Some(color) = Color::parse(single) {
                    stops.push(ColorStop {
                        color,
                        position: None,
                        is_hint: false,
                    });
                } else if let Some(position) = Length::parse(single, &[]) {
                    stops.push(ColorStop {
                        color: Color::TRANSPARENT,
                        position: Some(position),
                        is_hint: true,
                    });
                } else {
                    return None;
                }
            }
            [color_value, position_value] => {
                let color = Color::parse(color_value)?;
                let position = Length::parse(position_value, &[])?;
                stops.push(ColorStop {
                    color,
                    position: Some(position),
                    is_hint: false,
                });
            }
            _ => return None,
        }
    }
    // "A gradient with fewer than two stops is invalid" — a single hint
    // certainly is.
    let real_stops = stops.iter().filter(|s| !s.is_hint).count();
    (real_stops >= 2).then_some(stops)
}

/// Resolve stop positions to pixels along a gradient line of `line_len`,
/// filling unspecified positions by even distribution.
///
/// [§ 3.4.3 Color Stop “Fixup”](https://www.w3.org/TR/css-images-3/#color-stop-fixup)
#[must_use]
pub fn resolve_stop_positions(stops: &[ColorStop], line_len: i32, font_size: i32) -> Vec<f32> {
    use super::values::ResolveCtx;
    let ctx = ResolveCtx::with_font_size(font_size).percent_against(line_len);

    let mut positions: Vec<Option<f32>> = stops
        .iter()
        .map(|stop| {
            stop.position.map(|p| {
                if matches!(p, Length::Number { unit: LengthUnit::Percent, .. }) {
                    p.raw() / 100.0
                } else {
                    p.to_px(&ctx) as f32 / line_len.max(1) as f32
                }
            })
        })
        .collect();

    // "If the first color stop does not have a position, set it to 0%;
    // if the last does not, set it to 100%."
    if let Some(first) = positions.first_mut() {
        first.get_or_insert(0.0);
    }
    if let Some(last) = positions.last_mut() {
        last.get_or_insert(1.0);
    }
    // "Positions must increase": clamp to the running maximum.
    let mut running = 0.0_f32;
    for position in positions.iter_mut().flatten() {
        if *position < running {
            *position = running;
        }
        running = *position;
    }
    // Distribute unpositioned runs evenly between their neighbors.
    let mut index = 0;
    while index < positions.len() {
        if positions[index].is_none() {
            let run_start = index;
            let mut run_end = index;
            while run_end < positions.len() && positions[run_end].is_none() {
                run_end += 1;
            }
            let before = positions[run_start - 1].unwrap_or(0.0);
            let after = positions.get(run_end).copied().flatten().unwrap_or(1.0);
            let count = (run_end - run_start + 1) as f32;
            for (offset, slot) in positions[run_start..run_end].iter_mut().enumerate() {
                *slot = Some(before + (after - before) * (offset as f32 + 1.0) / count);
            }
            index = run_end;
        } else {
            index += 1;
        }
    }

    positions.into_iter().map(|p| p.unwrap_or(0.0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CssParser;
    use crate::tokenizer::CssTokenizer;

    fn parse_fn(text: &str) -> Option<Gradient> {
        let mut tokenizer = CssTokenizer::new(text);
        tokenizer.run();
        let mut parser = CssParser::new(tokenizer.into_tokens());
        let value = parser.consume_component_value()?;
        match value {
            ComponentValue::Function { name, args } => Gradient::parse(&name, &args),
            _ => None,
        }
    }

    #[test]
    fn linear_with_sides() {
        let g = parse_fn("linear-gradient(to right, red, blue)").expect("parse");
        let Gradient::Linear {
            direction, stops, ..
        } = g
        else {
            panic!("expected linear");
        };
        assert_eq!(direction, LinearDirection::ToSide { x: 1, y: 0 });
        assert_eq!(stops.len(), 2);
    }

    #[test]
    fn default_direction_is_to_bottom() {
        let g = parse_fn("linear-gradient(red, blue)").expect("parse");
        let Gradient::Linear { direction, .. } = g else {
            panic!("expected linear");
        };
        assert_eq!(Gradient::linear_angle(direction, 100, 100), 180.0);
    }

    #[test]
    fn axis_angles_are_exact() {
        assert_eq!(
            Gradient::linear_angle(LinearDirection::ToSide { x: 1, y: 0 }, 123, 7),
            90.0
        );
        assert_eq!(
            Gradient::linear_angle(LinearDirection::ToSide { x: -1, y: 0 }, 123, 7),
            270.0
        );
        assert_eq!(
            Gradient::linear_angle(LinearDirection::ToSide { x: 0, y: -1 }, 9, 9),
            0.0
        );
        assert_eq!(
            Gradient::linear_angle(LinearDirection::ToSide { x: 0, y: 1 }, 9, 9),
            180.0
        );
    }

    #[test]
    fn corner_angle_scales_with_box() {
        // "to top right" in a square box: 45°.
        let angle = Gradient::linear_angle(LinearDirection::ToSide { x: 1, y: -1 }, 100, 100);
        assert!((angle - 45.0).abs() < 0.01, "got {angle}");
        // The magic-corner behavior: a wide box pulls the angle toward
        // vertical, keeping the gradient line perpendicular to the
        // crossing diagonal.
        let wide = Gradient::linear_angle(LinearDirection::ToSide { x: 1, y: -1 }, 300, 100);
        assert!(wide > 0.0 && wide < 45.0, "got {wide}");
    }

    #[test]
    fn angle_normalization() {
        assert_eq!(
            Gradient::linear_angle(LinearDirection::Angle(-90.0), 1, 1),
            270.0
        );
        assert_eq!(
            Gradient::linear_angle(LinearDirection::Angle(450.0), 1, 1),
            90.0
        );
    }

    #[test]
    fn repeating_and_radial_variants() {
        assert!(matches!(
            parse_fn("repeating-linear-gradient(red, blue)"),
            Some(Gradient::Linear {
                repeating: true,
                ..
            })
        ));
        assert!(matches!(
            parse_fn("radial-gradient(circle, red, blue)"),
            Some(Gradient::Radial {
                shape: RadialShape::Circle,
                ..
            })
        ));
    }

    #[test]
    fn single_stop_is_invalid() {
        assert!(parse_fn("linear-gradient(red)").is_none());
    }

    #[test]
    fn stop_position_fixup() {
        let stops = vec![
            ColorStop {
                color: Color::rgb(255, 0, 0),
                position: None,
                is_hint: false,
            },
            ColorStop {
                color: Color::rgb(0, 255, 0),
                position: None,
                is_hint: false,
            },
            ColorStop {
                color: Color::rgb(0, 0, 255),
                position: None,
                is_hint: false,
            },
        ];
        let resolved = resolve_stop_positions(&stops, 100, 16);
        assert_eq!(resolved, vec![0.0, 0.5, 1.0]);
    }
}
