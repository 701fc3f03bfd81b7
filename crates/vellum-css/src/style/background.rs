//! The layered background value.
//!
//! [CSS Backgrounds and Borders Level 3 § 2](https://www.w3.org/TR/css-backgrounds-3/#backgrounds)
//!
//! "The background of a box can have multiple layers. The number of
//! layers is determined by the number of comma-separated values in the
//! background-image property."
//!
//! The value is stored as parallel vectors indexed by layer, plus one
//! base color; painting addresses layer `i == images.len()` to mean the
//! color layer below everything.

use serde::Serialize;

use crate::parser::ComponentValue;
use crate::tokenizer::CssToken;

use super::gradient::Gradient;
use super::keywords::{BackgroundAttachment, BackgroundBox, BackgroundRepeat};
use super::values::{Color, Length, LengthUnit};

/// One background layer's image source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ImageSource {
    /// `url(...)` — resolved by the embedder against the document base.
    Url(String),
    /// A gradient function.
    Gradient(Gradient),
}

/// Background layer size.
///
/// [§ 3.9 background-size](https://www.w3.org/TR/css-backgrounds-3/#the-background-size)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub enum BackgroundSize {
    /// Intrinsic size.
    #[default]
    Auto,
    /// Scale to cover the positioning area.
    Cover,
    /// Scale to fit inside the positioning area.
    Contain,
    /// Explicit width/height.
    Explicit(Length, Length),
}

/// A single resolved background layer view handed to painting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackgroundLayer {
    /// The image source, `None` for the base color layer.
    pub image: Option<ImageSource>,
    /// Tiling.
    pub repeat: BackgroundRepeat,
    /// Scroll or viewport-fixed.
    pub attachment: BackgroundAttachment,
    /// Painting area.
    pub clip: BackgroundBox,
    /// Positioning area.
    pub origin: BackgroundBox,
    /// Layer size.
    pub size: BackgroundSize,
    /// Horizontal position within the origin box.
    pub position_x: Length,
    /// Vertical position within the origin box.
    pub position_y: Length,
}

/// The full background value: layered vectors plus the base color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Background {
    /// Image per layer, outermost first (CSS order).
    pub images: Vec<ImageSource>,
    /// Tiling per layer.
    pub repeats: Vec<BackgroundRepeat>,
    /// Attachment per layer.
    pub attachments: Vec<BackgroundAttachment>,
    /// Painting area per layer.
    pub clips: Vec<BackgroundBox>,
    /// Positioning area per layer.
    pub origins: Vec<BackgroundBox>,
    /// Size per layer.
    pub sizes: Vec<BackgroundSize>,
    /// Horizontal position per layer.
    pub positions_x: Vec<Length>,
    /// Vertical position per layer.
    pub positions_y: Vec<Length>,
    /// The single base color under all image layers.
    pub color: Color,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            images: Vec::new(),
            repeats: Vec::new(),
            attachments: Vec::new(),
            clips: Vec::new(),
            origins: Vec::new(),
            sizes: Vec::new(),
            positions_x: Vec::new(),
            positions_y: Vec::new(),
            color: Color::TRANSPARENT,
        }
    }
}

impl Background {
    /// True when nothing would paint.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.color.is_transparent()
    }

    /// Number of paint layers including the base color layer.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.images.len() + 1
    }

    /// The layer at `index`; `index == images.len()` addresses the base
    /// color layer (image `None`).
    #[must_use]
    pub fn layer(&self, index: usize) -> Option<BackgroundLayer> {
        if index > self.images.len() {
            return None;
        }
        let per_layer = |index: usize| BackgroundLayer {
            image: self.images.get(index).cloned(),
            repeat: self.repeats.get(index).copied().unwrap_or_default(),
            attachment: self.attachments.get(index).copied().unwrap_or_default(),
            clip: self
                .clips
                .get(index)
                .copied()
                .unwrap_or(BackgroundBox::BorderBox),
            origin: self
                .origins
                .get(index)
                .copied()
                .unwrap_or(BackgroundBox::PaddingBox),
            size: self.sizes.get(index).copied().unwrap_or_default(),
            position_x: self.positions_x.get(index).copied().unwrap_or_default(),
            position_y: self.positions_y.get(index).copied().unwrap_or_default(),
        };
        Some(per_layer(index))
    }

    /// Parse the `background` shorthand value.
    ///
    /// [§ 3.10 background](https://www.w3.org/TR/css-backgrounds-3/#the-background)
    ///
    /// Comma-separated layers; only the last layer may set the color.
    /// Unrecognized pieces are skipped — the shorthand still resets
    /// everything it covers.
    #[must_use]
    pub fn parse_shorthand(value: &[ComponentValue]) -> Self {
        let mut background = Self::default();
        let layers = split_layers(value);
        let layer_count = layers.len();

        for (layer_index, layer) in layers.into_iter().enumerate() {
            let mut image = None;
            let mut repeat = None;
            let mut attachment = None;
            let mut boxes: Vec<BackgroundBox> = Vec::new();
            let mut positions: Vec<Length> = Vec::new();

            for piece in layer.iter().filter(|v| !v.is_whitespace()) {
                if let Some(source) = parse_image_source(piece) {
                    image = Some(source);
                    continue;
                }
                if let Some(ident) = piece.as_ident() {
                    let ident = ident.to_ascii_lowercase();
                    if let Some(r) = BackgroundRepeat::from_ident(&ident) {
                        repeat = Some(r);
                        continue;
                    }
                    if let Some(a) = BackgroundAttachment::from_ident(&ident) {
                        attachment = Some(a);
                        continue;
                    }
                    if let Some(b) = BackgroundBox::from_ident(&ident) {
                        boxes.push(b);
                        continue;
                    }
                    if let Some(position) = position_keyword(&ident) {
                        positions.push(position);
                        continue;
                    }
                }
                if let Some(length) = Length::parse(piece, &[]) {
                    positions.push(length);
                    continue;
                }
                // Only the final layer may carry the color.
                if layer_index + 1 == layer_count {
                    if let Some(color) = Color::parse(piece) {
                        background.color = color;
                        continue;
                    }
                }
            }

            if let Some(image) = image {
                background.images.push(image);
                background.repeats.push(repeat.unwrap_or_default());
                background.attachments.push(attachment.unwrap_or_default());
                // [§ 3.10] "If one <box> value is present then it sets both
                // background-origin and background-clip... If two values are
                // present, the first sets origin, the second clip."
                let origin = boxes.first().copied().unwrap_or(BackgroundBox::PaddingBox);
                let clip = boxes
                    .get(1)
                    .or_else(|| boxes.first())
                    .copied()
                    .unwrap_or(BackgroundBox::BorderBox);
                background.origins.push(origin);
                background.clips.push(clip);
                background.sizes.push(BackgroundSize::Auto);
                background
                    .positions_x
                    .push(positions.first().copied().unwrap_or_default());
                background
                    .positions_y
                    .push(positions.get(1).copied().unwrap_or_default());
            }
        }

        background
    }
}

/// `left`/`center`/`right`/`top`/`bottom` as percentage lengths.
fn position_keyword(ident: &str) -> Option<Length> {
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

/// A `url(...)` token/function or a gradient function.
fn parse_image_source(value: &ComponentValue) -> Option<ImageSource> {
    match value {
        ComponentValue::Token(CssToken::Url(url)) => Some(ImageSource::Url(url.clone())),
        ComponentValue::Function { name, args } if name.eq_ignore_ascii_case("url") => args
            .iter()
            .find_map(|arg| match arg {
                ComponentValue::Token(CssToken::String(s)) => {
                    Some(ImageSource::Url(s.clone()))
                }
                _ => None,
            }),
        ComponentValue::Function { name, args } => {
            Gradient::parse(name, args).map(ImageSource::Gradient)
        }
        _ => None,
    }
}

/// Split a shorthand value on top-level commas into layers.
fn split_layers(value: &[ComponentValue]) -> Vec<Vec<&ComponentValue>> {
    let mut layers = Vec::new();
    let mut current = Vec::new();
    for piece in value {
        if matches!(piece, ComponentValue::Token(CssToken::Comma)) {
            layers.push(std::mem::take(&mut current));
        } else {
            current.push(piece);
        }
    }
    layers.push(current);
    layers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CssParser;
    use crate::tokenizer::CssTokenizer;

    fn value_of(css: &str) -> Vec<ComponentValue> {
        let mut tokenizer = CssTokenizer::new(format!("p {{ background: {css} }}"));
        tokenizer.run();
        let sheet = CssParser::new(tokenizer.into_tokens()).parse_stylesheet();
        sheet.rules[0].declarations[0].value.clone()
    }

    #[test]
    fn color_only() {
        let background = Background::parse_shorthand(&value_of("red"));
        assert!(background.images.is_empty());
        assert_eq!(background.color, Color::rgb(255, 0, 0));
    }

    #[test]
    fn image_with_repeat_and_position() {
        let background =
            Background::parse_shorthand(&value_of("url(bg.png) no-repeat center top"));
        assert_eq!(background.images.len(), 1);
        assert_eq!(background.repeats[0], BackgroundRepeat::NoRepeat);
        assert!(background.positions_x[0].is_percent());
        assert_eq!(background.positions_x[0].raw(), 50.0);
        assert_eq!(background.positions_y[0].raw(), 0.0);
    }

    #[test]
    fn layered_with_final_color() {
        let background =
            Background::parse_shorthand(&value_of("url(a.png), url(b.png) repeat-x, #00ff00"));
        assert_eq!(background.images.len(), 2);
        assert_eq!(background.repeats[1], BackgroundRepeat::RepeatX);
        assert_eq!(background.color, Color::rgb(0, 255, 0));
        // Layer index == images.len() addresses the color layer.
        let base = background.layer(2).expect("color layer");
        assert!(base.image.is_none());
        assert!(background.layer(3).is_none());
    }

    #[test]
    fn gradient_layer() {
        let background =
            Background::parse_shorthand(&value_of("linear-gradient(to right, red, blue)"));
        assert!(matches!(
            background.images[0],
            ImageSource::Gradient(Gradient::Linear { .. })
        ));
    }

    #[test]
    fn one_box_sets_origin_and_clip() {
        let background = Background::parse_shorthand(&value_of("url(x.png) content-box"));
        assert_eq!(background.origins[0], BackgroundBox::ContentBox);
        assert_eq!(background.clips[0], BackgroundBox::ContentBox);
    }
}
