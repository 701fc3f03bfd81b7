//! Media query parsing and evaluation.
//!
//! [Media Queries Level 3](https://www.w3.org/TR/css3-mediaqueries/)
//!
//! A media query list applies if any of its queries applies; a query
//! applies if its media type matches and every feature predicate holds
//! against the current [`MediaFeatures`] snapshot. The snapshot comes
//! from the embedder and is re-read on `media_changed()`.

use serde::Serialize;

use vellum_common::warn_once;

use crate::parser::ComponentValue;
use crate::tokenizer::CssToken;

/// [§ 2 Media types](https://www.w3.org/TR/css3-mediaqueries/#media0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MediaType {
    /// Matches every device.
    #[default]
    All,
    /// Color screens.
    Screen,
    /// Paged output.
    Print,
    /// Speech synthesizers.
    Speech,
}

impl MediaType {
    fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "all" => Some(Self::All),
            "screen" => Some(Self::Screen),
            "print" => Some(Self::Print),
            "speech" | "aural" => Some(Self::Speech),
            _ => None,
        }
    }
}

/// The embedder's answers to every feature a query can ask about.
///
/// [§ 4 Media features](https://www.w3.org/TR/css3-mediaqueries/#media1)
///
/// All lengths are pixels; `resolution` is dpi.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct MediaFeatures {
    /// The rendering medium.
    pub media_type: MediaType,
    /// "the width of the targeted display area" (viewport).
    pub width: i32,
    /// Viewport height.
    pub height: i32,
    /// "the width of the rendering surface" (whole screen).
    pub device_width: i32,
    /// Screen height.
    pub device_height: i32,
    /// "number of bits per color component"; 0 for monochrome devices.
    pub color: i32,
    /// Entries in the color lookup table; 0 when not indexed.
    pub color_index: i32,
    /// Bits per pixel on a monochrome device; 0 for color devices.
    pub monochrome: i32,
    /// Device resolution in dpi.
    pub resolution: i32,
}

/// Which feature a predicate tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeatureKind {
    Width,
    Height,
    DeviceWidth,
    DeviceHeight,
    Color,
    ColorIndex,
    Monochrome,
    Resolution,
    Orientation,
    AspectRatio,
    DeviceAspectRatio,
}

/// Comparison direction from the `min-`/`max-` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Range {
    Exact,
    Min,
    Max,
}

/// One `(feature: value)` predicate.
#[derive(Debug, Clone, PartialEq)]
struct FeaturePredicate {
    kind: FeatureKind,
    range: Range,
    /// Primary value (px, count, dpi, or ratio numerator). For
    /// `orientation`, 1 = landscape, 0 = portrait.
    value: f32,
    /// Ratio denominator, 1.0 otherwise.
    value2: f32,
}

impl FeaturePredicate {
    /// Evaluate against the features snapshot as an arithmetic predicate.
    fn check(&self, features: &MediaFeatures) -> bool {
        let actual = match self.kind {
            FeatureKind::Width => f64::from(features.width),
            FeatureKind::Height => f64::from(features.height),
            FeatureKind::DeviceWidth => f64::from(features.device_width),
            FeatureKind::DeviceHeight => f64::from(features.device_height),
            FeatureKind::Color => f64::from(features.color),
            FeatureKind::ColorIndex => f64::from(features.color_index),
            FeatureKind::Monochrome => f64::from(features.monochrome),
            FeatureKind::Resolution => f64::from(features.resolution),
            // "orientation: landscape" iff width > height.
            FeatureKind::Orientation => {
                let landscape = features.width >= features.height;
                return (self.value >= 1.0) == landscape;
            }
            FeatureKind::AspectRatio => {
                f64::from(features.width) / f64::from(features.height.max(1))
            }
            FeatureKind::DeviceAspectRatio => {
                f64::from(features.device_width) / f64::from(features.device_height.max(1))
            }
        };

        let wanted = match self.kind {
            FeatureKind::AspectRatio | FeatureKind::DeviceAspectRatio => {
                f64::from(self.value) / f64::from(self.value2.max(1.0))
            }
            _ => f64::from(self.value),
        };

        match self.range {
            Range::Exact => (actual - wanted).abs() < 0.01,
            Range::Min => actual >= wanted,
            Range::Max => actual <= wanted,
        }
    }
}

/// One media query: `[not] <type> [and (feature)]*`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaQuery {
    media_type: MediaType,
    negated: bool,
    predicates: Vec<FeaturePredicate>,
    /// An unparseable query never matches ("not all").
    invalid: bool,
}

impl MediaQuery {
    fn applies(&self, features: &MediaFeatures) -> bool {
        if self.invalid {
            return false;
        }
        let type_ok =
            self.media_type == MediaType::All || self.media_type == features.media_type;
        let result = type_ok && self.predicates.iter().all(|p| p.check(features));
        result != self.negated
    }
}

/// A comma-separated list of media queries.
///
/// [§ 3 Media Queries](https://www.w3.org/TR/css3-mediaqueries/#media0)
/// "A comma-separated list of media queries ... If one or more of the
/// media queries in the list are true, the whole list is true."
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaQueryList {
    queries: Vec<MediaQuery>,
}

impl MediaQueryList {
    /// True if any query in the list applies. An empty list means "all".
    #[must_use]
    pub fn applies(&self, features: &MediaFeatures) -> bool {
        self.queries.is_empty() || self.queries.iter().any(|q| q.applies(features))
    }

    /// Parse a media query list from an at-rule prelude.
    #[must_use]
    pub fn parse(prelude: &[ComponentValue]) -> Self {
        let mut queries = Vec::new();
        let mut current: Vec<&ComponentValue> = Vec::new();

        for value in prelude {
            if matches!(value, ComponentValue::Token(CssToken::Comma)) {
                queries.push(parse_query(&current));
                current.clear();
            } else if !value.is_whitespace() {
                current.push(value);
            }
        }
        if !current.is_empty() {
            queries.push(parse_query(&current));
        }

        Self { queries }
    }
}

/// Parse one query: `[not|only] <type>? [and (feature: value)]*`.
fn parse_query(parts: &[&ComponentValue]) -> MediaQuery {
    let mut query = MediaQuery {
        media_type: MediaType::All,
        ..MediaQuery::default()
    };
    let mut position = 0;

    // Leading "not" / "only" ("only" exists purely for legacy parsers).
    if let Some(ident) = parts.first().and_then(|v| v.as_ident()) {
        match ident.to_ascii_lowercase().as_str() {
            "not" => {
                query.negated = true;
                position = 1;
            }
            "only" => position = 1,
            _ => {}
        }
    }

    // Optional media type.
    if let Some(ident) = parts.get(position).and_then(|v| v.as_ident()) {
        if let Some(media_type) = MediaType::from_ident(&ident.to_ascii_lowercase()) {
            query.media_type = media_type;
            position += 1;
        } else {
            warn_once("CSS", &format!("unknown media type '{ident}'"));
            query.invalid = true;
            return query;
        }
    }

    // Chain of "and (feature...)" groups; a bare "(feature)" list with no
    // type is also fine.
    while position < parts.len() {
        match parts[position] {
            value if value.as_ident().is_some_and(|i| i.eq_ignore_ascii_case("and")) => {
                position += 1;
            }
            ComponentValue::Block {
                opener: CssToken::LeftParen,
                body,
            } => {
                match parse_feature(body) {
                    Some(predicate) => query.predicates.push(predicate),
                    None => {
                        query.invalid = true;
                        return query;
                    }
                }
                position += 1;
            }
            other => {
                warn_once("CSS", &format!("malformed media query near '{}'", other.to_css()));
                query.invalid = true;
                return query;
            }
        }
    }

    query
}

/// Parse `(feature)` or `(feature: value)` contents.
fn parse_feature(body: &[ComponentValue]) -> Option<FeaturePredicate> {
    let significant: Vec<&ComponentValue> = body.iter().filter(|v| !v.is_whitespace()).collect();

    let name = significant.first()?.as_ident()?.to_ascii_lowercase();
    let (range, base) = if let Some(rest) = name.strip_prefix("min-") {
        (Range::Min, rest.to_string())
    } else if let Some(rest) = name.strip_prefix("max-") {
        (Range::Max, rest.to_string())
    } else {
        (Range::Exact, name)
    };

    let kind = match base.as_str() {
        "width" => FeatureKind::Width,
        "height" => FeatureKind::Height,
        "device-width" => FeatureKind::DeviceWidth,
        "device-height" => FeatureKind::DeviceHeight,
        "color" => FeatureKind::Color,
        "color-index" => FeatureKind::ColorIndex,
        "monochrome" => FeatureKind::Monochrome,
        "resolution" => FeatureKind::Resolution,
        "orientation" => FeatureKind::Orientation,
        "aspect-ratio" => FeatureKind::AspectRatio,
        "device-aspect-ratio" => FeatureKind::DeviceAspectRatio,
        other => {
            warn_once("CSS", &format!("unknown media feature '{other}'"));
            return None;
        }
    };

    // "(color)" with no value tests for a non-zero value.
    if significant.len() == 1 {
        return Some(FeaturePredicate {
            kind,
            range: Range::Min,
            value: match kind {
                FeatureKind::Color | FeatureKind::ColorIndex | FeatureKind::Monochrome => 1.0,
                _ => 0.0,
            },
            value2: 1.0,
        });
    }

    // "feature : value [/ denominator]"
    if !matches!(
        significant.get(1),
        Some(ComponentValue::Token(CssToken::Colon))
    ) {
        return None;
    }

    let (value, value2) = match kind {
        FeatureKind::Orientation => {
            let ident = significant.get(2)?.as_ident()?.to_ascii_lowercase();
            let value = match ident.as_str() {
                "landscape" => 1.0,
                "portrait" => 0.0,
                _ => return None,
            };
            (value, 1.0)
        }
        FeatureKind::AspectRatio | FeatureKind::DeviceAspectRatio => {
            // "<integer> / <integer>"
            let numerator = significant.get(2)?.as_number()?;
            let slash_ok = matches!(
                significant.get(3),
                Some(ComponentValue::Token(CssToken::Delim('/')))
            );
            if !slash_ok {
                return None;
            }
            let denominator = significant.get(4)?.as_number()?;
            (numerator, denominator)
        }
        _ => {
            let value = match significant.get(2)? {
                ComponentValue::Token(CssToken::Dimension { value, unit, .. }) => {
                    match unit.to_ascii_lowercase().as_str() {
                        "px" => *value,
                        // 1em = 16px for media query purposes.
                        "em" | "rem" => *value * 16.0,
                        "dpi" => *value,
                        "dpcm" => *value * 2.54,
                        _ => *value,
                    }
                }
                ComponentValue::Token(CssToken::Number { value, .. }) => *value,
                _ => return None,
            };
            (value, 1.0)
        }
    };

    Some(FeaturePredicate {
        kind,
        range,
        value,
        value2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CssParser;
    use crate::tokenizer::CssTokenizer;

    fn parse_list(text: &str) -> MediaQueryList {
        let mut tokenizer = CssTokenizer::new(text);
        tokenizer.run();
        let mut parser = CssParser::new(tokenizer.into_tokens());
        let mut prelude = Vec::new();
        while let Some(value) = parser.consume_component_value() {
            if matches!(value, ComponentValue::Token(CssToken::Eof)) {
                break;
            }
            prelude.push(value);
        }
        MediaQueryList::parse(&prelude)
    }

    fn screen_800x600() -> MediaFeatures {
        MediaFeatures {
            media_type: MediaType::Screen,
            width: 800,
            height: 600,
            device_width: 1920,
            device_height: 1080,
            color: 8,
            resolution: 96,
            ..MediaFeatures::default()
        }
    }

    #[test]
    fn type_only() {
        let features = screen_800x600();
        assert!(parse_list("screen").applies(&features));
        assert!(!parse_list("print").applies(&features));
        assert!(parse_list("all").applies(&features));
    }

    #[test]
    fn min_max_width() {
        let features = screen_800x600();
        assert!(parse_list("screen and (min-width: 700px)").applies(&features));
        assert!(!parse_list("screen and (min-width: 900px)").applies(&features));
        assert!(parse_list("(max-width: 800px)").applies(&features));
        assert!(!parse_list("(max-width: 799px)").applies(&features));
    }

    #[test]
    fn negation() {
        let features = screen_800x600();
        assert!(!parse_list("not screen").applies(&features));
        assert!(parse_list("not print").applies(&features));
        assert!(parse_list("not screen and (min-width: 900px)").applies(&features));
    }

    #[test]
    fn comma_list_is_a_disjunction() {
        let features = screen_800x600();
        assert!(parse_list("print, screen").applies(&features));
        assert!(!parse_list("print, speech").applies(&features));
    }

    #[test]
    fn orientation_and_aspect_ratio() {
        let features = screen_800x600();
        assert!(parse_list("(orientation: landscape)").applies(&features));
        assert!(!parse_list("(orientation: portrait)").applies(&features));
        assert!(parse_list("(aspect-ratio: 4/3)").applies(&features));
        assert!(!parse_list("(aspect-ratio: 16/9)").applies(&features));
        assert!(parse_list("(min-aspect-ratio: 1/1)").applies(&features));
    }

    #[test]
    fn bare_feature_tests_nonzero() {
        let features = screen_800x600();
        assert!(parse_list("(color)").applies(&features));
        assert!(!parse_list("(monochrome)").applies(&features));
    }

    #[test]
    fn unknown_query_never_matches() {
        let features = screen_800x600();
        assert!(!parse_list("3d-glasses").applies(&features));
        assert!(!parse_list("screen and (bogus: 1)").applies(&features));
        // But unknown queries don't poison the rest of the list.
        assert!(parse_list("3d-glasses, screen").applies(&features));
    }

    #[test]
    fn empty_list_is_all() {
        assert!(parse_list("").applies(&screen_800x600()));
    }
}
