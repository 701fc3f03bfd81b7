//! Font descriptions and the embedder font seam.
//!
//! The engine never touches glyphs. It describes the font it wants, the
//! embedder creates it and reports metrics, and every later measurement
//! goes back through the same trait. Handles are opaque to the engine;
//! the document layer caches them per description and releases them when
//! the document is dropped.

use serde::Serialize;

/// Opaque embedder font handle.
pub type FontHandle = usize;

/// [CSS Fonts § 3.3 font-style](https://www.w3.org/TR/css-fonts-4/#font-style-prop)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum FontStyle {
    /// Upright faces.
    #[default]
    Normal,
    /// Italic faces.
    Italic,
}

impl FontStyle {
    /// Parse a font-style keyword ("oblique" maps to italic).
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "normal" => Some(Self::Normal),
            "italic" | "oblique" => Some(Self::Italic),
            _ => None,
        }
    }
}

/// [CSS Text Decoration § 2.1 text-decoration-line](https://www.w3.org/TR/css-text-decor-3/#text-decoration-line-property)
///
/// A bitset: `underline overline` sets two bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TextDecoration(u8);

impl TextDecoration {
    /// No decoration.
    pub const NONE: Self = Self(0);
    /// Underline.
    pub const UNDERLINE: Self = Self(1);
    /// Overline.
    pub const OVERLINE: Self = Self(1 << 1);
    /// Line-through.
    pub const LINE_THROUGH: Self = Self(1 << 2);

    /// Set the bits of `other`.
    pub const fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// True if all bits of `other` are set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parse one decoration keyword.
    #[must_use]
    pub fn from_ident(ident: &str) -> Option<Self> {
        match ident {
            "none" => Some(Self::NONE),
            "underline" => Some(Self::UNDERLINE),
            "overline" => Some(Self::OVERLINE),
            "line-through" => Some(Self::LINE_THROUGH),
            _ => None,
        }
    }
}

/// Everything identifying a font face at a size.
///
/// Used as the font-cache key: two elements with equal descriptions share
/// one embedder handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FontDescription {
    /// The `font-family` list as written (the embedder resolves it).
    pub family: String,
    /// Computed size in px.
    pub size: i32,
    /// [CSS Fonts § 3.2] numeric weight; 400 normal, 700 bold.
    pub weight: u16,
    /// Italic or upright.
    pub style: FontStyle,
    /// Decoration lines the embedder should draw with the text.
    pub decoration: TextDecoration,
}

/// Metrics the embedder reports for a created font.
///
/// All values in pixels. `height` is the default line height
/// (ascent + descent + line gap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FontMetrics {
    /// Recommended line height.
    pub height: i32,
    /// Baseline to top of the em box.
    pub ascent: i32,
    /// Baseline to bottom of the em box (positive).
    pub descent: i32,
    /// Height of a lowercase 'x'.
    pub x_height: i32,
}

/// The embedder's font services.
///
/// The cascade calls [`FontSource::font`] once per distinct description
/// per document; layout calls [`FontSource::text_width`] for every text
/// run it places.
pub trait FontSource {
    /// Create (or fetch from cache) a font for the description.
    fn font(&mut self, description: &FontDescription) -> (FontHandle, FontMetrics);

    /// Measure a text run in the given font.
    fn text_width(&self, text: &str, font: FontHandle) -> i32;

    /// The embedder's default font size in px.
    fn default_font_size(&self) -> i32;

    /// The embedder's default font family.
    fn default_font_family(&self) -> String;
}

/// Deterministic font source for tests: every glyph is a fixed-width
/// box, metrics derive from the size.
///
/// Mirrors what a trivial monospace embedder would report, which makes
/// layout results exactly predictable in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedFontSource {
    /// Advance width of every glyph at size 10; scales linearly.
    pub advance_per_10px: i32,
}

impl Default for FixedFontSource {
    fn default() -> Self {
        Self { advance_per_10px: 5 }
    }
}

impl FontSource for FixedFontSource {
    fn font(&mut self, description: &FontDescription) -> (FontHandle, FontMetrics) {
        let size = description.size.max(1);
        let metrics = FontMetrics {
            height: size + size / 5,
            ascent: size * 4 / 5,
            descent: size / 5,
            x_height: size / 2,
        };
        // The handle encodes the size so text_width can scale.
        (size as FontHandle, metrics)
    }

    fn text_width(&self, text: &str, font: FontHandle) -> i32 {
        let size = font as i32;
        let advance = self.advance_per_10px * size / 10;
        advance * text.chars().count() as i32
    }

    fn default_font_size(&self) -> i32 {
        16
    }

    fn default_font_family(&self) -> String {
        "serif".to_string()
    }
}
