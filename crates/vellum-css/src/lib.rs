//! CSS processing and layout for the Vellum engine.
//!
//! This crate is the core of the engine. It turns CSS text into
//! stylesheets, applies them to an element tree, and lays the result out
//! into a geometry tree ready for painting:
//!
//! - [`tokenizer`] — CSS Syntax Level 3 tokenizer
//! - [`parser`] — component values, declarations, rules, at-rules
//! - [`selector`] — selector compilation, specificity, matching
//! - [`media`] — media query evaluation
//! - [`style`] — the value model and the computed-property set
//! - [`cascade`] — rule matching, cascade order, inheritance
//! - [`layout`] — render tree, block/inline/flex/table layout, floats,
//!   positioning, stacking contexts
//! - [`paint`] — paint-order traversal emitting calls on a [`paint::Painter`]
//!
//! The crate performs no I/O and draws nothing itself; fonts, images and
//! imported stylesheets arrive through small traits implemented by the
//! embedding layer.

pub mod cascade;
pub mod layout;
pub mod media;
pub mod paint;
pub mod parser;
pub mod selector;
pub mod style;
pub mod tokenizer;

pub use cascade::{MatchedRule, StyleMap, apply_stylesheet};
pub use media::{MediaFeatures, MediaQueryList, MediaType};
pub use parser::{ComponentValue, CssParser, Declaration, Stylesheet, StyleRule};
pub use selector::{Combinator, MatchResult, Selector, Specificity};
pub use style::computed::CssProperties;
pub use style::values::{Color, Length, LengthUnit, ResolveCtx};
pub use tokenizer::{CssToken, CssTokenizer};
