//! CSS parsing: component values, declarations, rules, and stylesheets.
//!
//! [CSS Syntax Module Level 3 § 5](https://www.w3.org/TR/css-syntax-3/#parsing)

#[allow(clippy::module_inception)]
pub mod parser;
pub mod stylesheet;

pub use parser::{ComponentValue, CssParser};
pub use stylesheet::{Declaration, ImportDirective, StyleRule, Stylesheet};
