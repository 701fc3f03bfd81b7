//! CSS tokenization.
//!
//! [CSS Syntax Module Level 3 § 4](https://www.w3.org/TR/css-syntax-3/#tokenization)

pub mod token;
#[allow(clippy::module_inception)]
pub mod tokenizer;

pub use token::{CssToken, HashType, NumericType};
pub use tokenizer::CssTokenizer;
