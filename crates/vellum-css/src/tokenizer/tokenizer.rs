//! The tokenizer state machine.
//!
//! [§ 4.3 Tokenizer Algorithms](https://www.w3.org/TR/css-syntax-3/#tokenizer-algorithms)
//!
//! The tokenizer never fails: malformed input produces `BadString` or
//! `BadUrl` tokens and a note through the warning hook. Panics are a bug.

use vellum_common::warn_once;

use super::token::{CssToken, HashType, NumericType};

/// CSS tokenizer following the CSS Syntax Module Level 3 specification.
pub struct CssTokenizer {
    /// The input string being tokenized
    input: Vec<char>,
    /// Current position in the input
    position: usize,
    /// Collected tokens
    tokens: Vec<CssToken>,
}

impl CssTokenizer {
    /// Create a new CSS tokenizer over the given input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into().chars().collect(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// Tokenize the whole input, collecting tokens up to and including EOF.
    pub fn run(&mut self) {
        loop {
            let token = self.consume_token();
            let is_eof = token.is_eof();
            self.tokens.push(token);
            if is_eof {
                break;
            }
        }
    }

    /// Consume the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<CssToken> {
        self.tokens
    }

    /// Borrow the collected tokens.
    #[must_use]
    pub fn tokens(&self) -> &[CssToken] {
        &self.tokens
    }

    /// [§ 4.3.1 Consume a token](https://www.w3.org/TR/css-syntax-3/#consume-token)
    fn consume_token(&mut self) -> CssToken {
        self.consume_comments();

        let Some(c) = self.consume() else {
            return CssToken::Eof;
        };

        match c {
            // "Consume as much whitespace as possible."
            c if is_whitespace(c) => {
                self.consume_whitespace();
                CssToken::Whitespace
            }

            '"' => self.consume_string_token('"'),
            '\'' => self.consume_string_token('\''),

            // "If the next input code point is an ident code point or the
            // next two input code points are a valid escape..."
            '#' => {
                if self.peek().is_some_and(is_ident_code_point)
                    || is_valid_escape(self.peek(), self.peek_at(1))
                {
                    // "If the next 3 input code points would start an ident
                    // sequence, set the <hash-token>'s type flag to 'id'."
                    let hash_type = if self.would_start_ident_sequence() {
                        HashType::Id
                    } else {
                        HashType::Unrestricted
                    };
                    CssToken::Hash {
                        value: self.consume_ident_sequence(),
                        hash_type,
                    }
                } else {
                    CssToken::Delim('#')
                }
            }

            '(' => CssToken::LeftParen,
            ')' => CssToken::RightParen,
            '[' => CssToken::LeftBracket,
            ']' => CssToken::RightBracket,
            '{' => CssToken::LeftBrace,
            '}' => CssToken::RightBrace,
            ',' => CssToken::Comma,
            ':' => CssToken::Colon,
            ';' => CssToken::Semicolon,

            '+' => {
                if self.would_start_number() {
                    self.reconsume();
                    self.consume_numeric_token()
                } else {
                    CssToken::Delim('+')
                }
            }

            '-' => {
                if self.would_start_number() {
                    self.reconsume();
                    self.consume_numeric_token()
                } else if self.peek() == Some('-') && self.peek_at(1) == Some('>') {
                    self.position += 2;
                    CssToken::CDC
                } else if self.would_start_ident_with(Some('-')) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    CssToken::Delim('-')
                }
            }

            '.' => {
                if self.would_start_number() {
                    self.reconsume();
                    self.consume_numeric_token()
                } else {
                    CssToken::Delim('.')
                }
            }

            '<' => {
                // "If the next 3 input code points are U+0021 U+002D U+002D (!--)..."
                if self.peek() == Some('!')
                    && self.peek_at(1) == Some('-')
                    && self.peek_at(2) == Some('-')
                {
                    self.position += 3;
                    CssToken::CDO
                } else {
                    CssToken::Delim('<')
                }
            }

            '@' => {
                if self.would_start_ident_sequence() {
                    CssToken::AtKeyword(self.consume_ident_sequence())
                } else {
                    CssToken::Delim('@')
                }
            }

            '\\' => {
                if is_valid_escape(Some('\\'), self.peek()) {
                    self.reconsume();
                    self.consume_ident_like_token()
                } else {
                    // "This is a parse error."
                    warn_once("CSS", "invalid escape at top level");
                    CssToken::Delim('\\')
                }
            }

            c if c.is_ascii_digit() => {
                self.reconsume();
                self.consume_numeric_token()
            }

            c if is_ident_start_code_point(c) => {
                self.reconsume();
                self.consume_ident_like_token()
            }

            // "anything else: Return a <delim-token>."
            c => CssToken::Delim(c),
        }
    }

    /// [§ 4.3.2 Consume comments](https://www.w3.org/TR/css-syntax-3/#consume-comment)
    ///
    /// "...consume them and all following code points up to and including
    /// the first U+002A ASTERISK (*) followed by U+002F SOLIDUS (/), or up
    /// to an EOF code point."
    fn consume_comments(&mut self) {
        while self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            self.position += 2;
            loop {
                match self.consume() {
                    Some('*') if self.peek() == Some('/') => {
                        self.position += 1;
                        break;
                    }
                    Some(_) => {}
                    None => return, // EOF inside a comment is fine
                }
            }
        }
    }

    fn consume_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.position += 1;
        }
    }

    /// [§ 4.3.4 Consume a string token](https://www.w3.org/TR/css-syntax-3/#consume-string-token)
    fn consume_string_token(&mut self, ending: char) -> CssToken {
        let mut value = String::new();
        loop {
            match self.consume() {
                Some(c) if c == ending => return CssToken::String(value),
                // "EOF: This is a parse error. Return the <string-token>."
                None => return CssToken::String(value),
                // "newline: This is a parse error. Reconsume the current
                // input code point, create a <bad-string-token>, and
                // return it."
                Some('\n') => {
                    self.reconsume();
                    warn_once("CSS", "unterminated string before newline");
                    return CssToken::BadString;
                }
                Some('\\') => match self.peek() {
                    None => {}
                    // An escaped newline is a continuation.
                    Some('\n') => self.position += 1,
                    Some(_) => {
                        if let Some(c) = self.consume_escaped_code_point() {
                            value.push(c);
                        }
                    }
                },
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.5 Consume a numeric token](https://www.w3.org/TR/css-syntax-3/#consume-numeric-token)
    fn consume_numeric_token(&mut self) -> CssToken {
        let (value, numeric_type) = self.consume_number();

        if self.would_start_ident_sequence() {
            CssToken::Dimension {
                value,
                numeric_type,
                unit: self.consume_ident_sequence(),
            }
        } else if self.peek() == Some('%') {
            self.position += 1;
            CssToken::Percentage { value }
        } else {
            CssToken::Number {
                value,
                numeric_type,
            }
        }
    }

    /// [§ 4.3.6 Consume an ident-like token](https://www.w3.org/TR/css-syntax-3/#consume-ident-like-token)
    ///
    /// The `url(` peek: if the contents start with a quote, this is really
    /// a function token whose argument is a string; otherwise a raw
    /// <url-token> follows.
    fn consume_ident_like_token(&mut self) -> CssToken {
        let string = self.consume_ident_sequence();

        if string.eq_ignore_ascii_case("url") && self.peek() == Some('(') {
            self.position += 1;
            while self.peek().is_some_and(is_whitespace) {
                self.position += 1;
            }
            match self.peek() {
                Some('"' | '\'') => CssToken::Function(string),
                _ => self.consume_url_token(),
            }
        } else if self.peek() == Some('(') {
            self.position += 1;
            CssToken::Function(string)
        } else {
            CssToken::Ident(string)
        }
    }

    /// [§ 4.3.7 Consume a url token](https://www.w3.org/TR/css-syntax-3/#consume-url-token)
    fn consume_url_token(&mut self) -> CssToken {
        let mut value = String::new();
        self.consume_whitespace();

        loop {
            match self.consume() {
                Some(')') => return CssToken::Url(value),
                None => return CssToken::Url(value),
                Some(c) if is_whitespace(c) => {
                    self.consume_whitespace();
                    match self.peek() {
                        Some(')') => {
                            self.position += 1;
                            return CssToken::Url(value);
                        }
                        None => return CssToken::Url(value),
                        _ => {
                            self.consume_bad_url_remnants();
                            warn_once("CSS", "whitespace inside unquoted url()");
                            return CssToken::BadUrl;
                        }
                    }
                }
                // Quotes and parens may not appear in a raw url.
                Some('"' | '\'' | '(') => {
                    self.consume_bad_url_remnants();
                    warn_once("CSS", "invalid character inside unquoted url()");
                    return CssToken::BadUrl;
                }
                Some('\\') => {
                    if is_valid_escape(Some('\\'), self.peek()) {
                        if let Some(c) = self.consume_escaped_code_point() {
                            value.push(c);
                        }
                    } else {
                        self.consume_bad_url_remnants();
                        warn_once("CSS", "invalid escape inside url()");
                        return CssToken::BadUrl;
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// [§ 4.3.14 Consume the remnants of a bad url](https://www.w3.org/TR/css-syntax-3/#consume-remnants-of-bad-url)
    ///
    /// Recovery: swallow everything up to the closing `)` so the parser
    /// can resynchronize after it.
    fn consume_bad_url_remnants(&mut self) {
        loop {
            match self.consume() {
                Some(')') | None => return,
                Some('\\') => {
                    if is_valid_escape(Some('\\'), self.peek()) {
                        let _ = self.consume_escaped_code_point();
                    }
                }
                _ => {}
            }
        }
    }

    /// [§ 4.3.11 Consume an ident sequence](https://www.w3.org/TR/css-syntax-3/#consume-name)
    fn consume_ident_sequence(&mut self) -> String {
        let mut result = String::new();
        loop {
            match self.consume() {
                Some(c) if is_ident_code_point(c) => result.push(c),
                Some('\\') if is_valid_escape(Some('\\'), self.peek()) => {
                    if let Some(c) = self.consume_escaped_code_point() {
                        result.push(c);
                    }
                }
                Some(_) => {
                    self.reconsume();
                    return result;
                }
                None => return result,
            }
        }
    }

    /// [§ 4.3.12 Consume a number](https://www.w3.org/TR/css-syntax-3/#consume-number)
    ///
    /// Covers sign, fraction, and exponent; the textual repr is parsed in
    /// one shot at the end.
    fn consume_number(&mut self) -> (f32, NumericType) {
        let mut numeric_type = NumericType::Integer;
        let mut repr = String::new();

        if matches!(self.peek(), Some('+' | '-')) {
            repr.push(self.consume().unwrap_or('+'));
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            repr.push(self.consume().unwrap_or('0'));
        }

        // ".5" — fraction part switches the type flag to "number".
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            repr.push(self.consume().unwrap_or('.'));
            repr.push(self.consume().unwrap_or('0'));
            numeric_type = NumericType::Number;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                repr.push(self.consume().unwrap_or('0'));
            }
        }

        // "1e3", "1e-3", "1E+3"
        if matches!(self.peek(), Some('e' | 'E')) {
            let next = self.peek_at(1);
            let has_sign = matches!(next, Some('+' | '-'));
            let digit_pos = if has_sign { 2 } else { 1 };
            if self.peek_at(digit_pos).is_some_and(|c| c.is_ascii_digit()) {
                repr.push(self.consume().unwrap_or('e'));
                if has_sign {
                    repr.push(self.consume().unwrap_or('+'));
                }
                repr.push(self.consume().unwrap_or('0'));
                numeric_type = NumericType::Number;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    repr.push(self.consume().unwrap_or('0'));
                }
            }
        }

        (repr.parse().unwrap_or(0.0), numeric_type)
    }

    /// [§ 4.3.13 Consume an escaped code point](https://www.w3.org/TR/css-syntax-3/#consume-escaped-code-point)
    fn consume_escaped_code_point(&mut self) -> Option<char> {
        match self.consume() {
            Some(c) if c.is_ascii_hexdigit() => {
                let mut hex = c.to_string();
                // "Consume as many hex digits as possible, but no more than 5."
                for _ in 0..5 {
                    if self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                        hex.push(self.consume().unwrap_or('0'));
                    } else {
                        break;
                    }
                }
                // "If the next input code point is whitespace, consume it."
                if self.peek().is_some_and(is_whitespace) {
                    self.position += 1;
                }
                let code_point = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
                // Zero, surrogates, and out-of-range become U+FFFD.
                if code_point == 0
                    || (0xD800..=0xDFFF).contains(&code_point)
                    || code_point > 0x0010_FFFF
                {
                    Some('\u{FFFD}')
                } else {
                    char::from_u32(code_point)
                }
            }
            // "EOF: This is a parse error. Return U+FFFD."
            None => Some('\u{FFFD}'),
            Some(c) => Some(c),
        }
    }

    /// [§ 4.3.9 Check if three code points would start an ident sequence](https://www.w3.org/TR/css-syntax-3/#would-start-an-identifier)
    fn would_start_ident_sequence(&self) -> bool {
        self.would_start_ident_with(self.peek())
    }

    fn would_start_ident_with(&self, first: Option<char>) -> bool {
        match first {
            Some('-') => {
                let second = self.peek_at(1);
                second.is_some_and(is_ident_start_code_point)
                    || second == Some('-')
                    || is_valid_escape(second, self.peek_at(2))
            }
            Some(c) if is_ident_start_code_point(c) => true,
            Some('\\') => is_valid_escape(Some('\\'), self.peek_at(1)),
            _ => false,
        }
    }

    /// [§ 4.3.10 Check if three code points would start a number](https://www.w3.org/TR/css-syntax-3/#starts-with-a-number)
    fn would_start_number(&self) -> bool {
        match self.peek() {
            Some('+' | '-') => {
                let second = self.peek_at(1);
                if second.is_some_and(|c| c.is_ascii_digit()) {
                    return true;
                }
                second == Some('.') && self.peek_at(2).is_some_and(|c| c.is_ascii_digit())
            }
            Some('.') => self.peek_at(1).is_some_and(|c| c.is_ascii_digit()),
            Some(c) if c.is_ascii_digit() => true,
            _ => false,
        }
    }

    fn consume(&mut self) -> Option<char> {
        let c = self.input.get(self.position).copied();
        if c.is_some() {
            self.position += 1;
        }
        c
    }

    fn reconsume(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

/// [§ 4.2 Definitions — whitespace](https://www.w3.org/TR/css-syntax-3/#whitespace)
fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ' | '\r' | '\x0C')
}

/// [§ 4.2 Definitions — ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
///
/// "A letter, a non-ASCII code point, or U+005F LOW LINE (_)."
fn is_ident_start_code_point(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// [§ 4.2 Definitions — ident code point](https://www.w3.org/TR/css-syntax-3/#ident-code-point)
fn is_ident_code_point(c: char) -> bool {
    is_ident_start_code_point(c) || c.is_ascii_digit() || c == '-'
}

/// [§ 4.3.8 Check if two code points are a valid escape](https://www.w3.org/TR/css-syntax-3/#starts-with-a-valid-escape)
fn is_valid_escape(first: Option<char>, second: Option<char>) -> bool {
    first == Some('\\') && second != Some('\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<CssToken> {
        let mut tokenizer = CssTokenizer::new(input);
        tokenizer.run();
        let mut tokens = tokenizer.into_tokens();
        assert_eq!(tokens.pop(), Some(CssToken::Eof));
        tokens
    }

    #[test]
    fn idents_and_delims() {
        assert_eq!(
            tokenize("div.cls"),
            vec![
                CssToken::Ident("div".into()),
                CssToken::Delim('.'),
                CssToken::Ident("cls".into()),
            ]
        );
    }

    #[test]
    fn numbers_dimensions_percentages() {
        assert_eq!(
            tokenize("12px 50% -3.5em 1e2"),
            vec![
                CssToken::Dimension {
                    value: 12.0,
                    numeric_type: NumericType::Integer,
                    unit: "px".into()
                },
                CssToken::Whitespace,
                CssToken::Percentage { value: 50.0 },
                CssToken::Whitespace,
                CssToken::Dimension {
                    value: -3.5,
                    numeric_type: NumericType::Number,
                    unit: "em".into()
                },
                CssToken::Whitespace,
                CssToken::Number {
                    value: 100.0,
                    numeric_type: NumericType::Number
                },
            ]
        );
    }

    #[test]
    fn hash_flags() {
        assert_eq!(
            tokenize("#fff #0a0b0c"),
            vec![
                CssToken::Hash {
                    value: "fff".into(),
                    hash_type: HashType::Id
                },
                CssToken::Whitespace,
                CssToken::Hash {
                    value: "0a0b0c".into(),
                    hash_type: HashType::Unrestricted
                },
            ]
        );
    }

    #[test]
    fn url_forms() {
        assert_eq!(
            tokenize("url(a.png)"),
            vec![CssToken::Url("a.png".into())]
        );
        // Quoted urls come back as a function token with a string inside.
        assert_eq!(
            tokenize("url(\"a.png\")"),
            vec![
                CssToken::Function("url".into()),
                CssToken::String("a.png".into()),
                CssToken::RightParen,
            ]
        );
    }

    #[test]
    fn bad_url_recovers_past_close_paren() {
        let tokens = tokenize("url(a b) x");
        assert_eq!(tokens[0], CssToken::BadUrl);
        assert_eq!(tokens[2], CssToken::Ident("x".into()));
    }

    #[test]
    fn bad_string_stops_at_newline() {
        let tokens = tokenize("\"abc\nx");
        assert_eq!(tokens[0], CssToken::BadString);
        assert_eq!(tokens[1], CssToken::Whitespace);
        assert_eq!(tokens[2], CssToken::Ident("x".into()));
    }

    #[test]
    fn comments_are_stripped() {
        assert_eq!(
            tokenize("a/* comment */b"),
            vec![CssToken::Ident("a".into()), CssToken::Ident("b".into())]
        );
        // Unterminated comment swallows the rest.
        assert_eq!(tokenize("a/* x"), vec![CssToken::Ident("a".into())]);
    }

    #[test]
    fn escapes_in_idents() {
        assert_eq!(tokenize("\\64 iv"), vec![CssToken::Ident("div".into())]);
        assert_eq!(tokenize("cls\\2d x"), vec![CssToken::Ident("cls-x".into())]);
    }

    #[test]
    fn cdo_cdc() {
        assert_eq!(
            tokenize("<!-- a -->"),
            vec![
                CssToken::CDO,
                CssToken::Whitespace,
                CssToken::Ident("a".into()),
                CssToken::Whitespace,
                CssToken::CDC,
            ]
        );
    }

    #[test]
    fn functions_and_at_keywords() {
        assert_eq!(
            tokenize("@media rgb(1,2,3)"),
            vec![
                CssToken::AtKeyword("media".into()),
                CssToken::Whitespace,
                CssToken::Function("rgb".into()),
                CssToken::Number {
                    value: 1.0,
                    numeric_type: NumericType::Integer
                },
                CssToken::Comma,
                CssToken::Number {
                    value: 2.0,
                    numeric_type: NumericType::Integer
                },
                CssToken::Comma,
                CssToken::Number {
                    value: 3.0,
                    numeric_type: NumericType::Integer
                },
                CssToken::RightParen,
            ]
        );
    }

    #[test]
    fn to_css_round_trip() {
        let input = "p.note > a[href] { margin: 10px 50%; color: #ff0000 }";
        let rendered: String = tokenize(input).iter().map(CssToken::to_css).collect();
        let again: Vec<CssToken> = tokenize(&rendered);
        assert_eq!(tokenize(input), again);
    }
}
