//! Tolerant HTML scanner.
//!
//! [HTML § 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! A forgiving single-pass scanner over the input text. It emits the token
//! kinds the tree builder consumes and recovers from every malformed
//! construct: an unterminated tag, a stray `<`, a quote mismatch — all
//! produce best-effort tokens, never an error.

use strum_macros::Display;

use crate::entities::decode_reference;

/// An attribute on a start tag.
///
/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
/// "a list of attributes, each of which has a name and a value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name" — lowercased by the scanner.
    pub name: String,
    /// "and a value" — character references decoded.
    pub value: String,
}

/// Tokens emitted by the scanner.
///
/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the
/// following tokens: DOCTYPE, start tag, end tag, comment, character,
/// end-of-file."
///
/// Character tokens are coalesced into `Text` runs; the tree builder never
/// needs them one at a time.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Token {
    /// A DOCTYPE declaration; the engine ignores its internals.
    Doctype,
    /// "Start ... tag tokens have a tag name, a self-closing flag, and a
    /// list of attributes."
    StartTag {
        /// "a tag name" — lowercased.
        name: String,
        /// "a self-closing flag"
        self_closing: bool,
        /// "a list of attributes"
        attributes: Vec<Attribute>,
    },
    /// End tag token. Attributes on end tags are discarded.
    EndTag {
        /// "a tag name" — lowercased.
        name: String,
    },
    /// A run of character data with references decoded.
    Text(String),
    /// "Comment ... tokens have data."
    Comment(String),
    /// "end-of-file"
    Eof,
}

impl Token {
    /// Returns true if this is the EOF token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }
}

/// Raw-text elements whose content is never parsed as markup.
///
/// [§ 13.1.2 Elements](https://html.spec.whatwg.org/multipage/syntax.html#raw-text-elements)
///
/// "Raw text elements can have text, though it has restrictions."
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "title", "textarea", "xmp"];

/// Tolerant scanner over an HTML byte stream.
///
/// Follows the shape of the CSS tokenizer: a char vector, a cursor, and a
/// collected token list.
pub struct HtmlScanner {
    /// The input being scanned.
    input: Vec<char>,
    /// Current position in the input.
    position: usize,
    /// Collected tokens.
    tokens: Vec<Token>,
}

impl HtmlScanner {
    /// Create a new scanner over the given input.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into().chars().collect(),
            position: 0,
            tokens: Vec::new(),
        }
    }

    /// Scan the entire input, collecting tokens up to and including EOF.
    pub fn run(&mut self) {
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();

            // If the previous token was a raw-text start tag, its content
            // up to the matching end tag is one opaque text run.
            let raw_text_tag = match &token {
                Token::StartTag {
                    name, self_closing, ..
                } if !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) => {
                    Some(name.clone())
                }
                _ => None,
            };

            self.tokens.push(token);

            if let Some(tag) = raw_text_tag {
                self.consume_raw_text(&tag);
            }
            if is_eof {
                break;
            }
        }
    }

    /// Consume the collected tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Produce the next token from the current position.
    fn next_token(&mut self) -> Token {
        let Some(c) = self.peek() else {
            return Token::Eof;
        };

        if c == '<' {
            match self.peek_at(1) {
                // "</" — end tag
                Some('/') => return self.consume_end_tag(),
                // "<!" — comment or doctype
                Some('!') => return self.consume_markup_declaration(),
                // "<a".. — start tag only if a name character follows;
                // a lone "<" is content.
                Some(next) if next.is_ascii_alphabetic() => return self.consume_start_tag(),
                _ => {}
            }
        }

        self.consume_text()
    }

    /// Consume character data up to the next markup boundary, decoding
    /// character references.
    fn consume_text(&mut self) -> Token {
        let mut text = String::new();

        while let Some(c) = self.peek() {
            if c == '<' {
                // Only a real tag or declaration terminates the run.
                match self.peek_at(1) {
                    Some('/' | '!') => break,
                    Some(next) if next.is_ascii_alphabetic() => break,
                    _ => {}
                }
            }
            if c == '&' {
                let rest = &self.input[self.position + 1..];
                if let Some((decoded, consumed)) = decode_reference(rest) {
                    text.push_str(&decoded);
                    self.position += 1 + consumed;
                    continue;
                }
            }
            text.push(c);
            self.position += 1;
        }

        Token::Text(text)
    }

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn consume_start_tag(&mut self) -> Token {
        self.position += 1; // <
        let name = self.consume_tag_name();

        let mut attributes = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break, // EOF inside a tag: emit what we have
                Some('>') => {
                    self.position += 1;
                    break;
                }
                Some('/') => {
                    self.position += 1;
                    if self.peek() == Some('>') {
                        self.position += 1;
                        self_closing = true;
                        break;
                    }
                    // A stray slash inside a tag is dropped.
                }
                Some(_) => {
                    if let Some(attr) = self.consume_attribute() {
                        // First occurrence wins, matching browser behavior.
                        if !attributes.iter().any(|a: &Attribute| a.name == attr.name) {
                            attributes.push(attr);
                        }
                    }
                }
            }
        }

        Token::StartTag {
            name,
            self_closing,
            attributes,
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn consume_end_tag(&mut self) -> Token {
        self.position += 2; // </
        let name = self.consume_tag_name();
        // Anything up to '>' (stray attributes, whitespace) is discarded.
        while let Some(c) = self.peek() {
            self.position += 1;
            if c == '>' {
                break;
            }
        }
        Token::EndTag { name }
    }

    /// Tag names are ASCII-lowercased as they are consumed.
    fn consume_tag_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' {
                name.push(c.to_ascii_lowercase());
                self.position += 1;
            } else {
                break;
            }
        }
        name
    }

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    ///
    /// Handles `name`, `name=value`, `name="value"`, and `name='value'`.
    fn consume_attribute(&mut self) -> Option<Attribute> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || c == '=' || c == '>' || c == '/' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.position += 1;
        }
        if name.is_empty() {
            // Not an attribute start; consume one char so the tag loop
            // cannot spin in place on junk.
            self.position += 1;
            return None;
        }

        self.skip_whitespace();
        if self.peek() != Some('=') {
            // Boolean attribute: present with an empty value.
            return Some(Attribute {
                name,
                value: String::new(),
            });
        }
        self.position += 1; // =
        self.skip_whitespace();

        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.position += 1;
                self.consume_attr_value_until(|c| c == q)
            }
            // Unquoted value runs to whitespace or tag end.
            _ => self.consume_attr_value_until(|c| c.is_ascii_whitespace() || c == '>'),
        };

        Some(Attribute { name, value })
    }

    /// Consume an attribute value up to (and through, for quotes) the
    /// delimiter, decoding character references.
    fn consume_attr_value_until(&mut self, is_end: impl Fn(char) -> bool) -> String {
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if is_end(c) {
                // The quote is consumed; '>' and whitespace are left for
                // the tag loop.
                if c == '"' || c == '\'' {
                    self.position += 1;
                }
                break;
            }
            if c == '&' {
                let rest = &self.input[self.position + 1..];
                if let Some((decoded, consumed)) = decode_reference(rest) {
                    value.push_str(&decoded);
                    self.position += 1 + consumed;
                    continue;
                }
            }
            value.push(c);
            self.position += 1;
        }
        value
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// `<!-- ... -->`, `<!doctype ...>`, and anything else `<!...>`.
    fn consume_markup_declaration(&mut self) -> Token {
        self.position += 2; // <!

        if self.peek() == Some('-') && self.peek_at(1) == Some('-') {
            self.position += 2;
            let mut data = String::new();
            while let Some(c) = self.peek() {
                if c == '-' && self.peek_at(1) == Some('-') && self.peek_at(2) == Some('>') {
                    self.position += 3;
                    return Token::Comment(data);
                }
                data.push(c);
                self.position += 1;
            }
            // Unterminated comment runs to EOF.
            return Token::Comment(data);
        }

        // DOCTYPE or a bogus declaration; either way, skip to '>'.
        let is_doctype = self
            .input
            .get(self.position..self.position + 7)
            .is_some_and(|chars| {
                chars
                    .iter()
                    .collect::<String>()
                    .eq_ignore_ascii_case("doctype")
            });
        while let Some(c) = self.peek() {
            self.position += 1;
            if c == '>' {
                break;
            }
        }
        if is_doctype {
            Token::Doctype
        } else {
            Token::Comment(String::new())
        }
    }

    /// After a raw-text start tag, everything up to the matching end tag is
    /// one text token with no reference decoding.
    ///
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    fn consume_raw_text(&mut self, tag: &str) {
        let close: Vec<char> = format!("</{tag}").chars().collect();
        let mut text = String::new();

        'outer: while let Some(c) = self.peek() {
            if c == '<' {
                let mut matches = true;
                for (i, expected) in close.iter().enumerate() {
                    let got = self.peek_at(i).map(|g| g.to_ascii_lowercase());
                    if got != Some(*expected) {
                        matches = false;
                        break;
                    }
                }
                if matches {
                    // Leave the end tag for the normal path.
                    break 'outer;
                }
            }
            text.push(c);
            self.position += 1;
        }

        self.tokens.push(Token::Text(text));
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.position += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &str) -> Vec<Token> {
        let mut scanner = HtmlScanner::new(input);
        scanner.run();
        scanner.into_tokens()
    }

    #[test]
    fn simple_tag_with_attributes() {
        let tokens = scan(r#"<a href="x" class=btn disabled>go</a>"#);
        assert_eq!(
            tokens[0],
            Token::StartTag {
                name: "a".into(),
                self_closing: false,
                attributes: vec![
                    Attribute {
                        name: "href".into(),
                        value: "x".into()
                    },
                    Attribute {
                        name: "class".into(),
                        value: "btn".into()
                    },
                    Attribute {
                        name: "disabled".into(),
                        value: String::new()
                    },
                ],
            }
        );
        assert_eq!(tokens[1], Token::Text("go".into()));
        assert_eq!(tokens[2], Token::EndTag { name: "a".into() });
    }

    #[test]
    fn tag_names_are_lowercased() {
        let tokens = scan("<DIV ID=Main></DIV>");
        let Token::StartTag {
            name, attributes, ..
        } = &tokens[0]
        else {
            panic!("expected start tag, got {:?}", tokens[0]);
        };
        assert_eq!(name, "div");
        assert_eq!(attributes[0].name, "id");
        // Attribute values keep their case.
        assert_eq!(attributes[0].value, "Main");
    }

    #[test]
    fn stray_less_than_is_text() {
        let tokens = scan("1 < 2 <b>x</b>");
        assert_eq!(tokens[0], Token::Text("1 < 2 ".into()));
    }

    #[test]
    fn character_references_in_text() {
        let tokens = scan("a &amp; b &#65;&bogus;");
        assert_eq!(tokens[0], Token::Text("a & b A&bogus;".into()));
    }

    #[test]
    fn raw_text_style_contents_are_opaque() {
        let tokens = scan("<style>p > a { color: red } </style>after");
        assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "style"));
        assert_eq!(tokens[1], Token::Text("p > a { color: red } ".into()));
        assert_eq!(tokens[2], Token::EndTag {
            name: "style".into()
        });
        assert_eq!(tokens[3], Token::Text("after".into()));
    }

    #[test]
    fn comments_and_doctype() {
        let tokens = scan("<!doctype html><!-- note -->x");
        assert_eq!(tokens[0], Token::Doctype);
        assert_eq!(tokens[1], Token::Comment(" note ".into()));
        assert_eq!(tokens[2], Token::Text("x".into()));
    }

    #[test]
    fn unterminated_tag_does_not_loop() {
        let tokens = scan("<div class=");
        assert!(matches!(&tokens[0], Token::StartTag { name, .. } if name == "div"));
        assert_eq!(tokens.last(), Some(&Token::Eof));
    }

    #[test]
    fn self_closing_flag() {
        let tokens = scan("<br/><img src=x />");
        assert!(matches!(
            &tokens[0],
            Token::StartTag {
                self_closing: true,
                ..
            }
        ));
        assert!(matches!(
            &tokens[1],
            Token::StartTag {
                self_closing: true,
                ..
            }
        ));
    }

    #[test]
    fn duplicate_attributes_first_wins() {
        let tokens = scan(r#"<p class="a" class="b">"#);
        let Token::StartTag { attributes, .. } = &tokens[0] else {
            panic!("expected start tag");
        };
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].value, "a");
    }
}
