//! The rule and component-value parser.
//!
//! [§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing)
//!
//! "The input to the parsing stage is a stream or list of tokens from the
//! tokenization stage. The output depends on how the parser is invoked."

use vellum_common::warn_once;

use crate::media::MediaQueryList;
use crate::selector::Selector;
use crate::tokenizer::CssToken;

use super::stylesheet::{Declaration, ImportDirective, StyleRule, Stylesheet};

/// [§ 5.3.9 Parse a component value](https://www.w3.org/TR/css-syntax-3/#parse-component-value)
///
/// "A component value is one of the preserved tokens, a function, or a
/// simple block."
///
/// Component values are the recursive token form declarations and at-rule
/// preludes are expressed in: `{}`/`[]`/`()` bodies and function arguments
/// carry their contents as nested component values.
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValue {
    /// A preserved token — anything that is not a block or function opener.
    Token(CssToken),
    /// [§ 5.3.10 Consume a function](https://www.w3.org/TR/css-syntax-3/#consume-function)
    Function {
        /// The function name (without the parenthesis).
        name: String,
        /// The tokens between the parentheses.
        args: Vec<ComponentValue>,
    },
    /// [§ 5.3.8 Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    ///
    /// "A simple block has an associated token (either a <\[-token>,
    /// a <(-token>, or a <{-token>) and a value consisting of a list of
    /// component values."
    Block {
        /// The opening token of the block.
        opener: CssToken,
        /// The block's contents.
        body: Vec<ComponentValue>,
    },
}

impl ComponentValue {
    /// True for a whitespace token.
    #[must_use]
    pub const fn is_whitespace(&self) -> bool {
        matches!(self, Self::Token(CssToken::Whitespace))
    }

    /// The ident string if this is an ident token.
    #[must_use]
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Self::Token(CssToken::Ident(value)) => Some(value),
            _ => None,
        }
    }

    /// The numeric value if this is a number token.
    #[must_use]
    pub const fn as_number(&self) -> Option<f32> {
        match self {
            Self::Token(CssToken::Number { value, .. }) => Some(*value),
            _ => None,
        }
    }

    /// Render back to CSS source form (whitespace-normalized).
    #[must_use]
    pub fn to_css(&self) -> String {
        match self {
            Self::Token(token) => token.to_css(),
            Self::Function { name, args } => {
                let inner: String = args.iter().map(Self::to_css).collect();
                format!("{name}({inner})")
            }
            Self::Block { opener, body } => {
                let inner: String = body.iter().map(Self::to_css).collect();
                let (open, close) = match opener {
                    CssToken::LeftBracket => ('[', ']'),
                    CssToken::LeftParen => ('(', ')'),
                    _ => ('{', '}'),
                };
                format!("{open}{inner}{close}")
            }
        }
    }
}

/// Parses a token stream into rules and component values.
pub struct CssParser {
    tokens: Vec<CssToken>,
    position: usize,
}

impl CssParser {
    /// Create a parser over a token stream (as produced by the tokenizer,
    /// with or without the trailing EOF token).
    #[must_use]
    pub fn new(tokens: Vec<CssToken>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// [§ 5.3.3 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
    ///
    /// Appends the parsed rules into `sheet`, tagging each with `media`
    /// (an index into the sheet's media-query lists) and consecutive
    /// source indices. Import directives are collected for the caller to
    /// resolve; the parser itself never performs I/O.
    pub fn parse_into(&mut self, sheet: &mut Stylesheet, media: Option<usize>) {
        loop {
            match self.peek() {
                None | Some(CssToken::Eof) => break,
                // "<whitespace-token>: Do nothing."
                Some(CssToken::Whitespace) => self.position += 1,
                // "<CDO-token> / <CDC-token>: Do nothing." (top level only)
                Some(CssToken::CDO | CssToken::CDC) => self.position += 1,
                Some(CssToken::AtKeyword(_)) => self.consume_at_rule(sheet, media),
                _ => self.consume_qualified_rule(sheet, media),
            }
        }
    }

    /// [§ 5.3.1 Parse something according to a CSS grammar] — the whole
    /// input as one stylesheet.
    #[must_use]
    pub fn parse_stylesheet(&mut self) -> Stylesheet {
        let mut sheet = Stylesheet::new();
        self.parse_into(&mut sheet, None);
        sheet
    }

    /// [§ 5.4.2 Consume an at-rule](https://www.w3.org/TR/css-syntax-3/#consume-at-rule)
    ///
    /// `@media` and `@import` are understood; any other at-rule is
    /// consumed and dropped with a warning.
    fn consume_at_rule(&mut self, sheet: &mut Stylesheet, media: Option<usize>) {
        let Some(CssToken::AtKeyword(name)) = self.next() else {
            return;
        };
        let name = name.to_ascii_lowercase();

        // "Repeatedly consume the next input token: ... anything else:
        // consume a component value and append it to the prelude."
        let mut prelude = Vec::new();
        loop {
            match self.peek() {
                None | Some(CssToken::Eof) => {
                    self.handle_at_rule(sheet, &name, &prelude, None, media);
                    return;
                }
                Some(CssToken::Semicolon) => {
                    self.position += 1;
                    self.handle_at_rule(sheet, &name, &prelude, None, media);
                    return;
                }
                Some(CssToken::LeftBrace) => {
                    self.position += 1;
                    let body = self.consume_block_contents(CssToken::RightBrace);
                    self.handle_at_rule(sheet, &name, &prelude, Some(body), media);
                    return;
                }
                _ => {
                    if let Some(value) = self.consume_component_value() {
                        prelude.push(value);
                    }
                }
            }
        }
    }

    fn handle_at_rule(
        &mut self,
        sheet: &mut Stylesheet,
        name: &str,
        prelude: &[ComponentValue],
        body: Option<Vec<ComponentValue>>,
        media: Option<usize>,
    ) {
        match name {
            "media" => {
                let Some(body) = body else {
                    warn_once("CSS", "@media without a block");
                    return;
                };
                // Nested @media is not combined; the inner list wins.
                // The prelude is the media query list.
                let list = MediaQueryList::parse(prelude);
                let media_index = sheet.add_media_list(list);
                // Re-parse the block body as a rule list under this media
                // scope.
                let mut inner = Self::from_component_values(body);
                inner.parse_into(sheet, Some(media_index));
            }
            "import" => {
                // [CSS Cascading § 4 @import]: `@import <url> <media-query-list>?`
                let mut iter = prelude.iter().filter(|v| !v.is_whitespace());
                let url = match iter.next() {
                    Some(ComponentValue::Token(CssToken::Url(url) | CssToken::String(url))) => {
                        url.clone()
                    }
                    Some(ComponentValue::Function { name, args }) if name == "url" => args
                        .iter()
                        .find_map(|arg| match arg {
                            ComponentValue::Token(CssToken::String(s)) => Some(s.clone()),
                            _ => None,
                        })
                        .unwrap_or_default(),
                    _ => {
                        warn_once("CSS", "@import without a url");
                        return;
                    }
                };
                let rest: Vec<ComponentValue> = iter.cloned().collect();
                let media_index = if rest.is_empty() {
                    media
                } else {
                    Some(sheet.add_media_list(MediaQueryList::parse(&rest)))
                };
                sheet.add_import(ImportDirective {
                    url,
                    media: media_index,
                });
            }
            other => {
                warn_once("CSS", &format!("unsupported at-rule @{other}"));
            }
        }
    }

    /// [§ 5.4.3 Consume a qualified rule](https://www.w3.org/TR/css-syntax-3/#consume-qualified-rule)
    ///
    /// The prelude is selector text; the block is a declaration list. A
    /// rule whose selectors all fail to parse is dropped whole.
    fn consume_qualified_rule(&mut self, sheet: &mut Stylesheet, media: Option<usize>) {
        let mut prelude = Vec::new();
        loop {
            match self.peek() {
                None | Some(CssToken::Eof) => return, // EOF in prelude: parse error, drop
                Some(CssToken::LeftBrace) => {
                    self.position += 1;
                    break;
                }
                _ => {
                    if let Some(value) = self.consume_component_value() {
                        prelude.push(value);
                    }
                }
            }
        }

        let body = self.consume_block_contents(CssToken::RightBrace);
        let declarations = parse_declaration_list(&body);

        // One entry per comma-separated selector; each carries its own
        // specificity but shares the declaration block and source index.
        let selector_text: String = prelude.iter().map(ComponentValue::to_css).collect();
        let source_index = sheet.next_source_index();
        let mut any = false;
        for part in split_selector_list(&selector_text) {
            match Selector::parse(&part) {
                Some(selector) => {
                    any = true;
                    let specificity = selector.specificity();
                    sheet.push_rule(StyleRule {
                        selector,
                        declarations: declarations.clone(),
                        specificity,
                        source_index,
                        media,
                    });
                }
                None => {
                    warn_once("CSS", &format!("failed to parse selector '{}'", part.trim()));
                }
            }
        }
        if !any && !declarations.is_empty() {
            warn_once(
                "CSS",
                &format!("rule dropped, no valid selector in '{selector_text}'"),
            );
        }
    }

    /// [§ 5.4.7 Consume a component value](https://www.w3.org/TR/css-syntax-3/#consume-component-value)
    pub fn consume_component_value(&mut self) -> Option<ComponentValue> {
        let token = self.next()?;
        Some(match token {
            CssToken::LeftBrace => ComponentValue::Block {
                opener: CssToken::LeftBrace,
                body: self.consume_block_contents(CssToken::RightBrace),
            },
            CssToken::LeftBracket => ComponentValue::Block {
                opener: CssToken::LeftBracket,
                body: self.consume_block_contents(CssToken::RightBracket),
            },
            CssToken::LeftParen => ComponentValue::Block {
                opener: CssToken::LeftParen,
                body: self.consume_block_contents(CssToken::RightParen),
            },
            CssToken::Function(name) => ComponentValue::Function {
                name,
                args: self.consume_block_contents(CssToken::RightParen),
            },
            other => ComponentValue::Token(other),
        })
    }

    /// [§ 5.4.8 Consume a simple block](https://www.w3.org/TR/css-syntax-3/#consume-simple-block)
    ///
    /// Consumes component values until the matching close token. EOF ends
    /// the block — "this is a parse error", but the contents survive.
    fn consume_block_contents(&mut self, close: CssToken) -> Vec<ComponentValue> {
        let mut body = Vec::new();
        loop {
            match self.peek() {
                None | Some(CssToken::Eof) => return body,
                Some(token) if *token == close => {
                    self.position += 1;
                    return body;
                }
                _ => {
                    if let Some(value) = self.consume_component_value() {
                        body.push(value);
                    }
                }
            }
        }
    }

    /// Build a parser over already-consumed component values, re-flattening
    /// them into tokens. Used for nested rule lists (`@media` bodies).
    fn from_component_values(values: Vec<ComponentValue>) -> Self {
        let mut tokens = Vec::new();
        flatten_into(&values, &mut tokens);
        Self::new(tokens)
    }

    fn peek(&self) -> Option<&CssToken> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<CssToken> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }
}

/// Flatten component values back into a token stream.
fn flatten_into(values: &[ComponentValue], tokens: &mut Vec<CssToken>) {
    for value in values {
        match value {
            ComponentValue::Token(token) => tokens.push(token.clone()),
            ComponentValue::Function { name, args } => {
                tokens.push(CssToken::Function(name.clone()));
                flatten_into(args, tokens);
                tokens.push(CssToken::RightParen);
            }
            ComponentValue::Block { opener, body } => {
                let close = match opener {
                    CssToken::LeftBracket => CssToken::RightBracket,
                    CssToken::LeftParen => CssToken::RightParen,
                    _ => CssToken::RightBrace,
                };
                tokens.push(opener.clone());
                flatten_into(body, tokens);
                tokens.push(close);
            }
        }
    }
}

/// [§ 5.4.5 Consume a list of declarations](https://www.w3.org/TR/css-syntax-3/#consume-list-of-declarations)
///
/// Parses `name: value [!important] ;` sequences out of a rule block's
/// component values. Malformed declarations are skipped to the next
/// semicolon.
#[must_use]
pub fn parse_declaration_list(body: &[ComponentValue]) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut position = 0;

    while position < body.len() {
        // Skip whitespace and stray semicolons between declarations.
        match &body[position] {
            value if value.is_whitespace() => {
                position += 1;
                continue;
            }
            ComponentValue::Token(CssToken::Semicolon) => {
                position += 1;
                continue;
            }
            _ => {}
        }

        // "If the current input token is an <ident-token>, ... consume
        // a declaration."
        let Some(name) = body[position].as_ident().map(str::to_ascii_lowercase) else {
            warn_once("CSS", "skipped malformed declaration");
            position = skip_to_semicolon(body, position);
            continue;
        };
        position += 1;

        // Whitespace, then the colon.
        while body.get(position).is_some_and(ComponentValue::is_whitespace) {
            position += 1;
        }
        if !matches!(
            body.get(position),
            Some(ComponentValue::Token(CssToken::Colon))
        ) {
            warn_once("CSS", &format!("missing ':' after '{name}'"));
            position = skip_to_semicolon(body, position);
            continue;
        }
        position += 1;

        // The value runs to the next semicolon.
        let mut value = Vec::new();
        while position < body.len() {
            if matches!(
                body[position],
                ComponentValue::Token(CssToken::Semicolon)
            ) {
                break;
            }
            value.push(body[position].clone());
            position += 1;
        }

        // Trim surrounding whitespace, then peel a trailing "!important".
        while value.first().is_some_and(ComponentValue::is_whitespace) {
            let _ = value.remove(0);
        }
        while value.last().is_some_and(ComponentValue::is_whitespace) {
            let _ = value.pop();
        }
        let important = strip_important(&mut value);

        if value.is_empty() {
            warn_once("CSS", &format!("empty value for '{name}'"));
        } else {
            declarations.push(Declaration {
                name,
                value,
                important,
            });
        }
    }

    declarations
}

/// [§ 5.4.6] "If the last two non-<whitespace-token>s in the declaration's
/// value are a <delim-token> with the value "!" followed by an
/// <ident-token> with a value that is an ASCII case-insensitive match for
/// "important", remove them from the declaration's value and set the
/// declaration's important flag."
fn strip_important(value: &mut Vec<ComponentValue>) -> bool {
    let significant: Vec<usize> = value
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_whitespace())
        .map(|(i, _)| i)
        .collect();
    let len = significant.len();
    if len < 2 {
        return false;
    }
    let bang = significant[len - 2];
    let ident = significant[len - 1];
    let is_important = matches!(value[bang], ComponentValue::Token(CssToken::Delim('!')))
        && value[ident]
            .as_ident()
            .is_some_and(|s| s.eq_ignore_ascii_case("important"));
    if is_important {
        value.truncate(bang);
        while value.last().is_some_and(ComponentValue::is_whitespace) {
            let _ = value.pop();
        }
    }
    is_important
}

fn skip_to_semicolon(body: &[ComponentValue], mut position: usize) -> usize {
    while position < body.len() {
        if matches!(body[position], ComponentValue::Token(CssToken::Semicolon)) {
            return position + 1;
        }
        position += 1;
    }
    position
}

/// Split a selector list on top-level commas. Commas inside `[]` or `()`
/// never split — `:not(a, b)` and `[title="a,b"]` stay whole.
fn split_selector_list(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0_i32;
    let mut current = String::new();
    let mut in_string: Option<char> = None;

    for c in text.chars() {
        if let Some(quote) = in_string {
            current.push(c);
            if c == quote {
                in_string = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                in_string = Some(c);
                current.push(c);
            }
            '[' | '(' => {
                depth += 1;
                current.push(c);
            }
            ']' | ')' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current);
    }
    parts.retain(|p| !p.trim().is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::CssTokenizer;

    fn parse(css: &str) -> Stylesheet {
        let mut tokenizer = CssTokenizer::new(css);
        tokenizer.run();
        CssParser::new(tokenizer.into_tokens()).parse_stylesheet()
    }

    #[test]
    fn simple_rule() {
        let sheet = parse("p { color: red; margin: 0 }");
        assert_eq!(sheet.rules.len(), 1);
        let rule = &sheet.rules[0];
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[0].name, "color");
        assert!(!rule.declarations[0].important);
    }

    #[test]
    fn selector_list_fans_out() {
        let sheet = parse("h1, h2, .x { font-weight: bold }");
        assert_eq!(sheet.rules.len(), 3);
        // All three share the source index; specificity differs.
        assert_eq!(sheet.rules[0].source_index, sheet.rules[2].source_index);
        assert!(sheet.rules[2].specificity > sheet.rules[0].specificity);
    }

    #[test]
    fn important_flag() {
        let sheet = parse("p { color: red !important; width: 10px }");
        assert!(sheet.rules[0].declarations[0].important);
        assert!(!sheet.rules[0].declarations[1].important);
        // The "!important" tail is stripped from the value.
        assert_eq!(sheet.rules[0].declarations[0].value.len(), 1);
    }

    #[test]
    fn malformed_declaration_skipped() {
        let sheet = parse("p { 4px; color: blue }");
        assert_eq!(sheet.rules[0].declarations.len(), 1);
        assert_eq!(sheet.rules[0].declarations[0].name, "color");
    }

    #[test]
    fn media_rule_scopes_contents() {
        let sheet = parse("@media screen { p { color: red } } div { color: blue }");
        assert_eq!(sheet.rules.len(), 2);
        assert!(sheet.rules[0].media.is_some());
        assert!(sheet.rules[1].media.is_none());
    }

    #[test]
    fn import_directive_collected() {
        let sheet = parse("@import url(base.css); @import \"print.css\" print;");
        assert_eq!(sheet.imports.len(), 2);
        assert_eq!(sheet.imports[0].url, "base.css");
        assert!(sheet.imports[0].media.is_none());
        assert_eq!(sheet.imports[1].url, "print.css");
        assert!(sheet.imports[1].media.is_some());
    }

    #[test]
    fn unknown_at_rule_dropped() {
        let sheet = parse("@font-face { src: url(x) } p { color: red }");
        assert_eq!(sheet.rules.len(), 1);
    }

    #[test]
    fn unterminated_block_survives() {
        let sheet = parse("p { color: red");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(sheet.rules[0].declarations.len(), 1);
    }

    #[test]
    fn component_value_functions_nest() {
        let sheet = parse("p { background: linear-gradient(to right, red, blue) }");
        let value = &sheet.rules[0].declarations[0].value;
        assert!(matches!(
            &value[0],
            ComponentValue::Function { name, args } if name == "linear-gradient" && !args.is_empty()
        ));
    }

    #[test]
    fn selector_commas_inside_parens_do_not_split() {
        let parts = split_selector_list("a:not(.x, .y), b");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].trim(), "a:not(.x, .y)");
    }
}
