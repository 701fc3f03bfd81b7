//! Selector text parsing.
//!
//! [§ 4 Selector syntax](https://www.w3.org/TR/selectors-4/#syntax)
//!
//! The grammar is small enough to parse directly from characters: split
//! on combinators (` `, `>`, `+`, `~`) while preserving `[...]` and
//! `(...)` bodies, peel simple selectors off each compound, and assemble
//! the right-to-left chain. Anything unrepresentable yields `None` and
//! the caller drops the rule.

use super::{
    AttrOp, Combinator, CompoundSelector, Condition, PseudoClass, PseudoElement, Selector,
};

/// Check if a character can start an identifier.
/// [CSS Syntax § 4.2 ident-start code point](https://www.w3.org/TR/css-syntax-3/#ident-start-code-point)
const fn is_ident_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if a character can continue an identifier.
const fn is_ident_char(c: char) -> bool {
    is_ident_start_char(c) || c.is_ascii_digit() || c == '-'
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn consume_ident(&mut self) -> String {
        let mut ident = String::new();
        while self.peek().is_some_and(is_ident_char) {
            ident.push(self.bump().unwrap_or_default());
        }
        ident
    }

    /// Consume a balanced `(...)` body, returning its raw contents.
    fn consume_paren_body(&mut self) -> Option<String> {
        if self.peek() != Some('(') {
            return None;
        }
        self.pos += 1;
        let mut depth = 1_u32;
        let mut body = String::new();
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(body);
                    }
                }
                _ => {}
            }
            body.push(c);
        }
        None // unbalanced
    }
}

/// Parse a full complex selector from text.
pub(super) fn parse_selector(text: &str) -> Option<Selector> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut cursor = Cursor {
        chars: trimmed.chars().collect(),
        pos: 0,
    };

    // Left-to-right: compounds interleaved with combinators.
    let mut compounds: Vec<CompoundSelector> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();

    loop {
        cursor.skip_whitespace();
        if cursor.peek().is_none() {
            break;
        }
        let compound = parse_compound(&mut cursor)?;
        compounds.push(compound);

        // What separates this compound from the next?
        let had_space = cursor.peek().is_some_and(|c| c.is_ascii_whitespace());
        cursor.skip_whitespace();
        match cursor.peek() {
            None => break,
            Some('>') => {
                cursor.pos += 1;
                combinators.push(Combinator::Child);
            }
            Some('+') => {
                cursor.pos += 1;
                combinators.push(Combinator::AdjacentSibling);
            }
            Some('~') => {
                cursor.pos += 1;
                combinators.push(Combinator::GeneralSibling);
            }
            Some(_) if had_space => combinators.push(Combinator::Descendant),
            // Two compounds with no separator at all: parse error.
            Some(_) => return None,
        }
    }

    if compounds.is_empty() || compounds.len() != combinators.len() + 1 {
        return None;
    }

    // [§ 4.3] "The elements represented by a complex selector are the
    // elements matched by the last compound selector." Reverse into the
    // subject + right-to-left chain form the matcher walks.
    let subject = compounds.pop()?;
    let chain = compounds
        .into_iter()
        .zip(combinators)
        .rev()
        .map(|(compound, combinator)| (combinator, compound))
        .collect();

    Some(Selector { subject, chain })
}

/// Parse one compound selector at the cursor.
fn parse_compound(cursor: &mut Cursor) -> Option<CompoundSelector> {
    let mut compound = CompoundSelector::default();
    let mut any = false;

    // Optional leading type selector or universal.
    match cursor.peek() {
        Some('*') => {
            cursor.pos += 1;
            any = true;
        }
        Some(c) if is_ident_start_char(c) || c == '-' => {
            compound.tag = Some(cursor.consume_ident().to_ascii_lowercase());
            any = true;
        }
        _ => {}
    }

    loop {
        match cursor.peek() {
            Some('.') => {
                cursor.pos += 1;
                let name = cursor.consume_ident();
                if name.is_empty() {
                    return None;
                }
                compound.conditions.push(Condition::Class(name));
                any = true;
            }
            Some('#') => {
                cursor.pos += 1;
                let id = cursor.consume_ident();
                if id.is_empty() {
                    return None;
                }
                compound.conditions.push(Condition::Id(id));
                any = true;
            }
            Some('[') => {
                compound.conditions.push(parse_attribute(cursor)?);
                any = true;
            }
            Some(':') => {
                compound.conditions.push(parse_pseudo(cursor)?);
                any = true;
            }
            _ => break,
        }
    }

    if any { Some(compound) } else { None }
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
fn parse_attribute(cursor: &mut Cursor) -> Option<Condition> {
    cursor.pos += 1; // [
    cursor.skip_whitespace();

    let name = cursor.consume_ident().to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }
    cursor.skip_whitespace();

    let op = match cursor.peek() {
        Some(']') => {
            cursor.pos += 1;
            return Some(Condition::Attribute {
                name,
                op: AttrOp::Exists,
                value: String::new(),
            });
        }
        Some('=') => {
            cursor.pos += 1;
            AttrOp::Equals
        }
        Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
            cursor.pos += 1;
            if cursor.bump() != Some('=') {
                return None;
            }
            match c {
                '~' => AttrOp::ContainsWord,
                '|' => AttrOp::DashMatch,
                '^' => AttrOp::StartsWith,
                '$' => AttrOp::EndsWith,
                _ => AttrOp::ContainsStr,
            }
        }
        _ => return None,
    };

    cursor.skip_whitespace();
    let value = match cursor.peek() {
        Some(q @ ('"' | '\'')) => {
            cursor.pos += 1;
            let mut value = String::new();
            loop {
                match cursor.bump() {
                    Some(c) if c == q => break,
                    Some(c) => value.push(c),
                    None => return None, // unterminated string
                }
            }
            value
        }
        _ => {
            let value = cursor.consume_ident();
            if value.is_empty() {
                return None;
            }
            value
        }
    };

    cursor.skip_whitespace();
    if cursor.bump() != Some(']') {
        return None;
    }
    Some(Condition::Attribute {
        name,
        op,
        value,
    })
}

/// [§ 4 Pseudo-classes] and [§ 11 Pseudo-elements].
fn parse_pseudo(cursor: &mut Cursor) -> Option<Condition> {
    cursor.pos += 1; // :
    let double = cursor.peek() == Some(':');
    if double {
        cursor.pos += 1;
    }

    let name = cursor.consume_ident().to_ascii_lowercase();
    if name.is_empty() {
        return None;
    }

    // Legacy single-colon forms of the tree pseudo-elements are accepted.
    if let "before" | "after" = name.as_str() {
        let pe = if name == "before" {
            PseudoElement::Before
        } else {
            PseudoElement::After
        };
        return Some(Condition::PseudoElem(pe));
    }
    if double {
        // Other pseudo-elements are not renderable.
        return None;
    }

    let pseudo = match name.as_str() {
        "hover" => PseudoClass::Hover,
        "active" => PseudoClass::Active,
        "focus" => PseudoClass::Focus,
        "link" => PseudoClass::Link,
        "visited" => PseudoClass::Visited,
        "root" => PseudoClass::Root,
        "first-child" => PseudoClass::FirstChild,
        "last-child" => PseudoClass::LastChild,
        "only-child" => PseudoClass::OnlyChild,
        "first-of-type" => PseudoClass::FirstOfType,
        "last-of-type" => PseudoClass::LastOfType,
        "only-of-type" => PseudoClass::OnlyOfType,
        "nth-child" => {
            let (a, b) = parse_nth(&cursor.consume_paren_body()?)?;
            PseudoClass::NthChild(a, b)
        }
        "nth-last-child" => {
            let (a, b) = parse_nth(&cursor.consume_paren_body()?)?;
            PseudoClass::NthLastChild(a, b)
        }
        "nth-of-type" => {
            let (a, b) = parse_nth(&cursor.consume_paren_body()?)?;
            PseudoClass::NthOfType(a, b)
        }
        "nth-last-of-type" => {
            let (a, b) = parse_nth(&cursor.consume_paren_body()?)?;
            PseudoClass::NthLastOfType(a, b)
        }
        "not" => {
            let body = cursor.consume_paren_body()?;
            let mut inner = Cursor {
                chars: body.trim().chars().collect(),
                pos: 0,
            };
            let compound = parse_compound(&mut inner)?;
            inner.skip_whitespace();
            if inner.peek().is_some() {
                // Complex selectors inside :not() are not supported.
                return None;
            }
            PseudoClass::Not(Box::new(compound))
        }
        "lang" => {
            let body = cursor.consume_paren_body()?;
            let lang = body.trim().to_string();
            if lang.is_empty() {
                return None;
            }
            PseudoClass::Lang(lang)
        }
        _ => return None,
    };

    Some(Condition::Pseudo(pseudo))
}

/// [§ 4.12 The An+B microsyntax](https://www.w3.org/TR/css-syntax-3/#anb-microsyntax)
///
/// `even`, `odd`, `<int>`, `n`, `An`, `An+B`, `-n+B`, with optional signs
/// and whitespace.
fn parse_nth(text: &str) -> Option<(i32, i32)> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match cleaned.as_str() {
        "even" => return Some((2, 0)),
        "odd" => return Some((2, 1)),
        _ => {}
    }

    if let Some(n_pos) = cleaned.find('n') {
        // A part before the 'n'.
        let a_text = &cleaned[..n_pos];
        let a = match a_text {
            "" | "+" => 1,
            "-" => -1,
            _ => a_text.parse().ok()?,
        };
        // B part after the 'n'.
        let b_text = &cleaned[n_pos + 1..];
        let b = if b_text.is_empty() {
            0
        } else {
            let (sign, digits) = b_text.split_at(1);
            let magnitude: i32 = digits.parse().ok()?;
            match sign {
                "+" => magnitude,
                "-" => -magnitude,
                _ => return None,
            }
        };
        Some((a, b))
    } else {
        // A plain integer: 0n+B.
        cleaned.parse().ok().map(|b| (0, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_class_id_compound() {
        let sel = parse_selector("div.note#main").expect("parse");
        assert_eq!(sel.subject.tag.as_deref(), Some("div"));
        assert_eq!(sel.subject.conditions.len(), 2);
        assert!(sel.chain.is_empty());
    }

    #[test]
    fn chain_is_right_to_left() {
        let sel = parse_selector("ul > li a").expect("parse");
        assert_eq!(sel.subject.tag.as_deref(), Some("a"));
        assert_eq!(sel.chain.len(), 2);
        assert_eq!(sel.chain[0].0, Combinator::Descendant);
        assert_eq!(sel.chain[0].1.tag.as_deref(), Some("li"));
        assert_eq!(sel.chain[1].0, Combinator::Child);
        assert_eq!(sel.chain[1].1.tag.as_deref(), Some("ul"));
    }

    #[test]
    fn sibling_combinators() {
        let sel = parse_selector("h1 + p").expect("parse");
        assert_eq!(sel.chain[0].0, Combinator::AdjacentSibling);
        let sel = parse_selector("h1 ~ p").expect("parse");
        assert_eq!(sel.chain[0].0, Combinator::GeneralSibling);
    }

    #[test]
    fn attribute_operators() {
        let cases = [
            ("[href]", AttrOp::Exists),
            ("[type=text]", AttrOp::Equals),
            ("[class~=a]", AttrOp::ContainsWord),
            ("[lang|=en]", AttrOp::DashMatch),
            ("[href^=http]", AttrOp::StartsWith),
            ("[src$='.png']", AttrOp::EndsWith),
            ("[title*=\"x y\"]", AttrOp::ContainsStr),
        ];
        for (text, op) in cases {
            let sel = parse_selector(text).unwrap_or_else(|| panic!("parse {text}"));
            assert!(
                matches!(&sel.subject.conditions[0], Condition::Attribute { op: o, .. } if *o == op),
                "wrong op for {text}"
            );
        }
    }

    #[test]
    fn nth_forms() {
        assert_eq!(parse_nth("even"), Some((2, 0)));
        assert_eq!(parse_nth("odd"), Some((2, 1)));
        assert_eq!(parse_nth("3"), Some((0, 3)));
        assert_eq!(parse_nth("n"), Some((1, 0)));
        assert_eq!(parse_nth("2n"), Some((2, 0)));
        assert_eq!(parse_nth("2n+1"), Some((2, 1)));
        assert_eq!(parse_nth("-n+3"), Some((-1, 3)));
        assert_eq!(parse_nth(" 2n + 1 "), Some((2, 1)));
        assert_eq!(parse_nth("garbage"), None);
    }

    #[test]
    fn pseudo_elements_single_or_double_colon() {
        for text in ["p::before", "p:before"] {
            let sel = parse_selector(text).expect("parse");
            assert!(matches!(
                sel.subject.conditions[0],
                Condition::PseudoElem(PseudoElement::Before)
            ));
        }
    }

    #[test]
    fn not_takes_a_compound() {
        let sel = parse_selector("li:not(.active)").expect("parse");
        let Condition::Pseudo(PseudoClass::Not(inner)) = &sel.subject.conditions[0] else {
            panic!("expected :not");
        };
        assert_eq!(inner.conditions, vec![Condition::Class("active".into())]);
        // Complex selectors inside :not are rejected.
        assert!(parse_selector("li:not(ul li)").is_none());
    }

    #[test]
    fn unknown_pseudo_class_rejects_selector() {
        assert!(parse_selector("a:focus-within").is_none());
    }

    #[test]
    fn lang_argument() {
        let sel = parse_selector(":lang(en)").expect("parse");
        assert!(matches!(
            &sel.subject.conditions[0],
            Condition::Pseudo(PseudoClass::Lang(l)) if l == "en"
        ));
    }
}
