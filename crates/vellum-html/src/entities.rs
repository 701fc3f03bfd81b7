//! Character reference decoding.
//!
//! [HTML § 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! Covers the named references that appear in ordinary documents plus the
//! numeric forms. Unknown references are passed through verbatim, which is
//! what tolerant consumption requires — a bare `&` in prose must survive.

/// Named character references the scanner resolves.
///
/// [HTML § 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html)
///
/// The full table has over two thousand entries; this subset covers the
/// references that occur in practice in content the engine renders.
const NAMED: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", "\u{a0}"),
    ("copy", "\u{a9}"),
    ("reg", "\u{ae}"),
    ("trade", "\u{2122}"),
    ("deg", "\u{b0}"),
    ("plusmn", "\u{b1}"),
    ("frac12", "\u{bd}"),
    ("frac14", "\u{bc}"),
    ("times", "\u{d7}"),
    ("divide", "\u{f7}"),
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("hellip", "\u{2026}"),
    ("bull", "\u{2022}"),
    ("middot", "\u{b7}"),
    ("sect", "\u{a7}"),
    ("para", "\u{b6}"),
    ("laquo", "\u{ab}"),
    ("raquo", "\u{bb}"),
    ("iexcl", "\u{a1}"),
    ("iquest", "\u{bf}"),
    ("cent", "\u{a2}"),
    ("pound", "\u{a3}"),
    ("yen", "\u{a5}"),
    ("euro", "\u{20ac}"),
    ("dagger", "\u{2020}"),
    ("Dagger", "\u{2021}"),
    ("permil", "\u{2030}"),
    ("prime", "\u{2032}"),
    ("Prime", "\u{2033}"),
    ("larr", "\u{2190}"),
    ("uarr", "\u{2191}"),
    ("rarr", "\u{2192}"),
    ("darr", "\u{2193}"),
    ("harr", "\u{2194}"),
    ("minus", "\u{2212}"),
    ("shy", "\u{ad}"),
];

/// Decode one character reference starting just after the `&`.
///
/// `input` is the remainder of the text after the ampersand. Returns the
/// decoded string plus the number of input characters consumed (not
/// counting the `&`), or `None` if no reference starts here.
#[must_use]
pub fn decode_reference(input: &[char]) -> Option<(String, usize)> {
    match input.first()? {
        // [§ 13.2.5.73 Numeric character reference state]
        '#' => decode_numeric(input),
        _ => decode_named(input),
    }
}

/// `&#123;` / `&#x1F;` forms. The terminating `;` is required.
fn decode_numeric(input: &[char]) -> Option<(String, usize)> {
    let hex = matches!(input.get(1), Some('x' | 'X'));
    let digits_start = if hex { 2 } else { 1 };

    let mut end = digits_start;
    while end < input.len() && input[end].is_ascii_hexdigit() {
        // Decimal references stop at the first non-decimal digit.
        if !hex && !input[end].is_ascii_digit() {
            break;
        }
        end += 1;
    }
    if end == digits_start || input.get(end) != Some(&';') {
        return None;
    }

    let digits: String = input[digits_start..end].iter().collect();
    let radix = if hex { 16 } else { 10 };
    let code_point = u32::from_str_radix(&digits, radix).ok()?;

    // [§ 13.2.5.80] Null, surrogates, and out-of-range code points are
    // replaced with U+FFFD.
    let decoded = char::from_u32(code_point)
        .filter(|c| *c != '\0')
        .unwrap_or('\u{fffd}');
    Some((decoded.to_string(), end + 1))
}

/// Named references. The terminating `;` is required; legacy `&amp`-style
/// bare references are left untouched.
fn decode_named(input: &[char]) -> Option<(String, usize)> {
    let mut end = 0;
    while end < input.len() && input[end].is_ascii_alphanumeric() {
        end += 1;
    }
    if end == 0 || input.get(end) != Some(&';') {
        return None;
    }

    let name: String = input[..end].iter().collect();
    NAMED
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, replacement)| ((*replacement).to_string(), end + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(s: &str) -> Option<(String, usize)> {
        let chars: Vec<char> = s.chars().collect();
        decode_reference(&chars)
    }

    #[test]
    fn named_references() {
        assert_eq!(decode("amp;x"), Some(("&".to_string(), 4)));
        assert_eq!(decode("nbsp;"), Some(("\u{a0}".to_string(), 5)));
        assert_eq!(decode("mdash;"), Some(("\u{2014}".to_string(), 6)));
    }

    #[test]
    fn unknown_named_reference_is_left_alone() {
        assert_eq!(decode("bogus;"), None);
        assert_eq!(decode("amp x"), None); // no terminating semicolon
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode("#65;"), Some(("A".to_string(), 4)));
        assert_eq!(decode("#x41;"), Some(("A".to_string(), 5)));
        assert_eq!(decode("#xfffd;"), Some(("\u{fffd}".to_string(), 7)));
    }

    #[test]
    fn bad_numeric_forms() {
        assert_eq!(decode("#;"), None);
        assert_eq!(decode("#x;"), None);
        assert_eq!(decode("#65"), None);
        // Out-of-range code point becomes U+FFFD.
        assert_eq!(decode("#x110000;"), Some(("\u{fffd}".to_string(), 9)));
    }
}
