//! Black-box tokenizer tests: stream shapes and the source round-trip.

use vellum_css::tokenizer::{CssToken, CssTokenizer};

fn tokenize(input: &str) -> Vec<CssToken> {
    let mut tokenizer = CssTokenizer::new(input);
    tokenizer.run();
    tokenizer.into_tokens()
}

#[test]
fn stream_always_ends_with_eof() {
    assert_eq!(tokenize("").last(), Some(&CssToken::Eof));
    assert_eq!(tokenize("p { color: red }").last(), Some(&CssToken::Eof));
    assert_eq!(tokenize("\"unterminated").last(), Some(&CssToken::Eof));
}

#[test]
fn declaration_shape() {
    let tokens = tokenize("color:#abc;");
    assert_eq!(tokens[0], CssToken::Ident("color".into()));
    assert_eq!(tokens[1], CssToken::Colon);
    assert!(matches!(&tokens[2], CssToken::Hash { value, .. } if value == "abc"));
    assert_eq!(tokens[3], CssToken::Semicolon);
}

#[test]
fn dimension_units_survive_verbatim() {
    for unit in ["px", "em", "vmin", "dpcm", "Q"] {
        let tokens = tokenize(&format!("1{unit}"));
        assert!(
            matches!(&tokens[0], CssToken::Dimension { unit: u, .. } if u == unit),
            "unit {unit} mangled: {:?}",
            tokens[0]
        );
    }
}

#[test]
fn malformed_input_never_panics() {
    // A grab bag of broken constructs; the only requirement is a token
    // stream ending in EOF.
    for input in [
        "url(",
        "url(a b",
        "\"\n\"",
        "@",
        "#",
        "\\",
        "/*",
        "calc(1+",
        "-",
        "+.",
        "12e",
        "'\\",
    ] {
        let tokens = tokenize(input);
        assert_eq!(tokens.last(), Some(&CssToken::Eof), "input {input:?}");
    }
}

#[test]
fn round_trip_reproduces_token_stream() {
    // Tokenize → to_css → tokenize again must yield an equal stream (the
    // textual forms may differ only in whitespace).
    let inputs = [
        "p.note > a[href] { margin: 10px 50%; color: #ff0000 }",
        "@media screen and (min-width: 40em) { h1 { font-size: 2em } }",
        "div { background: linear-gradient(45deg, red 0%, blue 100%) }",
        "x { width: calc(100% - 2px); content: \"a b\" }",
    ];
    for input in inputs {
        let first = tokenize(input);
        let rendered: String = first.iter().map(CssToken::to_css).collect();
        let second = tokenize(&rendered);
        assert_eq!(first, second, "round trip diverged for {input:?}");
    }
}

#[test]
fn escapes_resolve_to_code_points() {
    let tokens = tokenize("\\41\\42 c");
    assert_eq!(tokens[0], CssToken::Ident("ABc".into()));
    // Out-of-range escape becomes U+FFFD.
    let tokens = tokenize("\\110000 x");
    assert_eq!(tokens[0], CssToken::Ident("\u{fffd}x".into()));
}
