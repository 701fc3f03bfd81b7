//! The master stylesheet.
//!
//! [WHATWG HTML § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
//!
//! "User agents are expected to have a default style sheet that presents
//! elements of HTML documents in ways consistent with general user
//! expectations."
//!
//! Ingested at source index 0, so any user or author rule of equal
//! specificity overrides it.

/// Default CSS rules for HTML elements — the subset the engine renders.
pub const MASTER_CSS: &str = r#"
/* [§ 15.3.1 Hidden elements] */
area, base, basefont, datalist, head, link, meta, noembed,
noframes, param, rp, script, style, template, title {
    display: none;
}

/* [§ 15.3.3 Flow content] */
address, article, aside, blockquote, body, center, dd, details,
dialog, dir, div, dl, dt, fieldset, figcaption, figure, footer,
form, h1, h2, h3, h4, h5, h6, header, hgroup, hr, html, legend,
listing, main, menu, nav, ol, p, plaintext, pre, search,
section, summary, ul, xmp {
    display: block;
}

/* [§ 15.3.4 The page] */
body {
    margin: 8px;
}

/* [§ 15.3.6 Sections and headings] */
h1 { display: block; font-size: 2em; font-weight: bold; margin: 0.67em 0; }
h2 { font-size: 1.5em; font-weight: bold; margin: 0.83em 0; }
h3 { font-size: 1.17em; font-weight: bold; margin: 1em 0; }
h4 { font-weight: bold; margin: 1.33em 0; }
h5 { font-size: 0.83em; font-weight: bold; margin: 1.67em 0; }
h6 { font-size: 0.67em; font-weight: bold; margin: 2.33em 0; }

/* [§ 15.3.5 Grouping content] */
p, blockquote, figure, listing, plaintext, pre, xmp {
    margin-top: 1em;
    margin-bottom: 1em;
}
blockquote, figure { margin-left: 40px; margin-right: 40px; }
pre, listing, plaintext, xmp { white-space: pre; }
hr { border: 1px inset; margin: 0.5em auto; }

/* [§ 15.3.7 Lists] */
li { display: list-item; }
ol, ul, menu {
    margin-top: 1em;
    margin-bottom: 1em;
    padding-left: 40px;
}
ul, menu { list-style-type: disc; }
ol { list-style-type: decimal; }
ul ul, ol ul { list-style-type: circle; }

/* [§ 15.3.8 Text-level semantics] */
b, strong { font-weight: bold; }
em, i, cite, dfn, var, address { font-style: italic; }
code, kbd, samp, tt, pre, listing, plaintext, xmp { font-family: monospace; }
u, ins { text-decoration: underline; }
s, strike, del { text-decoration: line-through; }
small { font-size: smaller; }
big { font-size: larger; }
sub { vertical-align: sub; font-size: smaller; }
sup { vertical-align: super; font-size: smaller; }

/* [§ 15.3.9 Links] */
a {
    color: #00f;
    text-decoration: underline;
    cursor: pointer;
}

/* [§ 15.3.10 Tables] */
table {
    display: table;
    border-spacing: 2px;
    border-collapse: separate;
}
caption { display: table-caption; text-align: center; }
tr { display: table-row; }
thead { display: table-header-group; }
tbody { display: table-row-group; }
tfoot { display: table-footer-group; }
col { display: table-column; }
colgroup { display: table-column-group; }
td, th { display: table-cell; padding: 1px; }
th { font-weight: bold; text-align: center; }

/* [§ 15.5.12-15 Form controls] */
input, button, textarea, select {
    display: inline-block;
    border: 2px inset;
    padding: 1px 2px;
}
button { padding: 1px 6px; }
"#;
