//! Tolerant HTML scanner and tree builder for the Vellum layout engine.
//!
//! The engine's HTML front end is deliberately forgiving: it never fails,
//! never panics, and produces a best-effort element tree for any byte
//! stream. Unclosed tags are closed implicitly, stray end tags are
//! dropped, and missing `<html>`/`<body>` scaffolding is synthesized so
//! styling and layout always see a well-formed document.
//!
//! This is not a conforming WHATWG parser — the engine does not need the
//! adoption agency or foster parenting to lay out real-world documents.
//! It covers the recovery behavior the rendering pipeline depends on:
//! implied end tags, raw-text elements, character references, and the
//! attribute quoting variants found in the wild.

pub mod entities;
pub mod parser;
pub mod tokenizer;

pub use parser::{TreeBuilder, parse_document};
pub use tokenizer::{Attribute, HtmlScanner, Token};
