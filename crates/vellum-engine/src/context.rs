//! Shared engine context.
//!
//! Two pieces of state outlive any single document: the master
//! stylesheet text (the engine's browser defaults) and the string
//! interner backing tag-name identity. Both were once process globals
//! in engines of this shape; making them an explicit value keeps two
//! embedders in one process fully isolated.

use std::sync::Arc;

use vellum_common::StringInterner;

use crate::master_css::MASTER_CSS;

/// Process-level engine state, shared into every document created from
/// it.
#[derive(Clone)]
pub struct Context {
    master_css: Arc<str>,
    interner: Arc<StringInterner>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// A context with the built-in master stylesheet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            master_css: Arc::from(MASTER_CSS),
            interner: Arc::new(StringInterner::new()),
        }
    }

    /// Replace the master stylesheet (the text is ingested at source
    /// index 0 of every subsequently created document, so author rules
    /// always win ties).
    #[must_use]
    pub fn with_master_stylesheet(css: &str) -> Self {
        Self {
            master_css: Arc::from(css),
            interner: Arc::new(StringInterner::new()),
        }
    }

    /// The master stylesheet text.
    #[must_use]
    pub fn master_css(&self) -> &str {
        &self.master_css
    }

    /// The shared tag-name interner.
    #[must_use]
    pub fn interner(&self) -> &Arc<StringInterner> {
        &self.interner
    }
}
