//! Shared utilities for the Vellum layout engine.
//!
//! This crate carries the two pieces of infrastructure every other crate
//! leans on: the deduplicated warning hook used to report malformed or
//! unsupported input without failing, and the append-only string interner
//! that backs tag-name identity across the element tree and the selector
//! matcher.

pub mod interner;
pub mod warning;

pub use interner::{StringId, StringInterner};
pub use warning::{clear_warnings, warn_once};
