//! The Vellum document pipeline.
//!
//! This crate is the embedder-facing surface of the engine:
//!
//! - [`Container`] — the callback trait the host implements: fonts,
//!   drawing primitives, resource access, navigation, and environment
//!   queries. The engine performs no I/O and rasterizes nothing.
//! - [`Context`] — process-level state shared between documents: the
//!   master stylesheet and the tag-name interner.
//! - [`Document`] — a parsed, styled, laid-out page: render it at a
//!   width, draw it through the container, feed it mouse events.
//!
//! ```no_run
//! # use vellum_engine::{Context, Document, RenderType};
//! # fn host_container() -> Box<dyn vellum_engine::Container> { unimplemented!() }
//! let context = Context::new();
//! let mut document = Document::create_from_string(
//!     "<p>Hello</p>",
//!     host_container(),
//!     &context,
//!     None,
//! ).expect("container is sane");
//! let width = document.render(800, RenderType::All);
//! document.draw(0, 0, 0, vellum_engine::Rect::new(0, 0, width, document.height()));
//! ```

pub mod container;
pub mod context;
pub mod document;
pub mod master_css;

pub use container::{Container, DrawHandle};
pub use context::Context;
pub use document::{Document, DocumentError, RenderType};

pub use vellum_css::layout::box_model::Rect;
pub use vellum_css::media::{MediaFeatures, MediaType};
pub use vellum_css::paint::{BorderPaint, LinearGradientPaint, ListMarker, PaintLayer, Painter};
pub use vellum_css::style::font::{FontDescription, FontHandle, FontMetrics};
pub use vellum_css::style::values::Color;
