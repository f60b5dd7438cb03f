//! Folium - a paginated PDF viewer library
//!
//! This library provides the core of a page-oriented PDF viewer: a document
//! handle, a page rasterizer, a per-page surface cache with single-flight
//! builds, and a navigation controller that validates every page jump. The
//! iced host adapter in [`ui`] presents the same engine in two modes: one
//! page at a time, or all pages stacked behind a scrollbar.

pub mod cache;
pub mod document;
pub mod engine;
pub mod error;
pub mod input;
pub mod nav;
pub mod render;
pub mod ui;

pub use cache::{Surface, SurfaceCache};
pub use document::{Document, PageSource};
pub use error::ViewerError;
pub use nav::{NavController, NavState, parse_page_entry};
pub use render::{Page, Transform};
pub use ui::{ViewMode, ViewerApp, ViewerConfig};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{Surface, SurfaceCache};
    pub use crate::document::{Document, PageSource};
    pub use crate::error::ViewerError;
    pub use crate::nav::{NavController, NavState};
    pub use crate::render::{Page, Transform};
    pub use crate::ui::{ViewMode, ViewerApp, ViewerConfig};
}
