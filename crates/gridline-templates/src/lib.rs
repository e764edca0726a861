//! Gridline Templates - MiniJinja-based markup rendering
//!
//! This crate implements the `Renderer` collaborator used by the table
//! service and the document exporter.
//!
//! ## Features
//!
//! - **Built-in templates**: row fragment, pagination fragment, the three
//!   sort icons and the export document (see [`names`])
//! - **Markup filter**: `attrs`
//! - **Overrides**: load extra templates from a directory
//!
//! ## Example
//!
//! ```rust,ignore
//! use gridline_core::Renderer;
//! use gridline_templates::{TemplateRenderer, names};
//!
//! let renderer = TemplateRenderer::new();
//! let icon = renderer.render(names::ICON_SORT_ASC, &serde_json::json!({}))?;
//! ```

mod engine;
mod filters;

pub use engine::{TemplateRenderer, names};
pub use filters::MarkupFilters;
