//! Rendering collaborator

use crate::Result;

/// Turns a template identifier and a JSON context into markup
pub trait Renderer: Send + Sync {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String>;
}
