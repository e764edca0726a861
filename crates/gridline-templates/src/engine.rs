//! Template renderer using MiniJinja

use minijinja::{Environment, path_loader};
use std::path::Path;

use gridline_core::{GridlineError, Renderer, Result};

/// Names of the built-in templates
pub mod names {
    pub const ROWS: &str = "@gridline/rows.html";
    pub const PAGINATION: &str = "@gridline/pagination.html";
    pub const ICON_SORT_ASC: &str = "@gridline/icon_sort_asc.html";
    pub const ICON_SORT_DESC: &str = "@gridline/icon_sort_desc.html";
    pub const ICON_SORT_NEUTRAL: &str = "@gridline/icon_sort_neutral.html";
    pub const EXPORT_DOCUMENT: &str = "@gridline/export.html";
}

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (names::ROWS, include_str!("../templates/rows.html")),
    (names::PAGINATION, include_str!("../templates/pagination.html")),
    (names::ICON_SORT_ASC, include_str!("../templates/icon_sort_asc.html")),
    (names::ICON_SORT_DESC, include_str!("../templates/icon_sort_desc.html")),
    (
        names::ICON_SORT_NEUTRAL,
        include_str!("../templates/icon_sort_neutral.html"),
    ),
    (names::EXPORT_DOCUMENT, include_str!("../templates/export.html")),
];

/// Markup renderer with the built-in table templates registered.
///
/// Templates whose name ends in `.html` are auto-escaped.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    /// Create a renderer with only the built-in templates
    pub fn new() -> Self {
        let mut env = Environment::new();

        // Register custom markup filters
        crate::filters::register_filters(&mut env);

        for (name, source) in BUILTIN_TEMPLATES {
            // Built-in sources are compiled into the binary; a syntax error
            // here is caught by the tests below.
            if let Err(e) = env.add_template(name, source) {
                tracing::error!(template = %name, error = %e, "built-in template failed to compile");
            }
        }

        Self { env }
    }

    /// Create a renderer that also resolves templates from `dir`.
    ///
    /// Built-in names keep precedence; any other name is looked up on disk.
    pub fn with_template_dir(dir: impl AsRef<Path>) -> Self {
        let mut renderer = Self::new();
        tracing::debug!(dir = %dir.as_ref().display(), "loading templates from directory");
        renderer.env.set_loader(path_loader(dir.as_ref()));
        renderer
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String> {
        let tmpl = self
            .env
            .get_template(template)
            .map_err(|e| GridlineError::Render(format!("{}: {}", template, e)))?;
        tmpl.render(context)
            .map_err(|e| GridlineError::Render(format!("{}: {}", template, e)))
    }
}
