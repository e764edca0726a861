//! Document export
//!
//! The table is rendered to HTML through the export template, then handed
//! to a [`DocumentConverter`] (e.g. an HTML-to-PDF tool).

use async_trait::async_trait;
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use gridline_core::{DataSource, Renderer, TableQuery};
use gridline_services::{DATETIME_FORMAT, TableDescriptor};

use crate::error::{ExportError, ExportResult};
use crate::extract::{extract_row_text, header_labels};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "Portrait",
            Self::Landscape => "Landscape",
        }
    }
}

/// Page setup passed to the converter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentOptions {
    pub orientation: Orientation,
    pub page_size: String,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Landscape,
            page_size: "A4".to_string(),
        }
    }
}

/// Converts rendered HTML into the delivered document
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, html: &str, options: &DocumentOptions) -> ExportResult<Vec<u8>>;

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn extension(&self) -> &'static str {
        "pdf"
    }
}

/// Delivers the rendered HTML unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlPassthrough;

#[async_trait]
impl DocumentConverter for HtmlPassthrough {
    async fn convert(&self, html: &str, _options: &DocumentOptions) -> ExportResult<Vec<u8>> {
        Ok(html.as_bytes().to_vec())
    }

    fn content_type(&self) -> &'static str {
        "text/html; charset=utf-8"
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

/// Pipes HTML through an external converter reading stdin and writing
/// the document to stdout (`wkhtmltopdf` compatible flags)
#[derive(Debug, Clone)]
pub struct CommandConverter {
    program: PathBuf,
}

impl CommandConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl DocumentConverter for CommandConverter {
    async fn convert(&self, html: &str, options: &DocumentOptions) -> ExportResult<Vec<u8>> {
        tracing::debug!(program = %self.program.display(), "converting document");

        let mut child = Command::new(&self.program)
            .args(["--quiet", "--orientation", options.orientation.as_str()])
            .args(["--page-size", options.page_size.as_str()])
            .args(["-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExportError::Conversion(format!("failed to start {}: {}", self.program.display(), e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(html.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(ExportError::Conversion(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(output.stdout)
    }
}

/// Renders a table through the export document template
pub struct DocumentExporter {
    source: Arc<dyn DataSource>,
    renderer: Arc<dyn Renderer>,
    converter: Arc<dyn DocumentConverter>,
    template: String,
    options: DocumentOptions,
}

impl DocumentExporter {
    pub fn new(
        source: Arc<dyn DataSource>,
        renderer: Arc<dyn Renderer>,
        converter: Arc<dyn DocumentConverter>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            source,
            renderer,
            converter,
            template: template.into(),
            options: DocumentOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DocumentOptions) -> Self {
        self.options = options;
        self
    }

    pub fn converter(&self) -> &Arc<dyn DocumentConverter> {
        &self.converter
    }

    /// Render the document HTML for the full result of `query`
    pub async fn render_html(&self, descriptor: &TableDescriptor, query: &TableQuery) -> ExportResult<String> {
        let result = self.source.fetch(&query.clone().without_pagination()).await?;
        let rows: Vec<Vec<String>> = result
            .rows
            .iter()
            .map(|row| extract_row_text(row, descriptor))
            .collect();

        let context = json!({
            "table": { "name": descriptor.name() },
            "generated_at": Local::now().format(DATETIME_FORMAT).to_string(),
            "headers": header_labels(descriptor),
            "rows": rows,
            "options": &self.options,
        });
        Ok(self.renderer.render(&self.template, &context)?)
    }

    pub async fn export(&self, descriptor: &TableDescriptor, query: &TableQuery) -> ExportResult<Vec<u8>> {
        let html = self.render_html(descriptor, query).await?;
        let document = self.converter.convert(&html, &self.options).await?;
        tracing::info!(
            table = %descriptor.name(),
            bytes = document.len(),
            "document export built"
        );
        Ok(document)
    }
}
