//! Wiring of settings into services

use anyhow::{Context, Result};
use std::sync::Arc;

use gridline_core::{ConnectionSource, DataSource};
use gridline_driver_sqlite::SqliteConnection;
use gridline_http::AppState;
use gridline_interchange::{CommandConverter, DocumentConverter, ExportService, HtmlPassthrough};
use gridline_services::{TableRegistry, TableService, TypeCache};
use gridline_settings::Settings;
use gridline_templates::TemplateRenderer;

/// Everything the commands need, built once from [`Settings`]
pub struct App {
    pub tables: Arc<TableRegistry>,
    pub service: Arc<TableService>,
    pub exports: Arc<ExportService>,
}

impl App {
    pub fn build(settings: &Settings) -> Result<Self> {
        let connection = SqliteConnection::open(&settings.database.path)
            .with_context(|| format!("Failed to open database '{}'", settings.database.path))?;
        let source: Arc<dyn DataSource> = Arc::new(ConnectionSource::new(
            Arc::new(connection),
            Arc::new(settings.enum_registry()),
        ));
        Ok(Self::with_source(settings, source))
    }

    pub fn with_source(settings: &Settings, source: Arc<dyn DataSource>) -> Self {
        let renderer = match &settings.templates.dir {
            Some(dir) => TemplateRenderer::with_template_dir(dir),
            None => TemplateRenderer::new(),
        };

        let service = Arc::new(TableService::new(
            source,
            Arc::new(TypeCache::new(settings.cache.clone())),
            Arc::new(renderer),
            settings.defaults.clone(),
        ));

        let converter: Arc<dyn DocumentConverter> = match settings.export.resolved_converter() {
            Some(program) => {
                tracing::info!(program = %program.display(), "PDF exports use document converter");
                Arc::new(CommandConverter::new(program))
            }
            None => {
                tracing::warn!("no document converter found, PDF exports deliver HTML");
                Arc::new(HtmlPassthrough)
            }
        };
        let exports = Arc::new(ExportService::new(
            Arc::clone(&service),
            settings.export.delimited,
            converter,
            settings.export.document.clone(),
        ));

        Self {
            tables: Arc::new(settings.table_registry()),
            service,
            exports,
        }
    }

    pub fn state(&self) -> AppState {
        AppState::new(
            Arc::clone(&self.tables),
            Arc::clone(&self.service),
            Arc::clone(&self.exports),
        )
    }
}
