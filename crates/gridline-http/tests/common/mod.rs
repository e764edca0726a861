//! Common test utilities and mocks

use async_trait::async_trait;
use std::sync::Arc;

use gridline_core::{DataSource, QueryResult, Result, Row, TableQuery, Value};
use gridline_interchange::{DelimitedOptions, DocumentOptions, ExportService, HtmlPassthrough};
use gridline_services::{
    ColumnConfig, ExportToggles, SourceConfig, TableDefaults, TableDefinition,
    TableOptionsConfig, TableRegistry, TableService, TypeCache,
};
use gridline_templates::TemplateRenderer;

use gridline_http::AppState;

/// In-memory data source honoring the query's offset and limit
pub struct MemorySource {
    rows: Vec<Row>,
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch(&self, query: &TableQuery) -> Result<QueryResult> {
        let offset = query.offset().unwrap_or(0) as usize;
        let limit = query.limit().map(|l| l as usize).unwrap_or(usize::MAX);
        let mut result = QueryResult::empty();
        result.rows = self.rows.iter().skip(offset).take(limit).cloned().collect();
        Ok(result)
    }

    async fn count(&self, _query: &TableQuery) -> Result<u64> {
        Ok(self.rows.len() as u64)
    }
}

pub fn product_rows(count: usize) -> Vec<Row> {
    (1..=count)
        .map(|i| {
            Row::new(
                vec!["sku".into(), "name".into()],
                vec![
                    Value::String(format!("SKU-{}", i)),
                    Value::String(format!("Product {}", i)),
                ],
            )
        })
        .collect()
}

fn products(name: &str, export: ExportToggles) -> TableDefinition {
    TableDefinition {
        name: name.into(),
        source: SourceConfig {
            table: "products".into(),
            schema: None,
            alias: Some("p".into()),
        },
        joins: Vec::new(),
        filters: Vec::new(),
        columns: vec![
            ColumnConfig::new("sku", "SKU"),
            ColumnConfig::new("name", "Name").sortable(false),
        ],
        options: TableOptionsConfig {
            page_size: Some(2),
            export: Some(export),
            ..TableOptionsConfig::default()
        },
    }
}

/// App state over `count` products; the PDF export is switched off
pub fn app_state(count: usize) -> AppState {
    app_state_named("products", count)
}

/// Same as [`app_state`] with the table registered under `name`
pub fn app_state_named(name: &str, count: usize) -> AppState {
    let source = Arc::new(MemorySource {
        rows: product_rows(count),
    });
    let service = Arc::new(TableService::new(
        source,
        Arc::new(TypeCache::default()),
        Arc::new(TemplateRenderer::new()),
        TableDefaults::default(),
    ));
    let exports = Arc::new(ExportService::new(
        Arc::clone(&service),
        DelimitedOptions::default(),
        Arc::new(HtmlPassthrough),
        DocumentOptions::default(),
    ));
    let tables = TableRegistry::from_definitions([products(name, ExportToggles {
        pdf: false,
        ..ExportToggles::default()
    })]);

    AppState::new(Arc::new(tables), service, exports)
}
