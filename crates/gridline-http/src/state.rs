use std::sync::Arc;

use gridline_interchange::ExportService;
use gridline_services::{TableRegistry, TableService};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    tables: Arc<TableRegistry>,
    service: Arc<TableService>,
    exports: Arc<ExportService>,
}

impl AppState {
    pub fn new(
        tables: Arc<TableRegistry>,
        service: Arc<TableService>,
        exports: Arc<ExportService>,
    ) -> Self {
        Self {
            tables,
            service,
            exports,
        }
    }

    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    pub fn service(&self) -> &TableService {
        &self.service
    }

    pub fn exports(&self) -> &ExportService {
        &self.exports
    }
}
