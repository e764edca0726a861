//! Common test utilities and mocks

use async_trait::async_trait;
use std::sync::Arc;

use gridline_core::{
    DataSource, Dialect, GridlineError, Projection, QueryResult, Result, Row, TableQuery, Value,
};
use gridline_services::{ColumnConfig, DataTable, ExportToggles, TableOptionsConfig};

/// In-memory data source honoring the query's offset and limit.
///
/// Records every fetched `(offset, limit)` window and its SQL, and can be
/// told to fail from the n-th fetch on.
pub struct MemorySource {
    pub rows: Vec<Row>,
    pub fail_from_fetch: Option<usize>,
    pub fetches: Arc<parking_lot::Mutex<Vec<(Option<u64>, Option<u64>)>>>,
    pub statements: Arc<parking_lot::Mutex<Vec<String>>>,
}

impl MemorySource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            fail_from_fetch: None,
            fetches: Arc::new(parking_lot::Mutex::new(Vec::new())),
            statements: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    pub fn failing_from(mut self, fetch: usize) -> Self {
        self.fail_from_fetch = Some(fetch);
        self
    }

    pub fn fetches(&self) -> Vec<(Option<u64>, Option<u64>)> {
        self.fetches.lock().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.lock().clone()
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn fetch(&self, query: &TableQuery) -> Result<QueryResult> {
        self.statements.lock().push(query.to_sql(Dialect::Sqlite).0);
        let call = {
            let mut fetches = self.fetches.lock();
            fetches.push((query.offset(), query.limit()));
            fetches.len()
        };
        if self.fail_from_fetch.is_some_and(|n| call >= n) {
            return Err(GridlineError::Connection("connection lost".into()));
        }

        let offset = query.offset().unwrap_or(0) as usize;
        let limit = query.limit().map(|l| l as usize).unwrap_or(usize::MAX);
        let rows: Vec<Row> = self.rows.iter().skip(offset).take(limit).cloned().collect();

        let mut result = QueryResult::empty();
        result.rows = rows;
        Ok(result)
    }

    async fn count(&self, _query: &TableQuery) -> Result<u64> {
        Ok(self.rows.len() as u64)
    }
}

/// `count` product rows: sku, name, price, in_stock
pub fn product_rows(count: usize) -> Vec<Row> {
    (1..=count)
        .map(|i| {
            Row::new(
                vec!["sku".into(), "name".into(), "price".into(), "in_stock".into()],
                vec![
                    Value::String(format!("SKU-{}", i)),
                    Value::String(format!("Product {}", i)),
                    Value::Float64(i as f64 * 1.5),
                    Value::Bool(i % 2 == 0),
                ],
            )
        })
        .collect()
}

pub struct Products {
    pub exportable: bool,
    pub export: ExportToggles,
}

impl Default for Products {
    fn default() -> Self {
        Self {
            exportable: true,
            export: ExportToggles::default(),
        }
    }
}

impl DataTable for Products {
    fn name(&self) -> &str {
        "products"
    }

    fn columns(&self) -> Vec<ColumnConfig> {
        vec![
            ColumnConfig::new("sku", "SKU"),
            ColumnConfig::new("name", "Name"),
            ColumnConfig::new("price", "Price"),
            ColumnConfig::new("in_stock", "In stock"),
        ]
    }

    fn options(&self) -> TableOptionsConfig {
        TableOptionsConfig {
            exportable: Some(self.exportable),
            export: Some(self.export),
            ..TableOptionsConfig::default()
        }
    }

    fn build_query(&self) -> TableQuery {
        TableQuery::new("products")
            .with_alias("p")
            .select(Projection::new("p.sku", "sku"))
            .select(Projection::new("p.name", "name"))
            .select(Projection::new("p.price", "price"))
            .select(Projection::new("p.in_stock", "in_stock"))
    }
}
