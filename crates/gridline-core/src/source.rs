//! Data source seam between table queries and connections

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Connection, Dialect, EnumRegistry, GridlineError, QueryResult, Result, TableQuery};

/// Executes table queries.
///
/// Pagination strategies, type detection and exporters only ever see this
/// trait, so they can be tested against an in-memory implementation.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Materialize the rows selected by `query` (pagination included)
    async fn fetch(&self, query: &TableQuery) -> Result<QueryResult>;

    /// Count the rows of `query`, ignoring its ordering and pagination
    async fn count(&self, query: &TableQuery) -> Result<u64>;
}

/// `DataSource` backed by a SQL `Connection`
pub struct ConnectionSource {
    connection: Arc<dyn Connection>,
    enums: Arc<EnumRegistry>,
}

impl ConnectionSource {
    pub fn new(connection: Arc<dyn Connection>, enums: Arc<EnumRegistry>) -> Self {
        Self { connection, enums }
    }

    fn dialect(&self) -> Dialect {
        Dialect::from_driver(self.connection.driver_name())
    }

    /// Replace raw values of enum projections with hydrated enum cases
    fn hydrate_enums(&self, query: &TableQuery, result: &mut QueryResult) {
        let enum_projections: Vec<(&str, &str)> = query
            .projections()
            .iter()
            .filter_map(|p| p.enum_type.as_deref().map(|e| (p.alias.as_str(), e)))
            .collect();
        if enum_projections.is_empty() {
            return;
        }

        for row in &mut result.rows {
            for (alias, enum_type) in &enum_projections {
                if let Some(raw) = row.get_by_name(alias) {
                    let hydrated = self.enums.hydrate(enum_type, raw);
                    row.set_by_name(alias, hydrated);
                }
            }
        }
    }
}

#[async_trait]
impl DataSource for ConnectionSource {
    async fn fetch(&self, query: &TableQuery) -> Result<QueryResult> {
        let (sql, params) = query.to_sql(self.dialect());
        tracing::debug!(sql = %sql, params = params.len(), "fetching rows");

        let mut result = self.connection.query(&sql, &params).await?;
        self.hydrate_enums(query, &mut result);
        Ok(result)
    }

    async fn count(&self, query: &TableQuery) -> Result<u64> {
        let (sql, params) = query.to_count_sql(self.dialect());
        tracing::debug!(sql = %sql, "counting rows");

        let result = self.connection.query(&sql, &params).await?;
        result
            .rows
            .first()
            .and_then(|row| row.values.first())
            .and_then(|v| v.as_i64())
            .map(|count| count.max(0) as u64)
            .ok_or_else(|| GridlineError::Query("COUNT(*) query returned no result".to_string()))
    }
}
