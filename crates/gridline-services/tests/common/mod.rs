//! Common test utilities and mocks

use async_trait::async_trait;
use std::sync::Arc;

use gridline_core::{Connection, GridlineError, QueryResult, Result, Value};

/// Mock connection for testing service-layer logic without a real database.
///
/// Answers by SQL pattern: if a query contains a registered pattern, the
/// corresponding result is returned, otherwise the default result.
pub struct MockConnection {
    pub driver: String,
    pub should_fail: bool,
    /// Default query result returned when no pattern matches
    pub query_results: Vec<QueryResult>,
    pub query_responses: Vec<(String, QueryResult)>,
    pub query_count: Arc<parking_lot::Mutex<usize>>,
    /// Log of all SQL queries executed, for assertion in tests
    pub query_log: Arc<parking_lot::Mutex<Vec<String>>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            driver: "sqlite".to_string(),
            should_fail: false,
            query_results: vec![],
            query_responses: vec![],
            query_count: Arc::new(parking_lot::Mutex::new(0)),
            query_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn with_result(mut self, result: QueryResult) -> Self {
        self.query_results.push(result);
        self
    }

    /// Register a response for queries containing the given SQL pattern.
    pub fn with_query_response(
        mut self,
        sql_contains: impl Into<String>,
        result: QueryResult,
    ) -> Self {
        self.query_responses.push((sql_contains.into(), result));
        self
    }

    pub fn query_count(&self) -> usize {
        *self.query_count.lock()
    }

    pub fn query_log(&self) -> Vec<String> {
        self.query_log.lock().clone()
    }

    /// Number of logged queries containing `pattern`
    pub fn queries_containing(&self, pattern: &str) -> usize {
        self.query_log
            .lock()
            .iter()
            .filter(|sql| sql.contains(pattern))
            .count()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        &self.driver
    }

    async fn query(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
        *self.query_count.lock() += 1;
        self.query_log.lock().push(sql.to_string());

        if self.should_fail {
            return Err(GridlineError::Query("Query failed".into()));
        }

        for (pattern, result) in &self.query_responses {
            if sql.contains(pattern.as_str()) {
                return Ok(result.clone());
            }
        }

        Ok(self
            .query_results
            .first()
            .cloned()
            .unwrap_or_else(QueryResult::empty))
    }
}

pub fn mock_query_result(column_names: Vec<&str>, row_data: Vec<Vec<Value>>) -> QueryResult {
    QueryResult::from_rows(
        column_names.iter().map(|name| name.to_string()).collect(),
        row_data,
    )
}

pub fn count_result(count: i64) -> QueryResult {
    mock_query_result(vec!["count"], vec![vec![Value::Int64(count)]])
}

/// `count` user rows: id, name, email, status
pub fn user_rows(count: i64) -> QueryResult {
    mock_query_result(
        vec!["id", "name", "email", "status"],
        (1..=count)
            .map(|id| {
                vec![
                    Value::Int64(id),
                    Value::String(format!("User {}", id)),
                    Value::String(format!("user{}@example.com", id)),
                    Value::String("active".into()),
                ]
            })
            .collect(),
    )
}
