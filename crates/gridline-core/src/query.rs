//! Immutable table query and its SQL rendering
//!
//! A `TableQuery` is built in stages (projections → filters → ordering →
//! pagination). Every builder method consumes the query and returns the
//! updated value, so a base query handed out by a table definition can be
//! cloned and refined per request without leaking clauses between requests.

use serde::{Deserialize, Serialize};

use crate::Value;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `asc`/`desc`, case-insensitively
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SQL dialect, derived from a connection's driver name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Sqlite,
    Postgres,
    Mysql,
    Mssql,
    Generic,
}

impl Dialect {
    pub fn from_driver(driver_name: &str) -> Self {
        match driver_name {
            "sqlite" => Self::Sqlite,
            "postgres" | "postgresql" => Self::Postgres,
            "mysql" | "mariadb" => Self::Mysql,
            "mssql" => Self::Mssql,
            _ => Self::Generic,
        }
    }

    /// Quote a single identifier
    pub fn escape_identifier(&self, identifier: &str) -> String {
        match self {
            Self::Mysql => format!("`{}`", identifier.replace('`', "``")),
            Self::Mssql => format!("[{}]", identifier.replace(']', "]]")),
            _ => format!("\"{}\"", identifier.replace('"', "\"\"")),
        }
    }

    /// Quote a dotted path (`alias.column`) segment by segment.
    ///
    /// Expressions that are not plain paths (function calls, `*`) are
    /// emitted verbatim.
    pub fn escape_path(&self, path: &str) -> String {
        if !is_plain_path(path) {
            return path.to_string();
        }
        path.split('.')
            .map(|segment| self.escape_identifier(segment))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// `ESCAPE` clause matching [`escape_like`]
    pub fn like_escape_clause(&self) -> &'static str {
        match self {
            // Backslash is also a string-literal escape in MySQL
            Self::Mysql => "ESCAPE '\\\\'",
            _ => "ESCAPE '\\'",
        }
    }

    /// Positional placeholder for the 1-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${}", index),
            Self::Mssql => format!("@P{}", index),
            _ => "?".to_string(),
        }
    }
}

fn is_plain_path(path: &str) -> bool {
    !path.is_empty()
        && path.split('.').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

/// Escape `%`, `_` and the escape character itself so `text` matches
/// literally inside a LIKE pattern
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// A projected expression and the alias it is keyed under in result rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Source path, e.g. `u.email`
    pub expression: String,
    /// Output alias, e.g. `u_email`
    pub alias: String,
    /// Enum the raw value is hydrated into, if any
    #[serde(default)]
    pub enum_type: Option<String>,
}

impl Projection {
    pub fn new(expression: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            alias: alias.into(),
            enum_type: None,
        }
    }

    pub fn with_enum(mut self, enum_type: impl Into<String>) -> Self {
        self.enum_type = Some(enum_type.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinKind {
    #[default]
    Inner,
    Left,
}

/// A joined relation; `on` is an SQL condition fragment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    #[serde(default)]
    pub kind: JoinKind,
    pub table: String,
    pub alias: String,
    pub on: String,
}

/// Filter predicate; all predicates of a query are combined with AND
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive LIKE of `pattern` against any of `paths` (OR).
    /// Backslash escapes wildcards in `pattern`, see [`escape_like`].
    Like { paths: Vec<String>, pattern: String },
    /// `path = value` (`IS NULL` for `Value::Null`)
    Equals { path: String, value: Value },
    /// Raw SQL condition without parameters
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub path: String,
    pub direction: SortDirection,
}

/// Immutable query value
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    table: String,
    schema: Option<String>,
    alias: Option<String>,
    projections: Vec<Projection>,
    joins: Vec<Join>,
    filters: Vec<Predicate>,
    order_by: Vec<OrderBy>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl TableQuery {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            schema: None,
            alias: None,
            projections: Vec::new(),
            joins: Vec::new(),
            filters: Vec::new(),
            order_by: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn select(mut self, projection: Projection) -> Self {
        self.projections.push(projection);
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn order_by(mut self, path: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            path: path.into(),
            direction,
        });
        self
    }

    pub fn without_order(mut self) -> Self {
        self.order_by.clear();
        self
    }

    /// Set result offset and limit
    pub fn paginate(mut self, offset: u64, limit: u64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn without_pagination(mut self) -> Self {
        self.offset = None;
        self.limit = None;
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Render the SELECT statement and its positional parameters
    pub fn to_sql(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let mut sql = self.select_core(dialect, &mut params);

        let mut order_clauses: Vec<String> = self
            .order_by
            .iter()
            .map(|o| format!("{} {}", dialect.escape_path(&o.path), o.direction.as_sql()))
            .collect();

        let paginated = self.limit.is_some() || self.offset.is_some();
        if order_clauses.is_empty() && paginated && dialect == Dialect::Mssql {
            // OFFSET/FETCH requires an ORDER BY on SQL Server
            order_clauses.push("(SELECT NULL)".to_string());
        }
        if !order_clauses.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order_clauses.join(", "));
        }

        if paginated {
            let offset = self.offset.unwrap_or(0);
            match (dialect, self.limit) {
                (Dialect::Mssql, Some(limit)) => sql.push_str(&format!(
                    " OFFSET {} ROWS FETCH NEXT {} ROWS ONLY",
                    offset, limit
                )),
                (Dialect::Mssql, None) => sql.push_str(&format!(" OFFSET {} ROWS", offset)),
                (_, Some(limit)) => sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset)),
                // SQLite and MySQL need a LIMIT to accept OFFSET
                (_, None) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            }
        }

        (sql, params)
    }

    /// Render an unbounded count of the same filtered query.
    ///
    /// Ordering and pagination are dropped; the count wraps the filtered
    /// SELECT so joins and projections are counted the way rows are fetched.
    pub fn to_count_sql(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let inner = self.select_core(dialect, &mut params);
        (
            format!("SELECT COUNT(*) FROM ({}) AS gridline_count", inner),
            params,
        )
    }

    fn select_core(&self, dialect: Dialect, params: &mut Vec<Value>) -> String {
        let columns = if self.projections.is_empty() {
            "*".to_string()
        } else {
            self.projections
                .iter()
                .map(|p| {
                    format!(
                        "{} AS {}",
                        dialect.escape_path(&p.expression),
                        dialect.escape_identifier(&p.alias)
                    )
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", columns, self.qualified_table(dialect));
        if let Some(alias) = &self.alias {
            sql.push_str(&format!(" AS {}", dialect.escape_identifier(alias)));
        }

        for join in &self.joins {
            let keyword = match join.kind {
                JoinKind::Inner => "INNER JOIN",
                JoinKind::Left => "LEFT JOIN",
            };
            sql.push_str(&format!(
                " {} {} AS {} ON {}",
                keyword,
                dialect.escape_path(&join.table),
                dialect.escape_identifier(&join.alias),
                join.on
            ));
        }

        if !self.filters.is_empty() {
            let conditions: Vec<String> = self
                .filters
                .iter()
                .map(|predicate| render_predicate(predicate, dialect, params))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        sql
    }

    fn qualified_table(&self, dialect: Dialect) -> String {
        match &self.schema {
            Some(schema) => format!(
                "{}.{}",
                dialect.escape_identifier(schema),
                dialect.escape_identifier(&self.table)
            ),
            None => dialect.escape_identifier(&self.table),
        }
    }
}

fn render_predicate(predicate: &Predicate, dialect: Dialect, params: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::Like { paths, pattern } => {
            if paths.is_empty() {
                return "1 = 0".to_string();
            }
            let alternatives: Vec<String> = paths
                .iter()
                .map(|path| {
                    params.push(Value::String(pattern.clone()));
                    format!(
                        "LOWER({}) LIKE LOWER({}) {}",
                        dialect.escape_path(path),
                        dialect.placeholder(params.len()),
                        dialect.like_escape_clause()
                    )
                })
                .collect();
            format!("({})", alternatives.join(" OR "))
        }
        Predicate::Equals { path, value } => {
            if value.is_null() {
                format!("{} IS NULL", dialect.escape_path(path))
            } else {
                params.push(value.clone());
                format!(
                    "{} = {}",
                    dialect.escape_path(path),
                    dialect.placeholder(params.len())
                )
            }
        }
        Predicate::Raw(sql) => format!("({})", sql),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn users_query() -> TableQuery {
        TableQuery::new("users")
            .with_alias("u")
            .select(Projection::new("u.id", "id"))
            .select(Projection::new("u.name", "name"))
    }

    #[test]
    fn test_select_with_order_and_pagination() {
        let (sql, params) = users_query()
            .order_by("u.name", SortDirection::Desc)
            .paginate(20, 10)
            .to_sql(Dialect::Sqlite);

        assert_eq!(
            sql,
            "SELECT \"u\".\"id\" AS \"id\", \"u\".\"name\" AS \"name\" FROM \"users\" AS \"u\" ORDER BY \"u\".\"name\" DESC LIMIT 10 OFFSET 20"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_like_predicate_binds_one_param_per_path() {
        let (sql, params) = users_query()
            .and_where(Predicate::Like {
                paths: vec!["u.name".into(), "u.email".into()],
                pattern: "%ann%".into(),
            })
            .to_sql(Dialect::Postgres);

        assert!(sql.contains("LOWER(\"u\".\"name\") LIKE LOWER($1)"), "{}", sql);
        assert!(sql.contains("LOWER(\"u\".\"email\") LIKE LOWER($2)"), "{}", sql);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_like_escape_clause_per_dialect() {
        let query = users_query().and_where(Predicate::Like {
            paths: vec!["u.name".into()],
            pattern: "%a%".into(),
        });
        let (sqlite, _) = query.to_sql(Dialect::Sqlite);
        let (mysql, _) = query.to_sql(Dialect::Mysql);

        assert!(sqlite.contains("LIKE LOWER(?) ESCAPE '\\')"), "{}", sqlite);
        assert!(mysql.contains("LIKE LOWER(?) ESCAPE '\\\\')"), "{}", mysql);
    }

    #[test]
    fn test_count_drops_order_and_pagination() {
        let (sql, _) = users_query()
            .and_where(Predicate::Equals {
                path: "u.active".into(),
                value: Value::Bool(true),
            })
            .order_by("u.name", SortDirection::Asc)
            .paginate(0, 10)
            .to_count_sql(Dialect::Mysql);

        assert!(sql.starts_with("SELECT COUNT(*) FROM (SELECT"), "{}", sql);
        assert!(sql.contains("WHERE `u`.`active` = ?"), "{}", sql);
        assert!(!sql.contains("ORDER BY"), "{}", sql);
        assert!(!sql.contains("LIMIT"), "{}", sql);
    }

    #[test]
    fn test_mssql_pagination_requires_order() {
        let (sql, _) = TableQuery::new("users").paginate(5, 5).to_sql(Dialect::Mssql);
        assert!(
            sql.ends_with("ORDER BY (SELECT NULL) OFFSET 5 ROWS FETCH NEXT 5 ROWS ONLY"),
            "{}",
            sql
        );
    }

    #[test]
    fn test_builder_does_not_mutate_clones() {
        let base = users_query();
        let refined = base.clone().order_by("u.id", SortDirection::Asc);
        assert!(base.ordering().is_empty());
        assert_eq!(refined.ordering().len(), 1);
    }

    #[test]
    fn test_escape_path_leaves_expressions_alone() {
        assert_eq!(Dialect::Sqlite.escape_path("COUNT(*)"), "COUNT(*)");
        assert_eq!(Dialect::Mssql.escape_path("o.total"), "[o].[total]");
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
        assert_eq!(SortDirection::parse("up"), None);
    }
}
