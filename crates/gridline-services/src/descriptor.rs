//! Table definitions and their per-request descriptor

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use gridline_core::{GridlineError, TableQuery};

use crate::column::Column;
use crate::config::{ColumnConfig, SortSpec, TableDefaults, TableOptions, TableOptionsConfig};
use crate::error::{ServiceError, ServiceResult};
use crate::type_cache::TypeMap;

/// A data set rendered as a table.
///
/// Implementations declare columns and options and produce the base query.
/// They are stateless: the service builds a fresh [`TableDescriptor`] from
/// them on every request.
pub trait DataTable: Send + Sync {
    /// Stable identifier, used in routes, checksums and export filenames
    fn name(&self) -> &str;

    fn columns(&self) -> Vec<ColumnConfig>;

    fn options(&self) -> TableOptionsConfig {
        TableOptionsConfig::default()
    }

    /// Base query with projections for every column, no ordering or pagination
    fn build_query(&self) -> TableQuery;

    /// Restrict `query` to rows matching `text`. The default ignores search.
    fn apply_search(&self, query: TableQuery, _text: &str, _descriptor: &TableDescriptor) -> TableQuery {
        query
    }
}

/// Resolved columns, options and base query of one table
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    name: String,
    column_configs: Vec<ColumnConfig>,
    columns: Vec<Column>,
    options: TableOptions,
    base_query: TableQuery,
}

#[derive(Serialize)]
struct ChecksumInput<'a> {
    name: &'a str,
    columns: &'a [ColumnConfig],
    options: &'a TableOptions,
}

impl TableDescriptor {
    /// Resolve a table definition against the global defaults.
    ///
    /// Fails when a column lacks a name or label. Call [`validate`] for the
    /// remaining structural checks.
    ///
    /// [`validate`]: TableDescriptor::validate
    pub fn build(table: &dyn DataTable, defaults: &TableDefaults) -> ServiceResult<Self> {
        let base_query = table.build_query();
        let column_configs = table.columns();
        let default_alias = base_query.alias();

        let columns = column_configs
            .iter()
            .map(|config| Column::from_config(config, default_alias))
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(Self {
            name: table.name().to_string(),
            options: table.options().resolve(defaults),
            column_configs,
            columns,
            base_query,
        })
    }

    pub fn validate(&self) -> ServiceResult<()> {
        if self.columns.is_empty() {
            return Err(ServiceError::Configuration(format!(
                "table '{}' declares no columns",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(ServiceError::Configuration(format!(
                    "table '{}' declares column '{}' twice",
                    self.name, column.name
                )));
            }
        }

        for sort in &self.options.default_sort {
            match self.column(&sort.field) {
                Some(column) if column.sortable => {}
                Some(_) => {
                    return Err(ServiceError::Configuration(format!(
                        "default sort column '{}' is not sortable",
                        sort.field
                    )));
                }
                None => {
                    return Err(ServiceError::Configuration(format!(
                        "default sort column '{}' does not exist",
                        sort.field
                    )));
                }
            }
        }

        Ok(())
    }

    /// SHA-256 hex digest of the table name, column configuration and
    /// resolved options
    pub fn checksum(&self) -> ServiceResult<String> {
        let input = ChecksumInput {
            name: &self.name,
            columns: &self.column_configs,
            options: &self.options,
        };
        let canonical = serde_json::to_vec(&input).map_err(GridlineError::from)?;
        Ok(hex::encode(Sha256::digest(&canonical)))
    }

    /// Copy detected types onto the columns, matched by output alias
    pub fn apply_types(&mut self, types: &TypeMap) {
        for column in &mut self.columns {
            if let Some(entry) = types.get(&column.output_alias) {
                column.apply_type(entry);
            }
        }
    }

    /// Column designated by `field` (name or output alias)
    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.matches(field))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_configs(&self) -> &[ColumnConfig] {
        &self.column_configs
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn default_sort(&self) -> Option<&SortSpec> {
        self.options.default_sort.first()
    }

    pub fn base_query(&self) -> &TableQuery {
        &self.base_query
    }

    /// Column identifying a row: the selector field when configured,
    /// otherwise the first column
    pub fn row_key(&self) -> Option<&Column> {
        self.options
            .selector
            .as_ref()
            .and_then(|selector| self.column(&selector.field))
            .or_else(|| self.columns.first())
    }

    /// Qualified source paths of the searchable columns
    pub fn searchable_paths(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|column| column.searchable)
            .map(Column::source_path)
            .collect()
    }
}
