//! Tables declared in configuration files

use serde::{Deserialize, Serialize};

use gridline_core::{Join, Predicate, Projection, TableQuery, escape_like};

use crate::column::Column;
use crate::config::{ColumnConfig, TableOptionsConfig};
use crate::descriptor::{DataTable, TableDescriptor};

/// Root relation of a configured table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
}

/// A table declared as data, e.g. a `[[tables]]` entry of the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub name: String,
    pub source: SourceConfig,
    #[serde(default)]
    pub joins: Vec<Join>,
    /// Raw SQL conditions always applied
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub options: TableOptionsConfig,
}

/// [`DataTable`] driven by a [`TableDefinition`].
///
/// Projects every column under its output alias and searches with a
/// case-insensitive LIKE over the searchable columns.
#[derive(Debug, Clone)]
pub struct ConfiguredTable {
    definition: TableDefinition,
}

impl ConfiguredTable {
    pub fn new(definition: TableDefinition) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }
}

impl DataTable for ConfiguredTable {
    fn name(&self) -> &str {
        &self.definition.name
    }

    fn columns(&self) -> Vec<ColumnConfig> {
        self.definition.columns.clone()
    }

    fn options(&self) -> TableOptionsConfig {
        self.definition.options.clone()
    }

    fn build_query(&self) -> TableQuery {
        let source = &self.definition.source;
        let mut query = TableQuery::new(&source.table);
        if let Some(schema) = &source.schema {
            query = query.with_schema(schema);
        }
        if let Some(alias) = &source.alias {
            query = query.with_alias(alias);
        }

        for join in &self.definition.joins {
            query = query.join(join.clone());
        }
        for filter in &self.definition.filters {
            query = query.and_where(Predicate::Raw(filter.clone()));
        }

        // Invalid columns are skipped here and reported by descriptor validation
        for config in &self.definition.columns {
            let Ok(column) = Column::from_config(config, source.alias.as_deref()) else {
                continue;
            };
            let projection = Projection::new(column.source_path(), &column.output_alias);
            query = query.select(match &column.enum_type {
                Some(enum_type) => projection.with_enum(enum_type),
                None => projection,
            });
        }

        query
    }

    fn apply_search(&self, query: TableQuery, text: &str, descriptor: &TableDescriptor) -> TableQuery {
        query.and_where(Predicate::Like {
            paths: descriptor.searchable_paths(),
            pattern: format!("%{}%", escape_like(text)),
        })
    }
}
