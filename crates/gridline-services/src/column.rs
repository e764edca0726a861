//! Column model

use gridline_core::{Row, Value};
use serde::Serialize;

use crate::config::{Aggregation, ColumnConfig, ZoneOptions};
use crate::error::{ServiceError, ServiceResult};
use crate::type_cache::CachedTypeEntry;

/// One table column, resolved from a [`ColumnConfig`].
///
/// Immutable after construction except for the type enrichment applied
/// from the type cache ([`Column::apply_type`]).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub label: String,
    pub searchable: bool,
    pub sortable: bool,
    /// Name the column is projected under in result rows
    pub output_alias: String,
    /// Relation the column reads from (the query root alias when unset)
    pub source_alias: Option<String>,
    pub declared_type: Option<String>,
    pub enum_type: Option<String>,
    pub header: ZoneOptions,
    pub body: ZoneOptions,
    pub footer: ZoneOptions,
    pub aggregate: Aggregation,

    // Type-cache enrichment
    pub rank: Option<usize>,
    pub datatype: Option<String>,
    pub is_enum: bool,
    pub is_translatable_enum: bool,
}

impl Column {
    /// Build a column from configuration.
    ///
    /// `default_alias` is the alias of the query root; columns reading from
    /// it (or declaring no source) are projected under their bare name,
    /// columns from joined relations under `source_name`.
    pub fn from_config(config: &ColumnConfig, default_alias: Option<&str>) -> ServiceResult<Self> {
        let name = non_blank(config.name.as_deref()).ok_or_else(|| {
            ServiceError::Configuration("column is missing a name".to_string())
        })?;
        let label = non_blank(config.label.as_deref()).ok_or_else(|| {
            ServiceError::Configuration(format!("column '{}' is missing a label", name))
        })?;

        let output_alias = match config.alias.as_deref() {
            Some(alias) if is_valid_identifier(alias) => alias.to_string(),
            explicit => {
                if let Some(invalid) = explicit {
                    tracing::warn!(column = %name, alias = %invalid, "ignoring invalid column alias");
                }
                match config.source_alias.as_deref() {
                    Some(source) if Some(source) != default_alias => format!("{}_{}", source, name),
                    _ => name.to_string(),
                }
            }
        };

        Ok(Self {
            name: name.to_string(),
            label: label.to_string(),
            searchable: config.searchable.unwrap_or(true),
            sortable: config.sortable.unwrap_or(true),
            output_alias,
            source_alias: config
                .source_alias
                .clone()
                .or_else(|| default_alias.map(str::to_string)),
            declared_type: config.declared_type.clone(),
            enum_type: config.enum_type.clone(),
            header: config.header.clone(),
            body: config.body.clone(),
            footer: config.footer.clone(),
            aggregate: config.aggregate,
            rank: None,
            datatype: None,
            is_enum: false,
            is_translatable_enum: false,
        })
    }

    /// Qualified source reference used for ordering and search, e.g. `u.name`
    pub fn source_path(&self) -> String {
        match &self.source_alias {
            Some(alias) => format!("{}.{}", alias, self.name),
            None => self.name.clone(),
        }
    }

    /// Whether `field` designates this column (by name or output alias)
    pub fn matches(&self, field: &str) -> bool {
        self.name == field || self.output_alias == field
    }

    /// This column's value in `row`, looked up by output alias, then name
    pub fn value_in<'r>(&self, row: &'r Row) -> Option<&'r Value> {
        row.get_by_name(&self.output_alias)
            .or_else(|| row.get_by_name(&self.name))
    }

    pub fn apply_type(&mut self, entry: &CachedTypeEntry) {
        self.rank = entry.rank;
        self.datatype = Some(entry.datatype.clone());
        self.is_enum = entry.is_enum;
        self.is_translatable_enum = entry.is_translatable_enum;
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_valid_identifier(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
