//! Typed table configuration
//!
//! Every nested shape has its own struct with explicit defaults. Maps are
//! `BTreeMap` so serialized configuration (and therefore the descriptor
//! checksum) does not depend on insertion order.

use gridline_core::SortDirection;
use gridline_templates::names;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rendering metadata for one zone (header, body or footer) of a column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneOptions {
    /// Whether the zone's text is a translation key
    pub translate: bool,
    /// CSS class(es)
    pub class: Option<String>,
    /// Extra HTML attributes
    pub attributes: BTreeMap<String, String>,
}

/// Footer aggregation computed over the rendered page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    None,
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

/// Column configuration as declared by a table definition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub name: Option<String>,
    pub label: Option<String>,
    pub searchable: Option<bool>,
    pub sortable: Option<bool>,
    /// Explicit output alias
    pub alias: Option<String>,
    /// Joined relation the column reads from
    pub source_alias: Option<String>,
    #[serde(rename = "type")]
    pub declared_type: Option<String>,
    /// Name of an enum in the `EnumRegistry`
    pub enum_type: Option<String>,
    pub header: ZoneOptions,
    pub body: ZoneOptions,
    pub footer: ZoneOptions,
    pub aggregate: Aggregation,
}

impl ColumnConfig {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = Some(sortable);
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = Some(searchable);
        self
    }

    pub fn from_source(mut self, source_alias: impl Into<String>) -> Self {
        self.source_alias = Some(source_alias.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    pub fn with_enum(mut self, enum_type: impl Into<String>) -> Self {
        self.enum_type = Some(enum_type.into());
        self
    }

    pub fn aggregate(mut self, aggregation: Aggregation) -> Self {
        self.aggregate = aggregation;
        self
    }

    pub fn with_body_class(mut self, class: impl Into<String>) -> Self {
        self.body.class = Some(class.into());
        self
    }
}

/// One entry of a default sort list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(default)]
    pub order: SortDirection,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: SortDirection) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// Per-format export switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportToggles {
    pub csv: bool,
    pub xlsx: bool,
    pub pdf: bool,
}

impl Default for ExportToggles {
    fn default() -> Self {
        Self {
            csv: true,
            xlsx: true,
            pdf: true,
        }
    }
}

/// A link rendered in the action pseudo-column.
///
/// `href` may contain `{field}` placeholders, replaced by the row's value
/// for that output alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLink {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub class: Option<String>,
}

/// The action pseudo-column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionColumn {
    #[serde(default = "default_action_label")]
    pub label: String,
    #[serde(default)]
    pub links: Vec<ActionLink>,
}

fn default_action_label() -> String {
    "Actions".to_string()
}

/// The row-selector pseudo-column (one checkbox per row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorColumn {
    /// Form field name of the checkboxes
    pub name: String,
    /// Output alias whose value identifies the row
    pub field: String,
}

impl Default for SelectorColumn {
    fn default() -> Self {
        Self {
            name: "selected".to_string(),
            field: "id".to_string(),
        }
    }
}

/// Table-level options as declared by a table definition.
///
/// Unset fields are filled from [`TableDefaults`] by [`TableOptionsConfig::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableOptionsConfig {
    pub page_size: Option<u64>,
    pub default_sort: Vec<SortSpec>,
    pub searchable: Option<bool>,
    pub sortable: Option<bool>,
    pub exportable: Option<bool>,
    pub export: Option<ExportToggles>,
    pub translation_domain: Option<String>,
    pub action: Option<ActionColumn>,
    pub selector: Option<SelectorColumn>,
    /// Pagination mode (`custom`, `knp`)
    pub pagination: Option<String>,
}

impl TableOptionsConfig {
    pub fn resolve(&self, defaults: &TableDefaults) -> TableOptions {
        TableOptions {
            page_size: self.page_size.unwrap_or(defaults.page_size).max(1),
            default_sort: self.default_sort.clone(),
            searchable: self.searchable.unwrap_or(defaults.searchable),
            sortable: self.sortable.unwrap_or(defaults.sortable),
            exportable: self.exportable.unwrap_or(defaults.exportable),
            export: self.export.unwrap_or(defaults.export),
            translation_domain: self
                .translation_domain
                .clone()
                .or_else(|| defaults.translation_domain.clone()),
            action: self.action.clone(),
            selector: self.selector.clone(),
            pagination: self
                .pagination
                .clone()
                .unwrap_or_else(|| defaults.pagination.clone()),
        }
    }
}

/// Resolved table options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableOptions {
    pub page_size: u64,
    pub default_sort: Vec<SortSpec>,
    pub searchable: bool,
    pub sortable: bool,
    pub exportable: bool,
    pub export: ExportToggles,
    pub translation_domain: Option<String>,
    pub action: Option<ActionColumn>,
    pub selector: Option<SelectorColumn>,
    pub pagination: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptionsConfig::default().resolve(&TableDefaults::default())
    }
}

/// Template identifiers used by the table service and document export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateNames {
    pub rows: String,
    pub pagination: String,
    pub icon_sort_asc: String,
    pub icon_sort_desc: String,
    pub icon_sort_neutral: String,
    pub export_document: String,
}

impl Default for TemplateNames {
    fn default() -> Self {
        Self {
            rows: names::ROWS.to_string(),
            pagination: names::PAGINATION.to_string(),
            icon_sort_asc: names::ICON_SORT_ASC.to_string(),
            icon_sort_desc: names::ICON_SORT_DESC.to_string(),
            icon_sort_neutral: names::ICON_SORT_NEUTRAL.to_string(),
            export_document: names::EXPORT_DOCUMENT.to_string(),
        }
    }
}

/// Global defaults applied to every table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableDefaults {
    pub page_size: u64,
    pub pagination: String,
    /// Page links shown around the current page by `knp` pagination
    pub page_range: u64,
    pub searchable: bool,
    pub sortable: bool,
    pub exportable: bool,
    pub export: ExportToggles,
    pub translation_domain: Option<String>,
    pub empty_message: String,
    pub templates: TemplateNames,
}

impl Default for TableDefaults {
    fn default() -> Self {
        Self {
            page_size: 25,
            pagination: "custom".to_string(),
            page_range: 5,
            searchable: true,
            sortable: true,
            exportable: true,
            export: ExportToggles::default(),
            translation_domain: None,
            empty_message: "No results".to_string(),
            templates: TemplateNames::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_options_fall_back_to_defaults() {
        let defaults = TableDefaults {
            page_size: 50,
            pagination: "knp".into(),
            ..TableDefaults::default()
        };
        let options = TableOptionsConfig {
            sortable: Some(false),
            ..TableOptionsConfig::default()
        }
        .resolve(&defaults);

        assert_eq!(options.page_size, 50);
        assert_eq!(options.pagination, "knp");
        assert!(!options.sortable);
        assert!(options.searchable);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let options = TableOptionsConfig {
            page_size: Some(0),
            ..TableOptionsConfig::default()
        }
        .resolve(&TableDefaults::default());
        assert_eq!(options.page_size, 1);
    }
}
