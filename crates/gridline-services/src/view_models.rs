use serde::Serialize;
use std::collections::BTreeMap;

use crate::pagination::PaginationMeta;
use crate::params::RequestParams;

/// Rendered sort icons
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortIcons {
    pub icon_sort_asc: String,
    pub icon_sort_desc: String,
    pub icon_sort_neutral: String,
}

/// Response of a table render: markup fragments for rows, pagination and
/// sort icons. Metadata and normalized parameters are kept for callers but
/// not serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableResponse {
    pub rows: String,
    pub pagination: String,
    pub icons: SortIcons,
    #[serde(skip)]
    pub meta: PaginationMeta,
    #[serde(skip)]
    pub params: RequestParams,
}

/// Header cell passed to the row template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnView {
    pub name: String,
    pub alias: String,
    pub label: String,
    pub sortable: bool,
    /// `asc`, `desc` or `None` when the table is not sorted by this column
    pub sorted: Option<&'static str>,
    pub translate: bool,
    pub class: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub datatype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub value: Option<String>,
    /// Whether the value is a translation key
    pub translate: bool,
    pub class: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkView {
    pub label: String,
    pub href: String,
    pub class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    /// Selector value identifying the row
    pub key: String,
    pub cells: Vec<CellView>,
    pub actions: Vec<LinkView>,
}
