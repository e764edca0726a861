//! Request parameter normalization

use serde::Serialize;
use std::collections::HashMap;

use gridline_core::SortDirection;

use crate::descriptor::TableDescriptor;

/// Raw query-string parameters
pub type RawParams = HashMap<String, String>;

/// Normalized request parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestParams {
    /// 1-based page, never below 1
    pub page: u64,
    /// Rows per page, never below 1
    pub limit: u64,
    pub sort: Option<String>,
    pub order: SortDirection,
    pub search: Option<String>,
}

impl RequestParams {
    /// Normalize raw parameters against the descriptor's defaults.
    ///
    /// Malformed values fall back to defaults; this never fails.
    pub fn normalize(raw: &RawParams, descriptor: &TableDescriptor) -> Self {
        let default_sort = descriptor.default_sort();

        let page = raw
            .get("page")
            .and_then(|v| parse_int(v))
            .unwrap_or(1)
            .max(1) as u64;

        let limit = raw
            .get("limit")
            .and_then(|v| parse_int(v))
            .map(|v| v.max(1) as u64)
            .unwrap_or(descriptor.options().page_size)
            .max(1);

        let sort = raw
            .get("sort")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty() && *v != "null")
            .map(str::to_string)
            .or_else(|| default_sort.map(|s| s.field.clone()));

        let order = raw
            .get("order")
            .and_then(|v| SortDirection::parse(v.trim()))
            .or_else(|| default_sort.map(|s| s.order))
            .unwrap_or_default();

        let search = raw
            .get("search")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self {
            page,
            limit,
            sort,
            order,
            search,
        }
    }

    /// Back to raw parameters, for building links and re-rendering
    pub fn to_raw(&self) -> RawParams {
        let mut raw = RawParams::new();
        raw.insert("page".into(), self.page.to_string());
        raw.insert("limit".into(), self.limit.to_string());
        raw.insert("order".into(), self.order.as_str().to_string());
        if let Some(sort) = &self.sort {
            raw.insert("sort".into(), sort.clone());
        }
        if let Some(search) = &self.search {
            raw.insert("search".into(), search.clone());
        }
        raw
    }
}

/// Integer coercion: plain integers, else a float truncated toward zero
fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}
