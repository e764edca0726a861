//! Row extraction shared by every exporter

use gridline_core::{Row, Value};
use gridline_services::{TableDescriptor, format_value};

/// Values of `row` in column order.
///
/// Each column is read by output alias, then by name; a missing value
/// becomes an empty string.
pub fn extract_row(row: &Row, descriptor: &TableDescriptor) -> Vec<Value> {
    descriptor
        .columns()
        .iter()
        .map(|column| {
            column
                .value_in(row)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()))
        })
        .collect()
}

/// Text form of [`extract_row`]
pub fn extract_row_text(row: &Row, descriptor: &TableDescriptor) -> Vec<String> {
    extract_row(row, descriptor).iter().map(format_value).collect()
}

/// Column labels, in column order
pub fn header_labels(descriptor: &TableDescriptor) -> Vec<String> {
    descriptor
        .columns()
        .iter()
        .map(|column| column.label.clone())
        .collect()
}
