//! Spreadsheet export
//!
//! The workbook is built in memory from the full result set.

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::sync::Arc;

use gridline_core::{DataSource, TableQuery, Value};
use gridline_services::{TableDescriptor, format_value};

use crate::error::ExportResult;
use crate::extract::{extract_row, header_labels};

/// Excel limits sheet names to 31 characters
const MAX_SHEET_NAME: usize = 31;

pub struct SpreadsheetExporter {
    source: Arc<dyn DataSource>,
}

impl SpreadsheetExporter {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self { source }
    }

    /// Serialize the full result of `query` as an XLSX workbook
    pub async fn export(&self, descriptor: &TableDescriptor, query: &TableQuery) -> ExportResult<Vec<u8>> {
        let result = self.source.fetch(&query.clone().without_pagination()).await?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(descriptor.name()))?;

        let bold = Format::new().set_bold();
        for (col, label) in header_labels(descriptor).iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, label, &bold)?;
        }

        for (index, row) in result.rows.iter().enumerate() {
            let row_number = index as u32 + 1;
            for (col, value) in extract_row(row, descriptor).iter().enumerate() {
                write_cell(worksheet, row_number, col as u16, value)?;
            }
        }

        let buffer = workbook.save_to_buffer()?;
        tracing::info!(
            table = %descriptor.name(),
            rows = result.rows.len(),
            bytes = buffer.len(),
            "spreadsheet export built"
        );
        Ok(buffer)
    }
}

/// Numbers and booleans keep their cell type; everything else is text
fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> ExportResult<()> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Value::Int32(_) | Value::Int64(_) | Value::Float64(_) => {
            if let Some(number) = value.as_number().filter(|n| n.is_finite()) {
                worksheet.write_number(row, col, number)?;
            }
        }
        Value::Decimal(raw) => match raw.parse::<f64>() {
            Ok(number) if number.is_finite() => {
                worksheet.write_number(row, col, number)?;
            }
            _ => {
                worksheet.write_string(row, col, raw)?;
            }
        },
        other => {
            worksheet.write_string(row, col, format_value(other))?;
        }
    }
    Ok(())
}

/// Sheet name without the characters Excel rejects, truncated
fn sheet_name(table: &str) -> String {
    let cleaned: String = table
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME)
        .collect();
    if cleaned.trim().is_empty() {
        "Export".to_string()
    } else {
        cleaned
    }
}
