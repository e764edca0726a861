//! Gridline Interchange - table exports
//!
//! Every exporter reads the same filtered, unpaginated query and extracts
//! rows with [`extract_row`], so all formats agree on column order and
//! missing-value handling.
//!
//! ## Formats
//!
//! - **CSV**: batched and streamed ([`DelimitedExporter`])
//! - **XLSX**: in-memory workbook ([`SpreadsheetExporter`])
//! - **PDF**: HTML document via a [`DocumentConverter`] ([`DocumentExporter`])

mod csv_export;
mod document_export;
mod error;
mod extract;
mod format;
mod service;
mod xlsx_export;

pub use csv_export::{Delimiter, DelimitedExporter, DelimitedOptions};
pub use document_export::{
    CommandConverter, DocumentConverter, DocumentExporter, DocumentOptions, HtmlPassthrough,
    Orientation,
};
pub use error::{ExportError, ExportResult};
pub use extract::{extract_row, extract_row_text, header_labels};
pub use format::{ExportFormat, export_filename, export_filename_at};
pub use service::{ExportBody, ExportPayload, ExportService, ensure_enabled};
pub use xlsx_export::SpreadsheetExporter;
