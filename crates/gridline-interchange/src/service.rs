//! Export orchestration
//!
//! Resolves the table's filtered query through the [`TableService`] and
//! hands it to the exporter for the requested format.

use bytes::Bytes;
use futures::stream::BoxStream;
use std::sync::Arc;

use gridline_services::{DataTable, RawParams, ServiceError, TableDescriptor, TableService};

use crate::csv_export::{DelimitedExporter, DelimitedOptions};
use crate::document_export::{DocumentConverter, DocumentExporter, DocumentOptions};
use crate::error::ExportResult;
use crate::format::{ExportFormat, export_filename};
use crate::xlsx_export::SpreadsheetExporter;

/// Export content, either fully built or streamed in chunks
pub enum ExportBody {
    Bytes(Vec<u8>),
    Stream(BoxStream<'static, ExportResult<Bytes>>),
}

/// A finished export ready to be delivered as an attachment
pub struct ExportPayload {
    pub filename: String,
    pub content_type: &'static str,
    pub body: ExportBody,
}

impl std::fmt::Debug for ExportPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportPayload")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

pub struct ExportService {
    tables: Arc<TableService>,
    delimited: DelimitedExporter,
    spreadsheet: SpreadsheetExporter,
    document: DocumentExporter,
}

impl ExportService {
    pub fn new(
        tables: Arc<TableService>,
        delimited: DelimitedOptions,
        converter: Arc<dyn DocumentConverter>,
        document: DocumentOptions,
    ) -> Self {
        let source = Arc::clone(tables.source());
        let template = tables.defaults().templates.export_document.clone();
        Self {
            delimited: DelimitedExporter::new(Arc::clone(&source), delimited),
            spreadsheet: SpreadsheetExporter::new(Arc::clone(&source)),
            document: DocumentExporter::new(
                source,
                Arc::clone(tables.renderer()),
                converter,
                template,
            )
            .with_options(document),
            tables,
        }
    }

    /// Export `table` in `format`, honoring search and sort from `raw`
    #[tracing::instrument(skip(self, table, raw), fields(table = %table.name()))]
    pub async fn export(
        &self,
        table: &dyn DataTable,
        raw: &RawParams,
        format: ExportFormat,
    ) -> ExportResult<ExportPayload> {
        // Toggles only depend on configuration; check them before querying
        ensure_enabled(&TableDescriptor::build(table, self.tables.defaults())?, format)?;
        let (descriptor, query) = self.tables.export_query(table, raw).await?;

        let payload = match format {
            ExportFormat::Csv => ExportPayload {
                filename: export_filename(descriptor.name(), format.extension()),
                content_type: format.content_type(),
                body: ExportBody::Stream(self.delimited.stream(descriptor, query)),
            },
            ExportFormat::Xlsx => ExportPayload {
                filename: export_filename(descriptor.name(), format.extension()),
                content_type: format.content_type(),
                body: ExportBody::Bytes(self.spreadsheet.export(&descriptor, &query).await?),
            },
            ExportFormat::Pdf => {
                let converter = self.document.converter();
                ExportPayload {
                    filename: export_filename(descriptor.name(), converter.extension()),
                    content_type: converter.content_type(),
                    body: ExportBody::Bytes(self.document.export(&descriptor, &query).await?),
                }
            }
        };

        tracing::debug!(filename = %payload.filename, "export prepared");
        Ok(payload)
    }
}

/// Fails with `ExportDisabled` unless the table and the format are exportable
pub fn ensure_enabled(descriptor: &TableDescriptor, format: ExportFormat) -> Result<(), ServiceError> {
    let options = descriptor.options();
    let toggled = match format {
        ExportFormat::Csv => options.export.csv,
        ExportFormat::Xlsx => options.export.xlsx,
        ExportFormat::Pdf => options.export.pdf,
    };
    if options.exportable && toggled {
        Ok(())
    } else {
        Err(ServiceError::ExportDisabled(format.to_string()))
    }
}
