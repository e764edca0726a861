//! Integration tests for the exporters and ExportService
//!
//! Uses an in-memory data source so batching and failure handling can be
//! observed.

mod common;

use futures::StreamExt;
use std::sync::Arc;

use gridline_core::DataSource;
use gridline_interchange::{
    Delimiter, DelimitedExporter, DelimitedOptions, DocumentExporter, DocumentOptions, ExportBody,
    ExportError, ExportFormat, ExportService, HtmlPassthrough, SpreadsheetExporter,
};
use gridline_services::{
    ExportToggles, RawParams, ServiceError, TableDefaults, TableDescriptor, TableService,
    TypeCache,
};
use gridline_templates::{TemplateRenderer, names};

use common::{MemorySource, Products, product_rows};

fn descriptor() -> TableDescriptor {
    TableDescriptor::build(&Products::default(), &TableDefaults::default()).unwrap()
}

fn small_batches() -> DelimitedOptions {
    DelimitedOptions {
        batch_size: 2,
        ..DelimitedOptions::default()
    }
}

// ============ Delimited Tests ============

#[tokio::test]
async fn delimited_export_writes_header_and_rows_in_batches() {
    let source = Arc::new(MemorySource::new(product_rows(5)));
    let exporter = DelimitedExporter::new(source.clone(), small_batches());
    let descriptor = descriptor();

    let mut out = Vec::new();
    let written = exporter
        .export_to(&descriptor, descriptor.base_query(), &mut out)
        .await
        .unwrap();

    assert_eq!(written, 5);
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "SKU;Name;Price;In stock");
    assert_eq!(lines[1], "SKU-1;Product 1;1.5;false");
    assert_eq!(lines[2], "SKU-2;Product 2;3;true");
    assert_eq!(lines.len(), 6);

    assert_eq!(
        source.fetches(),
        vec![(Some(0), Some(2)), (Some(2), Some(2)), (Some(4), Some(2))]
    );
}

#[tokio::test]
async fn delimited_export_with_comma() {
    let source = Arc::new(MemorySource::new(product_rows(1)));
    let exporter = DelimitedExporter::new(
        source,
        DelimitedOptions {
            delimiter: Delimiter::Comma,
            ..DelimitedOptions::default()
        },
    );
    let descriptor = descriptor();

    let mut out = Vec::new();
    exporter
        .export_to(&descriptor, descriptor.base_query(), &mut out)
        .await
        .unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "SKU,Name,Price,In stock\nSKU-1,Product 1,1.5,false\n"
    );
}

#[tokio::test]
async fn delimited_stream_matches_file_output() {
    let source = Arc::new(MemorySource::new(product_rows(4)));
    let exporter = DelimitedExporter::new(source, small_batches());
    let descriptor = descriptor();

    let mut expected = Vec::new();
    exporter
        .export_to(&descriptor, descriptor.base_query(), &mut expected)
        .await
        .unwrap();

    let chunks: Vec<_> = exporter
        .stream(descriptor.clone(), descriptor.base_query().clone())
        .collect()
        .await;
    // header + two full batches; the third (empty) fetch ends the stream
    assert_eq!(chunks.len(), 3);

    let streamed: Vec<u8> = chunks
        .into_iter()
        .flat_map(|chunk| chunk.unwrap().to_vec())
        .collect();
    assert_eq!(streamed, expected);
}

#[tokio::test]
async fn delimited_stream_surfaces_mid_stream_failure() {
    let source = Arc::new(MemorySource::new(product_rows(5)).failing_from(2));
    let exporter = DelimitedExporter::new(source, small_batches());
    let descriptor = descriptor();

    let chunks: Vec<_> = exporter
        .stream(descriptor.clone(), descriptor.base_query().clone())
        .collect()
        .await;

    assert_eq!(chunks.len(), 3);
    assert!(chunks[0].is_ok());
    assert!(chunks[1].is_ok());
    assert!(matches!(chunks[2], Err(ExportError::Core(_))));
}

// ============ Spreadsheet / Document Tests ============

#[tokio::test]
async fn spreadsheet_export_builds_workbook() {
    let source = Arc::new(MemorySource::new(product_rows(3)));
    let exporter = SpreadsheetExporter::new(source.clone());
    let descriptor = descriptor();

    let bytes = exporter
        .export(&descriptor, &descriptor.base_query().clone().paginate(0, 1))
        .await
        .unwrap();

    // XLSX is a zip container
    assert_eq!(&bytes[..2], b"PK");
    // Pagination is dropped: the whole result is exported in one fetch
    assert_eq!(source.fetches(), vec![(None, None)]);
}

#[tokio::test]
async fn document_export_renders_template() {
    let source: Arc<dyn DataSource> = Arc::new(MemorySource::new(product_rows(2)));
    let exporter = DocumentExporter::new(
        source,
        Arc::new(TemplateRenderer::new()),
        Arc::new(HtmlPassthrough),
        names::EXPORT_DOCUMENT,
    )
    .with_options(DocumentOptions::default());
    let descriptor = descriptor();

    let bytes = exporter.export(&descriptor, descriptor.base_query()).await.unwrap();
    let html = String::from_utf8(bytes).unwrap();

    assert!(html.contains("In stock"), "{}", html);
    assert!(html.contains("Product 2"), "{}", html);
    assert!(html.contains("products"), "{}", html);
}

// ============ ExportService Tests ============

fn export_service(source: Arc<MemorySource>) -> ExportService {
    let tables = Arc::new(TableService::new(
        source,
        Arc::new(TypeCache::default()),
        Arc::new(TemplateRenderer::new()),
        TableDefaults::default(),
    ));
    ExportService::new(
        tables,
        DelimitedOptions::default(),
        Arc::new(HtmlPassthrough),
        DocumentOptions::default(),
    )
}

#[tokio::test]
async fn export_service_streams_csv_attachment() {
    let service = export_service(Arc::new(MemorySource::new(product_rows(3))));

    let payload = service
        .export(&Products::default(), &RawParams::new(), ExportFormat::Csv)
        .await
        .unwrap();

    assert!(payload.filename.starts_with("products_export_"), "{}", payload.filename);
    assert!(payload.filename.ends_with(".csv"));
    assert_eq!(payload.content_type, "text/csv; charset=utf-8");

    let ExportBody::Stream(stream) = payload.body else {
        panic!("csv should be streamed");
    };
    let chunks: Vec<_> = stream.collect().await;
    let body: Vec<u8> = chunks.into_iter().flat_map(|c| c.unwrap().to_vec()).collect();
    assert_eq!(String::from_utf8(body).unwrap().lines().count(), 4);
}

#[tokio::test]
async fn export_service_uses_converter_extension_for_documents() {
    let service = export_service(Arc::new(MemorySource::new(product_rows(1))));

    let payload = service
        .export(&Products::default(), &RawParams::new(), ExportFormat::Pdf)
        .await
        .unwrap();

    assert!(payload.filename.ends_with(".html"), "{}", payload.filename);
    assert_eq!(payload.content_type, "text/html; charset=utf-8");
    assert!(matches!(payload.body, ExportBody::Bytes(_)));
}

#[tokio::test]
async fn export_service_rejects_disabled_formats_before_querying() {
    let source = Arc::new(MemorySource::new(product_rows(1)));
    let service = export_service(source.clone());

    let xlsx_off = Products {
        export: ExportToggles {
            xlsx: false,
            ..ExportToggles::default()
        },
        ..Products::default()
    };
    let err = service
        .export(&xlsx_off, &RawParams::new(), ExportFormat::Xlsx)
        .await
        .unwrap_err();
    assert!(
        matches!(err.as_service_error(), Some(ServiceError::ExportDisabled(f)) if f == "xlsx"),
        "{:?}",
        err
    );

    let not_exportable = Products {
        exportable: false,
        ..Products::default()
    };
    let err = service
        .export(&not_exportable, &RawParams::new(), ExportFormat::Csv)
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_service_error(),
        Some(ServiceError::ExportDisabled(_))
    ));

    assert!(source.fetches().is_empty());
}

#[tokio::test]
async fn export_service_batches_csv_in_a_stable_order() {
    let source = Arc::new(MemorySource::new(product_rows(5)));
    let tables = Arc::new(TableService::new(
        source.clone(),
        Arc::new(TypeCache::default()),
        Arc::new(TemplateRenderer::new()),
        TableDefaults::default(),
    ));
    let service = ExportService::new(
        tables,
        small_batches(),
        Arc::new(HtmlPassthrough),
        DocumentOptions::default(),
    );

    let payload = service
        .export(&Products::default(), &RawParams::new(), ExportFormat::Csv)
        .await
        .unwrap();
    let ExportBody::Stream(stream) = payload.body else {
        panic!("csv should be streamed");
    };
    let chunks: Vec<_> = stream.collect().await;
    let body: Vec<u8> = chunks.into_iter().flat_map(|c| c.unwrap().to_vec()).collect();
    assert_eq!(String::from_utf8(body).unwrap().lines().count(), 6);

    let batches: Vec<String> = source
        .statements()
        .into_iter()
        .filter(|sql| sql.contains("LIMIT 2 OFFSET"))
        .collect();
    assert_eq!(batches.len(), 3, "{:?}", batches);
    for sql in &batches {
        assert!(sql.contains("ORDER BY \"p\".\"sku\" ASC"), "{}", sql);
    }
}
