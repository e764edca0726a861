//! Delimited-text export
//!
//! Rows are fetched in batches of `batch_size` and written as they arrive,
//! so memory stays bounded by one batch regardless of the table size.

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;

use gridline_core::{DataSource, Row, TableQuery};
use gridline_services::TableDescriptor;

use crate::error::{ExportError, ExportResult};
use crate::extract::{extract_row_text, header_labels};

/// Field separator of delimited exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Semicolon,
    Comma,
}

impl Delimiter {
    pub fn as_byte(&self) -> u8 {
        match self {
            Self::Semicolon => b';',
            Self::Comma => b',',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimitedOptions {
    pub delimiter: Delimiter,
    pub batch_size: u64,
    pub include_headers: bool,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Semicolon,
            batch_size: 500,
            include_headers: true,
        }
    }
}

/// CSV exporter over a [`DataSource`]
#[derive(Clone)]
pub struct DelimitedExporter {
    source: Arc<dyn DataSource>,
    options: DelimitedOptions,
}

impl DelimitedExporter {
    pub fn new(source: Arc<dyn DataSource>, options: DelimitedOptions) -> Self {
        Self { source, options }
    }

    pub fn options(&self) -> &DelimitedOptions {
        &self.options
    }

    /// Write the full result of `query` to `writer`, flushing after every
    /// batch. Returns the number of data rows written.
    pub async fn export_to<W: Write + Send>(
        &self,
        descriptor: &TableDescriptor,
        query: &TableQuery,
        writer: W,
    ) -> ExportResult<u64> {
        let mut csv = csv::WriterBuilder::new()
            .delimiter(self.options.delimiter.as_byte())
            .from_writer(writer);

        if self.options.include_headers {
            csv.write_record(header_labels(descriptor))?;
            csv.flush()?;
        }

        let batch_size = self.options.batch_size.max(1);
        let mut offset = 0;
        let mut written = 0;
        loop {
            let batch = fetch_batch(self.source.as_ref(), query, offset, batch_size).await?;
            for row in &batch {
                csv.write_record(extract_row_text(row, descriptor))?;
            }
            csv.flush()?;

            written += batch.len() as u64;
            offset += batch_size;
            if (batch.len() as u64) < batch_size {
                break;
            }
        }

        tracing::info!(table = %descriptor.name(), rows = written, "delimited export written");
        Ok(written)
    }

    /// Same output as [`export_to`] as a stream of chunks, one per batch.
    ///
    /// A failure after the first chunk ends the stream with an error item.
    ///
    /// [`export_to`]: DelimitedExporter::export_to
    pub fn stream(
        &self,
        descriptor: TableDescriptor,
        query: TableQuery,
    ) -> BoxStream<'static, ExportResult<Bytes>> {
        let state = StreamState {
            source: Arc::clone(&self.source),
            options: self.options,
            descriptor,
            query,
            offset: 0,
            header_pending: self.options.include_headers,
            finished: false,
        };

        stream::try_unfold(state, next_chunk).boxed()
    }
}

struct StreamState {
    source: Arc<dyn DataSource>,
    options: DelimitedOptions,
    descriptor: TableDescriptor,
    query: TableQuery,
    offset: u64,
    header_pending: bool,
    finished: bool,
}

/// Next chunk of a delimited stream: the header first, then one per batch
async fn next_chunk(mut state: StreamState) -> ExportResult<Option<(Bytes, StreamState)>> {
    if state.header_pending {
        state.header_pending = false;
        let chunk = encode(&state.options, [header_labels(&state.descriptor)])?;
        return Ok(Some((chunk, state)));
    }
    if state.finished {
        return Ok(None);
    }

    let batch_size = state.options.batch_size.max(1);
    let batch = fetch_batch(state.source.as_ref(), &state.query, state.offset, batch_size).await?;
    state.offset += batch_size;
    state.finished = (batch.len() as u64) < batch_size;
    if batch.is_empty() {
        return Ok(None);
    }

    let records = batch
        .iter()
        .map(|row| extract_row_text(row, &state.descriptor))
        .collect::<Vec<_>>();
    let chunk = encode(&state.options, records)?;
    Ok(Some((chunk, state)))
}

async fn fetch_batch(
    source: &dyn DataSource,
    query: &TableQuery,
    offset: u64,
    limit: u64,
) -> ExportResult<Vec<Row>> {
    let batch = query.clone().paginate(offset, limit);
    Ok(source.fetch(&batch).await?.rows)
}

fn encode(
    options: &DelimitedOptions,
    records: impl IntoIterator<Item = Vec<String>>,
) -> ExportResult<Bytes> {
    let mut csv = csv::WriterBuilder::new()
        .delimiter(options.delimiter.as_byte())
        .from_writer(Vec::new());
    for record in records {
        csv.write_record(record)?;
    }
    let buffer = csv
        .into_inner()
        .map_err(|e| ExportError::Io(std::io::Error::new(e.error().kind(), e.error().to_string())))?;
    Ok(Bytes::from(buffer))
}
