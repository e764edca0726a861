use gridline_core::GridlineError;
use gridline_services::ServiceError;
use thiserror::Error;

pub type ExportResult<T> = Result<T, ExportError>;

/// Errors during export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Document conversion failed: {0}")]
    Conversion(String),

    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Core(#[from] GridlineError),
}

impl ExportError {
    /// The service error behind this export failure, if any
    pub fn as_service_error(&self) -> Option<&ServiceError> {
        match self {
            ExportError::Service(e) => Some(e),
            _ => None,
        }
    }
}
