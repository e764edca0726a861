use gridline_core::GridlineError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Service-level errors with user-friendly messages
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid table configuration: {0}")]
    Configuration(String),

    #[error("Invalid sort field: {field}")]
    InvalidSortField { field: String },

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Export format '{0}' is disabled for this table")]
    ExportDisabled(String),

    /// Collaborator failure (query, render), propagated unmodified
    #[error(transparent)]
    Core(#[from] GridlineError),
}

impl ServiceError {
    /// Whether the error was caused by the request or table definition
    /// rather than by a collaborator
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Core(_))
    }
}
