//! HTTP surface of Gridline
//!
//! - `GET /health` - Health check
//! - `GET /tables` - Registered table names
//! - `GET /tables/{name}` - Rendered page: `{rows, pagination, icons}`
//! - `GET /tables/{name}/export/{format}` - Attachment download (`csv`, `xlsx`, `pdf`)
//!
//! Query string parameters (`page`, `limit`, `sort`, `order`, `search`) are
//! passed to the table service as-is.

mod error;
mod handlers;
mod routes;
mod state;

pub use error::{AppError, ErrorResponse};
pub use routes::router;
pub use state::AppState;
