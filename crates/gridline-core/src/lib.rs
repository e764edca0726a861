//! Gridline Core - shared abstractions for the tabular data engine
//!
//! This crate provides the fundamental traits and types that all other
//! Gridline crates depend on. It defines:
//!
//! - `Connection` - Trait for database connections (implemented by drivers)
//! - `TableQuery` - Immutable query value rendered to SQL per dialect
//! - `DataSource` - Executes a `TableQuery` (fetch + count)
//! - `EnumRegistry` - Explicitly constructed enum label lookup
//! - `Renderer` - Template rendering collaborator
//! - Common types like `Value`, `Row`, `QueryResult`, etc.

mod connection;
mod enums;
mod error;
mod query;
mod render;
mod source;
mod types;

pub use connection::*;
pub use enums::*;
pub use error::*;
pub use query::*;
pub use render::*;
pub use source::*;
pub use types::*;
