//! Gridline Services Layer
//!
//! This crate turns table definitions into rendered, paginated tables.
//!
//! # Architecture
//!
//! ```text
//! HTTP Layer (gridline-http)
//!     ↓
//! Service Layer (gridline-services) ← This crate
//!     ↓
//! Core Layer (gridline-core, gridline-templates, gridline-driver-sqlite)
//! ```
//!
//! # Components
//!
//! - [`Column`] / [`TableDescriptor`] - resolved table model and its checksum
//! - [`TypeCache`] - column types detected once per descriptor checksum
//! - [`PaginationStrategy`] - offset and delegated pagination
//! - [`RequestParams`] - request parameter normalization
//! - [`TableService`] - request orchestration and rendering
//! - [`TableRegistry`] - tables addressable by name
//!
//! # Design Principles
//!
//! 1. **Per-request descriptors** - only the type cache outlives a request
//! 2. **Validate first** - configuration errors surface before any query
//! 3. **Collaborators behind traits** - `DataSource`, `Renderer`

mod aggregate;
mod column;
mod config;
mod configured;
mod descriptor;
mod error;
mod formatting;
mod params;
mod registry;
mod table_service;
mod type_cache;
mod view_models;

pub mod pagination;

pub use aggregate::aggregate;
pub use column::{Column, is_valid_identifier};
pub use config::{
    ActionColumn, ActionLink, Aggregation, ColumnConfig, ExportToggles, SelectorColumn, SortSpec,
    TableDefaults, TableOptions, TableOptionsConfig, TemplateNames, ZoneOptions,
};
pub use configured::{ConfiguredTable, SourceConfig, TableDefinition};
pub use descriptor::{DataTable, TableDescriptor};
pub use error::{ServiceError, ServiceResult};
pub use formatting::{DATE_FORMAT, DATETIME_FORMAT, format_value};
pub use pagination::{PaginationMeta, PaginationResult, PaginationStrategy, PaginatorFactory};
pub use params::{RawParams, RequestParams};
pub use registry::TableRegistry;
pub use table_service::TableService;
pub use type_cache::{CachedTypeEntry, TypeCache, TypeCacheConfig, TypeMap, detect_types};
pub use view_models::{CellView, ColumnView, LinkView, RowView, SortIcons, TableResponse};
