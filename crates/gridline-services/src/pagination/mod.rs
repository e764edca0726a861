//! Pagination strategies
//!
//! A strategy turns `(query, page, limit)` into one page of rows plus the
//! total row count of the unpaginated query. Two strategies exist:
//!
//! - [`OffsetPaginator`] (`custom`): OFFSET/LIMIT slice and a COUNT(*) query
//! - [`DelegatedPaginator`] (`knp`): forwards to the generic [`Paginator`]

mod delegated;
mod factory;
mod offset;

pub use delegated::{DelegatedPaginator, Paginatable, Paginator, QueryTarget, SlidingPagination};
pub use factory::{PaginationMode, PaginatorFactory};
pub use offset::OffsetPaginator;

use async_trait::async_trait;
use serde::Serialize;

use gridline_core::{DataSource, Result, Row, TableQuery};

/// One page of rows
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationResult {
    /// Row count of the filtered, unpaginated query
    pub total_item_count: u64,
    pub current_page_number: u64,
    pub item_number_per_page: u64,
    pub items: Vec<Row>,
    /// Page numbers to link, when the strategy narrows them to a window
    pub page_window: Option<Vec<u64>>,
}

#[async_trait]
pub trait PaginationStrategy: Send + Sync {
    /// Mode name as used in table options
    fn name(&self) -> &'static str;

    /// Fetch page `page` (1-based) of `query` with `limit` rows per page
    async fn paginate(
        &self,
        source: &dyn DataSource,
        query: &TableQuery,
        page: u64,
        limit: u64,
    ) -> Result<PaginationResult>;
}

/// Navigation metadata passed to the pagination template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub nb_pages: u64,
    pub has_previous: bool,
    pub previous: u64,
    pub has_next: bool,
    pub next: u64,
    pub pages: Vec<u64>,
}

impl PaginationMeta {
    pub fn compute(total: u64, page: u64, limit: u64) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        let nb_pages = total.div_ceil(limit);
        let has_previous = nb_pages > 1 && page > 1;
        let has_next = nb_pages > 1 && page < nb_pages;

        Self {
            total,
            page,
            limit,
            nb_pages,
            has_previous,
            previous: if has_previous { page - 1 } else { 1 },
            has_next,
            next: if has_next { page + 1 } else { page },
            pages: (1..=nb_pages).collect(),
        }
    }
}

impl From<&PaginationResult> for PaginationMeta {
    fn from(result: &PaginationResult) -> Self {
        let mut meta = Self::compute(
            result.total_item_count,
            result.current_page_number,
            result.item_number_per_page,
        );
        if let Some(window) = &result.page_window {
            meta.pages = window.clone();
        }
        meta
    }
}

pub(crate) fn page_offset(page: u64, limit: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(limit)
}
