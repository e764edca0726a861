use async_trait::async_trait;

use gridline_core::{DataSource, Result, TableQuery};

use super::{PaginationResult, PaginationStrategy, page_offset};

/// OFFSET/LIMIT pagination with a separate COUNT(*) of the same query
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetPaginator;

#[async_trait]
impl PaginationStrategy for OffsetPaginator {
    fn name(&self) -> &'static str {
        "custom"
    }

    async fn paginate(
        &self,
        source: &dyn DataSource,
        query: &TableQuery,
        page: u64,
        limit: u64,
    ) -> Result<PaginationResult> {
        let sliced = query.clone().paginate(page_offset(page, limit), limit);
        let rows = source.fetch(&sliced).await?;
        let total = source.count(query).await?;

        Ok(PaginationResult {
            total_item_count: total,
            current_page_number: page,
            item_number_per_page: limit,
            items: rows.rows,
            page_window: None,
        })
    }
}
