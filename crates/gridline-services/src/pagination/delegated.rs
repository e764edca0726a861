//! Generic paginator and the strategy delegating to it

use async_trait::async_trait;

use gridline_core::{DataSource, Result, Row, TableQuery};

use super::{PaginationResult, PaginationStrategy, page_offset};

/// Anything the generic [`Paginator`] can slice
#[async_trait]
pub trait Paginatable: Send + Sync {
    async fn total(&self) -> Result<u64>;

    async fn slice(&self, offset: u64, limit: u64) -> Result<Vec<Row>>;
}

/// A query executed through a data source
pub struct QueryTarget<'a> {
    source: &'a dyn DataSource,
    query: &'a TableQuery,
}

impl<'a> QueryTarget<'a> {
    pub fn new(source: &'a dyn DataSource, query: &'a TableQuery) -> Self {
        Self { source, query }
    }
}

#[async_trait]
impl Paginatable for QueryTarget<'_> {
    async fn total(&self) -> Result<u64> {
        self.source.count(self.query).await
    }

    async fn slice(&self, offset: u64, limit: u64) -> Result<Vec<Row>> {
        let sliced = self.query.clone().paginate(offset, limit);
        Ok(self.source.fetch(&sliced).await?.rows)
    }
}

#[async_trait]
impl Paginatable for Vec<Row> {
    async fn total(&self) -> Result<u64> {
        Ok(self.len() as u64)
    }

    async fn slice(&self, offset: u64, limit: u64) -> Result<Vec<Row>> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self.iter().skip(start).take(take).cloned().collect())
    }
}

/// Result of [`Paginator::paginate`]: a page plus a sliding window of
/// page numbers around it
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingPagination {
    pub current_page_number: u64,
    pub num_item_per_page: u64,
    pub total_count: u64,
    pub items: Vec<Row>,
    pub page_range: u64,
}

impl SlidingPagination {
    pub fn page_count(&self) -> u64 {
        self.total_count.div_ceil(self.num_item_per_page.max(1))
    }

    /// At most `page_range` page numbers, centered on the current page
    pub fn pages_in_range(&self) -> Vec<u64> {
        let page_count = self.page_count();
        if page_count == 0 {
            return Vec::new();
        }
        let range = self.page_range.clamp(1, page_count);
        let current = self.current_page_number.clamp(1, page_count);

        let mut start = current.saturating_sub(range / 2).max(1);
        let end = (start + range - 1).min(page_count);
        start = end + 1 - range;

        (start..=end).collect()
    }
}

/// Generic paginator.
///
/// Counts first and skips the slice query when the requested page lies past
/// the last row.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    page_range: u64,
}

impl Paginator {
    pub fn new(page_range: u64) -> Self {
        Self {
            page_range: page_range.max(1),
        }
    }

    pub async fn paginate(
        &self,
        target: &dyn Paginatable,
        page: u64,
        limit: u64,
    ) -> Result<SlidingPagination> {
        let page = page.max(1);
        let limit = limit.max(1);
        let total = target.total().await?;
        let offset = page_offset(page, limit);

        let items = if offset < total {
            target.slice(offset, limit).await?
        } else {
            tracing::trace!(page, total, "requested page is past the end, skipping slice");
            Vec::new()
        };

        Ok(SlidingPagination {
            current_page_number: page,
            num_item_per_page: limit,
            total_count: total,
            items,
            page_range: self.page_range,
        })
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Strategy delegating to the generic [`Paginator`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DelegatedPaginator {
    paginator: Paginator,
}

impl DelegatedPaginator {
    pub fn new(paginator: Paginator) -> Self {
        Self { paginator }
    }
}

#[async_trait]
impl PaginationStrategy for DelegatedPaginator {
    fn name(&self) -> &'static str {
        "knp"
    }

    async fn paginate(
        &self,
        source: &dyn DataSource,
        query: &TableQuery,
        page: u64,
        limit: u64,
    ) -> Result<PaginationResult> {
        let target = QueryTarget::new(source, query);
        let sliding = self.paginator.paginate(&target, page, limit).await?;
        let page_window = sliding.pages_in_range();

        Ok(PaginationResult {
            total_item_count: sliding.total_count,
            current_page_number: sliding.current_page_number,
            item_number_per_page: sliding.num_item_per_page,
            items: sliding.items,
            page_window: Some(page_window),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridline_core::Value;

    fn rows(count: i64) -> Vec<Row> {
        (1..=count)
            .map(|id| Row::new(vec!["id".into()], vec![Value::Int64(id)]))
            .collect()
    }

    #[tokio::test]
    async fn test_paginates_in_memory_rows() {
        let data = rows(47);
        let page = Paginator::default().paginate(&data, 5, 10).await.unwrap();

        assert_eq!(page.total_count, 47);
        assert_eq!(page.items.len(), 7);
        assert_eq!(page.items[0].get(0), Some(&Value::Int64(41)));
        assert_eq!(page.page_count(), 5);
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let data = rows(3);
        let page = Paginator::default().paginate(&data, 4, 10).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 3);
    }

    #[test]
    fn test_sliding_window() {
        let sliding = SlidingPagination {
            current_page_number: 6,
            num_item_per_page: 10,
            total_count: 100,
            items: vec![],
            page_range: 5,
        };
        assert_eq!(sliding.pages_in_range(), vec![4, 5, 6, 7, 8]);

        let at_end = SlidingPagination {
            current_page_number: 10,
            ..sliding.clone()
        };
        assert_eq!(at_end.pages_in_range(), vec![6, 7, 8, 9, 10]);

        let at_start = SlidingPagination {
            current_page_number: 1,
            ..sliding
        };
        assert_eq!(at_start.pages_in_range(), vec![1, 2, 3, 4, 5]);
    }
}
