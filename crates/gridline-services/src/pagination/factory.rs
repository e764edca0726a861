use std::sync::Arc;

use super::{DelegatedPaginator, OffsetPaginator, PaginationStrategy, Paginator};

/// Known pagination modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaginationMode {
    /// `custom` (also `offset`)
    Offset,
    /// `knp` (also `delegated`, `generic`)
    Delegated,
}

impl PaginationMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "custom" | "offset" => Some(Self::Offset),
            "knp" | "delegated" | "generic" => Some(Self::Delegated),
            _ => None,
        }
    }
}

/// Maps a mode name to its strategy
pub struct PaginatorFactory {
    offset: Arc<dyn PaginationStrategy>,
    delegated: Arc<dyn PaginationStrategy>,
}

impl PaginatorFactory {
    pub fn new(paginator: Paginator) -> Self {
        Self {
            offset: Arc::new(OffsetPaginator),
            delegated: Arc::new(DelegatedPaginator::new(paginator)),
        }
    }

    /// Strategy for `mode`; unknown modes fall back to offset pagination
    pub fn resolve(&self, mode: &str) -> Arc<dyn PaginationStrategy> {
        match PaginationMode::parse(mode) {
            Some(PaginationMode::Offset) => Arc::clone(&self.offset),
            Some(PaginationMode::Delegated) => Arc::clone(&self.delegated),
            None => {
                tracing::warn!(mode = %mode, "unknown pagination mode, falling back to offset pagination");
                Arc::clone(&self.offset)
            }
        }
    }
}

impl Default for PaginatorFactory {
    fn default() -> Self {
        Self::new(Paginator::default())
    }
}
