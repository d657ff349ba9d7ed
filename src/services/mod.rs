pub mod categories;
pub mod csrf_tokens;
pub mod dashboard;
pub mod sections;
pub mod seo;
pub mod storage;
pub mod testimonials;

use serde::{Deserialize, Serialize};

/// Query-string pagination for list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pagination {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl Pagination {
    const DEFAULT_LIMIT: u32 = 20;
    const MAX_LIMIT: u32 = 100;

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT))
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }
}

/// One page of results plus the total row count.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, pagination: &Pagination) -> Self {
        Self { items, total, page: pagination.page(), limit: pagination.limit() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults_and_clamps() {
        let p = Pagination::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 20);
        assert_eq!(p.offset(), 0);

        let p = Pagination { page: Some(3), limit: Some(500) };
        assert_eq!(p.limit(), 100);
        assert_eq!(p.offset(), 200);

        let p = Pagination { page: Some(0), limit: Some(0) };
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 1);
    }
}
