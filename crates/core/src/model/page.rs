use std::ops::Range;

/// Number of questions shown on one page.
pub const PAGE_SIZE: usize = 10;

/// Page arithmetic over a question list of fixed length.
///
/// Pages are 1-indexed. An empty list still has one (empty) page so that
/// `1 <= page <= last_page()` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    total: usize,
}

impl Pagination {
    #[must_use]
    pub fn new(total: usize) -> Self {
        Self { total }
    }

    /// `ceil(total / PAGE_SIZE)`; zero for an empty list.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(PAGE_SIZE)
    }

    /// Highest valid page number, never below 1.
    #[must_use]
    pub fn last_page(&self) -> usize {
        self.page_count().max(1)
    }

    #[must_use]
    pub fn is_last(&self, page: usize) -> bool {
        page == self.last_page()
    }

    /// Index range `[(page-1)*PAGE_SIZE, page*PAGE_SIZE)` clipped to the list length.
    ///
    /// Out-of-range pages yield an empty range.
    #[must_use]
    pub fn range(&self, page: usize) -> Range<usize> {
        if page == 0 {
            return 0..0;
        }
        let start = (page - 1).saturating_mul(PAGE_SIZE).min(self.total);
        let end = page.saturating_mul(PAGE_SIZE).min(self.total);
        start..end
    }
}
