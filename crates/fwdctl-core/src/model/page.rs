// ── Pagination window ──

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A `{page, size}` window plus the last server-reported `total`.
///
/// Pages are 1-based. `total` is only ever as fresh as the last fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl Page {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
            total: 0,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = total;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// `max(1, ceil(total / size))`.
    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn is_beyond_end(&self) -> bool {
        self.page > self.total_pages()
    }

    /// The same window moved back onto the last valid page if needed.
    pub fn clamped(self) -> Self {
        let last = self.total_pages();
        if self.page > last {
            self.with_page(last)
        } else {
            self
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// 1-based position in the full rule set of the `index`-th row on this page.
    pub fn row_number(&self, index: usize) -> u64 {
        let offset = u64::from(self.page.saturating_sub(1)) * u64::from(self.size);
        offset + u64::try_from(index).unwrap_or(u64::MAX) + 1
    }
}
