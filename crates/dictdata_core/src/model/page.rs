//! Paging envelope and page-window arithmetic.

use serde::{Deserialize, Serialize};

/// Effective page window after defaults and clamping were applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
}

impl PageWindow {
    /// Resolves requested paging against configured bounds.
    ///
    /// - `page`: `None`/`0` -> `1`.
    /// - `page_size`: `None`/`0` -> `default_size`, values above `max_size`
    ///   are clamped. The default itself is clamped too and never below `1`.
    pub fn resolve(
        page: Option<u32>,
        page_size: Option<u32>,
        default_size: u32,
        max_size: u32,
    ) -> Self {
        let page = match page {
            None | Some(0) => 1,
            Some(value) => value,
        };
        let max_size = max_size.max(1);
        let page_size = match page_size {
            None | Some(0) => default_size.clamp(1, max_size),
            Some(value) if value > max_size => max_size,
            Some(value) => value,
        };
        Self { page, page_size }
    }

    /// Row limit for storage queries.
    pub fn limit(&self) -> u32 {
        self.page_size
    }

    /// Row offset for storage queries.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of results plus total-count metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageData<T> {
    /// Matching rows regardless of paging.
    pub total: u64,
    pub items: Vec<T>,
    /// Effective 1-based page number.
    pub page: u32,
    /// Effective page size.
    pub page_size: u32,
}

impl<T> PageData<T> {
    pub fn new(window: PageWindow, total: u64, items: Vec<T>) -> Self {
        Self {
            total,
            items,
            page: window.page,
            page_size: window.page_size,
        }
    }

    /// Number of pages needed to show `total` rows (`0` when empty).
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::{PageData, PageWindow};

    #[test]
    fn resolve_applies_defaults_and_clamps() {
        assert_eq!(
            PageWindow::resolve(None, None, 10, 100),
            PageWindow {
                page: 1,
                page_size: 10
            }
        );
        assert_eq!(
            PageWindow::resolve(Some(0), Some(0), 10, 100),
            PageWindow {
                page: 1,
                page_size: 10
            }
        );
        assert_eq!(PageWindow::resolve(Some(3), Some(500), 10, 100).page_size, 100);
    }

    #[test]
    fn resolve_keeps_default_within_bounds() {
        assert_eq!(PageWindow::resolve(None, None, 50, 5).page_size, 5);
        assert_eq!(PageWindow::resolve(None, None, 0, 5).page_size, 1);
        assert_eq!(PageWindow::resolve(None, Some(3), 10, 0).page_size, 1);
    }

    #[test]
    fn offset_is_zero_based() {
        let window = PageWindow::resolve(Some(3), Some(20), 10, 100);
        assert_eq!(window.offset(), 40);
        assert_eq!(window.limit(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let window = PageWindow::resolve(None, Some(10), 10, 100);
        assert_eq!(PageData::<()>::new(window, 0, Vec::new()).total_pages(), 0);
        assert_eq!(PageData::<()>::new(window, 10, Vec::new()).total_pages(), 1);
        assert_eq!(PageData::<()>::new(window, 11, Vec::new()).total_pages(), 2);
    }
}
