//! Pagination engine.

use std::ops::Range;

use serde::Serialize;

/// Metadata for the page being shown.
///
/// `range_start` and `range_end` are 1-based and inclusive for display
/// ("rows 41–45"). Both are zero when there are no rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Zero-based page index after clamping.
    pub page_index: usize,
    /// Total number of pages, at least one.
    pub total_pages: usize,
    /// First displayed row number.
    pub range_start: usize,
    /// Last displayed row number.
    pub range_end: usize,
    /// Rows per page.
    pub page_size: usize,
    /// Total rows in the ordered sequence.
    pub total_rows: usize,
}

/// A page window over an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Zero-based, half-open slice bounds into the ordered sequence.
    pub range: Range<usize>,
    /// Display metadata.
    pub info: PageInfo,
}

impl PageWindow {
    /// Slices the visible part of an ordered sequence.
    pub fn slice<'a, T>(&self, ordered: &'a [T]) -> &'a [T] {
        &ordered[self.range.clone()]
    }
}

/// Page index and page size.
///
/// The index is re-clamped against the row count on every [`paginate`]
/// call, so a shrinking dataset lands on its last valid page.
///
/// [`paginate`]: Paginator::paginate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    page_index: usize,
    page_size: usize,
    total_rows: usize,
}

impl Paginator {
    /// Creates a paginator on the first page. A zero size is treated as one.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
            total_rows: 0,
        }
    }

    /// Returns the current page index.
    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Returns the current page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total pages for `total_rows` rows: `max(1, ceil(total_rows / page_size))`.
    pub fn total_pages_for(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size).max(1)
    }

    /// Total pages for the last paginated row count.
    pub fn total_pages(&self) -> usize {
        self.total_pages_for(self.total_rows)
    }

    /// Changes the page size and returns to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page_index = 0;
    }

    /// Jumps to a page, clamped to the last page.
    pub fn go_to(&mut self, page_index: usize) {
        self.page_index = page_index.min(self.total_pages() - 1);
    }

    /// Moves forward one page. No-op on the last page.
    pub fn next(&mut self) {
        self.go_to(self.page_index.saturating_add(1));
    }

    /// Moves back one page. No-op on the first page.
    pub fn previous(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    /// Returns to the first page.
    pub fn reset(&mut self) {
        self.page_index = 0;
    }

    /// Clamps the index against `total_rows` and computes the window.
    ///
    /// # Example
    ///
    /// ```
    /// use productlist_lib::page::Paginator;
    ///
    /// let mut pages = Paginator::new(20);
    /// pages.paginate(45);
    /// pages.go_to(2);
    /// let window = pages.paginate(45);
    /// assert_eq!((window.info.range_start, window.info.range_end), (41, 45));
    ///
    /// let window = pages.paginate(30);
    /// assert_eq!(window.info.page_index, 1);
    /// assert_eq!((window.info.range_start, window.info.range_end), (21, 30));
    /// ```
    pub fn paginate(&mut self, total_rows: usize) -> PageWindow {
        self.total_rows = total_rows;
        let total_pages = self.total_pages();
        self.page_index = self.page_index.min(total_pages - 1);

        let start = (self.page_index * self.page_size).min(total_rows);
        let end = (start + self.page_size).min(total_rows);
        let (range_start, range_end) = if start < end { (start + 1, end) } else { (0, 0) };

        PageWindow {
            range: start..end,
            info: PageInfo {
                page_index: self.page_index,
                total_pages,
                range_start,
                range_end,
                page_size: self.page_size,
                total_rows,
            },
        }
    }
}
