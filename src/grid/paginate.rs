//! Page slicing

use std::ops::Range;

/// One page of a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_pages: usize,
}

/// Number of pages needed for `len` items; 0 when there are no items
pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Clamp a 1-based page number into `[1, max(1, total_pages)]`
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Index range of a 1-based page within a collection of `len` items.
/// Out-of-range pages (including page 0) give an empty range.
pub fn page_range(len: usize, page: usize, page_size: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    if page == 0 {
        return 0..0;
    }
    let start = (page - 1).saturating_mul(page_size).min(len);
    let end = page.saturating_mul(page_size).min(len);
    start..end
}

/// Slice out a 1-based page. Never fails: pages past the end are empty and
/// the last page may be short.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    Page {
        items: items[page_range(items.len(), page, page_size)].to_vec(),
        total_pages: total_pages(items.len(), page_size),
    }
}
