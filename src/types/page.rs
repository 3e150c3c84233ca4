// SPDX-License-Identifier: MPL-2.0

use serde::Serialize;

/// One page of a listing, with the numbers a pager needs.
///
/// Page numbers are 1-based. Requests outside the valid range are clamped
/// rather than rejected: anything below 1 reads the first page, anything past
/// the end reads the last page. An empty listing still has one (empty) page.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Number of pages needed for `total_items`, never less than 1.
pub(crate) fn total_pages(total_items: i64, page_size: i64) -> i64 {
    if total_items <= 0 {
        return 1;
    }
    (total_items + page_size - 1) / page_size
}

/// Clamp a requested page number into `1..=total_pages`.
pub(crate) fn clamp_page(requested: i64, total_pages: i64) -> i64 {
    requested.max(1).min(total_pages)
}
