//! Pagination controls
//!
//! Page `i` gets a button when it is the first page, the last page, or
//! within one of the current page. Each run of skipped pages collapses
//! into a single ellipsis.

use serde::Serialize;

/// One item of the page-button strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageItem {
    Page(u64),
    Ellipsis,
}

/// Page buttons for `current` out of `total_pages`
pub fn page_window(total_pages: u64, current: u64) -> Vec<PageItem> {
    let mut items = Vec::new();
    let mut skipping = false;
    for i in 1..=total_pages {
        if i == 1 || i == total_pages || i.abs_diff(current) <= 1 {
            items.push(PageItem::Page(i));
            skipping = false;
        } else if !skipping {
            items.push(PageItem::Ellipsis);
            skipping = true;
        }
    }
    items
}

pub fn has_prev(current: u64) -> bool {
    current > 1
}

pub fn has_next(current: u64, total_pages: u64) -> bool {
    current < total_pages
}

/// 1-based inclusive row range shown on `page`, `None` when there are no rows
pub fn showing_range(page: u64, page_size: u64, total: u64) -> Option<(u64, u64)> {
    if total == 0 || page_size == 0 {
        return None;
    }
    let start = (page.max(1) - 1) * page_size + 1;
    if start > total {
        return None;
    }
    Some((start, (start + page_size - 1).min(total)))
}

/// `Showing 26-50 of 120`
pub fn showing_label(page: u64, page_size: u64, total: u64) -> String {
    match showing_range(page, page_size, total) {
        Some((start, end)) => format!("Showing {}-{} of {}", start, end, total),
        None => "Showing 0 of 0".to_string(),
    }
}
