//! Page arithmetic for the list view.
//!
//! Pages are 1-based. A page maps to a `(start, limit)` window on the remote
//! record set, and to a short row of page-selector buttons centred on it.
//! The total record count is not known to the remote API's list endpoint, so
//! callers pass it in; `ASSUMED_TOTAL_TODOS` is the fixed approximation the
//! application uses unless told to count.

use std::fmt;

use thiserror::Error;

/// Records per page shown by the list view.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Known size of the demo data set. Not queried.
pub const ASSUMED_TOTAL_TODOS: u64 = 200;

/// Page selector buttons shown at once.
pub const MAX_PAGE_BUTTONS: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("pages are numbered from 1")]
    ZeroPage,

    #[error("page size must be positive")]
    ZeroPageSize,

    #[error("page {page} is outside 1..={total_pages}")]
    OutOfRange { page: u64, total_pages: u64 },

    #[error("page {page} of {items_per_page} items starts past the end of the addressable range")]
    Overflow { page: u64, items_per_page: u64 },
}

/// A contiguous slice `[start, start + limit)` of the remote record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageWindow {
    pub start: u64,
    pub limit: u64,
}

impl PageWindow {
    /// The 1-based page this window starts, if it is page-aligned.
    pub fn page(&self) -> Option<u64> {
        if self.limit == 0 || self.start % self.limit != 0 {
            return None;
        }
        Some(self.start / self.limit + 1)
    }
}

impl fmt::Display for PageWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}+{}]", self.start, self.limit)
    }
}

pub fn window_for(page: u64, items_per_page: u64) -> Result<PageWindow, PaginationError> {
    if page == 0 {
        return Err(PaginationError::ZeroPage);
    }
    if items_per_page == 0 {
        return Err(PaginationError::ZeroPageSize);
    }
    let start = (page - 1)
        .checked_mul(items_per_page)
        .ok_or(PaginationError::Overflow { page, items_per_page })?;
    Ok(PageWindow {
        start,
        limit: items_per_page,
    })
}

pub fn total_pages(total_items: u64, items_per_page: u64) -> u64 {
    if items_per_page == 0 {
        return 0;
    }
    total_items.div_ceil(items_per_page)
}

/// Page numbers to offer as buttons around `current_page`.
///
/// The window is centred on `current_page` and shifted, never shrunk, to stay
/// inside `[1, total_pages]`, so it always holds `min(max_buttons,
/// total_pages)` entries. `current_page` is not clamped: a page past the end
/// still yields the last full window.
pub fn visible_page_buttons(current_page: u64, total_pages: u64, max_buttons: u64) -> Vec<u64> {
    if total_pages == 0 || max_buttons == 0 {
        return Vec::new();
    }
    let half = max_buttons / 2;
    let mut first = current_page.saturating_sub(half).max(1);
    let last = first.saturating_add(max_buttons - 1).min(total_pages);
    if last + 1 < first.saturating_add(max_buttons) {
        first = (last + 1).saturating_sub(max_buttons).max(1);
    }
    (first..=last).collect()
}

/// Everything the list footer needs to describe one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u64,
    pub items_per_page: u64,
    pub total_items: u64,
}

impl PageInfo {
    pub fn new(page: u64, items_per_page: u64, total_items: u64) -> Result<Self, PaginationError> {
        window_for(page, items_per_page)?;
        Ok(Self {
            page,
            items_per_page,
            total_items,
        })
    }

    /// The same page set, moved onto its last page if `page` lies past it.
    pub fn clamped(self) -> Self {
        Self {
            page: self.page.min(self.last_page()),
            ..self
        }
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            start: (self.page - 1).saturating_mul(self.items_per_page),
            limit: self.items_per_page,
        }
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total_items, self.items_per_page)
    }

    /// Highest page a caller may visit. An empty record set still has
    /// page 1, shown as empty.
    pub fn last_page(&self) -> u64 {
        self.total_pages().max(1)
    }

    /// 1-based index of the first record on the page.
    pub fn first_item(&self) -> u64 {
        self.window().start.saturating_add(1)
    }

    /// 1-based index of the last record on the page.
    pub fn last_item(&self) -> u64 {
        self.window()
            .start
            .saturating_add(self.items_per_page)
            .min(self.total_items)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn buttons(&self) -> Vec<u64> {
        visible_page_buttons(self.page, self.total_pages(), MAX_PAGE_BUTTONS)
    }

    /// Check `page` against this page set, for callers about to navigate.
    pub fn check_page(&self, page: u64) -> Result<u64, PaginationError> {
        let total_pages = self.last_page();
        if page == 0 || page > total_pages {
            return Err(PaginationError::OutOfRange { page, total_pages });
        }
        Ok(page)
    }
}

impl fmt::Display for PageInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} results",
            self.first_item(),
            self.last_item(),
            self.total_items
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_for_is_offset_by_page() {
        for page in 1..=30 {
            for n in [1, 7, 10, 25] {
                let w = window_for(page, n).unwrap();
                assert_eq!(w.start, (page - 1) * n);
                assert_eq!(w.limit, n);
                assert_eq!(w.page(), Some(page));
            }
        }
    }

    #[test]
    fn window_for_rejects_zero() {
        assert_eq!(window_for(0, 10), Err(PaginationError::ZeroPage));
        assert_eq!(window_for(1, 0), Err(PaginationError::ZeroPageSize));
    }

    #[test]
    fn window_for_huge_page_is_an_error() {
        assert_eq!(
            window_for(u64::MAX, 10),
            Err(PaginationError::Overflow { page: u64::MAX, items_per_page: 10 })
        );
        assert!(PageInfo::new(u64::MAX, 10, 200).is_err());
        assert_eq!(window_for(u64::MAX, 1).unwrap().start, u64::MAX - 1);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(200, 10), 20);
        assert_eq!(total_pages(201, 10), 21);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn buttons_are_increasing_in_range_and_contain_current() {
        for total in 1..=30 {
            for current in 1..=total {
                let buttons = visible_page_buttons(current, total, MAX_PAGE_BUTTONS);
                assert_eq!(buttons.len() as u64, total.min(5), "total {total} current {current}");
                assert!(buttons.windows(2).all(|w| w[0] < w[1]));
                assert!(buttons.iter().all(|b| (1..=total).contains(b)));
                assert!(buttons.contains(&current));
            }
        }
    }

    #[test]
    fn buttons_centre_on_current_page() {
        assert_eq!(visible_page_buttons(1, 20, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(visible_page_buttons(10, 20, 5), vec![8, 9, 10, 11, 12]);
        assert_eq!(visible_page_buttons(20, 20, 5), vec![16, 17, 18, 19, 20]);
        assert_eq!(visible_page_buttons(2, 3, 5), vec![1, 2, 3]);
    }

    #[test]
    fn buttons_past_the_end_stay_in_range() {
        assert_eq!(visible_page_buttons(25, 20, 5), vec![16, 17, 18, 19, 20]);
        assert_eq!(visible_page_buttons(9, 2, 5), vec![1, 2]);
        assert_eq!(visible_page_buttons(u64::MAX, 20, 5), vec![16, 17, 18, 19, 20]);
        assert_eq!(visible_page_buttons(u64::MAX, u64::MAX, 5).len(), 5);
    }

    #[test]
    fn clamped_moves_past_the_end_onto_last_page() {
        let info = PageInfo::new(25, 10, 200).unwrap().clamped();
        assert_eq!(info.page, 20);
        assert_eq!(info.to_string(), "Showing 191 to 200 of 200 results");
        assert!(!info.has_next());

        let info = PageInfo::new(3, 10, 200).unwrap().clamped();
        assert_eq!(info.page, 3);
    }

    #[test]
    fn empty_record_set_keeps_page_one() {
        let info = PageInfo::new(4, 10, 0).unwrap().clamped();
        assert_eq!(info.page, 1);
        assert_eq!(info.check_page(1), Ok(1));
        assert!(!info.has_previous());
        assert!(!info.has_next());
        assert_eq!(
            info.check_page(2),
            Err(PaginationError::OutOfRange { page: 2, total_pages: 1 })
        );
    }

    #[test]
    fn last_page_summary() {
        let info = PageInfo::new(20, 10, ASSUMED_TOTAL_TODOS).unwrap();
        assert_eq!(info.window(), PageWindow { start: 190, limit: 10 });
        assert_eq!(info.to_string(), "Showing 191 to 200 of 200 results");
        assert!(info.has_previous());
        assert!(!info.has_next());
    }

    #[test]
    fn first_page_disables_previous() {
        let info = PageInfo::new(1, 10, 200).unwrap();
        assert_eq!(info.to_string(), "Showing 1 to 10 of 200 results");
        assert!(!info.has_previous());
        assert!(info.has_next());
    }

    #[test]
    fn partial_last_page_summary() {
        let info = PageInfo::new(3, 10, 25).unwrap();
        assert_eq!(info.to_string(), "Showing 21 to 25 of 25 results");
        assert!(!info.has_next());
    }

    #[test]
    fn check_page_rejects_out_of_range() {
        let info = PageInfo::new(1, 10, 200).unwrap();
        assert_eq!(info.check_page(20), Ok(20));
        assert_eq!(
            info.check_page(21),
            Err(PaginationError::OutOfRange { page: 21, total_pages: 20 })
        );
        assert!(info.check_page(0).is_err());
    }
}
