//! Page-number pagination over counted result sets.
//!
//! Page numbers are 1-based. Lookups are lenient: a missing or malformed
//! number yields the first page and an out-of-range one yields the last,
//! so a listing never fails because of its `page` parameter.

/// Posts shown per listing page.
pub const POSTS_PER_PAGE: u64 = 10;

/// Splits `count` items into pages of `per_page`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    count: u64,
    per_page: u64,
}

/// The slice of the result set that makes up one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub offset: u64,
    pub limit: u64,
}

impl Paginator {
    pub fn new(count: u64, per_page: u64) -> Self {
        Self {
            count,
            per_page: per_page.max(1),
        }
    }

    /// Number of pages; an empty result set still has one empty page.
    pub fn num_pages(&self) -> u64 {
        if self.count == 0 {
            1
        } else {
            self.count.div_ceil(self.per_page)
        }
    }

    /// Resolve a raw `page` query value to a window.
    pub fn get_page(&self, raw: Option<&str>) -> PageWindow {
        let number = match raw.and_then(parse_page_number) {
            None => 1,
            Some(n) if n < 1 || n > self.num_pages() as i64 => self.num_pages(),
            Some(n) => n as u64,
        };

        PageWindow {
            number,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }

    /// Attach the fetched items for `window` to build a page.
    pub fn page<T>(&self, window: PageWindow, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: window.number,
            num_pages: self.num_pages(),
            count: self.count,
        }
    }
}

/// Integers only; `"2.0"` or `"1e1"` count as malformed.
fn parse_page_number(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// One page of items plus its position in the whole result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_next() || self.has_previous()
    }

    pub fn next_page_number(&self) -> u64 {
        (self.number + 1).min(self.num_pages)
    }

    pub fn previous_page_number(&self) -> u64 {
        self.number.saturating_sub(1).max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert the items, keeping the page position.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
        }
    }
}
