//! # Pagination
//!
//! Pure page arithmetic shared by every post listing. Nothing here touches
//! storage: `Paginator::locate` turns a total and a requested page into the
//! window a repository should fetch, and `Paginator::paginate` slices an
//! in-memory collection with the same rules.
//!
//! Out-of-range requests never fail. A missing or non-numeric page is page 1;
//! anything past the last page, or below 1, is the last page.

use std::ops::RangeInclusive;

use serde::Serialize;

/// Posts per listing page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// A page number as requested by the client, before it is clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest(i64);

impl PageRequest {
    pub fn first() -> Self {
        PageRequest(1)
    }

    pub fn number(n: i64) -> Self {
        PageRequest(n)
    }

    /// The page number as requested, before clamping.
    pub fn requested(&self) -> i64 {
        self.0
    }

    /// Parses the raw `?page=` value.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<i64>().ok())
            .map(PageRequest)
            .unwrap_or_else(PageRequest::first)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::first()
    }
}

/// Navigation metadata for one page of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    /// 1-based, always within `1..=num_pages`.
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    /// Size of the whole collection.
    pub total: u64,
}

impl PageMeta {
    pub fn offset(&self) -> u64 {
        (self.number - 1) * self.per_page
    }

    pub fn limit(&self) -> u64 {
        self.per_page
    }

    /// Number of items on this page.
    pub fn len(&self) -> u64 {
        self.per_page.min(self.total.saturating_sub(self.offset()))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next().then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous().then(|| self.number - 1)
    }

    /// 1-based index of the first item on the page, 0 for an empty collection.
    pub fn start_index(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            self.offset() + 1
        }
    }

    /// 1-based index of the last item on the page.
    pub fn end_index(&self) -> u64 {
        self.offset() + self.len()
    }

    pub fn page_range(&self) -> RangeInclusive<u64> {
        1..=self.num_pages
    }
}

/// A bounded slice of an ordered collection plus navigation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn from_parts(items: Vec<T>, meta: PageMeta) -> Self {
        Self { items, meta }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Paginator {
    /// A page size of zero is treated as one.
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1) as u64,
        }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// An empty collection still has one (empty) page.
    pub fn num_pages(&self, total: u64) -> u64 {
        if total == 0 {
            1
        } else {
            total.div_ceil(self.per_page)
        }
    }

    pub fn locate(&self, total: u64, request: PageRequest) -> PageMeta {
        let num_pages = self.num_pages(total);
        let number = match u64::try_from(request.0) {
            Ok(n) if (1..=num_pages).contains(&n) => n,
            _ => num_pages,
        };
        PageMeta {
            number,
            num_pages,
            per_page: self.per_page,
            total,
        }
    }

    pub fn paginate<T>(&self, items: Vec<T>, request: PageRequest) -> Page<T> {
        let meta = self.locate(items.len() as u64, request);
        let items = items
            .into_iter()
            .skip(meta.offset() as usize)
            .take(meta.limit() as usize)
            .collect();
        Page::from_parts(items, meta)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Paginator::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults_to_first_page() {
        assert_eq!(PageRequest::parse(None), PageRequest::first());
        assert_eq!(PageRequest::parse(Some("abc")), PageRequest::first());
        assert_eq!(PageRequest::parse(Some("2.0")), PageRequest::first());
        assert_eq!(PageRequest::parse(Some("")), PageRequest::first());
        assert_eq!(PageRequest::parse(Some("3")), PageRequest::number(3));
    }

    #[test]
    fn test_page_counts_follow_ceiling_division() {
        for per_page in 1..=5usize {
            let paginator = Paginator::new(per_page);
            for total in 1..=23usize {
                let items: Vec<usize> = (0..total).collect();
                let expected_pages = total.div_ceil(per_page);

                let first = paginator.paginate(items.clone(), PageRequest::first());
                assert_eq!(first.meta.num_pages as usize, expected_pages);
                assert_eq!(first.len(), per_page.min(total));

                let last = paginator.paginate(items, PageRequest::number(expected_pages as i64));
                let remainder = total % per_page;
                let expected_last = if remainder == 0 { per_page } else { remainder };
                assert_eq!(last.len(), expected_last, "per_page={per_page} total={total}");
            }
        }
    }

    #[test]
    fn test_empty_collection_has_one_empty_page() {
        let page = Paginator::new(10).paginate(Vec::<u8>::new(), PageRequest::number(4));
        assert_eq!(page.meta.number, 1);
        assert_eq!(page.meta.num_pages, 1);
        assert!(page.is_empty());
        assert_eq!(page.meta.start_index(), 0);
        assert!(!page.meta.has_next() && !page.meta.has_previous());
    }

    #[test]
    fn test_out_of_range_requests_land_on_last_page() {
        let paginator = Paginator::new(10);
        let items: Vec<u32> = (0..13).collect();

        let beyond = paginator.paginate(items.clone(), PageRequest::number(99));
        assert_eq!(beyond.meta.number, 2);
        assert_eq!(beyond.items, vec![10, 11, 12]);

        let zero = paginator.paginate(items.clone(), PageRequest::number(0));
        assert_eq!(zero.meta.number, 2);

        let negative = paginator.paginate(items, PageRequest::number(-1));
        assert_eq!(negative.meta.number, 2);
    }

    #[test]
    fn test_navigation_metadata() {
        let meta = Paginator::new(10).locate(25, PageRequest::number(2));
        assert_eq!(meta.offset(), 10);
        assert!(meta.has_next());
        assert!(meta.has_previous());
        assert_eq!(meta.next_page_number(), Some(3));
        assert_eq!(meta.previous_page_number(), Some(1));
        assert_eq!(meta.start_index(), 11);
        assert_eq!(meta.end_index(), 20);
        assert_eq!(meta.page_range().collect::<Vec<_>>(), vec![1, 2, 3]);

        let last = Paginator::new(10).locate(25, PageRequest::number(3));
        assert_eq!(last.len(), 5);
        assert_eq!(last.next_page_number(), None);
        assert_eq!(last.end_index(), 25);
    }

    #[test]
    fn test_paginate_is_deterministic() {
        let paginator = Paginator::new(3);
        let a = paginator.paginate(vec!['a', 'b', 'c', 'd'], PageRequest::number(2));
        let b = paginator.paginate(vec!['a', 'b', 'c', 'd'], PageRequest::number(2));
        assert_eq!(a, b);
        assert_eq!(a.items, vec!['d']);
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        assert_eq!(Paginator::new(0).per_page(), 1);
    }
}
