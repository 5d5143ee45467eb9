//! Splitting post listings into fixed-size pages.
//!
//! The `?page=` parameter is resolved leniently: a missing or malformed value
//! shows the first page, and a number outside `1..=num_pages` shows the last
//! one. An empty listing still has a single, empty, first page.

use std::num::IntErrorKind;

use serde::Serialize;

use crate::{
    db::Repository,
    error::AppResult,
    models::{PostFilter, PostView},
};

/// Posts shown on one listing page.
pub const POSTS_PER_PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    total: usize,
    per_page: usize,
}

/// Slice of the ordered listing a page covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: usize,
    pub offset: usize,
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub num_pages: usize,
    pub total: usize,
}

/// One entry of the page switcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: usize,
    pub is_current: bool,
}

impl Paginator {
    pub fn new(total: usize, per_page: usize) -> Self {
        Paginator {
            total,
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self) -> usize {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    /// Resolve the raw `page` query value into a concrete slice.
    pub fn page_request(&self, raw: Option<&str>) -> PageRequest {
        let last = self.num_pages();
        let number = match raw.map(str::trim).map(str::parse::<i64>) {
            // Too large for i64 is still a number past the end
            Some(Err(e))
                if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) =>
            {
                last
            }
            None | Some(Err(_)) => 1,
            Some(Ok(n)) if n < 1 || n as u64 > last as u64 => last,
            Some(Ok(n)) => n as usize,
        };

        PageRequest {
            number,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }

    pub fn page<T>(&self, request: PageRequest, items: Vec<T>) -> Page<T> {
        Page {
            items,
            number: request.number,
            num_pages: self.num_pages(),
            total: self.total,
        }
    }
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    pub fn has_other_pages(&self) -> bool {
        self.num_pages > 1
    }

    pub fn previous_page_number(&self) -> usize {
        self.number.saturating_sub(1).max(1)
    }

    pub fn next_page_number(&self) -> usize {
        (self.number + 1).min(self.num_pages)
    }

    pub fn links(&self) -> Vec<PageLink> {
        (1..=self.num_pages)
            .map(|number| PageLink {
                number,
                is_current: number == self.number,
            })
            .collect()
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            total: self.total,
        }
    }
}

/// Fetch the requested page of posts matching `filter`, newest first.
pub async fn paginate(
    repo: &dyn Repository,
    filter: PostFilter,
    raw_page: Option<&str>,
    per_page: usize,
) -> AppResult<Page<PostView>> {
    let total = repo.count_posts(filter).await?;
    let paginator = Paginator::new(total, per_page);
    let request = paginator.page_request(raw_page);

    let items = repo.list_posts(filter, request.limit, request.offset).await?;
    Ok(paginator.page(request, items))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_pages() {
        assert_eq!(Paginator::new(0, 10).num_pages(), 1);
        assert_eq!(Paginator::new(10, 10).num_pages(), 1);
        assert_eq!(Paginator::new(13, 10).num_pages(), 2);
        assert_eq!(Paginator::new(21, 10).num_pages(), 3);
    }

    #[test]
    fn test_page_request_defaults_to_first_page() {
        let paginator = Paginator::new(13, 10);
        let first = PageRequest { number: 1, offset: 0, limit: 10 };
        assert_eq!(paginator.page_request(None), first);
        assert_eq!(paginator.page_request(Some("abc")), first);
        assert_eq!(paginator.page_request(Some("")), first);
    }

    #[test]
    fn test_page_request_second_page() {
        let request = Paginator::new(13, 10).page_request(Some("2"));
        assert_eq!(request, PageRequest { number: 2, offset: 10, limit: 10 });
    }

    #[test]
    fn test_out_of_range_shows_last_page() {
        let paginator = Paginator::new(13, 10);
        assert_eq!(paginator.page_request(Some("99")).number, 2);
        assert_eq!(paginator.page_request(Some("0")).number, 2);
        assert_eq!(paginator.page_request(Some("-1")).number, 2);
        assert_eq!(Paginator::new(0, 10).page_request(Some("5")).number, 1);
    }

    #[test]
    fn test_overflowing_page_number_shows_last_page() {
        let paginator = Paginator::new(13, 10);
        assert_eq!(paginator.page_request(Some("99999999999999999999")).number, 2);
        assert_eq!(paginator.page_request(Some("-99999999999999999999")).number, 2);
        assert_eq!(paginator.page_request(Some("9999999999999999999x")).number, 1);
    }

    #[test]
    fn test_page_navigation() {
        let paginator = Paginator::new(25, 10);
        let page = paginator.page(paginator.page_request(Some("2")), vec![0; 10]);
        assert!(page.has_previous());
        assert!(page.has_next());
        assert!(page.has_other_pages());
        assert_eq!(page.previous_page_number(), 1);
        assert_eq!(page.next_page_number(), 3);

        let links = page.links();
        assert_eq!(links.len(), 3);
        assert!(links[1].is_current);
        assert!(!links[0].is_current);
    }

    #[test]
    fn test_single_page_has_no_neighbours() {
        let paginator = Paginator::new(3, 10);
        let page = paginator.page(paginator.page_request(None), vec!["a", "b", "c"]);
        assert_eq!(page.len(), 3);
        assert!(!page.has_previous());
        assert!(!page.has_next());
        assert!(!page.has_other_pages());
    }

    #[test]
    fn test_map_keeps_position() {
        let paginator = Paginator::new(13, 10);
        let page = paginator
            .page(paginator.page_request(Some("2")), vec![1, 2, 3])
            .map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20, 30]);
        assert_eq!(page.number, 2);
        assert_eq!(page.num_pages, 2);
        assert_eq!(page.total, 13);
    }
}
