//! Paged list container
//!
//! A `PagedList` is one window over an ordered, already filtered result set,
//! together with the metadata clients need to walk the remaining pages.

use serde::{Deserialize, Serialize};

/// Paging metadata, sent to clients in the `X-Pagination` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaData {
    /// Current page number (1-indexed)
    pub current_page: u32,
    /// Number of pages needed for `total_count` items
    pub total_pages: u64,
    /// Number of items per page
    pub page_size: u32,
    /// Total number of items across all pages
    pub total_count: u64,
}

impl MetaData {
    /// Build metadata for a result of `total_count` items
    pub fn new(total_count: u64, page_number: u32, page_size: u32) -> Self {
        let page_size = page_size.max(1);
        Self {
            current_page: page_number.max(1),
            total_pages: (total_count + page_size as u64 - 1) / page_size as u64,
            page_size,
            total_count,
        }
    }

    /// Check if there is a previous page
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Check if there is a next page
    pub fn has_next(&self) -> bool {
        (self.current_page as u64) < self.total_pages
    }
}

/// Items of the current page plus paging metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedList<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Paging metadata
    pub meta_data: MetaData,
}

impl<T> PagedList<T> {
    /// Wrap an already sliced page
    pub fn new(items: Vec<T>, total_count: u64, page_number: u32, page_size: u32) -> Self {
        Self {
            items,
            meta_data: MetaData::new(total_count, page_number, page_size),
        }
    }

    /// Slice one page out of the full ordered `source`.
    ///
    /// Pages past the end yield no items but keep valid metadata.
    pub fn to_paged_list(source: Vec<T>, page_number: u32, page_size: u32) -> Self {
        let page_number = page_number.max(1);
        let page_size = page_size.max(1);
        let total_count = source.len() as u64;
        let skip = (page_number as usize - 1).saturating_mul(page_size as usize);

        let items = source
            .into_iter()
            .skip(skip)
            .take(page_size as usize)
            .collect();

        Self::new(items, total_count, page_number, page_size)
    }

    /// Convert the items while keeping the metadata
    pub fn map<U, F>(self, f: F) -> PagedList<U>
    where
        F: FnMut(T) -> U,
    {
        PagedList {
            items: self.items.into_iter().map(f).collect(),
            meta_data: self.meta_data,
        }
    }

    /// Check if the page is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items in the current page
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page_of_two() {
        let paged = PagedList::to_paged_list(vec![("Ann", 30), ("Bo", 40)], 1, 1);

        assert_eq!(paged.items, vec![("Ann", 30)]);
        assert_eq!(
            paged.meta_data,
            MetaData {
                current_page: 1,
                total_pages: 2,
                page_size: 1,
                total_count: 2,
            }
        );
        assert!(!paged.meta_data.has_previous());
        assert!(paged.meta_data.has_next());
    }

    #[test]
    fn test_last_partial_page() {
        let paged = PagedList::to_paged_list((1..=7).collect::<Vec<_>>(), 3, 3);

        assert_eq!(paged.items, vec![7]);
        assert_eq!(paged.meta_data.total_pages, 3);
        assert!(paged.meta_data.has_previous());
        assert!(!paged.meta_data.has_next());
    }

    #[test]
    fn test_page_past_the_end_is_empty() {
        let paged = PagedList::to_paged_list(vec![1, 2, 3], 5, 2);

        assert!(paged.is_empty());
        assert_eq!(paged.meta_data.current_page, 5);
        assert_eq!(paged.meta_data.total_pages, 2);
        assert_eq!(paged.meta_data.total_count, 3);
    }

    #[test]
    fn test_zero_page_size_is_forced_to_one() {
        let paged = PagedList::to_paged_list(vec!['a', 'b'], 1, 0);

        assert_eq!(paged.len(), 1);
        assert_eq!(paged.meta_data.page_size, 1);
        assert_eq!(paged.meta_data.total_pages, 2);
    }

    #[test]
    fn test_empty_source() {
        let paged: PagedList<i32> = PagedList::to_paged_list(Vec::new(), 1, 10);

        assert!(paged.is_empty());
        assert_eq!(paged.meta_data.total_pages, 0);
        assert!(!paged.meta_data.has_next());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let paged = PagedList::to_paged_list(vec![1, 2, 3], 2, 2).map(|n| n * 10);

        assert_eq!(paged.items, vec![30]);
        assert_eq!(paged.meta_data.current_page, 2);
    }

    #[test]
    fn test_metadata_serializes_camel_case() {
        let json = serde_json::to_value(MetaData::new(2, 1, 1)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "currentPage": 1,
                "totalPages": 2,
                "pageSize": 1,
                "totalCount": 2
            })
        );
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A page never holds more than `page_size` items and never invents items
        #[test]
        fn page_is_a_window_of_the_source(
            source in prop::collection::vec(any::<i32>(), 0..60),
            page_number in 1u32..20,
            page_size in 1u32..15,
        ) {
            let paged = PagedList::to_paged_list(source.clone(), page_number, page_size);
            let skip = ((page_number - 1) * page_size) as usize;

            prop_assert!(paged.len() <= page_size as usize);
            prop_assert_eq!(paged.meta_data.total_count, source.len() as u64);

            let expected: Vec<i32> = source.iter().copied().skip(skip).take(page_size as usize).collect();
            prop_assert_eq!(paged.items, expected);
        }

        /// Pages beyond `total_pages` are empty
        #[test]
        fn pages_past_total_are_empty(
            source in prop::collection::vec(any::<u8>(), 0..40),
            page_size in 1u32..10,
            extra in 1u32..5,
        ) {
            let total_pages = MetaData::new(source.len() as u64, 1, page_size).total_pages as u32;
            let paged = PagedList::to_paged_list(source, total_pages + extra, page_size);

            prop_assert!(paged.is_empty());
            prop_assert_eq!(paged.meta_data.total_pages, total_pages as u64);
        }

        /// Walking every page yields the source back in order
        #[test]
        fn pages_cover_the_source(
            source in prop::collection::vec(any::<i16>(), 0..50),
            page_size in 1u32..12,
        ) {
            let total_pages = MetaData::new(source.len() as u64, 1, page_size).total_pages as u32;
            let mut collected = Vec::new();
            for page in 1..=total_pages {
                collected.extend(PagedList::to_paged_list(source.clone(), page, page_size).items);
            }
            prop_assert_eq!(collected, source);
        }
    }
}
