use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 30;
/// Number of page links shown around the current page.
pub const PAGE_WINDOW: usize = 10;

pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(page_size)
}

/// The half-open slice `[page * page_size, (page + 1) * page_size)`, clipped to `items`.
/// Out-of-range pages yield an empty slice.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let Some(start) = page.checked_mul(page_size) else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Zero-based page numbers to offer for navigation: up to `PAGE_WINDOW` pages roughly
/// centred on `current`, shifted back when the window would run past the last page.
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    let mut start = current.saturating_sub(PAGE_WINDOW / 2);
    let mut end = start.saturating_add(PAGE_WINDOW);
    if end > total_pages {
        end = total_pages;
        start = end.saturating_sub(PAGE_WINDOW);
    }
    (start..end).collect()
}

/// Page metadata handed to the presentation layer alongside the page's jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub window: Vec<usize>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PageInfo {
    pub fn new(total_items: usize, page: usize, page_size: usize) -> Self {
        let total_pages = total_pages(total_items, page_size);
        Self {
            page,
            page_size,
            total_items,
            total_pages,
            window: page_window(page, total_pages),
            has_previous: page > 0,
            has_next: page.saturating_add(1) < total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ninety_five_items_make_four_pages() {
        let items: Vec<usize> = (0..95).collect();
        assert_eq!(total_pages(items.len(), 30), 4);
        assert_eq!(paginate(&items, 0, 30).len(), 30);
        assert_eq!(paginate(&items, 3, 30), &items[90..95]);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let items: Vec<usize> = (0..95).collect();
        assert!(paginate(&items, 10, 30).is_empty());
        assert!(paginate(&items, usize::MAX, 30).is_empty());
        assert!(paginate::<usize>(&[], 0, 30).is_empty());
    }

    #[test]
    fn test_zero_page_size_is_total() {
        let items = [1, 2, 3];
        assert_eq!(total_pages(3, 0), 0);
        assert!(paginate(&items, 0, 0).is_empty());
    }

    #[test]
    fn test_exact_multiple() {
        assert_eq!(total_pages(60, 30), 2);
        assert_eq!(total_pages(0, 30), 0);
    }

    #[test]
    fn test_window_shows_all_when_few_pages() {
        assert_eq!(page_window(0, 4), vec![0, 1, 2, 3]);
        assert_eq!(page_window(3, 4), vec![0, 1, 2, 3]);
        assert!(page_window(0, 0).is_empty());
    }

    #[test]
    fn test_window_centres_on_current() {
        assert_eq!(page_window(10, 50), (5..15).collect::<Vec<_>>());
        assert_eq!(page_window(2, 50), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_window_shifts_back_at_the_end() {
        assert_eq!(page_window(48, 50), (40..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_window_always_contains_current_page() {
        for total in 1..40 {
            for current in 0..total {
                let window = page_window(current, total);
                assert!(window.contains(&current), "page {current} of {total}");
                assert!(window.len() <= PAGE_WINDOW);
            }
        }
    }

    #[test]
    fn test_page_info_flags() {
        let info = PageInfo::new(95, 3, 30);
        assert_eq!(info.total_pages, 4);
        assert!(info.has_previous);
        assert!(!info.has_next);
        assert_eq!(info.window, vec![0, 1, 2, 3]);

        let first = PageInfo::new(95, 0, 30);
        assert!(!first.has_previous);
        assert!(first.has_next);
    }
}
