//! Numbered pagination links.

use serde::Serialize;

use crate::api::models::pagination::PageInfo;

/// Page numbers shown around the current page.
const WINDOW: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PagerItem {
    Page { number: u32, href: String, current: bool },
    Gap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pager {
    pub page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub prev: Option<String>,
    pub next: Option<String>,
    pub items: Vec<PagerItem>,
}

impl Pager {
    /// Links for `base_path`, keeping the non-empty `filters`. `None` for a single page: the
    /// pager is only rendered when there is somewhere to go.
    pub fn build(info: &PageInfo, base_path: &str, filters: &[(&str, &str)]) -> Option<Pager> {
        let total_pages = info.total_pages;
        if total_pages <= 1 {
            return None;
        }
        let page = info.page.clamp(1, total_pages);
        let href = |n: u32| page_href(base_path, filters, n);

        let mut start = page.saturating_sub(WINDOW / 2).max(1);
        let end = start.saturating_add(WINDOW - 1).min(total_pages);
        start = end.saturating_sub(WINDOW - 1).max(1);

        let mut items = Vec::new();
        if start > 1 {
            items.push(PagerItem::Page {
                number: 1,
                href: href(1),
                current: false,
            });
            if start > 2 {
                items.push(PagerItem::Gap);
            }
        }
        items.extend((start..=end).map(|n| PagerItem::Page {
            number: n,
            href: href(n),
            current: n == page,
        }));
        if end < total_pages {
            if end < total_pages - 1 {
                items.push(PagerItem::Gap);
            }
            items.push(PagerItem::Page {
                number: total_pages,
                href: href(total_pages),
                current: false,
            });
        }

        Some(Pager {
            page,
            total_pages,
            total: info.total,
            prev: (page > 1).then(|| href(page - 1)),
            next: (page < total_pages).then(|| href(page + 1)),
            items,
        })
    }
}

fn page_href(base_path: &str, filters: &[(&str, &str)], page: u32) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in filters.iter().filter(|(_, v)| !v.trim().is_empty()) {
        query.append_pair(key, value);
    }
    query.append_pair("page", &page.to_string());
    format!("{base_path}?{}", query.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(page: u32, total_pages: u32) -> PageInfo {
        PageInfo {
            page,
            per_page: 20,
            total: u64::from(total_pages) * 20,
            total_pages,
        }
    }

    fn numbers(pager: &Pager) -> Vec<Option<u32>> {
        pager
            .items
            .iter()
            .map(|item| match item {
                PagerItem::Page { number, .. } => Some(*number),
                PagerItem::Gap => None,
            })
            .collect()
    }

    #[test]
    fn test_hidden_for_single_page() {
        assert!(Pager::build(&info(1, 1), "/brands", &[]).is_none());
        assert!(Pager::build(&info(1, 0), "/brands", &[]).is_none());
        assert!(Pager::build(&info(1, 2), "/brands", &[]).is_some());
    }

    #[test]
    fn test_window_in_the_middle() {
        let pager = Pager::build(&info(10, 20), "/brands", &[]).unwrap();
        assert_eq!(
            numbers(&pager),
            vec![Some(1), None, Some(8), Some(9), Some(10), Some(11), Some(12), None, Some(20)]
        );
        assert_eq!(pager.prev.as_deref(), Some("/brands?page=9"));
        assert_eq!(pager.next.as_deref(), Some("/brands?page=11"));
    }

    #[test]
    fn test_window_at_edges() {
        let pager = Pager::build(&info(1, 7), "/brands", &[]).unwrap();
        assert_eq!(numbers(&pager), vec![Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(7)]);
        assert_eq!(pager.prev, None);

        let pager = Pager::build(&info(7, 7), "/brands", &[]).unwrap();
        assert_eq!(numbers(&pager), vec![Some(1), None, Some(3), Some(4), Some(5), Some(6), Some(7)]);
        assert_eq!(pager.next, None);

        let pager = Pager::build(&info(2, 3), "/brands", &[]).unwrap();
        assert_eq!(numbers(&pager), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_no_gap_next_to_neighbour() {
        let pager = Pager::build(&info(4, 6), "/x", &[]).unwrap();
        assert_eq!(numbers(&pager), vec![Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]);
    }

    #[test]
    fn test_links_keep_filters() {
        let pager = Pager::build(&info(1, 3), "/brands", &[("search", "sam sung"), ("status", "")]).unwrap();
        assert_eq!(pager.next.as_deref(), Some("/brands?search=sam+sung&page=2"));
    }

    #[test]
    fn test_page_beyond_total_is_clamped() {
        let pager = Pager::build(&info(50, 3), "/brands", &[]).unwrap();
        assert_eq!(pager.page, 3);
        assert_eq!(pager.next, None);
    }

    #[test]
    fn test_pager_at_largest_page_number() {
        let pager = Pager::build(&info(u32::MAX, u32::MAX), "/brands", &[]).unwrap();
        assert_eq!(pager.page, u32::MAX);
        assert!(pager.next.is_none());
        assert_eq!(numbers(&pager).last(), Some(&Some(u32::MAX)));
    }
}
