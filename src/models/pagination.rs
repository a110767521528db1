use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PageArgs {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PageArgs {
    /// 1-based page number.
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> u64 {
        (self.page() - 1).saturating_mul(self.page_size())
    }
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: u64, args: &PageArgs) -> Self {
        let page = args.page();
        let last_page = count.div_ceil(args.page_size()).max(1);
        let next = (page < last_page).then_some(page + 1);
        let previous = (page > 1).then(|| (page - 1).min(last_page));
        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(page: Option<u64>, page_size: Option<u64>) -> PageArgs {
        PageArgs { page, page_size }
    }

    #[rstest]
    #[case(args(None, None), 1, 20, 0)]
    #[case(args(Some(3), Some(10)), 3, 10, 20)]
    #[case(args(Some(0), Some(0)), 1, 1, 0)]
    #[case(args(Some(2), Some(500)), 2, 100, 100)]
    fn normalises_arguments(
        #[case] args: PageArgs,
        #[case] page: u64,
        #[case] page_size: u64,
        #[case] offset: u64,
    ) {
        assert_eq!(args.page(), page);
        assert_eq!(args.page_size(), page_size);
        assert_eq!(args.offset(), offset);
    }

    #[rstest]
    #[case(args(Some(1), Some(20)), 45, Some(2), None)]
    #[case(args(Some(2), Some(20)), 45, Some(3), Some(1))]
    #[case(args(Some(3), Some(20)), 45, None, Some(2))]
    #[case(args(Some(1), Some(20)), 0, None, None)]
    #[case(args(Some(9), Some(20)), 45, None, Some(3))]
    fn links_neighbouring_pages(
        #[case] args: PageArgs,
        #[case] count: u64,
        #[case] next: Option<u64>,
        #[case] previous: Option<u64>,
    ) {
        let page = Page::<()>::new(vec![], count, &args);
        assert_eq!(page.next, next);
        assert_eq!(page.previous, previous);
    }
}
