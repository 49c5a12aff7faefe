//! This modules defines the common functionality for paging data.

/// The config for pagination
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of records to return per page when not specified in a request.
    pub default_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 20,
        }
    }
}

/// A resolved page request, converted to the numbers SQL needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// The 1-based page number.
    pub number: u64,
    /// The maximum number of records on the page.
    pub size: u64,
}

impl Page {
    /// Resolve `page` and `page_size` from a request, falling back to the defaults in `config`.
    ///
    /// Zero values are replaced by one. Requests are validated before they get here.
    pub fn new(page: Option<u64>, page_size: Option<u64>, config: &PaginationConfig) -> Self {
        Self {
            number: page.unwrap_or(config.default_page).max(1),
            size: page_size.unwrap_or(config.default_page_size).max(1),
        }
    }

    /// The number of records to skip before the page starts.
    ///
    /// Clamped to the largest value SQLite accepts.
    pub fn offset(&self) -> i64 {
        i64::try_from((self.number - 1).saturating_mul(self.size)).unwrap_or(i64::MAX)
    }

    /// The number of records to take.
    pub fn limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::{Page, PaginationConfig};

    #[test]
    fn uses_defaults_when_unspecified() {
        let page = Page::new(None, None, &PaginationConfig::default());

        assert_eq!(page, Page { number: 1, size: 20 });
        assert_eq!(page.offset(), 0);
        assert_eq!(page.limit(), 20);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let page = Page::new(Some(3), Some(10), &PaginationConfig::default());

        assert_eq!(page.offset(), 20);
        assert_eq!(page.limit(), 10);
    }

    #[test]
    fn huge_pages_are_clamped() {
        let page = Page::new(Some(u64::MAX), Some(u64::MAX), &PaginationConfig::default());

        assert_eq!(page.offset(), i64::MAX);
        assert_eq!(page.limit(), i64::MAX);
    }
}
