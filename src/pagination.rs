use crate::query::QueryDescriptor;

/// Previous/next page links for a result window.
///
/// The config service does not report totals, so `more` is only a guess: a
/// full page means there may be another one. When the backend holds an exact
/// multiple of the limit the last "next" link leads to an empty page.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PaginationWindow {
    pub less: Option<u64>,
    pub more: Option<u64>,
}

impl PaginationWindow {
    pub fn compute(page: u64, limit: u64, returned: usize) -> Self {
        let more = if returned as u64 == limit {
            Some(page.saturating_add(1))
        } else {
            None
        };
        let less = if page > 1 { Some(page - 1) } else { None };
        Self { less, more }
    }

    pub fn for_query(query: &QueryDescriptor, returned: usize) -> Self {
        Self::compute(query.page, query.limit, returned)
    }

    /// Token as templates see it; 0 means "no link".
    pub fn less_token(&self) -> u64 {
        self.less.unwrap_or(0)
    }

    pub fn more_token(&self) -> u64 {
        self.more.unwrap_or(0)
    }
}
