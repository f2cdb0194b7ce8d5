use crate::model::{BookSummary, PAGE_SIZE};
use crate::orchestrator::{SearchResult, SearchStatus};

/// Most page numbers shown at once in the pagination bar.
pub const PAGE_WINDOW: u32 = 5;

/// Number of placeholder cards shown while loading.
pub const SKELETON_CARDS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Skeleton,
    Error {
        message: String,
    },
    /// `query` is `None` before the first search.
    Empty {
        query: Option<String>,
    },
    Results {
        total: u64,
        items: Vec<BookSummary>,
        pagination: Option<Pagination>,
    },
}

/// Which panel to show for `result`, given the current query text and page.
pub fn select(result: &SearchResult, query_text: &str, page: u32) -> ViewState {
    match result.status {
        SearchStatus::Loading => ViewState::Skeleton,
        SearchStatus::Error => ViewState::Error {
            message: result
                .error_message
                .clone()
                .unwrap_or_else(|| "unknown error".to_owned()),
        },
        SearchStatus::Idle | SearchStatus::Success if result.items.is_empty() => {
            let query = query_text.trim();
            ViewState::Empty {
                query: (!query.is_empty()).then(|| query.to_owned()),
            }
        }
        SearchStatus::Idle | SearchStatus::Success => ViewState::Results {
            total: result.total_count,
            items: result.items.clone(),
            pagination: Pagination::new(page, result.total_count),
        },
    }
}

pub fn total_pages(total: u64) -> u32 {
    let pages = total.div_ceil(u64::from(PAGE_SIZE));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u32,
    pub total_pages: u32,
    pub total: u64,
    pub start: u32,
    pub end: u32,
}

impl Pagination {
    /// `None` when everything fits on one page.
    pub fn new(current: u32, total: u64) -> Option<Self> {
        let total_pages = total_pages(total);
        if total_pages <= 1 {
            return None;
        }
        // A page past the end still gets a window ending on the last page.
        let anchor = current.clamp(1, total_pages);
        let shown = PAGE_WINDOW.min(total_pages);
        let start = anchor.saturating_sub(shown / 2).max(1);
        let end = total_pages.min(start.saturating_add(shown - 1));
        Some(Self {
            current,
            total_pages,
            total,
            start,
            end,
        })
    }

    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages
    }
}
