use serde::{Deserialize, Serialize};

/// Page sizes a directory can offer, ascending.
pub const PAGE_SIZE_LADDER: [usize; 6] = [15, 30, 50, 100, 200, 500];

pub const DEFAULT_PAGE_SIZE: usize = PAGE_SIZE_LADDER[0];

/// Server-side pagination position. `size` is always one of `size_options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// 0-based; the backend is sent `index + 1`.
    pub index: usize,
    pub size: usize,
    pub total_count: usize,
    pub size_options: Vec<usize>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            index: 0,
            size: DEFAULT_PAGE_SIZE,
            total_count: 0,
            size_options: vec![DEFAULT_PAGE_SIZE],
        }
    }
}

impl PageState {
    pub fn page_count(&self) -> usize {
        if self.size == 0 {
            return 0;
        }
        self.total_count.div_ceil(self.size)
    }

    pub fn last_index(&self) -> usize {
        self.page_count().saturating_sub(1)
    }

    /// 1-based page number as the backend expects it.
    pub fn backend_page(&self) -> usize {
        self.index + 1
    }
}
