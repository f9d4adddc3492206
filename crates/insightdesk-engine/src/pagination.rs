use insightdesk_types::{DEFAULT_PAGE_SIZE, PAGE_SIZE_LADDER, PageState};

/// Derive the page-size menu and a valid page size from a result count.
///
/// The menu holds every ladder value that fits within `total_count`, plus the
/// first ladder value above it (when there is one), so there is always a
/// choice that shows every result on one page. A requested size that is not
/// on the menu falls back to the smallest ladder value.
///
/// The returned state is positioned on the first page; callers that keep a
/// page position set `index` themselves.
pub fn plan(total_count: usize, requested_size: usize) -> PageState {
    let mut size_options: Vec<usize> = PAGE_SIZE_LADDER
        .iter()
        .copied()
        .take_while(|size| *size <= total_count)
        .collect();

    if let Some(next) = PAGE_SIZE_LADDER.get(size_options.len()) {
        size_options.push(*next);
    }

    let size = if size_options.contains(&requested_size) {
        requested_size
    } else {
        DEFAULT_PAGE_SIZE
    };

    PageState {
        index: 0,
        size,
        total_count,
        size_options,
    }
}
