//! The list pipeline: compute the visible slice of a collection from the
//! search, status filter, sort and page chosen in the UI.
//!
//! The steps always run in the same order: filter, then sort, then paginate.
//! The output is a pure function of the input collection and [ListParams].

use std::{cmp::Ordering, ops::Range, sync::Arc};

use serde::{Deserialize, Serialize};

/// A value extracted from a row for sorting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    Text(&'a str),
    Number(f64),
}

/// A row type that can be searched, filtered by status and sorted.
pub trait Listable {
    /// The fields the rows can be sorted by.
    type Column: Copy + Eq + std::fmt::Debug;

    /// Whether one of the searchable fields contains `needle`.
    ///
    /// `needle` is already lowercase and never empty.
    fn matches_search(&self, needle: &str) -> bool;

    /// The status used by the status filter, if the row has one.
    fn status_label(&self) -> Option<&str>;

    /// The value of `column` for this row, or `None` if the row has no value for it.
    fn sort_value(&self, column: Self::Column) -> Option<SortValue<'_>>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// The column and direction a list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<C> {
    pub column: C,
    pub direction: SortDirection,
}

impl<C: Copy + Eq> Sort<C> {
    pub fn ascending(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    pub fn descending(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }

    /// The sort that results from selecting `column` while `current` is active.
    ///
    /// Selecting the active column flips the direction, selecting any other
    /// column sorts by it in ascending order.
    pub fn toggled(current: Option<Self>, column: C) -> Self {
        match current {
            Some(sort) if sort.column == column => Self {
                column,
                direction: sort.direction.flipped(),
            },
            _ => Self::ascending(column),
        }
    }
}

/// Restricts a list to rows with a given status.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(String),
}

impl StatusFilter {
    /// The query string value that selects every status.
    pub const ALL_VALUE: &'static str = "all";

    /// Parse a filter from a query value, where an empty string or "all" selects everything.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();

        if value.is_empty() || value.eq_ignore_ascii_case(Self::ALL_VALUE) {
            StatusFilter::All
        } else {
            StatusFilter::Only(value.to_owned())
        }
    }

    /// Check `status` against the filter, ignoring case. A missing status only matches `All`.
    pub fn matches(&self, status: Option<&str>) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => {
                status.is_some_and(|status| status.eq_ignore_ascii_case(wanted))
            }
        }
    }

    pub fn as_query_value(&self) -> &str {
        match self {
            StatusFilter::All => Self::ALL_VALUE,
            StatusFilter::Only(status) => status,
        }
    }
}

/// The UI-controlled inputs of the pipeline.
///
/// Changing the search term or the status filter moves back to the first
/// page. Changing the sort keeps the current page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListParams<C> {
    pub search: String,
    pub status: StatusFilter,
    pub sort: Option<Sort<C>>,
    /// The 1-based page number.
    pub page: u64,
    /// The number of rows per page, `None` shows every row on one page.
    pub page_size: Option<u64>,
}

impl<C: Copy + Eq> ListParams<C> {
    pub fn new(page_size: Option<u64>) -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            sort: None,
            page: 1,
            page_size,
        }
    }

    pub fn with_search(self, search: &str) -> Self {
        Self {
            search: search.to_owned(),
            page: 1,
            ..self
        }
    }

    pub fn with_status(self, status: StatusFilter) -> Self {
        Self {
            status,
            page: 1,
            ..self
        }
    }

    pub fn with_sort(self, sort: Option<Sort<C>>) -> Self {
        Self { sort, ..self }
    }

    /// Sort by `column`, toggling the direction if it is already the sort column.
    pub fn sorted_by(self, column: C) -> Self {
        let sort = Sort::toggled(self.sort, column);
        self.with_sort(Some(sort))
    }

    pub fn with_page(self, page: u64) -> Self {
        Self {
            page: page.max(1),
            ..self
        }
    }
}

/// The slice of a collection to display.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView<T> {
    /// The rows on the current page.
    pub visible: Vec<T>,
    /// How many rows passed the filter, across all pages.
    pub filtered_count: usize,
    /// The number of pages, zero when no rows passed the filter.
    pub total_pages: u64,
    /// The 1-based page that `visible` was taken from.
    pub page: u64,
}

/// Keep the rows that match the search term and status filter.
///
/// The search is a case-insensitive substring match on the searchable fields.
pub fn filter_items<'a, T: Listable>(
    items: &'a [T],
    search: &str,
    status: &StatusFilter,
) -> Vec<&'a T> {
    if search.is_empty() && *status == StatusFilter::All {
        return items.iter().collect();
    }

    let needle = search.to_lowercase();

    items
        .iter()
        .filter(|item| needle.is_empty() || item.matches_search(&needle))
        .filter(|item| status.matches(item.status_label()))
        .collect()
}

/// Stable sort of `items` by the sort column.
///
/// Rows where either value is missing compare as equal, so they keep the
/// order they had before sorting.
pub fn sort_items<T: Listable>(items: &mut [&T], sort: Sort<T::Column>) {
    items.sort_by(|a, b| {
        let a = a.sort_value(sort.column);
        let b = b.sort_value(sort.column);

        match sort.direction {
            SortDirection::Asc => compare_values(a, b),
            SortDirection::Desc => compare_values(b, a),
        }
    });
}

fn compare_values(a: Option<SortValue<'_>>, b: Option<SortValue<'_>>) -> Ordering {
    match (a, b) {
        (Some(SortValue::Text(a)), Some(SortValue::Text(b))) => compare_text(a, b),
        (Some(SortValue::Number(a)), Some(SortValue::Number(b))) => {
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        _ => Ordering::Equal,
    }
}

/// Order text the way people expect to see it in a table.
///
/// Letters compare without regard to case first, and on a tie the
/// lowercase form comes before the uppercase one.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| a.cmp(b).reverse())
}

/// The number of pages needed for `count` rows.
pub fn page_count(count: usize, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }

    (count as u64).div_ceil(page_size)
}

/// The index range of `page` within a collection of `len` rows.
///
/// Pages past the end give an empty range.
pub fn page_bounds(page: u64, page_size: u64, len: usize) -> Range<usize> {
    let start = page_size.saturating_mul(page.max(1) - 1);
    let end = start.saturating_add(page_size);

    let start = usize::try_from(start).unwrap_or(usize::MAX).min(len);
    let end = usize::try_from(end).unwrap_or(usize::MAX).min(len);

    start..end
}

/// Filter and sort `items` without paginating.
pub fn filter_and_sort<T: Listable + Clone>(items: &[T], params: &ListParams<T::Column>) -> Vec<T> {
    let mut rows = filter_items(items, &params.search, &params.status);

    if let Some(sort) = params.sort {
        sort_items(&mut rows, sort);
    }

    rows.into_iter().cloned().collect()
}

/// Run the whole pipeline: filter, sort, then take the requested page.
pub fn compute_view<T: Listable + Clone>(items: &[T], params: &ListParams<T::Column>) -> ListView<T> {
    let mut rows = filter_items(items, &params.search, &params.status);

    if let Some(sort) = params.sort {
        sort_items(&mut rows, sort);
    }

    let filtered_count = rows.len();
    let page = params.page.max(1);

    let (visible, total_pages) = match params.page_size {
        Some(page_size) => {
            let bounds = page_bounds(page, page_size, filtered_count);
            (
                rows[bounds].iter().map(|row| (*row).clone()).collect(),
                page_count(filtered_count, page_size),
            )
        }
        None => (
            rows.into_iter().cloned().collect(),
            u64::from(filtered_count > 0),
        ),
    };

    ListView {
        visible,
        filtered_count,
        total_pages,
        page,
    }
}

/// Caches the last computed [ListView] and only recomputes it when the
/// collection or the parameters change.
#[derive(Debug)]
pub struct MemoizedView<T: Listable> {
    inputs: Option<(Arc<Vec<T>>, ListParams<T::Column>)>,
    view: Option<Arc<ListView<T>>>,
    computations: u64,
}

impl<T: Listable> Default for MemoizedView<T> {
    fn default() -> Self {
        Self {
            inputs: None,
            view: None,
            computations: 0,
        }
    }
}

impl<T: Listable + Clone + PartialEq> MemoizedView<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the view for `items` and `params`.
    ///
    /// Returns the previous `Arc` when neither input has changed. The
    /// collection counts as unchanged if it is the same allocation or
    /// compares equal to the cached one.
    pub fn view(&mut self, items: Arc<Vec<T>>, params: &ListParams<T::Column>) -> Arc<ListView<T>> {
        if let (Some((cached_items, cached_params)), Some(view)) = (&self.inputs, &self.view) {
            let same_items = Arc::ptr_eq(cached_items, &items) || **cached_items == *items;

            if same_items && cached_params == params {
                return Arc::clone(view);
            }
        }

        let view = Arc::new(compute_view(&items, params));
        self.computations += 1;
        self.inputs = Some((items, params.clone()));
        self.view = Some(Arc::clone(&view));

        view
    }

    /// How many times the view has been computed rather than served from the cache.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
