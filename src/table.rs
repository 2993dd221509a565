//! A table that can render any row type.
//!
//! The headers are passed in as [Column] data, and each row is rendered by
//! a closure supplied by the page.

use maud::{Markup, html};

use crate::{
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE},
    list_view::{Sort, SortDirection},
};

/// A table header.
#[derive(Debug, Clone, Copy)]
pub struct Column<C> {
    pub label: &'static str,
    /// The column to sort by when the header is clicked, `None` if the
    /// header is not sortable.
    pub sort_key: Option<C>,
}

impl<C> Column<C> {
    pub const fn sortable(label: &'static str, sort_key: C) -> Self {
        Self {
            label,
            sort_key: Some(sort_key),
        }
    }

    pub const fn fixed(label: &'static str) -> Self {
        Self {
            label,
            sort_key: None,
        }
    }
}

/// The message shown in place of the rows when there is nothing to show.
pub const EMPTY_TABLE_MESSAGE: &str = "No data found.";

/// Render a table with `columns` as headers and one row per item in `rows`.
///
/// Sortable headers link to `sort_url(column)`. With an `hx_target` the
/// link swaps the matching element with the response, otherwise it is a
/// plain link. The header of the active sort column shows the direction.
pub fn table_view<T, C>(
    columns: &[Column<C>],
    rows: &[T],
    current_sort: Option<Sort<C>>,
    hx_target: Option<&str>,
    sort_url: impl Fn(C) -> String,
    render_row: impl Fn(&T) -> Markup,
) -> Markup
where
    C: Copy + Eq,
{
    html! {
        table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    @for column in columns {
                        (header_view(column, current_sort, hx_target, &sort_url))
                    }
                }
            }

            tbody
            {
                @for row in rows {
                    (render_row(row))
                }

                @if rows.is_empty() {
                    tr
                    {
                        td
                            colspan=(columns.len())
                            class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                        {
                            (EMPTY_TABLE_MESSAGE)
                        }
                    }
                }
            }
        }
    }
}

fn header_view<C: Copy + Eq>(
    column: &Column<C>,
    current_sort: Option<Sort<C>>,
    hx_target: Option<&str>,
    sort_url: &impl Fn(C) -> String,
) -> Markup {
    let Some(sort_key) = column.sort_key else {
        return html!( th scope="col" class=(TABLE_CELL_STYLE) { (column.label) } );
    };

    let direction = current_sort
        .filter(|sort| sort.column == sort_key)
        .map(|sort| sort.direction);
    let (aria_sort, indicator) = match direction {
        Some(SortDirection::Asc) => ("ascending", " ▲"),
        Some(SortDirection::Desc) => ("descending", " ▼"),
        None => ("none", ""),
    };
    let url = sort_url(sort_key);

    html! {
        th scope="col" class=(TABLE_CELL_STYLE) aria-sort=(aria_sort)
        {
            a
                href=(url)
                hx-get=[hx_target.map(|_| &url)]
                hx-target=[hx_target]
                hx-swap=[hx_target.map(|_| "outerHTML")]
                class="cursor-pointer hover:underline"
            {
                (column.label) (indicator)
            }
        }
    }
}
