//! The merchant list page and the table fragment it loads.
//!
//! The page only renders the controls. The table, its pagination and the
//! error panel are served by [get_merchants_table], which fetches every
//! merchant and runs the search, status filter, sort and page through the
//! memoized list pipeline.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_ROW_STYLE, base, loading_view,
        merchant_status_badge,
    },
    list_view::{ListParams, ListView, MemoizedView, Sort, SortDirection, StatusFilter},
    merchant::{Merchant, MerchantColumn, MerchantStatus},
    navigation::NavBar,
    pagination::{PageControls, PaginationConfig},
    table::{Column, table_view},
    transport::{MerchantQuery, MockApi, Transport},
};

/// The htmx event that makes the merchant table fetch its rows again.
pub const MERCHANTS_CHANGED_EVENT: &str = "merchants-changed";

const FETCH_FAILED_MESSAGE: &str = "Failed to fetch merchants.";

const MERCHANT_COLUMNS: [Column<MerchantColumn>; 6] = [
    Column::sortable("ID", MerchantColumn::Id),
    Column::sortable("Merchant Name", MerchantColumn::Name),
    Column::fixed("Phone"),
    Column::sortable("Email", MerchantColumn::Email),
    Column::sortable("Status", MerchantColumn::Status),
    Column::fixed("Action"),
];

/// The state needed for the merchant list.
#[derive(Debug, Clone)]
pub struct MerchantListState {
    pub api: MockApi,
    pub merchant_views: Arc<Mutex<MemoizedView<Merchant>>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for MerchantListState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            merchant_views: state.merchant_views.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query string of the merchant list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MerchantListQuery {
    pub search: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<MerchantColumn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<SortDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
}

impl Default for MerchantListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::ALL_VALUE.to_owned(),
            sort: None,
            dir: None,
            page: None,
        }
    }
}

impl MerchantListQuery {
    /// The list parameters for this query. Merchants are sorted by name
    /// unless the query says otherwise.
    pub fn to_params(&self, config: &PaginationConfig) -> ListParams<MerchantColumn> {
        let sort = Sort {
            column: self.sort.unwrap_or(MerchantColumn::Name),
            direction: self.dir.unwrap_or_default(),
        };

        ListParams::new(Some(config.page_size))
            .with_search(self.search.trim())
            .with_status(StatusFilter::parse(&self.status))
            .with_sort(Some(sort))
            .with_page(self.page.unwrap_or(config.default_page))
    }

    pub fn from_params(params: &ListParams<MerchantColumn>) -> Self {
        Self {
            search: params.search.clone(),
            status: params.status.as_query_value().to_owned(),
            sort: params.sort.map(|sort| sort.column),
            dir: params.sort.map(|sort| sort.direction),
            page: Some(params.page),
        }
    }

    /// `path` with this query appended.
    pub fn to_url(&self, path: &str) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if !query.is_empty() => format!("{path}?{query}"),
            Ok(_) => path.to_owned(),
            Err(error) => {
                tracing::error!("could not encode merchant list query {self:?}: {error}");
                path.to_owned()
            }
        }
    }
}

fn table_url(params: &ListParams<MerchantColumn>) -> String {
    MerchantListQuery::from_params(params).to_url(endpoints::MERCHANTS_TABLE)
}

/// Render the merchant list page.
///
/// The table is loaded by the browser once the page is shown.
pub async fn get_merchants_page(
    State(state): State<MerchantListState>,
    Query(query): Query<MerchantListQuery>,
) -> Response {
    let params = query.to_params(&state.pagination_config);

    merchants_view(&params).into_response()
}

/// Render the merchant table for the query.
///
/// A failed fetch renders an error panel with a retry button in place of
/// the table.
pub async fn get_merchants_table(
    State(state): State<MerchantListState>,
    Query(query): Query<MerchantListQuery>,
) -> Response {
    let params = query.to_params(&state.pagination_config);

    let merchants = match state.api.list_merchants(MerchantQuery::default()).await {
        Ok(merchants) => merchants,
        Err(error) => {
            tracing::error!("could not fetch merchants: {error}");
            return merchant_table_error_view(&params).into_response();
        }
    };

    let view = match state.merchant_views.lock() {
        Ok(mut views) => views.view(Arc::new(merchants), &params),
        Err(error) => {
            tracing::error!("could not acquire merchant view lock: {error}");
            return Error::StoreLockError.into_alert_response();
        }
    };

    merchant_table_view(&view, &params).into_response()
}

fn merchants_view(params: &ListParams<MerchantColumn>) -> Markup {
    let nav_bar = NavBar::new(endpoints::MERCHANTS_VIEW).into_html();
    let status = params.status.as_query_value();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full lg:max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Merchants" }

                    button
                        type="button"
                        hx-get=(endpoints::NEW_MERCHANT_VIEW)
                        hx-select="#merchant-form"
                        hx-target="#merchant-dialog"
                        hx-swap="innerHTML"
                        class=(BUTTON_SECONDARY_STYLE)
                    {
                        "Add New Merchant"
                    }
                }

                div id="merchant-dialog" class="max-w-md" {}

                form
                    id="merchant-filters"
                    hx-get=(endpoints::MERCHANTS_TABLE)
                    hx-trigger="input changed delay:300ms from:#search, change from:#status-filter"
                    hx-target="#merchant-table"
                    hx-swap="outerHTML"
                    class="flex flex-wrap gap-4"
                {
                    input
                        id="search"
                        type="search"
                        name="search"
                        value=(params.search)
                        placeholder="Search by ID or Merchant Name..."
                        class=(FORM_TEXT_INPUT_STYLE);

                    select id="status-filter" name="status" class=(FORM_TEXT_INPUT_STYLE)
                    {
                        option value=(StatusFilter::ALL_VALUE) selected[status == StatusFilter::ALL_VALUE]
                        {
                            "All Status"
                        }

                        @for option in MerchantStatus::ALL {
                            option
                                value=(option.as_str())
                                selected[status.eq_ignore_ascii_case(option.as_str())]
                            {
                                (option.as_str())
                            }
                        }
                    }

                    (list_state_view(params, false))
                }

                div
                    id="merchant-table"
                    hx-get=(table_url(params))
                    hx-trigger={ "load, " (MERCHANTS_CHANGED_EVENT) " from:body" }
                    hx-swap="outerHTML"
                {
                    (loading_view())
                }
            }
        }
    };

    base("Merchants", &content)
}

/// The sort of the table, submitted along with the filters so that a new
/// search keeps the current sort.
///
/// The table fragment sends it `out_of_band` to replace the one in the form.
fn list_state_view(params: &ListParams<MerchantColumn>, out_of_band: bool) -> Markup {
    let query = MerchantListQuery::from_params(params);

    html! {
        div id="merchant-list-state" hx-swap-oob=[out_of_band.then_some("true")]
        {
            @if let Some(sort) = query.sort {
                input type="hidden" name="sort" value=(sort.as_str());
            }
            @if let Some(dir) = query.dir {
                input type="hidden" name="dir" value=(match dir {
                    SortDirection::Asc => "asc",
                    SortDirection::Desc => "desc",
                });
            }
        }
    }
}

fn merchant_table_view(view: &ListView<Merchant>, params: &ListParams<MerchantColumn>) -> Markup {
    let controls = PageControls::new(view.page, view.total_pages);
    let page_url = |page: u64| table_url(&params.clone().with_page(page));

    let table_row = |merchant: &Merchant| {
        let details_url = endpoints::format_endpoint(endpoints::MERCHANT_VIEW, &merchant.id);
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_MERCHANT_VIEW, &merchant.id);

        html! {
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (merchant.id) }
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(details_url) class=(LINK_STYLE) { (merchant.name) }
                }
                td class=(TABLE_CELL_STYLE) { (merchant.phone) }
                td class=(TABLE_CELL_STYLE) { (merchant.email) }
                td class=(TABLE_CELL_STYLE) { (merchant_status_badge(merchant.status)) }
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(edit_url) class=(LINK_STYLE) { "Edit" }
                }
            }
        }
    };

    html! {
        div
            id="merchant-table"
            hx-get=(table_url(params))
            hx-trigger={ (MERCHANTS_CHANGED_EVENT) " from:body" }
            hx-swap="outerHTML"
            class="space-y-4"
        {
            div class="overflow-x-auto dark:bg-gray-800"
            {
                (table_view(
                    &MERCHANT_COLUMNS,
                    &view.visible,
                    params.sort,
                    Some("#merchant-table"),
                    |column| table_url(&params.clone().sorted_by(column)),
                    table_row,
                ))
            }

            nav class="flex items-center justify-between" aria-label="Pagination"
            {
                (page_button("Prev", controls.prev.map(page_url)))
                span class="text-sm" { (controls.label()) }
                (page_button("Next", controls.next.map(page_url)))
            }
        }

        (list_state_view(params, true))
    }
}

fn page_button(label: &str, url: Option<String>) -> Markup {
    html! {
        button
            type="button"
            hx-get=[url.as_deref()]
            hx-target="#merchant-table"
            hx-swap="outerHTML"
            disabled[url.is_none()]
            class=(BUTTON_SECONDARY_STYLE)
        {
            (label)
        }
    }
}

fn merchant_table_error_view(params: &ListParams<MerchantColumn>) -> Markup {
    let retry_url = table_url(params);

    html! {
        div
            id="merchant-table"
            hx-get=(retry_url)
            hx-trigger={ (MERCHANTS_CHANGED_EVENT) " from:body" }
            hx-swap="outerHTML"
        {
            div
                role="alert"
                class="flex items-center justify-between p-4 text-sm text-red-800 rounded bg-red-50 dark:bg-gray-800 dark:text-red-400"
            {
                span { (FETCH_FAILED_MESSAGE) }

                button
                    type="button"
                    hx-get=(retry_url)
                    hx-target="#merchant-table"
                    hx-swap="outerHTML"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Retry"
                }
            }
        }
    }
}



#[cfg(test)]
mod merchants_table_tests {
    use axum::extract::{FromRef, Query, State};
    use scraper::{Html, Selector};

    use crate::{
        AppConfig, AppState,
        merchant::{
            Merchant, MerchantStatus, get_merchants_table,
            list_page::{MerchantListQuery, MerchantListState},
        },
        test_utils::{assert_status_ok, parse_html_fragment, test_api},
        transport::MockApi,
    };

    fn many_merchants(count: usize) -> Vec<Merchant> {
        (1..=count)
            .map(|i| Merchant {
                id: format!("MCH-{i:05}"),
                name: format!("Merchant {i:02}"),
                category: "Retail".to_owned(),
                address: "1 Main St".to_owned(),
                status: if i % 2 == 0 {
                    MerchantStatus::Active
                } else {
                    MerchantStatus::Inactive
                },
                email: format!("m{i}@example.test"),
                phone: "555-0100".to_owned(),
            })
            .collect()
    }

    fn list_state(api: MockApi) -> MerchantListState {
        MerchantListState::from_ref(&AppState::with_api(api, &AppConfig::default()))
    }

    async fn render(state: &MerchantListState, query: &str) -> Html {
        let query: MerchantListQuery = serde_urlencoded::from_str(query).unwrap();
        let response = get_merchants_table(State(state.clone()), Query(query)).await;
        assert_status_ok(&response);

        parse_html_fragment(response).await
    }

    fn row_ids(html: &Html) -> Vec<String> {
        html.select(&Selector::parse("tbody tr td:first-child").unwrap())
            .map(|cell| cell.text().collect())
            .collect()
    }

    fn page_label(html: &Html) -> String {
        html.select(&Selector::parse("nav span").unwrap())
            .next()
            .expect("No page label found")
            .text()
            .collect()
    }

    #[tokio::test]
    async fn shows_first_page_of_merchants_sorted_by_name() {
        let state = list_state(MockApi::new(many_merchants(25), Vec::new()));

        let html = render(&state, "").await;

        let ids = row_ids(&html);
        assert_eq!(ids.len(), 10);
        assert_eq!(ids[0], "MCH-00001");
        assert_eq!(page_label(&html), "Page 1 of 3");

        let prev = html
            .select(&Selector::parse("nav button").unwrap())
            .next()
            .expect("No prev button found");
        assert!(prev.value().attr("disabled").is_some());
    }

    #[tokio::test]
    async fn search_and_status_filter_combine() {
        let state = list_state(MockApi::new(many_merchants(25), Vec::new()));

        let html = render(&state, "search=merchant%201&status=active").await;

        assert_eq!(
            row_ids(&html),
            ["MCH-00010", "MCH-00012", "MCH-00014", "MCH-00016", "MCH-00018"]
        );
        assert_eq!(page_label(&html), "Page 1 of 1");
    }

    #[tokio::test]
    async fn sort_header_toggles_direction() {
        let state = list_state(test_api());

        let html = render(&state, "sort=name&dir=asc").await;

        let link = html
            .select(&Selector::parse("th[aria-sort=ascending] a").unwrap())
            .next()
            .expect("No active sort header found");
        let url = link.value().attr("hx-get").unwrap();
        assert!(url.contains("sort=name&dir=desc"), "got {url}");

        let html = render(&state, "sort=name&dir=desc").await;
        assert_eq!(row_ids(&html), ["MCH-00002", "MCH-00001"]);
    }

    #[tokio::test]
    async fn page_past_the_end_is_empty() {
        let state = list_state(test_api());

        let html = render(&state, "page=4").await;

        assert!(row_ids(&html).iter().all(|cell| cell == "No data found."));
        assert_eq!(page_label(&html), "Page 4 of 1");
    }

    #[tokio::test]
    async fn unchanged_inputs_reuse_cached_view() {
        let state = list_state(test_api());

        render(&state, "search=acme").await;
        render(&state, "search=acme").await;
        render(&state, "search=globex").await;

        assert_eq!(state.merchant_views.lock().unwrap().computations(), 2);
    }

    #[tokio::test]
    async fn offline_api_shows_error_panel_with_retry() {
        let state = list_state(test_api());
        state.api.set_offline(true);

        let html = render(&state, "").await;

        let panel = html
            .select(&Selector::parse("#merchant-table [role=alert]").unwrap())
            .next()
            .expect("No error panel found");
        assert!(
            panel
                .text()
                .collect::<String>()
                .contains("Failed to fetch merchants.")
        );
        let retry = panel
            .select(&Selector::parse("button").unwrap())
            .next()
            .expect("No retry button found");
        assert_eq!(retry.text().collect::<String>().trim(), "Retry");
        assert!(retry.value().attr("hx-get").is_some());
    }

    #[tokio::test]
    async fn merchant_state_is_updated_out_of_band() {
        let state = list_state(test_api());

        let html = render(&state, "sort=email&dir=desc").await;

        let sort = html
            .select(&Selector::parse("#merchant-list-state[hx-swap-oob] input[name=sort]").unwrap())
            .next()
            .expect("No sort input found");
        assert_eq!(sort.value().attr("value"), Some("email"));
    }
}
