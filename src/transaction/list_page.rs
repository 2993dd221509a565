//! The transactions page, which shows the latest transactions and keeps
//! them up to date by polling the server.

use std::{sync::Arc, time::Duration};

use axum::{
    Form,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_SECONDARY_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_ROW_STYLE, base, format_currency, format_date, loading_view,
        transaction_status_badge,
    },
    internal_server_error::get_internal_server_error_redirect,
    list_view::{ListParams, compute_view},
    merchant::MerchantId,
    navigation::NavBar,
    polling::FetchStatus,
    table::{Column, table_view},
    transaction::{
        TransactionColumn, TransactionSummary,
        feed::{FeedSnapshot, TransactionFeed, TransactionFeeds},
    },
    transport::{MockApi, Transport},
};

const TRANSACTION_COLUMNS: [Column<TransactionColumn>; 5] = [
    Column::fixed("ID"),
    Column::fixed("Merchant"),
    Column::fixed("Amount"),
    Column::fixed("Status"),
    Column::fixed("Date"),
];

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionListState {
    pub api: MockApi,
    pub feeds: Arc<TransactionFeeds<MockApi>>,
}

impl FromRef<AppState> for TransactionListState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
            feeds: state.transaction_feeds.clone(),
        }
    }
}

/// The query string of the transactions page and its fragments.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionListQuery {
    /// Only show the transactions of this merchant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<MerchantId>,
    /// Only show transactions whose ID or merchant name contains this text.
    pub search: String,
    /// How often to refresh in milliseconds, the server default if not set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_ms: Option<u64>,
}

impl TransactionListQuery {
    fn merchant_id(&self) -> Option<MerchantId> {
        self.merchant_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_owned)
    }

    fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_ms.map(Duration::from_millis)
    }

    /// The feed for this query, started if no page is polling it yet.
    ///
    /// A feed is only started for a merchant that exists. If the API cannot
    /// be reached the feed is started anyway and shows the error.
    async fn feed(
        &self,
        state: &TransactionListState,
    ) -> Result<Arc<TransactionFeed<MockApi>>, Error> {
        let merchant_id = self.merchant_id();
        let interval = self.refresh_interval();

        if let Some(feed) = state.feeds.get(merchant_id.clone(), interval)? {
            return Ok(feed);
        }

        if let Some(merchant_id) = &merchant_id {
            match state.api.get_merchant(merchant_id).await {
                Err(Error::NotFound) => return Err(Error::NotFound),
                Err(error) => tracing::warn!("could not check merchant {merchant_id}: {error}"),
                Ok(_) => {}
            }
        }

        state.feeds.get_or_start(merchant_id, interval)
    }
}

/// Render the transactions page and start polling for its merchant filter.
///
/// Responds with the 404 page if the merchant does not exist.
pub async fn get_transactions_page(
    State(state): State<TransactionListState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Response, Error> {
    let feed = query.feed(&state).await?;
    let snapshot = feed.snapshot()?;
    let interval = feed.interval()?;

    Ok(transactions_page_view(&query, &snapshot, interval).into_response())
}

/// Render the latest state of the feed for the panel to swap in.
pub async fn get_transactions_panel(
    State(state): State<TransactionListState>,
    Query(query): Query<TransactionListQuery>,
) -> Response {
    let snapshot = query
        .feed(&state)
        .await
        .and_then(|feed| feed.snapshot());

    match snapshot {
        Ok(snapshot) => transactions_panel_view(&snapshot, &query.search).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

/// Fetch the feed once now and render the result.
///
/// The timer keeps its schedule, this only adds one fetch.
pub async fn retry_transactions_endpoint(
    State(state): State<TransactionListState>,
    Form(query): Form<TransactionListQuery>,
) -> Response {
    let feed = match query.feed(&state).await {
        Ok(feed) => feed,
        Err(error) => {
            tracing::error!("could not get transaction feed to retry: {error}");
            return match error {
                Error::NotFound => error.into_alert_response(),
                _ => get_internal_server_error_redirect(),
            };
        }
    };

    feed.refresh().await;

    match feed.snapshot() {
        Ok(snapshot) => transactions_panel_view(&snapshot, &query.search).into_response(),
        Err(error) => error.into_alert_response(),
    }
}

fn transactions_page_view(
    query: &TransactionListQuery,
    snapshot: &FeedSnapshot,
    interval: Duration,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let merchant_id = query.merchant_id();
    let refresh_ms = interval.as_millis();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full lg:max-w-5xl space-y-4"
            {
                header
                {
                    h1 class="text-xl font-bold"
                    {
                        @if let Some(merchant_id) = &merchant_id {
                            "Transactions for " (merchant_id)
                        } @else {
                            "Transactions"
                        }
                    }
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Refreshes every " (refresh_ms) " ms"
                    }
                }

                div id="transaction-filters"
                {
                    input
                        id="transaction-search"
                        type="search"
                        name="search"
                        value=(query.search)
                        placeholder="Search by ID or Merchant Name..."
                        class=(FORM_TEXT_INPUT_STYLE)
                        hx-get=(endpoints::TRANSACTIONS_PANEL)
                        hx-trigger="input changed delay:300ms, search"
                        hx-target="#transactions-panel"
                        hx-include="#transaction-filters";

                    @if let Some(merchant_id) = &merchant_id {
                        input type="hidden" name="merchant_id" value=(merchant_id);
                    }

                    input type="hidden" name="refresh_ms" value=(refresh_ms);
                }

                div
                    id="transactions-panel"
                    class="overflow-x-auto dark:bg-gray-800"
                    hx-get=(endpoints::TRANSACTIONS_PANEL)
                    hx-trigger={ "every " (refresh_ms) "ms" }
                    hx-include="#transaction-filters"
                {
                    (transactions_panel_view(snapshot, &query.search))
                }
            }
        }
    };

    base("Transactions", &content)
}

fn transactions_panel_view(snapshot: &FeedSnapshot, search: &str) -> Markup {
    match &snapshot.status {
        FetchStatus::Error(message) => feed_error_view(message),
        FetchStatus::Idle | FetchStatus::Loading if snapshot.transactions.is_empty() => {
            loading_view()
        }
        _ => {
            let params = ListParams::new(None).with_search(search);
            let transactions = compute_view(&snapshot.transactions, &params).visible;

            transactions_table_view(&transactions)
        }
    }
}

fn feed_error_view(message: &str) -> Markup {
    html! {
        div
            role="alert"
            class="p-4 text-sm text-red-800 rounded bg-red-50 dark:bg-gray-800 dark:text-red-400"
        {
            p { "Error: " (message) }

            button
                type="button"
                class={ "mt-2 " (BUTTON_SECONDARY_STYLE) }
                hx-post=(endpoints::TRANSACTIONS_RETRY)
                hx-include="#transaction-filters"
                hx-target="#transactions-panel"
            {
                "Retry"
            }
        }
    }
}

fn transactions_table_view(transactions: &[TransactionSummary]) -> Markup {
    let transaction_row = |row: &TransactionSummary| {
        let transaction = &row.transaction;
        let merchant_url =
            endpoints::format_endpoint(endpoints::MERCHANT_VIEW, &transaction.merchant_id);

        html! {
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (transaction.id) }
                td class=(TABLE_CELL_STYLE) { a href=(merchant_url) { (row.merchant_name) } }
                td class=(TABLE_CELL_STYLE) { (format_currency(transaction.amount)) }
                td class=(TABLE_CELL_STYLE) { (transaction_status_badge(transaction.status)) }
                td class=(TABLE_CELL_STYLE) { (format_date(transaction.date)) }
            }
        }
    };

    // None of the columns are sortable, so no sort URL is ever built.
    table_view(
        &TRANSACTION_COLUMNS,
        transactions,
        None,
        None,
        |_| String::new(),
        transaction_row,
    )
}
