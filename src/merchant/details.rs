//! The merchant details page: the merchant's fields, stats and transactions.

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error, endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_ROW_STYLE, base,
        format_currency, format_date, link, merchant_status_badge, transaction_status_badge,
    },
    list_view::{ListParams, Sort, SortDirection, compute_view},
    merchant::{Merchant, MerchantId, MerchantStats},
    navigation::NavBar,
    not_found::get_404_not_found_response,
    table::{Column, table_view},
    transaction::{Transaction, TransactionColumn},
    transport::{MockApi, Transport},
};

const FETCH_FAILED_MESSAGE: &str = "Failed to fetch merchant details.";

const TRANSACTION_COLUMNS: [Column<TransactionColumn>; 5] = [
    Column::sortable("ID", TransactionColumn::Id),
    Column::sortable("Amount", TransactionColumn::Amount),
    Column::sortable("Status", TransactionColumn::Status),
    Column::sortable("Date", TransactionColumn::Date),
    Column::sortable("Description", TransactionColumn::Description),
];

/// The state needed for the merchant details page.
#[derive(Debug, Clone)]
pub struct MerchantDetailsState {
    pub api: MockApi,
}

impl FromRef<AppState> for MerchantDetailsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// How the transactions on the details page are sorted, newest first by default.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSortQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<TransactionColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<SortDirection>,
}

impl TransactionSortQuery {
    fn to_sort(self) -> Sort<TransactionColumn> {
        match self.sort {
            Some(column) => Sort {
                column,
                direction: self.dir.unwrap_or_default(),
            },
            None => Sort::descending(TransactionColumn::Date),
        }
    }
}

/// Render the details page of a merchant.
///
/// The merchant, its stats and its transactions are requested at the same
/// time. An unknown merchant renders the 404 page, any other failure a
/// banner in place of the details.
pub async fn get_merchant_page(
    Path(merchant_id): Path<MerchantId>,
    State(state): State<MerchantDetailsState>,
    Query(query): Query<TransactionSortQuery>,
) -> Response {
    let (merchant, stats, transactions) = tokio::join!(
        state.api.get_merchant(&merchant_id),
        state.api.merchant_stats(&merchant_id),
        state.api.merchant_transactions(&merchant_id),
    );

    match (merchant, stats, transactions) {
        (Ok(merchant), Ok(stats), Ok(transactions)) => {
            let params = ListParams::new(None).with_sort(Some(query.to_sort()));
            let transactions = compute_view(&transactions.data, &params).visible;

            merchant_details_view(&merchant, &stats, &transactions, params.sort).into_response()
        }
        (Err(Error::NotFound), _, _) => get_404_not_found_response(),
        (merchant, stats, transactions) => {
            let errors = [merchant.err(), stats.err(), transactions.err()];
            for error in errors.into_iter().flatten() {
                tracing::error!("could not fetch details of merchant {merchant_id}: {error}");
            }

            merchant_details_error_view(&merchant_id).into_response()
        }
    }
}

fn details_url(merchant_id: &str, sort: Sort<TransactionColumn>) -> String {
    let path = endpoints::format_endpoint(endpoints::MERCHANT_VIEW, merchant_id);
    let query = TransactionSortQuery {
        sort: Some(sort.column),
        dir: Some(sort.direction),
    };

    match serde_urlencoded::to_string(query) {
        Ok(query) => format!("{path}?{query}"),
        Err(error) => {
            tracing::error!("could not encode transaction sort {query:?}: {error}");
            path
        }
    }
}

fn live_transactions_url(merchant_id: &str) -> String {
    match serde_urlencoded::to_string([("merchant_id", merchant_id)]) {
        Ok(query) => format!("{}?{query}", endpoints::TRANSACTIONS_VIEW),
        Err(error) => {
            tracing::error!("could not encode merchant ID {merchant_id}: {error}");
            endpoints::TRANSACTIONS_VIEW.to_owned()
        }
    }
}

fn merchant_details_view(
    merchant: &Merchant,
    stats: &MerchantStats,
    transactions: &[Transaction],
    sort: Option<Sort<TransactionColumn>>,
) -> Markup {
    let page_url = endpoints::format_endpoint(endpoints::MERCHANT_VIEW, &merchant.id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_MERCHANT_VIEW, &merchant.id);
    let nav_bar = NavBar::new(&page_url).into_html();

    let transaction_row = |transaction: &Transaction| {
        html! {
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (transaction.id) }
                td class=(TABLE_CELL_STYLE) { (format_currency(transaction.amount)) }
                td class=(TABLE_CELL_STYLE) { (transaction_status_badge(transaction.status)) }
                td class=(TABLE_CELL_STYLE) { (format_date(transaction.date)) }
                td class=(TABLE_CELL_STYLE)
                {
                    (transaction.description.as_deref().unwrap_or("-"))
                }
            }
        }
    };

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full lg:max-w-5xl space-y-6"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    div
                    {
                        h1 class="text-xl font-bold" { (merchant.name) }
                        p class="text-sm text-gray-500 dark:text-gray-400" { (merchant.id) }
                    }

                    div class="flex gap-4"
                    {
                        (link(&live_transactions_url(&merchant.id), "Live Transactions"))
                        (link(&edit_url, "Edit Merchant"))
                    }
                }

                dl id="merchant-fields" class="grid grid-cols-2 gap-4 md:grid-cols-3"
                {
                    (detail_item("Category", html!((merchant.category))))
                    (detail_item("Status", merchant_status_badge(merchant.status)))
                    (detail_item("Email", html!((merchant.email))))
                    (detail_item("Phone", html!((merchant.phone))))
                    (detail_item("Address", html!((merchant.address))))
                }

                dl id="merchant-stats" class="grid grid-cols-1 gap-4 md:grid-cols-3"
                {
                    (detail_item("Total Transactions", html!((stats.total_transactions))))
                    (detail_item("Total Volume", html!((format_currency(stats.total_volume)))))
                    (detail_item(
                        "Average Transaction",
                        html!((format_currency(stats.average_transaction_value)))
                    ))
                }

                section id="merchant-transactions" class="overflow-x-auto dark:bg-gray-800"
                {
                    h2 class="mb-2 text-lg font-semibold" { "Transactions" }

                    (table_view(
                        &TRANSACTION_COLUMNS,
                        transactions,
                        sort,
                        None,
                        |column| details_url(&merchant.id, Sort::toggled(sort, column)),
                        transaction_row,
                    ))
                }
            }
        }
    };

    base("Merchant Details", &content)
}

fn detail_item(label: &str, value: Markup) -> Markup {
    html! {
        div class="p-4 rounded bg-white dark:bg-gray-800"
        {
            dt class="text-sm text-gray-500 dark:text-gray-400" { (label) }
            dd class="text-lg font-semibold" { (value) }
        }
    }
}

fn merchant_details_error_view(merchant_id: &str) -> Markup {
    let page_url = endpoints::format_endpoint(endpoints::MERCHANT_VIEW, merchant_id);
    let nav_bar = NavBar::new(&page_url).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div
                role="alert"
                class="w-full max-w-md p-4 text-sm text-red-800 rounded bg-red-50 dark:bg-gray-800 dark:text-red-400"
            {
                p { (FETCH_FAILED_MESSAGE) }
                a href=(page_url) class=(LINK_STYLE) { "Retry" }
            }
        }
    };

    base("Merchant Details", &content)
}
