//! Application router configuration for the HTML pages and the JSON API.

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState, endpoints,
    internal_server_error::get_internal_server_error_page,
    merchant::{
        create_merchant_endpoint, get_edit_merchant_page, get_merchant_endpoint,
        get_merchant_page, get_merchants_page, get_merchants_table, get_new_merchant_page,
        list_merchants_endpoint, merchant_form_field_endpoint, merchant_stats_endpoint,
        merchant_transactions_endpoint, post_merchant_endpoint, put_merchant_endpoint,
        update_merchant_endpoint,
    },
    not_found::get_404_not_found,
    transaction::{
        get_transactions_page, get_transactions_panel, list_transactions_endpoint,
        retry_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(
            endpoints::MERCHANTS_VIEW,
            get(get_merchants_page).post(create_merchant_endpoint),
        )
        .route(endpoints::MERCHANTS_TABLE, get(get_merchants_table))
        .route(endpoints::NEW_MERCHANT_VIEW, get(get_new_merchant_page))
        .route(
            endpoints::MERCHANT_VIEW,
            get(get_merchant_page).put(update_merchant_endpoint),
        )
        .route(endpoints::EDIT_MERCHANT_VIEW, get(get_edit_merchant_page))
        .route(
            endpoints::MERCHANT_FORM_FIELD,
            post(merchant_form_field_endpoint),
        )
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(endpoints::TRANSACTIONS_PANEL, get(get_transactions_panel))
        .route(
            endpoints::TRANSACTIONS_RETRY,
            post(retry_transactions_endpoint),
        )
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let api_routes = Router::new()
        .route(
            endpoints::MERCHANTS_API,
            get(list_merchants_endpoint).post(post_merchant_endpoint),
        )
        .route(
            endpoints::MERCHANT_API,
            get(get_merchant_endpoint).put(put_merchant_endpoint),
        )
        .route(endpoints::MERCHANT_STATS_API, get(merchant_stats_endpoint))
        .route(
            endpoints::MERCHANT_TRANSACTIONS_API,
            get(merchant_transactions_endpoint),
        )
        .route(endpoints::TRANSACTIONS_API, get(list_transactions_endpoint));

    page_routes
        .merge(api_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// The root path '/' redirects to the merchant list.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::MERCHANTS_VIEW)
}
