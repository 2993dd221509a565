use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "Not Found",
        "404",
        "Something's missing.",
        "Sorry, we can't find that page. Check the merchant ID or go back to the merchant list.",
    );

    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}
