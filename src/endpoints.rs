//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/merchants/{merchant_id}', use [format_endpoint].

/// The root route which redirects to the merchant list.
pub const ROOT: &str = "/";
/// The page for listing merchants.
pub const MERCHANTS_VIEW: &str = "/merchants";
/// The fragment with the merchant table, pagination and error panel.
pub const MERCHANTS_TABLE: &str = "/merchants/table";
/// The page for adding a merchant.
pub const NEW_MERCHANT_VIEW: &str = "/merchants/new";
/// The route that receives the add merchant form.
pub const POST_MERCHANT: &str = "/merchants";
/// The page with a merchant's details, stats and transactions.
pub const MERCHANT_VIEW: &str = "/merchants/{merchant_id}";
/// The page for editing a merchant.
pub const EDIT_MERCHANT_VIEW: &str = "/merchants/{merchant_id}/edit";
/// The route that receives the edit merchant form.
pub const PUT_MERCHANT: &str = "/merchants/{merchant_id}";
/// The route that re-renders a single merchant form input after it is edited.
pub const MERCHANT_FORM_FIELD: &str = "/forms/merchant/{field}";
/// The page with the auto-refreshing transaction list.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The fragment with the latest state of a transaction feed.
pub const TRANSACTIONS_PANEL: &str = "/transactions/panel";
/// The route that fetches a transaction feed once without waiting for the timer.
pub const TRANSACTIONS_RETRY: &str = "/transactions/retry";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to list and create merchants.
pub const MERCHANTS_API: &str = "/api/merchants";
/// The route to get and update a single merchant.
pub const MERCHANT_API: &str = "/api/merchants/{merchant_id}";
/// The route for the aggregate figures of a merchant.
pub const MERCHANT_STATS_API: &str = "/api/merchants/{merchant_id}/stats";
/// The route for the transactions of a merchant.
pub const MERCHANT_TRANSACTIONS_API: &str = "/api/merchants/{merchant_id}/transactions";
/// The route for the paged list of transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/merchants/{merchant_id}', '{merchant_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: &str) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|end| param_start + end + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::ROOT);
        assert_endpoint_is_valid_uri(endpoints::MERCHANTS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::MERCHANTS_TABLE);
        assert_endpoint_is_valid_uri(endpoints::NEW_MERCHANT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::POST_MERCHANT);
        assert_endpoint_is_valid_uri(endpoints::MERCHANT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::EDIT_MERCHANT_VIEW);
        assert_endpoint_is_valid_uri(endpoints::PUT_MERCHANT);
        assert_endpoint_is_valid_uri(endpoints::MERCHANT_FORM_FIELD);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_VIEW);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_PANEL);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_RETRY);
        assert_endpoint_is_valid_uri(endpoints::INTERNAL_ERROR_VIEW);
        assert_endpoint_is_valid_uri(endpoints::STATIC);

        assert_endpoint_is_valid_uri(endpoints::MERCHANTS_API);
        assert_endpoint_is_valid_uri(endpoints::MERCHANT_API);
        assert_endpoint_is_valid_uri(endpoints::MERCHANT_STATS_API);
        assert_endpoint_is_valid_uri(endpoints::MERCHANT_TRANSACTIONS_API);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS_API);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/merchants/{merchant_id}", "MCH-00001");

        assert_eq!(formatted_path, "/merchants/MCH-00001");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/forms/merchant/{field}", "email");

        assert_eq!(formatted_path, "/forms/merchant/email");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/merchants", "MCH-00001");

        assert_eq!(formatted_path, "/merchants");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint("/merchants/{merchant_id}/edit", "MCH-00001");

        assert_eq!(formatted_path, "/merchants/MCH-00001/edit");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
