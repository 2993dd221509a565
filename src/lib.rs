//! Merchant Console is a web app for managing merchants and watching their
//! payment transactions.
//!
//! This library provides a server that directly serves HTML pages, backed by
//! an in-memory mock of the merchant API that is also exposed as JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod alert;
mod app_state;
mod endpoints;
mod html;
mod internal_server_error;
mod list_view;
mod logging;
mod merchant;
mod navigation;
mod not_found;
mod pagination;
mod polling;
mod routing;
mod seed;
mod table;
mod transaction;
mod transport;

#[cfg(test)]
mod test_utils;

pub use app_state::{AppConfig, AppState};
pub use logging::logging_middleware;
pub use routing::build_router;
pub use transport::MockApi;

use crate::{
    alert::Alert, internal_server_error::InternalServerError,
    not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A request to the merchant API failed, e.g. because it is offline or
    /// timed out.
    ///
    /// The message is meant for the logs and the transactions error panel.
    #[error("{0}")]
    Transport(String),

    /// Could not acquire the lock on one of the in-memory stores.
    #[error("could not acquire the store lock")]
    StoreLockError,

    /// A merchant status other than Active, Inactive or Pending.
    #[error("\"{0}\" is not a valid merchant status")]
    InvalidMerchantStatus(String),

    /// A transaction status other than success, failed or pending.
    #[error("\"{0}\" is not a valid transaction status")]
    InvalidTransactionStatus(String),

    /// A sort key that does not name a sortable column.
    #[error("cannot sort by \"{0}\"")]
    InvalidSortColumn(String),

    /// Every merchant ID suffix up to the largest number is taken.
    #[error("no merchant IDs are left to assign")]
    MerchantIdsExhausted,

    /// Polling was configured with a refresh interval of zero.
    #[error("the refresh interval must be greater than zero")]
    InvalidRefreshInterval,

    /// A form field name that is not part of the merchant form.
    #[error("\"{0}\" is not a merchant form field")]
    InvalidFormField(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound | Error::InvalidFormField(_) => get_404_not_found_response(),
            Error::Transport(message) => {
                tracing::error!("The merchant API request failed: {message}");
                InternalServerError {
                    description: "The merchant service is unavailable.",
                    fix: "Try again in a few seconds.",
                }
                .into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// The HTTP status code used when returning this error to a client.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Transport(_) => StatusCode::BAD_GATEWAY,
            Error::InvalidMerchantStatus(_)
            | Error::InvalidTransactionStatus(_)
            | Error::InvalidSortColumn(_)
            | Error::InvalidFormField(_) => StatusCode::BAD_REQUEST,
            Error::StoreLockError
            | Error::InvalidRefreshInterval
            | Error::MerchantIdsExhausted => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Render the error as an alert for the out-of-band alert container.
    pub(crate) fn into_alert_response(self) -> Response {
        let status_code = self.status_code();

        let alert = match self {
            Error::NotFound => Alert::error(
                "Merchant not found",
                "The merchant could not be found. \
                Try refreshing the page to see if it still exists.",
            ),
            Error::Transport(_) => Alert::error(
                "The merchant service is unavailable",
                "Try again in a few seconds.",
            ),
            _ => Alert::error(
                "Something went wrong",
                "An unexpected error occurred, check the server logs for more details.",
            ),
        };

        (status_code, alert.into_html()).into_response()
    }

    /// Render the error as a JSON body of the form `{"error": "..."}`.
    pub(crate) fn into_json_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!("An error occurred while handling an API request: {self}");
        }

        (status_code, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
