//! Middleware for logging requests and responses.

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The longest body that is logged in full at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// Form fields whose values are replaced before a request body is logged.
const REDACTED_FIELDS: [&str; 2] = ["email", "phone"];

const REDACTED_VALUE: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// The contact details in merchant form bodies are redacted.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let Some(body_text) = read_body(body, "request").await else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    if is_form(&parts.headers) {
        log_request(&parts, &redact_fields(&body_text, &REDACTED_FIELDS));
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let Some(body_text) = read_body(body, "response").await else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    log_response(&parts, &body_text);

    Response::from_parts(parts, body_text.into())
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .is_some_and(|content_type| {
            content_type
                .as_bytes()
                .starts_with(b"application/x-www-form-urlencoded")
        })
}

async fn read_body(body: Body, kind: &str) -> Option<String> {
    match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).to_string()),
        Err(error) => {
            tracing::error!("could not read {kind} body for logging: {error}");
            None
        }
    }
}

/// Replace the value of every field in `fields` in the url-encoded `form_text`.
fn redact_fields(form_text: &str, fields: &[&str]) -> String {
    form_text
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if fields.contains(&name) => format!("{name}={REDACTED_VALUE}"),
            _ => pair.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// The first `limit` characters of `text`, or `None` if it is not longer than that.
fn truncated(text: &str, limit: usize) -> Option<&str> {
    text.char_indices()
        .nth(limit)
        .map(|(byte_index, _)| &text[..byte_index])
}

fn log_request(parts: &axum::http::request::Parts, body: &str) {
    match truncated(body, LOG_BODY_LENGTH_LIMIT) {
        Some(prefix) => {
            tracing::info!("Received request: {parts:#?}\nbody: {prefix}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &axum::http::response::Parts, body: &str) {
    match truncated(body, LOG_BODY_LENGTH_LIMIT) {
        Some(prefix) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {prefix}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}
