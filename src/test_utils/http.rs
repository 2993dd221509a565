use axum::{
    http::{StatusCode, header::CONTENT_TYPE},
    response::Response,
};
use axum_htmx::HX_REDIRECT;

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn get_header(response: &Response, name: &str) -> String {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_else(|| panic!("No readable {name} header"))
        .to_owned()
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response, content_type: &str) {
    assert_eq!(get_header(response, CONTENT_TYPE.as_str()), content_type);
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response, endpoint: &str) {
    assert_eq!(get_header(response, HX_REDIRECT.as_str()), endpoint);
}
