#![allow(missing_docs)]

pub(crate) mod api;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;

pub(crate) use api::{CountingTransport, acme, test_api};
pub(crate) use form::{
    assert_field_error, assert_form_input, assert_form_input_with_value,
    assert_form_submit_button_with_text, assert_hx_endpoint, must_get_form,
};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_content_type, assert_hx_redirect, assert_status_ok, get_header};
