use scraper::{ElementRef, Html, Selector};

fn selector(selectors: &str) -> Selector {
    Selector::parse(selectors).unwrap_or_else(|error| panic!("bad selector {selectors}: {error}"))
}

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&selector("form#merchant-form"))
        .next()
        .expect("No merchant form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    assert_eq!(
        form.value().attr(attribute),
        Some(endpoint),
        "want form with {attribute}=\"{endpoint}\""
    );
}

/// The `.form-field` wrapper of the input named `name`.
#[track_caller]
fn must_get_field<'a>(form: &ElementRef<'a>, name: &str) -> ElementRef<'a> {
    form.select(&selector(".form-field"))
        .find(|field| {
            field
                .select(&selector(&format!("input[name=\"{name}\"]")))
                .next()
                .is_some()
        })
        .unwrap_or_else(|| panic!("No form field with an input named \"{name}\""))
}

#[track_caller]
fn must_get_input<'a>(form: &ElementRef<'a>, name: &str, type_: &str) -> ElementRef<'a> {
    let input = must_get_field(form, name)
        .select(&selector("input"))
        .next()
        .unwrap_or_else(|| panic!("No input named \"{name}\""));

    assert_eq!(
        input.value().attr("type"),
        Some(type_),
        "want input {name} with type \"{type_}\""
    );
    assert!(
        input.value().attr("required").is_some(),
        "want input {name} to be required"
    );

    input
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    must_get_input(form, name, type_);
}

#[track_caller]
pub(crate) fn assert_form_input_with_value(
    form: &ElementRef<'_>,
    name: &str,
    type_: &str,
    value: &str,
) {
    let input = must_get_input(form, name, type_);

    assert_eq!(
        input.value().attr("value").unwrap_or_default(),
        value,
        "want input {name} with value \"{value}\""
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button_with_text(form: &ElementRef<'_>, text: &str) {
    let button = form
        .select(&selector("button[type=submit]"))
        .next()
        .expect("No submit button found");

    assert_eq!(button.text().collect::<String>().trim(), text);
}

/// Assert that the field with the input `name` shows `want_message` below it.
#[track_caller]
pub(crate) fn assert_field_error(form: &ElementRef<'_>, name: &str, want_message: &str) {
    let message = must_get_field(form, name)
        .select(&selector("p"))
        .next()
        .unwrap_or_else(|| panic!("No error message for \"{name}\""))
        .text()
        .collect::<String>();

    assert_eq!(message.trim(), want_message);
}
