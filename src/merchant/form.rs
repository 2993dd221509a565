//! The merchant form shared by the add and edit flows.

use axum::{
    Form,
    extract::Path,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_ERROR_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE,
    },
    merchant::{
        Merchant, MerchantStatus,
        validation::{FieldErrors, MerchantField, MerchantFormData},
    },
};

/// The result of submitting the merchant form.
#[derive(Debug)]
pub enum FormOutcome {
    /// The merchant was stored.
    Saved(Merchant),
    /// Validation failed, nothing was sent to the API.
    Invalid(FieldErrors),
    /// The API request failed.
    Failed(Error),
}

/// Where the form is submitted to.
#[derive(Debug, Clone, Copy)]
pub enum FormAction<'a> {
    Create,
    Update { merchant_id: &'a str },
}

/// Render the merchant form.
///
/// `banner` is shown above the inputs when the last submission failed.
pub fn merchant_form_view(
    action: FormAction<'_>,
    form: &MerchantFormData,
    errors: &FieldErrors,
    banner: Option<&str>,
) -> Markup {
    let (hx_post, hx_put, submit_label) = match action {
        FormAction::Create => (Some(endpoints::POST_MERCHANT.to_owned()), None, "Add Merchant"),
        FormAction::Update { merchant_id } => (
            None,
            Some(endpoints::format_endpoint(endpoints::PUT_MERCHANT, merchant_id)),
            "Update Merchant",
        ),
    };

    html! {
        form
            id="merchant-form"
            hx-post=[hx_post]
            hx-put=[hx_put]
            hx-target="this"
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            novalidate
            class="w-full space-y-4 md:space-y-6"
        {
            @if let Some(message) = banner {
                div
                    role="alert"
                    class="p-4 text-sm text-red-800 rounded bg-red-50 dark:bg-gray-800 dark:text-red-400"
                {
                    (message)
                }
            }

            @for field in MerchantField::ALL {
                (field_view(field, form.value(field), errors.get(field)))
            }

            (status_select_view(form.status))

            div class="flex gap-4"
            {
                a href=(endpoints::MERCHANTS_VIEW) class=(BUTTON_SECONDARY_STYLE) { "Cancel" }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { (submit_label) }
            }
        }
    }
}

/// Render one labelled input of the merchant form.
///
/// An input that shows an error asks the server to re-render it without
/// the error as soon as the user types into it.
pub fn field_view(field: MerchantField, value: &str, error: Option<&str>) -> Markup {
    let name = field.as_str();
    let input_type = match field {
        MerchantField::Email => "email",
        MerchantField::Phone => "tel",
        _ => "text",
    };
    let clear_error_url =
        error.map(|_| endpoints::format_endpoint(endpoints::MERCHANT_FORM_FIELD, name));

    html! {
        div class="form-field"
        {
            label for=(name) class=(FORM_LABEL_STYLE) { (field.label()) }

            input
                id=(name)
                type=(input_type)
                name=(name)
                value=(value)
                placeholder=(field.label())
                required
                aria-invalid=[error.map(|_| "true")]
                hx-post=[clear_error_url.as_deref()]
                hx-trigger=[error.map(|_| "input once")]
                hx-target=[error.map(|_| "closest .form-field")]
                hx-swap=[error.map(|_| "outerHTML")]
                class=(FORM_TEXT_INPUT_STYLE);

            @if let Some(error) = error {
                p class=(FORM_ERROR_STYLE) { (error) }
            }
        }
    }
}

fn status_select_view(current: MerchantStatus) -> Markup {
    html! {
        div class="form-field"
        {
            label for="status" class=(FORM_LABEL_STYLE) { "Status" }

            select id="status" name="status" class=(FORM_TEXT_INPUT_STYLE)
            {
                @for status in MerchantStatus::ALL {
                    option value=(status.as_str()) selected[status == current]
                    {
                        (status.as_str())
                    }
                }
            }
        }
    }
}

/// Re-render a single form input without its error message.
///
/// Editing a field only clears that field's error, the form is validated
/// again in full when it is submitted.
pub async fn merchant_form_field_endpoint(
    Path(field): Path<String>,
    Form(form): Form<MerchantFormData>,
) -> Response {
    match field.parse::<MerchantField>() {
        Ok(field) => field_view(field, form.value(field), None).into_response(),
        Err(error) => {
            tracing::warn!("could not re-render merchant form field: {error}");
            error.into_response()
        }
    }
}
