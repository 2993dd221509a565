//! The page and endpoint for adding a merchant.

use axum::{
    Form,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_htmx::HX_TRIGGER;
use maud::{Markup, html};

use crate::{
    AppState,
    alert::Alert,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    merchant::{
        form::{FormAction, FormOutcome, merchant_form_view},
        list_page::MERCHANTS_CHANGED_EVENT,
        validation::{FieldErrors, MerchantFormData, validate_merchant_form},
    },
    navigation::NavBar,
    transport::{MockApi, Transport},
};

const CREATE_FAILED_MESSAGE: &str = "Failed to add merchant. Please try again.";

/// The state needed for adding a merchant.
#[derive(Debug, Clone)]
pub struct CreateMerchantState {
    pub api: MockApi,
}

impl FromRef<AppState> for CreateMerchantState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// Validate `form` and, if it is valid, create the merchant through `api`.
///
/// The API is not called when validation fails.
pub async fn submit_new_merchant<T: Transport>(api: &T, form: MerchantFormData) -> FormOutcome {
    let errors = validate_merchant_form(&form);
    if !errors.is_empty() {
        return FormOutcome::Invalid(errors);
    }

    match api.create_merchant(form.into_new_merchant()).await {
        Ok(merchant) => FormOutcome::Saved(merchant),
        Err(error) => {
            tracing::error!("could not create merchant: {error}");
            FormOutcome::Failed(error)
        }
    }
}

/// Render the page with an empty merchant form.
pub async fn get_new_merchant_page() -> Response {
    new_merchant_view().into_response()
}

/// Handle the add merchant form.
///
/// On success the response is an empty form, a toast and an event that
/// tells the merchant table to refresh. Otherwise the submitted values are
/// kept and the errors are shown in the form.
pub async fn create_merchant_endpoint(
    State(state): State<CreateMerchantState>,
    Form(form): Form<MerchantFormData>,
) -> Response {
    match submit_new_merchant(&state.api, form.clone()).await {
        FormOutcome::Saved(merchant) => {
            let details = format!("{} was added as {}.", merchant.name, merchant.id);
            let content = html! {
                (merchant_form_view(
                    FormAction::Create,
                    &MerchantFormData::default(),
                    &FieldErrors::default(),
                    None,
                ))
                (Alert::success("Merchant Successfully Added", &details).into_oob_html())
            };

            ([(HX_TRIGGER, MERCHANTS_CHANGED_EVENT)], content).into_response()
        }
        FormOutcome::Invalid(errors) => {
            merchant_form_view(FormAction::Create, &form, &errors, None).into_response()
        }
        FormOutcome::Failed(_) => merchant_form_view(
            FormAction::Create,
            &form,
            &FieldErrors::default(),
            Some(CREATE_FAILED_MESSAGE),
        )
        .into_response(),
    }
}

fn new_merchant_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_MERCHANT_VIEW).into_html();
    let form = merchant_form_view(
        FormAction::Create,
        &MerchantFormData::default(),
        &FieldErrors::default(),
        None,
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Add New Merchant" }
            (form)
        }
    };

    base("Add Merchant", &content)
}

#[cfg(test)]
mod new_merchant_page_tests {
    use crate::{
        endpoints,
        merchant::get_new_merchant_page,
        test_utils::{
            assert_content_type, assert_form_input, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, must_get_form, parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let response = get_new_merchant_page().await;

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_MERCHANT, "hx-post");
        assert_form_input(&form, "name", "text");
    }
}
