//! The page and endpoint for editing a merchant.

use axum::{
    Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};

use crate::{
    AppState, Error, endpoints,
    html::{FORM_CONTAINER_STYLE, base},
    merchant::{
        MerchantId, MerchantUpdate,
        form::{FormAction, FormOutcome, merchant_form_view},
        validation::{FieldErrors, MerchantFormData, validate_merchant_form},
    },
    navigation::NavBar,
    transport::{MockApi, Transport},
};

const UPDATE_FAILED_MESSAGE: &str = "Failed to update merchant. Please try again.";

/// The state needed for editing a merchant.
#[derive(Debug, Clone)]
pub struct EditMerchantState {
    pub api: MockApi,
}

impl FromRef<AppState> for EditMerchantState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// Validate `form` and, if it is valid, replace the fields of merchant `id`
/// through `api`.
pub async fn submit_merchant_update<T: Transport>(
    api: &T,
    id: &str,
    form: MerchantFormData,
) -> FormOutcome {
    let errors = validate_merchant_form(&form);
    if !errors.is_empty() {
        return FormOutcome::Invalid(errors);
    }

    let update = MerchantUpdate::from(form.into_new_merchant());

    match api.update_merchant(id, update).await {
        Ok(merchant) => FormOutcome::Saved(merchant),
        Err(error) => {
            tracing::error!("could not update merchant {id}: {error}");
            FormOutcome::Failed(error)
        }
    }
}

/// Render the edit page with the form filled in from the stored merchant.
///
/// The merchant is fetched on every request so the form never shows
/// values from an earlier visit.
pub async fn get_edit_merchant_page(
    Path(merchant_id): Path<MerchantId>,
    State(state): State<EditMerchantState>,
) -> Result<Response, Error> {
    let merchant = state
        .api
        .get_merchant(&merchant_id)
        .await
        .inspect_err(|error| tracing::error!("could not get merchant {merchant_id}: {error}"))?;

    Ok(edit_merchant_view(&merchant.id, &MerchantFormData::from(&merchant)).into_response())
}

/// Handle the edit merchant form, redirecting to the merchant list on success.
pub async fn update_merchant_endpoint(
    Path(merchant_id): Path<MerchantId>,
    State(state): State<EditMerchantState>,
    Form(form): Form<MerchantFormData>,
) -> Response {
    let action = FormAction::Update {
        merchant_id: &merchant_id,
    };

    match submit_merchant_update(&state.api, &merchant_id, form.clone()).await {
        FormOutcome::Saved(_) => (
            HxRedirect(endpoints::MERCHANTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        FormOutcome::Invalid(errors) => {
            merchant_form_view(action, &form, &errors, None).into_response()
        }
        FormOutcome::Failed(_) => merchant_form_view(
            action,
            &form,
            &FieldErrors::default(),
            Some(UPDATE_FAILED_MESSAGE),
        )
        .into_response(),
    }
}

fn edit_merchant_view(merchant_id: &str, form: &MerchantFormData) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_MERCHANT_VIEW, merchant_id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let form = merchant_form_view(
        FormAction::Update { merchant_id },
        form,
        &FieldErrors::default(),
        None,
    );

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold" { "Edit Merchant " (merchant_id) }
            (form)
        }
    };

    base("Edit Merchant", &content)
}

#[cfg(test)]
mod edit_merchant_page_tests {
    use axum::{
        extract::{Path, State},
        http::StatusCode,
    };

    use crate::{
        Error,
        merchant::{MerchantUpdate, edit::EditMerchantState, get_edit_merchant_page},
        test_utils::{
            assert_form_input_with_value, assert_hx_endpoint, assert_status_ok,
            assert_valid_html, must_get_form, parse_html_document, test_api,
        },
        transport::Transport,
    };

    #[tokio::test]
    async fn form_is_filled_with_stored_merchant() {
        let state = EditMerchantState { api: test_api() };

        let response = get_edit_merchant_page(Path("MCH-00001".to_owned()), State(state))
            .await
            .unwrap();

        assert_status_ok(&response);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, "/merchants/MCH-00001", "hx-put");
        assert_form_input_with_value(&form, "name", "text", "Acme");
        assert_form_input_with_value(&form, "phone", "tel", "555-0100");
    }

    #[tokio::test]
    async fn form_is_reseeded_on_every_visit() {
        let state = EditMerchantState { api: test_api() };
        state
            .api
            .update_merchant(
                "MCH-00001",
                MerchantUpdate {
                    name: Some("Acme Corp".to_owned()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let response = get_edit_merchant_page(Path("MCH-00001".to_owned()), State(state))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_form_input_with_value(&form, "name", "text", "Acme Corp");
    }

    #[tokio::test]
    async fn unknown_merchant_is_not_found() {
        let state = EditMerchantState { api: test_api() };

        let result = get_edit_merchant_page(Path("MCH-99999".to_owned()), State(state)).await;

        let error = result.err().expect("want an error for an unknown merchant");
        assert_eq!(error, Error::NotFound);
        assert_eq!(
            axum::response::IntoResponse::into_response(error).status(),
            StatusCode::NOT_FOUND
        );
    }
}

#[cfg(test)]
mod update_merchant_endpoint_tests {
    use axum::{
        Form,
        extract::{Path, State},
    };
    use scraper::Selector;

    use crate::{
        endpoints,
        merchant::{
            MerchantStatus, edit::EditMerchantState, update_merchant_endpoint,
            validation::MerchantFormData,
        },
        test_utils::{
            acme, assert_field_error, assert_hx_redirect, assert_form_input_with_value,
            must_get_form, parse_html_fragment, test_api,
        },
        transport::Transport,
    };

    fn edited_form() -> MerchantFormData {
        MerchantFormData {
            name: "Acme Corp".to_owned(),
            status: MerchantStatus::Inactive,
            ..MerchantFormData::from(&acme())
        }
    }

    #[tokio::test]
    async fn valid_update_redirects_to_merchant_list() {
        let state = EditMerchantState { api: test_api() };

        let response = update_merchant_endpoint(
            Path("MCH-00001".to_owned()),
            State(state.clone()),
            Form(edited_form()),
        )
        .await;

        assert_hx_redirect(&response, endpoints::MERCHANTS_VIEW);
        let merchant = state.api.get_merchant("MCH-00001").await.unwrap();
        assert_eq!(merchant.name, "Acme Corp");
        assert_eq!(merchant.status, MerchantStatus::Inactive);
        assert_eq!(merchant.email, "ops@acme.test");
    }

    #[tokio::test]
    async fn invalid_update_shows_errors_without_redirect() {
        let state = EditMerchantState { api: test_api() };
        let form = MerchantFormData {
            address: String::new(),
            ..edited_form()
        };

        let response =
            update_merchant_endpoint(Path("MCH-00001".to_owned()), State(state.clone()), Form(form))
                .await;

        assert!(response.headers().get("hx-redirect").is_none());
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_field_error(&form, "address", "Address is required");

        let merchant = state.api.get_merchant("MCH-00001").await.unwrap();
        assert_eq!(merchant.name, "Acme");
    }

    #[tokio::test]
    async fn failed_update_shows_banner_and_keeps_form_open() {
        let state = EditMerchantState { api: test_api() };
        state.api.set_offline(true);

        let response = update_merchant_endpoint(
            Path("MCH-00001".to_owned()),
            State(state),
            Form(edited_form()),
        )
        .await;

        assert!(response.headers().get("hx-redirect").is_none());
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        let banner = form
            .select(&Selector::parse("div[role=alert]").unwrap())
            .next()
            .expect("No banner found");
        assert_eq!(
            banner.text().collect::<String>().trim(),
            "Failed to update merchant. Please try again."
        );
        assert_form_input_with_value(&form, "name", "text", "Acme Corp");
    }
}
