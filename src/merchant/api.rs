//! The JSON routes of the merchant API.

use axum::{
    Json,
    extract::{FromRef, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    merchant::{MerchantId, MerchantUpdate, NewMerchant},
    transport::{MerchantQuery, MockApi, Transport},
};

/// The state needed for the merchant API routes.
#[derive(Debug, Clone)]
pub struct MerchantApiState {
    pub api: MockApi,
}

impl FromRef<AppState> for MerchantApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// `GET /api/merchants?sort=&search=`
pub async fn list_merchants_endpoint(
    State(state): State<MerchantApiState>,
    Query(query): Query<MerchantQuery>,
) -> Response {
    match state.api.list_merchants(query).await {
        Ok(merchants) => Json(merchants).into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// `GET /api/merchants/{merchant_id}`
pub async fn get_merchant_endpoint(
    Path(merchant_id): Path<MerchantId>,
    State(state): State<MerchantApiState>,
) -> Response {
    match state.api.get_merchant(&merchant_id).await {
        Ok(merchant) => Json(merchant).into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// `POST /api/merchants`, responds with 201 and the stored merchant.
pub async fn post_merchant_endpoint(
    State(state): State<MerchantApiState>,
    Json(merchant): Json<NewMerchant>,
) -> Response {
    match state.api.create_merchant(merchant).await {
        Ok(merchant) => (StatusCode::CREATED, Json(merchant)).into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// `PUT /api/merchants/{merchant_id}`
pub async fn put_merchant_endpoint(
    Path(merchant_id): Path<MerchantId>,
    State(state): State<MerchantApiState>,
    Json(update): Json<MerchantUpdate>,
) -> Response {
    match state.api.update_merchant(&merchant_id, update).await {
        Ok(merchant) => Json(merchant).into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// `GET /api/merchants/{merchant_id}/stats`
pub async fn merchant_stats_endpoint(
    Path(merchant_id): Path<MerchantId>,
    State(state): State<MerchantApiState>,
) -> Response {
    match state.api.merchant_stats(&merchant_id).await {
        Ok(stats) => Json(stats).into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// `GET /api/merchants/{merchant_id}/transactions`
pub async fn merchant_transactions_endpoint(
    Path(merchant_id): Path<MerchantId>,
    State(state): State<MerchantApiState>,
) -> Response {
    match state.api.merchant_transactions(&merchant_id).await {
        Ok(transactions) => Json(transactions).into_response(),
        Err(error) => error.into_json_response(),
    }
}
