//! The JSON route for listing transactions.

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    transport::{MockApi, TransactionQuery, Transport},
};

#[derive(Debug, Clone)]
pub struct TransactionApiState {
    pub api: MockApi,
}

impl FromRef<AppState> for TransactionApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            api: state.api.clone(),
        }
    }
}

/// `GET /api/transactions?merchantId=&page=&size=`, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionApiState>,
    Query(query): Query<TransactionQuery>,
) -> Response {
    match state.api.list_transactions(query).await {
        Ok(page) => Json(page).into_response(),
        Err(error) => error.into_json_response(),
    }
}
