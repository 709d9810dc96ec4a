//! Balance dashboard handlers

use crate::{error::ApiError, state::AppState};
use axum::{Json, extract::State};
use std::sync::Arc;
use storefront_client::{BalanceView, Operation};

/// Current dashboard view
pub async fn get_balance(State(state): State<Arc<AppState>>) -> Json<BalanceView> {
    Json(state.balance.view().await)
}

/// Fetch balances again and return the new view
pub async fn refresh_balance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BalanceView>, ApiError> {
    state
        .balance
        .refresh()
        .await
        .map_err(|e| ApiError::from_client(Operation::Balance, &e))?;
    Ok(Json(state.balance.view().await))
}
