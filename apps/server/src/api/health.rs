use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use freightfin_core::wallets::LedgerRepositoryTrait;
use serde::Serialize;

use crate::{error::ApiResult, main_lib::AppState};

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReadyResponse {
    status: &'static str,
    platform_account_id: String,
}

/// Ready once the database answers a read.
async fn readyz(State(state): State<Arc<AppState>>) -> ApiResult<Json<ReadyResponse>> {
    state
        .ledger_repository
        .get_wallet(&state.ledger_config.platform_account_id)?;
    Ok(Json(ReadyResponse {
        status: "ok",
        platform_account_id: state.ledger_config.platform_account_id.clone(),
    }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
}
