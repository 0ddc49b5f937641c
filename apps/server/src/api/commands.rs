use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use freightfin_core::lifecycle::{CommandOutcome, LedgerCommand};

use crate::{error::ApiResult, main_lib::AppState};

/// Single entry point for every money-moving lifecycle operation.
async fn execute_command(
    State(state): State<Arc<AppState>>,
    Json(command): Json<LedgerCommand>,
) -> ApiResult<Json<CommandOutcome>> {
    tracing::debug!("Executing {}", command.name());
    let outcome = state.coordinator.execute(command).await?;
    Ok(Json(outcome))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/commands", post(execute_command))
}
