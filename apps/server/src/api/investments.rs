use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use freightfin_core::{
    investments::{Investment, InvestmentFilter, InvestmentRepositoryTrait},
    utils::time_utils::now_utc,
};

use crate::{error::ApiResult, main_lib::AppState};

async fn list_investments(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<InvestmentFilter>,
) -> ApiResult<Json<Vec<Investment>>> {
    Ok(Json(state.investment_repository.list_investments(&filter)?))
}

async fn list_overdue(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Investment>>> {
    Ok(Json(state.investment_repository.list_overdue(now_utc())?))
}

async fn get_investment(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Investment>> {
    Ok(Json(state.investment_repository.get_investment(&id)?))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/investments", get(list_investments))
        .route("/investments/overdue", get(list_overdue))
        .route("/investments/{id}", get(get_investment))
}
