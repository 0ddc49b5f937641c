use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDateTime;
use freightfin_core::{
    fees::{PlatformFee, PlatformFeeFilter, PlatformFeeServiceTrait, PlatformFeeStats},
    money::Money,
};
use serde::{Deserialize, Serialize};

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct RangeQuery {
    from: Option<NaiveDateTime>,
    to: Option<NaiveDateTime>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TotalResponse {
    total_collected: Money,
}

async fn list_platform_fees(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PlatformFeeFilter>,
) -> ApiResult<Json<Vec<PlatformFee>>> {
    Ok(Json(state.platform_fee_service.list_platform_fees(&filter)?))
}

async fn platform_fee_stats(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<PlatformFeeFilter>,
) -> ApiResult<Json<PlatformFeeStats>> {
    Ok(Json(state.platform_fee_service.stats(&filter)?))
}

async fn total_collected(
    State(state): State<Arc<AppState>>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Json<TotalResponse>> {
    let total_collected = state
        .platform_fee_service
        .total_collected(range.from, range.to)?;
    Ok(Json(TotalResponse { total_collected }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/platform-fees", get(list_platform_fees))
        .route("/platform-fees/stats", get(platform_fee_stats))
        .route("/platform-fees/total", get(total_collected))
}
