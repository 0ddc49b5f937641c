use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use freightfin_core::trips::{NewTrip, Trip, TripBid, TripFilter, TripServiceTrait, TripStatus};
use serde::Deserialize;

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Deserialize)]
struct StatusUpdate {
    status: TripStatus,
}

async fn create_trip(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewTrip>,
) -> ApiResult<Json<Trip>> {
    let trip = state.trip_service.create_trip(input).await?;
    Ok(Json(trip))
}

async fn list_trips(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TripFilter>,
) -> ApiResult<Json<Vec<Trip>>> {
    Ok(Json(state.trip_service.list_trips(&filter)?))
}

async fn get_trip(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Trip>> {
    Ok(Json(state.trip_service.get_trip(&id)?))
}

async fn list_bids(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TripBid>>> {
    // surfaces 404 for unknown trips instead of an empty list
    state.trip_service.get_trip(&id)?;
    Ok(Json(state.trip_service.list_bids(&id)?))
}

async fn update_status(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<StatusUpdate>,
) -> ApiResult<Json<Trip>> {
    let trip = state.trip_service.transition_status(&id, body.status).await?;
    Ok(Json(trip))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route("/trips/{id}", get(get_trip))
        .route("/trips/{id}/bids", get(list_bids))
        .route("/trips/{id}/status", put(update_status))
}
