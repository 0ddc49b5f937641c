use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use freightfin_core::{
    money::Money,
    wallets::{
        LedgerEntry, SumBy, Transaction, TransactionCategory, TransactionFilter, TransactionType,
        Wallet, WalletServiceTrait,
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ApiError, ApiResult},
    main_lib::AppState,
};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceMovement {
    amount: Money,
    category: TransactionCategory,
    description: String,
}

#[derive(Deserialize)]
struct AmountRequest {
    amount: Money,
}

#[derive(Deserialize)]
struct SumQuery {
    #[serde(rename = "type")]
    txn_type: Option<TransactionType>,
    category: Option<TransactionCategory>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SumResponse {
    user_id: String,
    total: Money,
}

async fn get_wallet(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Wallet>> {
    let wallet = state.wallet_service.get_or_create_wallet(&user_id).await?;
    Ok(Json(wallet))
}

async fn list_transactions(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<TransactionFilter>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let txns = state.wallet_service.list_transactions(&user_id, &filter)?;
    Ok(Json(txns))
}

async fn sum_transactions(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Query(q): Query<SumQuery>,
) -> ApiResult<Json<SumResponse>> {
    let key = match (q.txn_type, q.category) {
        (Some(txn_type), None) => SumBy::Type(txn_type),
        (None, Some(category)) => SumBy::Category(category),
        _ => {
            return Err(ApiError::BadRequest(
                "exactly one of 'type' or 'category' is required".to_string(),
            ))
        }
    };
    let total = state.wallet_service.sum_by(&user_id, key)?;
    Ok(Json(SumResponse { user_id, total }))
}

async fn credit(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<BalanceMovement>,
) -> ApiResult<Json<LedgerEntry>> {
    let entry = state
        .wallet_service
        .credit(&user_id, body.amount, body.category, &body.description)
        .await?;
    Ok(Json(entry))
}

async fn debit(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<BalanceMovement>,
) -> ApiResult<Json<LedgerEntry>> {
    let entry = state
        .wallet_service
        .debit(&user_id, body.amount, body.category, &body.description)
        .await?;
    Ok(Json(entry))
}

async fn lock_withdrawal(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<AmountRequest>,
) -> ApiResult<Json<LedgerEntry>> {
    let entry = state
        .wallet_service
        .lock_for_withdrawal(&user_id, body.amount)
        .await?;
    Ok(Json(entry))
}

async fn settle_withdrawal(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<AmountRequest>,
) -> ApiResult<Json<LedgerEntry>> {
    let entry = state
        .wallet_service
        .settle_withdrawal(&user_id, body.amount)
        .await?;
    Ok(Json(entry))
}

async fn release_withdrawal(
    Path(user_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<AmountRequest>,
) -> ApiResult<Json<LedgerEntry>> {
    let entry = state
        .wallet_service
        .release_withdrawal(&user_id, body.amount)
        .await?;
    Ok(Json(entry))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/wallets/{user_id}", get(get_wallet))
        .route("/wallets/{user_id}/transactions", get(list_transactions))
        .route("/wallets/{user_id}/transactions/sum", get(sum_transactions))
        .route("/wallets/{user_id}/credit", post(credit))
        .route("/wallets/{user_id}/debit", post(debit))
        .route("/wallets/{user_id}/withdrawals/lock", post(lock_withdrawal))
        .route("/wallets/{user_id}/withdrawals/settle", post(settle_withdrawal))
        .route(
            "/wallets/{user_id}/withdrawals/release",
            post(release_withdrawal),
        )
}
