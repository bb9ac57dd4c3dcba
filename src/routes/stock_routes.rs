use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::stock_controller::StockController;
use crate::dto::common::ApiResponse;
use crate::dto::stock_dto::{StockEntryRequest, StockMovementResponse, StockResponse};
use crate::routes::actor_from_headers;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_stock_router() -> Router<AppState> {
    Router::new()
        .route("/entry", post(stock_entry))
        .route("/:product_id", get(get_stock))
        .route("/:product_id/movements", get(get_movements))
}

#[derive(Debug, Deserialize)]
struct StockQuery {
    warehouse_id: Uuid,
}

async fn stock_entry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<StockEntryRequest>,
) -> Result<Json<ApiResponse<StockResponse>>, AppError> {
    let actor = actor_from_headers(&headers)?;
    let controller = StockController::new(state.pool.clone());
    let response = controller.entry(actor, request).await?;
    Ok(Json(response))
}

async fn get_stock(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(query): Query<StockQuery>,
) -> Result<Json<StockResponse>, AppError> {
    let controller = StockController::new(state.pool.clone());
    let response = controller.get(product_id, query.warehouse_id).await?;
    Ok(Json(response))
}

async fn get_movements(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Vec<StockMovementResponse>>, AppError> {
    let controller = StockController::new(state.pool.clone());
    let response = controller.movements(product_id, query.warehouse_id).await?;
    Ok(Json(response))
}
