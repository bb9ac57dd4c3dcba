use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::maintenance_order_controller::MaintenanceOrderController;
use crate::dto::common::ApiResponse;
use crate::dto::maintenance_order_dto::{
    CreateMaintenanceOrderRequest, MaintenanceOrderListResponse, MaintenanceOrderResponse,
    TimelineEventResponse, TransitionRequest, UpdateMaintenanceOrderRequest,
};
use crate::routes::actor_from_headers;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_maintenance_order_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/", get(list_orders))
        .route("/:id", get(get_order))
        .route("/:id", put(update_order))
        .route("/:id", delete(remove_order))
        .route("/:id/start", post(start_order))
        .route("/:id/pause", post(pause_order))
        .route("/:id/complete", post(complete_order))
        .route("/:id/cancel", post(cancel_order))
        .route("/:id/timeline", get(get_timeline))
}

#[derive(Debug, Deserialize)]
struct ListOrdersQuery {
    branch_id: Option<Uuid>,
}

fn controller(state: &AppState) -> MaintenanceOrderController {
    MaintenanceOrderController::new(state.pool.clone(), state.config.default_company_id)
}

async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateMaintenanceOrderRequest>,
) -> Result<Json<ApiResponse<MaintenanceOrderResponse>>, AppError> {
    let actor = actor_from_headers(&headers)?;
    let response = controller(&state).create(actor, request).await?;
    Ok(Json(response))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<MaintenanceOrderListResponse>>, AppError> {
    let response = controller(&state).list(query.branch_id).await?;
    Ok(Json(response))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaintenanceOrderResponse>, AppError> {
    let response = controller(&state).get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<UpdateMaintenanceOrderRequest>,
) -> Result<Json<ApiResponse<MaintenanceOrderResponse>>, AppError> {
    let actor = actor_from_headers(&headers)?;
    let response = controller(&state).update(id, actor, request).await?;
    Ok(Json(response))
}

async fn remove_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    controller(&state).remove(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Orden de mantenimiento eliminada exitosamente"
    })))
}

async fn start_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    request: Option<Json<TransitionRequest>>,
) -> Result<Json<ApiResponse<MaintenanceOrderResponse>>, AppError> {
    let actor = actor_from_headers(&headers)?;
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let response = controller(&state).start(id, actor, request).await?;
    Ok(Json(response))
}

async fn pause_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    request: Option<Json<TransitionRequest>>,
) -> Result<Json<ApiResponse<MaintenanceOrderResponse>>, AppError> {
    let actor = actor_from_headers(&headers)?;
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let response = controller(&state).pause(id, actor, request).await?;
    Ok(Json(response))
}

async fn complete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    request: Option<Json<TransitionRequest>>,
) -> Result<Json<ApiResponse<MaintenanceOrderResponse>>, AppError> {
    let actor = actor_from_headers(&headers)?;
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let response = controller(&state).complete(id, actor, request).await?;
    Ok(Json(response))
}

async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    request: Option<Json<TransitionRequest>>,
) -> Result<Json<ApiResponse<MaintenanceOrderResponse>>, AppError> {
    let actor = actor_from_headers(&headers)?;
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let response = controller(&state).cancel(id, actor, request).await?;
    Ok(Json(response))
}

async fn get_timeline(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TimelineEventResponse>>, AppError> {
    let response = controller(&state).timeline(id).await?;
    Ok(Json(response))
}
