use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::vehicle_dto::{
    CheckoutResponse, FeeQuoteResponse, ParkedVehicleResponse, QueueStatusResponse,
    RateQuery, RecordResponse, RegisterVehicleRequest, VehicleResponse,
};
use crate::dto::ApiResponse;
use crate::models::CheckoutTarget;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", post(register_vehicle).get(list_vehicles))
        .route("/vehicles/:id", delete(checkout_vehicle))
        .route("/vehicles/:id/fee", get(vehicle_fee))
        .route("/queue", get(queue_status))
        .route("/queue/:vehicle_number", delete(cancel_queued))
        .route("/records", get(list_records))
}

async fn register_vehicle(
    State(state): State<AppState>,
    Json(request): Json<RegisterVehicleRequest>,
) -> Result<Json<ApiResponse<ParkedVehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.ledger.clone());
    let response = controller.register(request).await?;
    Ok(Json(response))
}

async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let controller = VehicleController::new(state.ledger.clone());
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn vehicle_fee(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RateQuery>,
) -> Result<Json<FeeQuoteResponse>, AppError> {
    let controller = VehicleController::new(state.ledger.clone());
    let response = controller.fee(id, query.rate_per_hour).await?;
    Ok(Json(response))
}

// Checkout por id de registro
async fn checkout_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<RateQuery>,
) -> Result<Json<ApiResponse<CheckoutResponse>>, AppError> {
    let controller = VehicleController::new(state.ledger.clone());
    let response = controller
        .checkout(CheckoutTarget::VehicleId(id), query.rate_per_hour)
        .await?;
    Ok(Json(response))
}

async fn queue_status(State(state): State<AppState>) -> Json<QueueStatusResponse> {
    let controller = VehicleController::new(state.ledger.clone());
    Json(controller.queue_status().await)
}

async fn cancel_queued(
    State(state): State<AppState>,
    Path(vehicle_number): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = VehicleController::new(state.ledger.clone());
    let response = controller.cancel_queued(&vehicle_number).await?;
    Ok(Json(response))
}

async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<RecordResponse>>, AppError> {
    let controller = VehicleController::new(state.ledger.clone());
    let response = controller.records().await?;
    Ok(Json(response))
}
