use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::controllers::slot_controller::SlotController;
use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::slot_dto::{CreateSlotRequest, SlotChangeResponse, SlotResponse};
use crate::dto::vehicle_dto::{CheckoutResponse, RateQuery};
use crate::dto::ApiResponse;
use crate::models::CheckoutTarget;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_slot_router() -> Router<AppState> {
    Router::new()
        .route("/slots", post(create_slot).get(list_slots))
        .route("/slots/:id", get(get_slot).delete(delete_slot))
        .route("/checkout/slot/:number", post(checkout_slot))
}

fn controller(state: &AppState) -> SlotController {
    SlotController::new(state.registry.clone(), state.config.parking.display_offset)
}

async fn create_slot(
    State(state): State<AppState>,
    Json(request): Json<CreateSlotRequest>,
) -> Result<Json<ApiResponse<SlotChangeResponse>>, AppError> {
    let response = controller(&state).create(request).await?;
    Ok(Json(response))
}

async fn list_slots(State(state): State<AppState>) -> Result<Json<Vec<SlotResponse>>, AppError> {
    let response = controller(&state).list().await?;
    Ok(Json(response))
}

async fn get_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SlotResponse>, AppError> {
    let response = controller(&state).get_by_id(id).await?;
    Ok(Json(response))
}

async fn delete_slot(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SlotChangeResponse>>, AppError> {
    let response = controller(&state).delete(id).await?;
    Ok(Json(response))
}

// Checkout por número de plaza
async fn checkout_slot(
    State(state): State<AppState>,
    Path(number): Path<i32>,
    Query(query): Query<RateQuery>,
) -> Result<Json<ApiResponse<CheckoutResponse>>, AppError> {
    let controller = VehicleController::new(state.ledger.clone());
    let response = controller
        .checkout(CheckoutTarget::SlotNumber(number), query.rate_per_hour)
        .await?;
    Ok(Json(response))
}
