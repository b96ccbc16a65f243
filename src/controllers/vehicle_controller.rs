use std::sync::Arc;

use chrono::FixedOffset;
use validator::Validate;

use crate::dto::vehicle_dto::{
    CheckoutResponse, FeeQuoteResponse, ParkedVehicleResponse, QueueStatusResponse,
    RecordResponse, RegisterVehicleRequest, VehicleResponse,
};
use crate::dto::ApiResponse;
use crate::models::CheckoutTarget;
use crate::services::VehicleLedger;
use crate::utils::errors::AppError;

pub struct VehicleController {
    ledger: Arc<VehicleLedger>,
    display_offset: FixedOffset,
}

impl VehicleController {
    pub fn new(ledger: Arc<VehicleLedger>) -> Self {
        let display_offset = ledger.config().display_offset;
        Self {
            ledger,
            display_offset,
        }
    }

    pub async fn register(
        &self,
        request: RegisterVehicleRequest,
    ) -> Result<ApiResponse<ParkedVehicleResponse>, AppError> {
        request.validate()?;

        let parked = self.ledger.register_vehicle(&request.vehicle_number).await?;
        let message = format!(
            "Vehicle {} parked in slot {}.",
            parked.record.vehicle_number, parked.slot.slot
        );
        Ok(ApiResponse::success_with_message(
            ParkedVehicleResponse::new(parked, &self.display_offset),
            message,
        ))
    }

    pub async fn list(&self) -> Result<Vec<VehicleResponse>, AppError> {
        let listing = self.ledger.list_vehicles().await?;
        Ok(listing.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn fee(&self, vehicle_id: i64, rate_per_hour: Option<i64>) -> Result<FeeQuoteResponse, AppError> {
        let quote = self.ledger.compute_fee(vehicle_id, rate_per_hour).await?;
        Ok(FeeQuoteResponse::new(quote, &self.display_offset))
    }

    pub async fn checkout(
        &self,
        target: CheckoutTarget,
        rate_per_hour: Option<i64>,
    ) -> Result<ApiResponse<CheckoutResponse>, AppError> {
        let receipt = self.ledger.checkout(target, rate_per_hour).await?;

        let message = format!(
            "Vehicle {} checked out from slot {}. Parking fee: {}.",
            receipt.quote.vehicle_number, receipt.quote.slot_number, receipt.quote.parking_fee
        );
        let response = CheckoutResponse {
            message: message.clone(),
            fee: FeeQuoteResponse::new(receipt.quote, &self.display_offset),
            released_slot: receipt.released_slot.into(),
            assigned_vehicle: receipt
                .reassigned
                .map(|parked| ParkedVehicleResponse::new(parked, &self.display_offset)),
        };
        Ok(ApiResponse::success_with_message(response, message))
    }

    pub async fn queue_status(&self) -> QueueStatusResponse {
        self.ledger.queue_status().await.into()
    }

    pub async fn cancel_queued(&self, vehicle_number: &str) -> Result<ApiResponse<()>, AppError> {
        self.ledger.cancel_queued(vehicle_number).await?;
        Ok(ApiResponse::message(format!(
            "Vehicle {} removed from the waiting queue.",
            vehicle_number
        )))
    }

    pub async fn records(&self) -> Result<Vec<RecordResponse>, AppError> {
        let entries = self.ledger.list_all_records().await?;
        Ok(entries.into_iter().map(RecordResponse::from).collect())
    }
}
