use std::sync::Arc;

use chrono::FixedOffset;
use validator::Validate;

use crate::dto::slot_dto::{CreateSlotRequest, SlotChangeResponse, SlotResponse};
use crate::dto::vehicle_dto::ParkedVehicleResponse;
use crate::dto::ApiResponse;
use crate::services::slot_registry::SlotChange;
use crate::services::SlotRegistry;
use crate::utils::errors::AppError;

pub struct SlotController {
    registry: Arc<SlotRegistry>,
    display_offset: FixedOffset,
}

impl SlotController {
    pub fn new(registry: Arc<SlotRegistry>, display_offset: FixedOffset) -> Self {
        Self {
            registry,
            display_offset,
        }
    }

    pub async fn create(
        &self,
        request: CreateSlotRequest,
    ) -> Result<ApiResponse<SlotChangeResponse>, AppError> {
        // Validar campos
        request.validate()?;

        let change = self.registry.create_slot(request.slot).await?;
        let message = match &change.assigned {
            Some(parked) => format!(
                "Parking slot {} created and assigned to queued vehicle {}.",
                change.slot.slot, parked.record.vehicle_number
            ),
            None => format!("Parking slot {} created.", change.slot.slot),
        };

        Ok(ApiResponse::success_with_message(self.change_response(change), message))
    }

    pub async fn list(&self) -> Result<Vec<SlotResponse>, AppError> {
        let slots = self.registry.list_slots().await?;
        Ok(slots.into_iter().map(SlotResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<SlotResponse, AppError> {
        Ok(self.registry.get_slot(id).await?.into())
    }

    pub async fn delete(&self, id: i64) -> Result<ApiResponse<SlotChangeResponse>, AppError> {
        let change = self.registry.delete_slot(id).await?;
        let message = format!("Parking spot {} has been deleted.", id);
        Ok(ApiResponse::success_with_message(self.change_response(change), message))
    }

    fn change_response(&self, change: SlotChange) -> SlotChangeResponse {
        SlotChangeResponse {
            slot: change.slot.into(),
            assigned_vehicle: change
                .assigned
                .map(|parked| ParkedVehicleResponse::new(parked, &self.display_offset)),
        }
    }
}
