use serde::{Deserialize, Serialize};
use validator::Validate;

use super::vehicle_dto::ParkedVehicleResponse;
use crate::models::{ParkingSlot, SlotStatus};

// Request para crear una plaza
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSlotRequest {
    #[validate(range(min = 1, max = 20, message = "Slot number must be between 1 and 20."))]
    pub slot: i32,
}

// Response de plaza
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SlotResponse {
    pub id: i64,
    pub slot: i32,
    pub status: SlotStatus,
}

impl From<ParkingSlot> for SlotResponse {
    fn from(slot: ParkingSlot) -> Self {
        Self {
            id: slot.id,
            slot: slot.slot,
            status: slot.status,
        }
    }
}

// Plaza creada o eliminada, junto con el vehículo que salió de la cola
#[derive(Debug, Serialize)]
pub struct SlotChangeResponse {
    pub slot: SlotResponse,
    pub assigned_vehicle: Option<ParkedVehicleResponse>,
}
