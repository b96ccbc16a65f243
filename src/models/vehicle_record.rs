//! Modelo de VehicleRecord
//!
//! Registro de un vehículo estacionado. Mapea la tabla `vehicle_registrations`.
//! Los vehículos en cola no tienen registro; viven sólo en la `WaitQueue`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::parking_slot::ParkingSlot;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct VehicleRecord {
    pub id: i64,
    pub vehicle_number: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub parking_spot_id: Option<i64>,
}

/// Estado visible de un vehículo en los listados
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VehicleState {
    #[serde(rename = "parked")]
    Parked,
    #[serde(rename = "exited")]
    Exited,
    #[serde(rename = "in queue")]
    InQueue,
}

impl VehicleRecord {
    pub fn state(&self) -> VehicleState {
        if self.exit_time.is_some() {
            VehicleState::Exited
        } else {
            VehicleState::Parked
        }
    }
}

/// Registro activo junto con la plaza que ocupa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParkedVehicle {
    pub record: VehicleRecord,
    pub slot: ParkingSlot,
}

/// A quién se le hace el checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutTarget {
    VehicleId(i64),
    SlotNumber(i32),
}
