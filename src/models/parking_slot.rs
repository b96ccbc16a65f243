//! Modelo de ParkingSlot
//!
//! Mapea la tabla `parking_slots` y el ENUM `slot_status` de PostgreSQL.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

/// Estado de la plaza - mapea al ENUM slot_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "slot_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Available,
    Occupied,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Available => "available",
            SlotStatus::Occupied => "occupied",
        }
    }
}

/// Plaza de estacionamiento
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct ParkingSlot {
    pub id: i64,
    pub slot: i32,
    pub status: SlotStatus,
}

impl ParkingSlot {
    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }
}

/// Resultado de intentar borrar una plaza
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotDeletion {
    Deleted(ParkingSlot),
    Occupied(ParkingSlot),
    Missing,
}
