use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::slot_dto::SlotResponse;
use crate::models::{ParkedVehicle, VehicleState};
use crate::services::fee_calculator::format_clock_time;
use crate::services::vehicle_ledger::{FeeQuote, LedgerEntry, QueueStatus, VehicleListing};
use crate::utils::validation::validate_vehicle_number;

// Request para registrar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterVehicleRequest {
    #[validate(custom = "validate_vehicle_number")]
    pub vehicle_number: String,
}

// Query opcional para sobreescribir la tarifa por hora
#[derive(Debug, Default, Deserialize)]
pub struct RateQuery {
    pub rate_per_hour: Option<i64>,
}

// Vehículo recién estacionado
#[derive(Debug, Serialize, Clone)]
pub struct ParkedVehicleResponse {
    pub id: i64,
    pub vehicle_number: String,
    pub entry_time: DateTime<Utc>,
    pub entry_time_display: String,
    pub parking_spot: SlotResponse,
}

impl ParkedVehicleResponse {
    pub fn new(parked: ParkedVehicle, offset: &FixedOffset) -> Self {
        Self {
            id: parked.record.id,
            entry_time_display: format_clock_time(parked.record.entry_time, offset),
            entry_time: parked.record.entry_time,
            vehicle_number: parked.record.vehicle_number,
            parking_spot: parked.slot.into(),
        }
    }
}

// Vehículo activo en el listado, con tarifa estimada
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: i64,
    pub vehicle_number: String,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub parking_fee: i64,
    pub parking_spot: SlotResponse,
}

impl From<VehicleListing> for VehicleResponse {
    fn from(listing: VehicleListing) -> Self {
        let VehicleListing { parked, parking_fee } = listing;
        Self {
            id: parked.record.id,
            vehicle_number: parked.record.vehicle_number,
            entry_time: parked.record.entry_time,
            exit_time: parked.record.exit_time,
            parking_fee,
            parking_spot: parked.slot.into(),
        }
    }
}

// Presupuesto / factura de una estancia
#[derive(Debug, Serialize)]
pub struct FeeQuoteResponse {
    pub vehicle_id: i64,
    pub vehicle_number: String,
    pub parking_spot_id: i64,
    pub slot: i32,
    pub entry_time: String,
    pub exit_time: String,
    pub hours: i64,
    pub rate_per_hour: i64,
    pub parking_fee: i64,
}

impl FeeQuoteResponse {
    pub fn new(quote: FeeQuote, offset: &FixedOffset) -> Self {
        Self {
            vehicle_id: quote.vehicle_id,
            vehicle_number: quote.vehicle_number,
            parking_spot_id: quote.parking_spot_id,
            slot: quote.slot_number,
            entry_time: format_clock_time(quote.entry_time, offset),
            exit_time: format_clock_time(quote.exit_time, offset),
            hours: quote.billable_hours,
            rate_per_hour: quote.rate_per_hour,
            parking_fee: quote.parking_fee,
        }
    }
}

// Response de checkout
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub message: String,
    pub fee: FeeQuoteResponse,
    pub released_slot: SlotResponse,
    pub assigned_vehicle: Option<ParkedVehicleResponse>,
}

// Estado de la cola
#[derive(Debug, Serialize)]
pub struct QueueStatusResponse {
    pub queued: usize,
    pub vehicles: Vec<String>,
}

impl From<QueueStatus> for QueueStatusResponse {
    fn from(status: QueueStatus) -> Self {
        Self {
            queued: status.queued,
            vehicles: status.vehicles,
        }
    }
}

// Entrada del listado completo; los vehículos en cola no tienen horas, tarifa ni plaza
#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub id: Option<i64>,
    pub vehicle_number: String,
    pub status: VehicleState,
    pub entry_time: Option<DateTime<Utc>>,
    pub exit_time: Option<DateTime<Utc>>,
    pub parking_fee: Option<i64>,
    pub parking_spot: Option<SlotResponse>,
    pub queue_position: Option<usize>,
}

impl From<LedgerEntry> for RecordResponse {
    fn from(entry: LedgerEntry) -> Self {
        match entry {
            LedgerEntry::Active(VehicleListing { parked, parking_fee }) => Self {
                id: Some(parked.record.id),
                status: parked.record.state(),
                vehicle_number: parked.record.vehicle_number,
                entry_time: Some(parked.record.entry_time),
                exit_time: parked.record.exit_time,
                parking_fee: Some(parking_fee),
                parking_spot: Some(parked.slot.into()),
                queue_position: None,
            },
            LedgerEntry::Queued { vehicle_number, position } => Self {
                id: None,
                vehicle_number,
                status: VehicleState::InQueue,
                entry_time: None,
                exit_time: None,
                parking_fee: None,
                parking_spot: None,
                queue_position: Some(position),
            },
        }
    }
}
