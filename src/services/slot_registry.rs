//! Slot Registry
//!
//! Alta, consulta y baja de plazas. Cada cambio de capacidad avisa al
//! ledger para que un vehículo en espera pueda ocupar la plaza.

use std::sync::Arc;

use log::{error, info};

use crate::models::{ParkedVehicle, ParkingSlot, SlotDeletion};
use crate::repositories::ParkingStore;
use crate::services::vehicle_ledger::VehicleLedger;
use crate::utils::errors::{not_found_error, AppError, AppResult};
use crate::utils::validation::{MAX_SLOT_NUMBER, MIN_SLOT_NUMBER};

/// Plaza afectada por una operación y el vehículo que salió de la cola, si alguno
#[derive(Debug, Clone)]
pub struct SlotChange {
    pub slot: ParkingSlot,
    pub assigned: Option<ParkedVehicle>,
}

pub struct SlotRegistry {
    store: Arc<dyn ParkingStore>,
    ledger: Arc<VehicleLedger>,
}

impl SlotRegistry {
    pub fn new(store: Arc<dyn ParkingStore>, ledger: Arc<VehicleLedger>) -> Self {
        Self { store, ledger }
    }

    pub async fn create_slot(&self, number: i32) -> AppResult<SlotChange> {
        if number > MAX_SLOT_NUMBER {
            return Err(AppError::Validation(format!(
                "Slot number cannot exceed {}.",
                MAX_SLOT_NUMBER
            )));
        }
        if number < MIN_SLOT_NUMBER {
            return Err(AppError::Validation(format!(
                "Slot number must be at least {}.",
                MIN_SLOT_NUMBER
            )));
        }

        // Cola bloqueada durante el alta: la plaza nueva es para la cabeza de la cola
        let mut queue = self.ledger.lock_queue().await;
        let created = self.store.insert_slot(number).await?;
        info!("🅿️ Plaza {} creada (id {})", created.slot, created.id);

        let assigned = log_drain_error("create", created.id, queue.drain().await);
        drop(queue);

        let slot = self.store.find_slot(created.id).await?.unwrap_or(created);
        Ok(SlotChange { slot, assigned })
    }

    pub async fn list_slots(&self) -> AppResult<Vec<ParkingSlot>> {
        self.store.list_slots().await
    }

    pub async fn get_slot(&self, id: i64) -> AppResult<ParkingSlot> {
        self.store
            .find_slot(id)
            .await?
            .ok_or_else(|| not_found_error("Parking slot", &id.to_string()))
    }

    /// Borra una plaza libre. Una plaza ocupada no se puede borrar: primero
    /// hay que hacer checkout del vehículo.
    pub async fn delete_slot(&self, id: i64) -> AppResult<SlotChange> {
        let mut queue = self.ledger.lock_queue().await;
        match self.store.delete_available_slot(id).await? {
            SlotDeletion::Missing => Err(AppError::NotFound("Slot not found.".to_string())),
            SlotDeletion::Occupied(slot) => Err(AppError::Conflict(format!(
                "Slot {} is {}; check the vehicle out before deleting it.",
                slot.slot,
                slot.status.as_str()
            ))),
            SlotDeletion::Deleted(slot) => {
                info!("🗑️ Plaza {} eliminada (id {})", slot.slot, slot.id);
                let assigned = log_drain_error("delete", slot.id, queue.drain().await);
                Ok(SlotChange { slot, assigned })
            }
        }
    }
}

fn log_drain_error(operation: &str, slot_id: i64, drained: AppResult<Option<ParkedVehicle>>) -> Option<ParkedVehicle> {
    match drained {
        Ok(assigned) => assigned,
        Err(e) => {
            error!("❌ Error vaciando la cola tras {} de la plaza {}: {}", operation, slot_id, e);
            None
        }
    }
}
