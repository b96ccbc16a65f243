use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::ParkingStore;
use crate::models::{ParkedVehicle, ParkingSlot, SlotDeletion, SlotStatus, VehicleRecord};
use crate::utils::errors::{conflict_error, internal_error, AppResult};

#[derive(Debug, Default)]
struct StoreState {
    slots: BTreeMap<i64, ParkingSlot>,
    vehicles: BTreeMap<i64, VehicleRecord>,
    next_slot_id: i64,
    next_vehicle_id: i64,
}

impl StoreState {
    fn join(&self, record: &VehicleRecord) -> AppResult<ParkedVehicle> {
        let slot = record
            .parking_spot_id
            .and_then(|id| self.slots.get(&id))
            .cloned()
            .ok_or_else(|| internal_error(&format!("vehicle {} references a missing slot", record.id)))?;
        Ok(ParkedVehicle { record: record.clone(), slot })
    }
}

/// Store en memoria. Cada operación toma un único lock de escritura,
/// lo que hace atómicos el claim y el release.
#[derive(Debug, Default)]
pub struct InMemoryParkingStore {
    state: RwLock<StoreState>,
}

impl InMemoryParkingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParkingStore for InMemoryParkingStore {
    async fn insert_slot(&self, number: i32) -> AppResult<ParkingSlot> {
        let mut state = self.state.write().await;
        if state.slots.values().any(|s| s.slot == number) {
            return Err(conflict_error("Parking slot", "number", &number.to_string()));
        }

        state.next_slot_id += 1;
        let slot = ParkingSlot {
            id: state.next_slot_id,
            slot: number,
            status: SlotStatus::Available,
        };
        state.slots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    async fn list_slots(&self) -> AppResult<Vec<ParkingSlot>> {
        let state = self.state.read().await;
        Ok(state.slots.values().cloned().collect())
    }

    async fn find_slot(&self, id: i64) -> AppResult<Option<ParkingSlot>> {
        let state = self.state.read().await;
        Ok(state.slots.get(&id).cloned())
    }

    async fn delete_available_slot(&self, id: i64) -> AppResult<SlotDeletion> {
        let mut state = self.state.write().await;
        match state.slots.get(&id).cloned() {
            None => Ok(SlotDeletion::Missing),
            Some(slot) if !slot.is_available() => Ok(SlotDeletion::Occupied(slot)),
            Some(slot) => {
                state.slots.remove(&id);
                Ok(SlotDeletion::Deleted(slot))
            }
        }
    }

    async fn find_vehicle(&self, id: i64) -> AppResult<Option<ParkedVehicle>> {
        let state = self.state.read().await;
        state.vehicles.get(&id).map(|v| state.join(v)).transpose()
    }

    async fn find_vehicle_by_number(&self, vehicle_number: &str) -> AppResult<Option<VehicleRecord>> {
        let state = self.state.read().await;
        Ok(state
            .vehicles
            .values()
            .find(|v| v.vehicle_number == vehicle_number)
            .cloned())
    }

    async fn find_vehicle_by_slot_number(&self, slot_number: i32) -> AppResult<Option<ParkedVehicle>> {
        let state = self.state.read().await;
        let Some(slot_id) = state.slots.values().find(|s| s.slot == slot_number).map(|s| s.id) else {
            return Ok(None);
        };
        state
            .vehicles
            .values()
            .find(|v| v.parking_spot_id == Some(slot_id))
            .map(|v| state.join(v))
            .transpose()
    }

    async fn list_parked(&self) -> AppResult<Vec<ParkedVehicle>> {
        let state = self.state.read().await;
        state.vehicles.values().map(|v| state.join(v)).collect()
    }

    async fn claim_slot(
        &self,
        vehicle_number: &str,
        entry_time: DateTime<Utc>,
    ) -> AppResult<Option<ParkedVehicle>> {
        let mut state = self.state.write().await;
        if state.vehicles.values().any(|v| v.vehicle_number == vehicle_number) {
            return Err(conflict_error("Vehicle", "number", vehicle_number));
        }

        let Some(slot) = state.slots.values_mut().find(|s| s.is_available()) else {
            return Ok(None);
        };
        slot.status = SlotStatus::Occupied;
        let slot = slot.clone();

        state.next_vehicle_id += 1;
        let record = VehicleRecord {
            id: state.next_vehicle_id,
            vehicle_number: vehicle_number.to_string(),
            entry_time,
            exit_time: None,
            parking_spot_id: Some(slot.id),
        };
        state.vehicles.insert(record.id, record.clone());

        Ok(Some(ParkedVehicle { record, slot }))
    }

    async fn release_vehicle(
        &self,
        vehicle_id: i64,
        exit_time: DateTime<Utc>,
    ) -> AppResult<Option<ParkedVehicle>> {
        let mut state = self.state.write().await;
        let Some(mut record) = state.vehicles.remove(&vehicle_id) else {
            return Ok(None);
        };
        record.exit_time = Some(exit_time);

        let slot = match record.parking_spot_id.and_then(|id| state.slots.get_mut(&id)) {
            Some(slot) => {
                slot.status = SlotStatus::Available;
                slot.clone()
            }
            None => return Err(internal_error(&format!("vehicle {} references a missing slot", vehicle_id))),
        };

        Ok(Some(ParkedVehicle { record, slot }))
    }
}
