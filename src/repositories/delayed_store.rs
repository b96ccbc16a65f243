//! Store con retardos para tests de concurrencia
//!
//! Envuelve otro `ParkingStore` y duerme después de liberar o crear una
//! plaza, ensanchando la ventana en la que otra tarea podría colarse.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::ParkingStore;
use crate::models::{ParkedVehicle, ParkingSlot, SlotDeletion, VehicleRecord};
use crate::utils::errors::AppResult;

pub struct DelayedStore {
    inner: Arc<dyn ParkingStore>,
    delay: Duration,
}

impl DelayedStore {
    pub fn new(inner: Arc<dyn ParkingStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl ParkingStore for DelayedStore {
    async fn insert_slot(&self, number: i32) -> AppResult<ParkingSlot> {
        let slot = self.inner.insert_slot(number).await?;
        tokio::time::sleep(self.delay).await;
        Ok(slot)
    }

    async fn list_slots(&self) -> AppResult<Vec<ParkingSlot>> {
        self.inner.list_slots().await
    }

    async fn find_slot(&self, id: i64) -> AppResult<Option<ParkingSlot>> {
        self.inner.find_slot(id).await
    }

    async fn delete_available_slot(&self, id: i64) -> AppResult<SlotDeletion> {
        self.inner.delete_available_slot(id).await
    }

    async fn find_vehicle(&self, id: i64) -> AppResult<Option<ParkedVehicle>> {
        self.inner.find_vehicle(id).await
    }

    async fn find_vehicle_by_number(&self, vehicle_number: &str) -> AppResult<Option<VehicleRecord>> {
        self.inner.find_vehicle_by_number(vehicle_number).await
    }

    async fn find_vehicle_by_slot_number(&self, slot_number: i32) -> AppResult<Option<ParkedVehicle>> {
        self.inner.find_vehicle_by_slot_number(slot_number).await
    }

    async fn list_parked(&self) -> AppResult<Vec<ParkedVehicle>> {
        self.inner.list_parked().await
    }

    async fn claim_slot(
        &self,
        vehicle_number: &str,
        entry_time: DateTime<Utc>,
    ) -> AppResult<Option<ParkedVehicle>> {
        self.inner.claim_slot(vehicle_number, entry_time).await
    }

    async fn release_vehicle(
        &self,
        vehicle_id: i64,
        exit_time: DateTime<Utc>,
    ) -> AppResult<Option<ParkedVehicle>> {
        let released = self.inner.release_vehicle(vehicle_id, exit_time).await?;
        tokio::time::sleep(self.delay).await;
        Ok(released)
    }
}
