//! Repositorios
//!
//! `ParkingStore` es el contrato de persistencia que consumen los servicios.
//! Hay dos implementaciones: en memoria (por defecto y en tests) y PostgreSQL.

#[cfg(test)]
pub mod delayed_store;
pub mod memory_store;
pub mod pg_store;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{ParkedVehicle, ParkingSlot, SlotDeletion, VehicleRecord};
use crate::utils::errors::AppResult;

pub use memory_store::InMemoryParkingStore;
pub use pg_store::PgParkingStore;

#[async_trait]
pub trait ParkingStore: Send + Sync {
    /// Crea la plaza como `available`. `AppError::Conflict` si el número ya existe.
    async fn insert_slot(&self, number: i32) -> AppResult<ParkingSlot>;

    /// Todas las plazas ordenadas por id
    async fn list_slots(&self) -> AppResult<Vec<ParkingSlot>>;

    async fn find_slot(&self, id: i64) -> AppResult<Option<ParkingSlot>>;

    /// Borra la plaza sólo si está libre.
    async fn delete_available_slot(&self, id: i64) -> AppResult<SlotDeletion>;

    async fn find_vehicle(&self, id: i64) -> AppResult<Option<ParkedVehicle>>;

    async fn find_vehicle_by_number(&self, vehicle_number: &str) -> AppResult<Option<VehicleRecord>>;

    async fn find_vehicle_by_slot_number(&self, slot_number: i32) -> AppResult<Option<ParkedVehicle>>;

    /// Registros activos con su plaza, ordenados por id de registro
    async fn list_parked(&self) -> AppResult<Vec<ParkedVehicle>>;

    /// Reclama atómicamente la primera plaza libre (id más bajo) y crea el
    /// registro del vehículo. `None` si no hay plazas libres.
    async fn claim_slot(
        &self,
        vehicle_number: &str,
        entry_time: DateTime<Utc>,
    ) -> AppResult<Option<ParkedVehicle>>;

    /// Libera atómicamente la plaza del vehículo y borra su registro.
    /// Devuelve el registro con `exit_time` fijado y la plaza ya libre.
    async fn release_vehicle(
        &self,
        vehicle_id: i64,
        exit_time: DateTime<Utc>,
    ) -> AppResult<Option<ParkedVehicle>>;
}
