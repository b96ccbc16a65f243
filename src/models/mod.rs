//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean
//! al schema PostgreSQL del estacionamiento.

pub mod parking_slot;
pub mod vehicle_record;

pub use parking_slot::{ParkingSlot, SlotDeletion, SlotStatus};
pub use vehicle_record::{CheckoutTarget, ParkedVehicle, VehicleRecord, VehicleState};
