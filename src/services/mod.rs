//! Servicios del sistema
//!
//! Lógica de negocio del estacionamiento: registro de plazas, ledger de
//! vehículos con cola de espera, cálculo de tarifas y reloj inyectable.

pub mod clock;
pub mod fee_calculator;
pub mod slot_registry;
pub mod vehicle_ledger;
pub mod wait_queue;

pub use slot_registry::SlotRegistry;
pub use vehicle_ledger::VehicleLedger;
