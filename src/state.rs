//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::ParkingStore;
use crate::services::clock::Clock;
use crate::services::{SlotRegistry, VehicleLedger};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub registry: Arc<SlotRegistry>,
    pub ledger: Arc<VehicleLedger>,
}

impl AppState {
    /// Construir registry y ledger sobre el mismo store
    pub fn new(config: EnvironmentConfig, store: Arc<dyn ParkingStore>, clock: Arc<dyn Clock>) -> Self {
        let ledger = Arc::new(VehicleLedger::new(store.clone(), clock, config.parking));
        let registry = Arc::new(SlotRegistry::new(store, ledger.clone()));
        Self {
            config,
            registry,
            ledger,
        }
    }
}
