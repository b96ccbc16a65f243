//! Configuración del estacionamiento
//!
//! Tarifa por hora y zona horaria usada para mostrar las horas.

use chrono::{FixedOffset, Offset, Utc};

use crate::services::fee_calculator::DEFAULT_RATE_PER_HOUR;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParkingConfig {
    pub rate_per_hour: i64,
    pub display_offset: FixedOffset,
}

impl Default for ParkingConfig {
    fn default() -> Self {
        Self {
            rate_per_hour: DEFAULT_RATE_PER_HOUR,
            display_offset: Utc.fix(),
        }
    }
}

impl ParkingConfig {
    /// Construir desde un desplazamiento en minutos respecto a UTC
    pub fn with_offset_minutes(rate_per_hour: i64, offset_minutes: i32) -> Option<Self> {
        let display_offset = FixedOffset::east_opt(offset_minutes.checked_mul(60)?)?;
        Some(Self {
            rate_per_hour,
            display_offset,
        })
    }
}
