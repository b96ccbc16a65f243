//! Cálculo de tarifas y formato de horas
//!
//! Regla única para todo el sistema:
//! `horas = max(1, ceil(segundos / 3600))`, `tarifa = horas * precio_hora`.
//! Los timestamps se guardan en UTC; la zona horaria sólo se aplica al formatear.

use chrono::{DateTime, FixedOffset, Utc};

const SECONDS_PER_HOUR: i64 = 3600;

/// Tarifa por defecto en unidades monetarias por hora
pub const DEFAULT_RATE_PER_HOUR: i64 = 50;

/// Horas facturables entre entrada y salida (mínimo 1)
pub fn billable_hours(entry_time: DateTime<Utc>, exit_time: DateTime<Utc>) -> i64 {
    let seconds = (exit_time - entry_time).num_seconds();
    if seconds <= 0 {
        return 1;
    }
    // ceil sin pasar por f64
    let hours = (seconds + SECONDS_PER_HOUR - 1) / SECONDS_PER_HOUR;
    hours.max(1)
}

/// Tarifa final para una estancia. `None` si el importe no cabe en `i64`.
pub fn parking_fee(entry_time: DateTime<Utc>, exit_time: DateTime<Utc>, rate_per_hour: i64) -> Option<i64> {
    billable_hours(entry_time, exit_time).checked_mul(rate_per_hour)
}

/// Tarifa mostrada en los listados: si aún no hay salida, se muestra la
/// tarifa mínima (una hora). Es una estimación, no una factura.
pub fn display_fee(
    entry_time: DateTime<Utc>,
    exit_time: Option<DateTime<Utc>>,
    rate_per_hour: i64,
) -> Option<i64> {
    match exit_time {
        Some(exit_time) => parking_fee(entry_time, exit_time, rate_per_hour),
        None => Some(rate_per_hour),
    }
}

/// Hora en formato de 12 horas en la zona configurada, p. ej. "02:15 PM"
pub fn format_clock_time(time: DateTime<Utc>, offset: &FixedOffset) -> String {
    time.with_timezone(offset).format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_minimum_one_hour() {
        assert_eq!(parking_fee(entry(), entry(), 50), Some(50));
        assert_eq!(parking_fee(entry(), entry() + Duration::minutes(1), 50), Some(50));
        assert_eq!(parking_fee(entry(), entry() + Duration::hours(1), 50), Some(50));
    }

    #[test]
    fn test_partial_hours_round_up() {
        assert_eq!(parking_fee(entry(), entry() + Duration::seconds(3601), 50), Some(100));
        // 2h10m -> ceil(2.17) = 3 horas
        assert_eq!(parking_fee(entry(), entry() + Duration::minutes(130), 50), Some(150));
        assert_eq!(parking_fee(entry(), entry() + Duration::hours(5), 40), Some(200));
    }

    #[test]
    fn test_exit_before_entry_is_billed_minimum() {
        assert_eq!(billable_hours(entry(), entry() - Duration::hours(3)), 1);
    }

    #[test]
    fn test_fee_is_monotonic() {
        let mut previous = 0;
        for minutes in (0..=24 * 60).step_by(7) {
            let fee = parking_fee(entry(), entry() + Duration::minutes(minutes), 50).unwrap();
            assert!(fee >= previous, "fee decreased at {} minutes", minutes);
            previous = fee;
        }
    }

    #[test]
    fn test_fee_overflow_is_none() {
        let huge_rate = i64::MAX / 2 + 1;
        assert_eq!(parking_fee(entry(), entry() + Duration::hours(2), huge_rate), None);
        assert_eq!(parking_fee(entry(), entry() + Duration::minutes(30), i64::MAX), Some(i64::MAX));
    }

    #[test]
    fn test_display_fee_without_exit_is_minimum_charge() {
        assert_eq!(display_fee(entry(), None, 50), Some(50));
        assert_eq!(display_fee(entry(), Some(entry() + Duration::minutes(61)), 50), Some(100));
    }

    #[test]
    fn test_format_clock_time() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let time = Utc.with_ymd_and_hms(2024, 3, 10, 14, 15, 0).unwrap();
        assert_eq!(format_clock_time(time, &utc), "02:15 PM");

        // UTC+05:30
        let ist = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        assert_eq!(format_clock_time(time, &ist), "07:45 PM");

        let morning = Utc.with_ymd_and_hms(2024, 3, 10, 0, 5, 0).unwrap();
        assert_eq!(format_clock_time(morning, &utc), "12:05 AM");
    }
}
