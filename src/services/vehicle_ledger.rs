//! Vehicle Ledger
//!
//! Registra vehículos contra plazas libres, los encola cuando el
//! estacionamiento está lleno, calcula tarifas y libera plazas al salir.
//!
//! La cola de espera pertenece a cada instancia del ledger. Registro y
//! vaciado de cola se serializan con el mutex de la cola, de modo que una
//! plaza liberada nunca se pierde entre "no hay plaza" y "encolar".

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use tokio::sync::{Mutex, MutexGuard};

use crate::config::ParkingConfig;
use crate::models::{CheckoutTarget, ParkedVehicle, ParkingSlot};
use crate::repositories::ParkingStore;
use crate::services::clock::Clock;
use crate::services::fee_calculator::{billable_hours, display_fee, parking_fee};
use crate::services::wait_queue::WaitQueue;
use crate::utils::errors::{AppError, AppResult};
use crate::utils::validation::{normalize_vehicle_number, validate_vehicle_number};

/// Presupuesto de una estancia con salida = ahora
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeQuote {
    pub vehicle_id: i64,
    pub vehicle_number: String,
    pub parking_spot_id: i64,
    pub slot_number: i32,
    pub entry_time: DateTime<Utc>,
    pub exit_time: DateTime<Utc>,
    pub billable_hours: i64,
    pub rate_per_hour: i64,
    pub parking_fee: i64,
}

/// Resultado de un checkout
#[derive(Debug, Clone)]
pub struct CheckoutReceipt {
    pub quote: FeeQuote,
    pub released_slot: ParkingSlot,
    /// Vehículo de la cola que ocupó la plaza liberada, si lo hubo
    pub reassigned: Option<ParkedVehicle>,
}

/// Vehículo activo con la tarifa mostrada en los listados
#[derive(Debug, Clone)]
pub struct VehicleListing {
    pub parked: ParkedVehicle,
    pub parking_fee: i64,
}

/// Entrada del listado completo: vehículos con registro y vehículos en cola
#[derive(Debug, Clone)]
pub enum LedgerEntry {
    Active(VehicleListing),
    Queued { vehicle_number: String, position: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStatus {
    pub queued: usize,
    pub vehicles: Vec<String>,
}

pub struct VehicleLedger {
    store: Arc<dyn ParkingStore>,
    clock: Arc<dyn Clock>,
    config: ParkingConfig,
    queue: Mutex<WaitQueue>,
}

/// Cola bloqueada. Mientras exista, ningún registro ni checkout puede
/// reclamar plazas, así que quien la tiene decide qué vehículo ocupa la
/// capacidad que crea o libera.
pub struct QueueGuard<'a> {
    ledger: &'a VehicleLedger,
    queue: MutexGuard<'a, WaitQueue>,
}

impl QueueGuard<'_> {
    /// Asignar la cabeza de la cola a una plaza libre, si la hay
    pub async fn drain(&mut self) -> AppResult<Option<ParkedVehicle>> {
        self.ledger.drain_locked(&mut self.queue).await
    }
}

impl VehicleLedger {
    pub fn new(store: Arc<dyn ParkingStore>, clock: Arc<dyn Clock>, config: ParkingConfig) -> Self {
        Self::with_queue(store, clock, config, WaitQueue::new())
    }

    /// Crear el ledger con una cola ya poblada
    pub fn with_queue(
        store: Arc<dyn ParkingStore>,
        clock: Arc<dyn Clock>,
        config: ParkingConfig,
        queue: WaitQueue,
    ) -> Self {
        Self {
            store,
            clock,
            config,
            queue: Mutex::new(queue),
        }
    }

    pub fn config(&self) -> &ParkingConfig {
        &self.config
    }

    /// Bloquear la cola para un cambio de capacidad hecho fuera del ledger
    pub async fn lock_queue(&self) -> QueueGuard<'_> {
        QueueGuard {
            ledger: self,
            queue: self.queue.lock().await,
        }
    }

    /// Registrar un vehículo en la primera plaza libre.
    ///
    /// Sin plazas libres el vehículo queda en cola *y* se devuelve
    /// `AppError::Capacity`. Si ya hay vehículos esperando, ellos tienen
    /// prioridad sobre cualquier plaza libre.
    pub async fn register_vehicle(&self, vehicle_number: &str) -> AppResult<ParkedVehicle> {
        let vehicle_number = normalize_vehicle_number(vehicle_number);
        validate_vehicle_number(&vehicle_number)
            .map_err(|_| AppError::Validation(format!("Invalid vehicle number '{}'.", vehicle_number)))?;

        let mut queue = self.queue.lock().await;

        if queue.contains(&vehicle_number) {
            return Err(AppError::Conflict(format!(
                "Vehicle {} is already waiting in the queue.",
                vehicle_number
            )));
        }
        if self.store.find_vehicle_by_number(&vehicle_number).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Vehicle {} is already registered.",
                vehicle_number
            )));
        }

        while !queue.is_empty() {
            if self.drain_locked(&mut queue).await?.is_none() {
                break;
            }
        }

        let claimed = if queue.is_empty() {
            self.store.claim_slot(&vehicle_number, self.clock.now()).await?
        } else {
            None
        };

        match claimed {
            Some(parked) => {
                info!(
                    "🚗 Vehículo {} estacionado en plaza {} (registro {})",
                    parked.record.vehicle_number, parked.slot.slot, parked.record.id
                );
                Ok(parked)
            }
            None => {
                let position = queue.push(vehicle_number.clone());
                warn!("🚧 Estacionamiento lleno, {} en cola (posición {})", vehicle_number, position);
                Err(AppError::Capacity(format!(
                    "No parking slot available. Vehicle {} added to the waiting queue at position {}.",
                    vehicle_number, position
                )))
            }
        }
    }

    /// Vehículos activos con su plaza y la tarifa estimada
    pub async fn list_vehicles(&self) -> AppResult<Vec<VehicleListing>> {
        let parked = self.store.list_parked().await?;
        parked
            .into_iter()
            .map(|parked| -> AppResult<VehicleListing> {
                let fee = display_fee(
                    parked.record.entry_time,
                    parked.record.exit_time,
                    self.config.rate_per_hour,
                )
                .ok_or_else(|| fee_overflow(self.config.rate_per_hour))?;
                Ok(VehicleListing { parked, parking_fee: fee })
            })
            .collect()
    }

    /// Cuánto debería el vehículo si saliera ahora. No libera la plaza ni
    /// persiste la hora de salida.
    pub async fn compute_fee(&self, vehicle_id: i64, rate_override: Option<i64>) -> AppResult<FeeQuote> {
        let rate = self.resolve_rate(rate_override)?;
        let parked = self
            .store
            .find_vehicle(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vehicle {} not found.", vehicle_id)))?;

        let quote = build_quote(&parked, self.clock.now(), rate)?;
        debug!("💰 Presupuesto para {}: {}", quote.vehicle_number, quote.parking_fee);
        Ok(quote)
    }

    /// Checkout: fija la salida, calcula la tarifa final, libera la plaza,
    /// borra el registro y vacía la cola.
    ///
    /// La cola queda bloqueada desde antes de liberar la plaza hasta que se
    /// reasigna, así un registro concurrente no se adelanta a la cola.
    pub async fn checkout(&self, target: CheckoutTarget, rate_override: Option<i64>) -> AppResult<CheckoutReceipt> {
        let rate = self.resolve_rate(rate_override)?;
        let mut queue = self.queue.lock().await;

        let parked = match target {
            CheckoutTarget::VehicleId(id) => self
                .store
                .find_vehicle(id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Vehicle registration {} not found.", id)))?,
            CheckoutTarget::SlotNumber(number) => self
                .store
                .find_vehicle_by_slot_number(number)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("No vehicle parked in slot {}.", number)))?,
        };

        // La tarifa se calcula antes de liberar: si falla, nada cambió
        let exit_time = self.clock.now();
        let quote = build_quote(&parked, exit_time, rate)?;

        let released = self
            .store
            .release_vehicle(parked.record.id, exit_time)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Vehicle registration {} not found.", parked.record.id))
            })?;

        info!(
            "🏁 Checkout de {} (plaza {}): {} horas, tarifa {}",
            quote.vehicle_number, quote.slot_number, quote.billable_hours, quote.parking_fee
        );

        // El checkout ya está confirmado; un fallo al vaciar la cola sólo se registra
        let reassigned = match self.drain_locked(&mut queue).await {
            Ok(reassigned) => reassigned,
            Err(e) => {
                error!("❌ Error vaciando la cola tras checkout: {}", e);
                None
            }
        };

        Ok(CheckoutReceipt {
            quote,
            released_slot: released.slot,
            reassigned,
        })
    }

    /// Asigna la cabeza de la cola a una plaza libre, si la hay.
    pub async fn drain_queue(&self) -> AppResult<Option<ParkedVehicle>> {
        let mut queue = self.queue.lock().await;
        self.drain_locked(&mut queue).await
    }

    /// El vehículo sólo sale de la cola cuando el claim tuvo éxito.
    /// Requiere la cola ya bloqueada por quien llama.
    async fn drain_locked(&self, queue: &mut WaitQueue) -> AppResult<Option<ParkedVehicle>> {
        while let Some(head) = queue.front().map(str::to_string) {
            match self.store.claim_slot(&head, self.clock.now()).await {
                Ok(Some(parked)) => {
                    queue.pop_front();
                    info!(
                        "🔁 {} sale de la cola y ocupa la plaza {} ({} en espera)",
                        head,
                        parked.slot.slot,
                        queue.len()
                    );
                    return Ok(Some(parked));
                }
                Ok(None) => return Ok(None),
                Err(AppError::Conflict(_)) => {
                    // Ya tiene un registro activo: no puede ocupar otra plaza
                    warn!("⚠️ {} ya estaba registrado, se descarta de la cola", head);
                    queue.pop_front();
                }
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }

    pub async fn queue_status(&self) -> QueueStatus {
        let queue = self.queue.lock().await;
        QueueStatus {
            queued: queue.len(),
            vehicles: queue.snapshot(),
        }
    }

    /// Retirar un vehículo de la cola de espera
    pub async fn cancel_queued(&self, vehicle_number: &str) -> AppResult<()> {
        let vehicle_number = normalize_vehicle_number(vehicle_number);
        let mut queue = self.queue.lock().await;
        if !queue.remove(&vehicle_number) {
            return Err(AppError::NotFound(format!(
                "Vehicle {} is not waiting in the queue.",
                vehicle_number
            )));
        }
        info!("🚪 {} retirado de la cola ({} en espera)", vehicle_number, queue.len());
        Ok(())
    }

    /// Vehículos con registro seguidos de los vehículos en cola
    pub async fn list_all_records(&self) -> AppResult<Vec<LedgerEntry>> {
        let mut entries: Vec<LedgerEntry> = self
            .list_vehicles()
            .await?
            .into_iter()
            .map(LedgerEntry::Active)
            .collect();

        let queue = self.queue.lock().await;
        entries.extend(
            queue
                .snapshot()
                .into_iter()
                .enumerate()
                .map(|(index, vehicle_number)| LedgerEntry::Queued {
                    vehicle_number,
                    position: index + 1,
                }),
        );
        Ok(entries)
    }

    fn resolve_rate(&self, rate_override: Option<i64>) -> AppResult<i64> {
        match rate_override {
            Some(rate) if rate <= 0 => Err(AppError::Validation(format!(
                "Rate per hour must be positive, got {}.",
                rate
            ))),
            Some(rate) => Ok(rate),
            None => Ok(self.config.rate_per_hour),
        }
    }
}

fn build_quote(parked: &ParkedVehicle, exit_time: DateTime<Utc>, rate_per_hour: i64) -> AppResult<FeeQuote> {
    let entry_time = parked.record.entry_time;
    let parking_fee = parking_fee(entry_time, exit_time, rate_per_hour).ok_or_else(|| fee_overflow(rate_per_hour))?;
    Ok(FeeQuote {
        vehicle_id: parked.record.id,
        vehicle_number: parked.record.vehicle_number.clone(),
        parking_spot_id: parked.slot.id,
        slot_number: parked.slot.slot,
        entry_time,
        exit_time,
        billable_hours: billable_hours(entry_time, exit_time),
        rate_per_hour,
        parking_fee,
    })
}

fn fee_overflow(rate_per_hour: i64) -> AppError {
    AppError::Validation(format!(
        "Rate per hour {} is too large: the parking fee overflows.",
        rate_per_hour
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotStatus;
    use crate::repositories::delayed_store::DelayedStore;
    use crate::repositories::InMemoryParkingStore;
    use crate::services::clock::ManualClock;
    use chrono::{Duration, TimeZone};
    use std::time::Duration as StdDuration;

    struct Fixture {
        store: Arc<InMemoryParkingStore>,
        clock: Arc<ManualClock>,
        ledger: VehicleLedger,
    }

    async fn fixture(slots: &[i32]) -> Fixture {
        let store = Arc::new(InMemoryParkingStore::new());
        for number in slots {
            store.insert_slot(*number).await.unwrap();
        }
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()));
        let ledger = VehicleLedger::new(store.clone(), clock.clone(), ParkingConfig::default());
        Fixture { store, clock, ledger }
    }

    #[tokio::test]
    async fn test_register_parks_in_available_slot() {
        let fx = fixture(&[1, 2]).await;

        let parked = fx.ledger.register_vehicle("abc-1").await.unwrap();
        assert_eq!(parked.record.vehicle_number, "ABC-1");
        assert_eq!(parked.record.entry_time, fx.clock.now());
        assert_eq!(parked.record.parking_spot_id, Some(parked.slot.id));
        assert_eq!(parked.slot.status, SlotStatus::Occupied);

        let stored = fx.store.find_slot(parked.slot.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SlotStatus::Occupied);
    }

    #[tokio::test]
    async fn test_register_when_full_queues_and_fails() {
        let fx = fixture(&[]).await;

        let err = fx.ledger.register_vehicle("Q-1").await.unwrap_err();
        assert!(matches!(err, AppError::Capacity(_)));

        let status = fx.ledger.queue_status().await;
        assert_eq!(status.queued, 1);
        assert_eq!(status.vehicles, vec!["Q-1".to_string()]);
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let fx = fixture(&[1, 2]).await;
        fx.ledger.register_vehicle("DUP-1").await.unwrap();

        let err = fx.ledger.register_vehicle("dup-1").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        // La plaza 2 sigue libre
        assert!(fx.store.find_slot(2).await.unwrap().unwrap().is_available());
    }

    #[tokio::test]
    async fn test_register_already_queued_is_conflict() {
        let fx = fixture(&[]).await;
        let _ = fx.ledger.register_vehicle("WAIT-1").await;

        let err = fx.ledger.register_vehicle("WAIT-1").await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(fx.ledger.queue_status().await.queued, 1);
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_number() {
        let fx = fixture(&[1]).await;
        let err = fx.ledger.register_vehicle("  ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_compute_fee_does_not_release() {
        let fx = fixture(&[1]).await;
        let parked = fx.ledger.register_vehicle("FEE-1").await.unwrap();

        fx.clock.advance(Duration::minutes(90));
        let quote = fx.ledger.compute_fee(parked.record.id, None).await.unwrap();
        assert_eq!(quote.billable_hours, 2);
        assert_eq!(quote.parking_fee, 100);
        assert_eq!(quote.exit_time, fx.clock.now());
        assert_eq!(quote.parking_spot_id, parked.slot.id);

        let with_override = fx.ledger.compute_fee(parked.record.id, Some(30)).await.unwrap();
        assert_eq!(with_override.parking_fee, 60);

        // Sigue estacionado y sin hora de salida
        let still = fx.store.find_vehicle(parked.record.id).await.unwrap().unwrap();
        assert!(still.record.exit_time.is_none());
        assert_eq!(still.slot.status, SlotStatus::Occupied);
    }

    #[tokio::test]
    async fn test_compute_fee_unknown_vehicle() {
        let fx = fixture(&[1]).await;
        let err = fx.ledger.compute_fee(42, None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_rate_override() {
        let fx = fixture(&[1]).await;
        let parked = fx.ledger.register_vehicle("RATE-1").await.unwrap();
        let err = fx.ledger.compute_fee(parked.record.id, Some(0)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_checkout_frees_exact_slot_and_deletes_record() {
        let fx = fixture(&[1, 2]).await;
        let first = fx.ledger.register_vehicle("OUT-1").await.unwrap();
        let second = fx.ledger.register_vehicle("OUT-2").await.unwrap();

        fx.clock.advance(Duration::minutes(30));
        let receipt = fx
            .ledger
            .checkout(CheckoutTarget::VehicleId(second.record.id), None)
            .await
            .unwrap();

        assert_eq!(receipt.quote.parking_fee, 50);
        assert_eq!(receipt.released_slot.id, second.slot.id);
        assert!(receipt.released_slot.is_available());
        assert!(receipt.reassigned.is_none());

        assert!(fx.store.find_vehicle_by_number("OUT-2").await.unwrap().is_none());
        assert!(fx.store.find_slot(second.slot.id).await.unwrap().unwrap().is_available());
        assert_eq!(
            fx.store.find_slot(first.slot.id).await.unwrap().unwrap().status,
            SlotStatus::Occupied
        );
    }

    #[tokio::test]
    async fn test_checkout_by_slot_number() {
        let fx = fixture(&[5]).await;
        fx.ledger.register_vehicle("SLOT-5").await.unwrap();

        let receipt = fx.ledger.checkout(CheckoutTarget::SlotNumber(5), None).await.unwrap();
        assert_eq!(receipt.quote.vehicle_number, "SLOT-5");
        assert_eq!(receipt.quote.slot_number, 5);

        let err = fx.ledger.checkout(CheckoutTarget::SlotNumber(5), None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_checkout_unknown_vehicle() {
        let fx = fixture(&[1]).await;
        let err = fx.ledger.checkout(CheckoutTarget::VehicleId(9), None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_full_lot_scenario_reassigns_head_of_queue() {
        let fx = fixture(&[1]).await;

        let first = fx.ledger.register_vehicle("ABC-1").await.unwrap();
        assert_eq!(first.slot.slot, 1);

        let err = fx.ledger.register_vehicle("ABC-2").await.unwrap_err();
        assert!(matches!(err, AppError::Capacity(_)));
        let err = fx.ledger.register_vehicle("ABC-3").await.unwrap_err();
        assert!(matches!(err, AppError::Capacity(_)));

        fx.clock.advance(Duration::minutes(130));
        let receipt = fx
            .ledger
            .checkout(CheckoutTarget::VehicleId(first.record.id), None)
            .await
            .unwrap();
        assert_eq!(receipt.quote.billable_hours, 3);
        assert_eq!(receipt.quote.parking_fee, 150);

        let reassigned = receipt.reassigned.unwrap();
        assert_eq!(reassigned.record.vehicle_number, "ABC-2");
        assert_eq!(reassigned.slot.id, first.slot.id);
        assert_eq!(reassigned.record.entry_time, fx.clock.now());

        let status = fx.ledger.queue_status().await;
        assert_eq!(status.vehicles, vec!["ABC-3".to_string()]);
    }

    #[tokio::test]
    async fn test_drain_keeps_head_when_no_slot() {
        let fx = fixture(&[]).await;
        let _ = fx.ledger.register_vehicle("H-1").await;
        let _ = fx.ledger.register_vehicle("H-2").await;

        assert!(fx.ledger.drain_queue().await.unwrap().is_none());
        assert_eq!(fx.ledger.queue_status().await.queued, 2);

        fx.store.insert_slot(3).await.unwrap();
        let parked = fx.ledger.drain_queue().await.unwrap().unwrap();
        assert_eq!(parked.record.vehicle_number, "H-1");
        assert_eq!(fx.ledger.queue_status().await.vehicles, vec!["H-2".to_string()]);
    }

    #[tokio::test]
    async fn test_drain_skips_vehicle_already_registered() {
        let store = Arc::new(InMemoryParkingStore::new());
        store.insert_slot(1).await.unwrap();
        store.insert_slot(2).await.unwrap();
        store.claim_slot("TWICE-1", Utc::now()).await.unwrap();

        let mut queue = WaitQueue::new();
        queue.push("TWICE-1".into());
        queue.push("NEXT-1".into());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let ledger = VehicleLedger::with_queue(store, clock, ParkingConfig::default(), queue);

        let parked = ledger.drain_queue().await.unwrap().unwrap();
        assert_eq!(parked.record.vehicle_number, "NEXT-1");
        assert_eq!(ledger.queue_status().await.queued, 0);
    }

    #[tokio::test]
    async fn test_cancel_queued() {
        let fx = fixture(&[]).await;
        let _ = fx.ledger.register_vehicle("C-1").await;
        let _ = fx.ledger.register_vehicle("C-2").await;

        fx.ledger.cancel_queued("c-1").await.unwrap();
        assert_eq!(fx.ledger.queue_status().await.vehicles, vec!["C-2".to_string()]);

        let err = fx.ledger.cancel_queued("C-1").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_vehicles_shows_minimum_fee() {
        let fx = fixture(&[1, 2]).await;
        fx.ledger.register_vehicle("L-1").await.unwrap();
        fx.clock.advance(Duration::hours(4));
        fx.ledger.register_vehicle("L-2").await.unwrap();

        let listing = fx.ledger.list_vehicles().await.unwrap();
        assert_eq!(listing.len(), 2);
        assert!(listing.iter().all(|l| l.parking_fee == 50));
        assert_eq!(listing[0].parked.record.vehicle_number, "L-1");
    }

    #[tokio::test]
    async fn test_list_all_records_includes_queue() {
        let fx = fixture(&[1]).await;
        fx.ledger.register_vehicle("R-1").await.unwrap();
        let _ = fx.ledger.register_vehicle("R-2").await;
        let _ = fx.ledger.register_vehicle("R-3").await;

        let records = fx.ledger.list_all_records().await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(matches!(&records[0], LedgerEntry::Active(l) if l.parked.record.vehicle_number == "R-1"));
        assert!(matches!(
            &records[1],
            LedgerEntry::Queued { vehicle_number, position: 1 } if vehicle_number == "R-2"
        ));
        assert!(matches!(
            &records[2],
            LedgerEntry::Queued { vehicle_number, position: 2 } if vehicle_number == "R-3"
        ));
    }

    #[tokio::test]
    async fn test_ledgers_do_not_share_queues() {
        let a = fixture(&[]).await;
        let b = fixture(&[]).await;
        let _ = a.ledger.register_vehicle("ONLY-A").await;
        assert_eq!(a.ledger.queue_status().await.queued, 1);
        assert_eq!(b.ledger.queue_status().await.queued, 0);
    }

    #[tokio::test]
    async fn test_concurrent_registrations_never_double_assign() {
        let fx = fixture(&[1, 2, 3]).await;
        let ledger = Arc::new(fx.ledger);

        let mut handles = Vec::new();
        for i in 0..10 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                ledger.register_vehicle(&format!("CC-{}", i)).await
            }));
        }

        let mut parked = Vec::new();
        let mut queued = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(p) => parked.push(p.slot.id),
                Err(AppError::Capacity(_)) => queued += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        parked.sort();
        assert_eq!(parked, vec![1, 2, 3]);
        assert_eq!(queued, 7);
        assert_eq!(ledger.queue_status().await.queued, 7);
    }

    #[tokio::test]
    async fn test_queued_vehicle_keeps_priority_over_newcomer_during_checkout() {
        let inner: Arc<dyn ParkingStore> = Arc::new(InMemoryParkingStore::new());
        inner.insert_slot(1).await.unwrap();
        let store = Arc::new(DelayedStore::new(inner, StdDuration::from_millis(50)));
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()));
        let ledger = Arc::new(VehicleLedger::new(store, clock, ParkingConfig::default()));

        let parked = ledger.register_vehicle("A-PARKED").await.unwrap();
        let _ = ledger.register_vehicle("B-QUEUED").await;

        let checkout = {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                ledger
                    .checkout(CheckoutTarget::VehicleId(parked.record.id), None)
                    .await
            })
        };
        tokio::time::sleep(StdDuration::from_millis(10)).await;

        let newcomer = ledger.register_vehicle("C-NEW").await;
        assert!(matches!(newcomer, Err(AppError::Capacity(_))));

        let receipt = checkout.await.unwrap().unwrap();
        assert_eq!(receipt.reassigned.unwrap().record.vehicle_number, "B-QUEUED");
        assert_eq!(ledger.queue_status().await.vehicles, vec!["C-NEW".to_string()]);
    }

    #[tokio::test]
    async fn test_register_serves_queue_before_newcomer() {
        let fx = fixture(&[]).await;
        let _ = fx.ledger.register_vehicle("FIRST-IN").await;

        // Plaza creada sin pasar por el registry: nadie vació la cola
        fx.store.insert_slot(1).await.unwrap();

        let err = fx.ledger.register_vehicle("LATE-1").await.unwrap_err();
        assert!(matches!(err, AppError::Capacity(_)));
        assert!(fx.store.find_vehicle_by_number("FIRST-IN").await.unwrap().is_some());
        assert_eq!(fx.ledger.queue_status().await.vehicles, vec!["LATE-1".to_string()]);
    }

    #[tokio::test]
    async fn test_checkout_with_overflowing_rate_changes_nothing() {
        let fx = fixture(&[1]).await;
        let parked = fx.ledger.register_vehicle("BIG-1").await.unwrap();
        fx.clock.advance(Duration::hours(2));

        let huge_rate = i64::MAX / 2 + 1;
        let err = fx.ledger.compute_fee(parked.record.id, Some(huge_rate)).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = fx
            .ledger
            .checkout(CheckoutTarget::VehicleId(parked.record.id), Some(huge_rate))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Sigue estacionado en su plaza
        let still = fx.store.find_vehicle(parked.record.id).await.unwrap().unwrap();
        assert_eq!(still.slot.status, SlotStatus::Occupied);
    }
}
