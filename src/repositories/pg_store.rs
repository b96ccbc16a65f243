use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::ParkingStore;
use crate::models::{ParkedVehicle, ParkingSlot, SlotDeletion, SlotStatus, VehicleRecord};
use crate::utils::errors::{conflict_error, AppError, AppResult};

const PARKED_SELECT: &str = r#"
    SELECT v.id, v.vehicle_number, v.entry_time, v.exit_time, v.parking_spot_id,
           s.id AS slot_id, s.slot, s.status
    FROM vehicle_registrations v
    JOIN parking_slots s ON s.id = v.parking_spot_id
"#;

// Fila del JOIN vehicle_registrations + parking_slots
#[derive(Debug, FromRow)]
struct ParkedRow {
    id: i64,
    vehicle_number: String,
    entry_time: DateTime<Utc>,
    exit_time: Option<DateTime<Utc>>,
    parking_spot_id: Option<i64>,
    slot_id: i64,
    slot: i32,
    status: SlotStatus,
}

impl From<ParkedRow> for ParkedVehicle {
    fn from(row: ParkedRow) -> Self {
        Self {
            record: VehicleRecord {
                id: row.id,
                vehicle_number: row.vehicle_number,
                entry_time: row.entry_time,
                exit_time: row.exit_time,
                parking_spot_id: row.parking_spot_id,
            },
            slot: ParkingSlot {
                id: row.slot_id,
                slot: row.slot,
                status: row.status,
            },
        }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub struct PgParkingStore {
    pool: PgPool,
}

impl PgParkingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParkingStore for PgParkingStore {
    async fn insert_slot(&self, number: i32) -> AppResult<ParkingSlot> {
        let result = sqlx::query_as::<_, ParkingSlot>(
            "INSERT INTO parking_slots (slot, status) VALUES ($1, 'available') RETURNING id, slot, status",
        )
        .bind(number)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(slot) => Ok(slot),
            Err(e) if is_unique_violation(&e) => {
                Err(conflict_error("Parking slot", "number", &number.to_string()))
            }
            Err(e) => Err(AppError::Database(e)),
        }
    }

    async fn list_slots(&self) -> AppResult<Vec<ParkingSlot>> {
        let slots = sqlx::query_as::<_, ParkingSlot>("SELECT id, slot, status FROM parking_slots ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(slots)
    }

    async fn find_slot(&self, id: i64) -> AppResult<Option<ParkingSlot>> {
        let slot = sqlx::query_as::<_, ParkingSlot>("SELECT id, slot, status FROM parking_slots WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(slot)
    }

    async fn delete_available_slot(&self, id: i64) -> AppResult<SlotDeletion> {
        let deleted = sqlx::query_as::<_, ParkingSlot>(
            "DELETE FROM parking_slots WHERE id = $1 AND status = 'available' RETURNING id, slot, status",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(slot) = deleted {
            return Ok(SlotDeletion::Deleted(slot));
        }

        Ok(match self.find_slot(id).await? {
            Some(slot) => SlotDeletion::Occupied(slot),
            None => SlotDeletion::Missing,
        })
    }

    async fn find_vehicle(&self, id: i64) -> AppResult<Option<ParkedVehicle>> {
        let row = sqlx::query_as::<_, ParkedRow>(&format!("{} WHERE v.id = $1", PARKED_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ParkedVehicle::from))
    }

    async fn find_vehicle_by_number(&self, vehicle_number: &str) -> AppResult<Option<VehicleRecord>> {
        let record = sqlx::query_as::<_, VehicleRecord>(
            "SELECT id, vehicle_number, entry_time, exit_time, parking_spot_id FROM vehicle_registrations WHERE vehicle_number = $1",
        )
        .bind(vehicle_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_vehicle_by_slot_number(&self, slot_number: i32) -> AppResult<Option<ParkedVehicle>> {
        let row = sqlx::query_as::<_, ParkedRow>(&format!("{} WHERE s.slot = $1", PARKED_SELECT))
            .bind(slot_number)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ParkedVehicle::from))
    }

    async fn list_parked(&self) -> AppResult<Vec<ParkedVehicle>> {
        let rows = sqlx::query_as::<_, ParkedRow>(&format!("{} ORDER BY v.id", PARKED_SELECT))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ParkedVehicle::from).collect())
    }

    async fn claim_slot(
        &self,
        vehicle_number: &str,
        entry_time: DateTime<Utc>,
    ) -> AppResult<Option<ParkedVehicle>> {
        let mut tx = self.pool.begin().await?;

        // Compare-and-set sobre el estado: dos claims concurrentes nunca
        // obtienen la misma fila gracias a FOR UPDATE SKIP LOCKED
        let slot = sqlx::query_as::<_, ParkingSlot>(
            r#"
            UPDATE parking_slots
            SET status = 'occupied'
            WHERE id = (
                SELECT id FROM parking_slots
                WHERE status = 'available'
                ORDER BY id
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, slot, status
            "#,
        )
        .fetch_optional(&mut *tx)
        .await?;

        let Some(slot) = slot else {
            tx.rollback().await?;
            return Ok(None);
        };

        let inserted = sqlx::query_as::<_, VehicleRecord>(
            r#"
            INSERT INTO vehicle_registrations (vehicle_number, entry_time, parking_spot_id)
            VALUES ($1, $2, $3)
            RETURNING id, vehicle_number, entry_time, exit_time, parking_spot_id
            "#,
        )
        .bind(vehicle_number)
        .bind(entry_time)
        .bind(slot.id)
        .fetch_one(&mut *tx)
        .await;

        let record = match inserted {
            Ok(record) => record,
            Err(e) if is_unique_violation(&e) => {
                tx.rollback().await?;
                return Err(conflict_error("Vehicle", "number", vehicle_number));
            }
            Err(e) => return Err(AppError::Database(e)),
        };

        tx.commit().await?;
        log::debug!("🅿️ Plaza {} reclamada por {}", slot.slot, record.vehicle_number);
        Ok(Some(ParkedVehicle { record, slot }))
    }

    async fn release_vehicle(
        &self,
        vehicle_id: i64,
        exit_time: DateTime<Utc>,
    ) -> AppResult<Option<ParkedVehicle>> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, VehicleRecord>(
            r#"
            DELETE FROM vehicle_registrations
            WHERE id = $1
            RETURNING id, vehicle_number, entry_time, exit_time, parking_spot_id
            "#,
        )
        .bind(vehicle_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut record) = deleted else {
            tx.rollback().await?;
            return Ok(None);
        };
        record.exit_time = Some(exit_time);

        let slot = sqlx::query_as::<_, ParkingSlot>(
            "UPDATE parking_slots SET status = 'available' WHERE id = $1 RETURNING id, slot, status",
        )
        .bind(record.parking_spot_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(ParkedVehicle { record, slot }))
    }
}
