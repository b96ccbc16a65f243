//! Configuración de conexión a PostgreSQL
//!
//! Crea el pool y el schema del estacionamiento si todavía no existe.

use anyhow::{Context, Result};
use log::info;
use sqlx::PgPool;

use crate::config::database::DatabaseConfig;

// Idempotente: se puede ejecutar en cada arranque
const SCHEMA_STATEMENTS: &[&str] = &[
    r#"
    DO $$ BEGIN
        CREATE TYPE slot_status AS ENUM ('available', 'occupied');
    EXCEPTION
        WHEN duplicate_object THEN null;
    END $$;
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS parking_slots (
        id BIGSERIAL PRIMARY KEY,
        slot INTEGER NOT NULL UNIQUE CHECK (slot BETWEEN 1 AND 20),
        status slot_status NOT NULL DEFAULT 'available'
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vehicle_registrations (
        id BIGSERIAL PRIMARY KEY,
        vehicle_number TEXT NOT NULL UNIQUE,
        entry_time TIMESTAMPTZ NOT NULL,
        exit_time TIMESTAMPTZ,
        parking_spot_id BIGINT REFERENCES parking_slots (id)
    )
    "#,
];

/// Crear un pool de conexiones a la base de datos
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    info!("🔌 Conectando a {}", mask_database_url(&config.url));
    let pool = config
        .create_pool()
        .await
        .with_context(|| format!("Error conectando a {}", mask_database_url(&config.url)))?;
    Ok(pool)
}

/// Crear el schema si no existe
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("✅ Schema del estacionamiento verificado");
    Ok(())
}

/// Función helper para enmascarar la URL de la base de datos en logs
fn mask_database_url(url: &str) -> String {
    let Some(at_pos) = url.find('@') else {
        return url.to_string();
    };
    match url.find("://") {
        Some(scheme_end) if scheme_end + 3 <= at_pos => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
