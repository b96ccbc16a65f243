use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use parking_management::config::database::DatabaseConfig;
use parking_management::config::environment::EnvironmentConfig;
use parking_management::database;
use parking_management::repositories::{InMemoryParkingStore, ParkingStore, PgParkingStore};
use parking_management::services::clock::SystemClock;
use parking_management::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let default_level = if config.is_development() { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    info!("🅿️ Parking System Management");
    info!("================================================");

    // Inicializar persistencia
    let store: Arc<dyn ParkingStore> = match DatabaseConfig::from_env() {
        Some(db_config) => {
            let pool = match database::create_pool(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            database::run_migrations(&pool).await?;
            info!("✅ PostgreSQL conectado exitosamente");
            Arc::new(PgParkingStore::new(pool))
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida, usando store en memoria");
            Arc::new(InMemoryParkingStore::new())
        }
    };

    info!(
        "💰 Tarifa: {} por hora, zona horaria de display: {}",
        config.parking.rate_per_hour, config.parking.display_offset
    );

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_router(AppState::new(config, store, Arc::new(SystemClock)));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   POST   /slots                    - Crear plaza");
    info!("   GET    /slots                    - Listar plazas");
    info!("   GET    /slots/:id                - Obtener plaza");
    info!("   DELETE /slots/:id                - Eliminar plaza");
    info!("   POST   /checkout/slot/:number    - Checkout por número de plaza");
    info!("   POST   /vehicles                 - Registrar vehículo");
    info!("   GET    /vehicles                 - Listar vehículos");
    info!("   GET    /vehicles/:id/fee         - Presupuesto de tarifa");
    info!("   DELETE /vehicles/:id             - Checkout por id de registro");
    info!("   GET    /queue                    - Estado de la cola");
    info!("   DELETE /queue/:vehicle_number    - Retirar de la cola");
    info!("   GET    /records                  - Todos los registros");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
