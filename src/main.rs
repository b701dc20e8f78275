use std::net::SocketAddr;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

use fleet_logistics::build_router;
use fleet_logistics::config::{DatabaseConfig, EnvironmentConfig, StoreBackend};
use fleet_logistics::database::DatabaseConnection;
use fleet_logistics::services::Stores;
use fleet_logistics::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚚 Fleet Logistics - motor de consistencia de flota");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);
    if config.is_development() && config.cors_origins.is_empty() {
        info!("🛠️ Modo desarrollo: CORS permisivo");
    }

    let stores = match config.store_backend {
        StoreBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let db_connection = match DatabaseConnection::connect(&db_config).await {
                Ok(conn) => conn,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {:#}", e);
                    return Err(e);
                }
            };
            db_connection.run_migrations().await?;
            Stores::postgres(db_connection.pool().clone())
        }
        StoreBackend::Memory => {
            info!("🧪 Usando almacén en memoria (los datos no se persisten)");
            Stores::in_memory()
        }
    };

    let app = build_router(AppState::new(stores), &config.cors_origins);
    let addr: SocketAddr = config.server_url().parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("   /api/clients, /api/client-objects, /api/warehouses");
    info!("   /api/transports (+ /:id/driver, /:id/equipment), /api/drivers");
    info!("   /api/equipment, /api/orders (+ /:id/status, /:id/transport)");
    info!("   POST /api/<recurso>/:id/restore - Restaurar borrado lógico");

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
