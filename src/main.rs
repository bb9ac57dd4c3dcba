mod config;
mod controllers;
mod dto;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::database;
use config::environment::EnvironmentConfig;
use middleware::cors::cors_middleware;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚛 Fleet Maintenance - Backend de mantenimiento de flota");
    info!("========================================================");

    let config = EnvironmentConfig::default();

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    // Crear router de la API
    let app_state = AppState::new(pool, config.clone());

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest(
            "/api/maintenance-order",
            routes::maintenance_order_routes::create_maintenance_order_router(),
        )
        .nest("/api/stock", routes::stock_routes::create_stock_router())
        .layer(cors_middleware())
        .with_state(app_state);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔧 Endpoints - Orden de mantenimiento:");
    info!("   POST   /api/maintenance-order - Crear orden");
    info!("   GET    /api/maintenance-order - Listar órdenes");
    info!("   GET    /api/maintenance-order/:id - Obtener orden");
    info!("   PUT    /api/maintenance-order/:id - Actualizar orden");
    info!("   DELETE /api/maintenance-order/:id - Eliminar orden (baja lógica)");
    info!("   POST   /api/maintenance-order/:id/start - Iniciar orden");
    info!("   POST   /api/maintenance-order/:id/pause - Pausar orden");
    info!("   POST   /api/maintenance-order/:id/complete - Completar orden");
    info!("   POST   /api/maintenance-order/:id/cancel - Cancelar orden");
    info!("   GET    /api/maintenance-order/:id/timeline - Línea de tiempo");
    info!("📦 Endpoints - Stock:");
    info!("   POST /api/stock/entry - Registrar entrada de stock");
    info!("   GET  /api/stock/:product_id - Obtener saldo de stock");
    info!("   GET  /api/stock/:product_id/movements - Movimientos de stock");

    // Iniciar servidor con apagado graceful
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check simple
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "fleet-maintenance",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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
