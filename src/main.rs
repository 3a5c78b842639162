use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use ride_booking::build_app;
use ride_booking::clients::{MockPaymentProcessor, PaymentProcessor, StripeClient};
use ride_booking::config::database::DatabaseConfig;
use ride_booking::config::environment::{EnvironmentConfig, PaymentProvider, StorageBackend};
use ride_booking::database::DatabaseConnection;
use ride_booking::repositories::{BookingRepository, MemoryStore, RideRepository, UserRepository};
use ride_booking::state::AppState;
use ride_booking::utils::clock::SystemClock;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚗 Ride Booking API");
    info!("==================");

    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;
    let processor = build_payment_processor(&config)?;
    let clock = Arc::new(SystemClock);

    let app_state = match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .clone()
                .ok_or_else(|| anyhow!("DATABASE_URL must be set when STORAGE_BACKEND=postgres"))?;
            let db_connection = DatabaseConnection::connect(&DatabaseConfig::new(url)).await?;
            let pool = db_connection.pool().clone();

            AppState::new(
                config.clone(),
                Arc::new(UserRepository::new(pool.clone())),
                Arc::new(RideRepository::new(pool.clone())),
                Arc::new(BookingRepository::new(pool)),
                processor,
                clock,
            )
        }
        StorageBackend::Memory => {
            warn!("⚠️ STORAGE_BACKEND=memory: los datos se pierden al reiniciar");
            AppState::with_memory_store(config.clone(), Arc::new(MemoryStore::new()), processor, clock)
        }
    };

    let app = build_app(app_state);

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Dirección inválida: {}", config.server_url()))?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   GET  /api/auth/user");
    info!("   GET  /api/rides  ·  GET /api/rides/:id");
    info!("   POST /api/rides  ·  PUT /api/rides/:id (admin)");
    info!("   POST /api/bookings  ·  GET /api/bookings  ·  GET /api/bookings/:id");
    info!("   POST /api/bookings/:id/cancel  ·  POST /api/bookings/:id/complete (admin)");
    info!("   POST /api/create-payment-intent  ·  POST /api/confirm-payment");
    info!("   GET  /api/analytics (admin)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

fn build_payment_processor(config: &EnvironmentConfig) -> Result<Arc<dyn PaymentProcessor>> {
    match config.payment_provider {
        PaymentProvider::Stripe => {
            let secret_key = config
                .stripe_secret_key
                .clone()
                .ok_or_else(|| anyhow!("Missing required Stripe secret: STRIPE_SECRET_KEY"))?;
            let client = StripeClient::new(
                secret_key,
                config.stripe_api_base.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?;
            info!("💳 Procesador de pagos: Stripe ({})", config.stripe_api_base);
            Ok(Arc::new(client))
        }
        PaymentProvider::Mock => {
            // Sin cliente que pague de verdad: los intents nacen completados
            warn!("⚠️ PAYMENT_PROVIDER=mock: los pagos se aprueban automáticamente");
            Ok(Arc::new(MockPaymentProcessor::auto_succeed()))
        }
    }
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
            Ok(mut stream) => {
                stream.recv().await;
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
