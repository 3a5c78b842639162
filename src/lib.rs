//! API de reservas de vehículos
//!
//! Catálogo de vehículos, ciclo de vida de reservas, pagos a través de un
//! procesador externo y analíticas para administradores.

pub mod clients;
pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::middleware::{auth::auth_middleware, cors::cors_layer_for};
use crate::routes::{
    create_analytics_router, create_auth_router, create_booking_router, create_payment_router,
    create_ride_router,
};
use crate::state::AppState;

/// Router completo de la aplicación con sus capas
pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .nest("/auth", create_auth_router())
        .nest("/bookings", create_booking_router())
        .merge(create_payment_router())
        .merge(create_analytics_router())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .nest("/rides", create_ride_router(&state))
        .merge(protected);

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(state.config.request_timeout_secs)))
                .layer(CompressionLayer::new())
                .layer(cors_layer_for(&state.config)),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
