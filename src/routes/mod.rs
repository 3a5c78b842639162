//! Routers por recurso
//!
//! Cada router se monta bajo `/api` en `build_app`. Los que no reciben el
//! estado esperan que `auth_middleware` se aplique al montarlos.

pub mod analytics_routes;
pub mod auth_routes;
pub mod booking_routes;
pub mod payment_routes;
pub mod ride_routes;

pub use analytics_routes::create_analytics_router;
pub use auth_routes::create_auth_router;
pub use booking_routes::create_booking_router;
pub use payment_routes::create_payment_router;
pub use ride_routes::create_ride_router;
