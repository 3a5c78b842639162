//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::clients::PaymentProcessor;
use crate::config::environment::EnvironmentConfig;
use crate::repositories::{BookingStore, MemoryStore, RideStore, UserStore};
use crate::services::{AnalyticsService, BookingService, PaymentService, RideService};
use crate::utils::clock::Clock;
use crate::utils::jwt::JwtConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub jwt: JwtConfig,
    pub users: Arc<dyn UserStore>,
    pub rides: Arc<RideService>,
    pub bookings: Arc<BookingService>,
    pub payments: Arc<PaymentService>,
    pub analytics: Arc<AnalyticsService>,
}

impl AppState {
    pub fn new(
        config: EnvironmentConfig,
        users: Arc<dyn UserStore>,
        rides: Arc<dyn RideStore>,
        bookings: Arc<dyn BookingStore>,
        processor: Arc<dyn PaymentProcessor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let booking_service = Arc::new(BookingService::new(
            bookings.clone(),
            rides.clone(),
            users.clone(),
            clock,
            config.insurance_per_day,
        ));

        Self {
            jwt: JwtConfig::from(&config),
            rides: Arc::new(RideService::new(rides.clone(), config.ride_sort_order)),
            payments: Arc::new(PaymentService::new(
                processor,
                booking_service.clone(),
                config.payment_currency.clone(),
            )),
            analytics: Arc::new(AnalyticsService::new(bookings, rides, users.clone())),
            bookings: booking_service,
            users,
            config,
        }
    }

    /// Todo en un único store en memoria
    pub fn with_memory_store(
        config: EnvironmentConfig,
        store: Arc<MemoryStore>,
        processor: Arc<dyn PaymentProcessor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(config, store.clone(), store.clone(), store, processor, clock)
    }
}
