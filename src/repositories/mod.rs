//! Repositorios
//!
//! Contratos de persistencia de users, rides y bookings. Los servicios sólo
//! conocen estos traits; `*Repository` los implementa sobre PostgreSQL y
//! `MemoryStore` en memoria (modo desarrollo y tests).

pub mod booking_repository;
pub mod memory_store;
pub mod ride_repository;
pub mod user_repository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStats, BookingStatus, NewBooking};
use crate::models::ride::{NewRide, Ride, RideChanges, RideQuery};
use crate::models::user::{UpsertUser, User};
use crate::utils::errors::AppResult;

pub use booking_repository::BookingRepository;
pub use memory_store::MemoryStore;
pub use ride_repository::RideRepository;
pub use user_repository::UserRepository;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>>;

    /// Crear en la primera autenticación o sincronizar el perfil después
    async fn upsert(&self, profile: UpsertUser) -> AppResult<User>;

    async fn count(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait RideStore: Send + Sync {
    async fn list(&self, query: &RideQuery) -> AppResult<Vec<Ride>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Ride>>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Ride>>;

    async fn create(&self, ride: NewRide) -> AppResult<Ride>;

    /// `None` si el vehículo no existe
    async fn update(&self, id: Uuid, changes: RideChanges) -> AppResult<Option<Ride>>;

    async fn count_available(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn create(&self, booking: NewBooking) -> AppResult<Booking>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>>;

    /// Más recientes primero
    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Booking>>;

    /// Más recientes primero
    async fn list_all(&self) -> AppResult<Vec<Booking>>;

    /// Guarda la referencia del payment intent sólo si la reserva sigue en
    /// `pending`. `None` si no existe o ya no está pendiente.
    async fn set_payment_intent(&self, id: Uuid, intent_id: &str) -> AppResult<Option<Booking>>;

    /// Compare-and-set del estado: sólo escribe si el estado actual está en
    /// `from`. `None` si no existe o el estado no coincide.
    /// `pending → confirmed` guardando `intent_id` en la misma escritura
    async fn confirm_payment(&self, id: Uuid, intent_id: &str) -> AppResult<Option<Booking>>;

    async fn transition_status(
        &self,
        id: Uuid,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> AppResult<Option<Booking>>;

    async fn stats(&self) -> AppResult<BookingStats>;
}
