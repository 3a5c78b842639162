//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación. Los servicios
//! reciben el principal autenticado de forma explícita y sólo hablan con la
//! persistencia y el procesador de pagos a través de traits.

pub mod analytics_service;
pub mod booking_service;
pub mod payment_service;
pub mod ride_service;

use uuid::Uuid;

use crate::models::auth::AuthenticatedUser;
use crate::utils::errors::{forbidden_error, not_found_error, AppResult};

pub use analytics_service::AnalyticsService;
pub use booking_service::BookingService;
pub use payment_service::PaymentService;
pub use ride_service::RideService;

/// Un id que no es UUID no puede existir: se trata como no encontrado
pub(crate) fn parse_id(resource: &str, raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| not_found_error(resource, raw))
}

pub(crate) fn require_admin(principal: &AuthenticatedUser, operation: &str) -> AppResult<()> {
    if principal.is_admin {
        Ok(())
    } else {
        Err(forbidden_error(operation, "admin access required"))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use crate::models::auth::AuthenticatedUser;
    use crate::models::ride::{NewRide, Ride};
    use crate::models::user::{UpsertUser, User};
    use crate::repositories::{MemoryStore, RideStore, UserStore};

    pub fn principal(user_id: &str, is_admin: bool) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: user_id.to_string(),
            email: Some(format!("{}@example.com", user_id)),
            is_admin,
        }
    }

    pub async fn seed_user(store: &MemoryStore, user_id: &str, is_admin: bool) -> User {
        store
            .upsert(UpsertUser {
                id: user_id.to_string(),
                email: Some(format!("{}@example.com", user_id)),
                ..Default::default()
            })
            .await
            .unwrap();
        store.set_admin(user_id, is_admin).await.unwrap()
    }

    pub fn new_ride(model: &str, price_per_day: i64) -> NewRide {
        NewRide {
            model: model.to_string(),
            category: "Sedan".to_string(),
            image_url: "https://img.test/car.png".to_string(),
            price_per_day: Decimal::from(price_per_day),
            seats: 5,
            transmission: "Automatic".to_string(),
            fuel_type: "Gasoline".to_string(),
            rating: Decimal::new(45, 1),
            review_count: 12,
            available: true,
            location: "Downtown".to_string(),
        }
    }

    pub async fn seed_ride(store: &Arc<MemoryStore>, model: &str, price_per_day: i64) -> Ride {
        RideStore::create(store.as_ref(), new_ride(model, price_per_day))
            .await
            .unwrap()
    }
}
