//! Store en memoria
//!
//! Implementa los tres contratos de persistencia sobre mapas protegidos por
//! `RwLock`. Se usa con `STORAGE_BACKEND=memory` y en los tests. Las
//! transiciones de estado se evalúan bajo el lock de escritura, con la misma
//! semántica compare-and-set que el UPDATE condicional de PostgreSQL.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookingStore, RideStore, UserStore};
use crate::models::booking::{Booking, BookingStats, BookingStatus, NewBooking};
use crate::models::ride::{NewRide, Ride, RideChanges, RideQuery};
use crate::models::user::{UpsertUser, User};
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    rides: RwLock<HashMap<Uuid, Ride>>,
    // Orden de inserción: el listado invertido es "más recientes primero"
    bookings: RwLock<Vec<Booking>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Conceder o retirar el rol de administrador.
    ///
    /// La capacidad de admin no llega por el perfil del proveedor de
    /// identidad; en PostgreSQL se asigna a mano sobre la tabla `users`.
    pub async fn set_admin(&self, user_id: &str, is_admin: bool) -> AppResult<User> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(user_id)
            .ok_or_else(|| not_found_error("User", user_id))?;
        user.is_admin = is_admin;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn upsert(&self, profile: UpsertUser) -> AppResult<User> {
        let now = Utc::now();
        let mut users = self.users.write().await;

        let user = match users.get_mut(&profile.id) {
            Some(existing) => {
                existing.apply_profile(profile, now);
                existing.clone()
            }
            None => {
                let user = User::from_profile(profile, now);
                users.insert(user.id.clone(), user.clone());
                user
            }
        };

        Ok(user)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.users.read().await.len() as i64)
    }
}

#[async_trait]
impl RideStore for MemoryStore {
    async fn list(&self, query: &RideQuery) -> AppResult<Vec<Ride>> {
        let rides = self.rides.read().await;
        let mut matching: Vec<Ride> = rides.values().filter(|r| query.matches(r)).cloned().collect();
        matching.sort_by(|a, b| query.sort.compare(a, b));
        Ok(matching)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Ride>> {
        Ok(self.rides.read().await.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Ride>> {
        let rides = self.rides.read().await;
        Ok(ids.iter().filter_map(|id| rides.get(id).cloned()).collect())
    }

    async fn create(&self, ride: NewRide) -> AppResult<Ride> {
        let now = Utc::now();
        let ride = Ride {
            id: Uuid::new_v4(),
            model: ride.model,
            category: ride.category,
            image_url: ride.image_url,
            price_per_day: ride.price_per_day,
            seats: ride.seats,
            transmission: ride.transmission,
            fuel_type: ride.fuel_type,
            rating: ride.rating,
            review_count: ride.review_count,
            available: ride.available,
            location: ride.location,
            created_at: now,
            updated_at: now,
        };

        self.rides.write().await.insert(ride.id, ride.clone());
        Ok(ride)
    }

    async fn update(&self, id: Uuid, changes: RideChanges) -> AppResult<Option<Ride>> {
        let mut rides = self.rides.write().await;
        Ok(rides.get_mut(&id).map(|ride| {
            changes.apply_to(ride, Utc::now());
            ride.clone()
        }))
    }

    async fn count_available(&self) -> AppResult<i64> {
        Ok(self.rides.read().await.values().filter(|r| r.available).count() as i64)
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id: booking.user_id,
            ride_id: booking.ride_id,
            pickup_date: booking.pickup_date,
            return_date: booking.return_date,
            pickup_location: booking.pickup_location,
            driver_age: booking.driver_age,
            phone_number: booking.phone_number,
            total_amount: booking.total_amount,
            payment_intent_id: None,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.bookings.write().await.push(booking.clone());
        Ok(booking)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.bookings.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.iter().rev().filter(|b| b.user_id == user_id).cloned().collect())
    }

    async fn list_all(&self) -> AppResult<Vec<Booking>> {
        Ok(self.bookings.read().await.iter().rev().cloned().collect())
    }

    async fn set_payment_intent(&self, id: Uuid, intent_id: &str) -> AppResult<Option<Booking>> {
        let mut bookings = self.bookings.write().await;
        Ok(bookings
            .iter_mut()
            .find(|b| b.id == id && b.status == BookingStatus::Pending)
            .map(|booking| {
                booking.payment_intent_id = Some(intent_id.to_string());
                booking.updated_at = Utc::now();
                booking.clone()
            }))
    }

    async fn confirm_payment(&self, id: Uuid, intent_id: &str) -> AppResult<Option<Booking>> {
        let mut bookings = self.bookings.write().await;
        Ok(bookings
            .iter_mut()
            .find(|b| b.id == id && b.status == BookingStatus::Pending)
            .map(|booking| {
                booking.status = BookingStatus::Confirmed;
                booking.payment_intent_id = Some(intent_id.to_string());
                booking.updated_at = Utc::now();
                booking.clone()
            }))
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let mut bookings = self.bookings.write().await;
        Ok(bookings
            .iter_mut()
            .find(|b| b.id == id && from.contains(&b.status))
            .map(|booking| {
                booking.status = to;
                booking.updated_at = Utc::now();
                booking.clone()
            }))
    }

    async fn stats(&self) -> AppResult<BookingStats> {
        let bookings = self.bookings.read().await;
        let revenue = bookings
            .iter()
            .filter(|b| b.status.counts_as_revenue())
            .try_fold(Decimal::ZERO, |acc, b| acc.checked_add(b.total_amount))
            .ok_or_else(|| AppError::Internal("revenue total overflowed".to_string()))?;

        Ok(BookingStats {
            total_bookings: bookings.len() as i64,
            revenue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;

    fn new_ride(model: &str, price: i64) -> NewRide {
        NewRide {
            model: model.to_string(),
            category: "Sedan".to_string(),
            image_url: "https://img.test/car.png".to_string(),
            price_per_day: Decimal::from(price),
            seats: 5,
            transmission: "Automatic".to_string(),
            fuel_type: "Gasoline".to_string(),
            rating: Decimal::new(45, 1),
            review_count: 3,
            available: true,
            location: "Downtown".to_string(),
        }
    }

    fn new_booking(user_id: &str, ride_id: Uuid, amount: i64) -> NewBooking {
        let pickup = Utc::now() + Duration::days(1);
        NewBooking {
            user_id: user_id.to_string(),
            ride_id,
            pickup_date: pickup,
            return_date: pickup + Duration::days(2),
            pickup_location: "Airport".to_string(),
            driver_age: "26-35".to_string(),
            phone_number: "+15551234567".to_string(),
            total_amount: Decimal::from(amount),
        }
    }

    fn profile(id: &str, email: &str) -> UpsertUser {
        UpsertUser {
            id: id.to_string(),
            email: Some(email.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_preserves_admin_flag() {
        let store = MemoryStore::new();
        store.upsert(profile("u1", "a@example.com")).await.unwrap();
        store.set_admin("u1", true).await.unwrap();

        let synced = store.upsert(profile("u1", "b@example.com")).await.unwrap();
        assert!(synced.is_admin);
        assert_eq!(synced.email.as_deref(), Some("b@example.com"));
        assert_eq!(UserStore::count(&store).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_users_may_share_an_email() {
        let store = MemoryStore::new();
        store.upsert(profile("u1", "shared@example.com")).await.unwrap();
        let second = store.upsert(profile("u2", "shared@example.com")).await.unwrap();

        assert_eq!(second.id, "u2");
        assert_eq!(UserStore::count(&store).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_set_admin_unknown_user() {
        let store = MemoryStore::new();
        assert!(store.set_admin("ghost", true).await.is_err());
    }

    #[tokio::test]
    async fn test_list_rides_sorted_by_price() {
        let store = MemoryStore::new();
        RideStore::create(&store, new_ride("Premium", 120)).await.unwrap();
        RideStore::create(&store, new_ride("Budget", 35)).await.unwrap();

        let rides = store.list(&RideQuery::default()).await.unwrap();
        let models: Vec<_> = rides.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(models, ["Budget", "Premium"]);
    }

    #[tokio::test]
    async fn test_bookings_newest_first() {
        let store = MemoryStore::new();
        let ride = RideStore::create(&store, new_ride("Civic", 40)).await.unwrap();
        let first = BookingStore::create(&store, new_booking("u1", ride.id, 100)).await.unwrap();
        let second = BookingStore::create(&store, new_booking("u1", ride.id, 200)).await.unwrap();
        BookingStore::create(&store, new_booking("u2", ride.id, 300)).await.unwrap();

        let mine = store.list_by_user("u1").await.unwrap();
        assert_eq!(mine.iter().map(|b| b.id).collect::<Vec<_>>(), vec![second.id, first.id]);
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_transition_is_compare_and_set() {
        let store = MemoryStore::new();
        let ride = RideStore::create(&store, new_ride("Civic", 40)).await.unwrap();
        let booking = BookingStore::create(&store, new_booking("u1", ride.id, 100)).await.unwrap();

        let cancelled = store
            .transition_status(booking.id, &[BookingStatus::Pending], BookingStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(cancelled.map(|b| b.status), Some(BookingStatus::Cancelled));

        let confirmed = store
            .transition_status(booking.id, &[BookingStatus::Pending], BookingStatus::Confirmed)
            .await
            .unwrap();
        assert!(confirmed.is_none());
        assert!(store.set_payment_intent(booking.id, "pi_late").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_confirm_payment_stores_the_paid_intent() {
        let store = Arc::new(MemoryStore::new());
        let ride = RideStore::create(store.as_ref(), new_ride("Civic", 40)).await.unwrap();
        let booking = BookingStore::create(store.as_ref(), new_booking("u1", ride.id, 100))
            .await
            .unwrap();
        store.set_payment_intent(booking.id, "pi_paid").await.unwrap();

        let attach = {
            let store = store.clone();
            tokio::spawn(async move { store.set_payment_intent(booking.id, "pi_unpaid").await.unwrap() })
        };
        let confirm = {
            let store = store.clone();
            tokio::spawn(async move { store.confirm_payment(booking.id, "pi_paid").await.unwrap() })
        };
        attach.await.unwrap();
        assert!(confirm.await.unwrap().is_some());

        let stored = BookingStore::find_by_id(store.as_ref(), booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
        assert_eq!(stored.payment_intent_id.as_deref(), Some("pi_paid"));
        assert!(store.confirm_payment(booking.id, "pi_paid").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stats_revenue_overflow_is_an_error() {
        let store = MemoryStore::new();
        let ride = RideStore::create(&store, new_ride("Civic", 40)).await.unwrap();
        for _ in 0..2 {
            let booking = BookingStore::create(
                &store,
                NewBooking {
                    total_amount: Decimal::MAX,
                    ..new_booking("u1", ride.id, 0)
                },
            )
            .await
            .unwrap();
            store.confirm_payment(booking.id, "pi_1").await.unwrap();
        }

        assert!(matches!(store.stats().await, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_concurrent_transitions_single_winner() {
        let store = Arc::new(MemoryStore::new());
        let ride = RideStore::create(store.as_ref(), new_ride("Civic", 40)).await.unwrap();
        let booking = BookingStore::create(store.as_ref(), new_booking("u1", ride.id, 100))
            .await
            .unwrap();

        let handles: Vec<_> = [BookingStatus::Confirmed, BookingStatus::Cancelled]
            .into_iter()
            .cycle()
            .take(8)
            .map(|to| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .transition_status(booking.id, &[BookingStatus::Pending], to)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_stats_count_confirmed_and_completed_revenue() {
        let store = MemoryStore::new();
        let ride = RideStore::create(&store, new_ride("Civic", 40)).await.unwrap();
        let pending = BookingStore::create(&store, new_booking("u1", ride.id, 100)).await.unwrap();
        let confirmed = BookingStore::create(&store, new_booking("u1", ride.id, 200)).await.unwrap();
        let completed = BookingStore::create(&store, new_booking("u2", ride.id, 300)).await.unwrap();
        let cancelled = BookingStore::create(&store, new_booking("u2", ride.id, 400)).await.unwrap();

        store
            .transition_status(confirmed.id, &[BookingStatus::Pending], BookingStatus::Confirmed)
            .await
            .unwrap();
        store
            .transition_status(completed.id, &[BookingStatus::Pending], BookingStatus::Confirmed)
            .await
            .unwrap();
        store
            .transition_status(completed.id, &[BookingStatus::Confirmed], BookingStatus::Completed)
            .await
            .unwrap();
        store
            .transition_status(cancelled.id, &[BookingStatus::Pending], BookingStatus::Cancelled)
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_bookings, 4);
        assert_eq!(stats.revenue, Decimal::from(500));
        assert_eq!(
            BookingStore::find_by_id(&store, pending.id).await.unwrap().map(|b| b.status),
            Some(BookingStatus::Pending)
        );
    }
}
