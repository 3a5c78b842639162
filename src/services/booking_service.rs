//! Servicio del ciclo de vida de las reservas
//!
//! Todas las transiciones de estado pasan por el compare-and-set del store:
//! la comprobación del estado actual y la escritura del nuevo son atómicas,
//! así que dos requests concurrentes sobre la misma reserva no pueden ganar
//! ambas.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::{parse_id, require_admin};
use crate::dto::booking_dto::CreateBookingRequest;
use crate::models::auth::AuthenticatedUser;
use crate::models::booking::{
    calculate_total_amount, Booking, BookingStatus, BookingWithDetails, NewBooking,
};
use crate::repositories::{BookingStore, RideStore, UserStore};
use crate::utils::clock::Clock;
use crate::utils::errors::{
    conflict_error, forbidden_error, not_found_error, validation_error, AppError, AppResult,
};
use crate::utils::validation::parse_booking_date;

pub struct BookingService {
    bookings: Arc<dyn BookingStore>,
    rides: Arc<dyn RideStore>,
    users: Arc<dyn UserStore>,
    clock: Arc<dyn Clock>,
    insurance_per_day: Decimal,
}

impl BookingService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        rides: Arc<dyn RideStore>,
        users: Arc<dyn UserStore>,
        clock: Arc<dyn Clock>,
        insurance_per_day: Decimal,
    ) -> Self {
        Self {
            bookings,
            rides,
            users,
            clock,
            insurance_per_day,
        }
    }

    /// Crear una reserva `pending` con el importe calculado en el servidor
    pub async fn create(
        &self,
        principal: &AuthenticatedUser,
        request: CreateBookingRequest,
    ) -> AppResult<Booking> {
        request.validate()?;

        let pickup_date = parse_booking_date(&request.pickup_date)
            .map_err(|_| validation_error("pickup_date", "invalid date"))?;
        let return_date = parse_booking_date(&request.return_date)
            .map_err(|_| validation_error("return_date", "invalid date"))?;

        if return_date <= pickup_date {
            return Err(validation_error("return_date", "must be after the pickup date"));
        }
        if pickup_date.date_naive() < self.clock.now().date_naive() {
            return Err(validation_error("pickup_date", "must not be in the past"));
        }

        let ride_id = parse_id("Ride", &request.ride_id)?;
        let ride = self
            .rides
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| not_found_error("Ride", &request.ride_id))?;
        if !ride.available {
            return Err(conflict_error("Ride", &request.ride_id, "ride is not available"));
        }

        let total_amount =
            calculate_total_amount(ride.price_per_day, self.insurance_per_day, pickup_date, return_date)
                .ok_or_else(|| validation_error("total_amount", "booking total exceeds the maximum amount"))?;

        let booking = self
            .bookings
            .create(NewBooking {
                user_id: principal.user_id.clone(),
                ride_id,
                pickup_date,
                return_date,
                pickup_location: request.pickup_location.trim().to_string(),
                driver_age: request.driver_age,
                phone_number: request.phone_number.trim().to_string(),
                total_amount,
            })
            .await?;

        info!(
            "📝 Reserva creada: {} (vehículo {}, usuario {}, total {})",
            booking.id, booking.ride_id, booking.user_id, booking.total_amount
        );
        Ok(booking)
    }

    /// Reserva sin comprobación de acceso; NotFound si no existe
    pub async fn find(&self, booking_id: Uuid) -> AppResult<Booking> {
        self.bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))
    }

    /// Asociar el payment intent a una reserva pendiente. La última referencia gana.
    pub async fn attach_payment_intent(&self, booking_id: Uuid, intent_id: &str) -> AppResult<Booking> {
        let booking = self.find(booking_id).await?;

        if booking.payment_intent_id.as_deref() == Some(intent_id) {
            return Ok(booking);
        }
        if booking.status != BookingStatus::Pending {
            return Err(conflict_error(
                "Booking",
                &booking_id.to_string(),
                &format!("cannot attach a payment to a {} booking", booking.status),
            ));
        }

        let updated = self
            .bookings
            .set_payment_intent(booking_id, intent_id)
            .await?
            .ok_or_else(|| conflict_error("Booking", &booking_id.to_string(), "booking is no longer pending"))?;

        info!("💳 Payment intent {} asociado a la reserva {}", intent_id, booking_id);
        Ok(updated)
    }

    /// `pending → confirmed` con el intent que se pagó.
    ///
    /// La referencia se guarda en el mismo compare-and-set que cambia el
    /// estado: un intent asociado entre medias no puede quedarse con la
    /// reserva confirmada.
    pub async fn confirm(&self, booking_id: Uuid, intent_id: &str) -> AppResult<Booking> {
        let intent_id = intent_id.trim();
        if intent_id.is_empty() {
            return Err(conflict_error(
                "Booking",
                &booking_id.to_string(),
                "no payment intent attached",
            ));
        }

        if let Some(confirmed) = self.bookings.confirm_payment(booking_id, intent_id).await? {
            info!("✅ Reserva confirmada: {} (payment intent {})", booking_id, intent_id);
            return Ok(confirmed);
        }

        match self.bookings.find_by_id(booking_id).await? {
            Some(current) => Err(invalid_transition(&current, BookingStatus::Confirmed)),
            None => Err(not_found_error("Booking", &booking_id.to_string())),
        }
    }

    /// Cancelar una reserva pendiente o confirmada (dueño o administrador)
    pub async fn cancel(&self, principal: &AuthenticatedUser, booking_id: &str) -> AppResult<Booking> {
        let id = parse_id("Booking", booking_id)?;
        let booking = self.find(id).await?;

        if !principal.can_access(&booking.user_id) {
            return Err(forbidden_error("cancel booking", "booking belongs to another user"));
        }

        let cancelled = self.transition(id, BookingStatus::Cancelled).await?;
        info!("🚫 Reserva cancelada: {} por {}", id, principal.user_id);
        Ok(cancelled)
    }

    /// `confirmed → completed`, sólo administradores
    pub async fn complete(&self, principal: &AuthenticatedUser, booking_id: &str) -> AppResult<Booking> {
        require_admin(principal, "complete booking")?;
        let id = parse_id("Booking", booking_id)?;

        let completed = self.transition(id, BookingStatus::Completed).await?;
        info!("🏁 Reserva completada: {}", id);
        Ok(completed)
    }

    pub async fn get(&self, principal: &AuthenticatedUser, booking_id: &str) -> AppResult<BookingWithDetails> {
        let id = parse_id("Booking", booking_id)?;
        let booking = self.find(id).await?;

        if !principal.can_access(&booking.user_id) {
            return Err(forbidden_error("read booking", "booking belongs to another user"));
        }

        self.with_details(vec![booking])
            .await?
            .pop()
            .ok_or_else(|| AppError::Internal(format!("booking {} has dangling references", id)))
    }

    pub async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<BookingWithDetails>> {
        let bookings = self.bookings.list_by_user(user_id).await?;
        self.with_details(bookings).await
    }

    pub async fn list_all(&self, principal: &AuthenticatedUser) -> AppResult<Vec<BookingWithDetails>> {
        require_admin(principal, "list all bookings")?;
        let bookings = self.bookings.list_all().await?;
        self.with_details(bookings).await
    }

    /// Todas para administradores, las propias para el resto
    pub async fn list(&self, principal: &AuthenticatedUser) -> AppResult<Vec<BookingWithDetails>> {
        if principal.is_admin {
            self.list_all(principal).await
        } else {
            self.list_for_user(&principal.user_id).await
        }
    }

    /// CAS hacia `to` desde cualquier estado que lo permita
    async fn transition(&self, booking_id: Uuid, to: BookingStatus) -> AppResult<Booking> {
        let sources = BookingStatus::sources_of(to);
        if let Some(updated) = self.bookings.transition_status(booking_id, &sources, to).await? {
            return Ok(updated);
        }

        // Perdió el CAS: distinguir inexistente de estado incompatible
        match self.bookings.find_by_id(booking_id).await? {
            Some(current) => Err(invalid_transition(&current, to)),
            None => Err(not_found_error("Booking", &booking_id.to_string())),
        }
    }

    /// Unir vehículo y usuario a cada reserva con dos lecturas por lote
    async fn with_details(&self, bookings: Vec<Booking>) -> AppResult<Vec<BookingWithDetails>> {
        if bookings.is_empty() {
            return Ok(Vec::new());
        }

        let ride_ids: Vec<Uuid> = bookings
            .iter()
            .map(|b| b.ride_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let user_ids: Vec<String> = bookings
            .iter()
            .map(|b| b.user_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let rides: HashMap<_, _> = self
            .rides
            .find_by_ids(&ride_ids)
            .await?
            .into_iter()
            .map(|ride| (ride.id, ride))
            .collect();
        let users: HashMap<_, _> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|user| (user.id.clone(), user))
            .collect();

        Ok(bookings
            .into_iter()
            .filter_map(|booking| {
                match (rides.get(&booking.ride_id), users.get(&booking.user_id)) {
                    (Some(ride), Some(user)) => Some(BookingWithDetails {
                        ride: ride.clone(),
                        user: user.clone(),
                        booking,
                    }),
                    _ => {
                        warn!("⚠️ Reserva {} con referencias colgantes, se omite", booking.id);
                        None
                    }
                }
            })
            .collect())
    }
}

fn invalid_transition(booking: &Booking, to: BookingStatus) -> AppError {
    conflict_error(
        "Booking",
        &booking.id.to_string(),
        &format!("cannot move from {} to {}", booking.status, to),
    )
}
