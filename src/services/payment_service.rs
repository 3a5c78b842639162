//! Orquestación de pagos
//!
//! Proxy verificador sobre el procesador: el importe cobrado siempre es el
//! `total_amount` guardado en la reserva, y una reserva sólo se confirma
//! después de volver a consultar el intent al procesador.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::BookingService;
use crate::clients::{CreateIntentParams, PaymentProcessor};
use crate::dto::payment_dto::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, CreatePaymentIntentRequest, PaymentIntentResponse,
};
use crate::models::auth::AuthenticatedUser;
use crate::models::booking::{Booking, BookingStatus};
use crate::utils::errors::{conflict_error, forbidden_error, not_found_error, validation_error, AppError, AppResult};

pub struct PaymentService {
    processor: Arc<dyn PaymentProcessor>,
    bookings: Arc<BookingService>,
    currency: String,
}

impl PaymentService {
    pub fn new(processor: Arc<dyn PaymentProcessor>, bookings: Arc<BookingService>, currency: String) -> Self {
        Self {
            processor,
            bookings,
            currency,
        }
    }

    /// Crear el intent por el importe de la reserva y asociarlo a ella
    pub async fn create_intent(
        &self,
        principal: &AuthenticatedUser,
        request: CreatePaymentIntentRequest,
    ) -> AppResult<PaymentIntentResponse> {
        let raw_id = request
            .booking_id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| validation_error("booking_id", "bookingId is required"))?;
        let amount = request
            .amount
            .ok_or_else(|| validation_error("amount", "amount is required"))?;

        let booking_id = Uuid::parse_str(raw_id.trim()).map_err(|_| not_found_error("Booking", &raw_id))?;
        let booking = self.bookings.find(booking_id).await?;

        if !principal.can_access(&booking.user_id) {
            return Err(forbidden_error("pay booking", "booking belongs to another user"));
        }
        if booking.status != BookingStatus::Pending {
            return Err(conflict_error(
                "Booking",
                &raw_id,
                &format!("cannot pay a {} booking", booking.status),
            ));
        }
        if amount != booking.total_amount {
            return Err(validation_error("amount", "does not match the booking total"));
        }

        let intent = self
            .processor
            .create_payment_intent(CreateIntentParams {
                amount_minor: to_minor_units(booking.total_amount)?,
                currency: self.currency.clone(),
                booking_id: booking.id.to_string(),
            })
            .await
            .map_err(|e| {
                error!("❌ Error creando payment intent para {}: {}", booking.id, e);
                AppError::from(e)
            })?;

        let client_secret = intent
            .client_secret
            .clone()
            .ok_or_else(|| AppError::Upstream(format!("payment intent {} has no client secret", intent.id)))?;

        self.bookings.attach_payment_intent(booking.id, &intent.id).await?;
        info!("💳 Payment intent {} creado para la reserva {}", intent.id, booking.id);

        Ok(PaymentIntentResponse {
            client_secret,
            payment_intent_id: intent.id,
        })
    }

    /// Confirmar la reserva si el procesador reporta el pago como completado
    pub async fn confirm_intent(
        &self,
        principal: &AuthenticatedUser,
        request: ConfirmPaymentRequest,
    ) -> AppResult<ConfirmPaymentResponse> {
        let intent_id = request.payment_intent_id.trim();
        if intent_id.is_empty() {
            return Err(validation_error("payment_intent_id", "paymentIntentId is required"));
        }

        let intent = self.processor.retrieve_payment_intent(intent_id).await.map_err(|e| {
            error!("❌ Error consultando payment intent {}: {}", intent_id, e);
            AppError::from(e)
        })?;

        if !intent.status.is_succeeded() {
            warn!("💳 Payment intent {} en estado {}", intent.id, intent.status);
            return Err(AppError::PaymentIncomplete {
                status: intent.status.to_string(),
            });
        }

        let booking_id = intent
            .booking_id()
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| {
                AppError::BadRequest(format!("payment intent {} is not linked to a booking", intent.id))
            })?;
        let booking = self.bookings.find(booking_id).await?;

        if !principal.can_access(&booking.user_id) {
            return Err(forbidden_error("confirm payment", "booking belongs to another user"));
        }
        if intent.amount != to_minor_units(booking.total_amount)? {
            return Err(conflict_error(
                "Booking",
                &booking.id.to_string(),
                "paid amount does not match the booking total",
            ));
        }
        if !intent.currency.eq_ignore_ascii_case(&self.currency) {
            return Err(conflict_error(
                "Booking",
                &booking.id.to_string(),
                &format!("paid in {} instead of {}", intent.currency, self.currency),
            ));
        }

        match booking.status {
            BookingStatus::Confirmed => self.already_confirmed(booking, &intent.id),
            // Un intent anterior que sí se pagó sustituye al último creado
            BookingStatus::Pending => {
                match self.bookings.confirm(booking.id, &intent.id).await {
                    Ok(confirmed) => Ok(ConfirmPaymentResponse {
                        success: true,
                        already_confirmed: false,
                        booking: confirmed,
                    }),
                    // Otra request confirmó en paralelo
                    Err(AppError::Conflict(reason)) => {
                        let current = self.bookings.find(booking.id).await?;
                        if current.status == BookingStatus::Confirmed {
                            self.already_confirmed(current, &intent.id)
                        } else {
                            Err(AppError::Conflict(reason))
                        }
                    }
                    Err(other) => Err(other),
                }
            }
            status => Err(conflict_error(
                "Booking",
                &booking.id.to_string(),
                &format!("cannot confirm a {} booking", status),
            )),
        }
    }

    fn already_confirmed(&self, booking: Booking, intent_id: &str) -> AppResult<ConfirmPaymentResponse> {
        if booking.payment_intent_id.as_deref() != Some(intent_id) {
            return Err(conflict_error(
                "Booking",
                &booking.id.to_string(),
                "booking was confirmed with a different payment",
            ));
        }

        info!("ℹ️ Reserva {} ya estaba confirmada", booking.id);
        Ok(ConfirmPaymentResponse {
            success: true,
            already_confirmed: true,
            booking,
        })
    }
}

/// Importe en céntimos para el procesador
fn to_minor_units(amount: Decimal) -> AppResult<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.round().to_i64())
        .ok_or_else(|| AppError::Internal(format!("amount {} out of range", amount)))
}
