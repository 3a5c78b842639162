use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::booking::Booking;

// Request para crear un payment intent
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentIntentRequest {
    pub amount: Option<Decimal>,
    pub booking_id: Option<String>,
}

// Response con el secreto que usa el formulario de pago del cliente
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
    pub payment_intent_id: String,
}

// Request para confirmar un pago
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    #[serde(default)]
    pub payment_intent_id: String,
}

// Response de confirmación
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    /// La reserva ya estaba confirmada: no hubo transición
    pub already_confirmed: bool,
    pub booking: Booking,
}
