//! Clients - procesadores de pago externos
//!
//! `PaymentProcessor` es la frontera con el procesador. El servicio de pagos
//! sólo conoce este trait: `StripeClient` habla con la API real y
//! `MockPaymentProcessor` guarda los intents en memoria.

pub mod mock_payment;
pub mod stripe_client;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::errors::AppError;

pub use mock_payment::MockPaymentProcessor;
pub use stripe_client::StripeClient;

/// Clave de metadata con la que el intent queda correlacionado con la reserva
pub const BOOKING_ID_METADATA_KEY: &str = "bookingId";

/// Estado de un payment intent tal y como lo reporta el procesador
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl PaymentIntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentIntentStatus::RequiresPaymentMethod => "requires_payment_method",
            PaymentIntentStatus::RequiresConfirmation => "requires_confirmation",
            PaymentIntentStatus::RequiresAction => "requires_action",
            PaymentIntentStatus::Processing => "processing",
            PaymentIntentStatus::RequiresCapture => "requires_capture",
            PaymentIntentStatus::Canceled => "canceled",
            PaymentIntentStatus::Succeeded => "succeeded",
            PaymentIntentStatus::Unknown => "unknown",
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, PaymentIntentStatus::Succeeded)
    }
}

impl fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment intent devuelto por el procesador
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    /// Importe en unidades menores (céntimos)
    pub amount: i64,
    pub currency: String,
    pub status: PaymentIntentStatus,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl PaymentIntent {
    /// Reserva correlacionada, si el intent se creó con ella
    pub fn booking_id(&self) -> Option<&str> {
        self.metadata
            .get(BOOKING_ID_METADATA_KEY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// Parámetros para crear un intent
#[derive(Debug, Clone)]
pub struct CreateIntentParams {
    pub amount_minor: i64,
    pub currency: String,
    pub booking_id: String,
}

/// Errores del procesador de pagos
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment processor request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("payment processor rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("payment intent '{0}' not found")]
    NotFound(String),

    #[error("invalid payment parameters: {0}")]
    InvalidParameters(String),

    #[error("payment processor error: {0}")]
    Provider(String),
}

impl From<PaymentError> for AppError {
    fn from(error: PaymentError) -> Self {
        AppError::Upstream(error.to_string())
    }
}

#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    async fn create_payment_intent(&self, params: CreateIntentParams) -> Result<PaymentIntent, PaymentError>;

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError>;
}
