//! Procesador de pagos simulado
//!
//! Guarda los intents en memoria. Los tests (y el modo desarrollo) deciden
//! el estado que reportará cada intent y pueden forzar un fallo.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CreateIntentParams, PaymentError, PaymentIntent, PaymentIntentStatus, PaymentProcessor,
    BOOKING_ID_METADATA_KEY,
};

pub struct MockPaymentProcessor {
    intents: RwLock<HashMap<String, PaymentIntent>>,
    fail_next: RwLock<bool>,
    // Estado con el que nacen los intents nuevos
    initial_status: PaymentIntentStatus,
}

impl Default for MockPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPaymentProcessor {
    /// Los intents nacen en `requires_payment_method`, como en Stripe
    pub fn new() -> Self {
        Self::with_initial_status(PaymentIntentStatus::RequiresPaymentMethod)
    }

    /// Útil en desarrollo: los intents nacen directamente en `succeeded`
    pub fn auto_succeed() -> Self {
        Self::with_initial_status(PaymentIntentStatus::Succeeded)
    }

    fn with_initial_status(initial_status: PaymentIntentStatus) -> Self {
        Self {
            intents: RwLock::new(HashMap::new()),
            fail_next: RwLock::new(false),
            initial_status,
        }
    }

    /// La próxima operación devolverá un error del procesador
    pub async fn set_fail_next(&self, fail: bool) {
        *self.fail_next.write().await = fail;
    }

    /// Simular el resultado del pago del cliente
    pub async fn set_status(&self, id: &str, status: PaymentIntentStatus) -> Result<(), PaymentError> {
        let mut intents = self.intents.write().await;
        let intent = intents
            .get_mut(id)
            .ok_or_else(|| PaymentError::NotFound(id.to_string()))?;
        intent.status = status;
        Ok(())
    }

    /// Registrar un intent arbitrario (p. ej. sin metadata de reserva)
    pub async fn insert_intent(&self, intent: PaymentIntent) {
        self.intents.write().await.insert(intent.id.clone(), intent);
    }

    pub async fn intent_count(&self) -> usize {
        self.intents.read().await.len()
    }

    async fn take_failure(&self) -> Result<(), PaymentError> {
        let mut fail_next = self.fail_next.write().await;
        if *fail_next {
            *fail_next = false;
            return Err(PaymentError::Provider("mock configured to fail".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentProcessor for MockPaymentProcessor {
    async fn create_payment_intent(&self, params: CreateIntentParams) -> Result<PaymentIntent, PaymentError> {
        self.take_failure().await?;

        if params.amount_minor <= 0 {
            return Err(PaymentError::InvalidParameters(
                "amount must be greater than zero".to_string(),
            ));
        }

        let id = format!("pi_mock_{}", Uuid::new_v4().simple());
        let intent = PaymentIntent {
            id: id.clone(),
            amount: params.amount_minor,
            currency: params.currency.to_lowercase(),
            status: self.initial_status.clone(),
            client_secret: Some(format!("{}_secret_{}", id, Uuid::new_v4().simple())),
            metadata: HashMap::from([(BOOKING_ID_METADATA_KEY.to_string(), params.booking_id)]),
        };

        self.intents.write().await.insert(id, intent.clone());
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        self.take_failure().await?;

        self.intents
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| PaymentError::NotFound(id.to_string()))
    }
}
