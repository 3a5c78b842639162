//! Cliente HTTP de Stripe
//!
//! Sólo usa dos endpoints: crear un payment intent y leerlo de vuelta. Las
//! peticiones van form-encoded, que es lo que acepta la API de Stripe.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Deserialize;

use super::{CreateIntentParams, PaymentError, PaymentIntent, PaymentProcessor, BOOKING_ID_METADATA_KEY};

pub struct StripeClient {
    client: Client,
    secret_key: String,
    api_base: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl StripeClient {
    pub fn new(secret_key: String, api_base: String, timeout: Duration) -> Result<Self, PaymentError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            secret_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn payment_intents_url(&self) -> String {
        format!("{}/v1/payment_intents", self.api_base)
    }

    /// Convertir una respuesta de error de Stripe en `PaymentError`
    async fn read_intent(response: Response, id: Option<&str>) -> Result<PaymentIntent, PaymentError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<PaymentIntent>().await?);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(id) = id {
                return Err(PaymentError::NotFound(id.to_string()));
            }
        }

        let message = match response.json::<StripeErrorBody>().await {
            Ok(body) => match (body.error.message, body.error.code) {
                (Some(message), _) => message,
                (None, Some(code)) => code,
                (None, None) => "unknown error".to_string(),
            },
            Err(_) => format!("HTTP {}", status),
        };

        Err(PaymentError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Cuerpo `application/x-www-form-urlencoded` para crear el intent
fn create_intent_form(params: &CreateIntentParams) -> String {
    let metadata_key = format!("metadata[{}]", BOOKING_ID_METADATA_KEY);
    let amount = params.amount_minor.to_string();
    let currency = params.currency.to_lowercase();

    [
        ("amount", amount.as_str()),
        ("currency", currency.as_str()),
        (metadata_key.as_str(), params.booking_id.as_str()),
    ]
    .iter()
    .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
    .collect::<Vec<_>>()
    .join("&")
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_payment_intent(&self, params: CreateIntentParams) -> Result<PaymentIntent, PaymentError> {
        if params.amount_minor <= 0 {
            return Err(PaymentError::InvalidParameters(
                "amount must be greater than zero".to_string(),
            ));
        }

        log::info!(
            "💳 Creando payment intent en Stripe: {} {} para reserva {}",
            params.amount_minor,
            params.currency,
            params.booking_id
        );

        let response = self
            .client
            .post(self.payment_intents_url())
            .bearer_auth(&self.secret_key)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(create_intent_form(&params))
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ Error de red con Stripe: {}", e);
                PaymentError::from(e)
            })?;

        let intent = Self::read_intent(response, None).await?;
        log::info!("✅ Payment intent creado: {}", intent.id);
        Ok(intent)
    }

    async fn retrieve_payment_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        let url = format!("{}/{}", self.payment_intents_url(), urlencoding::encode(id));
        log::debug!("🔍 Consultando payment intent {}", id);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| {
                log::error!("❌ Error de red con Stripe: {}", e);
                PaymentError::from(e)
            })?;

        let intent = Self::read_intent(response, Some(id)).await?;
        log::info!("💳 Payment intent {} en estado {}", intent.id, intent.status);
        Ok(intent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_intent_form_encoding() {
        let form = create_intent_form(&CreateIntentParams {
            amount_minor: 13000,
            currency: "USD".to_string(),
            booking_id: "b 1".to_string(),
        });
        assert_eq!(
            form,
            "amount=13000&currency=usd&metadata%5BbookingId%5D=b%201"
        );
    }

    #[test]
    fn test_api_base_trailing_slash() {
        let client = StripeClient::new(
            "sk_test".to_string(),
            "https://api.stripe.com/".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.payment_intents_url(), "https://api.stripe.com/v1/payment_intents");
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amount_without_network() {
        let client = StripeClient::new(
            "sk_test".to_string(),
            "http://127.0.0.1:9".to_string(),
            Duration::from_secs(1),
        )
        .unwrap();
        let result = client
            .create_payment_intent(CreateIntentParams {
                amount_minor: 0,
                currency: "usd".to_string(),
                booking_id: "b1".to_string(),
            })
            .await;
        assert!(matches!(result, Err(PaymentError::InvalidParameters(_))));
    }
}
