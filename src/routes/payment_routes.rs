use axum::{extract::State, routing::post, Extension, Json, Router};

use crate::dto::payment_dto::{
    ConfirmPaymentRequest, ConfirmPaymentResponse, CreatePaymentIntentRequest, PaymentIntentResponse,
};
use crate::models::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::AppJson;

/// Rutas de pago (requiere `auth_middleware`)
pub fn create_payment_router() -> Router<AppState> {
    Router::new()
        .route("/create-payment-intent", post(create_payment_intent))
        .route("/confirm-payment", post(confirm_payment))
}

async fn create_payment_intent(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    AppJson(request): AppJson<CreatePaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    Ok(Json(state.payments.create_intent(&principal, request).await?))
}

async fn confirm_payment(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    AppJson(request): AppJson<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>, AppError> {
    Ok(Json(state.payments.confirm_intent(&principal, request).await?))
}
