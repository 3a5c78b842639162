use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};

use crate::dto::booking_dto::CreateBookingRequest;
use crate::models::auth::AuthenticatedUser;
use crate::models::booking::{Booking, BookingWithDetails};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::AppJson;

/// Rutas de reservas (requiere `auth_middleware`)
pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/:id", get(get_booking))
        .route("/:id/cancel", post(cancel_booking))
        .route("/:id/complete", post(complete_booking))
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    AppJson(request): AppJson<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.create(&principal, request).await?))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<BookingWithDetails>>, AppError> {
    Ok(Json(state.bookings.list(&principal).await?))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<BookingWithDetails>, AppError> {
    Ok(Json(state.bookings.get(&principal, &id).await?))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.cancel(&principal, &id).await?))
}

async fn complete_booking(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    Ok(Json(state.bookings.complete(&principal, &id).await?))
}
