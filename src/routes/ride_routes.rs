use axum::{
    extract::{Path, Query, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Extension, Json, Router,
};

use crate::dto::ride_dto::{CreateRideRequest, RideFilters, UpdateRideRequest};
use crate::middleware::auth::{auth_middleware, optional_auth_middleware};
use crate::models::{auth::AuthenticatedUser, ride::Ride};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::extract::AppJson;

/// Catálogo público; alta y edición sólo para administradores
pub fn create_ride_router(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_rides))
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware))
        .route("/:id", get(get_ride));

    let admin = Router::new()
        .route("/", post(create_ride))
        .route("/:id", put(update_ride))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    public.merge(admin)
}

async fn list_rides(
    State(state): State<AppState>,
    principal: Option<Extension<AuthenticatedUser>>,
    Query(filters): Query<RideFilters>,
) -> Result<Json<Vec<Ride>>, AppError> {
    let principal = principal.map(|Extension(p)| p);
    let rides = state.rides.list_rides(filters, principal.as_ref()).await?;
    Ok(Json(rides))
}

async fn get_ride(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(state.rides.get_ride(&id).await?))
}

async fn create_ride(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    AppJson(request): AppJson<CreateRideRequest>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(state.rides.create_ride(&principal, request).await?))
}

async fn update_ride(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    AppJson(request): AppJson<UpdateRideRequest>,
) -> Result<Json<Ride>, AppError> {
    Ok(Json(state.rides.update_ride(&principal, &id, request).await?))
}
