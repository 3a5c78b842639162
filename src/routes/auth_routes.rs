use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::models::{auth::AuthenticatedUser, user::User};
use crate::state::AppState;
use crate::utils::errors::{not_found_error, AppError};

/// Configura las rutas de autenticación (requiere `auth_middleware`)
pub fn create_auth_router() -> Router<AppState> {
    Router::new().route("/user", get(current_user))
}

async fn current_user(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
) -> Result<Json<User>, AppError> {
    let user = state
        .users
        .find_by_id(&principal.user_id)
        .await?
        .ok_or_else(|| not_found_error("User", &principal.user_id))?;
    Ok(Json(user))
}
