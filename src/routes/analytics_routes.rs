use axum::{extract::State, routing::get, Extension, Json, Router};

use crate::models::{analytics::AnalyticsSummary, auth::AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Resumen para el panel de administración (requiere `auth_middleware`)
pub fn create_analytics_router() -> Router<AppState> {
    Router::new().route("/analytics", get(get_analytics))
}

async fn get_analytics(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedUser>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    Ok(Json(state.analytics.get_analytics(&principal).await?))
}
