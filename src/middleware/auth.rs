//! Middleware de autenticación JWT
//!
//! Este módulo maneja la autenticación JWT, la sincronización del usuario
//! y la inyección del principal en las extensiones de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{
    models::{auth::AuthenticatedUser, user::UpsertUser},
    state::AppState,
    utils::{
        errors::{AppError, AppResult},
        jwt::{extract_token_from_header, verify_token, JwtClaims},
    },
};

/// Middleware de autenticación JWT
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let principal = authenticate(&state, auth_header).await?;
    request.extensions_mut().insert(principal);

    Ok(next.run(request).await)
}

/// Como `auth_middleware`, pero una request anónima o con token inválido
/// sigue adelante sin principal
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if let Some(auth_header) = auth_header {
        match authenticate(&state, &auth_header).await {
            Ok(principal) => {
                request.extensions_mut().insert(principal);
            }
            Err(e) => debug!("🔓 Request anónima, token ignorado: {}", e),
        }
    }

    next.run(request).await
}

/// Verificar el token y sincronizar el perfil en la tabla users
async fn authenticate(state: &AppState, auth_header: &str) -> AppResult<AuthenticatedUser> {
    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;

    let user = state.users.upsert(profile_from_claims(claims)).await?;
    debug!("🔑 Usuario autenticado: {} (admin: {})", user.id, user.is_admin);

    Ok(AuthenticatedUser::from(&user))
}

fn profile_from_claims(claims: JwtClaims) -> UpsertUser {
    UpsertUser {
        id: claims.sub,
        email: claims.email,
        first_name: claims.first_name,
        last_name: claims.last_name,
        profile_image_url: claims.profile_image_url,
    }
}
