//! Extractor JSON que responde con el cuerpo de error de la API

use axum::extract::FromRequest;

use super::errors::AppError;

/// `Json<T>` cuyo rechazo se convierte en `AppError`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
