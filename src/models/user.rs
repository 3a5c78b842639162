//! Modelo de User
//!
//! Los usuarios se crean en la primera autenticación y se sincronizan
//! con el perfil del proveedor de identidad en cada request autenticada.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User - mapea exactamente a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub is_admin: bool,
    pub stripe_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Perfil que llega del proveedor de identidad.
///
/// No incluye `is_admin` ni `stripe_customer_id`: la sincronización
/// nunca toca esas columnas.
#[derive(Debug, Clone, Default)]
pub struct UpsertUser {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

impl User {
    /// Usuario recién creado a partir del perfil
    pub fn from_profile(profile: UpsertUser, now: DateTime<Utc>) -> Self {
        Self {
            id: profile.id,
            email: profile.email,
            first_name: profile.first_name,
            last_name: profile.last_name,
            profile_image_url: profile.profile_image_url,
            is_admin: false,
            stripe_customer_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Aplicar el perfil sincronizado conservando capacidades y referencias de pago
    pub fn apply_profile(&mut self, profile: UpsertUser, now: DateTime<Utc>) {
        self.email = profile.email;
        self.first_name = profile.first_name;
        self.last_name = profile.last_name;
        self.profile_image_url = profile.profile_image_url;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_sync_keeps_admin_flag() {
        let now = Utc::now();
        let mut user = User::from_profile(
            UpsertUser {
                id: "u1".to_string(),
                email: Some("old@example.com".to_string()),
                ..Default::default()
            },
            now,
        );
        user.is_admin = true;
        user.stripe_customer_id = Some("cus_123".to_string());

        user.apply_profile(
            UpsertUser {
                id: "u1".to_string(),
                email: Some("new@example.com".to_string()),
                first_name: Some("Lena".to_string()),
                ..Default::default()
            },
            now,
        );

        assert!(user.is_admin);
        assert_eq!(user.stripe_customer_id.as_deref(), Some("cus_123"));
        assert_eq!(user.email.as_deref(), Some("new@example.com"));
        assert_eq!(user.first_name.as_deref(), Some("Lena"));
    }
}
