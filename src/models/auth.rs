//! Principal autenticado
//!
//! Lo construye el middleware de autenticación a partir del JWT y del
//! registro en la tabla users, y se pasa explícitamente a los servicios.

use serde::{Deserialize, Serialize};

use super::user::User;

/// Usuario que hace la request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: Option<String>,
    pub is_admin: bool,
}

impl AuthenticatedUser {
    /// Dueño del recurso o administrador
    pub fn can_access(&self, owner_id: &str) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_access() {
        let customer = AuthenticatedUser {
            user_id: "u1".to_string(),
            email: None,
            is_admin: false,
        };
        assert!(customer.can_access("u1"));
        assert!(!customer.can_access("u2"));

        let admin = AuthenticatedUser {
            is_admin: true,
            ..customer
        };
        assert!(admin.can_access("u2"));
    }
}
