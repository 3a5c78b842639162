use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use super::UserStore;
use crate::models::user::{UpsertUser, User};
use crate::utils::errors::AppResult;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn upsert(&self, profile: UpsertUser) -> AppResult<User> {
        // is_admin y stripe_customer_id no se tocan en la sincronización
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, first_name, last_name, profile_image_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                profile_image_url = EXCLUDED.profile_image_url,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(profile.id)
        .bind(profile.email)
        .bind(profile.first_name)
        .bind(profile.last_name)
        .bind(profile.profile_image_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn count(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
