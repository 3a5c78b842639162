use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use super::BookingStore;
use crate::models::booking::{Booking, BookingStats, BookingStatus, NewBooking};
use crate::utils::errors::AppResult;

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for BookingRepository {
    async fn create(&self, booking: NewBooking) -> AppResult<Booking> {
        let now = Utc::now();

        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (id, user_id, ride_id, pickup_date, return_date, pickup_location,
                                  driver_age, phone_number, total_amount, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking.user_id)
        .bind(booking.ride_id)
        .bind(booking.pickup_date)
        .bind(booking.return_date)
        .bind(booking.pickup_location)
        .bind(booking.driver_age)
        .bind(booking.phone_number)
        .bind(booking.total_amount)
        .bind(BookingStatus::Pending.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    async fn list_by_user(&self, user_id: &str) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    async fn list_all(&self) -> AppResult<Vec<Booking>> {
        let bookings = sqlx::query_as::<_, Booking>("SELECT * FROM bookings ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(bookings)
    }

    async fn set_payment_intent(&self, id: Uuid, intent_id: &str) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET payment_intent_id = $2, updated_at = $3
            WHERE id = $1 AND status = $4
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(intent_id)
        .bind(Utc::now())
        .bind(BookingStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn confirm_payment(&self, id: Uuid, intent_id: &str) -> AppResult<Option<Booking>> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $2, payment_intent_id = $3, updated_at = $4
            WHERE id = $1 AND status = $5
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(BookingStatus::Confirmed.as_str())
        .bind(intent_id)
        .bind(Utc::now())
        .bind(BookingStatus::Pending.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: &[BookingStatus],
        to: BookingStatus,
    ) -> AppResult<Option<Booking>> {
        let from: Vec<String> = from.iter().map(|s| s.as_str().to_string()).collect();

        // Una sola sentencia: dos transiciones concurrentes no pueden ganar ambas
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = $3
            WHERE id = $1 AND status = ANY($4)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(to.as_str())
        .bind(Utc::now())
        .bind(from)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn stats(&self) -> AppResult<BookingStats> {
        let (total_bookings, revenue) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(total_amount) FILTER (WHERE status IN ('confirmed', 'completed')), 0)
            FROM bookings
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(BookingStats { total_bookings, revenue })
    }
}
