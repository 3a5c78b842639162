use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::RideStore;
use crate::models::ride::{NewRide, Ride, RideChanges, RideQuery};
use crate::utils::errors::AppResult;

pub struct RideRepository {
    pool: PgPool,
}

impl RideRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// SELECT dinámico a partir de los filtros presentes
fn build_list_query(query: &RideQuery) -> QueryBuilder<'_, Postgres> {
    let mut builder = QueryBuilder::new("SELECT * FROM rides WHERE TRUE");

    if !query.include_unavailable {
        builder.push(" AND available = TRUE");
    }
    if let Some(category) = &query.category {
        builder.push(" AND category = ").push_bind(category);
    }
    if let Some(transmission) = &query.transmission {
        builder.push(" AND transmission = ").push_bind(transmission);
    }
    if let Some(fuel_type) = &query.fuel_type {
        builder.push(" AND fuel_type = ").push_bind(fuel_type);
    }
    if let Some(location) = &query.location {
        builder
            .push(" AND location ILIKE ")
            .push_bind(format!("%{}%", escape_like(location)));
    }
    if let Some(range) = &query.price_range {
        builder.push(" AND price_per_day >= ").push_bind(range.min);
        if let Some(max) = range.max {
            builder.push(" AND price_per_day <= ").push_bind(max);
        }
    }

    builder.push(" ORDER BY ").push(query.sort.sql());
    builder
}

/// Escapar comodines de LIKE para que el texto del usuario sea literal
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl RideStore for RideRepository {
    async fn list(&self, query: &RideQuery) -> AppResult<Vec<Ride>> {
        let rides = build_list_query(query)
            .build_query_as::<Ride>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rides)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Ride>> {
        let ride = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(ride)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Ride>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rides = sqlx::query_as::<_, Ride>("SELECT * FROM rides WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rides)
    }

    async fn create(&self, ride: NewRide) -> AppResult<Ride> {
        let now = Utc::now();

        let ride = sqlx::query_as::<_, Ride>(
            r#"
            INSERT INTO rides (id, model, category, image_url, price_per_day, seats, transmission,
                               fuel_type, rating, review_count, available, location, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ride.model)
        .bind(ride.category)
        .bind(ride.image_url)
        .bind(ride.price_per_day)
        .bind(ride.seats)
        .bind(ride.transmission)
        .bind(ride.fuel_type)
        .bind(ride.rating)
        .bind(ride.review_count)
        .bind(ride.available)
        .bind(ride.location)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(ride)
    }

    async fn update(&self, id: Uuid, changes: RideChanges) -> AppResult<Option<Ride>> {
        let ride = sqlx::query_as::<_, Ride>(
            r#"
            UPDATE rides
            SET model = COALESCE($2, model),
                category = COALESCE($3, category),
                image_url = COALESCE($4, image_url),
                price_per_day = COALESCE($5, price_per_day),
                seats = COALESCE($6, seats),
                transmission = COALESCE($7, transmission),
                fuel_type = COALESCE($8, fuel_type),
                rating = COALESCE($9, rating),
                review_count = COALESCE($10, review_count),
                available = COALESCE($11, available),
                location = COALESCE($12, location),
                updated_at = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.model)
        .bind(changes.category)
        .bind(changes.image_url)
        .bind(changes.price_per_day)
        .bind(changes.seats)
        .bind(changes.transmission)
        .bind(changes.fuel_type)
        .bind(changes.rating)
        .bind(changes.review_count)
        .bind(changes.available)
        .bind(changes.location)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(ride)
    }

    async fn count_available(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rides WHERE available = TRUE")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ride::{PriceRange, RideSortOrder};

    #[test]
    fn test_public_listing_sql() {
        let query = RideQuery::default();
        let builder = build_list_query(&query);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM rides WHERE TRUE AND available = TRUE ORDER BY price_per_day ASC, model ASC"
        );
    }

    #[test]
    fn test_all_filters_sql() {
        let query = RideQuery {
            category: Some("SUV".to_string()),
            transmission: Some("Automatic".to_string()),
            fuel_type: Some("Electric".to_string()),
            location: Some("seattle".to_string()),
            price_range: Some(PriceRange { min: 50.into(), max: Some(100.into()) }),
            include_unavailable: true,
            sort: RideSortOrder::RatingDesc,
        };
        let builder = build_list_query(&query);
        assert_eq!(
            builder.sql(),
            "SELECT * FROM rides WHERE TRUE AND category = $1 AND transmission = $2 AND fuel_type = $3 \
             AND location ILIKE $4 AND price_per_day >= $5 AND price_per_day <= $6 \
             ORDER BY rating DESC, model ASC"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_off"), "100\\%\\_off");
    }
}
