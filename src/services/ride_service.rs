//! Servicio del catálogo de vehículos

use std::sync::Arc;

use tracing::info;
use validator::Validate;

use super::{parse_id, require_admin};
use crate::dto::ride_dto::{CreateRideRequest, RideFilters, UpdateRideRequest};
use crate::models::auth::AuthenticatedUser;
use crate::models::ride::{PriceRange, Ride, RideQuery, RideSortOrder};
use crate::repositories::RideStore;
use crate::utils::errors::{not_found_error, validation_error, AppResult};

/// Valores que la UI envía para "sin filtro"
const ANY_SENTINELS: [&str; 3] = ["all types", "any", "all"];

pub struct RideService {
    rides: Arc<dyn RideStore>,
    default_sort: RideSortOrder,
}

impl RideService {
    pub fn new(rides: Arc<dyn RideStore>, default_sort: RideSortOrder) -> Self {
        Self { rides, default_sort }
    }

    /// Listar el catálogo; los administradores ven también los no disponibles
    pub async fn list_rides(
        &self,
        filters: RideFilters,
        principal: Option<&AuthenticatedUser>,
    ) -> AppResult<Vec<Ride>> {
        let query = self.resolve_query(filters, principal.map_or(false, |p| p.is_admin))?;
        self.rides.list(&query).await
    }

    pub async fn get_ride(&self, id: &str) -> AppResult<Ride> {
        let ride_id = parse_id("Ride", id)?;
        self.rides
            .find_by_id(ride_id)
            .await?
            .ok_or_else(|| not_found_error("Ride", id))
    }

    pub async fn create_ride(
        &self,
        principal: &AuthenticatedUser,
        request: CreateRideRequest,
    ) -> AppResult<Ride> {
        require_admin(principal, "create ride")?;
        request.validate()?;

        let ride = self.rides.create(request.into_new_ride()).await?;
        info!("🚗 Vehículo creado: {} ({}) por {}", ride.id, ride.model, principal.user_id);
        Ok(ride)
    }

    pub async fn update_ride(
        &self,
        principal: &AuthenticatedUser,
        id: &str,
        request: UpdateRideRequest,
    ) -> AppResult<Ride> {
        require_admin(principal, "update ride")?;
        request.validate()?;
        let ride_id = parse_id("Ride", id)?;

        let ride = self
            .rides
            .update(ride_id, request.into())
            .await?
            .ok_or_else(|| not_found_error("Ride", id))?;
        info!("✏️ Vehículo actualizado: {} por {}", ride.id, principal.user_id);
        Ok(ride)
    }

    fn resolve_query(&self, filters: RideFilters, include_unavailable: bool) -> AppResult<RideQuery> {
        let price_range = match normalize_filter(filters.price_range) {
            Some(raw) => Some(
                raw.parse::<PriceRange>()
                    .map_err(|message| validation_error("price_range", message))?,
            ),
            None => None,
        };
        let sort = match normalize_filter(filters.sort) {
            Some(raw) => raw
                .parse::<RideSortOrder>()
                .map_err(|message| validation_error("sort", message))?,
            None => self.default_sort,
        };

        Ok(RideQuery {
            category: normalize_filter(filters.car_type),
            transmission: normalize_filter(filters.transmission),
            fuel_type: normalize_filter(filters.fuel_type),
            location: normalize_filter(filters.location),
            price_range,
            include_unavailable,
            sort,
        })
    }
}

/// Vacío o centinela → sin filtro
fn normalize_filter(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| !ANY_SENTINELS.iter().any(|s| v.eq_ignore_ascii_case(s)))
}
