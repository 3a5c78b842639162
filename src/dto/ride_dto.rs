use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::models::ride::{NewRide, RideChanges};
use crate::utils::validation::{validate_not_empty, validate_price, validate_rating};

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    #[serde(default)]
    #[validate(length(max = 100), custom = "validate_not_empty")]
    pub model: String,

    #[serde(default)]
    #[validate(length(max = 50), custom = "validate_not_empty")]
    pub category: String,

    #[serde(default)]
    #[validate(length(max = 2048), custom = "validate_not_empty")]
    pub image_url: String,

    #[validate(required, custom = "validate_price")]
    pub price_per_day: Option<Decimal>,

    #[validate(required, range(min = 1, max = 60))]
    pub seats: Option<i32>,

    #[serde(default)]
    #[validate(length(max = 50), custom = "validate_not_empty")]
    pub transmission: String,

    #[serde(default)]
    #[validate(length(max = 50), custom = "validate_not_empty")]
    pub fuel_type: String,

    #[validate(custom = "validate_rating")]
    pub rating: Option<Decimal>,

    #[validate(range(min = 0))]
    pub review_count: Option<i32>,

    pub available: Option<bool>,

    #[serde(default)]
    #[validate(length(max = 255), custom = "validate_not_empty")]
    pub location: String,
}

impl CreateRideRequest {
    /// Sólo tras `validate()`: los campos requeridos ya están presentes
    pub fn into_new_ride(self) -> NewRide {
        NewRide {
            model: self.model.trim().to_string(),
            category: self.category.trim().to_string(),
            image_url: self.image_url.trim().to_string(),
            price_per_day: self.price_per_day.unwrap_or_default(),
            seats: self.seats.unwrap_or_default(),
            transmission: self.transmission.trim().to_string(),
            fuel_type: self.fuel_type.trim().to_string(),
            rating: self.rating.unwrap_or_default(),
            review_count: self.review_count.unwrap_or_default(),
            available: self.available.unwrap_or(true),
            location: self.location.trim().to_string(),
        }
    }
}

// Request para actualizar un vehículo (parcial)
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRideRequest {
    #[validate(length(max = 100), custom = "validate_not_empty")]
    pub model: Option<String>,

    #[validate(length(max = 50), custom = "validate_not_empty")]
    pub category: Option<String>,

    #[validate(length(max = 2048), custom = "validate_not_empty")]
    pub image_url: Option<String>,

    #[validate(custom = "validate_price")]
    pub price_per_day: Option<Decimal>,

    #[validate(range(min = 1, max = 60))]
    pub seats: Option<i32>,

    #[validate(length(max = 50), custom = "validate_not_empty")]
    pub transmission: Option<String>,

    #[validate(length(max = 50), custom = "validate_not_empty")]
    pub fuel_type: Option<String>,

    #[validate(custom = "validate_rating")]
    pub rating: Option<Decimal>,

    #[validate(range(min = 0))]
    pub review_count: Option<i32>,

    pub available: Option<bool>,

    #[validate(length(max = 255), custom = "validate_not_empty")]
    pub location: Option<String>,
}

impl From<UpdateRideRequest> for RideChanges {
    fn from(request: UpdateRideRequest) -> Self {
        let trimmed = |value: Option<String>| value.map(|v| v.trim().to_string());
        Self {
            model: trimmed(request.model),
            category: trimmed(request.category),
            image_url: trimmed(request.image_url),
            price_per_day: request.price_per_day,
            seats: request.seats,
            transmission: trimmed(request.transmission),
            fuel_type: trimmed(request.fuel_type),
            rating: request.rating,
            review_count: request.review_count,
            available: request.available,
            location: trimmed(request.location),
        }
    }
}

/// Parámetros de búsqueda del catálogo (`?carType=SUV&priceRange=50-100`)
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideFilters {
    pub car_type: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub location: Option<String>,
    pub price_range: Option<String>,
    pub sort: Option<String>,
}
