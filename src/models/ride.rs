//! Modelo de Ride
//!
//! Este módulo contiene el struct Ride, los filtros del catálogo y las
//! variantes usadas para crear y actualizar vehículos.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Ride principal - mapea exactamente a la tabla rides
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: Uuid,
    pub model: String,
    pub category: String,
    pub image_url: String,
    pub price_per_day: Decimal,
    pub seats: i32,
    pub transmission: String,
    pub fuel_type: String,
    pub rating: Decimal,
    pub review_count: i32,
    pub available: bool,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos validados para insertar un vehículo
#[derive(Debug, Clone)]
pub struct NewRide {
    pub model: String,
    pub category: String,
    pub image_url: String,
    pub price_per_day: Decimal,
    pub seats: i32,
    pub transmission: String,
    pub fuel_type: String,
    pub rating: Decimal,
    pub review_count: i32,
    pub available: bool,
    pub location: String,
}

/// Cambios parciales; `None` deja la columna como está
#[derive(Debug, Clone, Default)]
pub struct RideChanges {
    pub model: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub price_per_day: Option<Decimal>,
    pub seats: Option<i32>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub rating: Option<Decimal>,
    pub review_count: Option<i32>,
    pub available: Option<bool>,
    pub location: Option<String>,
}

impl RideChanges {
    /// Aplicar los cambios sobre un vehículo en memoria
    pub fn apply_to(self, ride: &mut Ride, now: DateTime<Utc>) {
        if let Some(model) = self.model {
            ride.model = model;
        }
        if let Some(category) = self.category {
            ride.category = category;
        }
        if let Some(image_url) = self.image_url {
            ride.image_url = image_url;
        }
        if let Some(price) = self.price_per_day {
            ride.price_per_day = price;
        }
        if let Some(seats) = self.seats {
            ride.seats = seats;
        }
        if let Some(transmission) = self.transmission {
            ride.transmission = transmission;
        }
        if let Some(fuel_type) = self.fuel_type {
            ride.fuel_type = fuel_type;
        }
        if let Some(rating) = self.rating {
            ride.rating = rating;
        }
        if let Some(review_count) = self.review_count {
            ride.review_count = review_count;
        }
        if let Some(available) = self.available {
            ride.available = available;
        }
        if let Some(location) = self.location {
            ride.location = location;
        }
        ride.updated_at = now;
    }
}

/// Orden del listado del catálogo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RideSortOrder {
    #[default]
    PriceAsc,
    RatingDesc,
}

impl FromStr for RideSortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price_asc" | "price" => Ok(RideSortOrder::PriceAsc),
            "rating_desc" | "rating" => Ok(RideSortOrder::RatingDesc),
            other => Err(format!("unknown sort order '{}'", other)),
        }
    }
}

impl RideSortOrder {
    /// Comparador usado por el store en memoria; empata por modelo
    pub fn compare(&self, a: &Ride, b: &Ride) -> Ordering {
        let primary = match self {
            RideSortOrder::PriceAsc => a.price_per_day.cmp(&b.price_per_day),
            RideSortOrder::RatingDesc => b.rating.cmp(&a.rating),
        };
        primary.then_with(|| a.model.cmp(&b.model))
    }

    /// Cláusula ORDER BY equivalente
    pub fn sql(&self) -> &'static str {
        match self {
            RideSortOrder::PriceAsc => "price_per_day ASC, model ASC",
            RideSortOrder::RatingDesc => "rating DESC, model ASC",
        }
    }
}

/// Rango de precio por día: `"50-100"` (inclusivo) o `"200+"`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Option<Decimal>,
}

impl PriceRange {
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && self.max.map_or(true, |max| price <= max)
    }
}

impl FromStr for PriceRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parse = |raw: &str| {
            Decimal::from_str(raw.trim())
                .ok()
                .filter(|value| *value >= Decimal::ZERO)
                .ok_or_else(|| format!("invalid price '{}'", raw.trim()))
        };

        if let Some(min) = s.strip_suffix('+') {
            return Ok(Self { min: parse(min)?, max: None });
        }

        let (min, max) = s
            .split_once('-')
            .ok_or_else(|| format!("price range '{}' must look like '50-100' or '200+'", s))?;
        let (min, max) = (parse(min)?, parse(max)?);
        if max < min {
            return Err(format!("price range '{}' has max below min", s));
        }

        Ok(Self { min, max: Some(max) })
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}+", self.min),
        }
    }
}

/// Filtro ya resuelto que recibe el store
#[derive(Debug, Clone, Default)]
pub struct RideQuery {
    pub category: Option<String>,
    pub transmission: Option<String>,
    pub fuel_type: Option<String>,
    pub location: Option<String>,
    pub price_range: Option<PriceRange>,
    pub include_unavailable: bool,
    pub sort: RideSortOrder,
}

impl RideQuery {
    pub fn matches(&self, ride: &Ride) -> bool {
        if !self.include_unavailable && !ride.available {
            return false;
        }
        if let Some(category) = &self.category {
            if &ride.category != category {
                return false;
            }
        }
        if let Some(transmission) = &self.transmission {
            if &ride.transmission != transmission {
                return false;
            }
        }
        if let Some(fuel_type) = &self.fuel_type {
            if &ride.fuel_type != fuel_type {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !ride.location.to_lowercase().contains(&location.to_lowercase()) {
                return false;
            }
        }
        if let Some(range) = &self.price_range {
            if !range.contains(ride.price_per_day) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ride(model: &str, price: i64, rating: &str) -> Ride {
        let now = Utc::now();
        Ride {
            id: Uuid::new_v4(),
            model: model.to_string(),
            category: "SUV".to_string(),
            image_url: "https://img.test/car.png".to_string(),
            price_per_day: Decimal::from(price),
            seats: 5,
            transmission: "Automatic".to_string(),
            fuel_type: "Gasoline".to_string(),
            rating: rating.parse().unwrap(),
            review_count: 10,
            available: true,
            location: "Downtown Seattle".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_price_range_parsing() {
        let bounded: PriceRange = "50-100".parse().unwrap();
        assert!(bounded.contains(Decimal::from(50)));
        assert!(bounded.contains(Decimal::from(100)));
        assert!(!bounded.contains(Decimal::from(101)));

        let open: PriceRange = "200+".parse().unwrap();
        assert!(open.contains(Decimal::from(5000)));
        assert!(!open.contains(Decimal::from(199)));

        assert!("100-50".parse::<PriceRange>().is_err());
        assert!("cheap".parse::<PriceRange>().is_err());
        assert!("-5-10".parse::<PriceRange>().is_err());
        assert_eq!(open.to_string(), "200+");
    }

    #[test]
    fn test_query_location_is_case_insensitive() {
        let query = RideQuery {
            location: Some("seattle".to_string()),
            ..Default::default()
        };
        assert!(query.matches(&ride("Model Y", 80, "4.5")));

        let elsewhere = RideQuery {
            location: Some("Portland".to_string()),
            ..Default::default()
        };
        assert!(!elsewhere.matches(&ride("Model Y", 80, "4.5")));
    }

    #[test]
    fn test_query_hides_unavailable_unless_asked() {
        let mut hidden = ride("Civic", 40, "4.1");
        hidden.available = false;

        assert!(!RideQuery::default().matches(&hidden));
        let admin = RideQuery {
            include_unavailable: true,
            ..Default::default()
        };
        assert!(admin.matches(&hidden));
    }

    #[test]
    fn test_sort_orders() {
        let mut rides = vec![ride("B", 90, "4.9"), ride("A", 30, "4.0"), ride("C", 30, "4.5")];

        rides.sort_by(|a, b| RideSortOrder::PriceAsc.compare(a, b));
        let models: Vec<_> = rides.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(models, ["A", "C", "B"]);

        rides.sort_by(|a, b| RideSortOrder::RatingDesc.compare(a, b));
        let models: Vec<_> = rides.iter().map(|r| r.model.as_str()).collect();
        assert_eq!(models, ["B", "C", "A"]);
    }

    #[test]
    fn test_changes_bump_updated_at() {
        let mut target = ride("Civic", 40, "4.1");
        let later = target.updated_at + chrono::Duration::minutes(5);
        RideChanges {
            price_per_day: Some(Decimal::from(45)),
            ..Default::default()
        }
        .apply_to(&mut target, later);

        assert_eq!(target.price_per_day, Decimal::from(45));
        assert_eq!(target.model, "Civic");
        assert_eq!(target.updated_at, later);
    }
}
