//! Modelo de Booking
//!
//! Este módulo contiene la reserva, su máquina de estados y el cálculo
//! del importe que se fija en el momento de crearla.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use super::ride::Ride;
use super::user::User;

const SECONDS_PER_DAY: i64 = 86_400;

/// Estado de la reserva
///
/// `pending → confirmed | cancelled`, `confirmed → cancelled | completed`.
/// `cancelled` y `completed` son terminales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Error)]
#[error("unknown booking status '{0}'")]
pub struct UnknownStatus(pub String);

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Transiciones permitidas hacia adelante
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Cancelled)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }

    /// Estados desde los que se puede llegar a `next`
    pub fn sources_of(next: BookingStatus) -> Vec<BookingStatus> {
        [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ]
        .into_iter()
        .filter(|from| from.can_transition_to(next))
        .collect()
    }

    /// Estados que cuentan como ingreso en las analíticas
    pub fn counts_as_revenue(&self) -> bool {
        matches!(self, BookingStatus::Confirmed | BookingStatus::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl TryFrom<String> for BookingStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Booking - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: String,
    pub ride_id: Uuid,
    pub pickup_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub pickup_location: String,
    pub driver_age: String,
    pub phone_number: String,
    pub total_amount: Decimal,
    pub payment_intent_id: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Datos validados para insertar una reserva (siempre en `pending`)
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: String,
    pub ride_id: Uuid,
    pub pickup_date: DateTime<Utc>,
    pub return_date: DateTime<Utc>,
    pub pickup_location: String,
    pub driver_age: String,
    pub phone_number: String,
    pub total_amount: Decimal,
}

/// Reserva con el vehículo y el usuario asociados
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BookingWithDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub ride: Ride,
    pub user: User,
}

/// Agregados de reservas para el panel de administración
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BookingStats {
    pub total_bookings: i64,
    pub revenue: Decimal,
}

/// Días facturables: días iniciados entre recogida y devolución, mínimo 1
pub fn rental_days(pickup_date: DateTime<Utc>, return_date: DateTime<Utc>) -> i64 {
    let seconds = (return_date - pickup_date).num_seconds();
    let days = (seconds + SECONDS_PER_DAY - 1).div_euclid(SECONDS_PER_DAY);
    days.max(1)
}

/// Mayor importe que admite `bookings.total_amount` (NUMERIC(12, 2))
pub fn max_total_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

/// `(precio por día + seguro por día) × días`, redondeado a céntimos.
///
/// `None` si la operación desborda o el resultado no cabe en la columna.
pub fn calculate_total_amount(
    price_per_day: Decimal,
    insurance_per_day: Decimal,
    pickup_date: DateTime<Utc>,
    return_date: DateTime<Utc>,
) -> Option<Decimal> {
    let days = Decimal::from(rental_days(pickup_date, return_date));
    price_per_day
        .checked_add(insurance_per_day)?
        .checked_mul(days)
        .map(|total| total.round_dp(2))
        .filter(|total| *total <= max_total_amount())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_transition_graph() {
        use BookingStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));

        assert!(!Confirmed.can_transition_to(Pending));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Pending));

        assert_eq!(BookingStatus::sources_of(Cancelled), vec![Pending, Confirmed]);
        assert_eq!(BookingStatus::sources_of(Confirmed), vec![Pending]);
    }

    #[test]
    fn test_status_text_roundtrip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert_eq!(BookingStatus::try_from(status.as_str().to_string()).unwrap(), status);
        }
        assert!("refunded".parse::<BookingStatus>().is_err());
        assert_eq!(serde_json::to_string(&BookingStatus::Confirmed).unwrap(), "\"confirmed\"");
    }

    #[test]
    fn test_rental_days_rounds_up_partial_days() {
        assert_eq!(rental_days(at(2025, 1, 10, 0), at(2025, 1, 12, 0)), 2);
        assert_eq!(rental_days(at(2025, 1, 10, 9), at(2025, 1, 12, 10)), 3);
        assert_eq!(rental_days(at(2025, 1, 10, 9), at(2025, 1, 10, 15)), 1);
        let pickup = at(2025, 1, 10, 0);
        assert_eq!(rental_days(pickup, pickup + Duration::seconds(1)), 1);
    }

    #[test]
    fn test_total_amount_two_days() {
        let total = calculate_total_amount(
            Decimal::from(50),
            Decimal::from(15),
            at(2025, 1, 10, 0),
            at(2025, 1, 12, 0),
        );
        assert_eq!(total, Some(Decimal::from(130)));
    }

    #[test]
    fn test_total_amount_keeps_cents() {
        let total = calculate_total_amount(
            Decimal::new(4999, 2),
            Decimal::from(15),
            at(2025, 3, 1, 0),
            at(2025, 3, 4, 0),
        );
        assert_eq!(total, Some(Decimal::new(19497, 2)));
    }

    #[test]
    fn test_total_amount_overflow_is_none() {
        let pickup = at(2025, 1, 10, 0);
        assert_eq!(
            calculate_total_amount(Decimal::MAX, Decimal::from(15), pickup, at(2025, 1, 12, 0)),
            None
        );
        assert_eq!(
            calculate_total_amount(
                Decimal::from_str("50000000000000000000000000000").unwrap(),
                Decimal::from(15),
                pickup,
                at(2025, 1, 12, 0)
            ),
            None
        );

        // Cabe en la aritmética pero no en la columna
        let far = Utc.with_ymd_and_hms(9000, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            calculate_total_amount(Decimal::new(9_999_999_999, 2), Decimal::from(15), pickup, far),
            None
        );
    }
}
