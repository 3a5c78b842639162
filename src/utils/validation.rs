//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

lazy_static! {
    /// Rangos de edad del conductor ofrecidos por el formulario de reserva
    pub static ref DRIVER_AGE_RE: Regex = Regex::new(r"^(21-25|26-35|36-65|65\+)$").unwrap();

    /// Dígitos, espacios, guiones, puntos, paréntesis y un `+` inicial opcional
    pub static ref PHONE_RE: Regex = Regex::new(r"^\+?[0-9 ().-]+$").unwrap();
}

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar y convertir string a datetime
pub fn validate_datetime(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            let mut error = ValidationError::new("datetime");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"RFC3339".to_string());
            error
        })
}

/// Fecha de reserva: RFC 3339 completo o `YYYY-MM-DD` (medianoche UTC)
pub fn parse_booking_date(value: &str) -> Result<DateTime<Utc>, ValidationError> {
    let value = value.trim();
    if let Ok(datetime) = validate_datetime(value) {
        return Ok(datetime);
    }

    validate_date(value)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| {
            let mut error = ValidationError::new("date");
            error.add_param("value".into(), &value.to_string());
            error.add_param("format".into(), &"RFC3339 or YYYY-MM-DD".to_string());
            error.message = Some("must be an RFC 3339 timestamp or a YYYY-MM-DD date".into());
            error
        })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.message = Some("must not be empty".into());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let clean_phone = value.chars().filter(|c| c.is_ascii_digit()).collect::<String>();
    if !PHONE_RE.is_match(value) || clean_phone.len() < 10 || clean_phone.len() > 15 {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        error.message = Some("must contain between 10 and 15 digits".into());
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Mayor precio por día que admite `rides.price_per_day` (NUMERIC(10, 2))
pub fn max_price_per_day() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Como mucho dos decimales; `49.990` cuenta como `49.99`
fn has_cents_precision(value: &Decimal) -> bool {
    value.normalize().scale() <= 2
}

/// Precio por día de un vehículo
pub fn validate_price(value: &Decimal) -> Result<(), ValidationError> {
    validate_non_negative(*value).map_err(|mut error| {
        error.message = Some("must be a non-negative amount".into());
        error
    })?;

    if *value > max_price_per_day() || !has_cents_precision(value) {
        let mut error = ValidationError::new("price");
        error.add_param("max".into(), &max_price_per_day());
        error.add_param("actual".into(), value);
        error.message = Some("must not exceed 99999999.99 nor have more than two decimals".into());
        return Err(error);
    }
    Ok(())
}

/// Valoración media, entre 0 y 5 con dos decimales como mucho
pub fn validate_rating(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > Decimal::from(5) || !has_cents_precision(value) {
        let mut error = ValidationError::new("range");
        error.add_param("min".into(), &0);
        error.add_param("max".into(), &5);
        error.add_param("actual".into(), value);
        return Err(error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn test_parse_booking_date_accepts_both_formats() {
        let plain = parse_booking_date("2025-01-10").unwrap();
        assert_eq!((plain.year(), plain.month(), plain.day()), (2025, 1, 10));
        assert_eq!(plain.hour(), 0);

        let full = parse_booking_date("2025-01-10T09:30:00Z").unwrap();
        assert_eq!(full.hour(), 9);
        assert_eq!(full.minute(), 30);

        assert!(parse_booking_date("10/01/2025").is_err());
        assert!(parse_booking_date("").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("1234567890").is_ok());
        assert!(validate_phone("+1 (555) 123-4567").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        assert!(validate_phone("555-CALL-NOW-1").is_err());
    }

    #[test]
    fn test_driver_age_brackets() {
        for bracket in ["21-25", "26-35", "36-65", "65+"] {
            assert!(DRIVER_AGE_RE.is_match(bracket), "{}", bracket);
        }
        assert!(!DRIVER_AGE_RE.is_match("18-20"));
        assert!(!DRIVER_AGE_RE.is_match("65"));
    }

    #[test]
    fn test_validate_price_and_rating() {
        assert!(validate_price(&dec("0")).is_ok());
        assert!(validate_price(&dec("49.99")).is_ok());
        assert!(validate_price(&dec("-1")).is_err());

        assert!(validate_rating(&dec("4.8")).is_ok());
        assert!(validate_rating(&dec("5.01")).is_err());
        assert!(validate_rating(&dec("4.567")).is_err());
    }

    #[test]
    fn test_validate_price_fits_column() {
        assert!(validate_price(&dec("99999999.99")).is_ok());
        assert!(validate_price(&dec("49.990")).is_ok());
        assert!(validate_price(&dec("100000000")).is_err());
        assert!(validate_price(&dec("50000000000000000000000000000")).is_err());
        assert!(validate_price(&dec("49.999")).is_err());
    }

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("Downtown").is_ok());
        assert!(validate_not_empty("   ").is_err());
    }
}
