use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::utils::validation::{parse_booking_date, validate_not_empty, validate_phone, DRIVER_AGE_RE};

// Request para crear una reserva. Cualquier `totalAmount` enviado por el
// cliente se ignora: el importe lo calcula el servidor.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "rideId is required"))]
    pub ride_id: String,

    #[serde(default)]
    #[validate(custom = "validate_booking_date")]
    pub pickup_date: String,

    #[serde(default)]
    #[validate(custom = "validate_booking_date")]
    pub return_date: String,

    #[serde(default)]
    #[validate(length(max = 255), custom = "validate_not_empty")]
    pub pickup_location: String,

    #[serde(default)]
    #[validate(regex(path = "DRIVER_AGE_RE", message = "must be one of 21-25, 26-35, 36-65, 65+"))]
    pub driver_age: String,

    #[serde(default)]
    #[validate(custom = "validate_phone")]
    pub phone_number: String,
}

fn validate_booking_date(value: &str) -> Result<(), ValidationError> {
    parse_booking_date(value).map(|_| ())
}
