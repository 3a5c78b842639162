pub mod booking_dto;
pub mod payment_dto;
pub mod ride_dto;
