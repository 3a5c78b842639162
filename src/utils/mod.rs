//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación,
//! JWT, extracción de cuerpos JSON y el reloj inyectable.

pub mod clock;
pub mod errors;
pub mod extract;
pub mod jwt;
pub mod validation;
