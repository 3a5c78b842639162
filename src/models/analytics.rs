//! Modelos de Analytics
//!
//! Resumen de solo lectura para el panel de administración.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Resumen para dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_bookings: i64,
    /// Suma de reservas confirmadas y completadas
    pub total_revenue: Decimal,
    pub active_rides: i64,
    pub total_users: i64,
}
