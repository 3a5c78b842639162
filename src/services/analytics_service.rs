use std::sync::Arc;

use tracing::debug;

use super::require_admin;
use crate::models::analytics::AnalyticsSummary;
use crate::models::auth::AuthenticatedUser;
use crate::repositories::{BookingStore, RideStore, UserStore};
use crate::utils::errors::AppResult;

pub struct AnalyticsService {
    bookings: Arc<dyn BookingStore>,
    rides: Arc<dyn RideStore>,
    users: Arc<dyn UserStore>,
}

impl AnalyticsService {
    pub fn new(
        bookings: Arc<dyn BookingStore>,
        rides: Arc<dyn RideStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self { bookings, rides, users }
    }

    pub async fn get_analytics(&self, principal: &AuthenticatedUser) -> AppResult<AnalyticsSummary> {
        require_admin(principal, "read analytics")?;

        let (stats, active_rides, total_users) = tokio::try_join!(
            self.bookings.stats(),
            self.rides.count_available(),
            self.users.count(),
        )?;

        debug!("📊 Analytics: {} reservas, ingresos {}", stats.total_bookings, stats.revenue);
        Ok(AnalyticsSummary {
            total_bookings: stats.total_bookings,
            total_revenue: stats.revenue,
            active_rides,
            total_users,
        })
    }
}
