use chrono::NaiveDate;

use crate::booking_types::{GatewayError, Site, SiteType};
use crate::reservation::{Reservation, ReservationRequest};

/// Looks up sites that are free for a stay
#[async_trait::async_trait]
pub trait AvailabilityGateway: Send + Sync {
    /// Sites of `site_type` free from `start_date` to `end_date`.
    /// An empty list means no availability and is not an error.
    async fn search(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        site_type: SiteType,
    ) -> Result<Vec<Site>, GatewayError>;
}

/// Creates reservations on the backend
#[async_trait::async_trait]
pub trait ReservationGateway: Send + Sync {
    /// Creates the reservation and returns what the backend stored
    async fn create(&self, request: &ReservationRequest) -> Result<Reservation, GatewayError>;
}
