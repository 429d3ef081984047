use booking_wizard::{
    AvailabilityGateway, GatewayError, Reservation, ReservationGateway, ReservationRequest, Site,
    SiteType,
};
use chrono::NaiveDate;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::client_config::ClientConfig;

/// Client for the campground reservation REST API
pub struct ReservationApiClient {
    client: Client,
    base_url: String,
}

impl ReservationApiClient {
    /// Create a new client, using the defaults when no config is given
    pub fn new(config: Option<ClientConfig>) -> Result<Self, GatewayError> {
        let config = config.unwrap_or_default();

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.normalized_base_url().to_string(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sites of one type free for the whole stay
    pub async fn get_available_campsites(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        site_type: SiteType,
    ) -> Result<Vec<Site>, GatewayError> {
        debug!(
            "Fetching available {} campsites from {} to {}",
            site_type, start_date, end_date
        );

        let url = format!("{}/campsites/available/dates", self.base_url);
        let params = [
            ("startDate", start_date.format("%Y-%m-%d").to_string()),
            ("endDate", end_date.format("%Y-%m-%d").to_string()),
            ("siteType", site_type.as_str().to_string()),
        ];

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| GatewayError::Network(format!("HTTP request failed: {}", e)))?;

        let sites: Vec<Site> = parse_json(check_status(response).await?).await?;
        debug!("Backend returned {} available campsites", sites.len());
        Ok(sites)
    }

    /// Creates a pending reservation
    pub async fn create_reservation(
        &self,
        request: &ReservationRequest,
    ) -> Result<Reservation, GatewayError> {
        debug!(
            "Creating reservation for campsite {} from {} to {}",
            request.campsite.id, request.start_date, request.end_date
        );

        let url = format!("{}/reservations", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(format!("Reservation request failed: {}", e)))?;

        parse_json(check_status(response).await?).await
    }
}

/// Maps a non-success status to a gateway error
pub fn error_for_status(status: StatusCode, body: &str) -> GatewayError {
    match status.as_u16() {
        429 => GatewayError::RateLimited,
        404 => GatewayError::NotFound,
        400 | 409 | 422 => {
            if body.trim().is_empty() {
                GatewayError::Rejected(format!("HTTP {}", status))
            } else {
                GatewayError::Rejected(body.trim().to_string())
            }
        }
        _ => GatewayError::Api(format!("HTTP {}", status)),
    }
}

async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    warn!("API request failed with status {}: {}", status, body);
    Err(error_for_status(status, &body))
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    response.json().await.map_err(|e| {
        error!("Failed to parse reservation API response: {}", e);
        GatewayError::DataFormat(format!("Failed to parse response: {}", e))
    })
}

#[async_trait::async_trait]
impl AvailabilityGateway for ReservationApiClient {
    async fn search(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        site_type: SiteType,
    ) -> Result<Vec<Site>, GatewayError> {
        self.get_available_campsites(start_date, end_date, site_type)
            .await
    }
}

#[async_trait::async_trait]
impl ReservationGateway for ReservationApiClient {
    async fn create(&self, request: &ReservationRequest) -> Result<Reservation, GatewayError> {
        self.create_reservation(request).await
    }
}
