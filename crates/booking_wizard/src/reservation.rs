use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Lifecycle of a reservation on the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    /// Created, deposit not yet paid
    Pending,
    /// Paid, guest must visit the office before parking
    Confirmed,
    /// Guest on site
    CheckedIn,
    /// Stay finished
    Completed,
    /// Cancelled
    Cancelled,
}

/// Guest and emergency contact as the backend expects them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    /// Guest first name
    pub first_name: String,
    /// Guest last name
    pub last_name: String,
    /// Guest email
    pub email: String,
    /// Guest phone
    pub phone: String,
    /// Emergency contact name
    pub emergency_contact_name: String,
    /// Emergency contact relationship
    pub emergency_contact_relationship: Option<String>,
    /// Emergency contact email
    pub emergency_email: Option<String>,
    /// Emergency contact phone
    pub emergency_phone: String,
}

/// Reference to the booked site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CampsiteRef {
    /// Backend site identifier
    pub id: i64,
}

/// Body of the reservation creation call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// Guest and emergency contact
    pub customer: CustomerPayload,
    /// Booked site
    pub campsite: CampsiteRef,
    /// Check-in date
    pub start_date: NaiveDate,
    /// Check-out date
    pub end_date: NaiveDate,
    /// Number of people staying
    pub party_size: u32,
    /// Names of everyone in the party, never empty
    pub party_members: Vec<String>,
    /// Licence plate
    pub vehicle_license_plate: String,
    /// Vehicle make
    pub vehicle_make: Option<String>,
    /// Vehicle model
    pub vehicle_model: Option<String>,
    /// RV length, only for sites that need it
    pub rv_length_feet: Option<u32>,
    /// Notes for the office
    pub notes: String,
    /// Always pending at creation
    pub status: ReservationStatus,
    /// Nights times the site rate
    pub campsite_total: f64,
    /// Add-on pass charges
    pub atv_total: f64,
    /// Site plus add-ons
    pub total_amount: f64,
    /// Nothing is paid at booking time
    pub paid_amount: f64,
}

/// Reservation as returned by the backend
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    /// Backend identifier
    #[serde(default)]
    pub id: Option<i64>,
    /// Confirmation number, may be missing on older backends
    #[serde(default)]
    pub confirmation_number: Option<String>,
    /// First night of the stay
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Check-out date
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Backend status
    #[serde(default)]
    pub status: Option<ReservationStatus>,
    /// Total the backend computed
    #[serde(default)]
    pub total_amount: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reservation_parses_partial_response() {
        let reservation: Reservation = serde_json::from_str(
            r#"{"id":42,"confirmationNumber":"CG-1001","startDate":"2025-06-01","status":"PENDING","customer":{"id":3}}"#,
        )
        .unwrap();

        assert_eq!(reservation.confirmation_number.as_deref(), Some("CG-1001"));
        assert_eq!(reservation.status, Some(ReservationStatus::Pending));
        assert_eq!(reservation.end_date, None);
    }
}
