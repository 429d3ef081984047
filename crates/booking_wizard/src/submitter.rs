use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::booking_types::{BookingSession, Confirmation, WizardError};
use crate::gateway::ReservationGateway;
use crate::pricing::PricingCalculator;
use crate::reservation::{CampsiteRef, CustomerPayload, ReservationRequest, ReservationStatus};
use crate::validation::{FieldValidator, validate_party_and_vehicle};

/// Prefix of the locally generated confirmation token
pub const DEFAULT_FALLBACK_PREFIX: &str = "RV";

/// Turns a completed session into a reservation on the backend
pub struct ReservationSubmitter {
    gateway: Arc<dyn ReservationGateway>,
    validator: Arc<dyn FieldValidator>,
    pricing: PricingCalculator,
    fallback_prefix: String,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl ReservationSubmitter {
    /// Creates a submitter
    pub fn new(
        gateway: Arc<dyn ReservationGateway>,
        validator: Arc<dyn FieldValidator>,
        pricing: PricingCalculator,
        fallback_prefix: Option<String>,
    ) -> Self {
        Self {
            gateway,
            validator,
            pricing,
            fallback_prefix: fallback_prefix.unwrap_or_else(|| DEFAULT_FALLBACK_PREFIX.to_string()),
        }
    }

    /// Re-checks party and vehicle rules, then assembles the request body
    pub fn build_request(&self, session: &BookingSession) -> Result<ReservationRequest, WizardError> {
        validate_party_and_vehicle(session, self.validator.as_ref())?;

        let site = session
            .selected_site
            .as_ref()
            .ok_or(WizardError::SiteNotSelected)?;
        let (start_date, end_date) = session
            .date_range
            .bounds()
            .ok_or(WizardError::IncompleteFields)?;
        let party_size = session
            .party_size
            .ok_or(WizardError::MissingPartyOrVehicle)?;
        let pricing = self
            .pricing
            .snapshot(session)
            .ok_or(WizardError::IncompleteFields)?;

        let customer = &session.customer;
        let emergency = &session.emergency_contact;
        let vehicle = &session.vehicle;
        let rv_length_feet = if site.site_type.requires_rv_length() {
            vehicle.rv_length_feet
        } else {
            None
        };

        Ok(ReservationRequest {
            customer: CustomerPayload {
                first_name: customer.first_name.trim().to_string(),
                last_name: customer.last_name.trim().to_string(),
                email: customer.email.trim().to_string(),
                phone: customer.phone.trim().to_string(),
                emergency_contact_name: emergency.name.trim().to_string(),
                emergency_contact_relationship: non_blank(&emergency.relationship),
                emergency_email: non_blank(&emergency.email),
                emergency_phone: emergency.phone.trim().to_string(),
            },
            campsite: CampsiteRef { id: site.id },
            start_date,
            end_date,
            party_size,
            party_members: session.party_member_names(),
            vehicle_license_plate: vehicle.license_plate.trim().to_uppercase(),
            vehicle_make: non_blank(&vehicle.make),
            vehicle_model: non_blank(&vehicle.model),
            rv_length_feet,
            notes: session.notes.trim().to_string(),
            status: ReservationStatus::Pending,
            campsite_total: pricing.site_subtotal,
            atv_total: pricing.add_on_subtotal,
            total_amount: pricing.total,
            paid_amount: 0.0,
        })
    }

    /// Validates, sends and interprets the backend answer
    pub async fn submit(&self, session: &BookingSession) -> Result<Confirmation, WizardError> {
        let request = self.build_request(session)?;
        debug!(
            site_id = request.campsite.id,
            total = request.total_amount,
            "Submitting reservation"
        );

        let reservation = self.gateway.create(&request).await.map_err(|e| {
            error!("Reservation submission failed: {}", e);
            WizardError::SubmissionFailed(e)
        })?;

        let start_date = reservation.start_date.unwrap_or(request.start_date);
        let confirmation = match non_blank(&reservation.confirmation_number) {
            Some(confirmation_number) => Confirmation {
                confirmation_number,
                start_date,
                degraded: false,
            },
            None => {
                let token = self.fallback_token();
                warn!(
                    "Backend returned no confirmation number, using local token {}",
                    token
                );
                Confirmation {
                    confirmation_number: token,
                    start_date,
                    degraded: true,
                }
            }
        };

        info!(
            "Reservation created with confirmation {}",
            confirmation.confirmation_number
        );
        Ok(confirmation)
    }

    fn fallback_token(&self) -> String {
        format!("{}{}", self.fallback_prefix, Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking_types::*;
    use crate::reservation::Reservation;
    use crate::validation::RegexFieldValidator;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct MockReservationGateway {
        response: Result<Reservation, GatewayError>,
        requests: Mutex<Vec<ReservationRequest>>,
    }

    impl MockReservationGateway {
        fn new(response: Result<Reservation, GatewayError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl ReservationGateway for MockReservationGateway {
        async fn create(&self, request: &ReservationRequest) -> Result<Reservation, GatewayError> {
            self.requests.lock().unwrap().push(request.clone());
            self.response.clone()
        }
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn reservation(confirmation_number: Option<&str>) -> Reservation {
        Reservation {
            id: Some(9),
            confirmation_number: confirmation_number.map(str::to_string),
            start_date: Some(june(1)),
            end_date: Some(june(4)),
            status: Some(ReservationStatus::Pending),
            total_amount: Some(300.0),
        }
    }

    fn complete_session() -> BookingSession {
        BookingSession {
            current_step: WizardStep::SummaryAndSubmit,
            date_range: DateRange::new(june(1), june(4)),
            site_type: Some(SiteType::FullHookup),
            selected_site: Some(Site {
                id: 7,
                site_number: 12,
                site_type: SiteType::FullHookup,
                location: None,
                daily_rate: 50.0,
                max_party_size: 15,
            }),
            customer: CustomerInfo {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: "555-123-4567".to_string(),
            },
            emergency_contact: EmergencyContact {
                name: "Charles Babbage".to_string(),
                relationship: Some("  ".to_string()),
                email: None,
                phone: "555-765-4321".to_string(),
            },
            party_size: Some(3),
            vehicle: VehicleInfo {
                license_plate: "abc-123".to_string(),
                make: Some("Winnebago".to_string()),
                model: None,
                rv_length_feet: Some(32),
            },
            add_ons: AddOnPasses {
                enabled: true,
                adults: 2,
                teens: 1,
                children: 0,
            },
            ..Default::default()
        }
    }

    fn submitter(gateway: Arc<MockReservationGateway>) -> ReservationSubmitter {
        ReservationSubmitter::new(
            gateway,
            Arc::new(RegexFieldValidator::with_today(june(1))),
            PricingCalculator::new(None),
            None,
        )
    }

    #[test]
    fn test_build_request_carries_pricing_and_defaults() {
        let gateway = Arc::new(MockReservationGateway::new(Ok(reservation(None))));
        let request = submitter(gateway).build_request(&complete_session()).unwrap();

        assert_eq!(request.campsite.id, 7);
        assert_eq!(request.party_members, vec!["Ada Lovelace"]);
        assert_eq!(request.vehicle_license_plate, "ABC-123");
        assert_eq!(request.rv_length_feet, Some(32));
        assert_eq!(request.customer.emergency_contact_relationship, None);
        assert_eq!(request.status, ReservationStatus::Pending);
        assert_eq!(request.campsite_total, 150.0);
        assert_eq!(request.atv_total, 150.0);
        assert_eq!(request.total_amount, 300.0);
        assert_eq!(request.paid_amount, 0.0);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["campsite"]["id"], 7);
        assert_eq!(json["customer"]["emergencyContactName"], "Charles Babbage");
        assert_eq!(json["startDate"], "2025-06-01");
        assert_eq!(json["status"], "PENDING");
    }

    #[tokio::test]
    async fn test_submit_rechecks_party_rules_before_sending() {
        let gateway = Arc::new(MockReservationGateway::new(Ok(reservation(Some("CG-1")))));
        let mut session = complete_session();
        session.site_type = Some(SiteType::Tent);
        session.party_size = Some(9);

        let result = submitter(gateway.clone()).submit(&session).await;

        assert_eq!(result, Err(WizardError::PartySizeExceeded { max: 8 }));
        assert!(gateway.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_uses_backend_confirmation() {
        let gateway = Arc::new(MockReservationGateway::new(Ok(reservation(Some("CG-1001")))));
        let confirmation = submitter(gateway.clone())
            .submit(&complete_session())
            .await
            .unwrap();

        assert_eq!(confirmation.confirmation_number, "CG-1001");
        assert_eq!(confirmation.start_date, june(1));
        assert!(!confirmation.degraded);
        assert_eq!(gateway.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_falls_back_to_local_token() {
        let gateway = Arc::new(MockReservationGateway::new(Ok(reservation(Some("")))));
        let confirmation = submitter(gateway).submit(&complete_session()).await.unwrap();

        assert!(confirmation.degraded);
        assert!(confirmation.confirmation_number.starts_with("RV"));
        assert!(
            confirmation.confirmation_number[2..]
                .chars()
                .all(|c| c.is_ascii_digit())
        );
    }

    #[tokio::test]
    async fn test_submit_maps_transport_failure() {
        let gateway = Arc::new(MockReservationGateway::new(Err(GatewayError::Network(
            "connection refused".to_string(),
        ))));
        let result = submitter(gateway).submit(&complete_session()).await;

        assert!(matches!(result, Err(WizardError::SubmissionFailed(_))));
    }
}
