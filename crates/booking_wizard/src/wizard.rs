use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::{Validate, ValidationErrors};

use crate::booking_types::*;
use crate::gateway::{AvailabilityGateway, ReservationGateway};
use crate::notification::NotificationSink;
use crate::pricing::{PricingCalculator, PricingRates, PricingSnapshot};
use crate::site_pager::{AvailabilityView, DEFAULT_PAGE_SIZE};
use crate::submitter::{DEFAULT_FALLBACK_PREFIX, ReservationSubmitter};
use crate::validation::{FieldValidator, validate_dates_and_type, validate_step};

/// Tunables of the booking wizard
#[derive(Debug, Clone, PartialEq)]
pub struct WizardConfig {
    /// Sites per page on step 2
    pub page_size: usize,
    /// Add-on and deposit rates
    pub pricing: PricingRates,
    /// Prefix of the local confirmation token used when the backend sends none
    pub fallback_confirmation_prefix: String,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pricing: PricingRates::default(),
            fallback_confirmation_prefix: DEFAULT_FALLBACK_PREFIX.to_string(),
        }
    }
}

/// Party details entered on step 4
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PartyDetails {
    /// Number of people staying
    pub party_size: Option<u32>,
    /// One name per line
    #[serde(default)]
    #[validate(length(max = 2000, message = "Party members must not exceed 2000 characters"))]
    pub party_members: String,
}

/// Free text for the campground office
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct BookingNotes {
    /// Notes text
    #[validate(length(max = 1000, message = "Notes must not exceed 1000 characters"))]
    pub notes: String,
}

/// Everything a UI adapter can ask the wizard to do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum WizardCommand {
    /// Sets check-in and check-out (step 1)
    SetDates {
        /// Check-in
        start_date: Option<NaiveDate>,
        /// Check-out
        end_date: Option<NaiveDate>,
    },
    /// Chooses the site type (step 1)
    SelectSiteType {
        /// Chosen type
        site_type: SiteType,
    },
    /// Runs the availability search and moves to step 2
    StartSearch,
    /// Restricts the results to one location, `None` for all (step 2)
    SetLocationFilter {
        /// Location to keep
        location: Option<SiteLocation>,
    },
    /// Jumps to a results page (step 2)
    GotoPage {
        /// 1-based page
        page: usize,
    },
    /// Next results page (step 2)
    NextPage,
    /// Previous results page (step 2)
    PrevPage,
    /// Picks a site from the results (step 2)
    SelectSite {
        /// Site identifier
        site_id: i64,
    },
    /// Replaces the guest contact details
    UpdateCustomer(CustomerInfo),
    /// Replaces the emergency contact
    UpdateEmergencyContact(EmergencyContact),
    /// Replaces party size and members
    UpdateParty(PartyDetails),
    /// Replaces the vehicle details
    UpdateVehicle(VehicleInfo),
    /// Replaces the add-on passes
    UpdateAddOns(AddOnPasses),
    /// Replaces the notes
    UpdateNotes(BookingNotes),
    /// Moves to another step
    GoToStep {
        /// Target step
        step: WizardStep,
    },
    /// Submits the reservation (step 5)
    Submit,
}

impl WizardCommand {
    /// Length limits on free-text payloads
    pub fn validate_input(&self) -> Result<(), ValidationErrors> {
        match self {
            WizardCommand::UpdateCustomer(customer) => customer.validate(),
            WizardCommand::UpdateEmergencyContact(contact) => contact.validate(),
            WizardCommand::UpdateParty(party) => party.validate(),
            WizardCommand::UpdateVehicle(vehicle) => vehicle.validate(),
            WizardCommand::UpdateAddOns(add_ons) => add_ons.validate(),
            WizardCommand::UpdateNotes(notes) => notes.validate(),
            _ => Ok(()),
        }
    }
}

/// Owns one booking attempt and moves it through the five steps
pub struct WizardStateMachine {
    session: BookingSession,
    status: WizardStatus,
    availability: Option<AvailabilityView>,
    field_errors: Vec<Field>,
    availability_gateway: Arc<dyn AvailabilityGateway>,
    submitter: ReservationSubmitter,
    validator: Arc<dyn FieldValidator>,
    notifier: Arc<dyn NotificationSink>,
    pricing: PricingCalculator,
    config: WizardConfig,
}

impl WizardStateMachine {
    /// Opens a new booking attempt on step 1
    pub fn new(
        availability_gateway: Arc<dyn AvailabilityGateway>,
        reservation_gateway: Arc<dyn ReservationGateway>,
        validator: Arc<dyn FieldValidator>,
        notifier: Arc<dyn NotificationSink>,
        config: Option<WizardConfig>,
    ) -> Self {
        let config = config.unwrap_or_default();
        let pricing = PricingCalculator::new(Some(config.pricing));
        let submitter = ReservationSubmitter::new(
            reservation_gateway,
            validator.clone(),
            pricing,
            Some(config.fallback_confirmation_prefix.clone()),
        );

        Self {
            session: BookingSession::default(),
            status: WizardStatus::InProgress,
            availability: None,
            field_errors: Vec::new(),
            availability_gateway,
            submitter,
            validator,
            notifier,
            pricing,
            config,
        }
    }

    /// Data entered so far
    pub fn session(&self) -> &BookingSession {
        &self.session
    }

    /// Overall outcome of the attempt
    pub fn status(&self) -> &WizardStatus {
        &self.status
    }

    /// Step the guest is on
    pub fn current_step(&self) -> WizardStep {
        self.session.current_step
    }

    /// Results of the latest availability search
    pub fn availability(&self) -> Option<&AvailabilityView> {
        self.availability.as_ref()
    }

    /// Fields marked invalid by the last step 3 check
    pub fn field_errors(&self) -> &[Field] {
        &self.field_errors
    }

    /// Current price of the stay, once a site is selected
    pub fn pricing(&self) -> Option<PricingSnapshot> {
        self.pricing.snapshot(&self.session)
    }

    /// Party size cap for the chosen site type
    pub fn max_party_size(&self) -> u32 {
        self.session.max_party_size()
    }

    /// Runs one command
    pub async fn dispatch(&mut self, command: WizardCommand) -> Result<(), WizardError> {
        debug!(?command, step = %self.session.current_step, "Dispatching wizard command");

        match command {
            WizardCommand::SetDates {
                start_date,
                end_date,
            } => self.set_dates(start_date, end_date),
            WizardCommand::SelectSiteType { site_type } => self.select_site_type(site_type),
            WizardCommand::StartSearch => self.start_search().await,
            WizardCommand::SetLocationFilter { location } => self.set_location_filter(location),
            WizardCommand::GotoPage { page } => self.goto_page(page).map(|_| ()),
            WizardCommand::NextPage => self.next_page().map(|_| ()),
            WizardCommand::PrevPage => self.prev_page().map(|_| ()),
            WizardCommand::SelectSite { site_id } => self.select_site(site_id),
            WizardCommand::UpdateCustomer(customer) => self.update_customer(customer),
            WizardCommand::UpdateEmergencyContact(contact) => {
                self.update_emergency_contact(contact)
            }
            WizardCommand::UpdateParty(party) => self.update_party(party),
            WizardCommand::UpdateVehicle(vehicle) => self.update_vehicle(vehicle),
            WizardCommand::UpdateAddOns(add_ons) => self.update_add_ons(add_ons),
            WizardCommand::UpdateNotes(notes) => self.update_notes(notes),
            WizardCommand::GoToStep { step } => self.go_to_step(step).await,
            WizardCommand::Submit => self.submit().await,
        }
    }

    /// Sets the requested stay
    pub fn set_dates(
        &mut self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.require_step(WizardStep::DatesAndType)?;
        self.session.date_range = DateRange {
            start_date,
            end_date,
        };
        Ok(())
    }

    /// Chooses the site type. Types without RV hookups drop any RV length.
    pub fn select_site_type(&mut self, site_type: SiteType) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.require_step(WizardStep::DatesAndType)?;
        self.session.site_type = Some(site_type);
        if !site_type.requires_rv_length() {
            self.session.vehicle.rv_length_feet = None;
        }
        debug!(
            %site_type,
            max_party_size = site_type.max_party_size(),
            "Site type selected"
        );
        Ok(())
    }

    /// Validates step 1, searches availability and moves to step 2 on results
    pub async fn start_search(&mut self) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.require_step(WizardStep::DatesAndType)?;

        let (start_date, end_date, site_type) =
            match validate_dates_and_type(&self.session, self.validator.as_ref()) {
                Ok(search) => search,
                Err(e) => return self.refuse(e),
            };

        info!(
            "Checking availability for {} sites from {} to {}",
            site_type, start_date, end_date
        );

        let sites = match self
            .availability_gateway
            .search(start_date, end_date, site_type)
            .await
        {
            Ok(sites) => sites,
            Err(e) => return self.refuse(WizardError::SearchFailed(e)),
        };

        if sites.is_empty() {
            return self.refuse(WizardError::NoSitesAvailable);
        }

        let found = sites.len();
        self.availability = Some(AvailabilityView::new(
            sites,
            site_type,
            self.config.page_size,
        ));
        self.session.selected_site = None;
        self.move_to(WizardStep::SiteSelection);
        self.notifier.success(&format!(
            "Found {} available {} sites!",
            found,
            site_type.label()
        ));
        Ok(())
    }

    /// Restricts the results to one location and returns to page 1
    pub fn set_location_filter(
        &mut self,
        location: Option<SiteLocation>,
    ) -> Result<(), WizardError> {
        let result = self
            .active_view()
            .and_then(|view| view.set_location_filter(location));
        result.or_else(|e| self.refuse(e))
    }

    /// Jumps to a results page, clamped into range
    pub fn goto_page(&mut self, page: usize) -> Result<usize, WizardError> {
        let result = self.active_view().map(|view| view.goto_page(page));
        result.or_else(|e| self.refuse(e))
    }

    /// Next results page
    pub fn next_page(&mut self) -> Result<usize, WizardError> {
        let result = self.active_view().map(|view| view.next_page());
        result.or_else(|e| self.refuse(e))
    }

    /// Previous results page
    pub fn prev_page(&mut self) -> Result<usize, WizardError> {
        let result = self.active_view().map(|view| view.prev_page());
        result.or_else(|e| self.refuse(e))
    }

    /// Picks a site from the latest results. Picking the same site again only re-confirms it.
    pub fn select_site(&mut self, site_id: i64) -> Result<(), WizardError> {
        let site = self.active_view().and_then(|view| {
            view.find(site_id)
                .cloned()
                .ok_or(WizardError::UnknownSite(site_id))
        });
        let site = match site {
            Ok(site) => site,
            Err(e) => return self.refuse(e),
        };

        let message = format!("Selected {}", site.display_name());
        debug!(site_id, "Site selected");
        self.session.selected_site = Some(site);
        self.notifier.success(&message);
        Ok(())
    }

    /// Replaces the guest contact details
    pub fn update_customer(&mut self, customer: CustomerInfo) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.session.customer = customer;
        self.field_errors.clear();
        Ok(())
    }

    /// Replaces the emergency contact
    pub fn update_emergency_contact(
        &mut self,
        contact: EmergencyContact,
    ) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.session.emergency_contact = contact;
        self.field_errors.clear();
        Ok(())
    }

    /// Replaces party size and member list
    pub fn update_party(&mut self, party: PartyDetails) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.session.party_size = party.party_size;
        self.session.party_members = party.party_members;
        Ok(())
    }

    /// Replaces the vehicle details. RV length is dropped for types without hookups.
    pub fn update_vehicle(&mut self, mut vehicle: VehicleInfo) -> Result<(), WizardError> {
        self.ensure_open()?;
        if !self
            .session
            .site_type
            .is_some_and(|site_type| site_type.requires_rv_length())
        {
            vehicle.rv_length_feet = None;
        }
        self.session.vehicle = vehicle;
        Ok(())
    }

    /// Replaces the add-on passes. Disabled passes reset every count.
    pub fn update_add_ons(&mut self, add_ons: AddOnPasses) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.session.add_ons = add_ons.normalized();
        Ok(())
    }

    /// Replaces the notes
    pub fn update_notes(&mut self, notes: BookingNotes) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.session.notes = notes.notes;
        Ok(())
    }

    /// Moves backward freely. Moving forward validates the current step first;
    /// leaving step 1 runs the availability search and lands on step 2.
    pub async fn go_to_step(&mut self, target: WizardStep) -> Result<(), WizardError> {
        self.ensure_open()?;
        let current = self.session.current_step;

        if target <= current {
            if self.status == WizardStatus::Failed {
                self.status = WizardStatus::InProgress;
            }
            self.field_errors.clear();
            self.move_to(target);
            return Ok(());
        }

        if current == WizardStep::DatesAndType {
            return self.start_search().await;
        }

        if let Err(e) = validate_step(current, &self.session, self.validator.as_ref()) {
            if let WizardError::InvalidFields(fields) = &e {
                self.field_errors = fields.clone();
            }
            return self.refuse(e);
        }

        self.field_errors.clear();
        self.move_to(target);

        if target == WizardStep::SummaryAndSubmit {
            if let Some(pricing) = self.pricing() {
                info!(
                    nights = pricing.nights,
                    total = pricing.total,
                    deposit = pricing.deposit,
                    "Booking summary priced"
                );
            }
        }
        Ok(())
    }

    /// Submits the reservation from step 5. A transport failure leaves the
    /// session intact on step 5 so the guest can retry.
    pub async fn submit(&mut self) -> Result<(), WizardError> {
        self.ensure_open()?;
        self.require_step(WizardStep::SummaryAndSubmit)?;

        match self.submitter.submit(&self.session).await {
            Ok(confirmation) => {
                self.status = WizardStatus::Submitted { confirmation };
                self.notifier
                    .success("Booking completed successfully! Confirmation email sent.");
                Ok(())
            }
            Err(e) => {
                if !e.is_validation() {
                    self.status = WizardStatus::Failed;
                }
                self.refuse(e)
            }
        }
    }

    fn active_view(&mut self) -> Result<&mut AvailabilityView, WizardError> {
        if matches!(self.status, WizardStatus::Submitted { .. }) {
            return Err(WizardError::AlreadySubmitted);
        }
        let actual = self.session.current_step;
        if actual != WizardStep::SiteSelection {
            return Err(WizardError::WrongStep {
                expected: WizardStep::SiteSelection,
                actual,
            });
        }
        self.availability
            .as_mut()
            .ok_or(WizardError::NoActiveSearch)
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if matches!(self.status, WizardStatus::Submitted { .. }) {
            return self.refuse(WizardError::AlreadySubmitted);
        }
        Ok(())
    }

    fn require_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        let actual = self.session.current_step;
        if actual != expected {
            return self.refuse(WizardError::WrongStep { expected, actual });
        }
        Ok(())
    }

    fn move_to(&mut self, target: WizardStep) {
        let from = self.session.current_step;
        self.session.current_step = target;
        info!(%from, to = %target, "Wizard step changed");
    }

    fn refuse<T>(&self, error: WizardError) -> Result<T, WizardError> {
        debug!(?error, "Wizard refused command");
        self.notifier.notify(error.level(), &error.to_string());
        Err(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::CollectingNotificationSink;
    use crate::reservation::{Reservation, ReservationRequest, ReservationStatus};
    use crate::validation::RegexFieldValidator;
    use std::sync::Mutex;

    struct MockAvailabilityGateway {
        sites: Vec<Site>,
        fail: bool,
        calls: Mutex<Vec<(NaiveDate, NaiveDate, SiteType)>>,
    }

    impl MockAvailabilityGateway {
        fn with_sites(sites: Vec<Site>) -> Self {
            Self {
                sites,
                fail: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                sites: Vec::new(),
                fail: true,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl AvailabilityGateway for MockAvailabilityGateway {
        async fn search(
            &self,
            start_date: NaiveDate,
            end_date: NaiveDate,
            site_type: SiteType,
        ) -> Result<Vec<Site>, GatewayError> {
            self.calls
                .lock()
                .unwrap()
                .push((start_date, end_date, site_type));
            if self.fail {
                return Err(GatewayError::Network("connection reset".to_string()));
            }
            Ok(self
                .sites
                .iter()
                .filter(|site| site.site_type == site_type)
                .cloned()
                .collect())
        }
    }

    struct MockReservationGateway {
        fail: bool,
        confirmation_number: Option<String>,
        calls: Mutex<usize>,
    }

    impl MockReservationGateway {
        fn confirming(confirmation_number: Option<&str>) -> Self {
            Self {
                fail: false,
                confirmation_number: confirmation_number.map(str::to_string),
                calls: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::confirming(None)
            }
        }
    }

    #[async_trait::async_trait]
    impl ReservationGateway for MockReservationGateway {
        async fn create(&self, request: &ReservationRequest) -> Result<Reservation, GatewayError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(GatewayError::Api("HTTP 500".to_string()));
            }
            Ok(Reservation {
                id: Some(1),
                confirmation_number: self.confirmation_number.clone(),
                start_date: Some(request.start_date),
                end_date: Some(request.end_date),
                status: Some(ReservationStatus::Pending),
                total_amount: Some(request.total_amount),
            })
        }
    }

    struct Harness {
        wizard: WizardStateMachine,
        availability: Arc<MockAvailabilityGateway>,
        reservations: Arc<MockReservationGateway>,
        notifications: Arc<CollectingNotificationSink>,
    }

    fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn site(id: i64, site_type: SiteType, location: SiteLocation) -> Site {
        Site {
            id,
            site_number: id as u32 + 100,
            site_type,
            location: Some(location),
            daily_rate: if site_type == SiteType::Tent { 25.0 } else { 50.0 },
            max_party_size: site_type.max_party_size(),
        }
    }

    fn inventory(hookups: i64, tents: i64) -> Vec<Site> {
        let mut sites: Vec<Site> = (1..=hookups)
            .map(|id| {
                let location = if id % 2 == 0 {
                    SiteLocation::Lake
                } else {
                    SiteLocation::AtvPark
                };
                site(id, SiteType::FullHookup, location)
            })
            .collect();
        sites.extend((1..=tents).map(|n| site(1000 + n, SiteType::Tent, SiteLocation::Woods)));
        sites
    }

    fn harness_with(availability: MockAvailabilityGateway, fail_submit: bool) -> Harness {
        let reservations = if fail_submit {
            MockReservationGateway::failing()
        } else {
            MockReservationGateway::confirming(Some("CG-2025-0001"))
        };
        harness_with_reservations(availability, reservations)
    }

    fn harness_with_reservations(
        availability: MockAvailabilityGateway,
        reservations: MockReservationGateway,
    ) -> Harness {
        let availability = Arc::new(availability);
        let reservations = Arc::new(reservations);
        let notifications = Arc::new(CollectingNotificationSink::new());
        let wizard = WizardStateMachine::new(
            availability.clone(),
            reservations.clone(),
            Arc::new(RegexFieldValidator::with_today(june(1))),
            notifications.clone(),
            None,
        );

        Harness {
            wizard,
            availability,
            reservations,
            notifications,
        }
    }

    fn harness() -> Harness {
        harness_with(MockAvailabilityGateway::with_sites(inventory(25, 25)), false)
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "(555) 123-4567".to_string(),
        }
    }

    fn emergency() -> EmergencyContact {
        EmergencyContact {
            name: "Charles Babbage".to_string(),
            relationship: Some("Friend".to_string()),
            email: None,
            phone: "555-765-4321".to_string(),
        }
    }

    async fn reach_summary(h: &mut Harness, add_ons: AddOnPasses) {
        let w = &mut h.wizard;
        w.set_dates(Some(june(1)), Some(june(4))).unwrap();
        w.select_site_type(SiteType::FullHookup).unwrap();
        w.go_to_step(WizardStep::SiteSelection).await.unwrap();
        w.select_site(1).unwrap();
        w.go_to_step(WizardStep::CustomerInfo).await.unwrap();
        w.update_customer(customer()).unwrap();
        w.update_emergency_contact(emergency()).unwrap();
        w.go_to_step(WizardStep::PartyAndVehicle).await.unwrap();
        w.update_party(PartyDetails {
            party_size: Some(4),
            party_members: String::new(),
        })
        .unwrap();
        w.update_vehicle(VehicleInfo {
            license_plate: "ABC-123".to_string(),
            make: Some("Winnebago".to_string()),
            model: None,
            rv_length_feet: Some(32),
        })
        .unwrap();
        w.update_add_ons(add_ons).unwrap();
        w.go_to_step(WizardStep::SummaryAndSubmit).await.unwrap();
    }

    #[tokio::test]
    async fn test_scenario_a_three_nights_no_add_ons() {
        let mut h = harness();
        reach_summary(&mut h, AddOnPasses::default()).await;

        assert_eq!(h.wizard.current_step(), WizardStep::SummaryAndSubmit);
        let pricing = h.wizard.pricing().unwrap();
        assert_eq!(pricing.nights, 3);
        assert_eq!(pricing.site_subtotal, 150.0);
        assert_eq!(pricing.total, 150.0);
        assert_eq!(pricing.deposit, 38.0);
    }

    #[tokio::test]
    async fn test_scenario_b_add_on_passes() {
        let mut h = harness();
        reach_summary(
            &mut h,
            AddOnPasses {
                enabled: true,
                adults: 2,
                teens: 1,
                children: 1,
            },
        )
        .await;

        let pricing = h.wizard.pricing().unwrap();
        assert_eq!(pricing.add_on_subtotal, 150.0);
        assert_eq!(pricing.total, 300.0);
        assert_eq!(pricing.deposit, 75.0);
    }

    #[tokio::test]
    async fn test_scenario_c_pages_clamp() {
        let mut h = harness();
        h.wizard.set_dates(Some(june(1)), Some(june(4))).unwrap();
        h.wizard.select_site_type(SiteType::FullHookup).unwrap();
        h.wizard.start_search().await.unwrap();

        let view = h.wizard.availability().unwrap();
        assert_eq!(view.sites().len(), 25);
        assert_eq!(view.total_pages(), 3);
        assert_eq!(h.wizard.goto_page(4), Ok(3));
        assert_eq!(h.wizard.availability().unwrap().visible().len(), 5);
    }

    #[tokio::test]
    async fn test_scenario_d_transport_failure_keeps_session() {
        let mut h = harness_with(MockAvailabilityGateway::with_sites(inventory(25, 0)), true);
        reach_summary(&mut h, AddOnPasses::default()).await;
        let before = h.wizard.session().clone();
        h.notifications.drain();

        let result = h.wizard.submit().await;

        assert!(matches!(result, Err(WizardError::SubmissionFailed(_))));
        assert_eq!(h.wizard.status(), &WizardStatus::Failed);
        assert_eq!(h.wizard.session(), &before);
        assert_eq!(h.wizard.current_step(), WizardStep::SummaryAndSubmit);

        let raised = h.notifications.drain();
        assert_eq!(raised.len(), 1);
        assert_eq!(raised[0].level, NotificationLevel::Error);
        assert_eq!(*h.reservations.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_successful_submission_is_terminal() {
        let mut h = harness();
        reach_summary(&mut h, AddOnPasses::default()).await;

        h.wizard.submit().await.unwrap();

        match h.wizard.status() {
            WizardStatus::Submitted { confirmation } => {
                assert_eq!(confirmation.confirmation_number, "CG-2025-0001");
                assert_eq!(confirmation.start_date, june(1));
                assert!(!confirmation.degraded);
            }
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(h.wizard.submit().await, Err(WizardError::AlreadySubmitted));
        assert_eq!(
            h.wizard.go_to_step(WizardStep::DatesAndType).await,
            Err(WizardError::AlreadySubmitted)
        );
        assert_eq!(*h.reservations.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_confirmation_number_falls_back() {
        let mut h = harness_with_reservations(
            MockAvailabilityGateway::with_sites(inventory(25, 0)),
            MockReservationGateway::confirming(None),
        );
        reach_summary(&mut h, AddOnPasses::default()).await;

        h.wizard.submit().await.unwrap();

        match h.wizard.status() {
            WizardStatus::Submitted { confirmation } => {
                assert!(confirmation.degraded);
                assert!(confirmation.confirmation_number.starts_with(DEFAULT_FALLBACK_PREFIX));
                assert!(confirmation.confirmation_number.len() > DEFAULT_FALLBACK_PREFIX.len());
            }
            other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(*h.reservations.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_forward_move_leaves_session_untouched() {
        let mut h = harness();
        reach_summary(&mut h, AddOnPasses::default()).await;
        h.wizard.go_to_step(WizardStep::CustomerInfo).await.unwrap();
        h.wizard
            .update_customer(CustomerInfo {
                email: "nope".to_string(),
                ..customer()
            })
            .unwrap();
        let before = h.wizard.session().clone();
        h.notifications.drain();

        let result = h.wizard.go_to_step(WizardStep::PartyAndVehicle).await;

        assert_eq!(result, Err(WizardError::InvalidFields(vec![Field::Email])));
        assert_eq!(h.wizard.session(), &before);
        assert_eq!(h.wizard.field_errors(), &[Field::Email]);
        assert_eq!(h.notifications.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_step_one_rejections_skip_the_search() {
        let mut h = harness();
        h.wizard.select_site_type(SiteType::Tent).unwrap();
        assert_eq!(
            h.wizard.go_to_step(WizardStep::SiteSelection).await,
            Err(WizardError::IncompleteFields)
        );

        h.wizard.set_dates(Some(june(5)), Some(june(3))).unwrap();
        assert_eq!(
            h.wizard.start_search().await,
            Err(WizardError::InvalidDateOrder)
        );
        assert_eq!(h.availability.call_count(), 0);
        assert_eq!(h.wizard.current_step(), WizardStep::DatesAndType);
        assert_eq!(h.notifications.count(NotificationLevel::Error), 1);
        assert_eq!(h.notifications.count(NotificationLevel::Warning), 1);
    }

    #[tokio::test]
    async fn test_empty_and_failed_searches_stay_on_step_one() {
        let mut h = harness_with(MockAvailabilityGateway::with_sites(inventory(3, 0)), false);
        h.wizard.set_dates(Some(june(1)), Some(june(4))).unwrap();
        h.wizard.select_site_type(SiteType::Tent).unwrap();
        assert_eq!(
            h.wizard.start_search().await,
            Err(WizardError::NoSitesAvailable)
        );
        assert_eq!(h.wizard.current_step(), WizardStep::DatesAndType);
        assert!(h.wizard.availability().is_none());

        let mut h = harness_with(MockAvailabilityGateway::failing(), false);
        h.wizard.set_dates(Some(june(1)), Some(june(4))).unwrap();
        h.wizard.select_site_type(SiteType::Tent).unwrap();
        assert!(matches!(
            h.wizard.start_search().await,
            Err(WizardError::SearchFailed(_))
        ));
        assert_eq!(h.wizard.current_step(), WizardStep::DatesAndType);
        assert_eq!(h.notifications.drain().len(), 1);
    }

    #[tokio::test]
    async fn test_new_search_resets_page_and_selection() {
        let mut h = harness();
        h.wizard.set_dates(Some(june(1)), Some(june(4))).unwrap();
        h.wizard.select_site_type(SiteType::Tent).unwrap();
        h.wizard.start_search().await.unwrap();
        assert_eq!(h.wizard.goto_page(3), Ok(3));
        h.wizard.select_site(1001).unwrap();
        assert_eq!(
            h.wizard.set_location_filter(Some(SiteLocation::Woods)),
            Err(WizardError::LocationFilterUnavailable)
        );

        h.wizard.go_to_step(WizardStep::DatesAndType).await.unwrap();
        h.wizard.select_site_type(SiteType::FullHookup).unwrap();
        h.wizard.go_to_step(WizardStep::SiteSelection).await.unwrap();

        let view = h.wizard.availability().unwrap();
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.site_type(), SiteType::FullHookup);
        assert_eq!(view.location_filter(), None);
        assert!(h.wizard.session().selected_site.is_none());
        assert_eq!(h.availability.call_count(), 2);
    }

    #[tokio::test]
    async fn test_location_filter_resets_page() {
        let mut h = harness();
        h.wizard.set_dates(Some(june(1)), Some(june(4))).unwrap();
        h.wizard.select_site_type(SiteType::FullHookup).unwrap();
        h.wizard.start_search().await.unwrap();
        h.wizard.next_page().unwrap();

        h.wizard
            .set_location_filter(Some(SiteLocation::Lake))
            .unwrap();

        let view = h.wizard.availability().unwrap();
        assert_eq!(view.current_page(), 1);
        assert_eq!(view.filtered().len(), 12);
    }

    #[tokio::test]
    async fn test_site_selection_rules() {
        let mut h = harness();
        assert_eq!(
            h.wizard.select_site(1),
            Err(WizardError::WrongStep {
                expected: WizardStep::SiteSelection,
                actual: WizardStep::DatesAndType
            })
        );

        h.wizard.set_dates(Some(june(1)), Some(june(4))).unwrap();
        h.wizard.select_site_type(SiteType::FullHookup).unwrap();
        h.wizard.start_search().await.unwrap();

        assert_eq!(
            h.wizard.go_to_step(WizardStep::CustomerInfo).await,
            Err(WizardError::SiteNotSelected)
        );
        assert_eq!(h.wizard.select_site(1001), Err(WizardError::UnknownSite(1001)));

        h.notifications.drain();
        h.wizard.select_site(25).unwrap();
        h.wizard.select_site(25).unwrap();
        assert_eq!(
            h.wizard.session().selected_site.as_ref().map(|site| site.id),
            Some(25)
        );
        assert_eq!(
            h.notifications.drain()[0].message,
            "Selected Site 125 (Full RV Hookup (Water/Electric))"
        );
    }

    #[tokio::test]
    async fn test_tent_party_cap_and_rv_length_cleared() {
        let mut h = harness();
        h.wizard.set_dates(Some(june(1)), Some(june(4))).unwrap();
        h.wizard.select_site_type(SiteType::Tent).unwrap();
        assert_eq!(h.wizard.max_party_size(), 8);
        h.wizard.go_to_step(WizardStep::SiteSelection).await.unwrap();
        h.wizard.select_site(1001).unwrap();
        h.wizard.go_to_step(WizardStep::CustomerInfo).await.unwrap();
        h.wizard.update_customer(customer()).unwrap();
        h.wizard.update_emergency_contact(emergency()).unwrap();
        h.wizard.go_to_step(WizardStep::PartyAndVehicle).await.unwrap();
        h.wizard
            .update_vehicle(VehicleInfo {
                license_plate: "TENT 1".to_string(),
                rv_length_feet: Some(30),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(h.wizard.session().vehicle.rv_length_feet, None);

        h.wizard
            .update_party(PartyDetails {
                party_size: Some(9),
                party_members: String::new(),
            })
            .unwrap();
        assert_eq!(
            h.wizard.go_to_step(WizardStep::SummaryAndSubmit).await,
            Err(WizardError::PartySizeExceeded { max: 8 })
        );
    }

    #[test]
    fn test_command_wire_format() {
        let command: WizardCommand = serde_json::from_str(
            r#"{"type":"set_dates","payload":{"start_date":"2025-06-01","end_date":"2025-06-04"}}"#,
        )
        .unwrap();
        assert_eq!(
            command,
            WizardCommand::SetDates {
                start_date: Some(june(1)),
                end_date: Some(june(4))
            }
        );

        let command: WizardCommand =
            serde_json::from_str(r#"{"type":"go_to_step","payload":{"step":3}}"#).unwrap();
        assert_eq!(
            command,
            WizardCommand::GoToStep {
                step: WizardStep::CustomerInfo
            }
        );

        let command: WizardCommand = serde_json::from_str(r#"{"type":"submit"}"#).unwrap();
        assert_eq!(command, WizardCommand::Submit);
    }

    #[test]
    fn test_command_input_limits() {
        let command = WizardCommand::UpdateNotes(BookingNotes {
            notes: "x".repeat(1001),
        });
        assert!(command.validate_input().is_err());

        let command = WizardCommand::UpdateAddOns(AddOnPasses {
            enabled: true,
            adults: u32::MAX,
            teens: 1,
            children: 0,
        });
        assert!(command.validate_input().is_err());

        let command = WizardCommand::UpdateVehicle(VehicleInfo {
            license_plate: "ABC-123".to_string(),
            ..Default::default()
        });
        assert!(command.validate_input().is_ok());
    }
}
