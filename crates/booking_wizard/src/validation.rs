use chrono::{Local, NaiveDate};
use regex::Regex;

use crate::booking_types::*;

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[1-9]\d{1,14}$").unwrap();
    static ref PHONE_SEPARATORS: Regex = Regex::new(r"[\s\-()]").unwrap();
    static ref LICENSE_PLATE_REGEX: Regex = Regex::new(r"(?i)^[A-Z0-9\-\s]{2,10}$").unwrap();
}

/// Shortest RV the campground accepts, in feet
pub const MIN_RV_LENGTH_FEET: u32 = 10;
/// Longest RV the campground accepts, in feet
pub const MAX_RV_LENGTH_FEET: u32 = 100;

/// Field-level format checks consumed by the step rules
pub trait FieldValidator: Send + Sync {
    /// Looks like an email address
    fn is_valid_email(&self, email: &str) -> bool;

    /// Looks like a phone number once separators are removed
    fn is_valid_phone(&self, phone: &str) -> bool;

    /// Today or later
    fn is_future_date(&self, date: NaiveDate) -> bool;

    /// Strictly after today
    fn is_strictly_future_date(&self, date: NaiveDate) -> bool;

    /// Looks like a licence plate
    fn is_valid_license_plate(&self, plate: &str) -> bool;

    /// Within the accepted RV length range
    fn is_valid_rv_length(&self, feet: u32) -> bool {
        (MIN_RV_LENGTH_FEET..=MAX_RV_LENGTH_FEET).contains(&feet)
    }
}

/// Regex based validator. "Today" is the local date unless pinned.
#[derive(Debug, Clone, Default)]
pub struct RegexFieldValidator {
    today: Option<NaiveDate>,
}

impl RegexFieldValidator {
    /// Validator that compares dates against the local calendar date
    pub fn new() -> Self {
        Self { today: None }
    }

    /// Validator with a fixed notion of today
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl FieldValidator for RegexFieldValidator {
    fn is_valid_email(&self, email: &str) -> bool {
        EMAIL_REGEX.is_match(email.trim())
    }

    fn is_valid_phone(&self, phone: &str) -> bool {
        let cleaned = PHONE_SEPARATORS.replace_all(phone.trim(), "");
        PHONE_REGEX.is_match(&cleaned)
    }

    fn is_future_date(&self, date: NaiveDate) -> bool {
        date >= self.today()
    }

    fn is_strictly_future_date(&self, date: NaiveDate) -> bool {
        date > self.today()
    }

    fn is_valid_license_plate(&self, plate: &str) -> bool {
        LICENSE_PLATE_REGEX.is_match(plate.trim())
    }
}

/// Step 1: dates and site type present, check-out after check-in, check-in not in the past
pub fn validate_dates_and_type(
    session: &BookingSession,
    validator: &dyn FieldValidator,
) -> Result<(NaiveDate, NaiveDate, SiteType), WizardError> {
    let (Some((start_date, end_date)), Some(site_type)) =
        (session.date_range.bounds(), session.site_type)
    else {
        return Err(WizardError::IncompleteFields);
    };

    if end_date <= start_date {
        return Err(WizardError::InvalidDateOrder);
    }

    if !validator.is_future_date(start_date) {
        return Err(WizardError::DateInPast);
    }

    Ok((start_date, end_date, site_type))
}

/// Step 2: a site has been picked
pub fn validate_site_selection(session: &BookingSession) -> Result<&Site, WizardError> {
    session
        .selected_site
        .as_ref()
        .ok_or(WizardError::SiteNotSelected)
}

/// Step 3: every contact field present and well formed. Reports all bad fields at once.
pub fn validate_customer_info(
    session: &BookingSession,
    validator: &dyn FieldValidator,
) -> Result<(), WizardError> {
    let customer = &session.customer;
    let emergency = &session.emergency_contact;

    let checks = [
        (Field::FirstName, !customer.first_name.trim().is_empty()),
        (Field::LastName, !customer.last_name.trim().is_empty()),
        (Field::Email, validator.is_valid_email(&customer.email)),
        (Field::Phone, validator.is_valid_phone(&customer.phone)),
        (Field::EmergencyName, !emergency.name.trim().is_empty()),
        (Field::EmergencyPhone, validator.is_valid_phone(&emergency.phone)),
    ];

    let invalid: Vec<Field> = checks
        .into_iter()
        .filter(|(_, valid)| !valid)
        .map(|(field, _)| field)
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(WizardError::InvalidFields(invalid))
    }
}

/// Step 4: party size and vehicle, including the site type dependent rules
pub fn validate_party_and_vehicle(
    session: &BookingSession,
    validator: &dyn FieldValidator,
) -> Result<(), WizardError> {
    let plate = session.vehicle.license_plate.trim();
    let Some(party_size) = session.party_size else {
        return Err(WizardError::MissingPartyOrVehicle);
    };
    if plate.is_empty() {
        return Err(WizardError::MissingPartyOrVehicle);
    }

    let rv_required = session
        .site_type
        .is_some_and(|site_type| site_type.requires_rv_length());
    if rv_required && session.vehicle.rv_length_feet.is_none() {
        return Err(WizardError::MissingRvLength);
    }

    if party_size == 0 {
        return Err(WizardError::InvalidPartySize);
    }

    let max = session.max_party_size();
    if party_size > max {
        return Err(WizardError::PartySizeExceeded { max });
    }

    if rv_required {
        if let Some(feet) = session.vehicle.rv_length_feet {
            if !validator.is_valid_rv_length(feet) {
                return Err(WizardError::RvLengthOutOfRange);
            }
        }
    }

    if !validator.is_valid_license_plate(plate) {
        return Err(WizardError::InvalidLicensePlate);
    }

    Ok(())
}

/// Runs the rules that guard leaving `step`
pub fn validate_step(
    step: WizardStep,
    session: &BookingSession,
    validator: &dyn FieldValidator,
) -> Result<(), WizardError> {
    match step {
        WizardStep::DatesAndType => validate_dates_and_type(session, validator).map(|_| ()),
        WizardStep::SiteSelection => validate_site_selection(session).map(|_| ()),
        WizardStep::CustomerInfo => validate_customer_info(session, validator),
        WizardStep::PartyAndVehicle => validate_party_and_vehicle(session, validator),
        WizardStep::SummaryAndSubmit => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn validator() -> RegexFieldValidator {
        RegexFieldValidator::with_today(date(2025, 5, 1))
    }

    fn step_four_session(site_type: SiteType) -> BookingSession {
        BookingSession {
            site_type: Some(site_type),
            party_size: Some(4),
            vehicle: VehicleInfo {
                license_plate: "ABC-123".to_string(),
                rv_length_feet: Some(32),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_email_and_phone_patterns() {
        let v = validator();
        assert!(v.is_valid_email("guest@example.com"));
        assert!(!v.is_valid_email("guest@example"));
        assert!(!v.is_valid_email("guest example@x.com"));

        assert!(v.is_valid_phone("(555) 123-4567"));
        assert!(v.is_valid_phone("+1 555 123 4567"));
        assert!(!v.is_valid_phone("0123"));
        assert!(!v.is_valid_phone("call me"));
    }

    #[test]
    fn test_date_checks_use_pinned_today() {
        let v = validator();
        assert!(v.is_future_date(date(2025, 5, 1)));
        assert!(!v.is_strictly_future_date(date(2025, 5, 1)));
        assert!(v.is_strictly_future_date(date(2025, 5, 2)));
        assert!(!v.is_future_date(date(2025, 4, 30)));
    }

    #[test]
    fn test_step_one_rules() {
        let v = validator();
        let mut session = BookingSession::default();
        assert_eq!(
            validate_dates_and_type(&session, &v),
            Err(WizardError::IncompleteFields)
        );

        session.date_range = DateRange::new(date(2025, 6, 4), date(2025, 6, 4));
        session.site_type = Some(SiteType::Tent);
        assert_eq!(
            validate_dates_and_type(&session, &v),
            Err(WizardError::InvalidDateOrder)
        );

        session.date_range = DateRange::new(date(2025, 4, 20), date(2025, 4, 22));
        assert_eq!(
            validate_dates_and_type(&session, &v),
            Err(WizardError::DateInPast)
        );

        session.date_range = DateRange::new(date(2025, 6, 1), date(2025, 6, 4));
        assert!(validate_dates_and_type(&session, &v).is_ok());
    }

    #[test]
    fn test_step_three_marks_every_invalid_field() {
        let v = validator();
        let session = BookingSession {
            customer: CustomerInfo {
                first_name: "Ada".to_string(),
                last_name: " ".to_string(),
                email: "not-an-email".to_string(),
                phone: "555-123-4567".to_string(),
            },
            emergency_contact: EmergencyContact {
                name: "Charles".to_string(),
                phone: String::new(),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(
            validate_customer_info(&session, &v),
            Err(WizardError::InvalidFields(vec![
                Field::LastName,
                Field::Email,
                Field::EmergencyPhone
            ]))
        );
    }

    #[test]
    fn test_step_four_party_size_caps() {
        let v = validator();

        let mut tent = step_four_session(SiteType::Tent);
        tent.party_size = Some(9);
        assert_eq!(
            validate_party_and_vehicle(&tent, &v),
            Err(WizardError::PartySizeExceeded { max: 8 })
        );

        let mut hookup = step_four_session(SiteType::FullHookup);
        hookup.party_size = Some(15);
        assert!(validate_party_and_vehicle(&hookup, &v).is_ok());
        hookup.party_size = Some(16);
        assert_eq!(
            validate_party_and_vehicle(&hookup, &v),
            Err(WizardError::PartySizeExceeded { max: 15 })
        );
    }

    #[test]
    fn test_step_four_vehicle_rules() {
        let v = validator();

        let mut session = step_four_session(SiteType::FullHookup);
        session.vehicle.rv_length_feet = None;
        assert_eq!(
            validate_party_and_vehicle(&session, &v),
            Err(WizardError::MissingRvLength)
        );

        session.vehicle.rv_length_feet = Some(120);
        assert_eq!(
            validate_party_and_vehicle(&session, &v),
            Err(WizardError::RvLengthOutOfRange)
        );

        let mut tent = step_four_session(SiteType::Tent);
        tent.vehicle.rv_length_feet = None;
        assert!(validate_party_and_vehicle(&tent, &v).is_ok());

        tent.vehicle.license_plate = "  ".to_string();
        assert_eq!(
            validate_party_and_vehicle(&tent, &v),
            Err(WizardError::MissingPartyOrVehicle)
        );

        tent.vehicle.license_plate = "TOO-LONG-PLATE".to_string();
        assert_eq!(
            validate_party_and_vehicle(&tent, &v),
            Err(WizardError::InvalidLicensePlate)
        );

        tent.vehicle.license_plate = "XYZ 99".to_string();
        tent.party_size = Some(0);
        assert_eq!(
            validate_party_and_vehicle(&tent, &v),
            Err(WizardError::InvalidPartySize)
        );
    }
}
