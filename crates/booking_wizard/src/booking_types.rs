use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Party size cap applied when the site type is not one we know about
pub const DEFAULT_MAX_PARTY_SIZE: u32 = 15;

/// Category of campsite offered by the campground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiteType {
    /// RV site with water and electric hookups
    FullHookup,
    /// Tent pad
    Tent,
    /// Any type the backend reports that this client does not recognise
    #[serde(other)]
    Other,
}

impl SiteType {
    /// Wire name used in query strings and payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteType::FullHookup => "FULL_HOOKUP",
            SiteType::Tent => "TENT",
            SiteType::Other => "OTHER",
        }
    }

    /// Human readable description of the site type
    pub fn description(&self) -> &'static str {
        match self {
            SiteType::FullHookup => "Full RV Hookup (Water/Electric)",
            SiteType::Tent => "Tent Camping",
            SiteType::Other => "Campsite",
        }
    }

    /// Short lowercase label, e.g. "full hookup"
    pub fn label(&self) -> String {
        self.as_str().to_lowercase().replace('_', " ")
    }

    /// Largest party allowed on a site of this type
    pub fn max_party_size(&self) -> u32 {
        match self {
            SiteType::FullHookup => 15,
            SiteType::Tent => 8,
            SiteType::Other => DEFAULT_MAX_PARTY_SIZE,
        }
    }

    /// Whether bookings of this type must state the RV length
    pub fn requires_rv_length(&self) -> bool {
        matches!(self, SiteType::FullHookup)
    }

    /// Tent sites all sit in one location, so filtering by location is pointless
    pub fn supports_location_filter(&self) -> bool {
        !matches!(self, SiteType::Tent)
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Area of the campground a site belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SiteLocation {
    /// Sites in the woods
    Woods,
    /// Sites next to the ATV park
    AtvPark,
    /// Lakeside sites
    Lake,
    /// Sites around base camp
    BaseCamp,
}

impl SiteLocation {
    /// Display name of the location
    pub fn display_name(&self) -> &'static str {
        match self {
            SiteLocation::Woods => "Woods",
            SiteLocation::AtvPark => "ATV Park",
            SiteLocation::Lake => "Lake",
            SiteLocation::BaseCamp => "Base Camp",
        }
    }
}

/// A campsite returned by an availability search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Backend identifier of the site
    pub id: i64,
    /// Number painted on the site post
    pub site_number: u32,
    /// Category of the site
    pub site_type: SiteType,
    /// Area of the campground, if the backend reports one
    #[serde(default)]
    pub location: Option<SiteLocation>,
    /// Nightly rate in dollars
    pub daily_rate: f64,
    /// Maximum party size advertised for this site
    pub max_party_size: u32,
}

impl Site {
    /// Name shown to guests, e.g. "Site 12 (Tent Camping)"
    pub fn display_name(&self) -> String {
        format!("Site {} ({})", self.site_number, self.site_type.description())
    }
}

/// Requested stay. Either end may be missing while the guest is filling the form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Check-in date
    pub start_date: Option<NaiveDate>,
    /// Check-out date
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a complete range
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    /// Both ends, if both are set
    pub fn bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.start_date.zip(self.end_date)
    }
}

/// Guest contact details collected on step 3
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CustomerInfo {
    /// Guest first name
    #[validate(length(max = 100, message = "First name must not exceed 100 characters"))]
    pub first_name: String,
    /// Guest last name
    #[validate(length(max = 100, message = "Last name must not exceed 100 characters"))]
    pub last_name: String,
    /// Guest email address
    #[validate(length(max = 150, message = "Email must not exceed 150 characters"))]
    pub email: String,
    /// Guest phone number
    #[validate(length(max = 20, message = "Phone number must not exceed 20 characters"))]
    pub phone: String,
}

impl CustomerInfo {
    /// "First Last"
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Emergency contact collected on step 3
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EmergencyContact {
    /// Contact name
    #[validate(length(max = 200, message = "Emergency contact name must not exceed 200 characters"))]
    pub name: String,
    /// Relationship to the guest
    #[validate(length(max = 100, message = "Relationship must not exceed 100 characters"))]
    pub relationship: Option<String>,
    /// Contact email
    #[validate(length(max = 150, message = "Email must not exceed 150 characters"))]
    pub email: Option<String>,
    /// Contact phone number
    #[validate(length(max = 20, message = "Phone number must not exceed 20 characters"))]
    pub phone: String,
}

/// Vehicle details collected on step 4
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct VehicleInfo {
    /// Licence plate, always required
    #[validate(length(max = 10, message = "License plate must not exceed 10 characters"))]
    pub license_plate: String,
    /// Vehicle make
    #[validate(length(max = 50, message = "Vehicle make must not exceed 50 characters"))]
    pub make: Option<String>,
    /// Vehicle model
    #[validate(length(max = 50, message = "Vehicle model must not exceed 50 characters"))]
    pub model: Option<String>,
    /// RV length in feet, required for full hookup sites
    pub rv_length_feet: Option<u32>,
}

/// Optional per-person, per-night add-on passes (ATV access)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AddOnPasses {
    /// Whether the guest wants passes at all
    pub enabled: bool,
    /// Adult passes
    #[validate(range(max = 15, message = "Adult passes must not exceed 15"))]
    pub adults: u32,
    /// Teen passes
    #[validate(range(max = 15, message = "Teen passes must not exceed 15"))]
    pub teens: u32,
    /// Child passes, free of charge
    #[validate(range(max = 15, message = "Child passes must not exceed 15"))]
    pub children: u32,
}

impl AddOnPasses {
    /// Turning passes off resets every count
    pub fn normalized(self) -> Self {
        if self.enabled { self } else { Self::default() }
    }

    /// Number of people holding a pass, priced or not
    pub fn pass_holders(&self) -> u32 {
        if self.enabled {
            self.adults
                .saturating_add(self.teens)
                .saturating_add(self.children)
        } else {
            0
        }
    }
}

/// The five steps of the booking wizard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    /// Step 1: dates and site type
    #[default]
    DatesAndType = 1,
    /// Step 2: pick a site from the search results
    SiteSelection = 2,
    /// Step 3: guest and emergency contact
    CustomerInfo = 3,
    /// Step 4: party and vehicle
    PartyAndVehicle = 4,
    /// Step 5: summary and submission
    SummaryAndSubmit = 5,
}

impl WizardStep {
    /// 1-based step number
    pub fn number(&self) -> u8 {
        *self as u8
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(WizardStep::DatesAndType),
            2 => Ok(WizardStep::SiteSelection),
            3 => Ok(WizardStep::CustomerInfo),
            4 => Ok(WizardStep::PartyAndVehicle),
            5 => Ok(WizardStep::SummaryAndSubmit),
            other => Err(format!("step must be between 1 and 5, got {}", other)),
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Everything the guest has entered during one booking attempt
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingSession {
    /// Step the guest is on
    pub current_step: WizardStep,
    /// Requested stay
    pub date_range: DateRange,
    /// Chosen site type
    pub site_type: Option<SiteType>,
    /// Site picked from the latest availability search
    pub selected_site: Option<Site>,
    /// Guest contact details
    pub customer: CustomerInfo,
    /// Emergency contact
    pub emergency_contact: EmergencyContact,
    /// Number of people staying
    pub party_size: Option<u32>,
    /// Free text list of party members, one per line
    pub party_members: String,
    /// Vehicle details
    pub vehicle: VehicleInfo,
    /// Add-on passes
    pub add_ons: AddOnPasses,
    /// Free text notes for the office
    pub notes: String,
}

impl BookingSession {
    /// Party member names, one per non-blank line, falling back to the guest's own name
    pub fn party_member_names(&self) -> Vec<String> {
        let names: Vec<String> = self
            .party_members
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            vec![self.customer.full_name()]
        } else {
            names
        }
    }

    /// Party size cap for the chosen site type
    pub fn max_party_size(&self) -> u32 {
        self.site_type
            .map_or(DEFAULT_MAX_PARTY_SIZE, |site_type| site_type.max_party_size())
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    /// Backend confirmation number, or a locally generated token
    pub confirmation_number: String,
    /// First night of the stay
    pub start_date: NaiveDate,
    /// True when the backend returned no confirmation number and a local token was used
    pub degraded: bool,
}

/// Where the booking attempt stands overall
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardStatus {
    /// The guest is still working through the steps
    #[default]
    InProgress,
    /// The reservation was created
    Submitted {
        /// Confirmation shown to the guest
        confirmation: Confirmation,
    },
    /// The last submission failed; the session is intact and may be resubmitted
    Failed,
}

/// Form fields that can be individually marked invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Guest first name
    FirstName,
    /// Guest last name
    LastName,
    /// Guest email
    Email,
    /// Guest phone
    Phone,
    /// Emergency contact name
    EmergencyName,
    /// Emergency contact phone
    EmergencyPhone,
}

impl Field {
    /// Message shown next to the field
    pub fn message(&self) -> &'static str {
        match self {
            Field::FirstName => "First name is required.",
            Field::LastName => "Last name is required.",
            Field::Email => "Please enter a valid email address.",
            Field::Phone | Field::EmergencyPhone => "Please enter a valid phone number.",
            Field::EmergencyName => "Emergency contact name is required.",
        }
    }
}

/// Severity of a notification shown to the guest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// Neutral progress information
    Info,
    /// Something worked
    Success,
    /// The guest needs to fix something
    Warning,
    /// Something failed
    Error,
}

/// Failure of an external gateway call
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Request could not be sent or no response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limited by the backend
    #[error("Rate limited by reservation service")]
    RateLimited,

    /// Resource not found
    #[error("Resource not found")]
    NotFound,

    /// Backend refused the request
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Response body did not match the expected format
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Any other non-success response
    #[error("API error: {0}")]
    Api(String),
}

/// Reasons the wizard refuses a command
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    /// Dates or site type missing
    #[error("Please complete all required fields.")]
    IncompleteFields,

    /// Check-out not after check-in
    #[error("Check-out date must be after check-in date.")]
    InvalidDateOrder,

    /// Check-in before today
    #[error("Check-in date must be today or in the future.")]
    DateInPast,

    /// Search returned nothing
    #[error("No sites available for your selected dates. Please try different dates.")]
    NoSitesAvailable,

    /// Paging or filtering without search results
    #[error("Please check availability first.")]
    NoActiveSearch,

    /// Location filter on a site type that has a single location
    #[error("Location filtering is not available for tent sites.")]
    LocationFilterUnavailable,

    /// The id is not part of the latest search results
    #[error("Site {0} is not in the current availability results.")]
    UnknownSite(i64),

    /// Advancing past step 2 without a site
    #[error("Please select a campsite.")]
    SiteNotSelected,

    /// Step 3 fields missing or malformed
    #[error("Please complete all required customer information.")]
    InvalidFields(Vec<Field>),

    /// Party size or licence plate missing
    #[error("Please complete party size and vehicle information.")]
    MissingPartyOrVehicle,

    /// Full hookup booking without RV length
    #[error("Please provide RV length for RV sites.")]
    MissingRvLength,

    /// RV length outside 10..=100 feet
    #[error("RV length must be between 10 and 100 feet.")]
    RvLengthOutOfRange,

    /// Licence plate does not look like one
    #[error("Please provide a valid license plate.")]
    InvalidLicensePlate,

    /// Party of zero
    #[error("Party size must be at least 1.")]
    InvalidPartySize,

    /// Party larger than the site type allows
    #[error("Party size cannot exceed {max} for this site type.")]
    PartySizeExceeded {
        /// Cap for the chosen site type
        max: u32,
    },

    /// Command issued on the wrong step
    #[error("This action is only available on step {expected} (currently on step {actual}).")]
    WrongStep {
        /// Step the command belongs to
        expected: WizardStep,
        /// Step the wizard is on
        actual: WizardStep,
    },

    /// The booking was already submitted
    #[error("This booking has already been submitted.")]
    AlreadySubmitted,

    /// Availability search failed in transport
    #[error("Error checking availability. Please try again.")]
    SearchFailed(#[source] GatewayError),

    /// Reservation submission failed in transport
    #[error("Booking failed. Please try again or contact us for assistance.")]
    SubmissionFailed(#[source] GatewayError),
}

impl WizardError {
    /// How the refusal is presented to the guest
    pub fn level(&self) -> NotificationLevel {
        match self {
            WizardError::InvalidDateOrder
            | WizardError::SearchFailed(_)
            | WizardError::SubmissionFailed(_) => NotificationLevel::Error,
            _ => NotificationLevel::Warning,
        }
    }

    /// Whether this is a local validation refusal rather than a gateway failure
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            WizardError::SearchFailed(_) | WizardError::SubmissionFailed(_)
        )
    }
}
