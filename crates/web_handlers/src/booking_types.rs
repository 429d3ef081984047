use booking_wizard::{
    BookingSession, Field, Notification, PricingSnapshot, SitePage, WizardError,
    WizardStateMachine, WizardStatus, WizardStep,
};
use serde::Serialize;
use uuid::Uuid;

/// A form field marked invalid, with the text to show next to it
#[derive(Debug, Clone, Serialize)]
pub struct FieldErrorView {
    /// Field identifier
    pub field: Field,
    /// Message for the guest
    pub message: &'static str,
}

/// Everything a frontend needs to render the wizard
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    /// Booking attempt identifier
    pub id: Uuid,
    /// Step the guest is on
    pub step: WizardStep,
    /// Overall outcome so far
    pub status: WizardStatus,
    /// Data entered so far
    pub session: BookingSession,
    /// Party size cap for the chosen site type
    pub max_party_size: u32,
    /// Whether the RV length field must be shown
    pub requires_rv_length: bool,
    /// Fields to highlight on step 3
    pub field_errors: Vec<FieldErrorView>,
    /// Current page of availability results
    pub availability: Option<SitePage>,
    /// Price of the stay, once a site is selected
    pub pricing: Option<PricingSnapshot>,
}

impl WizardView {
    /// Renders the current state of a wizard
    pub fn from_wizard(id: Uuid, wizard: &WizardStateMachine) -> Self {
        let session = wizard.session().clone();
        let requires_rv_length = session
            .site_type
            .is_some_and(|site_type| site_type.requires_rv_length());

        Self {
            id,
            step: wizard.current_step(),
            status: wizard.status().clone(),
            max_party_size: wizard.max_party_size(),
            requires_rv_length,
            field_errors: wizard
                .field_errors()
                .iter()
                .map(|field| FieldErrorView {
                    field: *field,
                    message: field.message(),
                })
                .collect(),
            availability: wizard.availability().map(|view| view.page()),
            pricing: wizard.pricing(),
            session,
        }
    }
}

/// Response for a newly opened booking attempt
#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    /// Identifier to use in later requests
    pub id: Uuid,
    /// Initial state, step 1
    pub view: WizardView,
}

/// Why a command was refused
#[derive(Debug, Clone, Serialize)]
pub struct CommandError {
    /// `validation_error` or `gateway_error`
    pub error: &'static str,
    /// Message for the guest
    pub message: String,
}

impl From<&WizardError> for CommandError {
    fn from(error: &WizardError) -> Self {
        Self {
            error: if error.is_validation() {
                "validation_error"
            } else {
                "gateway_error"
            },
            message: error.to_string(),
        }
    }
}

/// Result of one wizard command
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// Whether the wizard accepted the command
    pub accepted: bool,
    /// Present when the command was refused
    pub error: Option<CommandError>,
    /// State after the command
    pub view: WizardView,
    /// Notifications raised while handling the command
    pub notifications: Vec<Notification>,
}

/// Custom error type for booking API operations
#[derive(thiserror::Error, Debug)]
pub enum BookingApiError {
    /// Malformed command payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// No open booking with this id
    #[error("Booking not found")]
    NotFound,

    /// Another command on the same booking is still running
    #[error("Booking is busy")]
    Busy,
}

impl actix_web::ResponseError for BookingApiError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            BookingApiError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            BookingApiError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "booking_not_found",
                "message": "Booking not found or already closed"
            })),
            BookingApiError::Busy => HttpResponse::Conflict().json(serde_json::json!({
                "error": "booking_busy",
                "message": "Another request for this booking is still in progress"
            })),
        }
    }
}
