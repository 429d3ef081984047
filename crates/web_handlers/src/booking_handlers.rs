use std::sync::Arc;

use actix_web::{HttpResponse, Result, web};
use booking_wizard::{WizardCommand, WizardStatus};
use uuid::Uuid;

use crate::booking_store::*;
use crate::booking_types::*;

/// Opens a new booking attempt on step 1
pub async fn create_booking(
    store: web::Data<BookingStore>,
    services: web::Data<BookingServices>,
) -> Result<HttpResponse, BookingApiError> {
    let entry = Arc::new(services.open_booking());
    let id = insert_booking(&store, entry.clone());
    let view = WizardView::from_wizard(id, &*entry.try_wizard()?);

    log::info!("Opened booking {}", id);

    Ok(HttpResponse::Created().json(CreateBookingResponse { id, view }))
}

/// Gets the current state of a booking attempt
pub async fn get_booking(
    store: web::Data<BookingStore>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, BookingApiError> {
    let id = path.into_inner();
    let entry = find_booking(&store, &id)?;
    let wizard = entry.try_wizard()?;

    Ok(HttpResponse::Ok().json(WizardView::from_wizard(id, &wizard)))
}

/// Runs one wizard command against a booking attempt
pub async fn dispatch_command(
    store: web::Data<BookingStore>,
    path: web::Path<Uuid>,
    command: web::Json<WizardCommand>,
) -> Result<HttpResponse, BookingApiError> {
    command
        .validate_input()
        .map_err(|e| BookingApiError::Validation(e.to_string()))?;

    let id = path.into_inner();
    let entry = find_booking(&store, &id)?;
    let mut wizard = entry.try_wizard()?;

    let error = wizard
        .dispatch(command.into_inner())
        .await
        .err()
        .map(|e| CommandError::from(&e));

    let response = CommandResponse {
        accepted: error.is_none(),
        error,
        view: WizardView::from_wizard(id, &wizard),
        notifications: entry.drain_notifications(),
    };

    if matches!(wizard.status(), WizardStatus::Submitted { .. }) {
        remove_booking(&store, &id)?;
        log::info!("Booking {} submitted and closed", id);
    }

    Ok(HttpResponse::Ok().json(response))
}

/// Abandons a booking attempt
pub async fn delete_booking(
    store: web::Data<BookingStore>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, BookingApiError> {
    let id = path.into_inner();
    remove_booking(&store, &id)?;

    log::info!("Closed booking {}", id);

    Ok(HttpResponse::NoContent().finish())
}

/// Liveness check
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().body("OK"))
}

/// Registers the booking API under `/api/bookings`
pub fn configure_booking_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/bookings")
            .route("", web::post().to(create_booking))
            .route("/{booking_id}", web::get().to(get_booking))
            .route("/{booking_id}", web::delete().to(delete_booking))
            .route("/{booking_id}/commands", web::post().to(dispatch_command)),
    )
    .route("/health", web::get().to(health));
}
