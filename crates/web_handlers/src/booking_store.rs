use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use booking_wizard::{
    AvailabilityGateway, CollectingNotificationSink, FanOutNotificationSink, FieldValidator,
    Notification, ReservationGateway, TracingNotificationSink, WizardConfig, WizardStateMachine,
};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::MutexGuard;
use uuid::Uuid;

use crate::booking_types::BookingApiError;

/// Minutes of inactivity after which a booking attempt is dropped
pub const DEFAULT_BOOKING_TTL_MINUTES: i64 = 30;

/// Open booking attempts keyed by id
pub type BookingStore = Arc<Mutex<HashMap<Uuid, Arc<BookingEntry>>>>;

/// Creates an empty booking store
pub fn create_booking_store() -> BookingStore {
    Arc::new(Mutex::new(HashMap::new()))
}

/// One booking attempt and the notifications it has raised but not yet returned
pub struct BookingEntry {
    wizard: tokio::sync::Mutex<WizardStateMachine>,
    notifications: Arc<CollectingNotificationSink>,
    ttl: Duration,
    expires_at: Mutex<DateTime<Utc>>,
}

impl BookingEntry {
    /// Whether the attempt has been idle past its time to live
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        *self
            .expires_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            <= now
    }

    fn touch(&self, now: DateTime<Utc>) {
        *self
            .expires_at
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = now + self.ttl;
    }

    /// Locks the wizard, refusing if another request holds it
    pub fn try_wizard(&self) -> Result<MutexGuard<'_, WizardStateMachine>, BookingApiError> {
        self.wizard.try_lock().map_err(|_| BookingApiError::Busy)
    }

    /// Takes the notifications raised since the last call
    pub fn drain_notifications(&self) -> Vec<Notification> {
        self.notifications.drain()
    }
}

/// Gateways and settings shared by every booking attempt
pub struct BookingServices {
    availability: Arc<dyn AvailabilityGateway>,
    reservations: Arc<dyn ReservationGateway>,
    validator: Arc<dyn FieldValidator>,
    config: WizardConfig,
    session_ttl: Duration,
}

impl BookingServices {
    /// Bundles the collaborators new wizards are built from
    pub fn new(
        availability: Arc<dyn AvailabilityGateway>,
        reservations: Arc<dyn ReservationGateway>,
        validator: Arc<dyn FieldValidator>,
        config: Option<WizardConfig>,
    ) -> Self {
        Self {
            availability,
            reservations,
            validator,
            config: config.unwrap_or_default(),
            session_ttl: Duration::minutes(DEFAULT_BOOKING_TTL_MINUTES),
        }
    }

    /// Sets how long an idle booking attempt is kept
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Builds a wizard on step 1 whose notifications are both logged and buffered
    pub fn open_booking(&self) -> BookingEntry {
        let notifications = Arc::new(CollectingNotificationSink::new());
        let notifier = Arc::new(FanOutNotificationSink::new(vec![
            notifications.clone(),
            Arc::new(TracingNotificationSink),
        ]));

        let wizard = WizardStateMachine::new(
            self.availability.clone(),
            self.reservations.clone(),
            self.validator.clone(),
            notifier,
            Some(self.config.clone()),
        );

        BookingEntry {
            wizard: tokio::sync::Mutex::new(wizard),
            notifications,
            ttl: self.session_ttl,
            expires_at: Mutex::new(Utc::now() + self.session_ttl),
        }
    }
}

fn prune_expired(bookings: &mut HashMap<Uuid, Arc<BookingEntry>>, now: DateTime<Utc>) {
    bookings.retain(|id, entry| {
        let expired = entry.is_expired(now);
        if expired {
            log::info!("Booking {} expired", id);
        }
        !expired
    });
}

/// Adds a booking attempt under a fresh id, dropping expired ones
pub fn insert_booking(store: &BookingStore, entry: Arc<BookingEntry>) -> Uuid {
    let id = Uuid::new_v4();
    let mut bookings = store
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    prune_expired(&mut bookings, Utc::now());
    bookings.insert(id, entry);
    id
}

/// Looks a live booking attempt up and extends its time to live
pub fn find_booking(store: &BookingStore, id: &Uuid) -> Result<Arc<BookingEntry>, BookingApiError> {
    let now = Utc::now();
    let mut bookings = store
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    prune_expired(&mut bookings, now);

    let entry = bookings.get(id).cloned().ok_or(BookingApiError::NotFound)?;
    entry.touch(now);
    Ok(entry)
}

/// Discards a booking attempt
pub fn remove_booking(store: &BookingStore, id: &Uuid) -> Result<(), BookingApiError> {
    store
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .remove(id)
        .map(|_| ())
        .ok_or(BookingApiError::NotFound)
}
