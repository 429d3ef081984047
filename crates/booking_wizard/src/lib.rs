//! # Booking Wizard
//!
//! This crate implements the campground booking flow: a five-step wizard that
//! collects dates and a site type, searches availability, lets the guest pick a
//! site from a filtered and paginated list, collects guest, party and vehicle
//! details, prices the stay and submits the reservation.
//!
//! Everything that talks to the outside world (availability search, reservation
//! creation, user notifications) is injected through traits so the wizard can be
//! driven from any UI adapter or from tests.

/// Session, site and error types shared by the wizard
mod booking_types;
pub use booking_types::*;

/// Field-level validators and per-step validation rules
pub mod validation;
pub use validation::{FieldValidator, RegexFieldValidator};

/// Availability and reservation gateway traits
mod gateway;
pub use gateway::*;

/// User-facing notification sinks
mod notification;
pub use notification::*;

/// Reservation request and response types
mod reservation;
pub use reservation::*;

/// Location filter and pagination over availability results
mod site_pager;
pub use site_pager::*;

/// Nightly, add-on and deposit pricing
mod pricing;
pub use pricing::*;

/// Final guard and submission of a completed booking
mod submitter;
pub use submitter::*;

/// The step-by-step booking state machine
mod wizard;
pub use wizard::*;
