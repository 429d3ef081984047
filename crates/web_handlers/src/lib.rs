//! # Web Handlers for the Campground Booking Wizard
//!
//! This crate exposes the booking wizard over HTTP. Each booking attempt lives in
//! an in-memory store keyed by UUID and is driven by posting wizard commands.

/// Request, response and error types of the booking API
mod booking_types;
pub use booking_types::*;

/// In-memory store of open booking attempts
mod booking_store;
pub use booking_store::*;

/// Handlers for the booking API endpoints
mod booking_handlers;
pub use booking_handlers::*;
