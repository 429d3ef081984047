//! # Reservation Client
//!
//! This crate provides an HTTP client for the campground reservation backend. It
//! implements the booking wizard's availability and reservation gateways on top of
//! the backend's REST API.

/// Client configuration loaded from the environment
mod client_config;
pub use client_config::*;

/// reqwest based gateway implementation
mod reservation_api_client;
pub use reservation_api_client::*;
