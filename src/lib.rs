//! Payment initiation backend for the food-sharing marketplace.
//!
//! `process-payment` authenticates the caller, validates the payer's details,
//! asks IntaSend for an M-Pesa push prompt and records the transaction under
//! the verified user.

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod payments;
pub mod services;
