//! HTTP middleware: failure responses, CORS headers, request ids and logging

pub mod cors;
pub mod error;
pub mod logging;
