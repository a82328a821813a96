//! HTTP surface for the honeypot.

pub mod routes;

pub use routes::{AppState, HoneypotRequest, HoneypotResponse, honeypot_routes};
