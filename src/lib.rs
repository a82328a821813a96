//! Scam honeypot: engages scam senders, stalls them, and reports what they leak.

pub mod config;
pub mod detection;
pub mod engagement;
pub mod error;
pub mod intelligence;
pub mod report;
pub mod server;
