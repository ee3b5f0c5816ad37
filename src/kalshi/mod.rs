//! Kalshi module - execution adapter for the Kalshi trade API

pub mod auth;
pub mod messages;
pub mod rest;

pub use auth::KalshiAuth;
pub use rest::KalshiRestClient;
