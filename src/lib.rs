//! Brew Match - secret coffee pairing service for the ConnectHub employee platform
//!
//! This library provides the pairing engine and the resilient roster Data API
//! client used by the secret coffee service. The engine partitions a roster
//! into disjoint pairs under a named policy; the client fetches rosters over
//! HTTP with bounded retries and exponential backoff.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::PairingEngine;
pub use models::{
    Employee, EmployeePair, MatchPolicy, MatchRequest, MatchResponse, MatchResult, PairingError,
};
pub use services::{resolve_service_token, RosterClient, RosterResponse, UpstreamError};
