// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Employee, EmployeePair, MatchPolicy, MatchResult, PairingError, NO_DEPARTMENT};
pub use requests::{InterestQuery, MatchRequest};
pub use responses::{ErrorResponse, HealthResponse, MatchMeta, MatchResponse, PairIds};
