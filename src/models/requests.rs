use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{Employee, MatchPolicy};

/// Request to run a secret-coffee pairing over a caller-supplied roster
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchRequest {
    #[validate(length(min = 1))]
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub algorithm: MatchPolicy,
    /// Interest tag for the interest-based policy
    #[serde(default)]
    pub interest: Option<String>,
    /// Fixed RNG seed; omitted means OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Query parameters for the legacy interest endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestQuery {
    #[serde(default = "default_interest")]
    pub interest: String,
}

pub fn default_interest() -> String {
    "coffee".to_string()
}
