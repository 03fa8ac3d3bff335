use serde::{Deserialize, Serialize};

use crate::models::domain::MatchResult;

/// One pair in the V1 response envelope, identifiers only
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairIds {
    pub employee1_id: i64,
    pub employee2_id: i64,
}

/// Derived metrics attached to the V1 response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchMeta {
    pub total_employees: usize,
    pub total_pairs: usize,
    pub unmatched_count: usize,
    pub unmatched_ids: Vec<i64>,
    pub success_rate: f64,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// V1 response envelope for matching endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub request_id: String,
    pub status: String,
    pub error: Option<String>,
    pub algorithm: Option<String>,
    pub pairs: Vec<PairIds>,
    pub meta: Option<MatchMeta>,
}

impl MatchResponse {
    pub fn success(result: &MatchResult) -> Self {
        let pairs = result
            .pairs
            .iter()
            .map(|pair| PairIds {
                employee1_id: pair.employee1.id,
                employee2_id: pair.employee2.id,
            })
            .collect();

        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            status: "ok".to_string(),
            error: None,
            algorithm: Some(result.algorithm.clone()),
            pairs,
            meta: Some(MatchMeta {
                total_employees: result.total_employees,
                total_pairs: result.total_pairs,
                unmatched_count: result.unmatched.len(),
                unmatched_ids: result.unmatched.iter().map(|emp| emp.id).collect(),
                success_rate: result.success_rate,
                generated_at: result.created_at,
            }),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            status: "error".to_string(),
            error: Some(error.into()),
            algorithm: None,
            pairs: vec![],
            meta: None,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
