use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Department label used when an employee has no department assigned
pub const NO_DEPARTMENT: &str = "NO_DEPARTMENT";

/// Errors raised while assembling pairing output
#[derive(Debug, Error)]
pub enum PairingError {
    #[error("invalid pair: employee {0} cannot be paired with itself")]
    SelfPair(i64),
}

/// Employee record as served by the roster Data API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    #[serde(rename = "displayName", alias = "display_name", default)]
    pub display_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(rename = "activeEmployee", alias = "active_employee", default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub interests: Vec<String>,
    // Declared in the contract; no pairing policy consults it
    #[serde(default)]
    pub excluded_partners: Vec<i64>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "employeeNumber", alias = "employee_number", default)]
    pub employee_number: Option<i64>,
}

fn default_true() -> bool {
    true
}

impl Employee {
    pub fn has_interest(&self, interest: &str) -> bool {
        self.interests.iter().any(|tag| tag == interest)
    }

    /// Department label for grouping, absent department mapped to the shared sentinel
    pub fn department_key(&self) -> &str {
        self.department.as_deref().unwrap_or(NO_DEPARTMENT)
    }
}

/// Unordered association of exactly two distinct employees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeePair {
    pub employee1: Employee,
    pub employee2: Employee,
}

impl EmployeePair {
    /// Build a pair, rejecting a self-reference
    pub fn try_new(employee1: Employee, employee2: Employee) -> Result<Self, PairingError> {
        if employee1.id == employee2.id {
            return Err(PairingError::SelfPair(employee1.id));
        }
        Ok(Self {
            employee1,
            employee2,
        })
    }
}

/// Output of one pairing run, metrics computed once at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub pairs: Vec<EmployeePair>,
    pub unmatched: Vec<Employee>,
    pub algorithm: String,
    pub total_employees: usize,
    pub total_pairs: usize,
    pub success_rate: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl MatchResult {
    pub fn new(pairs: Vec<EmployeePair>, unmatched: Vec<Employee>, algorithm: &str) -> Self {
        let total_pairs = pairs.len();
        let total_employees = total_pairs * 2 + unmatched.len();
        let success_rate = if total_employees > 0 {
            (total_pairs * 2) as f64 / total_employees as f64 * 100.0
        } else {
            0.0
        };

        Self {
            pairs,
            unmatched,
            algorithm: algorithm.to_string(),
            total_employees,
            total_pairs,
            success_rate,
            created_at: chrono::Utc::now(),
        }
    }

    /// Number of employees placed into pairs
    pub fn matched_count(&self) -> usize {
        self.total_pairs * 2
    }

    pub fn is_successful(&self) -> bool {
        !self.pairs.is_empty()
    }
}

/// Pairing policy selectable per request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    #[default]
    #[serde(alias = "random", alias = "simple_random")]
    Simple,
    InterestBased,
    CrossDepartment,
}

impl MatchPolicy {
    /// Policy name as reported in results and responses
    pub fn wire_name(&self) -> &'static str {
        match self {
            MatchPolicy::Simple => "SIMPLE_RANDOM",
            MatchPolicy::InterestBased => "INTEREST_BASED",
            MatchPolicy::CrossDepartment => "CROSS_DEPARTMENT",
        }
    }
}
