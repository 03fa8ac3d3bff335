use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::watch;

use crate::models::Employee;

/// Env var naming the file the service token is read from when not configured directly
pub const TOKEN_FILE_ENV: &str = "ROSTER_SERVICE_TOKEN_FILE";
/// Default token file mount point (Docker secrets)
pub const DEFAULT_TOKEN_FILE: &str = "/run/secrets/service_auth_token";

const EMPLOYEES_PATH: &str = "/api/v1/data/employees-for-matching";
const HEALTH_PATH: &str = "/api/v1/data/health";

/// Errors that can occur when talking to the roster Data API
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to serialize request payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("data api unavailable after {attempts} attempts: {last_error}")]
    Unavailable { attempts: u32, last_error: String },

    #[error("interrupted while waiting to retry")]
    Interrupted,
}

/// Roster payload returned by the Data API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterResponse {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

/// Roster Data API client
///
/// Fetches employee rosters with bounded retry and exponential backoff, and
/// reports upstream reachability. Holds only immutable configuration after
/// construction; the service token is resolved once, never re-read.
pub struct RosterClient {
    base_url: String,
    service_token: Option<String>,
    max_attempts: u32,
    base_backoff: Duration,
    client: Client,
    shutdown: Option<watch::Receiver<bool>>,
}

impl RosterClient {
    /// Create a client with the default per-attempt timeouts
    pub fn new(
        base_url: impl Into<String>,
        service_token: Option<String>,
        max_attempts: u32,
        base_backoff_ms: u64,
    ) -> Self {
        Self::with_timeouts(
            base_url,
            service_token,
            max_attempts,
            base_backoff_ms,
            Duration::from_millis(2000),
            Duration::from_millis(5000),
        )
    }

    /// Create a client with explicit connect and request timeouts
    ///
    /// Timeouts are set once here and apply identically to every attempt.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        service_token: Option<String>,
        max_attempts: u32,
        base_backoff_ms: u64,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_token,
            max_attempts: max_attempts.max(1),
            base_backoff: Duration::from_millis(base_backoff_ms),
            client,
            shutdown: None,
        }
    }

    /// Attach a shutdown signal that aborts a backoff wait
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Fetch a roster for matching, retrying with exponential backoff
    ///
    /// The parameter bag is forwarded verbatim as the JSON request body. A
    /// serialization failure surfaces before any network call and is not
    /// retried. Transport failures, non-2xx statuses and body-decode failures
    /// all consume one attempt; once attempts are exhausted the last cause
    /// is surfaced as `Unavailable`.
    pub async fn fetch_roster(
        &self,
        params: &Map<String, Value>,
    ) -> Result<RosterResponse, UpstreamError> {
        let url = format!("{}{}", self.base_url, EMPLOYEES_PATH);
        let body = serde_json::to_string(params)?;

        tracing::debug!("Sending roster request to {} ({} bytes)", url, body.len());

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.attempt_fetch(&url, &body).await {
                Ok(roster) => {
                    tracing::debug!(
                        "Roster fetch succeeded on attempt {}: {} employees",
                        attempt,
                        roster.employees.len()
                    );
                    return Ok(roster);
                }
                Err(cause) => {
                    tracing::warn!("Roster fetch attempt {} failed: {}", attempt, cause);
                    if attempt >= self.max_attempts {
                        tracing::error!("Roster fetch exhausted {} attempts", self.max_attempts);
                        return Err(UpstreamError::Unavailable {
                            attempts: attempt,
                            last_error: cause,
                        });
                    }
                    self.backoff(attempt).await?;
                }
            }
        }
    }

    async fn attempt_fetch(&self, url: &str, body: &str) -> Result<RosterResponse, String> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string());
        if let Some(token) = &self.service_token {
            request = request.header(AUTHORIZATION, format!("Service {}", token));
        }

        let response = request.send().await.map_err(|err| err.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("non-2xx response from data api: {}", status));
        }

        response
            .json::<RosterResponse>()
            .await
            .map_err(|err| format!("failed to decode roster payload: {}", err))
    }

    /// Wait `base_backoff * 2^(attempt-1)`, aborting on a shutdown signal
    async fn backoff(&self, attempt: u32) -> Result<(), UpstreamError> {
        let delay = self.base_backoff * (1u32 << (attempt - 1).min(31));
        tracing::debug!("Backing off {:?} before attempt {}", delay, attempt + 1);

        match self.shutdown.clone() {
            Some(mut shutdown) => {
                if *shutdown.borrow() {
                    return Err(UpstreamError::Interrupted);
                }
                tokio::select! {
                    _ = tokio::time::sleep(delay) => Ok(()),
                    _ = shutdown.changed() => {
                        tracing::warn!("Shutdown observed during backoff, aborting roster fetch");
                        Err(UpstreamError::Interrupted)
                    }
                }
            }
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }

    /// Probe the Data API health endpoint
    ///
    /// Any failure is reported as unreachable, never propagated.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let mut request = self.client.get(&url);
        if let Some(token) = &self.service_token {
            request = request.header(AUTHORIZATION, format!("Service {}", token));
        }

        match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                tracing::warn!("Data API health check failed: {}", err);
                false
            }
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.service_token.is_some()
    }
}

/// Resolve the service token from configuration or the secrets file
///
/// A directly configured non-empty token wins. Otherwise the file named by
/// `ROSTER_SERVICE_TOKEN_FILE` (default `/run/secrets/service_auth_token`)
/// is read once, with BOM and newline stripping plus whitespace trimming.
pub fn resolve_service_token(configured: Option<&str>) -> Option<String> {
    if let Some(token) = configured {
        let trimmed = token.trim();
        if !trimmed.is_empty() {
            return Some(trimmed.to_string());
        }
    }

    let path = std::env::var(TOKEN_FILE_ENV).unwrap_or_else(|_| DEFAULT_TOKEN_FILE.to_string());
    read_token_file(&path)
}

fn read_token_file(path: &str) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(raw) => {
            let token = normalize_token(&raw);
            if token.is_empty() {
                None
            } else {
                tracing::info!(
                    "Loaded data api service token from {} mask={} len={}",
                    path,
                    mask_token(&token),
                    token.len()
                );
                Some(token)
            }
        }
        Err(err) => {
            tracing::debug!("Service token file not available at {}: {}", path, err);
            None
        }
    }
}

fn normalize_token(raw: &str) -> String {
    raw.replace('\u{feff}', "")
        .replace('\r', "")
        .replace('\n', "")
        .trim()
        .to_string()
}

fn mask_token(token: &str) -> String {
    if token.len() <= 8 {
        "<redacted>".to_string()
    } else {
        let prefix: String = token.chars().take(8).collect();
        format!("{}...", prefix)
    }
}
