use actix_web::{web, HttpResponse, Responder};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{Map, Value};
use std::sync::Arc;
use validator::Validate;

use crate::core::PairingEngine;
use crate::models::{
    Employee, ErrorResponse, HealthResponse, InterestQuery, MatchPolicy, MatchRequest,
    MatchResponse, MatchResult, PairingError,
};
use crate::services::{RosterClient, UpstreamError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<RosterClient>,
    pub engine: PairingEngine,
}

/// Configure the V1 matching routes
pub fn configure_v1(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/match/secret-coffee", web::post().to(secret_coffee))
        .route(
            "/match/secret-coffee/from-api",
            web::post().to(secret_coffee_from_api),
        );
}

/// Configure the legacy per-policy routes
pub fn configure_legacy(cfg: &mut web::ServiceConfig) {
    cfg.route("/coffee/simple", web::post().to(simple_matching))
        .route("/coffee/interest", web::post().to(interest_matching))
        .route(
            "/coffee/cross-department",
            web::post().to(cross_department_matching),
        )
        .route("/algorithms", web::get().to(available_algorithms));
}

/// Health check endpoint reflecting Data API reachability
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let upstream_healthy = state.roster.health_check().await;

    let response = HealthResponse {
        status: if upstream_healthy { "OK" } else { "DEGRADED" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    };

    if upstream_healthy {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn run_policy(
    engine: &PairingEngine,
    employees: &[Employee],
    policy: MatchPolicy,
    interest: Option<&str>,
    seed: Option<u64>,
) -> Result<MatchResult, PairingError> {
    let mut rng = build_rng(seed);
    match policy {
        MatchPolicy::Simple => engine.random_pairing(employees, &mut rng),
        MatchPolicy::InterestBased => {
            engine.interest_pairing(employees, interest.unwrap_or("coffee"), &mut rng)
        }
        MatchPolicy::CrossDepartment => engine.cross_department_pairing(employees),
    }
}

/// Run the secret-coffee pairing over a caller-supplied roster
///
/// POST /api/v1/matching/match/secret-coffee
async fn secret_coffee(
    state: web::Data<AppState>,
    req: web::Json<MatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::warn!("Secret-coffee request rejected: {}", errors);
        return HttpResponse::BadRequest().json(MatchResponse::failure("roster must not be empty"));
    }

    tracing::info!(
        "Secret-coffee request received for {} employees, policy {:?}",
        req.employees.len(),
        req.algorithm
    );

    match run_policy(
        &state.engine,
        &req.employees,
        req.algorithm,
        req.interest.as_deref(),
        req.seed,
    ) {
        Ok(result) => {
            tracing::info!(
                "Secret-coffee pairing produced {} pairs, {} unmatched",
                result.total_pairs,
                result.unmatched.len()
            );
            HttpResponse::Ok().json(MatchResponse::success(&result))
        }
        Err(err) => {
            tracing::warn!("Secret-coffee pairing rejected roster: {}", err);
            HttpResponse::BadRequest().json(MatchResponse::failure(err.to_string()))
        }
    }
}

/// Pull the roster from the Data API, then run the random pairing
///
/// POST /api/v1/matching/match/secret-coffee/from-api
async fn secret_coffee_from_api(
    state: web::Data<AppState>,
    params: web::Json<Map<String, Value>>,
) -> impl Responder {
    let roster = match state.roster.fetch_roster(&params).await {
        Ok(roster) => roster,
        Err(err) => {
            tracing::error!("Data API error during matching-from-api: {}", err);
            let mut builder = match &err {
                UpstreamError::Unavailable { .. } => HttpResponse::BadGateway(),
                UpstreamError::Interrupted => HttpResponse::ServiceUnavailable(),
                UpstreamError::Serialization(_) => HttpResponse::InternalServerError(),
            };
            return builder.json(MatchResponse::failure(err.to_string()));
        }
    };

    tracing::info!(
        "Fetched {} employees from the data api (generated_at: {:?})",
        roster.employees.len(),
        roster.generated_at
    );

    let mut rng = build_rng(None);
    match state.engine.random_pairing(&roster.employees, &mut rng) {
        Ok(result) => HttpResponse::Ok().json(MatchResponse::success(&result)),
        Err(err) => {
            tracing::warn!("Pairing rejected fetched roster: {}", err);
            HttpResponse::BadRequest().json(MatchResponse::failure(err.to_string()))
        }
    }
}

fn pairing_error_response(err: &PairingError) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "invalid_roster".to_string(),
        message: err.to_string(),
        status_code: 400,
    })
}

/// Legacy: random pairing over a bare roster body
///
/// POST /api/matching/coffee/simple
async fn simple_matching(
    state: web::Data<AppState>,
    employees: web::Json<Vec<Employee>>,
) -> impl Responder {
    tracing::info!("Simple matching request for {} employees", employees.len());

    let mut rng = build_rng(None);
    match state.engine.random_pairing(&employees, &mut rng) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(err) => pairing_error_response(&err),
    }
}

/// Legacy: interest-filtered pairing, interest via query parameter
///
/// POST /api/matching/coffee/interest?interest=coffee
async fn interest_matching(
    state: web::Data<AppState>,
    employees: web::Json<Vec<Employee>>,
    query: web::Query<InterestQuery>,
) -> impl Responder {
    tracing::info!(
        "Interest matching request for interest '{}' and {} employees",
        query.interest,
        employees.len()
    );

    let mut rng = build_rng(None);
    match state
        .engine
        .interest_pairing(&employees, &query.interest, &mut rng)
    {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(err) => pairing_error_response(&err),
    }
}

/// Legacy: cross-department pairing over a bare roster body
///
/// POST /api/matching/coffee/cross-department
async fn cross_department_matching(
    state: web::Data<AppState>,
    employees: web::Json<Vec<Employee>>,
) -> impl Responder {
    tracing::info!(
        "Cross-department matching request for {} employees",
        employees.len()
    );

    match state.engine.cross_department_pairing(&employees) {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(err) => pairing_error_response(&err),
    }
}

/// Legacy: catalog of the available pairing policies
///
/// GET /api/matching/algorithms
async fn available_algorithms() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "algorithms": {
            "simple": {
                "name": "Simple random matching",
                "description": "Uniformly random shuffle and consecutive pairing",
                "endpoint": "/api/matching/coffee/simple",
                "method": "POST",
            },
            "interest_based": {
                "name": "Interest-based matching",
                "description": "Pairs employees sharing a common interest tag",
                "endpoint": "/api/matching/coffee/interest",
                "method": "POST",
            },
            "cross_department": {
                "name": "Cross-department matching",
                "description": "Pairs employees from different departments",
                "endpoint": "/api/matching/coffee/cross-department",
                "method": "POST",
            },
        },
        "total": 3,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
