//! # comreg-api — Axum API Service for the COMREG Compliance Registry
//!
//! Tracks regulatory licenses and financial remittances for client
//! companies: record CRUD with role-scoped visibility, license status
//! derived from expiration dates at write time, dashboard aggregation,
//! and an audit trail written after every mutation.
//!
//! ## API Surface
//!
//! | Prefix                | Module                   | Domain              |
//! |-----------------------|--------------------------|---------------------|
//! | `/v1/companies`       | [`routes::companies`]    | Client companies    |
//! | `/v1/licenses/*`      | [`routes::licenses`]     | Regulatory licenses |
//! | `/v1/remittances/*`   | [`routes::remittances`]  | Remittances         |
//! | `/v1/dashboard/stats` | [`routes::dashboard`]    | Aggregation         |
//! | `/v1/audit`           | [`routes::audit_log`]    | Audit trail         |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → RateLimitMiddleware → Handler
//! ```

pub mod audit;
pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();
    let limiter = RateLimiter::new(RateLimitConfig::default());

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::companies::router())
        .merge(routes::licenses::router())
        .merge(routes::remittances::router())
        .merge(routes::dashboard::router())
        .merge(routes::audit_log::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .layer(axum::Extension(limiter))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
