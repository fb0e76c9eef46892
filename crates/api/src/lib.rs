//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Request extractors
//! - Error rendering

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tally_core::reconciliation::ReconciliationEngine;
use tally_core::reports::{SummaryBuilder, TrialBalanceBuilder};
use tally_db::{AccountRepository, LedgerRepository, ReconciliationRepository};
use tally_shared::{JwtService, LedgerConfig};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Tolerances and listing limits.
    pub ledger: Arc<LedgerConfig>,
}

impl AppState {
    /// Account repository over the shared pool.
    #[must_use]
    pub fn accounts(&self) -> AccountRepository {
        AccountRepository::new((*self.db).clone())
    }

    /// Ledger repository over the shared pool.
    #[must_use]
    pub fn ledger_repo(&self) -> LedgerRepository {
        LedgerRepository::new((*self.db).clone())
    }

    /// Reconciliation repository using the configured tolerance.
    #[must_use]
    pub fn reconciliations(&self) -> ReconciliationRepository {
        ReconciliationRepository::new((*self.db).clone(), self.reconciliation_engine())
    }

    /// Reconciliation engine using the configured tolerance.
    #[must_use]
    pub fn reconciliation_engine(&self) -> ReconciliationEngine {
        ReconciliationEngine::new(self.ledger.balance_tolerance())
    }

    /// Trial balance builder using the configured tolerances.
    #[must_use]
    pub fn trial_balance_builder(&self) -> TrialBalanceBuilder {
        TrialBalanceBuilder::new(
            self.ledger.balance_tolerance(),
            self.ledger.zero_balance_threshold(),
        )
    }

    /// Balance summary builder using the configured tolerance.
    #[must_use]
    pub fn summary_builder(&self) -> SummaryBuilder {
        SummaryBuilder::new(self.ledger.balance_tolerance())
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
