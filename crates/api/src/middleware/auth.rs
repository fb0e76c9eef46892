//! Authentication middleware and role capabilities for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde_json::json;
use tally_shared::{AppError, Claims, JwtError};
use tally_shared::types::UserId;
use tracing::{debug, warn};

use crate::AppState;
use crate::error::ApiError;

/// Authentication middleware that validates JWT tokens.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token using the JWT service
/// 3. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>()
    else {
        return unauthorized("missing_token", "Authorization header with Bearer token is required");
    };

    match state.jwt_service.validate_token(bearer.token()) {
        Ok(claims) => {
            debug!(user_id = %claims.sub, role = %claims.role, "Authenticated request");
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(JwtError::Expired) => unauthorized("token_expired", "Token has expired"),
        Err(e) => {
            warn!(error = %e, "Rejected bearer token");
            unauthorized("invalid_token", "Invalid or malformed token")
        }
    }
}

fn unauthorized(error: &str, message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": error, "message": message })),
    )
        .into_response()
}

/// What a role may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Read accounts, balances, reports and reconciliations.
    ReadLedger,
    /// Create, edit and delete accounts.
    ManageAccounts,
    /// Create, edit, reconcile, reset and delete reconciliations.
    ManageReconciliations,
}

impl Capability {
    /// Returns true if `role` grants this capability.
    ///
    /// - `admin`, `accountant`: everything
    /// - `viewer`: read only
    #[must_use]
    pub fn granted_to(self, role: &str) -> bool {
        match role {
            "admin" | "accountant" => true,
            "viewer" => self == Self::ReadLedger,
            _ => false,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::ReadLedger => "read the ledger",
            Self::ManageAccounts => "manage accounts",
            Self::ManageReconciliations => "manage reconciliations",
        }
    }
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::from_uuid(self.0.user_id())
    }

    /// Returns the user's role.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.0.role
    }

    /// Checks that the user's role grants `capability`.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` otherwise.
    pub fn require(&self, capability: Capability) -> Result<(), ApiError> {
        if capability.granted_to(self.role()) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role '{}' is not allowed to {}",
                self.role(),
                capability.as_str()
            ))
            .into())
        }
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()).into())
    }
}
