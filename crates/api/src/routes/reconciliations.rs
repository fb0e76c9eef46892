//! Bank reconciliation routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_core::reconciliation::{
    Adjustments, ReconciliationDraft, ReconciliationResult, ReconciliationStatus, StatementFigures,
};
use tally_db::repositories::{ReconciliationFilter, ReconciliationInput, StoredReconciliation};
use tally_shared::types::money::{serde_amount, validate_amount};
use tally_shared::types::{AccountId, PageRequest, PageResponse, ReconciliationId, UserId};
use tracing::info;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::{ApiPath, ApiQuery, ValidatedJson, trimmed};
use crate::middleware::{AuthUser, Capability};

/// Creates the reconciliation routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reconciliations",
            get(list_reconciliations).post(create_reconciliation),
        )
        .route("/reconciliations/preview", post(preview_reconciliation))
        .route(
            "/reconciliations/{reconciliation_id}",
            get(get_reconciliation)
                .put(update_reconciliation)
                .delete(delete_reconciliation),
        )
        .route(
            "/reconciliations/{reconciliation_id}/reconcile",
            post(reconcile_reconciliation),
        )
        .route(
            "/reconciliations/{reconciliation_id}/reset",
            post(reset_reconciliation),
        )
}

fn non_negative_amount(value: &Decimal) -> Result<(), ValidationError> {
    validate_amount(value)?;
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Query parameters for listing reconciliations.
#[derive(Debug, Default, Deserialize)]
pub struct ListReconciliationsQuery {
    /// Filter by bank account.
    #[serde(default)]
    pub bank_account_id: Option<Uuid>,
    /// Filter by status.
    #[serde(default)]
    pub status: Option<ReconciliationStatus>,
    /// Page number (1-indexed).
    #[serde(default)]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(default)]
    pub per_page: Option<u32>,
}

/// Request body for creating, updating or previewing a reconciliation.
#[derive(Debug, Deserialize, Validate)]
pub struct ReconciliationRequest {
    /// Bank or cash account being reconciled.
    pub bank_account_id: Uuid,
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Statement number.
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 100, message = "statement_number must be 1-100 characters"))]
    pub statement_number: String,
    /// Statement opening balance.
    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub opening_balance: Decimal,
    /// Statement closing balance.
    #[validate(custom(function = "validate_amount"))]
    pub closing_balance: Decimal,
    /// Deposits not yet on the statement.
    #[serde(default)]
    #[validate(custom(function = "non_negative_amount"))]
    pub deposits_in_transit: Decimal,
    /// Checks not yet cleared.
    #[serde(default)]
    #[validate(custom(function = "non_negative_amount"))]
    pub outstanding_checks: Decimal,
    /// Bank fees.
    #[serde(default)]
    #[validate(custom(function = "non_negative_amount"))]
    pub bank_charges: Decimal,
    /// Interest credited by the bank.
    #[serde(default)]
    #[validate(custom(function = "non_negative_amount"))]
    pub interest_earned: Decimal,
    /// Signed catch-all adjustment.
    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub other_adjustments: Decimal,
    /// Book balance; computed from the ledger as of the statement date when omitted.
    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub book_balance: Option<Decimal>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl ReconciliationRequest {
    fn into_input(self) -> ReconciliationInput {
        ReconciliationInput {
            bank_account_id: AccountId::from_uuid(self.bank_account_id),
            statement_date: self.statement_date,
            statement_number: self.statement_number,
            statement: StatementFigures {
                opening_balance: self.opening_balance,
                closing_balance: self.closing_balance,
                adjustments: Adjustments {
                    deposits_in_transit: self.deposits_in_transit,
                    outstanding_checks: self.outstanding_checks,
                    bank_charges: self.bank_charges,
                    interest_earned: self.interest_earned,
                    other_adjustments: self.other_adjustments,
                },
            },
            book_balance: self.book_balance,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Statement fields echoed in responses.
#[derive(Debug, Serialize)]
pub struct StatementResponse {
    /// Bank or cash account being reconciled.
    pub bank_account_id: AccountId,
    /// Statement date.
    pub statement_date: NaiveDate,
    /// Statement number.
    pub statement_number: String,
    /// Statement figures and adjustments.
    #[serde(flatten)]
    pub statement: StatementFigures,
    /// Notes.
    pub notes: Option<String>,
}

impl From<ReconciliationDraft> for StatementResponse {
    fn from(draft: ReconciliationDraft) -> Self {
        Self {
            bank_account_id: draft.bank_account_id,
            statement_date: draft.statement_date,
            statement_number: draft.statement_number,
            statement: draft.statement,
            notes: draft.notes,
        }
    }
}

/// Figures derived from the book balance and the statement.
///
/// The closing balance is part of [`StatementResponse`].
#[derive(Debug, Serialize)]
pub struct ComputedResponse {
    /// Book balance the comparison started from.
    #[serde(with = "serde_amount")]
    pub book_balance: Decimal,
    /// Book balance after adjustments.
    #[serde(with = "serde_amount")]
    pub adjusted_balance: Decimal,
    /// `adjusted_balance - closing_balance`.
    #[serde(with = "serde_amount")]
    pub difference: Decimal,
    /// Whether the difference is within tolerance.
    pub is_balanced: bool,
}

impl From<ReconciliationResult> for ComputedResponse {
    fn from(result: ReconciliationResult) -> Self {
        Self {
            book_balance: result.book_balance,
            adjusted_balance: result.adjusted_balance,
            difference: result.difference,
            is_balanced: result.is_balanced,
        }
    }
}

/// A stored reconciliation.
#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    /// Record ID.
    pub id: ReconciliationId,
    /// Statement fields.
    #[serde(flatten)]
    pub statement: StatementResponse,
    /// Computed figures.
    #[serde(flatten)]
    pub result: ComputedResponse,
    /// Lifecycle status.
    pub status: ReconciliationStatus,
    /// Whether the record is reconciled.
    pub is_reconciled: bool,
    /// When the record was reconciled.
    pub reconciled_at: Option<DateTime<Utc>>,
    /// Who reconciled the record.
    pub reconciled_by: Option<UserId>,
    /// Who created the record.
    pub created_by: UserId,
}

impl From<StoredReconciliation> for ReconciliationResponse {
    fn from(stored: StoredReconciliation) -> Self {
        let record = stored.record;
        Self {
            id: record.id,
            statement: record.draft.into(),
            result: stored.result.into(),
            is_reconciled: record.status == ReconciliationStatus::Reconciled,
            status: record.status,
            reconciled_at: record.reconciled_at,
            reconciled_by: record.reconciled_by,
            created_by: record.created_by,
        }
    }
}

/// Computed figures for an unsaved reconciliation.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    /// Statement fields.
    #[serde(flatten)]
    pub statement: StatementResponse,
    /// Computed figures.
    #[serde(flatten)]
    pub result: ComputedResponse,
}

/// Lists reconciliations, newest statement first.
async fn list_reconciliations(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListReconciliationsQuery>,
) -> ApiResult<Json<PageResponse<ReconciliationResponse>>> {
    auth.require(Capability::ReadLedger)?;

    let filter = ReconciliationFilter {
        bank_account_id: query.bank_account_id.map(AccountId::from_uuid),
        status: query.status,
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(state.ledger.default_per_page),
    }
    .clamped(state.ledger.max_per_page);
    let (page_number, per_page) = (page.page, page.per_page);

    let result = state.reconciliations().list(filter, page).await?;
    let data = result.items.into_iter().map(Into::into).collect();

    Ok(Json(PageResponse::new(data, page_number, per_page, result.total)))
}

/// Gets a reconciliation.
async fn get_reconciliation(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(reconciliation_id): ApiPath<Uuid>,
) -> ApiResult<Json<ReconciliationResponse>> {
    auth.require(Capability::ReadLedger)?;

    let stored = state
        .reconciliations()
        .get(ReconciliationId::from_uuid(reconciliation_id))
        .await?;
    Ok(Json(stored.into()))
}

/// Creates a draft reconciliation.
async fn create_reconciliation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<ReconciliationRequest>,
) -> ApiResult<(StatusCode, Json<ReconciliationResponse>)> {
    auth.require(Capability::ManageReconciliations)?;

    let stored = state
        .reconciliations()
        .create(payload.into_input(), auth.user_id())
        .await?;
    info!(
        reconciliation_id = %stored.record.id,
        user_id = %auth.user_id(),
        "Reconciliation created via API"
    );

    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// Computes a reconciliation without saving it.
async fn preview_reconciliation(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<ReconciliationRequest>,
) -> ApiResult<Json<PreviewResponse>> {
    auth.require(Capability::ReadLedger)?;

    let (draft, result) = state.reconciliations().preview(payload.into_input()).await?;
    Ok(Json(PreviewResponse {
        statement: draft.into(),
        result: result.into(),
    }))
}

/// Replaces the fields of a draft reconciliation.
async fn update_reconciliation(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(reconciliation_id): ApiPath<Uuid>,
    ValidatedJson(payload): ValidatedJson<ReconciliationRequest>,
) -> ApiResult<Json<ReconciliationResponse>> {
    auth.require(Capability::ManageReconciliations)?;

    let stored = state
        .reconciliations()
        .update(ReconciliationId::from_uuid(reconciliation_id), payload.into_input())
        .await?;
    info!(
        reconciliation_id = %reconciliation_id,
        user_id = %auth.user_id(),
        "Reconciliation updated via API"
    );

    Ok(Json(stored.into()))
}

/// Marks a balanced draft as reconciled.
async fn reconcile_reconciliation(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(reconciliation_id): ApiPath<Uuid>,
) -> ApiResult<Json<ReconciliationResponse>> {
    auth.require(Capability::ManageReconciliations)?;

    let stored = state
        .reconciliations()
        .reconcile(ReconciliationId::from_uuid(reconciliation_id), auth.user_id())
        .await?;
    Ok(Json(stored.into()))
}

/// Returns a reconciled record to draft.
async fn reset_reconciliation(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(reconciliation_id): ApiPath<Uuid>,
) -> ApiResult<Json<ReconciliationResponse>> {
    auth.require(Capability::ManageReconciliations)?;

    let stored = state
        .reconciliations()
        .reset(ReconciliationId::from_uuid(reconciliation_id))
        .await?;
    Ok(Json(stored.into()))
}

/// Deletes a draft reconciliation.
async fn delete_reconciliation(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(reconciliation_id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require(Capability::ManageReconciliations)?;

    state
        .reconciliations()
        .delete(ReconciliationId::from_uuid(reconciliation_id))
        .await?;
    info!(
        reconciliation_id = %reconciliation_id,
        user_id = %auth.user_id(),
        "Reconciliation deleted via API"
    );

    Ok(StatusCode::NO_CONTENT)
}
