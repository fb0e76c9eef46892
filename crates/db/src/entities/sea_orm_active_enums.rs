//! Postgres enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::ledger::AccountType as CoreAccountType;
use tally_core::reconciliation::ReconciliationStatus as CoreReconciliationStatus;

/// `account_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    /// Asset.
    #[sea_orm(string_value = "asset")]
    Asset,
    /// Liability.
    #[sea_orm(string_value = "liability")]
    Liability,
    /// Equity.
    #[sea_orm(string_value = "equity")]
    Equity,
    /// Income.
    #[sea_orm(string_value = "income")]
    Income,
    /// Expense.
    #[sea_orm(string_value = "expense")]
    Expense,
}

impl From<AccountType> for CoreAccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Asset => Self::Asset,
            AccountType::Liability => Self::Liability,
            AccountType::Equity => Self::Equity,
            AccountType::Income => Self::Income,
            AccountType::Expense => Self::Expense,
        }
    }
}

impl From<CoreAccountType> for AccountType {
    fn from(value: CoreAccountType) -> Self {
        match value {
            CoreAccountType::Asset => Self::Asset,
            CoreAccountType::Liability => Self::Liability,
            CoreAccountType::Equity => Self::Equity,
            CoreAccountType::Income => Self::Income,
            CoreAccountType::Expense => Self::Expense,
        }
    }
}

/// `reconciliation_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "reconciliation_status"
)]
pub enum ReconciliationStatus {
    /// Draft.
    #[sea_orm(string_value = "draft")]
    Draft,
    /// Reconciled.
    #[sea_orm(string_value = "reconciled")]
    Reconciled,
}

impl From<ReconciliationStatus> for CoreReconciliationStatus {
    fn from(value: ReconciliationStatus) -> Self {
        match value {
            ReconciliationStatus::Draft => Self::Draft,
            ReconciliationStatus::Reconciled => Self::Reconciled,
        }
    }
}

impl From<CoreReconciliationStatus> for ReconciliationStatus {
    fn from(value: CoreReconciliationStatus) -> Self {
        match value {
            CoreReconciliationStatus::Draft => Self::Draft,
            CoreReconciliationStatus::Reconciled => Self::Reconciled,
        }
    }
}
