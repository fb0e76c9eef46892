//! `SeaORM` Entity for bank_reconciliations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::reconciliation::{
    Adjustments, Reconciliation, ReconciliationDraft, StatementFigures,
};
use tally_shared::types::{AccountId, ReconciliationId, UserId};

use super::sea_orm_active_enums::ReconciliationStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_reconciliations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub bank_account_id: Uuid,
    pub statement_date: Date,
    pub statement_number: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub opening_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub closing_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub deposits_in_transit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub outstanding_checks: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub bank_charges: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub interest_earned: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub other_adjustments: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub book_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub adjusted_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub difference: Decimal,
    pub status: ReconciliationStatus,
    pub reconciled_at: Option<DateTimeWithTimeZone>,
    pub reconciled_by: Option<Uuid>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::BankAccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for Reconciliation {
    fn from(model: &Model) -> Self {
        Self {
            id: ReconciliationId::from_uuid(model.id),
            draft: ReconciliationDraft {
                bank_account_id: AccountId::from_uuid(model.bank_account_id),
                statement_date: model.statement_date,
                statement_number: model.statement_number.clone(),
                statement: StatementFigures {
                    opening_balance: model.opening_balance,
                    closing_balance: model.closing_balance,
                    adjustments: Adjustments {
                        deposits_in_transit: model.deposits_in_transit,
                        outstanding_checks: model.outstanding_checks,
                        bank_charges: model.bank_charges,
                        interest_earned: model.interest_earned,
                        other_adjustments: model.other_adjustments,
                    },
                },
                book_balance: model.book_balance,
                notes: model.notes.clone(),
            },
            status: model.status.into(),
            reconciled_at: model.reconciled_at.map(|at| at.to_utc()),
            reconciled_by: model.reconciled_by.map(UserId::from_uuid),
            created_by: UserId::from_uuid(model.created_by),
        }
    }
}
