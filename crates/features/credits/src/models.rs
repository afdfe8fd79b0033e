use crate::ledger::{LedgerSummary, TransactionRecord};
use crate::packages::PackageRecord;
use chrono::{DateTime, Utc};
use lvai_kernel::prelude::*;
use utoipa::IntoParams;

#[api_model]
pub struct BalanceResponse {
    pub success: bool,
    pub message: String,
    pub credits: i64,
    pub user_id: String,
}

#[api_model]
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionQuery {
    /// `initial`, `purchase`, `recommendation`, `refund`, `bonus` or `admin`
    pub transaction_type: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[api_model]
/// One ledger entry
pub struct TransactionResponse {
    pub id: String,
    pub user_id: String,
    pub transaction_type: String,
    /// Positive for credits, negative for debits
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub description: Option<String>,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&TransactionRecord> for TransactionResponse {
    fn from(entry: &TransactionRecord) -> Self {
        Self {
            id: entry.uid.clone(),
            user_id: entry.user_id.clone(),
            transaction_type: entry.transaction_type.clone(),
            amount: entry.amount,
            balance_before: entry.balance_before,
            balance_after: entry.balance_after,
            description: entry.description.clone(),
            reference_id: entry.reference_id.clone(),
            reference_type: entry.reference_type.clone(),
            created_at: from_millis(entry.created_at),
        }
    }
}

#[api_model]
pub struct PackageResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i64,
    /// TWD
    pub price: i64,
    pub bonus_credits: i64,
    pub is_active: bool,
    pub sort_order: i64,
}

impl From<&PackageRecord> for PackageResponse {
    fn from(package: &PackageRecord) -> Self {
        Self {
            id: package.uid.clone(),
            name: package.name.clone(),
            description: package.description.clone(),
            credits: package.credits,
            price: package.price,
            bonus_credits: package.bonus_credits,
            is_active: package.is_active,
            sort_order: package.sort_order,
        }
    }
}

#[api_model]
pub struct PurchaseResult {
    pub credits_added: i64,
    pub new_balance: i64,
}

#[api_model]
pub struct SummaryResponse {
    pub current_balance: i64,
    pub total_income: i64,
    pub total_expense: i64,
    pub recommendation_count: i64,
}

impl SummaryResponse {
    #[must_use]
    pub const fn new(current_balance: i64, summary: LedgerSummary) -> Self {
        Self {
            current_balance,
            total_income: summary.income,
            total_expense: summary.expense,
            recommendation_count: summary.recommendations,
        }
    }
}
