use crate::error::CreditsError;
use lvai_database::{Database, DatabaseError, DatabaseErrorExt};
use lvai_domain::credits::{ReferenceType, TransactionType};
use lvai_kernel::pagination::PageRequest;
use lvai_kernel::safe_nanoid;
use lvai_kernel::time::now_millis;
use surrealdb_types::SurrealValue;
use tracing::debug;

/// A row of the `credit_transaction` table. `balance_after = balance_before + amount`.
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
pub struct TransactionRecord {
    pub uid: String,
    pub user_id: String,
    pub transaction_type: String,
    pub amount: i64,
    pub balance_before: i64,
    pub balance_after: i64,
    pub description: Option<String>,
    pub reference_id: Option<String>,
    pub reference_type: Option<String>,
    pub created_at: i64,
}

/// Entry fields handed to `fn::ledger_apply`; the function fills in amounts and balances.
#[derive(Debug, Clone, SurrealValue)]
struct EntryDraft {
    uid: String,
    transaction_type: String,
    description: Option<String>,
    reference_id: Option<String>,
    reference_type: Option<String>,
    created_at: i64,
}

/// Why credits move.
#[derive(Debug, Clone)]
pub struct LedgerEntry {
    pub transaction_type: TransactionType,
    pub description: Option<String>,
    pub reference: Option<(ReferenceType, String)>,
}

impl LedgerEntry {
    #[must_use]
    pub const fn new(transaction_type: TransactionType) -> Self {
        Self { transaction_type, description: None, reference: None }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn reference(mut self, kind: ReferenceType, id: impl Into<String>) -> Self {
        self.reference = Some((kind, id.into()));
        self
    }

    fn draft(self) -> EntryDraft {
        let (reference_type, reference_id) = match self.reference {
            Some((kind, id)) => (Some(kind.as_ref().to_owned()), Some(id)),
            None => (None, None),
        };
        EntryDraft {
            uid: safe_nanoid!(),
            transaction_type: self.transaction_type.as_ref().to_owned(),
            description: self.description,
            reference_id,
            reference_type,
            created_at: now_millis(),
        }
    }
}

/// Income, spending and usage totals of one account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, SurrealValue)]
pub struct LedgerSummary {
    pub income: i64,
    /// Sum of debits as a positive number.
    pub expense: i64,
    pub recommendations: i64,
}

/// Balance changes of user accounts. Every change writes exactly one ledger entry.
#[derive(Debug, Clone)]
pub struct Ledger {
    db: Database,
}

impl Ledger {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Current balance, `None` for unknown users.
    pub async fn balance(&self, user_id: &str) -> Result<Option<i64>, DatabaseError> {
        let rows = self
            .db
            .query("SELECT VALUE credits FROM user WHERE uid = $user_id LIMIT 1")
            .bind(("user_id", user_id.to_owned()))
            .await
            .context("Loading balance")?
            .take::<Vec<i64>>(0)
            .context("Parsing balance")?;

        Ok(rows.into_iter().next())
    }

    /// Adds `amount` credits and returns the new balance.
    ///
    /// # Errors
    ///
    /// [`CreditsError::InvalidAmount`] unless `amount > 0`, [`CreditsError::UserNotFound`]
    /// for unknown accounts.
    pub async fn credit(
        &self,
        user_id: &str,
        amount: i64,
        entry: LedgerEntry,
    ) -> Result<i64, CreditsError> {
        if amount <= 0 {
            return Err(CreditsError::InvalidAmount { amount });
        }
        self.apply(user_id, amount, entry)
            .await?
            .ok_or_else(|| CreditsError::UserNotFound { user_id: user_id.to_owned() })
    }

    /// Removes `amount` credits and returns the new balance. Never drives a balance negative.
    ///
    /// # Errors
    ///
    /// [`CreditsError::InsufficientCredits`] when the balance is short, plus the
    /// [`Ledger::credit`] errors.
    pub async fn debit(
        &self,
        user_id: &str,
        amount: i64,
        entry: LedgerEntry,
    ) -> Result<i64, CreditsError> {
        if amount <= 0 {
            return Err(CreditsError::InvalidAmount { amount });
        }
        if let Some(balance) = self.apply(user_id, -amount, entry).await? {
            return Ok(balance);
        }

        match self.balance(user_id).await? {
            Some(available) => Err(CreditsError::InsufficientCredits { required: amount, available }),
            None => Err(CreditsError::UserNotFound { user_id: user_id.to_owned() }),
        }
    }

    async fn apply(
        &self,
        user_id: &str,
        amount: i64,
        entry: LedgerEntry,
    ) -> Result<Option<i64>, DatabaseError> {
        let draft = entry.draft();
        debug!(user_id, amount, transaction_type = %draft.transaction_type, "Applying ledger entry");

        self.db
            .query("RETURN fn::ledger_apply($user_id, $amount, $entry)")
            .bind(("user_id", user_id.to_owned()))
            .bind(("amount", amount))
            .bind(("entry", draft))
            .await
            .context("Applying ledger entry")?
            .take::<Option<i64>>(0)
            .context("Applying ledger entry")
    }

    /// One page of a user's entries, newest first, and the total matching count.
    pub async fn transactions(
        &self,
        user_id: &str,
        transaction_type: Option<TransactionType>,
        page: PageRequest,
    ) -> Result<(Vec<TransactionRecord>, u64), DatabaseError> {
        let filter = if transaction_type.is_some() {
            "WHERE user_id = $user_id AND transaction_type = $transaction_type"
        } else {
            "WHERE user_id = $user_id"
        };

        let mut response = self
            .db
            .query(format!(
                "SELECT * OMIT id FROM credit_transaction {filter}
                    ORDER BY created_at DESC LIMIT $limit START $start;
                RETURN array::len(SELECT VALUE uid FROM credit_transaction {filter});"
            ))
            .bind(("user_id", user_id.to_owned()))
            .bind(("transaction_type", transaction_type.map(|t| t.as_ref().to_owned())))
            .bind(("limit", page.limit()))
            .bind(("start", page.offset()))
            .await
            .context("Listing transactions")?;

        let entries = response.take::<Vec<TransactionRecord>>(0).context("Parsing transactions")?;
        let total = response.take::<Option<i64>>(1).context("Counting transactions")?;

        Ok((entries, total.and_then(|t| u64::try_from(t).ok()).unwrap_or_default()))
    }

    pub async fn summary(&self, user_id: &str) -> Result<LedgerSummary, DatabaseError> {
        let summary = self
            .db
            .query(
                "RETURN {
                    income: math::sum(SELECT VALUE amount FROM credit_transaction
                        WHERE user_id = $user_id AND amount > 0),
                    expense: math::abs(math::sum(SELECT VALUE amount FROM credit_transaction
                        WHERE user_id = $user_id AND amount < 0)),
                    recommendations: array::len(SELECT VALUE uid FROM credit_transaction
                        WHERE user_id = $user_id AND transaction_type = 'recommendation')
                }",
            )
            .bind(("user_id", user_id.to_owned()))
            .await
            .context("Summarizing ledger")?
            .take::<Option<LedgerSummary>>(0)
            .context("Parsing ledger summary")?;

        Ok(summary.unwrap_or_default())
    }
}
