use lvai_database::{Database, DatabaseError, DatabaseErrorExt};
use surrealdb_types::SurrealValue;

/// A row of the `credit_package` table. `price` is in TWD.
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
pub struct PackageRecord {
    pub uid: String,
    pub name: String,
    pub description: Option<String>,
    pub credits: i64,
    pub price: i64,
    pub bonus_credits: i64,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PackageRecord {
    /// Credits granted on purchase, bonus included.
    #[must_use]
    pub const fn total_credits(&self) -> i64 {
        self.credits + self.bonus_credits
    }
}

#[derive(Debug, Clone)]
pub struct PackageRepository {
    db: Database,
}

impl PackageRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Packages on sale, in display order.
    pub async fn active(&self) -> Result<Vec<PackageRecord>, DatabaseError> {
        self.db
            .query("SELECT * OMIT id FROM credit_package WHERE is_active = true ORDER BY sort_order ASC")
            .await
            .context("Loading packages")?
            .take::<Vec<PackageRecord>>(0)
            .context("Parsing packages")
    }

    pub async fn find_active(&self, uid: &str) -> Result<Option<PackageRecord>, DatabaseError> {
        let rows = self
            .db
            .query("SELECT * OMIT id FROM credit_package WHERE uid = $uid AND is_active = true LIMIT 1")
            .bind(("uid", uid.to_owned()))
            .await
            .context("Loading package")?
            .take::<Vec<PackageRecord>>(0)
            .context("Parsing package")?;

        Ok(rows.into_iter().next())
    }
}
