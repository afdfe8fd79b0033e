use lvai_database::surrealdb::Error;
use lvai_database::{Database, DatabaseError, DatabaseErrorExt};
use lvai_domain::lottery::LotteryType;
use lvai_kernel::pagination::PageRequest;
use surrealdb_types::SurrealValue;

/// A row of the `recommendation` table. `statistics_basis` holds a JSON document as text.
#[derive(Debug, Clone, PartialEq, SurrealValue)]
pub struct RecommendationRecord {
    pub uid: String,
    pub user_id: String,
    pub lottery_type: String,
    pub recommended_numbers: Vec<i64>,
    pub special_number: Option<i64>,
    pub analysis: Option<String>,
    pub confidence_score: Option<f64>,
    pub strategy: String,
    pub statistics_basis: Option<String>,
    pub credits_used: i64,
    pub is_matched: Option<bool>,
    pub prize_amount: Option<i64>,
    pub created_at: i64,
}

impl RecommendationRecord {
    #[must_use]
    pub fn numbers(&self) -> Vec<u8> {
        self.recommended_numbers.iter().filter_map(|&n| u8::try_from(n).ok()).collect()
    }
}

#[derive(Debug, Clone)]
pub struct RecommendationRepository {
    db: Database,
}

impl RecommendationRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn insert(&self, record: RecommendationRecord) -> Result<(), DatabaseError> {
        self.db
            .query("CREATE recommendation CONTENT $record")
            .bind(("record", record))
            .await
            .context("Storing recommendation")?
            .check()
            .map_err(Error::from)
            .context("Storing recommendation")?;
        Ok(())
    }

    /// A recommendation owned by `user_id`.
    pub async fn find_owned(
        &self,
        user_id: &str,
        uid: &str,
    ) -> Result<Option<RecommendationRecord>, DatabaseError> {
        let rows = self
            .db
            .query("SELECT * OMIT id FROM recommendation WHERE uid = $uid AND user_id = $user_id LIMIT 1")
            .bind(("uid", uid.to_owned()))
            .bind(("user_id", user_id.to_owned()))
            .await
            .context("Loading recommendation")?
            .take::<Vec<RecommendationRecord>>(0)
            .context("Parsing recommendation")?;

        Ok(rows.into_iter().next())
    }

    /// One page of a user's recommendations, newest first, and the total matching count.
    pub async fn list(
        &self,
        user_id: &str,
        lottery_type: Option<LotteryType>,
        page: PageRequest,
    ) -> Result<(Vec<RecommendationRecord>, u64), DatabaseError> {
        let filter = if lottery_type.is_some() {
            "WHERE user_id = $user_id AND lottery_type = $lottery_type"
        } else {
            "WHERE user_id = $user_id"
        };

        let mut response = self
            .db
            .query(format!(
                "SELECT * OMIT id FROM recommendation {filter}
                    ORDER BY created_at DESC LIMIT $limit START $start;
                RETURN array::len(SELECT VALUE uid FROM recommendation {filter});"
            ))
            .bind(("user_id", user_id.to_owned()))
            .bind(("lottery_type", lottery_type.map(|t| t.as_ref().to_owned())))
            .bind(("limit", page.limit()))
            .bind(("start", page.offset()))
            .await
            .context("Listing recommendations")?;

        let records =
            response.take::<Vec<RecommendationRecord>>(0).context("Parsing recommendations")?;
        let total = response.take::<Option<i64>>(1).context("Counting recommendations")?;

        Ok((records, total.and_then(|t| u64::try_from(t).ok()).unwrap_or_default()))
    }
}
