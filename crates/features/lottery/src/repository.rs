use crate::statistics::NumberStatistics;
use lvai_database::surrealdb::Error;
use lvai_database::{Database, DatabaseError, DatabaseErrorExt};
use lvai_domain::lottery::LotteryType;
use lvai_kernel::pagination::PageRequest;
use lvai_kernel::safe_nanoid;
use surrealdb_types::SurrealValue;

/// A row of the `lottery_draw` table. `prize_info` holds a JSON document as text.
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
pub struct DrawRecord {
    pub uid: String,
    pub lottery_type: String,
    pub draw_number: String,
    pub draw_date: i64,
    pub numbers: Vec<i64>,
    pub special_number: Option<i64>,
    pub prize_info: Option<String>,
    pub total_sales: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl DrawRecord {
    #[must_use]
    pub fn new(
        lottery_type: LotteryType,
        draw_number: String,
        draw_date: i64,
        numbers: &[u8],
        special_number: Option<u8>,
        now: i64,
    ) -> Self {
        Self {
            uid: safe_nanoid!(),
            lottery_type: lottery_type.as_ref().to_owned(),
            draw_number,
            draw_date,
            numbers: numbers.iter().copied().map(i64::from).collect(),
            special_number: special_number.map(i64::from),
            prize_info: None,
            total_sales: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Main numbers as drawn; corrupt values are skipped.
    #[must_use]
    pub fn main_numbers(&self) -> Vec<u8> {
        self.numbers.iter().filter_map(|&n| u8::try_from(n).ok()).collect()
    }
}

/// A row of the `lottery_statistics` table.
#[derive(Debug, Clone, PartialEq, Eq, SurrealValue)]
pub struct StatisticsRecord {
    pub lottery_type: String,
    pub num: i64,
    pub frequency: i64,
    pub last_appeared: Option<i64>,
    pub average_interval: Option<i64>,
    pub max_interval: Option<i64>,
    pub current_interval: i64,
    pub updated_at: i64,
}

impl StatisticsRecord {
    fn from_statistics(lottery_type: LotteryType, stats: &NumberStatistics, now: i64) -> Self {
        Self {
            lottery_type: lottery_type.as_ref().to_owned(),
            num: i64::from(stats.number),
            frequency: i64::from(stats.frequency),
            last_appeared: stats.last_appeared,
            average_interval: stats.average_interval.map(i64::from),
            max_interval: stats.max_interval.map(i64::from),
            current_interval: i64::from(stats.current_interval),
            updated_at: now,
        }
    }

    #[must_use]
    pub fn to_statistics(&self) -> NumberStatistics {
        let count = |value: i64| u32::try_from(value).unwrap_or_default();
        NumberStatistics {
            number: u8::try_from(self.num).unwrap_or_default(),
            frequency: count(self.frequency),
            last_appeared: self.last_appeared,
            average_interval: self.average_interval.map(count),
            max_interval: self.max_interval.map(count),
            current_interval: count(self.current_interval),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LotteryRepository {
    db: Database,
}

impl LotteryRepository {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// One page of draws, newest `draw_date` first, and the total matching count.
    pub async fn list_draws(
        &self,
        lottery_type: Option<LotteryType>,
        page: PageRequest,
    ) -> Result<(Vec<DrawRecord>, u64), DatabaseError> {
        let filter = if lottery_type.is_some() { "WHERE lottery_type = $lottery_type" } else { "" };

        let mut response = self
            .db
            .query(format!(
                "SELECT * OMIT id FROM lottery_draw {filter}
                    ORDER BY draw_date DESC, draw_number DESC LIMIT $limit START $start;
                RETURN array::len(SELECT VALUE uid FROM lottery_draw {filter});"
            ))
            .bind(("lottery_type", lottery_type.map(|t| t.as_ref().to_owned())))
            .bind(("limit", page.limit()))
            .bind(("start", page.offset()))
            .await
            .context("Listing draws")?;

        let draws = response.take::<Vec<DrawRecord>>(0).context("Parsing draws")?;
        let total = response.take::<Option<i64>>(1).context("Counting draws")?;

        Ok((draws, total.and_then(|t| u64::try_from(t).ok()).unwrap_or_default()))
    }

    pub async fn find_draw(&self, uid: &str) -> Result<Option<DrawRecord>, DatabaseError> {
        let rows = self
            .db
            .query("SELECT * OMIT id FROM lottery_draw WHERE uid = $uid LIMIT 1")
            .bind(("uid", uid.to_owned()))
            .await
            .context("Loading draw")?
            .take::<Vec<DrawRecord>>(0)
            .context("Parsing draw")?;

        Ok(rows.into_iter().next())
    }

    pub async fn find_by_number(
        &self,
        lottery_type: LotteryType,
        draw_number: &str,
    ) -> Result<Option<DrawRecord>, DatabaseError> {
        let rows = self
            .db
            .query(
                "SELECT * OMIT id FROM lottery_draw
                WHERE lottery_type = $lottery_type AND draw_number = $draw_number LIMIT 1",
            )
            .bind(("lottery_type", lottery_type.as_ref().to_owned()))
            .bind(("draw_number", draw_number.to_owned()))
            .await
            .context("Loading draw")?
            .take::<Vec<DrawRecord>>(0)
            .context("Parsing draw")?;

        Ok(rows.into_iter().next())
    }

    /// The `limit` newest draws of a game.
    pub async fn latest_draws(
        &self,
        lottery_type: LotteryType,
        limit: u64,
    ) -> Result<Vec<DrawRecord>, DatabaseError> {
        self.db
            .query(
                "SELECT * OMIT id FROM lottery_draw WHERE lottery_type = $lottery_type
                ORDER BY draw_date DESC, draw_number DESC LIMIT $limit",
            )
            .bind(("lottery_type", lottery_type.as_ref().to_owned()))
            .bind(("limit", limit))
            .await
            .context("Loading latest draws")?
            .take::<Vec<DrawRecord>>(0)
            .context("Parsing draws")
    }

    /// Every draw of a game in chronological order.
    pub async fn history(&self, lottery_type: LotteryType) -> Result<Vec<DrawRecord>, DatabaseError> {
        self.db
            .query(
                "SELECT * OMIT id FROM lottery_draw WHERE lottery_type = $lottery_type
                ORDER BY draw_date ASC, draw_number ASC",
            )
            .bind(("lottery_type", lottery_type.as_ref().to_owned()))
            .await
            .context("Loading draw history")?
            .take::<Vec<DrawRecord>>(0)
            .context("Parsing draws")
    }

    pub async fn count_draws(&self, lottery_type: LotteryType) -> Result<u64, DatabaseError> {
        let total = self
            .db
            .query("RETURN array::len(SELECT VALUE uid FROM lottery_draw WHERE lottery_type = $lottery_type)")
            .bind(("lottery_type", lottery_type.as_ref().to_owned()))
            .await
            .context("Counting draws")?
            .take::<Option<i64>>(0)
            .context("Counting draws")?;

        Ok(total.and_then(|t| u64::try_from(t).ok()).unwrap_or_default())
    }

    pub async fn insert_draw(&self, draw: DrawRecord) -> Result<(), DatabaseError> {
        self.db
            .query("CREATE lottery_draw CONTENT $draw")
            .bind(("draw", draw))
            .await
            .context("Storing draw")?
            .check()
            .map_err(Error::from)
            .context("Storing draw")?;
        Ok(())
    }

    /// Stored statistics, most frequent first.
    pub async fn statistics(
        &self,
        lottery_type: LotteryType,
    ) -> Result<Vec<StatisticsRecord>, DatabaseError> {
        self.db
            .query(
                "SELECT * OMIT id FROM lottery_statistics WHERE lottery_type = $lottery_type
                ORDER BY frequency DESC, num ASC",
            )
            .bind(("lottery_type", lottery_type.as_ref().to_owned()))
            .await
            .context("Loading statistics")?
            .take::<Vec<StatisticsRecord>>(0)
            .context("Parsing statistics")
    }

    /// Swaps a game's statistics for `stats` in one transaction.
    pub async fn replace_statistics(
        &self,
        lottery_type: LotteryType,
        stats: &[NumberStatistics],
        now: i64,
    ) -> Result<(), DatabaseError> {
        let rows: Vec<StatisticsRecord> = stats
            .iter()
            .map(|stat| StatisticsRecord::from_statistics(lottery_type, stat, now))
            .collect();

        self.db
            .query(
                "BEGIN TRANSACTION;
                DELETE lottery_statistics WHERE lottery_type = $lottery_type;
                FOR $row IN $rows {
                    CREATE lottery_statistics CONTENT $row;
                };
                COMMIT TRANSACTION;",
            )
            .bind(("lottery_type", lottery_type.as_ref().to_owned()))
            .bind(("rows", rows))
            .await
            .context("Replacing statistics")?
            .check()
            .map_err(Error::from)
            .context("Replacing statistics")?;
        Ok(())
    }
}
