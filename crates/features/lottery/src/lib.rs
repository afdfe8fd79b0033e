//! Lottery feature slice: draw history, per-number statistics and hot/cold analysis.
//!
//! Draws arrive through the admin ingest route; every accepted draw triggers a full
//! statistics rebuild for its game.

mod analysis;
mod error;
mod handlers;
mod models;
mod repository;
mod statistics;

pub use error::{LotteryError, LotteryErrorExt};
pub use models::{
    AnalysisResponse, CreateDrawRequest, DrawResponse, LotteryTypeInfo, NumberFrequency,
    StatisticsResponse,
};
pub use repository::{DrawRecord, LotteryRepository, StatisticsRecord};
pub use statistics::{NumberStatistics, rebuild, sort_by_frequency};

use chrono::{NaiveDate, NaiveTime};
use lvai_database::{Database, DatabaseError};
use lvai_domain::lottery::LotteryType;
use lvai_kernel::domain::registry::InitializedSlice;
use lvai_kernel::prelude::{ApiError, ApiState, ErrorCode, now_millis};
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Lottery feature state
#[lvai_derive::lvai_slice]
pub struct Lottery {
    pub draws: LotteryRepository,
}

impl Lottery {
    /// Looks the slice up in the router state.
    ///
    /// # Errors
    ///
    /// Returns a 500 when the slice was never registered.
    pub fn from_state(state: &ApiState) -> Result<&Self, ApiError> {
        state.try_get_slice::<Self>().map_err(ApiError::internal)
    }

    /// Validates and stores a draw, then rebuilds its game's statistics.
    ///
    /// # Errors
    ///
    /// [`LotteryError::InvalidDraw`] when the numbers break the game's rules,
    /// [`LotteryError::DuplicateDraw`] when the draw number is already stored.
    pub async fn ingest(
        &self,
        lottery_type: LotteryType,
        draw: DrawRecord,
    ) -> Result<DrawRecord, LotteryError> {
        let special = match draw.special_number {
            Some(n) => Some(u8::try_from(n).map_err(|_| LotteryError::InvalidDraw {
                message: format!("special number {n} is out of range").into(),
            })?),
            None => None,
        };
        if draw.main_numbers().len() != draw.numbers.len() {
            return Err(LotteryError::InvalidDraw { message: "numbers are out of range".into() });
        }
        lottery_type
            .rules()
            .validate_draw(&draw.main_numbers(), special)
            .map_err(|message| LotteryError::InvalidDraw { message: message.into() })?;

        if self
            .draws
            .find_by_number(lottery_type, &draw.draw_number)
            .await
            .context("Checking for a duplicate draw")?
            .is_some()
        {
            return Err(LotteryError::DuplicateDraw {
                lottery_type,
                draw_number: draw.draw_number,
            });
        }

        self.draws.insert_draw(draw.clone()).await.context("Storing draw")?;
        let history = self.rebuild_statistics(lottery_type).await?;

        info!(%lottery_type, draw_number = %draw.draw_number, history, "Draw ingested");
        Ok(draw)
    }

    /// Recomputes and stores a game's statistics; returns the number of draws considered.
    ///
    /// # Errors
    ///
    /// Fails when the history cannot be read or the statistics cannot be written.
    pub async fn rebuild_statistics(&self, lottery_type: LotteryType) -> Result<usize, LotteryError> {
        let history = self.draws.history(lottery_type).await.context("Loading draw history")?;
        let numbers: Vec<(i64, Vec<u8>)> =
            history.iter().map(|draw| (draw.draw_date, draw.main_numbers())).collect();

        let stats = rebuild(
            lottery_type.rules().max_number,
            numbers.iter().map(|(date, numbers)| (*date, numbers.as_slice())),
        );
        self.draws
            .replace_statistics(lottery_type, &stats, now_millis())
            .await
            .context("Storing statistics")?;

        Ok(history.len())
    }

    /// Stored statistics of a game, most frequent first. Empty until the first draw arrives.
    ///
    /// # Errors
    ///
    /// Fails when the statistics cannot be read.
    pub async fn number_statistics(
        &self,
        lottery_type: LotteryType,
    ) -> Result<Vec<NumberStatistics>, DatabaseError> {
        let rows = self.draws.statistics(lottery_type).await?;
        Ok(rows.iter().map(StatisticsRecord::to_statistics).collect())
    }
}

/// Parses a wire lottery id.
///
/// # Errors
///
/// `E4001` with status 400 for ids outside the catalog.
pub fn parse_lottery_type(value: &str) -> Result<LotteryType, ApiError> {
    value.parse().map_err(|_| {
        ApiError::bad_request(
            ErrorCode::InvalidLotteryType,
            format!("Unsupported lottery type: {value}"),
        )
    })
}

/// Midnight UTC of `date` in milliseconds, the stored form of draw dates.
#[must_use]
pub fn date_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Initializes the lottery slice.
#[must_use]
pub fn init(database: &Database) -> InitializedSlice {
    info!("Lottery slice initialized");
    InitializedSlice::new(Lottery::new(LotteryInner { draws: LotteryRepository::new(database.clone()) }))
}

/// `/lottery/*` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::types))
        .routes(routes!(handlers::list_draws, handlers::create_draw))
        .routes(routes!(handlers::get_draw))
        .routes(routes!(handlers::latest))
        .routes(routes!(handlers::statistics))
        .routes(routes!(handlers::analysis))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_lottery_ids_are_e4001() {
        assert_eq!(parse_lottery_type("daily_539").unwrap(), LotteryType::Daily539);
        let err = parse_lottery_type("lotto_649").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidLotteryType);
        assert_eq!(err.status.as_u16(), 400);
    }

    #[test]
    fn draw_dates_are_stored_as_utc_midnight() {
        let date = NaiveDate::from_ymd_opt(1970, 1, 2).unwrap();
        assert_eq!(date_millis(date), 86_400_000);
    }
}
