//! Recommendation feature slice: strategy driven number picks paid for with credits.

mod analyst;
mod engine;
mod error;
mod handlers;
mod models;
mod repository;

pub use analyst::{AnalysisRequest, Analyst, template};
pub use engine::{NumberBasis, Pick, basis, confidence, pick};
pub use error::{RecommendationError, RecommendationErrorExt};
pub use models::{RecommendationRequest, RecommendationResponse, StrategyInfo};
pub use repository::{RecommendationRecord, RecommendationRepository};

use lvai_database::Database;
use lvai_domain::config::ApiConfig;
use lvai_domain::lottery::LotteryType;
use lvai_domain::strategy::Strategy;
use lvai_kernel::domain::registry::InitializedSlice;
use lvai_kernel::prelude::{ApiError, ApiState};
use lvai_kernel::safe_nanoid;
use lvai_lottery::NumberStatistics;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Recommendation feature state
#[lvai_derive::lvai_slice]
pub struct Recommender {
    pub analyst: Analyst,
    pub records: RecommendationRepository,
}

impl Recommender {
    /// Looks the slice up in the router state.
    ///
    /// # Errors
    ///
    /// Returns a 500 when the slice was never registered.
    pub fn from_state(state: &ApiState) -> Result<&Self, ApiError> {
        state.try_get_slice::<Self>().map_err(ApiError::internal)
    }

    /// Picks numbers, asks the analyst for a rationale and scores the pick. Nothing is stored.
    pub async fn draft(
        &self,
        user_id: &str,
        lottery_type: LotteryType,
        strategy: Strategy,
        stats: &[NumberStatistics],
        credits_used: i64,
        now: i64,
    ) -> RecommendationRecord {
        let rules = lottery_type.rules();
        let Pick { numbers, special_number } = pick(strategy, &rules, stats, &mut rand::rng());

        let analysis = self
            .analyst
            .explain(&AnalysisRequest { lottery_type, strategy, numbers: &numbers, special_number, stats })
            .await;
        let basis = basis(&numbers, stats);

        RecommendationRecord {
            uid: safe_nanoid!(),
            user_id: user_id.to_owned(),
            lottery_type: lottery_type.as_ref().to_owned(),
            recommended_numbers: numbers.iter().copied().map(i64::from).collect(),
            special_number: special_number.map(i64::from),
            analysis: Some(analysis),
            confidence_score: Some(confidence(&numbers, stats)),
            strategy: strategy.as_ref().to_owned(),
            statistics_basis: (!basis.is_empty())
                .then(|| serde_json::to_string(&basis).ok())
                .flatten(),
            credits_used,
            is_matched: None,
            prize_amount: None,
            created_at: now,
        }
    }
}

/// Initializes the recommendation slice.
///
/// # Errors
///
/// Fails when the analyst's HTTP client cannot be built.
pub fn init(config: &ApiConfig, database: &Database) -> Result<InitializedSlice, RecommendationError> {
    let analyst = Analyst::new(&config.ai)?;
    info!(llm = analyst.is_enabled(), model = %config.ai.model, "Recommendation slice initialized");

    Ok(InitializedSlice::new(Recommender::new(RecommenderInner {
        analyst,
        records: RecommendationRepository::new(database.clone()),
    })))
}

/// `/recommendations/*` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::create, handlers::list))
        .routes(routes!(handlers::strategies))
        .routes(routes!(handlers::get_one))
}
