use crate::repository::RecommendationRecord;
use chrono::{DateTime, Utc};
use lvai_domain::strategy::Strategy;
use lvai_kernel::prelude::*;
use serde_json::Value;
use utoipa::IntoParams;

pub const MAX_COUNT: u8 = 10;

#[api_model]
pub struct RecommendationRequest {
    pub lottery_type: String,
    /// Defaults to `balanced`
    pub strategy: Option<String>,
    /// Number of recommendations paid for, 1 to 10
    #[serde(default = "default_count")]
    pub count: u8,
}

const fn default_count() -> u8 {
    1
}

impl Validate for RecommendationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if !(1..=MAX_COUNT).contains(&self.count) {
            return Err(ApiError::validation("count must be between 1 and 10"));
        }
        Ok(())
    }
}

impl RecommendationRequest {
    /// The requested strategy, `balanced` when omitted.
    ///
    /// # Errors
    ///
    /// `E5002` for unknown strategy ids.
    pub fn strategy(&self) -> Result<Strategy, ApiError> {
        match self.strategy.as_deref() {
            None => Ok(Strategy::default()),
            Some(raw) => raw.parse().map_err(|_| {
                ApiError::bad_request(ErrorCode::StrategyNotFound, format!("Unknown strategy: {raw}"))
            }),
        }
    }
}

#[api_model]
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecommendationQuery {
    pub lottery_type: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[api_model]
pub struct RecommendationResponse {
    pub id: String,
    pub lottery_type: String,
    /// Ascending
    pub recommended_numbers: Vec<u8>,
    pub special_number: Option<u8>,
    pub analysis: Option<String>,
    /// 0 to 1, two decimals
    pub confidence_score: Option<f64>,
    pub strategy: String,
    /// Per chosen number: `frequency`, `current_interval`, `average_interval`
    #[schema(value_type = Option<Object>)]
    pub statistics_basis: Option<Value>,
    pub credits_used: i64,
    pub is_matched: Option<bool>,
    pub prize_amount: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<&RecommendationRecord> for RecommendationResponse {
    fn from(record: &RecommendationRecord) -> Self {
        Self {
            id: record.uid.clone(),
            lottery_type: record.lottery_type.clone(),
            recommended_numbers: record.numbers(),
            special_number: record.special_number.and_then(|n| u8::try_from(n).ok()),
            analysis: record.analysis.clone(),
            confidence_score: record.confidence_score,
            strategy: record.strategy.clone(),
            statistics_basis: record
                .statistics_basis
                .as_deref()
                .and_then(|raw| serde_json::from_str(raw).ok()),
            credits_used: record.credits_used,
            is_matched: record.is_matched,
            prize_amount: record.prize_amount,
            created_at: from_millis(record.created_at),
        }
    }
}

#[api_model]
pub struct StrategyInfo {
    pub id: Strategy,
    pub name: String,
    pub description: String,
}

impl From<Strategy> for StrategyInfo {
    fn from(strategy: Strategy) -> Self {
        Self {
            id: strategy,
            name: strategy.title().to_owned(),
            description: strategy.description().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(body: &str) -> RecommendationRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn count_defaults_to_one_and_is_bounded() {
        let parsed = request(r#"{"lottery_type":"big_lottery"}"#);
        assert_eq!(parsed.count, 1);
        assert!(parsed.validate().is_ok());

        assert!(request(r#"{"lottery_type":"big_lottery","count":10}"#).validate().is_ok());
        assert!(request(r#"{"lottery_type":"big_lottery","count":0}"#).validate().is_err());
        assert!(request(r#"{"lottery_type":"big_lottery","count":11}"#).validate().is_err());
    }

    #[test]
    fn unknown_strategies_are_e5002() {
        assert_eq!(request(r#"{"lottery_type":"x"}"#).strategy().unwrap(), Strategy::Balanced);
        assert_eq!(request(r#"{"lottery_type":"x","strategy":"cold"}"#).strategy().unwrap(), Strategy::Cold);

        let err = request(r#"{"lottery_type":"x","strategy":"lucky"}"#).strategy().unwrap_err();
        assert_eq!(err.code, ErrorCode::StrategyNotFound);
        assert_eq!(err.status.as_u16(), 400);
    }
}
