use crate::repository::{DrawRecord, StatisticsRecord};
use chrono::{DateTime, NaiveDate, Utc};
use lvai_domain::lottery::LotteryType;
use lvai_kernel::prelude::*;
use serde_json::Value;
use utoipa::IntoParams;

#[api_model]
pub struct LotteryTypeInfo {
    pub id: LotteryType,
    pub name: String,
    pub numbers_count: u8,
    pub max_number: u8,
    pub has_special: bool,
}

impl From<LotteryType> for LotteryTypeInfo {
    fn from(lottery_type: LotteryType) -> Self {
        let rules = lottery_type.rules();
        Self {
            id: lottery_type,
            name: rules.name.to_owned(),
            numbers_count: rules.numbers_count,
            max_number: rules.max_number,
            has_special: rules.has_special(),
        }
    }
}

#[api_model]
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DrawListQuery {
    pub lottery_type: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[api_model]
/// One official draw
pub struct DrawResponse {
    pub id: String,
    pub lottery_type: String,
    pub draw_number: String,
    pub draw_date: NaiveDate,
    pub numbers: Vec<u8>,
    pub special_number: Option<u8>,
    #[schema(value_type = Option<Object>)]
    pub prize_info: Option<Value>,
    pub total_sales: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<&DrawRecord> for DrawResponse {
    fn from(draw: &DrawRecord) -> Self {
        Self {
            id: draw.uid.clone(),
            lottery_type: draw.lottery_type.clone(),
            draw_number: draw.draw_number.clone(),
            draw_date: from_millis(draw.draw_date).date_naive(),
            numbers: draw.main_numbers(),
            special_number: draw.special_number.and_then(|n| u8::try_from(n).ok()),
            prize_info: draw.prize_info.as_deref().and_then(|raw| serde_json::from_str(raw).ok()),
            total_sales: draw.total_sales,
            created_at: from_millis(draw.created_at),
        }
    }
}

#[api_model]
/// Draw submitted by the results importer
pub struct CreateDrawRequest {
    pub lottery_type: String,
    pub draw_number: String,
    pub draw_date: NaiveDate,
    pub numbers: Vec<u8>,
    pub special_number: Option<u8>,
    #[schema(value_type = Option<Object>)]
    pub prize_info: Option<Value>,
    pub total_sales: Option<i64>,
}

impl Validate for CreateDrawRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let draw_number = self.draw_number.trim();
        if draw_number.is_empty() || draw_number.len() > 20 {
            return Err(ApiError::validation("draw_number must be 1 to 20 characters"));
        }
        if self.total_sales.is_some_and(|sales| sales < 0) {
            return Err(ApiError::validation("total_sales cannot be negative"));
        }
        Ok(())
    }
}

#[api_model]
pub struct StatisticsResponse {
    pub lottery_type: String,
    pub number: u8,
    pub frequency: u32,
    pub last_appeared: Option<NaiveDate>,
    pub average_interval: Option<u32>,
    pub max_interval: Option<u32>,
    pub current_interval: u32,
}

impl From<&StatisticsRecord> for StatisticsResponse {
    fn from(record: &StatisticsRecord) -> Self {
        let stats = record.to_statistics();
        Self {
            lottery_type: record.lottery_type.clone(),
            number: stats.number,
            frequency: stats.frequency,
            last_appeared: stats.last_appeared.map(|millis| from_millis(millis).date_naive()),
            average_interval: stats.average_interval,
            max_interval: stats.max_interval,
            current_interval: stats.current_interval,
        }
    }
}

#[api_model]
pub struct NumberFrequency {
    pub number: u8,
    pub frequency: u32,
    /// Share of draws containing the number, two decimals
    pub percentage: f64,
}

#[api_model]
pub struct AnalysisResponse {
    pub success: bool,
    pub lottery_type: LotteryType,
    pub total_draws: u64,
    /// Ten most frequent numbers
    pub hot_numbers: Vec<NumberFrequency>,
    /// Ten least frequent numbers
    pub cold_numbers: Vec<NumberFrequency>,
    pub overdue_numbers: Vec<u8>,
    /// Main numbers of the latest draws, newest first
    pub recent_numbers: Vec<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(draw_number: &str) -> CreateDrawRequest {
        CreateDrawRequest {
            lottery_type: "daily_539".to_owned(),
            draw_number: draw_number.to_owned(),
            draw_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
            numbers: vec![1, 2, 3, 4, 5],
            special_number: None,
            prize_info: None,
            total_sales: None,
        }
    }

    #[test]
    fn catalog_entries_expose_rules() {
        let info = LotteryTypeInfo::from(LotteryType::PowerLottery);
        assert_eq!(info.name, "威力彩");
        assert_eq!((info.numbers_count, info.max_number, info.has_special), (6, 38, true));
        assert_eq!(serde_json::to_value(&info).unwrap()["id"], "power_lottery");
    }

    #[test]
    fn draw_number_is_required() {
        assert!(request("114000001").validate().is_ok());
        assert!(request("  ").validate().is_err());
        assert!(request(&"9".repeat(21)).validate().is_err());
    }

    #[test]
    fn draw_date_is_a_calendar_date() {
        let body = r#"{"lottery_type":"daily_539","draw_number":"1","draw_date":"2025-01-02","numbers":[1,2,3,4,5]}"#;
        let parsed: CreateDrawRequest = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.draw_date, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert!(serde_json::from_str::<CreateDrawRequest>(r#"{"bogus":1}"#).is_err());
    }
}
