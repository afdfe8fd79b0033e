//! Lottery catalog and draw validation rules.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;

/// Supported games. The wire form is the snake_case id, e.g. `daily_539`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
pub enum LotteryType {
    #[serde(rename = "big_lottery")]
    #[strum(serialize = "big_lottery")]
    BigLottery,
    #[serde(rename = "power_lottery")]
    #[strum(serialize = "power_lottery")]
    PowerLottery,
    #[serde(rename = "daily_539")]
    #[strum(serialize = "daily_539")]
    Daily539,
    #[serde(rename = "super_lotto")]
    #[strum(serialize = "super_lotto")]
    SuperLotto,
}

/// Shape of one game: how many main numbers are drawn and from which range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotteryRules {
    pub name: &'static str,
    pub numbers_count: u8,
    pub max_number: u8,
    /// Upper bound of the special number, `None` when the game has none.
    pub special_max: Option<u8>,
}

impl LotteryRules {
    #[must_use]
    pub const fn has_special(&self) -> bool {
        self.special_max.is_some()
    }

    /// Checks a draw's main numbers and special number against the game.
    ///
    /// # Errors
    ///
    /// Returns a human readable reason for the first violated rule.
    pub fn validate_draw(&self, numbers: &[u8], special: Option<u8>) -> Result<(), String> {
        if numbers.len() != usize::from(self.numbers_count) {
            return Err(format!(
                "{} requires {} numbers, got {}",
                self.name,
                self.numbers_count,
                numbers.len()
            ));
        }
        if let Some(out) = numbers.iter().find(|&&n| n == 0 || n > self.max_number) {
            return Err(format!("number {out} is outside 1..={}", self.max_number));
        }

        let mut sorted = numbers.to_vec();
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err("numbers must be distinct".to_owned());
        }

        match (self.special_max, special) {
            (None, Some(_)) => Err(format!("{} has no special number", self.name)),
            (Some(_), None) => Err(format!("{} requires a special number", self.name)),
            (Some(max), Some(n)) if n == 0 || n > max => {
                Err(format!("special number {n} is outside 1..={max}"))
            },
            _ => Ok(()),
        }
    }
}

impl LotteryType {
    #[must_use]
    pub const fn rules(self) -> LotteryRules {
        match self {
            Self::BigLottery => LotteryRules {
                name: "大樂透",
                numbers_count: 6,
                max_number: 49,
                special_max: Some(49),
            },
            Self::PowerLottery => LotteryRules {
                name: "威力彩",
                numbers_count: 6,
                max_number: 38,
                special_max: Some(8),
            },
            Self::Daily539 => LotteryRules {
                name: "今彩539",
                numbers_count: 5,
                max_number: 39,
                special_max: None,
            },
            Self::SuperLotto => LotteryRules {
                name: "雙贏彩",
                numbers_count: 12,
                max_number: 24,
                special_max: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn wire_ids_round_trip_through_strum_and_serde() {
        for lottery in LotteryType::iter() {
            let id = lottery.to_string();
            assert_eq!(LotteryType::from_str(&id).unwrap(), lottery);
            assert_eq!(serde_json::to_value(lottery).unwrap(), serde_json::json!(id));
        }
        assert_eq!(LotteryType::Daily539.as_ref(), "daily_539");
        assert!(LotteryType::from_str("lotto_649").is_err());
    }

    #[test]
    fn catalog_matches_games() {
        let power = LotteryType::PowerLottery.rules();
        assert_eq!((power.numbers_count, power.max_number, power.special_max), (6, 38, Some(8)));
        assert!(!LotteryType::SuperLotto.rules().has_special());
        assert_eq!(LotteryType::SuperLotto.rules().numbers_count, 12);
    }

    #[test]
    fn draw_validation() {
        let big = LotteryType::BigLottery.rules();
        assert!(big.validate_draw(&[1, 2, 3, 4, 5, 49], Some(7)).is_ok());
        assert!(big.validate_draw(&[1, 2, 3, 4, 5], Some(7)).is_err());
        assert!(big.validate_draw(&[1, 2, 3, 4, 5, 50], Some(7)).is_err());
        assert!(big.validate_draw(&[1, 1, 3, 4, 5, 6], Some(7)).is_err());
        assert!(big.validate_draw(&[1, 2, 3, 4, 5, 6], None).is_err());

        let power = LotteryType::PowerLottery.rules();
        assert!(power.validate_draw(&[1, 2, 3, 4, 5, 6], Some(9)).is_err());

        let daily = LotteryType::Daily539.rules();
        assert!(daily.validate_draw(&[1, 2, 3, 4, 5], Some(1)).is_err());
        assert!(daily.validate_draw(&[1, 2, 3, 4, 39], None).is_ok());
    }
}
