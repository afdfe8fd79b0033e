use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Number selection strategy for recommendations.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Strategy {
    #[default]
    Balanced,
    Hot,
    Cold,
    Overdue,
    Random,
}

impl Strategy {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Balanced => "Balanced",
            Self::Hot => "Hot numbers",
            Self::Cold => "Cold numbers",
            Self::Overdue => "Overdue numbers",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Balanced => "Mixes frequently drawn numbers with rarely drawn ones and fills the rest at random",
            Self::Hot => "Prefers numbers drawn most often in the recorded history",
            Self::Cold => "Prefers numbers drawn least often in the recorded history",
            Self::Overdue => "Prefers numbers whose current gap exceeds their average gap",
            Self::Random => "Picks every number uniformly at random",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn five_strategies_with_balanced_default() {
        assert_eq!(Strategy::iter().count(), 5);
        assert_eq!(Strategy::default(), Strategy::Balanced);
        assert_eq!("overdue".parse::<Strategy>().unwrap(), Strategy::Overdue);
        assert!("lucky".parse::<Strategy>().is_err());
    }
}
