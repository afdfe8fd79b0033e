use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Kind of a ledger entry.
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionType {
    Initial,
    Purchase,
    Recommendation,
    Refund,
    Bonus,
    Admin,
}

/// What a ledger entry's `reference_id` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ReferenceType {
    CreditPackage,
    Recommendation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn ids_are_snake_case() {
        assert_eq!(TransactionType::Recommendation.as_ref(), "recommendation");
        assert_eq!(TransactionType::from_str("purchase").unwrap(), TransactionType::Purchase);
        assert_eq!(ReferenceType::CreditPackage.to_string(), "credit_package");
    }
}
