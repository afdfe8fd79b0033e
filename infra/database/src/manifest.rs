//! Embedded schema scripts in execution order.
//!
//! Each slice keeps its scripts under its own `migrations/` directory. Append new
//! versions at the end of a slice's list; applied scripts must never be edited.

use crate::migrations::Migration;

#[must_use]
pub(crate) fn builtin_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            "identity",
            "0001-users",
            include_str!("../../../crates/features/identity/migrations/0001-users.surql"),
        ),
        Migration::new(
            "lottery",
            "0001-draws",
            include_str!("../../../crates/features/lottery/migrations/0001-draws.surql"),
        ),
        Migration::new(
            "credits",
            "0001-ledger",
            include_str!("../../../crates/features/credits/migrations/0001-ledger.surql"),
        ),
        Migration::new(
            "recommendation",
            "0001-recommendations",
            include_str!(
                "../../../crates/features/recommendation/migrations/0001-recommendations.surql"
            ),
        ),
    ]
}
