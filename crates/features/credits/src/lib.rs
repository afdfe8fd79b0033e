//! Credits feature slice: the balance ledger, credit packages and virtual purchases.
//!
//! Balances only change through [`Ledger`], which updates the account and writes the
//! matching ledger entry in a single database statement.

mod error;
mod handlers;
mod ledger;
mod models;
mod packages;

pub use error::{CreditsError, CreditsErrorExt};
pub use ledger::{Ledger, LedgerEntry, LedgerSummary, TransactionRecord};
pub use models::{
    BalanceResponse, PackageResponse, PurchaseResult, SummaryResponse, TransactionResponse,
};
pub use packages::{PackageRecord, PackageRepository};

use lvai_database::Database;
use lvai_kernel::domain::registry::InitializedSlice;
use lvai_kernel::prelude::{ApiError, ApiState};
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Credits feature state
#[lvai_derive::lvai_slice]
pub struct Credits {
    pub ledger: Ledger,
    pub packages: PackageRepository,
}

impl Credits {
    /// Looks the slice up in the router state.
    ///
    /// # Errors
    ///
    /// Returns a 500 when the slice was never registered.
    pub fn from_state(state: &ApiState) -> Result<&Self, ApiError> {
        state.try_get_slice::<Self>().map_err(ApiError::internal)
    }
}

/// Initializes the credits slice.
#[must_use]
pub fn init(database: &Database) -> InitializedSlice {
    info!("Credits slice initialized");
    InitializedSlice::new(Credits::new(CreditsInner {
        ledger: Ledger::new(database.clone()),
        packages: PackageRepository::new(database.clone()),
    }))
}

/// `/credits/*` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::balance))
        .routes(routes!(handlers::transactions))
        .routes(routes!(handlers::packages))
        .routes(routes!(handlers::purchase))
        .routes(routes!(handlers::summary))
}
