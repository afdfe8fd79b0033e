//! Facade crate for LotteryVision features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Call [`init`] to build every feature slice, then register them on the `ApiState`.
//! - Merge [`server::router::api_router`] and `system_router` into the application router.

use lvai_database::Database;
pub use lvai_domain as domain;
use lvai_domain::config::ApiConfig;
use lvai_domain::registry::InitializedSlice;
pub use lvai_kernel as kernel;

pub mod server {
    pub mod router {
        use lvai_kernel::prelude::ApiState;
        pub use lvai_kernel::server::router::system_router;
        use utoipa_axum::router::OpenApiRouter;

        /// Prefix of every feature route.
        pub const API_PREFIX: &str = "/api/v1";

        /// Feature routers nested under [`API_PREFIX`].
        pub fn api_router() -> OpenApiRouter<ApiState> {
            let features = OpenApiRouter::new()
                .nest("/auth", crate::features::identity::router())
                .nest("/lottery", crate::features::lottery::router())
                .nest("/credits", crate::features::credits::router())
                .nest("/recommendations", crate::features::recommendation::router());

            OpenApiRouter::new().nest(API_PREFIX, features)
        }
    }
}

/// Feature registry for runtime introspection.
pub mod features {
    pub use lvai_credits as credits;
    pub use lvai_identity as identity;
    pub use lvai_lottery as lottery;
    pub use lvai_recommendation as recommendation;

    /// Slices compiled into this build.
    pub const ENABLED: &[&str] = &["identity", "lottery", "credits", "recommendation"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Initialize every feature slice.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: &ApiConfig,
    database: &Database,
) -> Result<Vec<InitializedSlice>, Box<dyn std::error::Error + Send + Sync>> {
    let slices = vec![
        features::identity::init(config, database)?,
        features::lottery::init(database),
        features::credits::init(database),
        features::recommendation::init(config, database)?,
    ];

    tracing::info!(slices = slices.len(), "Feature slices initialized");
    Ok(slices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_slice_is_listed() {
        for name in ["identity", "lottery", "credits", "recommendation"] {
            assert!(features::is_enabled(name));
        }
        assert!(!features::is_enabled("payments"));
    }
}
