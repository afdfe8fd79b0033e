use axum::Router;
use axum::http::HeaderValue;
use axum::middleware;
use lvai::domain::config::ApiConfig;
use lvai::kernel::error::expose_internal_details;
use lvai::kernel::prelude::ApiState;
use lvai::server::router::{api_router, system_router};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::openapi::Components;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(
    info(title = "LotteryVision API", description = "Lottery statistics, credits and number recommendations"),
    modifiers(&BearerAuth),
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.components.get_or_insert_with(Components::new).add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build(),
            ),
        );
    }
}

#[allow(unreachable_pub)]
pub fn init(state: ApiState) -> Router {
    let config = state.config.clone();
    let api = ApiDoc::openapi();

    // Separate the OpenAPI routes and the API documentation object
    let (routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(system_router())
        .merge(api_router())
        .layer(middleware::from_fn_with_state(config.clone(), expose_internal_details))
        .layer(TraceLayer::new_for_http())
        .layer(cors(&config))
        .with_state(state)
        .split_for_parts();

    if config.app.debug {
        Router::new().merge(routes).merge(Scalar::with_url("/docs", api_doc))
    } else {
        routes
    }
}

fn cors(config: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin.trim())
                .inspect_err(|_| warn!(origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}
