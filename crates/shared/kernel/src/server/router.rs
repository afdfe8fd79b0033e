use super::health;
use axum::extract::FromRef;
use lvai_domain::config::ApiConfig;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// `/` and `/health`, mounted outside the versioned API prefix.
pub fn system_router<S>() -> OpenApiRouter<S>
where
    S: Send + Sync + Clone + 'static,
    ApiConfig: FromRef<S>,
{
    OpenApiRouter::<S>::new()
        .routes(routes!(health::root_handler))
        .routes(routes!(health::health_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn system_routes_are_served_and_documented() {
        let (router, api) = system_router::<ApiConfig>().with_state(ApiConfig::default()).split_for_parts();
        assert!(api.paths.paths.contains_key("/health"));
        assert!(api.paths.paths.contains_key("/"));

        for uri in ["/", "/health"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{uri}");
        }

        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        assert_eq!(router.oneshot(request).await.unwrap().status(), StatusCode::NOT_FOUND);
    }
}
