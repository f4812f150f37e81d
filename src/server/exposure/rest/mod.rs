//! REST exposure
//!
//! Consumes a [`ServerHost`] and produces the Axum router: health checks,
//! every registered resource, custom routes, request tracing and CORS.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::super::host::ServerHost;
use crate::config::CorsConfig;

pub const SERVICE_NAME: &str = "eduverse";

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    pub fn build_router(host: Arc<ServerHost>) -> Result<Router> {
        let mut app = Self::health_routes().merge(host.entity_registry.build_routes(&host.state));

        for custom_router in &host.custom_routes {
            app = app.merge(custom_router.clone());
        }

        if let Some(cors) = Self::cors_layer(&host.state.config.cors)? {
            app = app.layer(cors);
        }

        Ok(app.layer(TraceLayer::new_for_http()))
    }

    fn health_routes() -> Router {
        Router::new()
            .route("/health", get(Self::health_check))
            .route("/healthz", get(Self::health_check))
    }

    async fn health_check() -> Json<Value> {
        Json(json!({
            "status": "ok",
            "service": SERVICE_NAME
        }))
    }

    fn cors_layer(config: &CorsConfig) -> Result<Option<CorsLayer>> {
        if config.allowed_origins.is_empty() {
            return Ok(None);
        }
        let origins = if config.allowed_origins.iter().any(|o| o == "*") {
            AllowOrigin::from(Any)
        } else {
            let parsed = config
                .allowed_origins
                .iter()
                .map(|o| {
                    HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin '{}'", o))
                })
                .collect::<Result<Vec<_>>>()?;
            AllowOrigin::list(parsed)
        };

        Ok(Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::server::ServerBuilder;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_route() {
        let app = ServerBuilder::new().build().unwrap();

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["service"], SERVICE_NAME);
    }

    #[tokio::test]
    async fn test_cors_header_for_configured_origin() {
        let mut config = AppConfig::default_config();
        config.cors.allowed_origins = vec!["http://localhost:5173".to_string()];
        let app = ServerBuilder::new().with_config(config).build().unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = ServerBuilder::new().build().unwrap();
        let response = app
            .oneshot(Request::builder().uri("/timetables").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_no_origins_means_no_layer() {
        assert!(RestExposure::cors_layer(&CorsConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_origin_list() {
        let config = CorsConfig {
            allowed_origins: vec!["http://localhost:5173".to_string(), "*".to_string()],
        };
        assert!(RestExposure::cors_layer(&config).unwrap().is_some());

        let bad = CorsConfig {
            allowed_origins: vec!["bad\norigin".to_string()],
        };
        assert!(RestExposure::cors_layer(&bad).is_err());
    }
}
