//! In-memory stand-in for the remote promotion service.
//!
//! Serves the same routes and wire shapes the clients in this crate talk to, so the
//! wizard can be exercised end to end without the real backend.

mod api;
mod auth;
mod errors;
mod store;

pub use errors::{AppError, ErrorDetails, ErrorResponse};
pub use store::{KindCatalog, PromotionStore, CUSTOMER_TAG, FREE_PRODUCT};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::catalog::{ACTION_KINDS_PATH, CONDITION_KINDS_PATH};
use crate::client::PROMOTIONS_PATH;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct MockState {
    pub store: Arc<PromotionStore>,
    pub kinds: Arc<KindCatalog>,
    pub api_key: Option<String>,
    metadata_requests: Arc<AtomicUsize>,
}

impl MockState {
    pub fn new(store: PromotionStore, api_key: Option<String>) -> Self {
        Self::with_kinds(store, KindCatalog::default(), api_key)
    }

    pub fn with_kinds(store: PromotionStore, kinds: KindCatalog, api_key: Option<String>) -> Self {
        Self {
            store: Arc::new(store),
            kinds: Arc::new(kinds),
            api_key,
            metadata_requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many metadata requests have been served.
    pub fn metadata_requests(&self) -> usize {
        self.metadata_requests.load(Ordering::Relaxed)
    }
}

/// Create the mock router with all routes.
pub fn create_router(state: MockState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.api_key.clone();
    let promotion_path = format!("{}/{{id}}", PROMOTIONS_PATH);

    let api_routes = Router::new()
        .route(
            PROMOTIONS_PATH,
            get(api::list_promotions).post(api::create_promotion),
        )
        .route(
            &promotion_path,
            get(api::get_promotion)
                .put(api::update_promotion)
                .delete(api::delete_promotion),
        )
        .route(CONDITION_KINDS_PATH, get(api::condition_kinds))
        .route(ACTION_KINDS_PATH, get(api::action_kinds))
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_skips_auth() {
        let app = create_router(MockState::new(
            PromotionStore::new(),
            Some("secret".to_string()),
        ));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_key_is_rejected() {
        let app = create_router(MockState::new(
            PromotionStore::seeded(),
            Some("secret".to_string()),
        ));
        let response = app
            .oneshot(Request::get(PROMOTIONS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert!(!error.success);
        assert_eq!(error.error.code, "UNAUTHORIZED");
    }

    async fn post_body(body: &'static str) -> (StatusCode, ErrorResponse) {
        let app = create_router(MockState::new(PromotionStore::new(), None));
        let response = app
            .oneshot(
                Request::post(PROMOTIONS_PATH)
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_incomplete_body_is_a_validation_error() {
        let (status, error) = post_body(
            r#"{"name":"No condition","description":"","startDate":"2026-01-01T00:00:00.000Z","endDate":"2026-02-01T00:00:00.000Z","isActive":true,"action":{"actionType":"FIXED_DISCOUNT","configuration":{"discountFixed":5}}}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.error.code, "VALIDATION_ERROR");
        assert!(error.error.message.contains("condition"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_bad_request() {
        let (status, error) = post_body("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error.error.code, "BAD_REQUEST");
        assert!(!error.success);
    }

    #[tokio::test]
    async fn test_unknown_promotion_is_not_found() {
        let app = create_router(MockState::new(PromotionStore::new(), None));
        let response = app
            .oneshot(
                Request::get("/promotions/missing")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
