use axum::routing::{get, post};
use axum::Router;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all admin endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/health", get(handler::health_handler))
        .route("/v1/logs", get(handler::logs_handler))
        .route("/v1/admin/enroll", post(handler::enroll_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::util::ServiceExt;

    use wicket_ledger::{InMemoryLedger, SigningKey};
    use wicket_types::ArtifactRef;
    use wicket_verify::{BiometricMatcher, MatchCandidate, MatcherError, VerificationClient};

    use super::*;

    struct AcceptingMatcher;

    #[async_trait]
    impl BiometricMatcher for AcceptingMatcher {
        async fn identify(&self, _probe: &ArtifactRef) -> Result<MatchCandidate, MatcherError> {
            Ok(MatchCandidate::none(0.0))
        }

        async fn enroll(&self, _reference: &[u8], _hint: Option<&str>) -> Result<bool, MatcherError> {
            Ok(true)
        }
    }

    fn test_state() -> (SigningKey, AppState) {
        let key = SigningKey::generate();
        let ledger = Arc::new(InMemoryLedger::new(&key.verifying_key()));
        let verifier = VerificationClient::new(Arc::new(AcceptingMatcher));
        (key, AppState::new(ledger, verifier))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (_key, state) = test_state();
        let response = build_router(state)
            .oneshot(Request::get("/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn logs_endpoint_empty_ledger() {
        let (_key, state) = test_state();
        let response = build_router(state)
            .oneshot(Request::get("/v1/logs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["logs"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn gated_logs_require_the_authorized_identity() {
        let (key, state) = test_state();
        let router = build_router(state.with_gated_reads());

        let denied = router
            .clone()
            .oneshot(Request::get("/v1/logs").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);

        let allowed = router
            .oneshot(
                Request::get("/v1/logs")
                    .header(crate::handler::IDENTITY_HEADER, key.identity().to_hex())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(allowed.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn enroll_rejects_wrong_identity() {
        let (_key, state) = test_state();
        let intruder = SigningKey::generate().identity().to_hex();
        let body = serde_json::json!({
            "referenceImage": "aGVsbG8=",
            "identity": intruder,
        });

        let response = build_router(state)
            .oneshot(
                Request::post("/v1/admin/enroll")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn enroll_accepts_authorized_identity() {
        let (key, state) = test_state();
        let body = serde_json::json!({
            "referenceImage": "aGVsbG8=",
            "identity": key.identity().to_hex(),
            "subjectHint": "S7",
        });

        let response = build_router(state)
            .oneshot(
                Request::post("/v1/admin/enroll")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], true);
    }

    #[tokio::test]
    async fn enroll_rejects_bad_base64() {
        let (key, state) = test_state();
        let body = serde_json::json!({
            "referenceImage": "not base64!!!",
            "identity": key.identity().to_hex(),
        });

        let response = build_router(state)
            .oneshot(
                Request::post("/v1/admin/enroll")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
