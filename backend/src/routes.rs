use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::{handlers, request_context::request_id_middleware, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/wordpress/posts", get(handlers::list_posts))
        .route("/api/wordpress/posts/:slug", get(handlers::get_post))
        .route("/api/wordpress/categories", get(handlers::list_categories))
        .route("/api/wordpress/categories/featured", get(handlers::featured_categories))
        .route("/api/wordpress/categories/counts", get(handlers::category_counts))
        .route("/api/wordpress/tags", get(handlers::list_tags))
        .with_state(state)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::create_router;
    use crate::{
        aggregate::tests::{raw_post, FailureKind, FakeSource},
        boost::KeywordBoost,
        request_context::REQUEST_ID_HEADER,
        state::AppState,
    };

    fn app(source: FakeSource) -> Router {
        let boost = KeywordBoost::new(["wellness", "exam"], Some("pet-wellness-exams".to_string()));
        create_router(AppState::new(Arc::new(source), Arc::new(boost)))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&body).expect("json body"))
    }

    #[tokio::test]
    async fn lists_normalized_posts_in_envelope() {
        let source = FakeSource::default().with_category(2, "Nutrition", &["kibble", "treats"]);

        let (status, body) = get_json(app(source), "/api/wordpress/posts?categories=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"][0]["slug"], "kibble");
        assert_eq!(body["data"][0]["title"], "Untitled Article");
        assert!(body["data"][0]["readingTime"].as_u64().is_some_and(|minutes| minutes >= 1));
    }

    #[tokio::test]
    async fn malformed_query_is_a_bad_request_envelope() {
        let (status, body) =
            get_json(app(FakeSource::default()), "/api/wordpress/posts?tags=fleas").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_500_envelope() {
        let source = FakeSource::default()
            .with_category(2, "Nutrition", &["kibble"])
            .failing(2);

        let (status, body) = get_json(app(source), "/api/wordpress/posts?categories=2").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch posts from WordPress");
        assert_eq!(body["message"], "WordPress API error: 502 Bad Gateway");
    }

    #[tokio::test]
    async fn upstream_timeout_maps_to_504_envelope() {
        let source = FakeSource::default()
            .with_category(2, "Nutrition", &["kibble"])
            .failing_with(2, FailureKind::Timeout);

        let (status, body) = get_json(app(source), "/api/wordpress/posts?categories=2").await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Failed to fetch posts from WordPress");
        assert_eq!(body["message"], "WordPress request to `posts` timed out after 2s");
    }

    #[tokio::test]
    async fn cancelled_upstream_maps_to_503_envelope() {
        let source = FakeSource::default()
            .with_category(2, "Nutrition", &["kibble"])
            .failing_with(2, FailureKind::Cancelled);

        let (status, body) = get_json(app(source), "/api/wordpress/posts?categories=2").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Failed to fetch posts from WordPress");
        assert_eq!(body["message"], "WordPress request cancelled");
    }

    #[tokio::test]
    async fn post_by_slug_found_and_missing() {
        let mut source = FakeSource::default();
        source.recent = vec![raw_post(12, "pet-wellness-exams")];
        let app = app(source);

        let (status, body) = get_json(app.clone(), "/api/wordpress/posts/pet-wellness-exams").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["id"], "12");

        let (status, body) = get_json(app, "/api/wordpress/posts/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({"success": false, "error": "Post not found"}));
    }

    #[tokio::test]
    async fn categories_honor_uncategorized_flag() {
        let source = || {
            FakeSource::default()
                .with_category(1, "Uncategorized", &["misc"])
                .with_category(2, "Nutrition", &["kibble", "treats", "raw", "water"])
        };

        let (_, body) = get_json(app(source()), "/api/wordpress/categories?per_page=2").await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["posts"].as_array().map(Vec::len), Some(2));

        let (_, body) = get_json(
            app(source()),
            "/api/wordpress/categories?include_uncategorized=true",
        )
        .await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["data"][1]["category"]["name"], "Uncategorized");
    }

    #[tokio::test]
    async fn featured_listing_puts_wellness_first() {
        let source = FakeSource::default()
            .with_category(2, "Nutrition", &["kibble"])
            .with_category(5, "Pet Wellness Exams", &["vaccines", "pet-wellness-exams"]);

        let (status, body) = get_json(app(source), "/api/wordpress/categories/featured").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["category"]["name"], "Pet Wellness Exams");
        assert_eq!(body["data"][0]["posts"][0]["slug"], "pet-wellness-exams");
    }

    #[tokio::test]
    async fn counts_and_tags_endpoints() {
        let source = FakeSource::default().with_category(2, "Nutrition", &["kibble"]);
        let app = app(source);

        let (_, body) = get_json(app.clone(), "/api/wordpress/categories/counts").await;
        assert_eq!(body["data"], serde_json::json!([
            {"id": 2, "name": "Nutrition", "slug": "nutrition", "count": 1, "parent": 0}
        ]));

        let (_, body) = get_json(app, "/api/wordpress/tags").await;
        assert_eq!(body["data"][0]["name"], "puppies");
    }

    #[tokio::test]
    async fn echoes_or_generates_request_id() {
        let app = app(FakeSource::default());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/wordpress/tags")
                    .header(REQUEST_ID_HEADER, "req-from-proxy")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert_eq!(
            response.headers().get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()),
            Some("req-from-proxy")
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/wordpress/tags")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert!(response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|id| id.starts_with("req-")));
    }
}
