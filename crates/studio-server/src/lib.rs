pub mod routes;
pub mod state;

use axum::Router;
use studio_core::config::StudioConfig;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = state.config.server.cors;

    let mut app = Router::new()
        .merge(routes::health_routes())
        .merge(routes::agent_routes())
        .merge(routes::chat_routes())
        .with_state(state);

    app = app.layer(TraceLayer::new_for_http());

    // The browser front end is served from its own origin during
    // development, so CORS stays permissive unless disabled.
    if cors {
        app = app.layer(CorsLayer::permissive());
    }

    app
}

/// Start the HTTP server.
pub async fn serve(config: StudioConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config);
    let router = build_router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use studio_core::completion::CompletionBackend;
    use studio_core::StudioError;
    use tower::ServiceExt;

    struct ReplyBackend(&'static str);

    #[async_trait]
    impl CompletionBackend for ReplyBackend {
        async fn complete(&self, _: &str, _: &str) -> Result<String, StudioError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingBackend;

    #[async_trait]
    impl CompletionBackend for FailingBackend {
        async fn complete(&self, _: &str, _: &str) -> Result<String, StudioError> {
            Err(StudioError::RemoteCallFailed {
                status: Some(429),
                message: "Too Many Requests".into(),
            })
        }
    }

    fn test_router(backend: Arc<dyn CompletionBackend>) -> Router {
        build_router(AppState::with_backend(StudioConfig::default(), backend))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_ok() {
        let app = test_router(Arc::new(ReplyBackend("unused")));
        let resp = app.oneshot(get("/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_agents_returns_seed_profiles() {
        let app = test_router(Arc::new(ReplyBackend("unused")));
        let resp = app.oneshot(get("/v1/agents")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        let agents = json["agents"].as_array().unwrap();
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0]["name"], "General Assistant");
        assert_eq!(json["active_id"], agents[0]["id"]);
    }

    #[tokio::test]
    async fn test_create_agent_created() {
        let app = test_router(Arc::new(ReplyBackend("unused")));
        let resp = app
            .clone()
            .oneshot(post_json("/v1/agents", "{}"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let json = body_json(resp).await;
        assert_eq!(json["name"], "New Agent");
    }

    #[tokio::test]
    async fn test_update_unknown_agent_not_found() {
        let app = test_router(Arc::new(ReplyBackend("unused")));
        let req = Request::builder()
            .method("PATCH")
            .uri("/v1/agents/missing")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"Renamed"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_last_agent_conflict() {
        let app = test_router(Arc::new(ReplyBackend("unused")));

        let json = body_json(app.clone().oneshot(get("/v1/agents")).await.unwrap()).await;
        let first = json["agents"][0]["id"].as_str().unwrap().to_string();
        let second = json["agents"][1]["id"].as_str().unwrap().to_string();

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/v1/agents/{second}"))
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = Request::builder()
            .method("DELETE")
            .uri(format!("/v1/agents/{first}"))
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_activate_unknown_agent_not_found() {
        let app = test_router(Arc::new(ReplyBackend("unused")));
        let resp = app
            .oneshot(post_json("/v1/agents/missing/activate", "{}"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_turns_for_unknown_agent_not_found() {
        let app = test_router(Arc::new(ReplyBackend("unused")));
        let resp = app.oneshot(get("/v1/agents/missing/turns")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_round_trip() {
        let app = test_router(Arc::new(ReplyBackend("Recursion is...")));

        let resp = app
            .clone()
            .oneshot(post_json("/v1/chat", r#"{"message":"explain recursion"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["reply"]["role"], "assistant");
        assert_eq!(json["reply"]["content"], "Recursion is...");

        let agents = body_json(app.clone().oneshot(get("/v1/agents")).await.unwrap()).await;
        let active = agents["active_id"].as_str().unwrap().to_string();
        let turns = body_json(
            app.oneshot(get(&format!("/v1/agents/{active}/turns")))
                .await
                .unwrap(),
        )
        .await;
        let turns = turns["turns"].as_array().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0]["role"], "user");
        assert_eq!(turns[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_blank_chat_message_bad_request() {
        let app = test_router(Arc::new(ReplyBackend("unused")));
        let resp = app
            .oneshot(post_json("/v1/chat", r#"{"message":"   "}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remote_failure_maps_to_bad_gateway_with_notice() {
        let app = test_router(Arc::new(FailingBackend));
        let resp = app
            .clone()
            .oneshot(post_json("/v1/chat", r#"{"message":"hello"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(resp).await;
        assert_eq!(
            json["error"],
            studio_core::COMPLETION_FAILED_NOTICE
        );

        // The pending user turn survives the failure.
        let status = body_json(app.clone().oneshot(get("/v1/status")).await.unwrap()).await;
        let active = status["active_id"].as_str().unwrap().to_string();
        let turns = body_json(
            app.oneshot(get(&format!("/v1/agents/{active}/turns")))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(turns["turns"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_status_reports_idle_and_last_error() {
        let app = test_router(Arc::new(FailingBackend));
        let _ = app
            .clone()
            .oneshot(post_json("/v1/chat", r#"{"message":"hello"}"#))
            .await
            .unwrap();

        let status = body_json(app.oneshot(get("/v1/status")).await.unwrap()).await;
        assert_eq!(status["busy"], false);
        assert_eq!(status["last_error"], studio_core::COMPLETION_FAILED_NOTICE);
    }
}
