use crate::{controller::health_check_controller, AppState};
use axum::{routing::get, Json, Router};

use crate::controller::{meeting_controller, oauth_controller};

use utoipa::OpenApi;

// This is the global definition of our OpenAPI spec. To be a part
// of the rendered spec, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "Zoom Meeting Relay"
        ),
        paths(
            oauth_controller::authorize,
            oauth_controller::callback,
            meeting_controller::create,
            health_check_controller::health_check,
        ),
        tags(
            (name = "zoom_relay", description = "Zoom OAuth relay that schedules a meeting per authorization")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(oauth_routes(app_state.clone()))
        .merge(meeting_routes(app_state))
        .merge(health_routes())
        .merge(api_doc_routes())
}

fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(oauth_controller::authorize))
        .route("/callback", get(oauth_controller::callback))
        .with_state(app_state)
}

fn meeting_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/meeting", get(meeting_controller::create))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn api_doc_routes() -> Router {
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use domain::{MemoryStorage, TokenSet, TokenStorage};
    use mockito::{Matcher, Server};
    use secrecy::ExposeSecret;
    use serde_json::{json, Value};
    use service::config::Config;
    use std::sync::Arc;
    use tower::ServiceExt;

    // base64("test-client-id:test-client-secret")
    const BASIC_AUTH: &str = "Basic dGVzdC1jbGllbnQtaWQ6dGVzdC1jbGllbnQtc2VjcmV0";

    fn test_config(server_url: &str) -> Config {
        Config::try_from_args([
            "zoom_relay",
            "--client-id",
            "test-client-id",
            "--client-secret",
            "test-client-secret",
            "--redirect-uri",
            "http://localhost:3000/callback",
            "--zoom-oauth-base-url",
            server_url,
            "--zoom-api-base-url",
            server_url,
            "--http-max-retries",
            "0",
        ])
        .unwrap()
    }

    fn test_app(server_url: &str, storage: Arc<MemoryStorage>) -> Router {
        let storage: Arc<dyn TokenStorage> = storage;
        let app_state = AppState::new(test_config(server_url), storage).unwrap();
        define_routes(app_state)
    }

    async fn send_get(app: Router, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_authorize_redirects_to_zoom() {
        let app = test_app("https://zoom.test", Arc::new(MemoryStorage::new()));

        let response = send_get(app, "/").await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            location(&response),
            "https://zoom.test/oauth/authorize?response_type=code&client_id=test-client-id\
             &redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback"
        );
    }

    #[tokio::test]
    async fn test_callback_redirects_to_join_url() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/oauth/token")
            .match_header("authorization", BASIC_AUTH)
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "abc123".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"tok1"}"#)
            .create_async()
            .await;
        let meeting = server
            .mock("POST", "/users/me/meetings")
            .match_header("authorization", "Bearer tok1")
            .with_status(201)
            .with_body(r#"{"join_url":"https://z.us/j/1"}"#)
            .create_async()
            .await;
        let storage = Arc::new(MemoryStorage::new());
        let app = test_app(&server.url(), storage.clone());

        let response = send_get(app, "/callback?code=abc123").await;

        token.assert_async().await;
        meeting.assert_async().await;
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "https://z.us/j/1");
        let stored = storage.load().await.unwrap();
        assert_eq!(stored.access_token.expose_secret(), "tok1");
    }

    #[tokio::test]
    async fn test_callback_with_rejected_code() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/oauth/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;
        let app = test_app(&server.url(), Arc::new(MemoryStorage::new()));

        let response = send_get(app, "/callback?code=bad").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({
                "error": "Failed to obtain access token",
                "details": {"error": "invalid_grant"}
            })
        );
    }

    #[tokio::test]
    async fn test_callback_without_code() {
        let app = test_app("https://zoom.test", Arc::new(MemoryStorage::new()));

        let response = send_get(app, "/callback").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Missing authorization code"})
        );
    }

    #[tokio::test]
    async fn test_callback_with_repeated_code() {
        let mut server = Server::new_async().await;
        let token = server
            .mock("POST", "/oauth/token")
            .expect(0)
            .create_async()
            .await;
        let app = test_app(&server.url(), Arc::new(MemoryStorage::new()));

        let response = send_get(app, "/callback?code=a&code=b").await;

        token.assert_async().await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], json!("Invalid query string"));
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_callback_when_scheduling_fails() {
        let mut server = Server::new_async().await;
        let _token = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body(r#"{"access_token":"tok1"}"#)
            .create_async()
            .await;
        let _meeting = server
            .mock("POST", "/users/me/meetings")
            .with_status(400)
            .with_body(r#"{"code":300,"message":"Invalid start_time"}"#)
            .create_async()
            .await;
        let app = test_app(&server.url(), Arc::new(MemoryStorage::new()));

        let response = send_get(app, "/callback?code=abc123").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({
                "error": "Failed to schedule meeting",
                "details": {"code": 300, "message": "Invalid start_time"}
            })
        );
    }

    #[tokio::test]
    async fn test_meeting_uses_stored_token() {
        let mut server = Server::new_async().await;
        let _meeting = server
            .mock("POST", "/users/me/meetings")
            .match_header("authorization", "Bearer stored")
            .with_status(201)
            .with_body(r#"{"join_url":"https://z.us/j/9"}"#)
            .create_async()
            .await;
        let storage = Arc::new(MemoryStorage::with_tokens(TokenSet::new("stored")));
        let app = test_app(&server.url(), storage);

        let response = send_get(app, "/meeting").await;

        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&response), "https://z.us/j/9");
    }

    #[tokio::test]
    async fn test_meeting_without_stored_token() {
        let app = test_app("https://zoom.test", Arc::new(MemoryStorage::new()));

        let response = send_get(app, "/meeting").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await["error"],
            json!("Failed to obtain access token")
        );
    }

    #[tokio::test]
    async fn test_health() {
        let app = test_app("https://zoom.test", Arc::new(MemoryStorage::new()));

        let response = send_get(app, "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"healthy");
    }

    #[tokio::test]
    async fn test_openapi_document_lists_routes() {
        let app = test_app("https://zoom.test", Arc::new(MemoryStorage::new()));

        let response = send_get(app, "/api-docs/openapi.json").await;

        assert_eq!(response.status(), StatusCode::OK);
        let paths = json_body(response).await["paths"].clone();
        for path in ["/", "/callback", "/meeting", "/health"] {
            assert!(paths.get(path).is_some(), "missing {path}");
        }
    }
}
