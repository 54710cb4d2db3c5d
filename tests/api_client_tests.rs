mod common;

use std::sync::Arc;

use discolog::auth::AuthManager;
use discolog::client::{ApiClient, SearchKind};
use discolog::error::Error;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{expired_token, token_response_json, valid_token, MemoryStore, TestNavigator};

const APP_URL: &str = "https://app.test/library";

async fn api_with_session(
    server: &MockServer,
    seed: impl FnOnce(&discolog::auth::SessionStore),
) -> ApiClient {
    let store = Arc::new(MemoryStore::new());
    let navigator = Arc::new(TestNavigator::at(APP_URL));
    let auth = AuthManager::new(store, navigator)
        .with_token_url(format!("{}/api/token", server.uri()));
    auth.session().set_client_id("app-1").unwrap();
    seed(auth.session());
    ApiClient::new(Arc::new(auth)).with_api_url(server.uri())
}

fn search_body() -> serde_json::Value {
    json!({
        "albums": {
            "items": [
                {
                    "id": "alb-1",
                    "name": "Aquemini",
                    "album_type": "album",
                    "release_date": "1998-09-29",
                    "artists": [{"id": "art-1", "name": "OutKast"}],
                    "images": [{"url": "https://img.test/a.jpg", "width": 250, "height": 250}]
                }
            ],
            "total": 1,
            "limit": 20,
            "offset": 0
        }
    })
}

#[tokio::test]
async fn search_sends_bearer_and_query_params() {
    let server = MockServer::start().await;
    let api = api_with_session(&server, |session| {
        session.save_token(&valid_token("tok-1")).unwrap();
    })
    .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer tok-1"))
        .and(query_param("q", "aquemini"))
        .and(query_param("type", "album,track"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body()))
        .expect(1)
        .mount(&server)
        .await;

    let results = api
        .search("aquemini", &[SearchKind::Album, SearchKind::Track], 20, 0)
        .await
        .expect("search should succeed");

    let albums = results.albums.expect("albums envelope");
    assert_eq!(albums.items.len(), 1);
    assert_eq!(albums.items[0].name, "Aquemini");
    assert_eq!(albums.items[0].artists[0].name, "OutKast");
    assert!(results.tracks.is_none());
}

#[tokio::test]
async fn empty_query_params_are_dropped_from_url() {
    let server = MockServer::start().await;
    let api = api_with_session(&server, |session| {
        session.save_token(&valid_token("tok-1")).unwrap();
    })
    .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let _: serde_json::Value = api
        .fetch_json("/search", &[("q", "aquemini"), ("market", "")])
        .await
        .expect("fetch should succeed");

    let requests = server.received_requests().await.expect("recording enabled");
    let query = requests[0].url.query().unwrap_or_default();
    assert!(query.contains("q=aquemini"));
    assert!(!query.contains("market"));
}

#[tokio::test]
async fn expired_token_is_refreshed_before_first_request() {
    let server = MockServer::start().await;
    let api = api_with_session(&server, |session| {
        session
            .save_token(&expired_token("stale", Some("refresh-1")))
            .unwrap();
    })
    .await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response_json("tok-2", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Refreshed token is accepted on the retried request.
    Mock::given(method("GET"))
        .and(path("/albums/alb-1"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "alb-1",
            "name": "Aquemini"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let album = api.album("alb-1").await.expect("album fetch should succeed");
    assert_eq!(album.name, "Aquemini");
}

#[tokio::test]
async fn revoked_token_triggers_refresh_then_retry_on_401() {
    let server = MockServer::start().await;
    let api = api_with_session(&server, |session| {
        // Locally valid, but the server has revoked it.
        session.save_token(&valid_token("revoked")).unwrap();
    })
    .await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response_json("tok-2", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tracks/trk-1"))
        .and(header("authorization", "Bearer revoked"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/tracks/trk-1"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "trk-1",
            "name": "Rosa Parks",
            "duration_ms": 321000
        })))
        .expect(1)
        .mount(&server)
        .await;

    let track = api.track("trk-1").await.expect("track fetch should succeed");
    assert_eq!(track.name, "Rosa Parks");
    assert_eq!(track.duration_ms, Some(321_000));
}

#[tokio::test]
async fn expired_session_without_refresh_token_never_reaches_api() {
    let server = MockServer::start().await;
    let api = api_with_session(&server, |session| {
        session.save_token(&expired_token("stale", None)).unwrap();
    })
    .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    assert!(matches!(
        api.album("alb-1").await,
        Err(Error::SessionExpired)
    ));
}

#[tokio::test]
async fn second_unauthorized_after_refresh_fails_without_more_retries() {
    let server = MockServer::start().await;
    let api = api_with_session(&server, |session| {
        session.save_token(&valid_token("revoked")).unwrap();
    })
    .await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(token_response_json("tok-2", None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    // Still 401 after refresh: exactly two API hits, then give up.
    Mock::given(method("GET"))
        .and(path("/albums/alb-1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    assert!(matches!(
        api.album("alb-1").await,
        Err(Error::SessionExpired)
    ));
}

#[tokio::test]
async fn non_success_status_surfaces_as_api_error() {
    let server = MockServer::start().await;
    let api = api_with_session(&server, |session| {
        session.save_token(&valid_token("tok-1")).unwrap();
    })
    .await;

    Mock::given(method("GET"))
        .and(path("/albums/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("album not found"))
        .expect(1)
        .mount(&server)
        .await;

    match api.album("missing").await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "album not found");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}
