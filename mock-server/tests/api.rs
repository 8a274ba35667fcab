use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use tower::ServiceExt;

const API_KEY: &str = "campaign-key";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn push_body(label: &str, tag_id: &str, user_id: &str) -> String {
    format!(
        r#"{{"api_key":"{API_KEY}","label":"{label}","tags":[{{"id":"{tag_id}","name":"item {tag_id}","desc":"item {tag_id}"}}],"profiles":{{"user_id":"{user_id}"}}}}"#
    )
}

// --- verify ---

#[tokio::test]
async fn verify_success() {
    let app = app(API_KEY);
    let resp = app
        .oneshot(json_request(
            "/verify/v2",
            &format!(r#"{{"api_key":"{API_KEY}"}}"#),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({ "success": true }));
}

#[tokio::test]
async fn verify_invalid_key() {
    let app = app(API_KEY);
    let resp = app
        .oneshot(json_request("/verify/v2", r#"{"api_key":"wrong"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "invalid api key");
}

// --- push ---

#[tokio::test]
async fn push_records_event() {
    let app = app(API_KEY);
    let resp = app
        .oneshot(json_request("/push/v2", &push_body("click", "18", "42")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn push_invalid_key_is_rejected() {
    let app = app(API_KEY);
    let resp = app
        .oneshot(json_request(
            "/push/v2",
            r#"{"api_key":"wrong","label":"click","profiles":{"user_id":"42"}}"#,
        ))
        .await
        .unwrap();

    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "invalid api key");
}

#[tokio::test]
async fn push_missing_label_is_client_error() {
    let app = app(API_KEY);
    let resp = app
        .oneshot(json_request(
            "/push/v2",
            &format!(r#"{{"api_key":"{API_KEY}","profiles":{{"user_id":"42"}}}}"#),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let _ = body_bytes(resp).await;
}

// --- recom ---

#[tokio::test]
async fn push_then_recom_returns_normalized_scores() {
    let app = app(API_KEY);
    for tag_id in ["18", "18", "19"] {
        let resp = app
            .clone()
            .oneshot(json_request("/push/v2", &push_body("click", tag_id, "42")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .oneshot(json_request(
            "/recom/v2",
            &format!(
                r#"{{"api_key":"{API_KEY}","labels":["click"],"profiles":{{"user_id":"42"}}}}"#
            ),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], true);
    let click = body["click"].as_object().unwrap();
    assert_eq!(click.len(), 2);
    assert!((click["18"].as_f64().unwrap() - 2.0 / 3.0).abs() < 1e-9);
    assert!((click["19"].as_f64().unwrap() - 1.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn recom_unknown_label_returns_empty_mapping() {
    let app = app(API_KEY);
    let resp = app
        .oneshot(json_request(
            "/recom/v2",
            &format!(r#"{{"api_key":"{API_KEY}","labels":["buy"],"profiles":{{"user_id":"42"}}}}"#),
        ))
        .await
        .unwrap();

    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["buy"], serde_json::json!({}));
}

#[tokio::test]
async fn recom_filters_by_profile_overlap() {
    let app = app(API_KEY);
    let resp = app
        .clone()
        .oneshot(json_request("/push/v2", &push_body("click", "18", "42")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(json_request(
            "/recom/v2",
            &format!(
                r#"{{"api_key":"{API_KEY}","labels":["click"],"profiles":{{"user_id":"43"}}}}"#
            ),
        ))
        .await
        .unwrap();

    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["click"], serde_json::json!({}));
}

#[tokio::test]
async fn recom_invalid_key_is_rejected() {
    let app = app(API_KEY);
    let resp = app
        .oneshot(json_request(
            "/recom/v2",
            r#"{"api_key":"wrong","labels":["click"],"profiles":{"user_id":"42"}}"#,
        ))
        .await
        .unwrap();

    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["success"], false);
}
