//! Tests for enhancer server module

use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use prompt2json::config::Config;
use prompt2json::enhancer::server::{
    cors_response, handle_enhance, health, json_error_response, json_response, service_info,
    EnhancerServer, SERVICE_NAME,
};
use prompt2json::enhancer::PromptEnhancer;
use prompt2json::model::{Category, EnhancementRecord, OutputFormat};
use serde_json::Value;

fn test_enhancer() -> PromptEnhancer {
    PromptEnhancer::new(Arc::new(Config::default()))
}

async fn body_json(response: Response<Full<Bytes>>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn start_server() -> SocketAddr {
    let enhancer = Arc::new(test_enhancer());
    let server = EnhancerServer::bind(SocketAddr::from(([127, 0, 0, 1], 0)), enhancer)
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    server.spawn();
    addr
}

// ========================================================================
// handle_enhance Tests
// ========================================================================

#[tokio::test]
async fn test_handle_enhance_success() {
    let response =
        handle_enhance(br#"{"prompt": "Explain machine learning"}"#, &test_enhancer()).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["original_prompt"], "Explain machine learning");
    assert_eq!(json["enhanced_prompt"]["context"], "technical");
    assert_eq!(json["enhanced_prompt"]["problem"], "machine learning");
    assert_eq!(json["enhanced_prompt"]["output_format"], "detailed explanation");
    assert_eq!(json["metadata"]["detected_context"], "technical");
    assert_eq!(json["metadata"]["enhancement_version"], "1.0.0");
    assert!(json["metadata"]["processing_time"].is_string());
    assert!(json["metadata"]["confidence_score"].is_f64());
}

#[tokio::test]
async fn test_handle_enhance_empty_prompt() {
    let response = handle_enhance(br#"{"prompt": "   "}"#, &test_enhancer()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Prompt is empty");
}

#[tokio::test]
async fn test_handle_enhance_too_long() {
    let body = serde_json::json!({ "prompt": "x".repeat(1001) }).to_string();
    let response = handle_enhance(body.as_bytes(), &test_enhancer()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("too long"));
}

#[tokio::test]
async fn test_handle_enhance_too_short() {
    let response = handle_enhance(br#"{"prompt": "ab"}"#, &test_enhancer()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("too short"));
}

#[tokio::test]
async fn test_handle_enhance_wrong_type() {
    let response = handle_enhance(br#"{"prompt": 42}"#, &test_enhancer()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Prompt must be a string, got number");
}

#[tokio::test]
async fn test_handle_enhance_missing_prompt() {
    let response = handle_enhance(br#"{"text": "hello"}"#, &test_enhancer()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Prompt is required");
}

#[tokio::test]
async fn test_handle_enhance_invalid_json() {
    let response = handle_enhance(b"not json", &test_enhancer()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid request body");
}

#[tokio::test]
async fn test_handle_enhance_response_parses_as_record() {
    let response = handle_enhance(
        br#"{"prompt": "Compare Python and JavaScript for web development"}"#,
        &test_enhancer(),
    )
    .await;
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let record: EnhancementRecord = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(record.enhanced_prompt.context, Category::Technical);
    assert_eq!(
        record.enhanced_prompt.output_format,
        OutputFormat::ComparativeAnalysis
    );
}

#[tokio::test]
async fn test_handle_enhance_appends_to_enhancement_log() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("logs").join("enhancer.log");
    let enhancer = PromptEnhancer::new(Arc::new(Config {
        enable_logging: true,
        log_file: path.clone(),
        ..Config::default()
    }));

    let ok = handle_enhance(br#"{"prompt": "Write a poem about the sea"}"#, &enhancer).await;
    assert_eq!(ok.status(), StatusCode::OK);
    let rejected = handle_enhance(br#"{"prompt": "ab"}"#, &enhancer).await;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    // The write has finished by the time the response is returned
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("ENHANCED context=creative"));
    assert!(lines[1].contains("REJECTED"));
    assert!(lines[1].contains("prompt=\"ab\""));
}

// ========================================================================
// Info / Health Tests
// ========================================================================

#[tokio::test]
async fn test_service_info() {
    let response = service_info();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["name"], SERVICE_NAME);
    assert!(json["endpoints"]["POST /enhance"].is_string());
}

#[tokio::test]
async fn test_health() {
    let json = body_json(health()).await;
    assert_eq!(json["status"], "ok");
}

// ========================================================================
// JSON / CORS Helper Tests
// ========================================================================

#[test]
fn test_json_response_status_and_type() {
    let response = json_response(StatusCode::NOT_FOUND, r#"{"error":"not found"}"#);
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn test_json_error_response_escapes_message() {
    let response = json_error_response(StatusCode::BAD_REQUEST, "bad \"quoted\" input");
    let json = body_json(response).await;
    assert_eq!(json["error"], "bad \"quoted\" input");
}

#[test]
fn test_cors_response_adds_headers() {
    let response = Response::builder()
        .status(StatusCode::OK)
        .body(Full::new(Bytes::new()))
        .unwrap();

    let cors_resp = cors_response(response);
    let methods = cors_resp
        .headers()
        .get("Access-Control-Allow-Methods")
        .unwrap()
        .to_str()
        .unwrap();

    assert!(methods.contains("GET"));
    assert!(methods.contains("POST"));
    assert!(methods.contains("OPTIONS"));
    assert_eq!(
        cors_resp.headers().get("Access-Control-Allow-Origin").unwrap(),
        "*"
    );
    assert!(cors_resp
        .headers()
        .contains_key("Access-Control-Allow-Headers"));
}

// ========================================================================
// Live Server Tests
// ========================================================================

#[tokio::test]
async fn test_server_binds_ephemeral_port() {
    let addr = start_server().await;
    assert_ne!(addr.port(), 0);
}

#[tokio::test]
async fn test_server_enhance_round_trip() {
    let addr = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/enhance", addr))
        .json(&serde_json::json!({ "prompt": "Explain machine learning" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );

    let record: EnhancementRecord = response.json().await.unwrap();
    assert_eq!(record.original_prompt, "Explain machine learning");
    assert_eq!(record.enhanced_prompt.context, Category::Technical);
}

#[tokio::test]
async fn test_server_enhance_validation_error() {
    let addr = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/enhance", addr))
        .json(&serde_json::json!({ "prompt": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"], "Prompt is empty");
}

#[tokio::test]
async fn test_server_health_and_not_found() {
    let addr = start_server().await;
    let client = reqwest::Client::new();

    let health = client
        .get(format!("http://{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(health.status().as_u16(), 200);

    let missing = client
        .get(format!("http://{}/nope", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn test_server_cors_preflight() {
    let addr = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .request(reqwest::Method::OPTIONS, format!("http://{}/enhance", addr))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert!(response
        .headers()
        .contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn test_server_rejects_oversized_body() {
    let addr = start_server().await;
    let client = reqwest::Client::new();

    let huge = "x".repeat(2 * 1024 * 1024);
    let response = client
        .post(format!("http://{}/enhance", addr))
        .header("Content-Type", "application/json")
        .body(format!(r#"{{"prompt": "{}"}}"#, huge))
        .send()
        .await;

    // The server may close the connection before the upload finishes
    if let Ok(response) = response {
        assert_eq!(response.status().as_u16(), 413);
    }
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let enhancer = Arc::new(test_enhancer());
    let server = EnhancerServer::bind(SocketAddr::from(([127, 0, 0, 1], 0)), enhancer)
        .await
        .unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_until(async {
        let _ = rx.await;
    }));

    tx.send(()).unwrap();
    let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
