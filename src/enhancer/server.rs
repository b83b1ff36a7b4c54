//! Enhancer Server - HTTP boundary for the browser extension
//!
//! Routes:
//! - `GET /` service info
//! - `GET /health` liveness
//! - `POST /enhance` `{ "prompt": "..." }` -> enhancement record

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderName, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::PromptEnhancer;
use crate::enhancement_log::{self, LogEntry};
use crate::model::ENHANCEMENT_VERSION;

/// Maximum request body size (1MB)
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Service name reported by `GET /`
pub const SERVICE_NAME: &str = "Prompt-to-JSON Enhancer API";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Enhancer HTTP Server
pub struct EnhancerServer {
    listener: TcpListener,
    enhancer: Arc<PromptEnhancer>,
}

impl EnhancerServer {
    /// Bind the listener. Port 0 picks a free port; see [`Self::local_addr`].
    pub async fn bind(addr: SocketAddr, enhancer: Arc<PromptEnhancer>) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        Ok(Self { listener, enhancer })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        info!("Enhancer server started: http://{}", addr);

        tokio::pin!(shutdown);

        loop {
            let accepted = tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping enhancer server");
                    break;
                }
                accepted = self.listener.accept() => accepted,
            };

            let (stream, _) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let io = TokioIo::new(stream);
            let enhancer = self.enhancer.clone();

            tokio::spawn(async move {
                let service = service_fn(|req| {
                    let enhancer = enhancer.clone();
                    async move { handle_request(req, enhancer).await }
                });

                if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                    if !e.to_string().contains("connection closed") {
                        error!("Error serving connection: {}", e);
                    }
                }
            });
        }

        Ok(())
    }

    /// Serve in a background task until the process exits
    pub fn spawn(self) -> JoinHandle<Result<()>> {
        tokio::spawn(self.run_until(std::future::pending()))
    }
}

/// Handle HTTP request
async fn handle_request(
    req: Request<Incoming>,
    enhancer: Arc<PromptEnhancer>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let span = info_span!("request", id = %request_id, method = %method, path = %path);

    let response = async move {
        // Handle CORS preflight
        if method == Method::OPTIONS {
            return Response::builder()
                .status(StatusCode::OK)
                .body(Full::new(Bytes::new()))
                .unwrap();
        }

        match (method, path.as_str()) {
            (Method::GET, "/") => service_info(),
            (Method::GET, "/health") => health(),
            (Method::POST, "/enhance") => match read_body_with_limit(req, MAX_BODY_SIZE).await {
                Ok(body) => handle_enhance(&body, &enhancer).await,
                Err((status, message)) => {
                    warn!("Rejected request body: {}", message);
                    json_error_response(status, &message)
                }
            },
            _ => Response::builder()
                .status(StatusCode::NOT_FOUND)
                .header("Content-Type", "text/plain")
                .body(Full::new(Bytes::from("Not Found")))
                .unwrap(),
        }
    }
    .instrument(span)
    .await;

    let mut response = cors_response(response);
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    Ok(response)
}

/// Enhance a `POST /enhance` body
pub async fn handle_enhance(body: &[u8], enhancer: &PromptEnhancer) -> Response<Full<Bytes>> {
    let request: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(_) => {
            return json_error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    let prompt = match request.get("prompt") {
        Some(p) => p,
        None => {
            return json_error_response(StatusCode::BAD_REQUEST, "Prompt is required");
        }
    };

    match enhancer.enhance_value(prompt) {
        Ok(record) => {
            enhancement_log::log_entry_async(enhancer.config(), &LogEntry::Enhanced(&record))
                .await;
            match serde_json::to_string(&record) {
                Ok(body) => json_response(StatusCode::OK, &body),
                Err(e) => {
                    error!("Failed to serialize record: {}", e);
                    json_error_response(StatusCode::INTERNAL_SERVER_ERROR, "Serialization failed")
                }
            }
        }
        Err(e) => {
            info!("Validation failed: {}", e);
            let raw = prompt.as_str().unwrap_or_default();
            enhancement_log::log_entry_async(
                enhancer.config(),
                &LogEntry::Rejected {
                    prompt: raw,
                    error: &e,
                },
            )
            .await;
            json_error_response(StatusCode::BAD_REQUEST, &e.to_string())
        }
    }
}

/// `GET /` body
pub fn service_info() -> Response<Full<Bytes>> {
    let body = json!({
        "name": SERVICE_NAME,
        "version": ENHANCEMENT_VERSION,
        "status": "ok",
        "endpoints": {
            "GET /health": "Returns service status",
            "POST /enhance": "Body: { prompt: string } -> { original_prompt, enhanced_prompt { context, problem, expected_solution, output_format }, metadata }"
        }
    });
    json_response(StatusCode::OK, &body.to_string())
}

/// `GET /health` body
pub fn health() -> Response<Full<Bytes>> {
    let body = json!({"status": "ok", "version": ENHANCEMENT_VERSION});
    json_response(StatusCode::OK, &body.to_string())
}

/// Add CORS headers. Any origin is allowed: the caller is an extension
/// content script running on third-party chat pages.
pub fn cors_response(mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    let headers = response.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// Read request body with size limit (streaming enforcement to prevent memory exhaustion)
async fn read_body_with_limit(
    req: Request<Incoming>,
    max_size: usize,
) -> Result<Bytes, (StatusCode, String)> {
    let limited = Limited::new(req.into_body(), max_size);
    match limited.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) => {
            let err_str = e.to_string();
            if err_str.contains("length limit exceeded") {
                Err((
                    StatusCode::PAYLOAD_TOO_LARGE,
                    format!("Request body too large (max {} bytes)", max_size),
                ))
            } else {
                Err((StatusCode::BAD_REQUEST, "Failed to read body".to_string()))
            }
        }
    }
}

/// Create JSON error response with safe serialization
pub fn json_error_response(status: StatusCode, error: &str) -> Response<Full<Bytes>> {
    json_response(status, &json!({ "error": error }).to_string())
}

/// Create JSON response
pub fn json_response(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap()
}
