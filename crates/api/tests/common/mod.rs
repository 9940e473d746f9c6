//! Shared harness for API integration tests.
//!
//! Builds the production router (same middleware stack as `main.rs`) over
//! stub model clients and a temporary upload directory.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat};
use serde_json::Value;
use tower::ServiceExt;

use matrixpert_api::config::ServerConfig;
use matrixpert_api::router::build_app_router;
use matrixpert_api::sessions::SessionStore;
use matrixpert_api::state::AppState;
use matrixpert_api::uploads::UploadStore;
use matrixpert_inference::chat::ChatModel;
use matrixpert_inference::error::InferenceError;
use matrixpert_inference::multimodal::MultimodalModel;
use matrixpert_pipeline::acquisition::ImageFetcher;

// ---------------------------------------------------------------------------
// Stub models
// ---------------------------------------------------------------------------

/// Multimodal stand-in: records `(image_base64, prompt)` and replays
/// scripted outcomes, falling back to `"stub answer"`.
#[derive(Default)]
pub struct StubMultimodal {
    pub calls: Mutex<Vec<(String, String)>>,
    outcomes: Mutex<VecDeque<Result<String, InferenceError>>>,
}

impl StubMultimodal {
    pub fn reply(&self, text: &str) {
        self.outcomes.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn fail(&self) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(InferenceError::ApiError {
                status: 503,
                body: "model overloaded".into(),
            }));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MultimodalModel for StubMultimodal {
    async fn submit(&self, image_base64: &str, prompt: &str) -> Result<String, InferenceError> {
        self.calls
            .lock()
            .unwrap()
            .push((image_base64.to_string(), prompt.to_string()));
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("stub answer".into()))
    }
}

/// Chat stand-in: records `(system_prompt, user_message)` and echoes.
#[derive(Default)]
pub struct StubChat {
    pub calls: Mutex<Vec<(String, String)>>,
    pub failing: Mutex<bool>,
}

#[async_trait]
impl ChatModel for StubChat {
    async fn complete(
        &self,
        system_prompt: &str,
        user_message: &str,
    ) -> Result<String, InferenceError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_message.to_string()));
        if *self.failing.lock().unwrap() {
            return Err(InferenceError::EmptyResponse);
        }
        Ok(format!("echo: {user_message}"))
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub multimodal: Arc<StubMultimodal>,
    pub chat: Arc<StubChat>,
    pub upload_dir: tempfile::TempDir,
}

/// Build a test `ServerConfig` rooted at `upload_dir`.
///
/// Uses `http://localhost:5173` as CORS origin and a 2 MiB body limit.
pub fn test_config(upload_dir: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        upload_dir: upload_dir.to_path_buf(),
        persist_uploads: true,
        max_upload_bytes: 2 * 1024 * 1024,
        session_idle_ttl_secs: 3600,
    }
}

/// Build the full application router over stub models.
pub fn build_test_app() -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let config = test_config(upload_dir.path());
    let multimodal = Arc::new(StubMultimodal::default());
    let chat = Arc::new(StubChat::default());

    let state = AppState {
        config: Arc::new(config.clone()),
        sessions: Arc::new(SessionStore::new()),
        uploads: Arc::new(UploadStore::new(
            config.upload_dir.clone(),
            config.persist_uploads,
        )),
        fetcher: ImageFetcher::new(None)
            .unwrap()
            .with_max_bytes(config.max_upload_bytes),
        multimodal: multimodal.clone(),
        chat: chat.clone(),
    };

    TestApp {
        router: build_app_router(state.clone(), &config),
        state,
        multimodal,
        chat,
        upload_dir,
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

async fn send_empty(app: &TestApp, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    send_empty(app, Method::GET, uri).await
}

pub async fn delete(app: &TestApp, uri: &str) -> Response<Body> {
    send_empty(app, Method::DELETE, uri).await
}

pub async fn post_empty(app: &TestApp, uri: &str) -> Response<Body> {
    send_empty(app, Method::POST, uri).await
}

pub async fn send_json(app: &TestApp, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: &TestApp, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

const BOUNDARY: &str = "matrixpert-test-boundary";

/// One file part: `(filename, content_type, bytes)`.
pub type FilePart<'a> = (&'a str, &'a str, Vec<u8>);

pub fn multipart_body(files: &[FilePart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (filename, content_type, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, files: &[FilePart<'_>]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(files)))
        .unwrap()
}

pub async fn post_multipart(app: &TestApp, uri: &str, files: &[FilePart<'_>]) -> Response<Body> {
    send(app, multipart_request(uri, files)).await
}

// ---------------------------------------------------------------------------
// Bodies and fixtures
// ---------------------------------------------------------------------------

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn encoded_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::new_rgb8(width, height)
        .write_to(&mut buf, format)
        .unwrap();
    buf.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Png)
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encoded_image(width, height, ImageFormat::Jpeg)
}

/// Decode a PNG response body and return its dimensions.
pub fn png_dimensions(bytes: &[u8]) -> (u32, u32) {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png).unwrap();
    (image.width(), image.height())
}

/// Start a session and return its id.
pub async fn create_session(app: &TestApp) -> String {
    let response = post_empty(app, "/api/v1/sessions").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Start a session holding the given uploads and return its id.
pub async fn session_with_uploads(app: &TestApp, files: &[FilePart<'_>]) -> String {
    let id = create_session(app).await;
    let response = post_multipart(app, &format!("/api/v1/sessions/{id}/images/upload"), files).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    id
}

/// Spawn a local image host on an ephemeral port and return its base URL.
///
/// ```text
/// /micrograph.png   200 image/png
/// /missing.png      404
/// /page             200 text/html
/// /huge.png         200 image/png, 3 MiB (over the test upload limit)
/// ```
pub async fn spawn_image_host() -> String {
    use axum::http::header::CONTENT_TYPE;
    use axum::response::IntoResponse;
    use axum::routing::get as get_route;

    let app = Router::new()
        .route(
            "/micrograph.png",
            get_route(|| async { ([(CONTENT_TYPE, "image/png")], png(32, 24)).into_response() }),
        )
        .route(
            "/missing.png",
            get_route(|| async { StatusCode::NOT_FOUND.into_response() }),
        )
        .route(
            "/page",
            get_route(|| async {
                ([(CONTENT_TYPE, "text/html")], "<html>hello</html>").into_response()
            }),
        )
        .route(
            "/huge.png",
            get_route(|| async {
                ([(CONTENT_TYPE, "image/png")], vec![0u8; 3 * 1024 * 1024]).into_response()
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
