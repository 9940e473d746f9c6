//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server is
//! needed.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use http_body_util::BodyExt;
use matrixpert_api::error::AppError;
use matrixpert_core::error::CoreError;
use matrixpert_inference::error::InferenceError;
use matrixpert_pipeline::acquisition::AcquisitionError;
use matrixpert_pipeline::error::PipelineError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 404 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Image",
        id: "3".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Image with id 3 not found");
}

// ---------------------------------------------------------------------------
// Test: CoreError::Validation maps to 400 with VALIDATION_ERROR code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("Query must not be empty".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Query must not be empty");
}

// ---------------------------------------------------------------------------
// Test: AppError::BadRequest maps to 400 with BAD_REQUEST code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

// ---------------------------------------------------------------------------
// Test: Internal errors return 500 and sanitize the message
// ---------------------------------------------------------------------------

#[tokio::test]
async fn internal_error_returns_500_and_sanitizes_message() {
    let err = AppError::InternalError("disk full at /var/secret".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn core_internal_error_is_sanitized() {
    let err = AppError::Core(CoreError::Internal("PNG encoding failed".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Test: Acquisition errors map to 415 / 422 / 502
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unsupported_media_type_returns_415() {
    let err = AppError::Acquisition(AcquisitionError::UnsupportedMediaType(
        "Unsupported image type image/gif".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(json["code"], "UNSUPPORTED_MEDIA_TYPE");
}

#[tokio::test]
async fn not_an_image_returns_422_with_user_message() {
    let err = AppError::Acquisition(AcquisitionError::NotAnImage {
        content_type: Some("text/html".into()),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "INVALID_IMAGE_URL");
    assert_eq!(json["error"], "The URL does not link to a valid image file.");
}

#[tokio::test]
async fn decode_failure_returns_422() {
    let err = AppError::Acquisition(AcquisitionError::Decode("bad header".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["code"], "IMAGE_DECODE_FAILED");
}

#[tokio::test]
async fn fetch_failure_returns_502_with_status_in_message() {
    let err = AppError::Acquisition(AcquisitionError::FetchFailed { status: 404 });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "IMAGE_FETCH_FAILED");
    assert!(json["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn oversized_url_image_returns_413() {
    let err = AppError::Acquisition(AcquisitionError::TooLarge { limit: 1024 });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], "IMAGE_TOO_LARGE");
    assert!(json["error"].as_str().unwrap().contains("1024"));
}

// ---------------------------------------------------------------------------
// Test: Inference and pipeline errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn inference_error_returns_502() {
    let err = AppError::Inference(InferenceError::ApiError {
        status: 500,
        body: "upstream".into(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "INFERENCE_ERROR");
    assert_eq!(
        json["error"],
        "An error occurred: the model service returned HTTP 500"
    );
}

#[tokio::test]
async fn inference_error_does_not_echo_upstream_body() {
    let err = AppError::Inference(InferenceError::ApiError {
        status: 401,
        body: r#"{"error":"invalid key sk-live-1234"}"#.into(),
    });

    let (_, json) = error_to_response(err).await;

    let message = json["error"].as_str().unwrap();
    assert!(message.contains("401"));
    assert!(!message.contains("sk-live-1234"));
    assert!(!message.contains("invalid key"));
}

#[tokio::test]
async fn pipeline_errors_unwrap_to_their_source() {
    let validation: AppError =
        PipelineError::Core(CoreError::Validation("No images".into())).into();
    let (status, _) = error_to_response(validation).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let inference: AppError = PipelineError::Inference(InferenceError::EmptyResponse).into();
    let (status, json) = error_to_response(inference).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "INFERENCE_ERROR");
}
