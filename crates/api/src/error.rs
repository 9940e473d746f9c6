use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use matrixpert_core::error::CoreError;
use matrixpert_inference::error::InferenceError;
use matrixpert_pipeline::acquisition::AcquisitionError;
use matrixpert_pipeline::error::PipelineError;

/// Application-level error type for HTTP handlers.
///
/// Wraps the domain errors of the lower crates and adds HTTP-specific
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `matrixpert_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Upload decoding or URL fetch failed.
    #[error(transparent)]
    Acquisition(#[from] AcquisitionError),

    /// A model endpoint call failed.
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// The multipart body could not be read, including over-limit bodies.
    #[error(transparent)]
    Multipart(#[from] MultipartError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Core(e) => Self::Core(e),
            PipelineError::Inference(e) => Self::Inference(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Acquisition errors ---
            AppError::Acquisition(err) => classify_acquisition_error(err),

            // --- Inference errors ---
            AppError::Inference(err) => {
                tracing::warn!(error = %err, "Model call failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "INFERENCE_ERROR",
                    inference_message(err),
                )
            }

            // --- HTTP-specific errors ---
            AppError::Multipart(err) => {
                let status = err.status();
                let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "PAYLOAD_TOO_LARGE"
                } else {
                    "BAD_REQUEST"
                };
                (status, code, err.body_text())
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Client-facing text for a failed model call. Upstream bodies and
/// endpoint URLs stay in the logs.
fn inference_message(err: &InferenceError) -> String {
    let detail = match err {
        InferenceError::ApiError { status, .. } => {
            format!("the model service returned HTTP {status}")
        }
        InferenceError::Request(_) => "the model service could not be reached".to_string(),
        InferenceError::MalformedResponse(_) | InferenceError::EmptyResponse => {
            "the model service returned no usable answer".to_string()
        }
    };
    format!("An error occurred: {detail}")
}

/// Classify an acquisition error into an HTTP status, error code, and message.
///
/// - Unsupported upload types map to 415.
/// - Bad URLs and undecodable bytes map to 422.
/// - URL bodies over the byte limit map to 413.
/// - Remote fetch problems map to 502.
fn classify_acquisition_error(err: &AcquisitionError) -> (StatusCode, &'static str, String) {
    match err {
        AcquisitionError::UnsupportedMediaType(msg) => (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "UNSUPPORTED_MEDIA_TYPE",
            msg.clone(),
        ),
        AcquisitionError::InvalidUrl(_) | AcquisitionError::NotAnImage { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_IMAGE_URL",
            err.to_string(),
        ),
        AcquisitionError::Decode(msg) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "IMAGE_DECODE_FAILED",
            msg.clone(),
        ),
        AcquisitionError::TooLarge { .. } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            "IMAGE_TOO_LARGE",
            err.to_string(),
        ),
        AcquisitionError::FetchFailed { .. } | AcquisitionError::Transport(_) => {
            tracing::warn!(error = %err, "Image fetch failed");
            (StatusCode::BAD_GATEWAY, "IMAGE_FETCH_FAILED", err.to_string())
        }
    }
}
