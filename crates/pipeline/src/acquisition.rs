//! Image acquisition: decoding uploads and fetching images by URL.
//!
//! Both paths are all-or-nothing: a failure yields an
//! [`AcquisitionError`] and no image.

use std::time::Duration;

use matrixpert_core::error::CoreError;
use matrixpert_core::raster::{AcquiredImage, MediaType};

/// Errors raised while acquiring an image.
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    /// The URL answered with a non-2xx status.
    #[error("Failed to fetch the image. Please check the URL. (HTTP {status})")]
    FetchFailed { status: u16 },

    /// The URL answered 2xx but the content type is not an image.
    #[error("The URL does not link to a valid image file.")]
    NotAnImage { content_type: Option<String> },

    /// The URL is not an absolute http(s) URL.
    #[error("Invalid image URL: {0}")]
    InvalidUrl(String),

    /// The request could not be completed.
    #[error("An error occurred while fetching the image: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body is larger than the fetcher's byte limit.
    #[error("The image at the URL is larger than the {limit} byte limit.")]
    TooLarge { limit: usize },

    /// An upload was not JPEG or PNG.
    #[error("{0}")]
    UnsupportedMediaType(String),

    /// The bytes could not be decoded as an image.
    #[error("{0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// One uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadPayload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Decode every payload, in order. Fails on the first rejected payload.
pub fn decode_uploads(payloads: &[UploadPayload]) -> Result<Vec<AcquiredImage>, AcquisitionError> {
    payloads
        .iter()
        .map(|p| {
            let media_type =
                MediaType::from_declared(p.content_type.as_deref(), Some(&p.filename))
                    .map_err(|e| AcquisitionError::UnsupportedMediaType(core_message(e)))?;

            AcquiredImage::from_upload(p.filename.clone(), media_type, &p.bytes)
                .map_err(|e| AcquisitionError::Decode(core_message(e)))
        })
        .collect()
}

fn core_message(err: CoreError) -> String {
    match err {
        CoreError::Validation(msg) | CoreError::Internal(msg) => msg,
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// URL fetch
// ---------------------------------------------------------------------------

/// Body limit for URL fetches unless [`ImageFetcher::with_max_bytes`] is used.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// Fetches and validates images from URLs.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl ImageFetcher {
    /// Build a fetcher. `timeout` of `None` keeps the transport default.
    pub fn new(timeout: Option<Duration>) -> Result<Self, AcquisitionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            max_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }

    /// Reject bodies longer than `limit` bytes.
    pub fn with_max_bytes(mut self, limit: usize) -> Self {
        self.max_bytes = limit;
        self
    }

    /// GET `url` and decode the body.
    ///
    /// Non-2xx → [`AcquisitionError::FetchFailed`]; a `Content-Type` that does
    /// not contain `image` (or is absent) → [`AcquisitionError::NotAnImage`];
    /// a body over the byte limit → [`AcquisitionError::TooLarge`].
    pub async fn fetch(&self, url: &str) -> Result<AcquiredImage, AcquisitionError> {
        let parsed = reqwest::Url::parse(url.trim())
            .map_err(|e| AcquisitionError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AcquisitionError::InvalidUrl(format!(
                "{url}: only http and https URLs are supported"
            )));
        }

        let mut response = self.client.get(parsed.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "Image URL returned non-success status");
            return Err(AcquisitionError::FetchFailed {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !content_type.as_deref().is_some_and(|ct| ct.contains("image")) {
            tracing::warn!(%url, content_type = ?content_type, "Image URL did not return an image");
            return Err(AcquisitionError::NotAnImage { content_type });
        }

        let body = self.read_limited(url, &mut response).await?;
        let image = AcquiredImage::from_url_body(parsed.as_str(), &body)
            .map_err(|e| AcquisitionError::Decode(core_message(e)))?;

        tracing::info!(%url, bytes = body.len(), "Fetched image from URL");
        Ok(image)
    }

    /// Read the body chunk by chunk, stopping once it passes `max_bytes`.
    async fn read_limited(
        &self,
        url: &str,
        response: &mut reqwest::Response,
    ) -> Result<Vec<u8>, AcquisitionError> {
        let limit = self.max_bytes;
        let too_large = |len: u64| {
            tracing::warn!(%url, bytes = len, limit, "Image URL body exceeds limit");
            AcquisitionError::TooLarge { limit }
        };

        // A declared length is checked up front; the running total still
        // guards chunked or mislabelled bodies.
        if let Some(declared) = response.content_length() {
            if declared > limit as u64 {
                return Err(too_large(declared));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > limit {
                return Err(too_large((body.len() + chunk.len()) as u64));
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}
