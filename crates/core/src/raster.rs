//! Acquired and cropped rasters, crop regions, and the PNG/base64 encoding
//! used to ship an image to the multimodal endpoint.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Source label for images fetched from a URL.
pub const URL_SOURCE_LABEL: &str = "from URL";

/// Filename extensions accepted when an upload carries no usable media type.
const ACCEPTED_EXTENSIONS: &[(&str, MediaType)] = &[
    ("jpg", MediaType::Jpeg),
    ("jpeg", MediaType::Jpeg),
    ("png", MediaType::Png),
];

// ---------------------------------------------------------------------------
// Media types
// ---------------------------------------------------------------------------

/// Media types accepted for uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Jpeg,
    Png,
}

impl MediaType {
    /// Resolve the media type of an uploaded payload.
    ///
    /// The declared `Content-Type` wins when present; `image/jpg` is tolerated
    /// because some browsers send it. A missing or generic
    /// (`application/octet-stream`) type falls back to the filename extension.
    pub fn from_declared(
        content_type: Option<&str>,
        filename: Option<&str>,
    ) -> Result<Self, CoreError> {
        let declared = content_type
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

        if let Some(ct) = declared {
            return match ct.as_str() {
                "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
                "image/png" => Ok(Self::Png),
                other => Err(CoreError::Validation(format!(
                    "Unsupported media type '{other}'. Only JPEG and PNG images are accepted"
                ))),
            };
        }

        let ext = filename
            .and_then(|f| f.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        ACCEPTED_EXTENSIONS
            .iter()
            .find(|(e, _)| *e == ext)
            .map(|(_, mt)| *mt)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Cannot determine an accepted image type for '{}'. Only JPEG and PNG images are accepted",
                    filename.unwrap_or("<unnamed>")
                ))
            })
    }

    /// Canonical MIME string.
    pub fn as_mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

// ---------------------------------------------------------------------------
// Acquired images
// ---------------------------------------------------------------------------

/// Where a working image came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    Upload { filename: String },
    Url { url: String },
}

impl ImageSource {
    /// Caption shown next to the image: the upload filename or `"from URL"`.
    pub fn label(&self) -> &str {
        match self {
            Self::Upload { filename } => filename,
            Self::Url { .. } => URL_SOURCE_LABEL,
        }
    }
}

/// A decoded raster in the working image sequence.
#[derive(Debug, Clone)]
pub struct AcquiredImage {
    pub source: ImageSource,
    pub raster: DynamicImage,
    pub acquired_at: Timestamp,
}

impl AcquiredImage {
    /// Decode an uploaded payload, checking it against its declared type.
    pub fn from_upload(
        filename: impl Into<String>,
        media_type: MediaType,
        bytes: &[u8],
    ) -> Result<Self, CoreError> {
        let filename = filename.into();
        let raster = image::load_from_memory_with_format(bytes, media_type.image_format())
            .map_err(|e| {
                CoreError::Validation(format!(
                    "'{filename}' is not a valid {} image: {e}",
                    media_type.as_mime()
                ))
            })?;

        Ok(Self {
            source: ImageSource::Upload { filename },
            raster,
            acquired_at: chrono::Utc::now(),
        })
    }

    /// Decode the body of a fetched URL. The format is sniffed from the bytes.
    pub fn from_url_body(url: impl Into<String>, bytes: &[u8]) -> Result<Self, CoreError> {
        let raster = decode(bytes)?;
        Ok(Self {
            source: ImageSource::Url { url: url.into() },
            raster,
            acquired_at: chrono::Utc::now(),
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.raster.dimensions()
    }
}

/// Decode any supported raster, sniffing the format from its header.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CoreError> {
    image::load_from_memory(bytes)
        .map_err(|e| CoreError::Validation(format!("Could not decode image: {e}")))
}

// ---------------------------------------------------------------------------
// Cropping
// ---------------------------------------------------------------------------

/// A rectangular crop region in pixel coordinates. Aspect ratio is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// Check the region is non-empty and lies entirely inside a
    /// `image_width` x `image_height` raster.
    pub fn validate(&self, image_width: u32, image_height: u32) -> Result<(), CoreError> {
        if self.width == 0 || self.height == 0 {
            return Err(CoreError::Validation(
                "Crop region must have a non-zero width and height".into(),
            ));
        }

        let right = self.x.checked_add(self.width);
        let bottom = self.y.checked_add(self.height);
        match (right, bottom) {
            (Some(r), Some(b)) if r <= image_width && b <= image_height => Ok(()),
            _ => Err(CoreError::Validation(format!(
                "Crop region {}x{} at ({}, {}) exceeds image bounds {image_width}x{image_height}",
                self.width, self.height, self.x, self.y
            ))),
        }
    }

    /// Produce the cropped raster without committing it anywhere.
    pub fn apply(&self, raster: &DynamicImage) -> Result<DynamicImage, CoreError> {
        let (w, h) = raster.dimensions();
        self.validate(w, h)?;
        Ok(raster.crop_imm(self.x, self.y, self.width, self.height))
    }
}

/// A committed crop, positionally aligned with its source image.
#[derive(Debug, Clone)]
pub struct CroppedImage {
    pub source_index: usize,
    pub region: CropRegion,
    pub raster: DynamicImage,
}

impl CroppedImage {
    /// Caption for the crop, numbered from 1 like the source images.
    pub fn label(&self) -> String {
        format!("Cropped Image {}", self.source_index + 1)
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialize a raster to PNG bytes.
pub fn encode_png(raster: &DynamicImage) -> Result<Vec<u8>, CoreError> {
    let mut buf = Cursor::new(Vec::new());
    raster
        .write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| CoreError::Internal(format!("PNG encoding failed: {e}")))?;
    Ok(buf.into_inner())
}

/// Serialize a raster to PNG and wrap the bytes in standard base64.
pub fn encode_png_base64(raster: &DynamicImage) -> Result<String, CoreError> {
    Ok(STANDARD.encode(encode_png(raster)?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
