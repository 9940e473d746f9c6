//! Explicit per-user session context.
//!
//! A [`SessionContext`] owns the working image sequence, the crops aligned
//! with it by index, and the [`HistoryLog`]. It is created when a session
//! starts and dropped when the session ends; nothing is ambient or global.

use image::DynamicImage;
use serde::Serialize;

use crate::error::CoreError;
use crate::history::HistoryLog;
use crate::raster::{AcquiredImage, CropRegion, CroppedImage, ImageSource};
use crate::types::{SessionId, Timestamp};

/// State for one user session.
#[derive(Debug)]
pub struct SessionContext {
    id: SessionId,
    images: Vec<AcquiredImage>,
    /// Always the same length as `images`; `crops[i]` belongs to `images[i]`.
    crops: Vec<Option<CroppedImage>>,
    history: HistoryLog,
    created_at: Timestamp,
    last_active_at: Timestamp,
}

/// Serializable description of one working image.
#[derive(Debug, Clone, Serialize)]
pub struct ImageSummary {
    pub index: usize,
    pub label: String,
    pub source: ImageSource,
    pub width: u32,
    pub height: u32,
    pub crop: Option<CropRegion>,
    /// Caption for the committed crop, if any.
    pub crop_label: Option<String>,
    pub acquired_at: Timestamp,
}

/// Serializable description of the whole session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub image_count: usize,
    pub cropped_count: usize,
    pub history_len: usize,
    pub created_at: Timestamp,
    pub last_active_at: Timestamp,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4())
    }

    pub fn with_id(id: SessionId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            images: Vec::new(),
            crops: Vec::new(),
            history: HistoryLog::new(),
            created_at: now,
            last_active_at: now,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn last_active_at(&self) -> Timestamp {
        self.last_active_at
    }

    /// Mark the session as used now.
    pub fn touch(&mut self) {
        self.last_active_at = chrono::Utc::now();
    }

    // ---- images ----

    /// Append images to the end of the working sequence, in order.
    ///
    /// Returns the index of the first appended image.
    pub fn add_images(&mut self, images: impl IntoIterator<Item = AcquiredImage>) -> usize {
        let first = self.images.len();
        for image in images {
            self.images.push(image);
            self.crops.push(None);
        }
        first
    }

    pub fn images(&self) -> &[AcquiredImage] {
        &self.images
    }

    pub fn image(&self, index: usize) -> Result<&AcquiredImage, CoreError> {
        self.images.get(index).ok_or_else(|| CoreError::NotFound {
            entity: "Image",
            id: index.to_string(),
        })
    }

    pub fn image_summaries(&self) -> Vec<ImageSummary> {
        self.images
            .iter()
            .zip(&self.crops)
            .enumerate()
            .map(|(index, (img, crop))| {
                let (width, height) = img.dimensions();
                ImageSummary {
                    index,
                    label: img.source.label().to_string(),
                    source: img.source.clone(),
                    width,
                    height,
                    crop: crop.as_ref().map(|c| c.region),
                    crop_label: crop.as_ref().map(CroppedImage::label),
                    acquired_at: img.acquired_at,
                }
            })
            .collect()
    }

    // ---- crops ----

    /// The committed crop for `index`, if any.
    pub fn crop(&self, index: usize) -> Option<&CroppedImage> {
        self.crops.get(index).and_then(Option::as_ref)
    }

    /// Number of images that currently have a committed crop.
    pub fn cropped_count(&self) -> usize {
        self.crops.iter().filter(|c| c.is_some()).count()
    }

    /// Render `region` of image `index` without committing it.
    pub fn preview_crop(&self, index: usize, region: CropRegion) -> Result<DynamicImage, CoreError> {
        region.apply(&self.image(index)?.raster)
    }

    /// Commit a crop for image `index`, replacing any earlier crop.
    pub fn commit_crop(
        &mut self,
        index: usize,
        region: CropRegion,
    ) -> Result<&CroppedImage, CoreError> {
        let raster = self.preview_crop(index, region)?;
        let slot = &mut self.crops[index];
        Ok(slot.insert(CroppedImage {
            source_index: index,
            region,
            raster,
        }))
    }

    /// Remove the crop for image `index`. Returns whether one existed.
    pub fn clear_crop(&mut self, index: usize) -> Result<bool, CoreError> {
        self.image(index)?;
        Ok(self.crops[index].take().is_some())
    }

    // ---- history ----

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryLog {
        &mut self.history
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            image_count: self.images.len(),
            cropped_count: self.cropped_count(),
            history_len: self.history.len(),
            created_at: self.created_at,
            last_active_at: self.last_active_at,
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn url_image(w: u32, h: u32) -> AcquiredImage {
        AcquiredImage {
            source: ImageSource::Url {
                url: "http://host/x.png".into(),
            },
            raster: DynamicImage::new_rgb8(w, h),
            acquired_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn new_session_is_empty() {
        let session = SessionContext::new();
        assert!(session.images().is_empty());
        assert!(session.history().is_empty());
        assert_eq!(session.cropped_count(), 0);
    }

    #[test]
    fn add_images_keeps_crops_aligned() {
        let mut session = SessionContext::new();
        assert_eq!(session.add_images(vec![url_image(4, 4), url_image(5, 5)]), 0);
        assert_eq!(session.add_images(vec![url_image(6, 6)]), 2);
        assert_eq!(session.images().len(), 3);
        assert!(session.crop(2).is_none());
        assert_eq!(session.image_summaries()[2].width, 6);
    }

    #[test]
    fn commit_crop_replaces_previous() {
        let mut session = SessionContext::new();
        session.add_images(vec![url_image(10, 10)]);

        session
            .commit_crop(0, CropRegion { x: 0, y: 0, width: 4, height: 4 })
            .unwrap();
        let crop = session
            .commit_crop(0, CropRegion { x: 1, y: 1, width: 2, height: 3 })
            .unwrap();
        assert_eq!(crop.region.width, 2);
        assert_eq!(crop.label(), "Cropped Image 1");
        assert_eq!(session.cropped_count(), 1);
    }

    #[test]
    fn crop_of_missing_image_is_not_found() {
        let mut session = SessionContext::new();
        assert_matches!(
            session.commit_crop(0, CropRegion { x: 0, y: 0, width: 1, height: 1 }),
            Err(CoreError::NotFound { entity: "Image", .. })
        );
        assert_matches!(session.clear_crop(3), Err(CoreError::NotFound { .. }));
    }

    #[test]
    fn invalid_region_leaves_crop_untouched() {
        let mut session = SessionContext::new();
        session.add_images(vec![url_image(10, 10)]);
        assert!(session
            .commit_crop(0, CropRegion { x: 8, y: 8, width: 5, height: 5 })
            .is_err());
        assert!(session.crop(0).is_none());
    }

    #[test]
    fn clear_crop_reports_presence() {
        let mut session = SessionContext::new();
        session.add_images(vec![url_image(10, 10)]);
        assert!(!session.clear_crop(0).unwrap());
        session
            .commit_crop(0, CropRegion { x: 0, y: 0, width: 2, height: 2 })
            .unwrap();
        assert!(session.clear_crop(0).unwrap());
        assert!(session.crop(0).is_none());
    }

    #[test]
    fn preview_does_not_commit() {
        let mut session = SessionContext::new();
        session.add_images(vec![url_image(10, 10)]);
        let preview = session
            .preview_crop(0, CropRegion { x: 0, y: 0, width: 3, height: 2 })
            .unwrap();
        assert_eq!(preview.width(), 3);
        assert!(session.crop(0).is_none());
    }
}
