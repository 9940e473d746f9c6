//! Which working image(s) a query is sent against.
//!
//! [`ImageSelection::First`] is the default and reproduces the long-standing
//! rule: the committed crop of the first image if there is one, otherwise the
//! first image itself. `Index` and `All` let a caller pick explicitly.

use image::DynamicImage;
use serde::Deserialize;

use crate::error::CoreError;
use crate::session::SessionContext;

/// Image selection policy for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "mode", content = "index", rename_all = "snake_case")]
pub enum ImageSelection {
    /// Position 0, crop preferred.
    #[default]
    First,
    /// A specific position, crop preferred.
    Index(usize),
    /// Every working image in order, one request each, crop preferred.
    All,
}

/// A raster chosen for submission.
#[derive(Debug, Clone, Copy)]
pub struct SelectedImage<'a> {
    pub index: usize,
    pub used_crop: bool,
    pub raster: &'a DynamicImage,
}

impl ImageSelection {
    /// Resolve the selection against a session's working set.
    ///
    /// Fails with a validation error when no images have been acquired and
    /// with `NotFound` when an explicit index is out of range.
    pub fn resolve<'a>(
        &self,
        session: &'a SessionContext,
    ) -> Result<Vec<SelectedImage<'a>>, CoreError> {
        if session.images().is_empty() {
            return Err(CoreError::Validation(
                "No images have been acquired in this session".into(),
            ));
        }

        match *self {
            Self::First => Ok(vec![pick(session, 0)?]),
            Self::Index(index) => Ok(vec![pick(session, index)?]),
            Self::All => (0..session.images().len())
                .map(|i| pick(session, i))
                .collect(),
        }
    }
}

fn pick(session: &SessionContext, index: usize) -> Result<SelectedImage<'_>, CoreError> {
    let original = session.image(index)?;
    Ok(match session.crop(index) {
        Some(crop) => SelectedImage {
            index,
            used_crop: true,
            raster: &crop.raster,
        },
        None => SelectedImage {
            index,
            used_crop: false,
            raster: &original.raster,
        },
    })
}
