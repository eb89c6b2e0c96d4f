// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheet loader — decodes a quiz photo into the color and grayscale buffers the
// grading pipeline consumes, and writes graded sheets back to disk.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage};
use quizmark_core::error::{QuizmarkError, Result};
use tracing::{info, instrument};

/// A decoded quiz photo.
///
/// Holds the 3-channel color buffer (used for annotation) and its luma
/// conversion (used for every detection stage). Both share the same
/// dimensions.
#[derive(Debug, Clone)]
pub struct SheetImage {
    color: RgbImage,
    gray: GrayImage,
}

impl SheetImage {
    // -- Construction ---------------------------------------------------------

    /// Load a photo from a file path.
    ///
    /// Fails with `ImageNotFound` when the path is missing or not a regular
    /// file and with `ImageOpen` when the data cannot be decoded.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(QuizmarkError::ImageNotFound(path.to_path_buf()));
        }

        let img = image::open(path).map_err(|err| {
            QuizmarkError::ImageOpen(format!("{}: {}", path.display(), err))
        })?;
        info!(width = img.width(), height = img.height(), "Sheet image loaded");
        Ok(Self::from_dynamic(img))
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            color: image.to_rgb8(),
            gray: image.to_luma8(),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.color.width()
    }

    pub fn height(&self) -> u32 {
        self.color.height()
    }

    /// Borrow the color buffer.
    pub fn color(&self) -> &RgbImage {
        &self.color
    }

    /// Borrow the grayscale buffer.
    pub fn gray(&self) -> &GrayImage {
        &self.gray
    }
}

// -- Output -------------------------------------------------------------------

/// Write a graded sheet to a file. The format is inferred from the extension.
pub fn save_sheet(image: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    image.save(path.as_ref()).map_err(|err| {
        QuizmarkError::ImageWrite(format!(
            "failed to save image to {}: {}",
            path.as_ref().display(),
            err
        ))
    })
}
