// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheet annotation — outlines the expected bubble of every question and
// stamps the score onto the rectified color sheet.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_text_mut};
use quizmark_core::config::AnnotationConfig;
use quizmark_core::error::{QuizmarkError, Result};
use quizmark_core::types::format_percent;
use tracing::{debug, info};

use crate::geometry::Region;

/// DejaVu Sans, shipped with the crate so the score overlay never depends on
/// fonts installed on the host. License in `assets/DejaVuSans-LICENSE.txt`.
static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

/// Draws grading feedback onto a sheet.
pub struct Annotator {
    config: AnnotationConfig,
    font: FontArc,
}

impl Annotator {
    // -- Construction ---------------------------------------------------------

    /// Annotator using the bundled font.
    pub fn new(config: AnnotationConfig) -> Result<Self> {
        let font = FontArc::try_from_slice(BUNDLED_FONT)
            .map_err(|err| QuizmarkError::FontLoad(format!("bundled DejaVu Sans: {}", err)))?;
        debug!("Bundled overlay font loaded");
        Ok(Self { config, font })
    }

    /// Replace the overlay font with a TrueType/OpenType file.
    pub fn with_font_file(mut self, path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|err| QuizmarkError::FontLoad(format!("{}: {}", path.display(), err)))?;
        self.font = FontArc::try_from_vec(data).map_err(|err| {
            QuizmarkError::FontLoad(format!("{}: {}", path.display(), err))
        })?;
        info!(path = %path.display(), "Overlay font loaded");
        Ok(self)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &AnnotationConfig {
        &self.config
    }

    // -- Drawing --------------------------------------------------------------

    /// Trace the boundary of `bubble` in the correct or incorrect color.
    pub fn outline(&self, image: &mut RgbImage, bubble: &Region, correct: bool) {
        let color = if correct {
            self.config.correct_color
        } else {
            self.config.incorrect_color
        };
        let radius = (self.config.outline_thickness / 2).max(1) as i32;
        for point in &bubble.points {
            draw_filled_circle_mut(image, (point.x, point.y), radius, Rgb(color));
        }
    }

    /// Write `Grade: {score}%` with its baseline starting at the configured
    /// origin.
    pub fn overlay_score(&self, image: &mut RgbImage, score: f64) {
        let scale = PxScale::from(self.config.text_scale);
        let ascent = self.font.as_scaled(scale).ascent();
        let [x, baseline] = self.config.text_origin;
        // Text is laid out from the top of the line box.
        let top = (baseline as f32 - ascent).round() as i32;

        draw_text_mut(
            image,
            Rgb(self.config.text_color),
            x,
            top,
            scale,
            &self.font,
            &score_label(score),
        );
    }
}

/// Text of the score overlay.
pub fn score_label(score: f64) -> String {
    format!("Grade: {}", format_percent(score))
}
