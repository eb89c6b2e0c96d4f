// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// QuizScanner — runs a photographed sheet through every grading stage.

use std::path::Path;

use quizmark_core::config::ScanConfig;
use quizmark_core::error::Result;
use quizmark_core::types::AnswerKey;
use tracing::{info, instrument};

use crate::image::loader::SheetImage;
use crate::scan::annotate::Annotator;
use crate::scan::bubbles::detect_bubbles;
use crate::scan::edges::build_edge_map;
use crate::scan::grade::{GradedSheet, grade_sheet};
use crate::scan::locate::locate_document;
use crate::scan::rectify::Rectifier;

/// Grades photographed quiz sheets.
///
/// ## Pipeline
///
/// 1. Edge map of the grayscale photo
/// 2. Document boundary (largest four-cornered contour)
/// 3. Perspective rectification of the color and grayscale photos
/// 4. Bubble detection on the rectified grayscale sheet
/// 5. Grading and annotation of the rectified color sheet
///
/// Each call is independent; a scanner can grade any number of sheets.
pub struct QuizScanner {
    config: ScanConfig,
    annotator: Annotator,
}

impl QuizScanner {
    // -- Construction ---------------------------------------------------------

    /// Scanner with the given configuration and the bundled overlay font.
    pub fn new(config: ScanConfig) -> Result<Self> {
        config.validate()?;
        let annotator = Annotator::new(config.annotation.clone())?;
        Ok(Self { config, annotator })
    }

    /// Replace the annotator, e.g. with one using a different font.
    pub fn with_annotator(mut self, annotator: Annotator) -> Self {
        self.annotator = annotator;
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn annotator(&self) -> &Annotator {
        &self.annotator
    }

    // -- Grading --------------------------------------------------------------

    /// Load the photo at `path` and grade it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn grade_path(&self, path: impl AsRef<Path>, key: &AnswerKey) -> Result<GradedSheet> {
        let sheet = SheetImage::open(path)?;
        self.grade_sheet(&sheet, key)
    }

    /// Grade an already-loaded photo.
    #[instrument(skip_all, fields(width = sheet.width(), height = sheet.height(), questions = key.len()))]
    pub fn grade_sheet(&self, sheet: &SheetImage, key: &AnswerKey) -> Result<GradedSheet> {
        let edges = build_edge_map(sheet.gray(), &self.config.edges);
        let document = locate_document(&edges, &self.config.document)?;

        let rectifier = Rectifier::new(&document)?;
        let color = rectifier.warp_color(sheet.color());
        let gray = rectifier.warp_gray(sheet.gray());

        let bubbles = detect_bubbles(&gray, &self.config.bubbles)?;
        let graded = grade_sheet(&color, bubbles, key, &self.annotator)?;

        info!(
            score = graded.report.score,
            correct = graded.report.correct,
            total = graded.report.total,
            "Grading finished"
        );
        Ok(graded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
    use imageproc::rect::Rect;
    use quizmark_core::error::QuizmarkError;

    const INK: Rgb<u8> = Rgb([0, 0, 0]);
    const PAPER: Rgb<u8> = Rgb([200, 200, 200]);

    /// Light background with a gray sheet carrying one row of ring bubbles
    /// per entry of `marked`; the listed bubble of each row is filled.
    fn photo(choices: usize, marked: &[usize]) -> SheetImage {
        let mut img = RgbImage::from_pixel(520, 520, Rgb([255, 255, 255]));
        draw_filled_rect_mut(&mut img, Rect::at(100, 100).of_size(320, 320), PAPER);

        for (row, &filled) in marked.iter().enumerate() {
            let cy = 170 + row as i32 * 60;
            for col in 0..choices {
                let cx = 170 + col as i32 * 60;
                draw_filled_circle_mut(&mut img, (cx, cy), 20, INK);
                if col != filled {
                    draw_filled_circle_mut(&mut img, (cx, cy), 15, PAPER);
                }
            }
        }
        SheetImage::from_dynamic(DynamicImage::ImageRgb8(img))
    }

    /// The sheet is only slightly darker than the background, so the paper
    /// border needs lower hysteresis thresholds than a photo on a dark desk.
    fn scanner() -> QuizScanner {
        let mut config = ScanConfig::default();
        config.edges.canny_low = 20.0;
        config.edges.canny_high = 60.0;
        QuizScanner::new(config).expect("valid config")
    }

    #[test]
    fn synthetic_sheet_is_graded() {
        let scanner = scanner();
        let key = AnswerKey::parse(["A", "B", "C", "D"]).expect("valid key");
        let sheet = photo(4, &[0, 1, 2, 0]);

        let graded = scanner.grade_sheet(&sheet, &key).expect("graded");
        assert_eq!(graded.report.total, 4);
        assert_eq!(graded.report.correct, 3);
        assert_eq!(graded.report.score, 75.0);
        assert_eq!(graded.report.questions[3].selected, 'A');
    }

    #[test]
    fn blank_photo_has_no_document() {
        let scanner = QuizScanner::new(ScanConfig::default()).expect("valid config");
        let key = AnswerKey::parse(["A", "B"]).expect("valid key");
        let sheet = SheetImage::from_dynamic(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            200,
            200,
            Rgb([128, 128, 128]),
        )));

        assert!(matches!(
            scanner.grade_sheet(&sheet, &key),
            Err(QuizmarkError::DocumentNotDetected)
        ));
    }

    #[test]
    fn wrong_key_length_is_a_count_mismatch() {
        let scanner = scanner();
        let key = AnswerKey::parse(["A", "B", "C", "D", "A"]).expect("valid key");
        let sheet = photo(4, &[0, 1, 2, 3]);

        assert!(matches!(
            scanner.grade_sheet(&sheet, &key),
            Err(QuizmarkError::BubbleCountMismatch {
                bubbles: 16,
                choices: 4,
                questions: 5
            })
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        let scanner = QuizScanner::new(ScanConfig::default()).expect("valid config");
        let key = AnswerKey::parse(["A"]).expect("valid key");
        let dir = tempfile::tempdir().expect("tempdir");

        assert!(matches!(
            scanner.grade_path(dir.path().join("nope.jpg"), &key),
            Err(QuizmarkError::ImageNotFound(_))
        ));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = ScanConfig::default();
        config.edges.kernel_size = 2;
        assert!(QuizScanner::new(config).is_err());
    }
}
