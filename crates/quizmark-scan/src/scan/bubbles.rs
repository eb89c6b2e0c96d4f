// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bubble detector — binarizes the rectified sheet and keeps the regions shaped
// like answer bubbles.

use image::GrayImage;
use imageproc::contrast::{ThresholdType, otsu_level, threshold};
use quizmark_core::config::BubbleConfig;
use quizmark_core::error::{QuizmarkError, Result};
use tracing::{debug, info, instrument};

use crate::geometry::{BoundingRect, Region, external_regions};

/// Binary sheet and the bubble regions found on it.
#[derive(Debug, Clone)]
pub struct BubbleScan {
    /// Inverted binary image: ink is 255, paper is 0.
    pub threshold: GrayImage,
    /// Regions passing the size and aspect filter, in extraction order.
    pub bubbles: Vec<Region>,
}

/// Binarize `gray` and extract its answer bubbles.
///
/// Fails with `NoBubblesDetected` when no region passes the filter.
#[instrument(skip_all, fields(width = gray.width(), height = gray.height()))]
pub fn detect_bubbles(gray: &GrayImage, config: &BubbleConfig) -> Result<BubbleScan> {
    let threshold = binarize_inverted(gray);
    let bubbles = find_bubbles(&threshold, config);
    if bubbles.is_empty() {
        return Err(QuizmarkError::NoBubblesDetected);
    }
    info!(bubbles = bubbles.len(), "Answer bubbles detected");
    Ok(BubbleScan { threshold, bubbles })
}

/// Inverted Otsu binarization: pixels at or below the Otsu level (ink) become
/// 255, brighter pixels (paper) become 0.
pub fn binarize_inverted(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    debug!(level, "Otsu threshold computed");

    threshold(gray, level, ThresholdType::BinaryInverted)
}

/// External regions of a binary image whose bounding rectangle looks like a
/// bubble.
pub fn find_bubbles(threshold: &GrayImage, config: &BubbleConfig) -> Vec<Region> {
    let regions = external_regions(threshold);
    let total = regions.len();
    let bubbles: Vec<Region> = regions
        .into_iter()
        .filter(|region| is_bubble(&region.bounds, config))
        .collect();
    debug!(total, kept = bubbles.len(), "Bubble candidates filtered");
    bubbles
}

/// Both sides at least `min_size` and width / height within the aspect range.
pub fn is_bubble(bounds: &BoundingRect, config: &BubbleConfig) -> bool {
    let aspect = bounds.aspect_ratio();
    bounds.width >= config.min_size
        && bounds.height >= config.min_size
        && aspect >= config.aspect_min
        && aspect <= config.aspect_max
}
