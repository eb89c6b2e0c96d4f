// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document locator — finds the quiz sheet as the largest closed shape in the
// edge map that simplifies to four corners.

use image::GrayImage;
use quizmark_core::config::DocumentConfig;
use quizmark_core::error::{QuizmarkError, Result};
use tracing::{debug, info, instrument, warn};

use crate::geometry::{Quadrilateral, Region, approximate_polygon, external_regions};

/// Locate the document boundary in a binary edge map.
///
/// External contours are visited from largest to smallest enclosed area and
/// each is simplified with a tolerance proportional to its perimeter. The
/// first one that simplifies to exactly four vertices is the document.
/// Contours of equal area keep extraction order, so the first one found wins.
#[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
pub fn locate_document(edges: &GrayImage, config: &DocumentConfig) -> Result<Quadrilateral> {
    let mut candidates: Vec<(f64, Region)> = external_regions(edges)
        .into_iter()
        .map(|region| (region.area(), region))
        .collect();
    debug!(candidates = candidates.len(), "External contours extracted");

    candidates.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (area, region) in &candidates {
        let epsilon = config.poly_approx_tolerance_fraction * region.perimeter();
        let approx = approximate_polygon(&region.points, epsilon);
        debug!(area, vertices = approx.len(), "Candidate approximated");

        if let Some(quad) = Quadrilateral::from_polygon(&approx) {
            info!(area, corners = ?quad.corners(), "Document boundary found");
            return Ok(quad);
        }
    }

    warn!(
        candidates = candidates.len(),
        "No contour simplifies to four corners"
    );
    Err(QuizmarkError::DocumentNotDetected)
}
