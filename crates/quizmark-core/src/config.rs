// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration. Every tunable threshold of the grading pipeline lives
// here; the stages never hard-code their own constants.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuizmarkError, Result};

/// Complete pipeline configuration.
///
/// Loaded from JSON (missing fields fall back to defaults) or built with
/// `ScanConfig::default()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Edge map builder parameters.
    pub edges: EdgeConfig,
    /// Document locator parameters.
    pub document: DocumentConfig,
    /// Bubble detector parameters.
    pub bubbles: BubbleConfig,
    /// Colors and sizes used when drawing the graded sheet.
    pub annotation: AnnotationConfig,
}

/// Denoising, edge detection, and gap closing applied before the document
/// boundary search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Median filter radius (window is `2 * radius + 1` pixels square).
    pub median_radius: u32,
    /// Bilateral filter window diameter in pixels.
    pub bilateral_window: u32,
    /// Bilateral filter intensity sigma. Larger values smooth across
    /// stronger intensity steps.
    pub bilateral_sigma_color: f32,
    /// Bilateral filter spatial sigma.
    pub bilateral_sigma_space: f32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Side of the square structuring neighbourhood (odd).
    pub kernel_size: u32,
    /// Dilation passes; closes gaps in the document boundary.
    pub dilate_iterations: u32,
    /// Erosion passes; fewer than dilation so closed gaps stay closed.
    pub erode_iterations: u32,
}

/// Polygon approximation of document boundary candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub poly_approx_tolerance_fraction: f64,
}

/// Size and shape filter for answer bubbles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BubbleConfig {
    /// Minimum bounding-box width and height in pixels.
    pub min_size: u32,
    /// Lowest accepted width / height ratio.
    pub aspect_min: f64,
    /// Highest accepted width / height ratio.
    pub aspect_max: f64,
}

/// Annotation of the graded sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// RGB outline for questions answered correctly.
    pub correct_color: [u8; 3],
    /// RGB outline for questions answered incorrectly.
    pub incorrect_color: [u8; 3],
    /// Outline thickness in pixels.
    pub outline_thickness: u32,
    /// RGB color of the score overlay.
    pub text_color: [u8; 3],
    /// Left end of the score overlay's baseline.
    pub text_origin: [i32; 2],
    /// Font size of the score overlay in pixels.
    pub text_scale: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            median_radius: 5,
            bilateral_window: 9,
            bilateral_sigma_color: 30.0,
            bilateral_sigma_space: 5.0,
            canny_low: 30.0,
            canny_high: 200.0,
            kernel_size: 5,
            dilate_iterations: 13,
            erode_iterations: 7,
        }
    }
}

impl EdgeConfig {
    /// L-infinity radius equivalent to `iterations` passes of the square
    /// structuring neighbourhood.
    pub fn morph_radius(&self, iterations: u32) -> u32 {
        (self.kernel_size / 2) * iterations
    }
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            poly_approx_tolerance_fraction: 0.04,
        }
    }
}

impl Default for BubbleConfig {
    fn default() -> Self {
        Self {
            min_size: 30,
            aspect_min: 0.9,
            aspect_max: 1.1,
        }
    }
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            correct_color: [0, 0, 255],
            incorrect_color: [255, 0, 0],
            outline_thickness: 6,
            text_color: [0, 0, 255],
            text_origin: [40, 80],
            text_scale: 60.0,
        }
    }
}

impl ScanConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        let edges = &self.edges;
        if edges.kernel_size == 0 || edges.kernel_size % 2 == 0 {
            return Err(invalid(format!(
                "edges.kernel_size must be odd and positive, got {}",
                edges.kernel_size
            )));
        }
        for (name, iterations) in [
            ("dilate_iterations", edges.dilate_iterations),
            ("erode_iterations", edges.erode_iterations),
        ] {
            if edges.morph_radius(iterations) > u8::MAX as u32 {
                return Err(invalid(format!(
                    "edges.{name} = {iterations} exceeds the maximum morphology radius of {}",
                    u8::MAX
                )));
            }
        }
        if edges.bilateral_window == 0 {
            return Err(invalid("edges.bilateral_window must be positive".into()));
        }
        if edges.bilateral_sigma_color <= 0.0 || edges.bilateral_sigma_space <= 0.0 {
            return Err(invalid("edges bilateral sigmas must be positive".into()));
        }
        if edges.canny_low > edges.canny_high {
            return Err(invalid(format!(
                "edges.canny_low ({}) exceeds edges.canny_high ({})",
                edges.canny_low, edges.canny_high
            )));
        }

        let tolerance = self.document.poly_approx_tolerance_fraction;
        if !(tolerance > 0.0 && tolerance < 1.0) {
            return Err(invalid(format!(
                "document.poly_approx_tolerance_fraction must be in (0, 1), got {tolerance}"
            )));
        }

        let bubbles = &self.bubbles;
        if bubbles.aspect_min <= 0.0 || bubbles.aspect_min > bubbles.aspect_max {
            return Err(invalid(format!(
                "bubbles aspect range [{}, {}] is empty or non-positive",
                bubbles.aspect_min, bubbles.aspect_max
            )));
        }

        if self.annotation.text_scale <= 0.0 {
            return Err(invalid("annotation.text_scale must be positive".into()));
        }

        Ok(())
    }
}

fn invalid(message: String) -> QuizmarkError {
    QuizmarkError::InvalidConfig(message)
}
