// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quizmark-scan — Optical mark recognition for photographed bubble sheets.
//
// Provides image loading, the five grading stages (edge map, document
// locator, perspective rectifier, bubble detector, grader), and the
// `QuizScanner` that chains them.

pub mod geometry;
pub mod image;
pub mod scan;

// Re-export the primary structs so callers can use `quizmark_scan::QuizScanner` etc.
pub use crate::geometry::{BoundingRect, Quadrilateral, Region};
pub use crate::image::loader::SheetImage;
pub use crate::scan::annotate::Annotator;
pub use crate::scan::grade::GradedSheet;
pub use crate::scan::pipeline::QuizScanner;
