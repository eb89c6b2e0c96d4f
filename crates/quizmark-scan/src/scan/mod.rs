// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grading pipeline — edge map, document location, perspective rectification,
// bubble detection, grading, and annotation of the graded sheet.

pub mod annotate;
pub mod bubbles;
pub mod edges;
pub mod grade;
pub mod locate;
pub mod pipeline;
pub mod rectify;

pub use pipeline::QuizScanner;
