// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Quizmark.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Quizmark operations.
///
/// Every variant aborts the current grading run. No partial score is ever
/// produced alongside an error.
#[derive(Debug, Error)]
pub enum QuizmarkError {
    // -- Input errors --
    #[error("image path does not exist or is not a file: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("cannot open image: {0}")]
    ImageOpen(String),

    #[error("cannot write image: {0}")]
    ImageWrite(String),

    #[error("answer key is empty")]
    EmptyAnswerKey,

    #[error("invalid answer {0:?}: expected a single letter")]
    InvalidAnswerToken(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot load font: {0}")]
    FontLoad(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Detection errors --
    #[error("document not detected: no contour approximates to four corners")]
    DocumentNotDetected,

    #[error("document not detected: quadrilateral is degenerate")]
    DegenerateDocument,

    #[error("no answer bubbles detected")]
    NoBubblesDetected,

    // -- Consistency errors --
    #[error(
        "malformed answer key/bubble count mismatch: {bubbles} bubbles with {choices} choices \
         per question, but the key has {questions} questions"
    )]
    BubbleCountMismatch {
        bubbles: usize,
        choices: usize,
        questions: usize,
    },

    #[error("malformed answer key: letter {0:?} has no choice index")]
    UnknownAnswerLetter(char),

    // -- Arithmetic errors --
    #[error("no questions to score")]
    NoQuestions,
}

/// Broad error category, independent of the stage that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad caller input: paths, image data, answer key, configuration.
    Input,
    /// The photo did not contain what the pipeline looks for.
    Detection,
    /// Detected bubbles and the answer key disagree.
    Consistency,
    /// Scoring was asked to divide by zero questions.
    Arithmetic,
}

/// Pipeline stage an error originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Input,
    DocumentLocator,
    PerspectiveRectifier,
    BubbleDetector,
    Grader,
    Output,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Input => "input",
            Stage::DocumentLocator => "document locator",
            Stage::PerspectiveRectifier => "perspective rectifier",
            Stage::BubbleDetector => "bubble detector",
            Stage::Grader => "grader",
            Stage::Output => "output",
        };
        f.write_str(name)
    }
}

impl QuizmarkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizmarkError::ImageNotFound(_)
            | QuizmarkError::ImageOpen(_)
            | QuizmarkError::ImageWrite(_)
            | QuizmarkError::EmptyAnswerKey
            | QuizmarkError::InvalidAnswerToken(_)
            | QuizmarkError::InvalidConfig(_)
            | QuizmarkError::FontLoad(_)
            | QuizmarkError::Io(_)
            | QuizmarkError::Serialization(_) => ErrorKind::Input,
            QuizmarkError::DocumentNotDetected
            | QuizmarkError::DegenerateDocument
            | QuizmarkError::NoBubblesDetected => ErrorKind::Detection,
            QuizmarkError::BubbleCountMismatch { .. } | QuizmarkError::UnknownAnswerLetter(_) => {
                ErrorKind::Consistency
            }
            QuizmarkError::NoQuestions => ErrorKind::Arithmetic,
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            QuizmarkError::ImageWrite(_) => Stage::Output,
            QuizmarkError::DocumentNotDetected => Stage::DocumentLocator,
            QuizmarkError::DegenerateDocument => Stage::PerspectiveRectifier,
            QuizmarkError::NoBubblesDetected => Stage::BubbleDetector,
            QuizmarkError::BubbleCountMismatch { .. }
            | QuizmarkError::UnknownAnswerLetter(_)
            | QuizmarkError::NoQuestions => Stage::Grader,
            _ => Stage::Input,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuizmarkError>;
