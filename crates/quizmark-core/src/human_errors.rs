// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for teachers grading quizzes.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the CLI words its advice.

use crate::error::QuizmarkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The photo itself is the problem; a new photo of the same sheet may work.
    RetakePhoto,
    /// The user must fix an argument, file, or setting.
    ActionRequired,
    /// The sheet and the answer key cannot be reconciled.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `QuizmarkError` into a `HumanError`.
pub fn humanize_error(err: &QuizmarkError) -> HumanError {
    match err {
        // -- Input errors --
        QuizmarkError::ImageNotFound(path) => HumanError {
            message: "We couldn't find that photo.".into(),
            suggestion: format!("Check the path and try again. ({})", path.display()),
            severity: Severity::ActionRequired,
        },

        QuizmarkError::ImageOpen(detail) => HumanError {
            message: "We couldn't open that photo.".into(),
            suggestion: format!("Save it as JPEG or PNG and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        QuizmarkError::ImageWrite(detail) => HumanError {
            message: "We couldn't save the graded sheet.".into(),
            suggestion: format!(
                "Make sure the output folder exists and the file name ends in .png or .jpg. ({detail})"
            ),
            severity: Severity::ActionRequired,
        },

        QuizmarkError::EmptyAnswerKey => HumanError {
            message: "No answer key was given.".into(),
            suggestion: "List one letter per question, for example: --answers A C B D".into(),
            severity: Severity::ActionRequired,
        },

        QuizmarkError::InvalidAnswerToken(token) => HumanError {
            message: format!("\"{token}\" is not a valid answer."),
            suggestion: "Each answer must be a single letter such as A, B, or C.".into(),
            severity: Severity::ActionRequired,
        },

        QuizmarkError::InvalidConfig(detail) => HumanError {
            message: "The scan settings are not usable.".into(),
            suggestion: format!("Fix the configuration file or remove it to use defaults. ({detail})"),
            severity: Severity::ActionRequired,
        },

        QuizmarkError::FontLoad(detail) => HumanError {
            message: "The font for the grade overlay could not be loaded.".into(),
            suggestion: format!("Point --font at a TrueType or OpenType file. ({detail})"),
            severity: Severity::ActionRequired,
        },

        QuizmarkError::Io(io_err) => HumanError {
            message: "A file could not be read or written.".into(),
            suggestion: format!("Check the file exists and you have permission to use it. ({io_err})"),
            severity: Severity::ActionRequired,
        },

        QuizmarkError::Serialization(detail) => HumanError {
            message: "The configuration file is not valid JSON.".into(),
            suggestion: format!("Fix the syntax error and try again. ({detail})"),
            severity: Severity::ActionRequired,
        },

        // -- Detection errors --
        QuizmarkError::DocumentNotDetected | QuizmarkError::DegenerateDocument => HumanError {
            message: "We couldn't find the quiz sheet in the photo.".into(),
            suggestion: "Take the photo from above with all four corners of the sheet visible \
                         against a contrasting background."
                .into(),
            severity: Severity::RetakePhoto,
        },

        QuizmarkError::NoBubblesDetected => HumanError {
            message: "We found the sheet but no answer bubbles on it.".into(),
            suggestion: "Make sure the photo is sharp and evenly lit, and that the bubbles are \
                         not too small in the frame."
                .into(),
            severity: Severity::RetakePhoto,
        },

        // -- Consistency errors --
        QuizmarkError::BubbleCountMismatch {
            bubbles,
            choices,
            questions,
        } => HumanError {
            message: format!(
                "We found {bubbles} bubbles, but the answer key needs {} ({questions} questions \
                 with {choices} choices each).",
                questions * choices
            ),
            suggestion: "Check the answer key uses every choice letter at least once, or retake \
                         the photo so stray marks are not mistaken for bubbles."
                .into(),
            severity: Severity::Permanent,
        },

        QuizmarkError::UnknownAnswerLetter(letter) => HumanError {
            message: format!("The answer key letter {letter} has no bubble."),
            suggestion: "Check the answer key.".into(),
            severity: Severity::Permanent,
        },

        // -- Arithmetic errors --
        QuizmarkError::NoQuestions => HumanError {
            message: "There were no questions to grade.".into(),
            suggestion: "Provide an answer key with at least one question.".into(),
            severity: Severity::ActionRequired,
        },
    }
}
