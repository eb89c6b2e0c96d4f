// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Quizmark: the answer key and grading results.

use serde::{Deserialize, Serialize};

use crate::error::{QuizmarkError, Result};

/// Ordered answer key, one uppercase letter per question.
///
/// The sorted set of distinct letters is the choice alphabet: its size is the
/// number of bubbles per question and a letter's position in it is the
/// bubble index (left to right) that letter stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerKey {
    answers: Vec<char>,
    alphabet: Vec<char>,
}

impl AnswerKey {
    /// Build a key from case-insensitive single-letter tokens.
    ///
    /// Fails with `EmptyAnswerKey` for an empty sequence and
    /// `InvalidAnswerToken` for anything that is not exactly one ASCII letter.
    pub fn parse<I, S>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let answers = tokens
            .into_iter()
            .map(|token| parse_letter(token.as_ref()))
            .collect::<Result<Vec<char>>>()?;

        if answers.is_empty() {
            return Err(QuizmarkError::EmptyAnswerKey);
        }

        let mut alphabet = answers.clone();
        alphabet.sort_unstable();
        alphabet.dedup();

        Ok(Self { answers, alphabet })
    }

    /// Expected letter for every question, in question order.
    pub fn answers(&self) -> &[char] {
        &self.answers
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Always false; an empty key cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Sorted distinct letters of the key.
    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    /// Number of answer choices (bubbles) per question.
    pub fn choices(&self) -> usize {
        self.alphabet.len()
    }

    /// Bubble index of `letter`.
    pub fn choice_index(&self, letter: char) -> Result<usize> {
        self.alphabet
            .binary_search(&letter)
            .map_err(|_| QuizmarkError::UnknownAnswerLetter(letter))
    }

    /// Letter of bubble `index`, if the alphabet has one.
    pub fn choice_letter(&self, index: usize) -> Option<char> {
        self.alphabet.get(index).copied()
    }
}

fn parse_letter(token: &str) -> Result<char> {
    let trimmed = token.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => Ok(letter.to_ascii_uppercase()),
        _ => Err(QuizmarkError::InvalidAnswerToken(token.to_owned())),
    }
}

/// Running count of graded questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub correct: usize,
    pub total: usize,
}

impl Tally {
    /// Record one graded question.
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }

    /// Percentage of correct answers, rounded to two decimals with exact
    /// halves going to the even digit (3.125 becomes 3.12).
    pub fn score(&self) -> Result<f64> {
        if self.total == 0 {
            return Err(QuizmarkError::NoQuestions);
        }
        let percent = self.correct as f64 / self.total as f64 * 100.0;
        Ok((percent * 100.0).round_ties_even() / 100.0)
    }
}

/// Score as printed to the user: always at least one decimal, e.g. `100.0%`
/// or `66.67%`.
pub fn format_percent(score: f64) -> String {
    format!("{score:?}%")
}

/// Result of grading one question row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    /// Zero-based question number.
    pub question: usize,
    /// Letter from the answer key.
    pub expected: char,
    /// Letter of the most filled bubble.
    pub selected: char,
    pub correct: bool,
    /// On-pixel count of every bubble in the row, left to right.
    pub fill_counts: Vec<u32>,
}

/// Grading result for a whole sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    /// Percentage in [0, 100], rounded to two decimals.
    pub score: f64,
    pub correct: usize,
    pub total: usize,
    pub questions: Vec<QuestionOutcome>,
}
