// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Grader — groups bubbles into question rows, picks the most filled bubble of
// each row, and scores the sheet against the answer key.

use image::{GrayImage, Luma, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;
use quizmark_core::error::{QuizmarkError, Result};
use quizmark_core::types::{AnswerKey, GradeReport, QuestionOutcome, Tally};
use tracing::{debug, info, instrument};

use crate::geometry::Region;
use crate::scan::annotate::Annotator;
use crate::scan::bubbles::BubbleScan;

/// Grading result plus the annotated rectified sheet.
#[derive(Debug, Clone)]
pub struct GradedSheet {
    pub report: GradeReport,
    pub annotated: RgbImage,
}

/// The expected bubble of one question and whether it was the one selected.
#[derive(Debug, Clone)]
pub struct Mark {
    pub bubble: Region,
    pub correct: bool,
}

/// Grade the detected bubbles and annotate a copy of the rectified sheet.
#[instrument(skip_all, fields(bubbles = scan.bubbles.len(), questions = key.len()))]
pub fn grade_sheet(
    color: &RgbImage,
    scan: BubbleScan,
    key: &AnswerKey,
    annotator: &Annotator,
) -> Result<GradedSheet> {
    let (report, marks) = grade_bubbles(scan.bubbles, &scan.threshold, key)?;

    let mut annotated = color.clone();
    for mark in &marks {
        annotator.outline(&mut annotated, &mark.bubble, mark.correct);
    }
    annotator.overlay_score(&mut annotated, report.score);

    Ok(GradedSheet { report, annotated })
}

/// Score bubbles against `key` using the binary sheet they were found on.
///
/// Bubbles are ordered top to bottom and cut into rows of `key.choices()`;
/// each row is ordered left to right. The bubble count must be exactly
/// `key.len() * key.choices()`.
pub fn grade_bubbles(
    mut bubbles: Vec<Region>,
    threshold: &GrayImage,
    key: &AnswerKey,
) -> Result<(GradeReport, Vec<Mark>)> {
    let choices = key.choices();
    check_bubble_count(bubbles.len(), choices, key.len())?;

    bubbles.sort_by_key(|b| (b.bounds.y, b.bounds.x));

    let mut tally = Tally::default();
    let mut outcomes = Vec::with_capacity(key.len());
    let mut marks = Vec::with_capacity(key.len());

    let mut rows = Vec::with_capacity(key.len());
    let mut remaining = bubbles;
    while !remaining.is_empty() {
        let rest = remaining.split_off(choices);
        rows.push(remaining);
        remaining = rest;
    }

    for (question, (mut row, &expected)) in rows.into_iter().zip(key.answers()).enumerate() {
        row.sort_by_key(|b| (b.bounds.x, b.bounds.y));

        let fill_counts: Vec<u32> = row.iter().map(|b| filled_pixels(b, threshold)).collect();
        let selected_index = most_filled(&fill_counts);
        let expected_index = key.choice_index(expected)?;
        let correct = selected_index == expected_index;
        tally.record(correct);

        debug!(question, ?fill_counts, selected_index, expected_index, correct, "Question graded");

        outcomes.push(QuestionOutcome {
            question,
            expected,
            selected: key.alphabet()[selected_index],
            correct,
            fill_counts,
        });
        marks.push(Mark {
            bubble: row.swap_remove(expected_index),
            correct,
        });
    }

    let score = tally.score()?;
    info!(score, correct = tally.correct, total = tally.total, "Sheet graded");

    Ok((
        GradeReport {
            score,
            correct: tally.correct,
            total: tally.total,
            questions: outcomes,
        },
        marks,
    ))
}

fn check_bubble_count(bubbles: usize, choices: usize, questions: usize) -> Result<()> {
    if bubbles == 0 || choices == 0 || bubbles % choices != 0 || bubbles / choices != questions {
        return Err(QuizmarkError::BubbleCountMismatch {
            bubbles,
            choices,
            questions,
        });
    }
    Ok(())
}

/// Index of the strictly largest count; the first one wins ties.
fn most_filled(counts: &[u32]) -> usize {
    let mut best = 0;
    for (index, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = index;
        }
    }
    best
}

/// Number of on pixels of `threshold` inside the filled bubble outline.
pub fn filled_pixels(bubble: &Region, threshold: &GrayImage) -> u32 {
    let bounds = bubble.bounds;
    let mut outline: Vec<Point<i32>> = bubble
        .points
        .iter()
        .map(|p| Point::new(p.x - bounds.x, p.y - bounds.y))
        .collect();
    // Polygon filling rejects a closing point equal to the first.
    while outline.len() > 1 && outline.first() == outline.last() {
        outline.pop();
    }
    if outline.len() < 3 {
        return 0;
    }

    let mut mask = GrayImage::new(bounds.width, bounds.height);
    draw_polygon_mut(&mut mask, &outline, Luma([255u8]));

    let mut count = 0;
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel.0[0] == 0 {
            continue;
        }
        let (tx, ty) = (bounds.x + x as i32, bounds.y + y as i32);
        if tx < 0 || ty < 0 || tx as u32 >= threshold.width() || ty as u32 >= threshold.height() {
            continue;
        }
        if threshold.get_pixel(tx as u32, ty as u32).0[0] != 0 {
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::bubbles::find_bubbles;
    use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};
    use quizmark_core::config::{AnnotationConfig, BubbleConfig};

    const ON: Luma<u8> = Luma([255u8]);

    /// Binary sheet with one row per entry of `marked`; each row has `choices`
    /// ring bubbles and the listed bubbles filled in.
    fn sheet(choices: usize, marked: &[&[usize]]) -> GrayImage {
        let width = 60 + choices as u32 * 70;
        let height = 60 + marked.len() as u32 * 70;
        let mut thresh = GrayImage::new(width, height);
        for (row, filled) in marked.iter().enumerate() {
            let cy = 60 + row as i32 * 70;
            for col in 0..choices {
                let cx = 60 + col as i32 * 70;
                if filled.contains(&col) {
                    draw_filled_circle_mut(&mut thresh, (cx, cy), 20, ON);
                } else {
                    for r in 17..=20 {
                        draw_hollow_circle_mut(&mut thresh, (cx, cy), r, ON);
                    }
                }
            }
        }
        thresh
    }

    fn grade(key: &[&str], marked: &[&[usize]]) -> Result<GradeReport> {
        let key = AnswerKey::parse(key.iter().copied()).expect("valid key");
        let thresh = sheet(key.choices(), marked);
        let bubbles = find_bubbles(&thresh, &BubbleConfig::default());
        grade_bubbles(bubbles, &thresh, &key).map(|(report, _)| report)
    }

    fn square(x: i32, y: i32) -> Region {
        Region::new(vec![
            Point::new(x, y),
            Point::new(x + 39, y),
            Point::new(x + 39, y + 39),
            Point::new(x, y + 39),
        ])
        .expect("non-empty")
    }

    #[test]
    fn all_correct_scores_full_marks() {
        let report = grade(&["A", "B", "C", "D"], &[&[0], &[1], &[2], &[3]]).expect("graded");
        assert_eq!(report.score, 100.0);
        assert_eq!(report.correct, 4);
        let selected: Vec<char> = report.questions.iter().map(|q| q.selected).collect();
        assert_eq!(selected, vec!['A', 'B', 'C', 'D']);
    }

    #[test]
    fn one_wrong_of_three() {
        let report = grade(&["A", "B", "C"], &[&[0], &[1], &[0]]).expect("graded");
        assert_eq!(report.score, 66.67);
        assert_eq!(report.correct, 2);
        assert_eq!(report.total, 3);
        assert!(!report.questions[2].correct);
        assert_eq!(report.questions[2].selected, 'A');
        assert_eq!(report.questions[2].expected, 'C');
    }

    #[test]
    fn tie_selects_leftmost_bubble() {
        let report = grade(&["B", "A"], &[&[0, 1], &[0]]).expect("graded");
        let first = &report.questions[0];
        assert_eq!(first.fill_counts[0], first.fill_counts[1]);
        assert_eq!(first.selected, 'A');
        assert!(!first.correct);
        assert_eq!(report.score, 50.0);
    }

    #[test]
    fn blank_row_selects_first_bubble() {
        let report = grade(&["A", "B"], &[&[0], &[]]).expect("graded");
        assert_eq!(report.questions[1].selected, 'A');
        assert_eq!(report.score, 50.0);
    }

    #[test]
    fn filled_bubble_counts_more_than_ring() {
        let report = grade(&["A", "B"], &[&[0], &[1]]).expect("graded");
        let counts = &report.questions[0].fill_counts;
        assert!(counts[0] > counts[1] * 2, "{counts:?}");
    }

    #[test]
    fn count_not_multiple_of_choices_is_rejected() {
        let key = AnswerKey::parse(["A", "B", "C", "D"]).expect("valid key");
        let bubbles: Vec<Region> = (0..17).map(|i| square(i * 50, 0)).collect();
        let thresh = GrayImage::new(900, 50);
        assert!(matches!(
            grade_bubbles(bubbles, &thresh, &key),
            Err(QuizmarkError::BubbleCountMismatch {
                bubbles: 17,
                choices: 4,
                questions: 4
            })
        ));
    }

    #[test]
    fn row_count_must_match_key_length() {
        let key = AnswerKey::parse(["A", "B", "C", "D", "A"]).expect("valid key");
        let bubbles: Vec<Region> = (0..16).map(|i| square((i % 4) * 50, (i / 4) * 50)).collect();
        let thresh = GrayImage::new(200, 200);
        assert!(matches!(
            grade_bubbles(bubbles, &thresh, &key),
            Err(QuizmarkError::BubbleCountMismatch { .. })
        ));
    }

    #[test]
    fn grade_sheet_outlines_expected_bubbles() {
        let key = AnswerKey::parse(["A", "B"]).expect("valid key");
        let thresh = sheet(2, &[&[0], &[0]]);
        let bubbles = find_bubbles(&thresh, &BubbleConfig::default());
        let color = RgbImage::from_pixel(thresh.width(), thresh.height(), image::Rgb([255, 255, 255]));
        let scan = BubbleScan {
            threshold: thresh,
            bubbles,
        };

        // Score text goes along the bottom edge, below the second row.
        let config = AnnotationConfig {
            text_origin: [10, 195],
            text_scale: 30.0,
            ..AnnotationConfig::default()
        };
        let annotator = Annotator::new(config).expect("bundled font");
        let graded = grade_sheet(&color, scan, &key, &annotator).expect("graded");
        assert_eq!(graded.report.score, 50.0);
        // Row 0 expects A (left, correct, blue); row 1 expects B (right, wrong, red).
        assert_eq!(graded.annotated.get_pixel(60, 40).0, [0, 0, 255]);
        assert_eq!(graded.annotated.get_pixel(130, 110).0, [255, 0, 0]);
        // Unexpected bubbles are left alone.
        assert_eq!(graded.annotated.get_pixel(130, 40).0, [255, 255, 255]);
        // The overlay inks the strip under the bubbles.
        let text_inked = (155..200u32)
            .flat_map(|y| (0..200u32).map(move |x| (x, y)))
            .any(|(x, y)| graded.annotated.get_pixel(x, y).0 != [255, 255, 255]);
        assert!(text_inked);
    }
}
