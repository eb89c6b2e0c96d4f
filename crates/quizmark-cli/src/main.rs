// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quizmark — grade a photographed bubble-sheet quiz from the command line.
//
// Entry point. Initialises logging, parses arguments, runs the scanner, and
// reports the score or a human-readable error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use quizmark_core::error::Result;
use quizmark_core::human_errors::{Severity, humanize_error};
use quizmark_core::{AnswerKey, GradeReport, QuizmarkError, ScanConfig, format_percent};
use quizmark_scan::image::loader::save_sheet;
use quizmark_scan::{Annotator, QuizScanner};

/// Grade a photographed multiple-choice bubble sheet against an answer key.
#[derive(Debug, Parser)]
#[command(name = "quizmark", version)]
#[command(about = "Grade a photographed bubble-sheet quiz")]
struct Args {
    /// Path to the quiz photo
    #[arg(short, long)]
    image: PathBuf,

    /// Answer key, one letter per question (e.g. -a B E A C B)
    #[arg(short, long, num_args = 0..)]
    answers: Vec<String>,

    /// JSON scan configuration; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to save the annotated sheet (format from the extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TrueType/OpenType font for the score overlay (DejaVu Sans by default)
    #[arg(long)]
    font: Option<PathBuf>,

    /// Print the full grade report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(err) => return report_error(&QuizmarkError::from(err)),
                }
            } else {
                for outcome in &report.questions {
                    println!(
                        "Question {}: marked {}, expected {} ({})",
                        outcome.question + 1,
                        outcome.selected,
                        outcome.expected,
                        if outcome.correct { "correct" } else { "wrong" }
                    );
                }
                println!("Grading finished, test score: {}", format_percent(report.score));
            }
            ExitCode::SUCCESS
        }
        Err(err) => report_error(&err),
    }
}

/// Grade the sheet described by `args` and save the annotated copy if asked.
fn run(args: &Args) -> Result<GradeReport> {
    let key = AnswerKey::parse(&args.answers)?;

    let config = match &args.config {
        Some(path) => ScanConfig::from_json_file(path)?,
        None => ScanConfig::default(),
    };

    let mut scanner = QuizScanner::new(config)?;
    if let Some(path) = &args.font {
        let annotator = Annotator::new(scanner.config().annotation.clone())?.with_font_file(path)?;
        scanner = scanner.with_annotator(annotator);
    }
    let graded = scanner.grade_path(&args.image, &key)?;

    if let Some(path) = &args.output {
        save_sheet(&graded.annotated, path)?;
        tracing::info!(path = %path.display(), "Annotated sheet saved");
    }

    Ok(graded.report)
}

fn report_error(err: &QuizmarkError) -> ExitCode {
    let human = humanize_error(err);
    eprintln!("error ({}): {}", err.stage(), err);
    eprintln!("{}", human.message);
    eprintln!("{}", human.suggestion);
    if human.severity == Severity::RetakePhoto {
        eprintln!("Retaking the photo may help.");
    }
    ExitCode::FAILURE
}
