//! Parsing free-form model output into question records.
//!
//! Expected shape of one question inside a response:
//!
//! ```text
//! Question: What is the capital of France?
//! A) Berlin
//! B) Madrid
//! C) Paris
//! D) Rome
//! Correct answer: C) Paris
//! ```
//!
//! The model is only asked to produce this; nothing guarantees it does.
//! Segments that do not fit are reported as anomalies and skipped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Literal marker that starts every question in a response.
pub const QUESTION_MARKER: &str = "Question:";

/// Label stripped from the answer line (matched case-insensitively).
pub const ANSWER_LABEL: &str = "Correct answer:";

pub const OPTION_COUNT: usize = 4;

/// Question line, four options, answer line
const LINES_PER_QUESTION: usize = OPTION_COUNT + 2;

/// One parsed multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuestionRecord {
    /// Whether the correct answer names one of the options.
    ///
    /// Accepts an exact match, an option letter (`C`, `C)`) or the option
    /// text without its letter prefix.
    pub fn answer_in_options(&self) -> bool {
        let answer = self.correct_answer.trim();
        if answer.is_empty() {
            return false;
        }
        let answer_letter = option_letter(answer);

        self.options.iter().any(|option| {
            let option = option.trim();
            if option.eq_ignore_ascii_case(answer) {
                return true;
            }
            let option_body = strip_option_letter(option);
            if option_body.eq_ignore_ascii_case(strip_option_letter(answer)) {
                return true;
            }
            // A bare letter like "C" or "C)" refers to the option labelled C
            answer.trim_end_matches([')', '.']).len() == 1
                && answer_letter.is_some()
                && answer_letter == option_letter(option)
        })
    }
}

/// Why a segment was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnomalyReason {
    /// Fewer non-blank lines than a question needs
    TooFewLines { found: usize },
}

impl fmt::Display for AnomalyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyReason::TooFewLines { found } => write!(
                f,
                "expected {} lines, found {}",
                LINES_PER_QUESTION, found
            ),
        }
    }
}

/// A segment that could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAnomaly {
    /// 0-based index among the segments that followed a marker
    pub segment: usize,
    pub reason: AnomalyReason,
}

/// Result of parsing a single segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentOutcome {
    Record(QuestionRecord),
    Anomaly(ParseAnomaly),
}

/// Everything recovered from one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    pub records: Vec<QuestionRecord>,
    pub anomalies: Vec<ParseAnomaly>,
}

/// Parse each question segment of a raw response.
///
/// Text before the first marker is preamble and is ignored.
pub fn parse_segments(raw: &str) -> Vec<SegmentOutcome> {
    raw.split(QUESTION_MARKER)
        .skip(1)
        .enumerate()
        .map(|(segment, text)| match parse_segment(text) {
            Ok(record) => SegmentOutcome::Record(record),
            Err(reason) => SegmentOutcome::Anomaly(ParseAnomaly { segment, reason }),
        })
        .collect()
}

/// Parse a raw response into records, collecting anomalies instead of
/// failing.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let mut parsed = ParsedResponse::default();
    for outcome in parse_segments(raw) {
        match outcome {
            SegmentOutcome::Record(record) => parsed.records.push(record),
            SegmentOutcome::Anomaly(anomaly) => parsed.anomalies.push(anomaly),
        }
    }
    parsed
}

fn parse_segment(text: &str) -> Result<QuestionRecord, AnomalyReason> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < LINES_PER_QUESTION {
        return Err(AnomalyReason::TooFewLines { found: lines.len() });
    }

    // Blank lines were dropped, so a marker on a line of its own still
    // picks up the question from the next line
    let question = lines[0].to_string();
    let options = lines[1..=OPTION_COUNT]
        .iter()
        .map(|line| line.to_string())
        .collect();
    let correct_answer = strip_answer_label(lines[OPTION_COUNT + 1]).to_string();

    Ok(QuestionRecord {
        question,
        options,
        correct_answer,
    })
}

fn strip_answer_label(line: &str) -> &str {
    let label_len = ANSWER_LABEL.len();
    match line.get(..label_len) {
        Some(prefix) if prefix.eq_ignore_ascii_case(ANSWER_LABEL) => line[label_len..].trim(),
        _ => line,
    }
}

/// `Some('C')` for text like "C) Paris", "c. Paris" or "C"
fn option_letter(text: &str) -> Option<char> {
    let mut chars = text.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    if !letter.is_ascii_alphabetic() {
        return None;
    }
    match chars.next() {
        None | Some(')') | Some('.') | Some(':') => Some(letter),
        _ => None,
    }
}

fn strip_option_letter(text: &str) -> &str {
    if option_letter(text).is_some() && text.len() > 1 {
        text[2..].trim()
    } else {
        text.trim()
    }
}
