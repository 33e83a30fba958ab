//! Aggregating parsed questions into the tabular output.

use serde::{Deserialize, Serialize};

use crate::parse::QuestionRecord;

/// Column headers, in output order
pub const COLUMNS: [&str; 6] = [
    "Question",
    "Options",
    "Correct Answer",
    "Source",
    "Topic",
    "Difficulty",
];

/// Separator used when the options are flattened into one cell
pub const OPTION_SEPARATOR: &str = " | ";

/// Request-level labels copied onto every row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMetadata {
    pub source: String,
    pub topic: String,
    pub difficulty: String,
}

impl RequestMetadata {
    pub fn new(
        source: impl Into<String>,
        topic: impl Into<String>,
        difficulty: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            topic: topic.into(),
            difficulty: difficulty.into(),
        }
    }
}

/// One row of the final table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqRow {
    #[serde(rename = "Question")]
    pub question: String,
    #[serde(rename = "Options")]
    pub options: Vec<String>,
    #[serde(rename = "Correct Answer")]
    pub correct_answer: String,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Topic")]
    pub topic: String,
    #[serde(rename = "Difficulty")]
    pub difficulty: String,
}

impl McqRow {
    /// Cell values in [`COLUMNS`] order, options flattened
    pub fn cells(&self) -> [String; 6] {
        [
            self.question.clone(),
            self.options.join(OPTION_SEPARATOR),
            self.correct_answer.clone(),
            self.source.clone(),
            self.topic.clone(),
            self.difficulty.clone(),
        ]
    }
}

/// Attach request metadata to every record, keeping order.
pub fn format_rows(records: Vec<QuestionRecord>, metadata: &RequestMetadata) -> Vec<McqRow> {
    records
        .into_iter()
        .map(|record| McqRow {
            question: record.question,
            options: record.options,
            correct_answer: record.correct_answer,
            source: metadata.source.clone(),
            topic: metadata.topic.clone(),
            difficulty: metadata.difficulty.clone(),
        })
        .collect()
}
