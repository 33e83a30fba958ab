//! The text-to-MCQ pipeline: chunk, generate, parse, aggregate.

use indicatif::ProgressBar;

use crate::config::McqConfig;
use crate::error::{McqError, Result};
use crate::generate::Generator;
use crate::parse::{ParseAnomaly, parse_response};
use crate::table::{McqRow, RequestMetadata, format_rows};
use crate::text::chunk_text;

/// A skipped segment, tagged with the chunk whose response contained it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkAnomaly {
    pub chunk: usize,
    pub anomaly: ParseAnomaly,
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOutput {
    /// Rows in chunk order, then in generation order within a chunk
    pub rows: Vec<McqRow>,
    pub anomalies: Vec<ChunkAnomaly>,
    pub chunk_count: usize,
    /// Records whose correct answer matched none of their options
    pub unmatched_answers: usize,
}

pub struct McqPipeline {
    generator: Generator,
    max_chunk_size: usize,
    concurrency: usize,
}

impl McqPipeline {
    pub fn new(config: &McqConfig, generator: Generator) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            generator,
            max_chunk_size: config.max_chunk_size,
            concurrency: config.concurrency,
        })
    }

    /// Turn source text into MCQ rows.
    ///
    /// A generation failure for any chunk aborts the whole run with no
    /// partial rows. Malformed response segments are skipped and reported
    /// in [`PipelineOutput::anomalies`].
    pub async fn run(
        &self,
        text: &str,
        metadata: &RequestMetadata,
        progress: &ProgressBar,
    ) -> Result<PipelineOutput> {
        if text.trim().is_empty() {
            return Err(McqError::EmptyText);
        }

        let chunks = chunk_text(text, self.max_chunk_size);
        log::info!(
            "Split {} chars into {} chunk(s) of at most {}",
            text.chars().count(),
            chunks.len(),
            self.max_chunk_size
        );
        progress.set_length(chunks.len() as u64);

        let responses = self
            .generator
            .generate_all(&chunks, metadata, self.concurrency, progress)
            .await?;

        let mut output = PipelineOutput {
            chunk_count: chunks.len(),
            ..Default::default()
        };
        let mut records = Vec::new();

        for (chunk, response) in responses.iter().enumerate() {
            let parsed = parse_response(response);
            log::debug!(
                "Chunk {}: {} question(s), {} skipped segment(s)",
                chunk,
                parsed.records.len(),
                parsed.anomalies.len()
            );
            if parsed.records.is_empty() && parsed.anomalies.is_empty() {
                log::warn!("Chunk {}: response contained no questions", chunk);
            }

            for anomaly in parsed.anomalies {
                log::warn!(
                    "Chunk {}: skipping segment {}: {}",
                    chunk,
                    anomaly.segment,
                    anomaly.reason
                );
                output.anomalies.push(ChunkAnomaly { chunk, anomaly });
            }

            for record in &parsed.records {
                if !record.answer_in_options() {
                    log::warn!(
                        "Chunk {}: answer {:?} matches none of the options for {:?}",
                        chunk,
                        record.correct_answer,
                        record.question
                    );
                    output.unmatched_answers += 1;
                }
            }
            records.extend(parsed.records);
        }

        output.rows = format_rows(records, metadata);
        log::info!(
            "Generated {} question(s) from {} chunk(s)",
            output.rows.len(),
            output.chunk_count
        );
        Ok(output)
    }
}
