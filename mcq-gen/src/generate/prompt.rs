//! Prompt construction for question generation.

use crate::table::RequestMetadata;

pub const CHUNK_PLACEHOLDER: &str = "{chunk}";
pub const TOPIC_PLACEHOLDER: &str = "{topic}";
pub const DIFFICULTY_PLACEHOLDER: &str = "{difficulty}";

/// Default prompt. Asks for exactly the layout the response parser reads.
pub const DEFAULT_PROMPT_TEMPLATE: &str = "Generate multiple-choice questions from the following text:
{chunk}

The questions are about {topic} and should be of {difficulty} difficulty.
Each question must have exactly 4 options with one correct answer clearly indicated.
Write every question in exactly this format, one line per item, and nothing else:

Question: <question text>
A) <option>
B) <option>
C) <option>
D) <option>
Correct answer: <letter>) <option text>";

/// Fill a prompt template for one chunk.
///
/// The chunk is substituted last so placeholder-like text inside the
/// source document is left alone.
pub fn render_prompt(template: &str, chunk: &str, metadata: &RequestMetadata) -> String {
    template
        .replace(TOPIC_PLACEHOLDER, &metadata.topic)
        .replace(DIFFICULTY_PLACEHOLDER, &metadata.difficulty)
        .replace(CHUNK_PLACEHOLDER, chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> RequestMetadata {
        RequestMetadata::new("notes.txt", "Biology", "Hard")
    }

    #[test]
    fn test_default_template_embeds_chunk_and_labels() {
        let prompt = render_prompt(DEFAULT_PROMPT_TEMPLATE, "Cells divide by mitosis.", &metadata());
        assert!(prompt.contains("Cells divide by mitosis."));
        assert!(prompt.contains("about Biology"));
        assert!(prompt.contains("of Hard difficulty"));
        assert!(prompt.contains("Question:"));
        assert!(prompt.contains("Correct answer:"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_chunk_text_is_not_reinterpreted() {
        let prompt = render_prompt("Text: {chunk}", "literal {topic} braces", &metadata());
        assert_eq!(prompt, "Text: literal {topic} braces");
    }

    #[test]
    fn test_template_without_optional_placeholders() {
        let prompt = render_prompt("Q from: {chunk}", "abc", &metadata());
        assert_eq!(prompt, "Q from: abc");
    }
}
