use crate::types::SummaryFormat;

/// Example reply shown to the model. It is a sample, not a strict schema.
const RESPONSE_SCHEMA: &str = include_str!("./prompts/response_schema.json");

const KEY_POINTS_REQUEST: &str = "2. 3-5 key takeaway points";

fn format_instruction(format: SummaryFormat) -> &'static str {
    match format {
        SummaryFormat::Paragraph => "as a cohesive, flowing paragraph",
        SummaryFormat::Bullets => "as clear bullet points",
        SummaryFormat::Abstract => {
            "as an academic-style abstract with background, methods, and conclusions"
        }
    }
}

/// Builds the user prompt for one summarization call.
///
/// When `include_key_points` is false the key points line is left blank and
/// the remaining items keep their numbers.
pub fn build_summary_prompt(
    text: &str,
    target_words: u32,
    format: SummaryFormat,
    include_key_points: bool,
) -> String {
    let instruction = format_instruction(format);
    let key_points = if include_key_points {
        KEY_POINTS_REQUEST
    } else {
        ""
    };

    format!(
        "Summarize the following text in approximately {target_words} words, formatted {instruction}.

Article:
{text}

Provide:
1. Concise summary
{key_points}
3. Main topics/themes covered

Return JSON:
{RESPONSE_SCHEMA}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        let a = build_summary_prompt("Some text.", 175, SummaryFormat::Paragraph, true);
        let b = build_summary_prompt("Some text.", 175, SummaryFormat::Paragraph, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_prompt_contains_source_verbatim() {
        let text = "<p>Line one</p>\n  indented {braces} line";
        let prompt = build_summary_prompt(text, 75, SummaryFormat::Bullets, true);

        assert!(prompt.contains(&format!("Article:\n{text}\n\nProvide:")));
        assert!(prompt.starts_with(
            "Summarize the following text in approximately 75 words, formatted as clear bullet points."
        ));
    }

    #[test]
    fn test_prompt_with_key_points() {
        let prompt = build_summary_prompt("text", 350, SummaryFormat::Abstract, true);

        assert!(prompt.contains("1. Concise summary\n2. 3-5 key takeaway points\n3. Main topics"));
        assert!(prompt.contains("academic-style abstract"));
    }

    #[test]
    fn test_prompt_without_key_points_keeps_numbering() {
        let prompt = build_summary_prompt("text", 175, SummaryFormat::Paragraph, false);

        assert!(!prompt.contains("key takeaway points"));
        assert!(prompt.contains("1. Concise summary\n\n3. Main topics/themes covered"));
        assert!(prompt.contains("\"summary\""));
        assert!(prompt.contains("\"mainTopics\""));
    }

    #[test]
    fn test_prompt_ends_with_json_example() {
        let prompt = build_summary_prompt("text", 175, SummaryFormat::Paragraph, true);

        assert!(prompt.ends_with('}'));
        let example = prompt.split("Return JSON:\n").nth(1).unwrap();
        let value: serde_json::Value = serde_json::from_str(example).unwrap();
        for key in ["summary", "keyPoints", "mainTopics"] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
    }
}
