//! Free-text helpers shared by the stage parsers
//!
//! Model output has no guaranteed schema. These helpers only locate
//! candidate structure; each stage decides what counts as a parse failure.

/// Extract the outermost JSON object from model output (handles surrounding text)
pub fn extract_json(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&response[start..=end])
}

/// Remove Markdown code fences and inline backticks around a snippet
pub fn strip_code_fences(response: &str) -> String {
    response
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .trim_matches('`')
        .trim()
        .to_string()
}

/// Lowercase words of the text with punctuation stripped
pub fn normalized_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}
