//! Router stage - does this question need a command artifact?

use crate::core::error::{IdaError, Result};
use crate::llm::client::{InferenceClient, Stage};
use crate::llm::parser::{extract_json, normalized_words};
use crate::pipeline::types::RouterDecision;

const AFFIRMATIVE: &[&str] = &["yes", "y", "true"];
const NEGATIVE: &[&str] = &["no", "n", "false"];

/// Classify the question with one inference call
///
/// Unparseable output falls back to [`RouterDecision::CONSERVATIVE`]; only
/// an unavailable inference service is an error.
pub async fn route<C>(client: &C, instruction: &str, question: &str) -> Result<RouterDecision>
where
    C: InferenceClient + ?Sized,
{
    let raw = client.infer(Stage::Router, instruction, question).await?;

    match parse_decision(&raw) {
        Ok(decision) => {
            tracing::debug!(needs_command = decision.needs_command, "Router decided");
            Ok(decision)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Router output unusable, answering conceptually");
            Ok(RouterDecision::CONSERVATIVE)
        }
    }
}

/// Parse router output into a strict boolean
///
/// Accepts a leading yes/no token (`YES`, `no.`, `true`) or a JSON object
/// with a boolean `use_command_tool` / `needs_command` field. Text that also
/// carries the opposite token, and anything else, is a
/// [`IdaError::RouterParse`].
pub fn parse_decision(raw: &str) -> Result<RouterDecision> {
    if let Some(json) = extract_json(raw) {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(json) {
            let flag = value
                .get("use_command_tool")
                .or_else(|| value.get("needs_command"))
                .and_then(|v| v.as_bool());
            return match flag {
                Some(needs_command) => Ok(RouterDecision { needs_command }),
                None => Err(IdaError::RouterParse(format!(
                    "JSON without boolean decision: {}",
                    json
                ))),
            };
        }
    }

    let words = normalized_words(raw);
    let needs_command = match words.first().map(String::as_str) {
        Some(word) if AFFIRMATIVE.contains(&word) => true,
        Some(word) if NEGATIVE.contains(&word) => false,
        _ => {
            return Err(IdaError::RouterParse(format!(
                "expected YES or NO, got: {}",
                raw.trim()
            )))
        }
    };

    // A reply that says both is no decision at all
    if mentions(&words, AFFIRMATIVE) && mentions(&words, NEGATIVE) {
        return Err(IdaError::RouterParse(format!(
            "contradictory decision: {}",
            raw.trim()
        )));
    }

    Ok(RouterDecision { needs_command })
}

fn mentions(words: &[String], tokens: &[&str]) -> bool {
    words.iter().any(|w| tokens.iter().any(|t| *t == w.as_str()))
}
