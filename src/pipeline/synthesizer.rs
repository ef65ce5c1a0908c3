//! Command synthesizer stage
//!
//! The model only names the command; the catalog decides the template and
//! the required fields, and the question decides which of them are missing.
//! Nothing from the model output is copied into the artifact.

use crate::command::placeholder::supplied_in;
use crate::command::resolver::CommandSkeleton;
use crate::core::error::{IdaError, Result};
use crate::llm::client::{InferenceClient, Stage};
use crate::llm::parser::{extract_json, strip_code_fences};
use crate::pipeline::types::CommandArtifact;

/// Produce a command artifact with one inference call
///
/// Fails with [`IdaError::TemplateParse`] when the output does not name a
/// supported command, and with [`IdaError::InferenceUnavailable`] when the
/// service is down.
pub async fn synthesize<C>(client: &C, instruction: &str, question: &str) -> Result<CommandArtifact>
where
    C: InferenceClient + ?Sized,
{
    let raw = client.infer(Stage::Command, instruction, question).await?;
    let skeleton = parse_template(&raw)?;
    let artifact = build_artifact(&skeleton, question)?;
    tracing::debug!(
        template = artifact.command_template(),
        missing = ?artifact.missing_fields(),
        "Command synthesized"
    );
    Ok(artifact)
}

/// Parse model output into a command skeleton
///
/// Looks for a `generated_command` JSON field first, then for the first
/// line starting with `oci `.
pub fn parse_template(raw: &str) -> Result<CommandSkeleton> {
    if raw.trim().is_empty() {
        return Err(IdaError::TemplateParse("empty output".into()));
    }

    let line = command_line(raw)
        .ok_or_else(|| IdaError::TemplateParse("no `oci` command in output".into()))?;

    CommandSkeleton::parse(&line)
        .ok_or_else(|| IdaError::TemplateParse(format!("incomplete command: {}", line)))
}

fn command_line(raw: &str) -> Option<String> {
    if let Some(json) = extract_json(raw) {
        let command = serde_json::from_str::<serde_json::Value>(json)
            .ok()
            .and_then(|v| v.get("generated_command")?.as_str().map(str::to_string))
            .map(|c| c.trim().to_string())
            .filter(|c| c.starts_with("oci "));
        if command.is_some() {
            return command;
        }
    }

    strip_code_fences(raw)
        .lines()
        .map(|line| line.trim().trim_start_matches('$').trim().trim_matches('`'))
        .find(|line| line.starts_with("oci "))
        .map(str::to_string)
}

/// Map a skeleton onto its catalog family and compute the missing fields
pub fn build_artifact(skeleton: &CommandSkeleton, question: &str) -> Result<CommandArtifact> {
    let family = skeleton.family().ok_or_else(|| {
        IdaError::TemplateParse(format!(
            "unsupported command family `{} {}`",
            skeleton.service, skeleton.verb
        ))
    })?;

    if !family.required_fields.is_empty() && skeleton.placeholders.is_empty() {
        return Err(IdaError::TemplateParse(format!(
            "missing placeholder syntax for `{}`",
            family.key()
        )));
    }
    if skeleton.literal_values > 0 {
        tracing::warn!(
            family = %family.key(),
            literal_values = skeleton.literal_values,
            "Discarding literal values from model output"
        );
    }

    let required_fields: Vec<String> = family
        .required_fields
        .iter()
        .map(|f| f.to_string())
        .collect();
    let missing_fields = required_fields
        .iter()
        .filter(|field| !supplied_in(field, question))
        .cloned()
        .collect();

    CommandArtifact::new(family.template.to_string(), required_fields, missing_fields)
}
