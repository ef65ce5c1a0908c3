//! Answer synthesizer stage - always runs, produces the final reply

use crate::core::error::{IdaError, Result};
use crate::llm::client::{InferenceClient, Stage};
use crate::llm::prompts::{COMMAND_FAILED_NOTE, COMMAND_REPLY_REQUIREMENTS};
use crate::pipeline::types::CommandArtifact;

/// Notice prepended when the model ignored a failed command synthesis
pub const COMMAND_UNAVAILABLE_NOTICE: &str =
    "Note: a CLI command could not be generated for this question, so this answer is conceptual only.";

/// What the command stage contributed to this request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The router decided no command was needed
    NotRequested,
    /// A command artifact was produced
    Produced(CommandArtifact),
    /// A command was expected but synthesis failed
    Failed(String),
}

impl CommandOutcome {
    pub fn into_artifact(self) -> Option<CommandArtifact> {
        match self {
            CommandOutcome::Produced(artifact) => Some(artifact),
            _ => None,
        }
    }
}

/// Produce the final reply with one inference call
pub async fn answer<C>(
    client: &C,
    instruction: &str,
    question: &str,
    outcome: &CommandOutcome,
) -> Result<String>
where
    C: InferenceClient + ?Sized,
{
    let content = compose_content(question, outcome);
    let raw = client.infer(Stage::Answer, instruction, &content).await?;
    let reply = check_reply(&raw)?;

    Ok(match outcome {
        CommandOutcome::Failed(_) => ensure_failure_notice(reply),
        _ => reply,
    })
}

/// Build the answer-stage content: the question plus a `[CommandTool]` block
/// when the command stage ran
pub fn compose_content(question: &str, outcome: &CommandOutcome) -> String {
    let mut content = String::from(question);

    match outcome {
        CommandOutcome::NotRequested => {}
        CommandOutcome::Produced(artifact) => {
            let tool = serde_json::json!({
                "generated_command": artifact.command_template(),
                "missing_fields": artifact.missing_fields(),
            });
            content.push_str("\n\n[CommandTool]\n");
            content.push_str(&tool.to_string());
            content.push_str("\n\n");
            content.push_str(COMMAND_REPLY_REQUIREMENTS);
        }
        CommandOutcome::Failed(_) => {
            content.push_str("\n\n[CommandTool]\n");
            content.push_str(COMMAND_FAILED_NOTE);
        }
    }

    content
}

/// Reject empty or degenerate replies (no letters or digits at all)
pub fn check_reply(raw: &str) -> Result<String> {
    let reply = raw.trim();
    if !reply.chars().any(char::is_alphanumeric) {
        return Err(IdaError::EmptyAnswer);
    }
    Ok(reply.to_string())
}

/// Make sure the user is told the command could not be generated
pub fn ensure_failure_notice(reply: String) -> String {
    let lower = reply.to_lowercase();
    if lower.contains("could not be generated") || lower.contains("couldn't be generated") {
        reply
    } else {
        format!("{}\n\n{}", COMMAND_UNAVAILABLE_NOTICE, reply)
    }
}
