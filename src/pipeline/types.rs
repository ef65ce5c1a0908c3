//! Request-scoped data passed between the pipeline stages

use crate::command::placeholder::is_placeholder_safe;
use crate::core::error::{IdaError, Result};
use serde::{Deserialize, Serialize};

/// One incoming question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub question: String,
}

impl Request {
    /// Rejects blank questions
    pub fn new(question: &str) -> Result<Self> {
        let question = question.trim();
        if question.is_empty() {
            return Err(IdaError::InvalidRequest("prompt must not be empty".into()));
        }
        Ok(Self {
            question: question.to_string(),
        })
    }
}

/// Router output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterDecision {
    pub needs_command: bool,
}

impl RouterDecision {
    /// Used whenever the router output cannot be trusted
    pub const CONSERVATIVE: RouterDecision = RouterDecision {
        needs_command: false,
    };
}

/// Placeholder-only command template plus the fields the user must supply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandArtifact {
    command_template: String,
    required_fields: Vec<String>,
    missing_fields: Vec<String>,
}

impl CommandArtifact {
    /// Build an artifact, enforcing `missing ⊆ required` and placeholder safety
    pub fn new(
        command_template: String,
        required_fields: Vec<String>,
        missing_fields: Vec<String>,
    ) -> Result<Self> {
        if let Some(stray) = missing_fields
            .iter()
            .find(|field| !required_fields.contains(field))
        {
            return Err(IdaError::TemplateParse(format!(
                "missing field `{}` is not a required field",
                stray
            )));
        }
        if !is_placeholder_safe(&command_template, &required_fields) {
            return Err(IdaError::TemplateParse(format!(
                "template is not placeholder-safe: {}",
                command_template
            )));
        }
        Ok(Self {
            command_template,
            required_fields,
            missing_fields,
        })
    }

    pub fn command_template(&self) -> &str {
        &self.command_template
    }

    pub fn required_fields(&self) -> &[String] {
        &self.required_fields
    }

    pub fn missing_fields(&self) -> &[String] {
        &self.missing_fields
    }
}

/// The only entity that crosses the service boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub reply: String,
    pub tool_used: bool,
    pub generated_command: Option<String>,
    pub missing_fields: Vec<String>,
}

impl Response {
    /// Assemble the response; tool use is derived from the artifact alone
    pub fn assemble(artifact: Option<CommandArtifact>, reply: String) -> Self {
        match artifact {
            Some(artifact) => Self {
                reply,
                tool_used: true,
                generated_command: Some(artifact.command_template),
                missing_fields: artifact.missing_fields,
            },
            None => Self {
                reply,
                tool_used: false,
                generated_command: None,
                missing_fields: Vec::new(),
            },
        }
    }
}
