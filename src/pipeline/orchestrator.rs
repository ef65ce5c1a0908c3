//! Pipeline orchestrator
//!
//! START -> ROUTED -> {SYNTHESIZED | SKIPPED} -> ANSWERED -> DONE
//!
//! Each call to [`Assistant::chat`] walks this state machine once. The
//! assistant holds no per-request state, so one instance serves any number
//! of concurrent requests.

use crate::core::config::Instructions;
use crate::core::error::Result;
use crate::llm::client::InferenceClient;
use crate::pipeline::answer::{self, CommandOutcome};
use crate::pipeline::router;
use crate::pipeline::synthesizer;
use crate::pipeline::types::{CommandArtifact, Request, Response, RouterDecision};
use std::sync::Arc;
use tracing::Instrument;

/// Pipeline position for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    Routed(RouterDecision),
    Synthesized(CommandArtifact),
    Skipped(SkipReason),
    Answered {
        artifact: Option<CommandArtifact>,
        reply: String,
    },
    Done(Response),
}

impl PipelineState {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Start => "START",
            PipelineState::Routed(_) => "ROUTED",
            PipelineState::Synthesized(_) => "SYNTHESIZED",
            PipelineState::Skipped(_) => "SKIPPED",
            PipelineState::Answered { .. } => "ANSWERED",
            PipelineState::Done(_) => "DONE",
        }
    }
}

/// Why the command stage did not produce an artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotNeeded,
    TemplateFailed(String),
}

/// The one conditional edge of the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Synthesize,
    Skip,
}

/// Choose the edge out of ROUTED
pub fn branch(decision: RouterDecision) -> Branch {
    if decision.needs_command {
        Branch::Synthesize
    } else {
        Branch::Skip
    }
}

/// Stateless question-answering pipeline over an injected inference client
pub struct Assistant<C: ?Sized> {
    client: Arc<C>,
    instructions: Instructions,
}

impl<C> Assistant<C>
where
    C: InferenceClient + ?Sized,
{
    pub fn new(client: Arc<C>, instructions: Instructions) -> Self {
        Self {
            client,
            instructions,
        }
    }

    /// Answer one prompt
    ///
    /// Fails only when the prompt is blank, inference is unavailable, or the
    /// final answer is empty. Router and template parse failures degrade to a
    /// conceptual answer.
    pub async fn chat(&self, prompt: &str) -> Result<Response> {
        let request = Request::new(prompt)?;
        let span = tracing::info_span!("chat", request_id = %uuid::Uuid::new_v4());

        async move {
            tracing::info!("Handling question");
            let mut state = PipelineState::Start;
            loop {
                state = match self.step(&request, state).await? {
                    PipelineState::Done(response) => {
                        tracing::info!(tool_used = response.tool_used, "Question answered");
                        return Ok(response);
                    }
                    next => {
                        tracing::debug!(state = next.name(), "Pipeline transition");
                        next
                    }
                };
            }
        }
        .instrument(span)
        .await
    }

    /// Advance one transition
    pub async fn step(&self, request: &Request, state: PipelineState) -> Result<PipelineState> {
        let client = self.client.as_ref();
        let question = request.question.as_str();

        match state {
            PipelineState::Start => {
                let decision = router::route(client, &self.instructions.router, question).await?;
                Ok(PipelineState::Routed(decision))
            }
            PipelineState::Routed(decision) => match branch(decision) {
                Branch::Skip => Ok(PipelineState::Skipped(SkipReason::NotNeeded)),
                Branch::Synthesize => {
                    match synthesizer::synthesize(client, &self.instructions.command, question)
                        .await
                    {
                        Ok(artifact) => Ok(PipelineState::Synthesized(artifact)),
                        Err(e) if e.is_recoverable() => {
                            let reason = e.to_string();
                            tracing::warn!(%reason, "Command synthesis failed, answering conceptually");
                            Ok(PipelineState::Skipped(SkipReason::TemplateFailed(reason)))
                        }
                        Err(e) => Err(e),
                    }
                }
            },
            PipelineState::Synthesized(artifact) => {
                let outcome = CommandOutcome::Produced(artifact);
                let reply = self.answer(question, &outcome).await?;
                Ok(PipelineState::Answered {
                    artifact: outcome.into_artifact(),
                    reply,
                })
            }
            PipelineState::Skipped(reason) => {
                let outcome = match reason {
                    SkipReason::NotNeeded => CommandOutcome::NotRequested,
                    SkipReason::TemplateFailed(reason) => CommandOutcome::Failed(reason),
                };
                let reply = self.answer(question, &outcome).await?;
                Ok(PipelineState::Answered {
                    artifact: None,
                    reply,
                })
            }
            PipelineState::Answered { artifact, reply } => {
                Ok(PipelineState::Done(Response::assemble(artifact, reply)))
            }
            PipelineState::Done(response) => Ok(PipelineState::Done(response)),
        }
    }

    async fn answer(&self, question: &str, outcome: &CommandOutcome) -> Result<String> {
        answer::answer(
            self.client.as_ref(),
            &self.instructions.answer,
            question,
            outcome,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch() {
        assert_eq!(branch(RouterDecision { needs_command: true }), Branch::Synthesize);
        assert_eq!(branch(RouterDecision { needs_command: false }), Branch::Skip);
        assert_eq!(branch(RouterDecision::CONSERVATIVE), Branch::Skip);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(PipelineState::Start.name(), "START");
        assert_eq!(
            PipelineState::Skipped(SkipReason::NotNeeded).name(),
            "SKIPPED"
        );
        assert_eq!(
            PipelineState::Answered {
                artifact: None,
                reply: String::new()
            }
            .name(),
            "ANSWERED"
        );
    }
}
