//! Three-stage reasoning pipeline
//!
//! Router -> (Command Synthesizer) -> Answer Synthesizer, sequenced by the
//! orchestrator. Each stage owns the parser for its model output.

pub mod answer;
pub mod orchestrator;
pub mod router;
pub mod synthesizer;
pub mod types;

pub use answer::CommandOutcome;
pub use orchestrator::{branch, Assistant, Branch, PipelineState, SkipReason};
pub use types::{CommandArtifact, Request, Response, RouterDecision};
