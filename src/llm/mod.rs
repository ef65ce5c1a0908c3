//! Inference client and model-output helpers

pub mod client;
pub mod parser;
pub mod prompts;

pub use client::{ApiFormat, InferenceClient, LlmClient, Stage};
