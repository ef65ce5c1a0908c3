//! Shared test fixtures: a scripted inference client

#![allow(dead_code)]

use async_trait::async_trait;
use oci_ida::core::config::Instructions;
use oci_ida::core::error::{IdaError, Result};
use oci_ida::llm::client::{InferenceClient, Stage};
use oci_ida::pipeline::Assistant;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a stage call returns
#[derive(Clone)]
pub enum Reply {
    Text(String),
    Unavailable,
    /// Sleep before answering (for deadline tests)
    Delayed(Duration, String),
}

/// One recorded inference call
#[derive(Debug, Clone)]
pub struct Call {
    pub stage: Stage,
    pub instruction: String,
    pub content: String,
}

/// Inference client that answers each stage with a fixed reply
#[derive(Default)]
pub struct ScriptedClient {
    replies: HashMap<Stage, Reply>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, stage: Stage, text: &str) -> Self {
        self.replies.insert(stage, Reply::Text(text.to_string()));
        self
    }

    pub fn unavailable(mut self, stage: Stage) -> Self {
        self.replies.insert(stage, Reply::Unavailable);
        self
    }

    pub fn delayed(mut self, stage: Stage, delay: Duration, text: &str) -> Self {
        self.replies
            .insert(stage, Reply::Delayed(delay, text.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.calls().iter().map(|c| c.stage).collect()
    }

    pub fn content_for(&self, stage: Stage) -> Option<String> {
        self.calls()
            .into_iter()
            .find(|c| c.stage == stage)
            .map(|c| c.content)
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn infer(&self, stage: Stage, role_instruction: &str, content: &str) -> Result<String> {
        self.calls.lock().unwrap().push(Call {
            stage,
            instruction: role_instruction.to_string(),
            content: content.to_string(),
        });

        match self.replies.get(&stage) {
            Some(Reply::Text(text)) => Ok(text.clone()),
            Some(Reply::Delayed(delay, text)) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            Some(Reply::Unavailable) => Err(IdaError::InferenceUnavailable(
                "connection refused".into(),
            )),
            None => panic!("no scripted reply for stage {:?}", stage),
        }
    }
}

pub const CONCEPT_QUESTION: &str = "What is OCI Object Storage";
pub const DELETE_QUESTION: &str = "Delete an OCI compute instance using OCI CLI";

pub const TERMINATE_OUTPUT: &str = r#"{"generated_command": "oci compute instance terminate --instance-id <instance_id>", "notes": "needs the instance OCID"}"#;

pub const OBJECT_STORAGE_REPLY: &str = "Problem Summary\nOCI Object Storage is an internet-scale object store.\n\nKey Concepts\n- Buckets\n- Namespaces";

pub const TERMINATE_REPLY: &str = "Problem Summary\nTerminate a compute instance.\n\nOCI CLI Command\noci compute instance terminate --instance-id <instance_id>\n\nMissing Info\n- instance_id (information you must supply)\n\nNotes\nFor reference only; verify before execution.";

/// Client scripted for the conceptual scenario
pub fn concept_client() -> ScriptedClient {
    ScriptedClient::new()
        .on(Stage::Router, "NO")
        .on(Stage::Answer, OBJECT_STORAGE_REPLY)
}

/// Client scripted for the delete-instance scenario
pub fn delete_client() -> ScriptedClient {
    ScriptedClient::new()
        .on(Stage::Router, "YES")
        .on(Stage::Command, TERMINATE_OUTPUT)
        .on(Stage::Answer, TERMINATE_REPLY)
}

pub fn assistant(client: ScriptedClient) -> (Arc<ScriptedClient>, Assistant<ScriptedClient>) {
    let client = Arc::new(client);
    let assistant = Assistant::new(Arc::clone(&client), Instructions::default());
    (client, assistant)
}
