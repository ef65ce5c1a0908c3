//! Integration tests for the question-answering pipeline
//!
//! These tests drive the full Router -> Command Synthesizer -> Answer
//! Synthesizer chain with a scripted inference client:
//! - Conceptual questions never produce a command
//! - Resource operations produce a catalog template with missing fields
//! - Parse failures degrade to a conceptual answer
//! - Inference outages and empty answers fail the whole request

mod common;

use common::*;
use oci_ida::core::error::IdaError;
use oci_ida::llm::client::Stage;
use oci_ida::pipeline::answer::COMMAND_UNAVAILABLE_NOTICE;
use oci_ida::pipeline::{PipelineState, Request, RouterDecision, SkipReason};

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_conceptual_question() {
    let (client, assistant) = assistant(concept_client());

    let response = assistant.chat(CONCEPT_QUESTION).await.unwrap();

    assert!(!response.tool_used);
    assert!(response.generated_command.is_none());
    assert!(response.missing_fields.is_empty());
    assert!(!response.reply.is_empty());
    assert_eq!(client.stages(), vec![Stage::Router, Stage::Answer]);
}

#[tokio::test]
async fn test_delete_instance_question() {
    let (client, assistant) = assistant(delete_client());

    let response = assistant.chat(DELETE_QUESTION).await.unwrap();

    assert!(response.tool_used);
    let command = response.generated_command.as_deref().unwrap();
    assert!(command.starts_with("oci compute instance terminate --instance-id <"));
    assert!(command.ends_with('>'));
    assert_eq!(response.missing_fields, vec!["instance_id"]);
    assert_eq!(
        client.stages(),
        vec![Stage::Router, Stage::Command, Stage::Answer]
    );

    // The answer stage sees the command artifact and the extra requirements
    let content = client.content_for(Stage::Answer).unwrap();
    assert!(content.starts_with(DELETE_QUESTION));
    assert!(content.contains("[CommandTool]"));
    assert!(content.contains("for reference only"));
}

#[tokio::test]
async fn test_router_outage_fails_request() {
    let client = ScriptedClient::new().unavailable(Stage::Router);
    let (client, assistant) = assistant(client);

    let result = assistant.chat(DELETE_QUESTION).await;

    assert!(matches!(result, Err(IdaError::InferenceUnavailable(_))));
    assert_eq!(client.stages(), vec![Stage::Router]);
}

#[tokio::test]
async fn test_command_outage_fails_request() {
    let client = ScriptedClient::new()
        .on(Stage::Router, "YES")
        .unavailable(Stage::Command);
    let (client, assistant) = assistant(client);

    let result = assistant.chat(DELETE_QUESTION).await;

    assert!(matches!(result, Err(IdaError::InferenceUnavailable(_))));
    assert_eq!(client.stages(), vec![Stage::Router, Stage::Command]);
}

#[tokio::test]
async fn test_answer_outage_fails_request() {
    let client = ScriptedClient::new()
        .on(Stage::Router, "YES")
        .on(Stage::Command, TERMINATE_OUTPUT)
        .unavailable(Stage::Answer);
    let (client, assistant) = assistant(client);

    let result = assistant.chat(DELETE_QUESTION).await;

    assert!(matches!(result, Err(IdaError::InferenceUnavailable(_))));
    assert_eq!(
        client.stages(),
        vec![Stage::Router, Stage::Command, Stage::Answer]
    );
}

#[tokio::test]
async fn test_answer_outage_on_conceptual_path() {
    let client = ScriptedClient::new()
        .on(Stage::Router, "NO")
        .unavailable(Stage::Answer);
    let (client, assistant) = assistant(client);

    let result = assistant.chat(CONCEPT_QUESTION).await;

    assert!(matches!(result, Err(IdaError::InferenceUnavailable(_))));
    assert_eq!(client.stages(), vec![Stage::Router, Stage::Answer]);
}

#[tokio::test]
async fn test_unparseable_command_degrades() {
    let client = ScriptedClient::new()
        .on(Stage::Router, "YES")
        .on(Stage::Command, "Sorry, I can't help with that.")
        .on(Stage::Answer, "To delete an instance, use the console or the CLI.");
    let (client, assistant) = assistant(client);

    let response = assistant.chat(DELETE_QUESTION).await.unwrap();

    assert!(!response.tool_used);
    assert!(response.generated_command.is_none());
    assert!(response.missing_fields.is_empty());
    assert!(response.reply.contains("could not be generated"));
    assert!(response.reply.starts_with(COMMAND_UNAVAILABLE_NOTICE));

    let content = client.content_for(Stage::Answer).unwrap();
    assert!(content.contains("could not be generated"));
}

#[tokio::test]
async fn test_unsupported_family_degrades() {
    let client = ScriptedClient::new()
        .on(Stage::Router, "YES")
        .on(
            Stage::Command,
            r#"{"generated_command": "oci db autonomous-database list --compartment-id <compartment_id>"}"#,
        )
        .on(
            Stage::Answer,
            "The command could not be generated. Autonomous Databases are listed per compartment.",
        );
    let (_client, assistant) = assistant(client);

    let response = assistant.chat("List my autonomous databases").await.unwrap();

    assert!(!response.tool_used);
    // Model already said it; no second notice
    assert!(!response.reply.starts_with(COMMAND_UNAVAILABLE_NOTICE));
}

#[tokio::test]
async fn test_unparseable_router_is_conservative() {
    let client = ScriptedClient::new()
        .on(Stage::Router, "It depends on what you mean.")
        .on(Stage::Answer, OBJECT_STORAGE_REPLY);
    let (client, assistant) = assistant(client);

    let response = assistant.chat(DELETE_QUESTION).await.unwrap();

    assert!(!response.tool_used);
    assert!(response.generated_command.is_none());
    assert_eq!(client.stages(), vec![Stage::Router, Stage::Answer]);
}

#[tokio::test]
async fn test_empty_answer_fails_request() {
    let client = ScriptedClient::new()
        .on(Stage::Router, "NO")
        .on(Stage::Answer, "   \n ");
    let (_client, assistant) = assistant(client);

    let result = assistant.chat(CONCEPT_QUESTION).await;

    assert!(matches!(result, Err(IdaError::EmptyAnswer)));
}

#[tokio::test]
async fn test_blank_prompt_rejected_without_inference() {
    let (client, assistant) = assistant(concept_client());

    let result = assistant.chat("   ").await;

    assert!(matches!(result, Err(IdaError::InvalidRequest(_))));
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn test_supplied_identifier_not_missing() {
    let client = ScriptedClient::new()
        .on(Stage::Router, "YES")
        .on(
            Stage::Command,
            "oci os bucket list --compartment-id <compartment_id> --namespace-name <namespace>",
        )
        .on(Stage::Answer, "Run the command below once you know your namespace.");
    let (_client, assistant) = assistant(client);

    let question = "List buckets in compartment ocid1.compartment.oc1..aaaaaaaaexample";
    let response = assistant.chat(question).await.unwrap();

    assert!(response.tool_used);
    assert_eq!(response.missing_fields, vec!["namespace"]);
    let command = response.generated_command.unwrap();
    assert!(!command.contains("ocid1."));
    assert!(command.contains("<compartment_id>"));
}

// ============================================================================
// Structural properties
// ============================================================================

#[tokio::test]
async fn test_repeated_calls_same_structure() {
    let (_client, assistant) = assistant(delete_client());

    let first = assistant.chat(DELETE_QUESTION).await.unwrap();
    let second = assistant.chat(DELETE_QUESTION).await.unwrap();

    assert_eq!(first.tool_used, second.tool_used);
    assert_eq!(first.missing_fields, second.missing_fields);
    assert_eq!(first.generated_command, second.generated_command);
}

#[tokio::test]
async fn test_concurrent_requests_do_not_interfere() {
    let (_concept, concept_assistant) = assistant(concept_client());
    let (_delete, delete_assistant) = assistant(delete_client());

    let (a, b, c) = tokio::join!(
        concept_assistant.chat(CONCEPT_QUESTION),
        delete_assistant.chat(DELETE_QUESTION),
        concept_assistant.chat(CONCEPT_QUESTION),
    );

    assert!(!a.unwrap().tool_used);
    assert!(b.unwrap().tool_used);
    assert!(!c.unwrap().tool_used);
}

#[tokio::test]
async fn test_state_machine_walk() {
    let (_client, assistant) = assistant(delete_client());
    let request = Request::new(DELETE_QUESTION).unwrap();

    let routed = assistant.step(&request, PipelineState::Start).await.unwrap();
    assert_eq!(routed, PipelineState::Routed(RouterDecision { needs_command: true }));

    let synthesized = assistant.step(&request, routed).await.unwrap();
    assert_eq!(synthesized.name(), "SYNTHESIZED");

    let answered = assistant.step(&request, synthesized).await.unwrap();
    assert_eq!(answered.name(), "ANSWERED");

    let done = assistant.step(&request, answered).await.unwrap();
    match done {
        PipelineState::Done(response) => assert!(response.tool_used),
        other => panic!("expected DONE, got {}", other.name()),
    }
}

#[tokio::test]
async fn test_skip_path_from_router_decision() {
    let (client, assistant) = assistant(concept_client());
    let request = Request::new(CONCEPT_QUESTION).unwrap();

    let skipped = assistant
        .step(&request, PipelineState::Routed(RouterDecision { needs_command: false }))
        .await
        .unwrap();

    assert_eq!(skipped, PipelineState::Skipped(SkipReason::NotNeeded));
    assert!(client.calls().is_empty());
}
