//! OCI IDA - Entry Point
//!
//! `serve` runs the HTTP service; `ask` runs one question through the
//! pipeline and prints the response.

use clap::{Parser, Subcommand};
use oci_ida::core::config::AssistantConfig;
use oci_ida::core::error::{IdaError, Result};
use oci_ida::llm::client::LlmClient;
use oci_ida::pipeline::{Assistant, Response};
use oci_ida::server;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// OCI Intelligent Documentation Assistant
#[derive(Parser, Debug)]
#[command(name = "oci-ida")]
#[command(about = "Answer OCI questions and draft placeholder-only CLI commands")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service
    Serve {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Listen address, overrides the config file
        #[arg(long)]
        bind: Option<String>,
    },
    /// Answer a single question and exit
    Ask {
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the raw JSON response
        #[arg(long, default_value_t = false)]
        json: bool,

        /// The question
        #[arg(required = true)]
        question: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so `ask --json` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("oci_ida=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let rt = Runtime::new()?;

    match cli.command {
        Command::Serve { config, bind } => {
            let mut config = AssistantConfig::load(config.as_deref())?;
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            let assistant = build_assistant(&config)?;
            tracing::info!(model = %config.inference.model, "OCI IDA starting...");
            rt.block_on(server::serve(assistant, &config.server))
        }
        Command::Ask {
            config,
            json,
            question,
        } => {
            let config = AssistantConfig::load(config.as_deref())?;
            let assistant = build_assistant(&config)?;
            let deadline = Duration::from_secs(config.server.request_timeout_secs);
            let question = question.join(" ");
            let response = rt
                .block_on(async { tokio::time::timeout(deadline, assistant.chat(&question)).await })
                .map_err(|_| {
                    IdaError::InferenceUnavailable(format!("no answer within {:?}", deadline))
                })??;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print_response(&response);
            }
            Ok(())
        }
    }
}

fn build_assistant(config: &AssistantConfig) -> Result<Assistant<LlmClient>> {
    let client = LlmClient::from_config(config)?;
    Ok(Assistant::new(
        Arc::new(client),
        config.instructions.clone(),
    ))
}

/// Human readable rendering, same sections as the demo page
fn print_response(response: &Response) {
    println!();
    println!("tool_used: {}", response.tool_used);
    if let Some(command) = &response.generated_command {
        println!();
        println!("OCI CLI Command:");
        println!("  {}", command);
    }
    if !response.missing_fields.is_empty() {
        println!();
        println!("Missing Info:");
        for field in &response.missing_fields {
            println!("  - {}", field);
        }
    }
    println!();
    println!("{}", response.reply);
}
