//! OCI IDA - question answering for OCI with placeholder-safe CLI commands

pub mod command;
pub mod core;
pub mod llm;
pub mod pipeline;
pub mod server;
