pub mod config;
pub mod error;

pub use config::AssistantConfig;
pub use error::{IdaError, Result};
