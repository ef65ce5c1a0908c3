use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdaError {
    /// The inference provider could not be reached, timed out, or reported a failure
    #[error("Inference unavailable: {0}")]
    InferenceUnavailable(String),

    /// Router output did not parse to a yes/no decision
    #[error("Router output not parseable: {0}")]
    RouterParse(String),

    /// Command synthesizer output did not yield a placeholder-bearing template
    #[error("Command template not parseable: {0}")]
    TemplateParse(String),

    #[error("Answer synthesizer returned an empty reply")]
    EmptyAnswer,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl IdaError {
    /// Errors the pipeline recovers from locally instead of failing the request
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IdaError::RouterParse(_) | IdaError::TemplateParse(_))
    }
}

pub type Result<T> = std::result::Result<T, IdaError>;
