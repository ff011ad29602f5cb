use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),
    #[error("API key in {0} is not a valid header value")]
    InvalidApiKey(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider returned no content")]
    EmptyResponse,
    #[error("response is not valid JSON for the schema: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {path:?}: {source}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    #[error("table of contents unavailable: {0}")]
    TocUnavailable(String),
    #[error("failed to write {path:?}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
}
