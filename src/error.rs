//! Error categories for every stage of the news pipeline.
//!
//! Each stage returns `Result<_, PipelineError>` and the orchestrator decides
//! whether a given failure degrades the run (summary, translation, speech,
//! reports) or aborts it (no articles).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Markup error: {0}")]
    Markup(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Sentiment error: {0}")]
    Sentiment(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("no articles found for {0:?}")]
    NoArticles(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
