//! Abstractive summarization of the collected article summaries.
//!
//! Per-article summaries are joined with single spaces, truncated to
//! [`MAX_INPUT_TOKENS`] whitespace tokens and handed to an [`AskAsync`]
//! backend. The answer is whitespace-normalized and capped at
//! [`MAX_SUMMARY_WORDS`] words.

use crate::api::AskAsync;
use crate::error::{PipelineError, Result};
use crate::models::Article;
use crate::utils::truncate_for_log;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

pub const MAX_INPUT_TOKENS: usize = 1024;
pub const MIN_SUMMARY_WORDS: usize = 80;
pub const MAX_SUMMARY_WORDS: usize = 200;

/// Placeholder the orchestrator uses when summarization fails.
pub const SUMMARY_FAILED: &str = "Summary generation failed.";

/// Join article summaries in order with single spaces.
pub fn combine_summaries(articles: &[Article]) -> String {
    articles.iter().map(|a| a.summary.as_str()).join(" ")
}

/// Keep at most `max` whitespace-separated tokens. Text within the limit is
/// returned untouched.
pub fn truncate_tokens(text: &str, max: usize) -> String {
    if text.split_whitespace().count() <= max {
        text.to_string()
    } else {
        text.split_whitespace().take(max).join(" ")
    }
}

#[derive(Debug)]
pub struct Summarizer<A> {
    backend: Option<A>,
}

impl<A> Summarizer<A> {
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    pub(crate) fn backend(&self) -> Option<&A> {
        self.backend.as_ref()
    }
}

impl<A> Summarizer<A>
where
    A: AskAsync<Response = String>,
{
    pub fn new(backend: A) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// A summarizer whose model could not be loaded; every call fails.
    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    /// Produce one combined summary for `articles`.
    #[instrument(level = "info", skip_all, fields(articles = articles.len()))]
    pub async fn summarize(&self, articles: &[Article]) -> Result<String> {
        let backend = self
            .backend()
            .ok_or_else(|| PipelineError::Model("summarization model unavailable".to_string()))?;

        let combined = combine_summaries(articles);
        let input = truncate_tokens(&combined, MAX_INPUT_TOKENS);
        debug!(input = %truncate_for_log(&input, 300), "Summarizer input");

        let raw = backend
            .ask(&input)
            .await
            .map_err(|e| PipelineError::Model(e.to_string()))?;

        let words = raw.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            return Err(PipelineError::Model("model returned an empty summary".to_string()));
        }
        if words.len() < MIN_SUMMARY_WORDS {
            warn!(words = words.len(), min = MIN_SUMMARY_WORDS, "Summary shorter than requested");
        }

        let summary = words.into_iter().take(MAX_SUMMARY_WORDS).join(" ");
        info!(chars = summary.len(), "Generated combined summary");
        Ok(summary)
    }
}
