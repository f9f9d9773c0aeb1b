//! Data models for scraped articles and pipeline results.
//!
//! - [`ArticleInfo`]: raw fields pulled out of one article page
//! - [`Article`]: an accepted article with its sentiment label
//! - [`Sentiment`]: the three discrete sentiment labels
//! - [`NewsAnalysis`]: the outcome of one orchestrator run

use std::fmt;
use std::path::PathBuf;

/// Placeholder used when an article page has no `h1`.
pub const NO_TITLE: &str = "No Title Found";
/// Placeholder used when an article page has no paragraphs.
pub const NO_SUMMARY: &str = "No Summary Available";
/// Placeholder used when an article page has no timestamp element.
pub const NO_DATETIME: &str = "No datetime found.";

/// Discrete sentiment label derived from a compound polarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields extracted from a single article page.
///
/// `date_time` is `None` when the page carries a timestamp element without a
/// `datetime` attribute. Missing elements are represented by the sentinel
/// strings above rather than by `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleInfo {
    pub title: String,
    pub summary: String,
    pub date_time: Option<String>,
}

impl ArticleInfo {
    /// Returns the date when all three fields carry usable (non-empty) text.
    pub fn complete_date_time(&self) -> Option<&str> {
        match self.date_time.as_deref() {
            Some(dt) if !dt.is_empty() && !self.title.is_empty() && !self.summary.is_empty() => {
                Some(dt)
            }
            _ => None,
        }
    }
}

/// One discovered news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub summary: String,
    /// Absolute URL, resolved against the site's base URL.
    pub url: String,
    pub date_time: String,
    pub sentiment: Sentiment,
}

/// Result of one successful pipeline run.
#[derive(Debug, Clone)]
pub struct NewsAnalysis {
    /// Combined abstractive summary, in English.
    pub summary: String,
    /// Sentiment of the combined summary.
    pub sentiment: Sentiment,
    /// Where the narrated summary was (or would have been) written.
    pub audio_path: PathBuf,
    pub articles: Vec<Article>,
}
