//! Plain-text reports.
//!
//! Both reports are rewritten from scratch on every run.
//!
//! ```text
//! news_report.txt                    final_summary.txt
//! Title: ...                         Combined Summary ===
//! Summary: ...                       <combined summary>
//! URL: ...
//! Date and Time: ...
//! Sentiment: ...
//! ------------------------------------------------------------------------
//! ```

use crate::error::Result;
use crate::models::Article;
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

pub const SEPARATOR_WIDTH: usize = 80;
pub const FINAL_SUMMARY_HEADER: &str = "Combined Summary ===";

/// Render the per-article report.
pub fn render_report(articles: &[Article]) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut out = String::new();
    for article in articles {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "Title: {}", article.title);
        let _ = writeln!(out, "Summary: {}", article.summary);
        let _ = writeln!(out, "URL: {}", article.url);
        let _ = writeln!(out, "Date and Time: {}", article.date_time);
        let _ = writeln!(out, "Sentiment: {}", article.sentiment);
        let _ = writeln!(out, "{separator}");
    }
    out
}

/// Render the combined-summary report.
pub fn render_final_report(combined_summary: &str) -> String {
    format!("{FINAL_SUMMARY_HEADER}\n{combined_summary}\n")
}

/// Overwrite `path` with one block per article.
#[instrument(level = "info", skip_all, fields(path = %path.display(), articles = articles.len()))]
pub async fn save_report(articles: &[Article], path: &Path) -> Result<()> {
    match fs::write(path, render_report(articles)).await {
        Ok(()) => {
            info!("Report successfully saved");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Error while saving report");
            Err(e.into())
        }
    }
}

/// Overwrite `path` with the header line and the combined summary.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn save_final_report(combined_summary: &str, path: &Path) -> Result<()> {
    match fs::write(path, render_final_report(combined_summary)).await {
        Ok(()) => {
            info!("Final summary successfully saved");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Error while saving final summary");
            Err(e.into())
        }
    }
}
