//! News site scraping.
//!
//! Scraping follows the same two-phase pattern as an index/fetch scraper:
//!
//! 1. **Searching**: fetch the site's search page for a company name and
//!    collect article links in document order
//! 2. **Extracting**: fetch each article page and pull out its title, first
//!    paragraphs and publish timestamp
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | BBC News | [`bbcnews`] | HTML scraping | Site search, news filter, first 10 links |
//!
//! All page downloads go through [`HtmlFetcher`], which sends a fixed
//! browser-like `User-Agent` and treats any status other than 200 as a failure.

pub mod bbcnews;

use crate::error::{PipelineError, Result};
use reqwest::{Client, StatusCode, header::USER_AGENT};
use scraper::Selector;
use tracing::{debug, instrument, warn};

/// User-Agent sent with every page request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// Thin HTTP GET wrapper shared by every scraper.
#[derive(Debug, Clone)]
pub struct HtmlFetcher {
    client: Client,
}

impl HtmlFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetch `url` and return its body on HTTP 200.
    ///
    /// Transport failures and non-200 statuses are logged here and returned as
    /// [`PipelineError::Http`] / [`PipelineError::Status`].
    #[instrument(level = "info", skip_all, fields(%url))]
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "Failed to retrieve the page");
            return Err(PipelineError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "Fetched page");
        Ok(body)
    }
}

/// Parse a CSS selector, mapping parse failures into the markup category.
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| PipelineError::Markup(format!("{css}: {e}")))
}
