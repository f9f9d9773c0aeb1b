//! BBC News search scraper.
//!
//! Searches [BBC](https://www.bbc.co.uk) for a company name with the news
//! filter applied, then walks every anchor on the results page in document
//! order. Anchors whose `href` contains `/news/` are treated as article links;
//! the first [`MAX_ARTICLES`] complete articles win. Order is markup order,
//! not relevance or date.
//!
//! # URL Pattern
//!
//! ```text
//! https://www.bbc.co.uk/search?q=<company>&filter=news
//! ```
//!
//! Relative article links are resolved against the site root.

use super::{HtmlFetcher, selector};
use crate::error::Result;
use crate::models::{Article, ArticleInfo, NO_DATETIME, NO_SUMMARY, NO_TITLE};
use crate::sentiment::{SentimentScorer, analyze_sentiment};
use itertools::Itertools;
use scraper::{ElementRef, Html};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Site root used for search and link resolution.
pub const BBC_BASE_URL: &str = "https://www.bbc.co.uk";
/// Maximum number of articles collected per search.
pub const MAX_ARTICLES: usize = 10;
/// Path segment identifying a news article link.
pub const NEWS_PATH_MARKER: &str = "/news/";
/// Number of leading paragraphs used as an article's summary.
pub const SUMMARY_PARAGRAPHS: usize = 3;

/// Scraper bound to one site root.
#[derive(Debug, Clone)]
pub struct BbcNews {
    fetcher: HtmlFetcher,
    base_url: Url,
}

impl BbcNews {
    pub fn new(fetcher: HtmlFetcher) -> Result<Self> {
        Self::with_base_url(fetcher, BBC_BASE_URL)
    }

    /// Point the scraper at another site root (used by tests).
    pub fn with_base_url(fetcher: HtmlFetcher, base_url: &str) -> Result<Self> {
        Ok(Self {
            fetcher,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Build the search URL for `company_name`.
    pub fn search_url(&self, company_name: &str) -> String {
        format!(
            "{}/search?q={}&filter=news",
            self.base_url.as_str().trim_end_matches('/'),
            urlencoding::encode(company_name)
        )
    }

    /// Discover up to [`MAX_ARTICLES`] articles about `company_name`.
    ///
    /// A failed search page fetch yields an empty vector. Each candidate link
    /// is fetched in turn; pages that fail to load or lack a usable title,
    /// summary or timestamp are skipped.
    #[instrument(level = "info", skip(self, scorer))]
    pub async fn extract_articles<S: SentimentScorer>(
        &self,
        company_name: &str,
        scorer: &S,
    ) -> Vec<Article> {
        let search_url = self.search_url(company_name);
        let html = match self.fetcher.fetch_html(&search_url).await {
            Ok(html) => html,
            Err(e) => {
                error!(error = %e, %search_url, "Search page unavailable");
                return Vec::new();
            }
        };

        let links = match article_links(&html, &self.base_url) {
            Ok(links) => links,
            Err(e) => {
                error!(error = %e, "Failed to scan search page");
                return Vec::new();
            }
        };
        debug!(candidates = links.len(), "News links on search page");

        let mut articles = Vec::new();
        for url in links {
            if articles.len() >= MAX_ARTICLES {
                break;
            }
            let Some(info) = self.extract_article_info(&url).await else {
                continue;
            };
            let Some(date_time) = info.complete_date_time() else {
                warn!(%url, "Article missing title, summary or timestamp; skipping");
                continue;
            };
            let date_time = date_time.to_string();
            let sentiment = analyze_sentiment(scorer, &info.summary);
            articles.push(Article {
                title: info.title,
                summary: info.summary,
                url,
                date_time,
                sentiment,
            });
        }

        info!(count = articles.len(), "Extracted BBC articles");
        articles
    }

    /// Fetch one article page and extract its fields.
    ///
    /// Returns `None` when the page cannot be fetched or parsed.
    #[instrument(level = "info", skip(self))]
    pub async fn extract_article_info(&self, url: &str) -> Option<ArticleInfo> {
        let html = self.fetcher.fetch_html(url).await.ok()?;
        match parse_article(&html) {
            Ok(info) => {
                debug!(title = %info.title, "Parsed BBC article");
                Some(info)
            }
            Err(e) => {
                error!(error = %e, "Error processing article");
                None
            }
        }
    }
}

/// Collect absolute article URLs from a search results page.
///
/// Every `a[href]` is visited in document order; only hrefs containing
/// [`NEWS_PATH_MARKER`] are kept. Duplicates are preserved.
pub fn article_links(html: &str, base_url: &Url) -> Result<Vec<String>> {
    let document = Html::parse_document(html);
    let anchor_selector = selector("a[href]")?;

    let links = document
        .select(&anchor_selector)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| href.contains(NEWS_PATH_MARKER))
        .filter_map(|href| match base_url.join(href) {
            Ok(resolved) => Some(resolved.to_string()),
            Err(e) => {
                debug!(%href, error = %e, "Unresolvable link");
                None
            }
        })
        .collect();
    Ok(links)
}

/// Extract title, summary and timestamp from an article page.
pub fn parse_article(html: &str) -> Result<ArticleInfo> {
    let document = Html::parse_document(html);
    let h1_selector = selector("h1")?;
    let time_selector = selector(r#"time[data-testid="timestamp"]"#)?;
    let p_selector = selector("p")?;

    let title = document
        .select(&h1_selector)
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| NO_TITLE.to_string());

    let date_time = match document.select(&time_selector).next() {
        Some(time) => time.value().attr("datetime").map(str::to_string),
        None => Some(NO_DATETIME.to_string()),
    };

    let paragraphs = document
        .select(&p_selector)
        .take(SUMMARY_PARAGRAPHS)
        .map(stripped_text)
        .collect::<Vec<_>>();
    let summary = if paragraphs.is_empty() {
        NO_SUMMARY.to_string()
    } else {
        paragraphs.iter().join(" ")
    };

    Ok(ArticleInfo {
        title,
        summary,
        date_time,
    })
}

/// Text of an element with each text node trimmed and empty nodes dropped.
fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
