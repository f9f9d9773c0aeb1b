//! Translation of the combined summary and its sentiment label.
//!
//! [`GoogleTranslator`] uses the public `translate_a/single` endpoint with the
//! `gtx` client. Its response is a nested JSON array whose first element holds
//! `[translated, original, ...]` segments; the translated parts are
//! concatenated.
//!
//! [`translate_pair`] never fails: if either translation fails both inputs
//! come back unchanged.

use crate::error::{PipelineError, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};

pub const GOOGLE_TRANSLATE_BASE_URL: &str = "https://translate.googleapis.com";
pub const SOURCE_LANG: &str = "en";
pub const DEFAULT_TARGET_LANG: &str = "hi";

/// Maps text from one language to another.
pub trait Translate {
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, GOOGLE_TRANSLATE_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Translate for GoogleTranslator {
    #[instrument(level = "info", skip(self, text), fields(chars = text.len()))]
    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<String> {
        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let translated = parse_translation(&body)?;
        debug!(chars = translated.len(), "Translated text");
        Ok(translated)
    }
}

/// Concatenate the translated segments of a `translate_a/single` response.
pub fn parse_translation(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| PipelineError::Translation(format!("malformed response: {e}")))?;

    let segments = value
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::Translation("response has no segments".to_string()))?;

    let translated = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect::<String>();

    if translated.is_empty() {
        return Err(PipelineError::Translation("empty translation".to_string()));
    }
    Ok(translated)
}

/// Translate two strings independently, returning the originals on failure.
pub async fn translate_pair<T: Translate>(
    translator: &T,
    first: &str,
    second: &str,
    source: &str,
    target: &str,
) -> (String, String) {
    let translated = async {
        let a = translator.translate(first, source, target).await?;
        let b = translator.translate(second, source, target).await?;
        Ok::<_, PipelineError>((a, b))
    }
    .await;

    match translated {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, %target, "Error translating text; keeping originals");
            (first.to_string(), second.to_string())
        }
    }
}
