//! Text-to-speech for the narrated summary.
//!
//! [`GoogleTts`] speaks through the `translate_tts` endpoint, which accepts at
//! most [`MAX_CHUNK_CHARS`] characters per request. Text is split on sentence
//! punctuation first and then packed word by word; each chunk is fetched in
//! order and the MP3 payloads are concatenated into one file.

use crate::error::{PipelineError, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

pub const GOOGLE_TTS_BASE_URL: &str = "https://translate.google.com";
pub const MAX_CHUNK_CHARS: usize = 100;

/// Sentence punctuation followed by whitespace or the end of the text, so
/// decimals like `3.5` stay inside their sentence.
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?।]+(\s+|$)").unwrap());

/// Converts text into an audio file.
pub trait SpeechSynthesizer {
    async fn synthesize(&self, text: &str, path: &Path, lang: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct GoogleTts {
    client: Client,
    base_url: String,
}

impl GoogleTts {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, GOOGLE_TTS_BASE_URL)
    }

    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_chunk(&self, chunk: &str, idx: usize, total: usize, lang: &str) -> Result<Vec<u8>> {
        let url = format!("{}/translate_tts", self.base_url);
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", chunk),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
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
        Ok(response.bytes().await?.to_vec())
    }
}

impl SpeechSynthesizer for GoogleTts {
    #[instrument(level = "info", skip(self, text), fields(chars = text.len(), path = %path.display()))]
    async fn synthesize(&self, text: &str, path: &Path, lang: &str) -> Result<()> {
        let chunks = split_for_speech(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(PipelineError::Speech("nothing to speak".to_string()));
        }
        let total = chunks.len();

        let parts: Vec<Vec<u8>> = stream::iter(chunks.iter().enumerate())
            .then(|(idx, chunk)| self.fetch_chunk(chunk, idx, total, lang))
            .try_collect()
            .await?;

        let audio = parts.concat();
        if audio.is_empty() {
            return Err(PipelineError::Speech("empty audio payload".to_string()));
        }
        fs::write(path, &audio).await?;
        info!(chunks = total, bytes = audio.len(), "Wrote speech audio");
        Ok(())
    }
}

fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        out.push(&text[start..m.end()]);
        start = m.end();
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}

/// Split `text` into pieces of at most `max_chars` characters.
///
/// Sentence punctuation (`.`, `!`, `?`, `।`) followed by whitespace or the end
/// of the text always ends a piece; within a sentence words are packed
/// greedily. A single word longer than `max_chars` is cut at character
/// boundaries.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();

    for sentence in sentences(text) {
        let mut current = String::new();
        for word in sentence.split_whitespace() {
            let word_len = word.chars().count();
            let current_len = current.chars().count();

            if word_len > max_chars {
                if !current.is_empty() {
                    chunks.push(std::mem::take(&mut current));
                }
                let chars = word.chars().collect::<Vec<_>>();
                for piece in chars.chunks(max_chars) {
                    chunks.push(piece.iter().collect());
                }
                continue;
            }

            if current.is_empty() {
                current.push_str(word);
            } else if current_len + 1 + word_len <= max_chars {
                current.push(' ');
                current.push_str(word);
            } else {
                chunks.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
    }

    chunks
}

/// Speak `text` into `path`, logging instead of propagating failures.
pub async fn text_to_speech<V: SpeechSynthesizer>(
    synthesizer: &V,
    text: &str,
    path: &Path,
    lang: &str,
) {
    match synthesizer.synthesize(text, path, lang).await {
        Ok(()) => info!(path = %path.display(), "Speech saved"),
        Err(e) => error!(path = %path.display(), error = %e, "Error generating speech"),
    }
}
