//! The news analysis pipeline for one company name.
//!
//! Stages run strictly in order, each awaited before the next:
//!
//! 1. **Discover**: search and extract up to 10 articles; none ends the run
//! 2. **Summarize**: one combined summary (sentinel text on failure)
//! 3. **Score**: sentiment of the combined summary
//! 4. **Translate**: summary and label (originals kept on failure)
//! 5. **Speak**: narrate the translated text (skipped on failure)
//! 6. **Persist**: both text reports, attempted regardless of 3–5
//!
//! Side effects of earlier stages are never rolled back. Runs share the output
//! files, so callers must not run two pipelines against the same directory
//! concurrently.

use crate::api::AskAsync;
use crate::error::{PipelineError, Result};
use crate::models::NewsAnalysis;
use crate::outputs::report::{save_final_report, save_report};
use crate::outputs::{AUDIO_FILE, FINAL_SUMMARY_FILE, NEWS_REPORT_FILE};
use crate::scrapers::bbcnews::BbcNews;
use crate::sentiment::{SentimentScorer, analyze_sentiment};
use crate::speech::{SpeechSynthesizer, text_to_speech};
use crate::summarizer::{SUMMARY_FAILED, Summarizer};
use crate::translate::{DEFAULT_TARGET_LANG, SOURCE_LANG, Translate, translate_pair};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Where the pipeline writes and which languages it narrates in.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub output_dir: PathBuf,
    pub source_lang: String,
    pub target_lang: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            source_lang: SOURCE_LANG.to_string(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
        }
    }
}

impl PipelineSettings {
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(NEWS_REPORT_FILE)
    }

    pub fn final_summary_path(&self) -> PathBuf {
        self.output_dir.join(FINAL_SUMMARY_FILE)
    }

    pub fn audio_path(&self) -> PathBuf {
        self.output_dir.join(AUDIO_FILE)
    }
}

/// Wires every stage together. All collaborators are injected.
pub struct NewsPipeline<A, S, T, V> {
    scraper: BbcNews,
    summarizer: Summarizer<A>,
    scorer: S,
    translator: T,
    speech: V,
    settings: PipelineSettings,
}

impl<A, S, T, V> NewsPipeline<A, S, T, V>
where
    A: AskAsync<Response = String>,
    S: SentimentScorer,
    T: Translate,
    V: SpeechSynthesizer,
{
    pub fn new(
        scraper: BbcNews,
        summarizer: Summarizer<A>,
        scorer: S,
        translator: T,
        speech: V,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            scraper,
            summarizer,
            scorer,
            translator,
            speech,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run the pipeline, collapsing every failure into `None`.
    #[instrument(level = "info", skip(self))]
    pub async fn analyse_news(&self, company_name: &str) -> Option<NewsAnalysis> {
        let t0 = Instant::now();
        match self.run(company_name).await {
            Ok(analysis) => {
                info!(
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    articles = analysis.articles.len(),
                    sentiment = %analysis.sentiment,
                    "Analysis complete"
                );
                Some(analysis)
            }
            Err(PipelineError::NoArticles(_)) => {
                info!("No articles found for this company.");
                None
            }
            Err(e) => {
                error!(error = %e, "Error in pipeline execution");
                None
            }
        }
    }

    /// Run every stage, returning the only fatal condition as an error.
    pub async fn run(&self, company_name: &str) -> Result<NewsAnalysis> {
        let articles = self
            .scraper
            .extract_articles(company_name, &self.scorer)
            .await;
        if articles.is_empty() {
            return Err(PipelineError::NoArticles(company_name.to_string()));
        }

        let summary = match self.summarizer.summarize(&articles).await {
            Ok(summary) => summary,
            Err(e) => {
                error!(error = %e, "Error generating summary");
                SUMMARY_FAILED.to_string()
            }
        };
        let sentiment = analyze_sentiment(&self.scorer, &summary);

        let (spoken_summary, spoken_sentiment) = translate_pair(
            &self.translator,
            &summary,
            sentiment.as_str(),
            &self.settings.source_lang,
            &self.settings.target_lang,
        )
        .await;

        let audio_path = self.settings.audio_path();
        let narration = format!("{spoken_summary}. Sentiment analysis of summary: {spoken_sentiment}");
        text_to_speech(
            &self.speech,
            &narration,
            &audio_path,
            &self.settings.target_lang,
        )
        .await;

        if let Err(e) = save_report(&articles, &self.settings.report_path()).await {
            warn!(error = %e, "Per-article report not written");
        }
        if let Err(e) = save_final_report(&summary, &self.settings.final_summary_path()).await {
            warn!(error = %e, "Final summary report not written");
        }

        Ok(NewsAnalysis {
            summary,
            sentiment,
            audio_path,
            articles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sentiment;
    use crate::scrapers::HtmlFetcher;
    use reqwest::Client;
    use std::error::Error;
    use std::path::Path;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Default)]
    struct FakeModel {
        inputs: Mutex<Vec<String>>,
    }

    impl AskAsync for FakeModel {
        type Response = String;

        async fn ask(&self, text: &str) -> std::result::Result<String, Box<dyn Error>> {
            self.inputs.lock().unwrap().push(text.to_string());
            Ok("Acme reported record results.".to_string())
        }
    }

    struct FixedScorer;

    impl SentimentScorer for FixedScorer {
        fn compound(&self, _text: &str) -> Result<f64> {
            Ok(0.6)
        }
    }

    struct PrefixTranslator;

    impl Translate for PrefixTranslator {
        async fn translate(&self, text: &str, _source: &str, target: &str) -> Result<String> {
            Ok(format!("[{target}] {text}"))
        }
    }

    struct DownTranslator;

    impl Translate for DownTranslator {
        async fn translate(&self, _text: &str, _source: &str, _target: &str) -> Result<String> {
            Err(PipelineError::Translation("service unavailable".to_string()))
        }
    }

    struct BrokenScorer;

    impl SentimentScorer for BrokenScorer {
        fn compound(&self, _text: &str) -> Result<f64> {
            Err(PipelineError::Sentiment("lexicon unavailable".to_string()))
        }
    }

    struct MuteSpeech;

    impl SpeechSynthesizer for MuteSpeech {
        async fn synthesize(&self, _text: &str, _path: &Path, _lang: &str) -> Result<()> {
            Err(PipelineError::Speech("tts unavailable".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingSpeech {
        spoken: Mutex<Vec<String>>,
    }

    impl SpeechSynthesizer for RecordingSpeech {
        async fn synthesize(&self, text: &str, path: &Path, _lang: &str) -> Result<()> {
            self.spoken.lock().unwrap().push(text.to_string());
            std::fs::write(path, b"ID3")?;
            Ok(())
        }
    }

    async fn site_with(server: &MockServer, search_body: &str, pages: &[(&str, &str)]) {
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(search_body.to_string()))
            .mount(server)
            .await;
        for (p, summary) in pages {
            let body = format!(
                r#"<h1>{summary} headline</h1><time data-testid="timestamp" datetime="2025-05-06T10:00:00Z"></time><p>{summary}</p>"#
            );
            Mock::given(method("GET"))
                .and(path(*p))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(server)
                .await;
        }
    }

    fn pipeline<T: Translate>(
        server: &MockServer,
        dir: &Path,
        summarizer: Summarizer<FakeModel>,
        translator: T,
    ) -> NewsPipeline<FakeModel, FixedScorer, T, RecordingSpeech> {
        pipeline_with(server, dir, summarizer, FixedScorer, translator, RecordingSpeech::default())
    }

    fn pipeline_with<S, T, V>(
        server: &MockServer,
        dir: &Path,
        summarizer: Summarizer<FakeModel>,
        scorer: S,
        translator: T,
        speech: V,
    ) -> NewsPipeline<FakeModel, S, T, V>
    where
        S: SentimentScorer,
        T: Translate,
        V: SpeechSynthesizer,
    {
        let scraper =
            BbcNews::with_base_url(HtmlFetcher::new(Client::new()), &server.uri()).unwrap();
        NewsPipeline::new(
            scraper,
            summarizer,
            scorer,
            translator,
            speech,
            PipelineSettings {
                output_dir: dir.to_path_buf(),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_full_run_writes_outputs() {
        let server = MockServer::start().await;
        site_with(
            &server,
            r#"<a href="/news/a">a</a><a href="/sport/x">x</a><a href="/news/b">b</a>"#,
            &[("/news/a", "A"), ("/news/b", "B")],
        )
        .await;
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&server, dir.path(), Summarizer::new(FakeModel::default()), PrefixTranslator);

        let analysis = p.analyse_news("Acme").await.unwrap();

        assert_eq!(analysis.summary, "Acme reported record results.");
        assert_eq!(analysis.sentiment, Sentiment::Positive);
        assert_eq!(analysis.audio_path, dir.path().join(AUDIO_FILE));
        assert_eq!(analysis.articles.len(), 2);

        let inputs = p.summarizer_inputs();
        assert_eq!(inputs, vec!["A B".to_string()]);

        let spoken = p.speech.spoken.lock().unwrap().clone();
        assert_eq!(
            spoken,
            vec![
                "[hi] Acme reported record results.. Sentiment analysis of summary: [hi] Positive"
                    .to_string()
            ]
        );

        let report = std::fs::read_to_string(dir.path().join(NEWS_REPORT_FILE)).unwrap();
        assert_eq!(report.matches(&"-".repeat(80)).count(), 2);
        let final_report = std::fs::read_to_string(dir.path().join(FINAL_SUMMARY_FILE)).unwrap();
        assert_eq!(final_report, "Combined Summary ===\nAcme reported record results.\n");
        assert!(dir.path().join(AUDIO_FILE).exists());
    }

    #[tokio::test]
    async fn test_no_articles_returns_none_and_writes_nothing() {
        let server = MockServer::start().await;
        site_with(&server, r#"<a href="/sport/x">x</a><a>bare</a>"#, &[]).await;
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&server, dir.path(), Summarizer::new(FakeModel::default()), PrefixTranslator);

        assert!(p.analyse_news("Nobody Inc").await.is_none());
        assert!(!dir.path().join(NEWS_REPORT_FILE).exists());
        assert!(!dir.path().join(FINAL_SUMMARY_FILE).exists());
        assert!(!dir.path().join(AUDIO_FILE).exists());
        assert!(p.speech.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_translation_failure_speaks_english() {
        let server = MockServer::start().await;
        site_with(&server, r#"<a href="/news/a">a</a>"#, &[("/news/a", "A")]).await;
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&server, dir.path(), Summarizer::new(FakeModel::default()), DownTranslator);

        let analysis = p.analyse_news("Acme").await.unwrap();

        assert_eq!(analysis.summary, "Acme reported record results.");
        let spoken = p.speech.spoken.lock().unwrap().clone();
        assert_eq!(
            spoken,
            vec!["Acme reported record results.. Sentiment analysis of summary: Positive".to_string()]
        );
        assert!(dir.path().join(NEWS_REPORT_FILE).exists());
    }

    #[tokio::test]
    async fn test_summary_failure_still_writes_reports() {
        let server = MockServer::start().await;
        site_with(&server, r#"<a href="/news/a">a</a>"#, &[("/news/a", "A")]).await;
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(&server, dir.path(), Summarizer::unavailable(), PrefixTranslator);

        let analysis = p.analyse_news("Acme").await.unwrap();

        assert_eq!(analysis.summary, SUMMARY_FAILED);
        let final_report = std::fs::read_to_string(dir.path().join(FINAL_SUMMARY_FILE)).unwrap();
        assert_eq!(final_report, format!("Combined Summary ===\n{SUMMARY_FAILED}\n"));
    }

    #[tokio::test]
    async fn test_speech_failure_still_writes_reports() {
        let server = MockServer::start().await;
        site_with(&server, r#"<a href="/news/a">a</a>"#, &[("/news/a", "A")]).await;
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline_with(
            &server,
            dir.path(),
            Summarizer::new(FakeModel::default()),
            FixedScorer,
            PrefixTranslator,
            MuteSpeech,
        );

        let analysis = p.analyse_news("Acme").await.unwrap();

        assert_eq!(analysis.audio_path, dir.path().join(AUDIO_FILE));
        assert!(!analysis.audio_path.exists());
        assert!(dir.path().join(NEWS_REPORT_FILE).exists());
        assert!(dir.path().join(FINAL_SUMMARY_FILE).exists());
    }

    #[tokio::test]
    async fn test_scorer_failure_falls_back_to_neutral() {
        let server = MockServer::start().await;
        site_with(&server, r#"<a href="/news/a">a</a>"#, &[("/news/a", "A")]).await;
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline_with(
            &server,
            dir.path(),
            Summarizer::new(FakeModel::default()),
            BrokenScorer,
            PrefixTranslator,
            RecordingSpeech::default(),
        );

        let analysis = p.analyse_news("Acme").await.unwrap();

        assert_eq!(analysis.sentiment, Sentiment::Neutral);
        assert!(analysis.articles.iter().all(|a| a.sentiment == Sentiment::Neutral));
        let spoken = p.speech.spoken.lock().unwrap().clone();
        assert_eq!(
            spoken,
            vec![
                "[hi] Acme reported record results.. Sentiment analysis of summary: [hi] Neutral"
                    .to_string()
            ]
        );
        let report = std::fs::read_to_string(dir.path().join(NEWS_REPORT_FILE)).unwrap();
        assert!(report.contains("Sentiment: Neutral"));
        assert!(dir.path().join(FINAL_SUMMARY_FILE).exists());
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_still_returns_analysis() {
        let server = MockServer::start().await;
        site_with(&server, r#"<a href="/news/a">a</a>"#, &[("/news/a", "A")]).await;
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let p = pipeline(&server, &missing, Summarizer::new(FakeModel::default()), PrefixTranslator);

        let analysis = p.analyse_news("Acme").await.unwrap();

        assert_eq!(analysis.summary, "Acme reported record results.");
        assert_eq!(analysis.articles.len(), 1);
        assert!(!missing.join(NEWS_REPORT_FILE).exists());
        assert!(!missing.join(FINAL_SUMMARY_FILE).exists());
    }

    impl<S, T, V> NewsPipeline<FakeModel, S, T, V> {
        fn summarizer_inputs(&self) -> Vec<String> {
            self.summarizer
                .backend()
                .map(|m| m.inputs.lock().unwrap().clone())
                .unwrap_or_default()
        }
    }
}
