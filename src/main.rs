//! # Awful Company News
//!
//! Scrapes BBC News for articles about a company, summarizes them with an
//! LLM, scores sentiment, translates the summary and narrates it as audio.
//!
//! ## Usage
//!
//! ```sh
//! awful_company_news analyze "Tata Motors"
//! awful_company_news serve --bind 127.0.0.1:8501
//! ```
//!
//! ## Architecture
//!
//! One run is a linear pipeline (see [`pipeline`]):
//! 1. **Discovery**: search BBC News and extract up to 10 articles
//! 2. **Summarization**: combine the article summaries through the LLM
//! 3. **Sentiment**: score the combined summary
//! 4. **Translation** and **Speech**: narrate the summary in the target language
//! 5. **Output**: write `news_report.txt` and `final_summary.txt`

use clap::Parser;
use reqwest::Client;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod error;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod sentiment;
mod speech;
mod summarizer;
mod translate;
mod utils;
mod web;

use api::AwfulBackend;
use cli::{Cli, Command};
use pipeline::{NewsPipeline, PipelineSettings};
use scrapers::{HtmlFetcher, bbcnews::BbcNews};
use sentiment::VaderScorer;
use speech::GoogleTts;
use summarizer::Summarizer;
use translate::{GoogleTranslator, SOURCE_LANG};
use utils::ensure_writable_dir;

type AppPipeline = NewsPipeline<AwfulBackend, VaderScorer, GoogleTranslator, GoogleTts>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("awful_company_news starting up");

    let args = Cli::parse();
    debug!(?args.output_dir, ?args.config, ?args.command, "Parsed CLI arguments");

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let pipeline = build_pipeline(&args).await?;

    match args.command {
        Command::Analyze { company_name } => {
            let start_time = std::time::Instant::now();
            match pipeline.analyse_news(&company_name).await {
                Some(analysis) => {
                    println!("Summary:\n{}\n", analysis.summary);
                    println!("Sentiment: {}", analysis.sentiment);
                    if analysis.audio_path.exists() {
                        println!("Audio: {}", analysis.audio_path.display());
                    } else {
                        println!("Audio file not found.");
                    }
                }
                None => println!("No articles found for this company."),
            }
            let elapsed = start_time.elapsed();
            info!(?elapsed, secs = elapsed.as_secs(), "Execution complete");
        }
        Command::Serve { bind } => {
            let audio_path = pipeline.settings().audio_path();
            let target_lang = pipeline.settings().target_lang.clone();
            let pipeline = Arc::new(pipeline);
            let handle = tokio::runtime::Handle::current();
            let runner: web::Runner = Arc::new(move |company_name: String| {
                handle.block_on(pipeline.analyse_news(&company_name))
            });
            web::serve(web::AppState::new(runner, audio_path, target_lang), bind).await?;
        }
    }

    Ok(())
}

/// Construct every pipeline collaborator from the CLI arguments.
async fn build_pipeline(args: &Cli) -> Result<AppPipeline, Box<dyn Error>> {
    let client = Client::builder().build()?;

    let scraper = BbcNews::new(HtmlFetcher::new(client.clone()))?;

    let summarizer = match AwfulBackend::load(args.config.as_deref(), &args.template).await {
        Ok(backend) => Summarizer::new(backend),
        Err(e) => {
            warn!(error = %e, "Error loading summarization model; summaries will fail");
            Summarizer::unavailable()
        }
    };
    info!(available = summarizer.is_available(), "Summarizer ready");

    let settings = PipelineSettings {
        output_dir: args.output_dir.clone(),
        source_lang: SOURCE_LANG.to_string(),
        target_lang: args.target_lang.clone(),
    };

    Ok(NewsPipeline::new(
        scraper,
        summarizer,
        VaderScorer::new(),
        GoogleTranslator::new(client.clone()),
        GoogleTts::new(client),
        settings,
    ))
}
